//! Utility Module
//!
//! - [`FpsCounter`]: frame rate averaged over fixed intervals

pub mod fps_counter;

pub use fps_counter::FpsCounter;
