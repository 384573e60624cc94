//! Application-facing state that the windowing layer feeds into the engine.

pub mod input;

pub use input::Input;
