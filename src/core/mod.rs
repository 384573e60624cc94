//! Core building blocks: the slot-indexed object store and transform math.

pub mod math;
pub mod store;

pub use math::{Bounds, FORWARD, RIGHT, UP};
pub use store::{HandleExt, ObjectStore};
