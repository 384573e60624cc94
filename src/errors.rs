//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`EmberError`] covers:
//! - Graphics device failures (shader compilation, pipeline creation, command validation)
//! - Capacity exhaustion of the GPU buffer allocators
//! - Malformed scene data (degenerate matrices, missing glTF attributes)
//! - Asset loading and decoding errors
//!
//! Stale scene handles are deliberately *not* errors: every world query on a
//! destroyed object returns `None` and every mutation is a no-op.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, EmberError>`.
//!
//! ```rust,ignore
//! use ember::errors::{EmberError, Result};
//!
//! fn load_scene() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Ember engine.
#[derive(Error, Debug)]
pub enum EmberError {
    // ========================================================================
    // Graphics Device Errors
    // ========================================================================
    /// A shader module failed to compile.
    #[error("Shader compilation failed for '{name}': {reason}")]
    ShaderCompilation {
        /// Debug name of the shader module
        name: String,
        /// Backend diagnostic
        reason: String,
    },

    /// A render pipeline could not be created.
    #[error("Render pipeline creation failed for '{name}': {reason}")]
    PipelineCreation {
        /// Debug name of the pipeline
        name: String,
        /// Backend diagnostic
        reason: String,
    },

    /// A resource descriptor was rejected by the device.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// A device handle does not name a live resource.
    #[error("Unknown {0} handle")]
    UnknownResource(&'static str),

    /// A write landed outside the bounds of a device buffer.
    #[error("Upload of {size} bytes at offset {offset} exceeds buffer size {capacity}")]
    UploadOutOfBounds {
        /// Byte offset of the write
        offset: u64,
        /// Length of the write
        size: u64,
        /// Size of the destination buffer
        capacity: u64,
    },

    /// A submitted command buffer broke the recording rules.
    #[error("Command buffer validation failed: {0}")]
    CommandValidation(String),

    /// The shader loader has no source for the requested name.
    #[error("Shader not found: {0}")]
    ShaderNotFound(String),

    // ========================================================================
    // Capacity Errors
    // ========================================================================
    /// The current page of the transient ring cannot hold the allocation.
    #[error("Transient ring page overflow: requested {requested} bytes, {available} available")]
    RingOverflow {
        /// Bytes requested (after alignment)
        requested: u64,
        /// Bytes left in the current page
        available: u64,
    },

    /// The persistent arena has no free range large enough.
    #[error("Persistent buffer exhausted: requested {requested} bytes of {capacity}")]
    OutOfMemory {
        /// Bytes requested
        requested: u64,
        /// Total arena capacity
        capacity: u64,
    },

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// A matrix has a zero-length basis column and cannot be decomposed.
    #[error("Degenerate matrix: basis column {column} has zero length")]
    DegenerateMatrix {
        /// Index of the offending column
        column: usize,
    },

    /// The camera handle given to the renderer has no camera component.
    #[error("Game object has no camera component")]
    MissingCamera,

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// A required vertex attribute is absent from a glTF primitive.
    #[error("Missing required attribute {attribute} in mesh '{mesh}'")]
    MissingAttribute {
        /// Attribute semantic name
        attribute: &'static str,
        /// Mesh name or index
        mesh: String,
    },

    /// Asset index out of bounds.
    #[error("Asset index out of bounds: {context} (index: {index})")]
    AssetIndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for EmberError {
    fn from(err: image::ImageError) -> Self {
        EmberError::ImageDecode(err.to_string())
    }
}

impl From<gltf::Error> for EmberError {
    fn from(err: gltf::Error) -> Self {
        EmberError::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, EmberError>`.
pub type Result<T> = std::result::Result<T, EmberError>;
