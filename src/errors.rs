//! Error Types
//!
//! This module defines the error types used throughout the pose engine.
//!
//! # Overview
//!
//! The main error type [`PoseError`] covers the failure modes of the
//! blending core:
//! - Out-of-range keyframe writes
//! - Lookups that a mutating operation depends on (channel, node, animation)
//! - Allocation failure while growing a frame buffer or binding a model
//!
//! Plain lookups (`find_node`, `get_channel`, getters on unknown channel ids)
//! are not errors; they return `Option` or a default value.
//!
//! # Usage
//!
//! Fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, PoseError>`.
//!
//! ```rust,ignore
//! use pose::errors::{PoseError, Result};
//!
//! fn write_key(anim: &mut Animation) -> Result<()> {
//!     anim.set_transform("root", 3, 1.0, &Transform::IDENTITY)?;
//!     Ok(())
//! }
//! ```

use std::collections::TryReserveError;

use thiserror::Error;

/// The main error type for the pose engine.
#[derive(Error, Debug)]
pub enum PoseError {
    // ========================================================================
    // Keyframe Errors
    // ========================================================================
    /// A frame index past the end of the animation was written.
    #[error("Frame {frame} out of range (animation length: {length})")]
    FrameOutOfRange {
        /// The rejected frame index
        frame: usize,
        /// Current number of frames in the animation
        length: usize,
    },

    /// The frame buffer does not match `channels * length`.
    #[error("Frame grid mismatch: expected {expected} frames, got {actual}")]
    FrameGridMismatch {
        /// `channels * length`
        expected: usize,
        /// Frames actually supplied
        actual: usize,
    },

    /// `channels * length` does not fit in `usize`.
    #[error("Frame grid too large: {channels} channels x {length} frames")]
    FrameGridOverflow {
        /// Channel count of the grid
        channels: usize,
        /// Requested number of frames
        length: usize,
    },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// The animation has no channel with this name.
    #[error("Animation channel not found: {0}")]
    ChannelNotFound(String),

    /// The pose has no playback channel with this id.
    #[error("Pose channel not found: {0}")]
    PoseChannelNotFound(u32),

    /// No node with this name exists in the tree.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The bound model has no animation with this name.
    #[error("Animation not found: {0}")]
    AnimationNotFound(String),

    /// The operation needs a bound model.
    #[error("No model bound to the pose")]
    ModelNotBound,

    /// A node handle does not belong to the tree (removed or foreign).
    #[error("Invalid node handle")]
    InvalidNode,

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Reserving memory for a buffer failed; nothing was modified.
    #[error("Allocation failed for {what} ({requested} elements): {source}")]
    AllocationFailed {
        /// What was being grown
        what: &'static str,
        /// Number of elements requested
        requested: usize,
        /// Underlying allocator error
        #[source]
        source: TryReserveError,
    },
}

impl PoseError {
    pub(crate) fn alloc(what: &'static str, requested: usize, source: TryReserveError) -> Self {
        PoseError::AllocationFailed {
            what,
            requested,
            source,
        }
    }
}

/// Alias for `Result<T, PoseError>`.
pub type Result<T> = std::result::Result<T, PoseError>;
