//! Engine error types

use thiserror::Error;

/// Errors surfaced synchronously at animation registration time
#[derive(Debug, Error)]
pub enum AnimationError {
    /// Durations must be strictly positive seconds
    #[error("animation duration must be positive, got {0}")]
    InvalidDuration(f32),

    /// The target does not expose the persisted-property side-store the
    /// requested domain needs. Distinct from a bad argument: the call is
    /// well-formed, the target lacks the capability.
    #[error("target has no property store, cannot animate {0}")]
    UnsupportedCapability(&'static str),
}

pub type Result<T> = std::result::Result<T, AnimationError>;
