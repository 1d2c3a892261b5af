//! Persisted animation properties
//!
//! Opacity and rotation are not part of every target's native state, so the
//! engine keeps them in a small typed side-store owned by the target. Values
//! persist across animations: a fade that ends at 0.3 leaves 0.3 behind, and
//! the next fade on the same target starts from there instead of snapping
//! back to fully opaque.

/// Typed side-store for properties a target has no native fields for.
///
/// Absent values read as their defaults: opacity 1.0 (fully opaque),
/// rotation 0.0 radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PropertyStore {
    opacity: Option<f32>,
    rotation: Option<f32>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current opacity, 1.0 when never set
    pub fn opacity(&self) -> f32 {
        self.opacity.unwrap_or(1.0)
    }

    /// Current rotation in radians, 0.0 when never set
    pub fn rotation(&self) -> f32 {
        self.rotation.unwrap_or(0.0)
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = Some(opacity);
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = Some(radians);
    }

    /// True if neither property has ever been written
    pub fn is_empty(&self) -> bool {
        self.opacity.is_none() && self.rotation.is_none()
    }

    /// Forget both properties, restoring the defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
