//! Drift Core Types
//!
//! Foundational types shared by the animation engine and target adapters:
//!
//! - **Geometry**: 2D points and sizes with linear interpolation
//! - **Persisted Properties**: the typed side-store for opacity/rotation
//! - **Target Contract**: the capability trait animatable objects implement
//!
//! # Example
//!
//! ```rust
//! use drift_core::{shared, AnimationTarget, BasicTarget, Point};
//!
//! let target = shared(BasicTarget::new(0.0, 0.0, 100.0, 50.0));
//! let position = target.lock().unwrap().position();
//! assert_eq!(position, Point::ZERO);
//! ```

pub mod geometry;
pub mod store;
pub mod target;

pub use geometry::{Interpolate, Point, Size};
pub use store::PropertyStore;
pub use target::{
    lock_target, shared, target_key, AnimationTarget, BasicTarget, RepaintScope, SharedTarget,
};
