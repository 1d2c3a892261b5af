//! Drift Animation Engine
//!
//! Property animations on a fixed tick: interpolate a target's position,
//! size, opacity, or rotation from its current state to a desired end state
//! over a duration, shaped by a selectable easing curve.
//!
//! # Features
//!
//! - **Easing Library**: the full set of 35 pure easing curves
//! - **Property Domains**: move, center-anchored scale, fade, rotate
//! - **Composition**: independent animations on the same target merge
//!   field-by-field; contested fields resolve last-writer-wins in
//!   registration order
//! - **Persisted Properties**: opacity/rotation survive across animations,
//!   so successive fades and rotations chain smoothly
//! - **Timed Events**: one-shot callbacks fired when the global elapsed
//!   time crosses a threshold
//! - **Tick Source**: a background thread at a configurable interval
//!   (default 16 ms), or deterministic manual stepping
//!
//! # Example
//!
//! ```rust
//! use drift_animation::{AnimationManager, Easing};
//! use drift_core::{shared, AnimationTarget, BasicTarget, Point};
//!
//! let manager = AnimationManager::new();
//! let target = shared(BasicTarget::new(0.0, 0.0, 100.0, 50.0));
//!
//! manager
//!     .animate_move(&target, Point::new(200.0, 0.0), 2.0, Easing::EaseInOutCubic)
//!     .unwrap();
//!
//! // Drive time manually (or call `start()` for the background thread)
//! manager.advance(2.0);
//! assert_eq!(target.lock().unwrap().position(), Point::new(200.0, 0.0));
//! ```

pub mod animation;
pub mod easing;
pub mod error;
pub mod event;
pub mod manager;

pub use animation::{Animation, Domain, Frame};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use event::{Event, EventDispatcher};
pub use manager::{AnimationId, AnimationManager, DEFAULT_TICK_INTERVAL_MS};
