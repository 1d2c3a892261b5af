//! The animatable target contract
//!
//! The engine does not know how a target is drawn. It only needs a small
//! capability surface: readable/writable position and size, an optional
//! [`PropertyStore`] for persisted opacity/rotation, and a repaint
//! notification fired after merged state has been applied. Adapters for a
//! concrete UI toolkit implement [`AnimationTarget`] and hand the engine a
//! [`SharedTarget`].

use crate::geometry::{Point, Size};
use crate::store::PropertyStore;
use std::sync::{Arc, Mutex, MutexGuard};

/// How much of the scene a repaint request covers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepaintScope {
    /// Only the target itself changed
    Local,
    /// The parent container must repaint too (rotated bounds can exceed
    /// the original box and leave stale pixels behind)
    Parent,
}

/// Capability contract every animatable object implements
pub trait AnimationTarget: Send {
    fn position(&self) -> Point;
    fn set_position(&mut self, position: Point);

    fn size(&self) -> Size;
    fn set_size(&mut self, size: Size);

    /// Apply position and size together as one batch, avoiding an
    /// intermediate frame where only one of the two has changed
    fn set_bounds(&mut self, position: Point, size: Size) {
        self.set_position(position);
        self.set_size(size);
    }

    /// Side-store for persisted opacity/rotation. Targets without one
    /// return `None`; fade and rotate animations on such a target are
    /// rejected at registration time.
    fn property_store(&mut self) -> Option<&mut PropertyStore> {
        None
    }

    /// Called once per tick after all merged state has been applied
    fn request_repaint(&mut self, _scope: RepaintScope) {}
}

/// A target shared between its owner and the animation manager
pub type SharedTarget = Arc<Mutex<dyn AnimationTarget>>;

/// Wrap a target for registration with the animation manager
pub fn shared<T: AnimationTarget + 'static>(target: T) -> SharedTarget {
    Arc::new(Mutex::new(target))
}

/// Lock a shared target, recovering from a poisoned lock.
///
/// A panic in some other holder of the target must not take the whole
/// animation loop down with it; the numeric state is still usable.
pub fn lock_target(target: &SharedTarget) -> MutexGuard<'_, dyn AnimationTarget + 'static> {
    target.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("animation target lock was poisoned; continuing with inner state");
        poisoned.into_inner()
    })
}

/// Pointer identity of a shared target, used to group animations that
/// address the same object
pub fn target_key(target: &SharedTarget) -> usize {
    Arc::as_ptr(target) as *const () as usize
}

/// A headless rectangle target with its own property store.
///
/// Useful as a test double and for driving animations on objects that have
/// no UI toolkit behind them. Repaint requests are counted so tests can
/// assert on batching behavior.
#[derive(Debug, Default)]
pub struct BasicTarget {
    position: Point,
    size: Size,
    store: PropertyStore,
    repaints: u32,
    parent_repaints: u32,
}

impl BasicTarget {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Point::new(x, y),
            size: Size::new(width, height),
            ..Self::default()
        }
    }

    pub fn opacity(&self) -> f32 {
        self.store.opacity()
    }

    pub fn rotation(&self) -> f32 {
        self.store.rotation()
    }

    /// Total repaint requests received (local and parent-scoped)
    pub fn repaint_count(&self) -> u32 {
        self.repaints
    }

    /// Repaint requests that included the parent container
    pub fn parent_repaint_count(&self) -> u32 {
        self.parent_repaints
    }
}

impl AnimationTarget for BasicTarget {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn size(&self) -> Size {
        self.size
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn property_store(&mut self) -> Option<&mut PropertyStore> {
        Some(&mut self.store)
    }

    fn request_repaint(&mut self, scope: RepaintScope) {
        self.repaints += 1;
        if scope == RepaintScope::Parent {
            self.parent_repaints += 1;
        }
    }
}
