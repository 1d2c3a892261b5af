//! Animation manager
//!
//! Owns the live animation set, one event dispatcher, and the tick source.
//! Each tick advances every live animation, merges the outputs of
//! animations that share a target (last-writer-wins per field, in
//! registration order), applies each merged record to its target in one
//! batch, drops finished animations, and fires due events.
//!
//! The manager is a single logical timeline: the tick is the only writer of
//! target state. Registration calls may come from any thread; they append
//! under the same mutex the tick holds, so they can never corrupt an
//! in-progress iteration.

use crate::animation::{Animation, Domain, Frame};
use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::event::EventDispatcher;
use drift_core::{lock_target, Point, RepaintScope, SharedTarget};
use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to a registered animation
    pub struct AnimationId;
}

/// Default tick interval: 16 ms, roughly 60 updates per second
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

struct ManagerInner {
    animations: SlotMap<AnimationId, Animation>,
    /// Registration order of the live set. Slot reuse in the map must not
    /// perturb merge order, so order is tracked explicitly.
    order: Vec<AnimationId>,
    total_elapsed: f32,
    last_tick: Instant,
}

/// Schedules and applies property animations on a fixed tick
pub struct AnimationManager {
    inner: Arc<Mutex<ManagerInner>>,
    events: EventDispatcher,
    tick_interval: Duration,
    stop_flag: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl AnimationManager {
    /// Create a manager with the default 16 ms tick interval.
    ///
    /// The tick thread is not running until [`start`](Self::start) is
    /// called; until then time can be driven manually with
    /// [`advance`](Self::advance).
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_TICK_INTERVAL_MS)
    }

    /// Create a manager that ticks every `interval_ms` milliseconds once
    /// started (shorter = smoother, but more CPU)
    pub fn with_interval(interval_ms: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManagerInner {
                animations: SlotMap::with_key(),
                order: Vec::new(),
                total_elapsed: 0.0,
                last_tick: Instant::now(),
            })),
            events: EventDispatcher::new(),
            tick_interval: Duration::from_millis(interval_ms),
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start the background tick thread.
    ///
    /// Pending animations and total elapsed time are untouched; a manager
    /// stopped and restarted resumes where it left off, without replaying
    /// the wall-clock time spent stopped.
    pub fn start(&mut self) {
        if self.thread_handle.is_some() {
            return;
        }
        self.stop_flag.store(false, Ordering::Relaxed);
        self.inner.lock().unwrap().last_tick = Instant::now();

        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        let stop_flag = Arc::clone(&self.stop_flag);
        let tick_interval = self.tick_interval;

        tracing::debug!(?tick_interval, "starting animation tick thread");
        self.thread_handle = Some(thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                let started = Instant::now();
                run_tick(&inner, &events);

                let spent = started.elapsed();
                if spent < tick_interval {
                    thread::sleep(tick_interval - spent);
                }
            }
        }));
    }

    /// Stop the background tick thread without clearing pending animations
    /// or resetting elapsed time
    pub fn stop(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            tracing::debug!("stopping animation tick thread");
            self.stop_flag.store(true, Ordering::Relaxed);
            let _ = handle.join();
            self.stop_flag.store(false, Ordering::Relaxed);
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Run one tick using wall-clock time since the previous tick
    pub fn tick(&self) {
        run_tick(&self.inner, &self.events);
    }

    /// Run one tick with an explicit time step in seconds.
    ///
    /// This is the deterministic entry point: embedders with their own
    /// frame loop, and tests, drive time through here instead of the
    /// background thread.
    pub fn advance(&self, delta: f32) {
        let total = {
            let mut inner = self.inner.lock().unwrap();
            inner.last_tick = Instant::now();
            step(&mut inner, delta);
            inner.total_elapsed
        };
        self.events.update(total);
    }

    /// Animate the target's top-left position to `to`
    pub fn animate_move(
        &self,
        target: &SharedTarget,
        to: Point,
        duration: f32,
        easing: Easing,
    ) -> Result<AnimationId> {
        validate_duration(duration)?;
        let mut inner = self.inner.lock().unwrap();
        let from = lock_target(target).position();
        tracing::debug!(?from, ?to, duration, ?easing, "registering move animation");
        let animation = Animation::new(target.clone(), Domain::Move { from, to }, duration, easing);
        Ok(push(&mut inner, animation))
    }

    /// Animate the target's size by relative multipliers (1.0 = unchanged),
    /// anchored at the center of its current box
    pub fn animate_scale(
        &self,
        target: &SharedTarget,
        to_scale_x: f32,
        to_scale_y: f32,
        duration: f32,
        easing: Easing,
    ) -> Result<AnimationId> {
        validate_duration(duration)?;
        let mut inner = self.inner.lock().unwrap();
        let (origin, start_size) = {
            let guard = lock_target(target);
            (guard.position(), guard.size())
        };
        tracing::debug!(
            to_scale_x,
            to_scale_y,
            duration,
            ?easing,
            "registering scale animation"
        );
        let domain = Domain::Scale {
            origin,
            start_size,
            to_scale_x,
            to_scale_y,
        };
        Ok(push(&mut inner, Animation::new(target.clone(), domain, duration, easing)))
    }

    /// Animate the target's persisted opacity to `to_opacity`.
    ///
    /// The start value is whatever opacity the target's property store last
    /// held (1.0 if never set), so back-to-back fades chain smoothly.
    pub fn animate_fade(
        &self,
        target: &SharedTarget,
        to_opacity: f32,
        duration: f32,
        easing: Easing,
    ) -> Result<AnimationId> {
        validate_duration(duration)?;
        let mut inner = self.inner.lock().unwrap();
        let from = {
            let mut guard = lock_target(target);
            guard
                .property_store()
                .ok_or(AnimationError::UnsupportedCapability("fade"))?
                .opacity()
        };
        tracing::debug!(from, to_opacity, duration, ?easing, "registering fade animation");
        let domain = Domain::Fade {
            from,
            to: to_opacity,
        };
        Ok(push(&mut inner, Animation::new(target.clone(), domain, duration, easing)))
    }

    /// Animate the target's persisted rotation to `to_degrees`, converted
    /// to radians once at registration
    pub fn animate_rotate(
        &self,
        target: &SharedTarget,
        to_degrees: f32,
        duration: f32,
        easing: Easing,
    ) -> Result<AnimationId> {
        validate_duration(duration)?;
        let mut inner = self.inner.lock().unwrap();
        let (origin, from) = {
            let mut guard = lock_target(target);
            let origin = guard.position();
            let from = guard
                .property_store()
                .ok_or(AnimationError::UnsupportedCapability("rotation"))?
                .rotation();
            (origin, from)
        };
        tracing::debug!(from, to_degrees, duration, ?easing, "registering rotate animation");
        let domain = Domain::Rotate {
            origin,
            from,
            to: to_degrees.to_radians(),
        };
        Ok(push(&mut inner, Animation::new(target.clone(), domain, duration, easing)))
    }

    /// The manager's event dispatcher; clones share the same collection,
    /// so this is how callers register timed events
    pub fn event_dispatcher(&self) -> EventDispatcher {
        self.events.clone()
    }

    /// Number of live (unfinished) animations
    pub fn animation_count(&self) -> usize {
        self.inner.lock().unwrap().order.len()
    }

    /// Seconds accumulated across all ticks since construction
    pub fn total_elapsed(&self) -> f32 {
        self.inner.lock().unwrap().total_elapsed
    }
}

impl Default for AnimationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AnimationManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn validate_duration(duration: f32) -> Result<()> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(AnimationError::InvalidDuration(duration));
    }
    Ok(())
}

fn push(inner: &mut ManagerInner, animation: Animation) -> AnimationId {
    let id = inner.animations.insert(animation);
    inner.order.push(id);
    id
}

fn run_tick(inner: &Mutex<ManagerInner>, events: &EventDispatcher) {
    let total = {
        let mut inner = inner.lock().unwrap();
        let now = Instant::now();
        let delta = (now - inner.last_tick).as_secs_f32();
        inner.last_tick = now;
        step(&mut inner, delta);
        inner.total_elapsed
    };
    // Actions run with the manager lock released, so they may register
    // further animations or events.
    events.update(total);
}

/// One update pass over the live set: advance, group, merge, apply, prune
fn step(inner: &mut ManagerInner, delta: f32) {
    inner.total_elapsed += delta;

    let ManagerInner {
        animations, order, ..
    } = inner;

    // Group by target identity, preserving registration order both across
    // groups and within each group. Within a group, later registrations win
    // contested fields.
    let mut groups: IndexMap<usize, Vec<AnimationId>> = IndexMap::new();
    for &id in order.iter() {
        if let Some(animation) = animations.get(id) {
            groups.entry(animation.group_key()).or_default().push(id);
        }
    }

    for ids in groups.values() {
        let mut merged = Frame::default();
        for &id in ids {
            if let Some(animation) = animations.get_mut(id) {
                animation.advance(delta);
                merged.merge(animation.frame());
            }
        }
        let target = animations[ids[0]].target().clone();
        apply_frame(&target, merged);
    }

    // Prune only after the terminal frame (progress = 1) has been applied
    order.retain(|&id| match animations.get(id) {
        Some(animation) if animation.is_finished() => {
            animations.remove(id);
            false
        }
        Some(_) => true,
        None => false,
    });
}

/// Apply a merged record to the target in one batch: bounds first (position
/// and size together when both are present), then opacity, then rotation,
/// then a single repaint request
fn apply_frame(target: &SharedTarget, frame: Frame) {
    if frame.is_empty() {
        return;
    }
    let mut guard = lock_target(target);

    match (frame.position, frame.size) {
        (Some(position), Some(size)) => guard.set_bounds(position, size),
        (Some(position), None) => guard.set_position(position),
        (None, Some(size)) => guard.set_size(size),
        (None, None) => {}
    }

    if let Some(opacity) = frame.opacity {
        if let Some(store) = guard.property_store() {
            store.set_opacity(opacity);
        }
    }
    if let Some(rotation) = frame.rotation {
        if let Some(store) = guard.property_store() {
            store.set_rotation(rotation);
        }
    }

    // Rotated bounds can exceed the original box, so the parent has to
    // repaint too or stale pixels are left behind.
    let scope = if frame.rotation.is_some() {
        RepaintScope::Parent
    } else {
        RepaintScope::Local
    };
    guard.request_repaint(scope);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use drift_core::{shared, AnimationTarget, BasicTarget, Size};
    use std::sync::atomic::AtomicU32;

    /// A target with no property store, for capability-mismatch tests
    struct BareRect {
        position: Point,
        size: Size,
    }

    impl AnimationTarget for BareRect {
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
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let manager = AnimationManager::new();
        let target = shared(BasicTarget::new(0.0, 0.0, 10.0, 10.0));

        for bad in [0.0, -1.0, f32::NAN] {
            let result = manager.animate_move(&target, Point::new(5.0, 5.0), bad, Easing::Linear);
            assert!(matches!(result, Err(AnimationError::InvalidDuration(_))));
        }
        assert_eq!(manager.animation_count(), 0);
    }

    #[test]
    fn test_fade_requires_property_store() {
        let manager = AnimationManager::new();
        let target = shared(BareRect {
            position: Point::ZERO,
            size: Size::new(10.0, 10.0),
        });

        let fade = manager.animate_fade(&target, 0.0, 1.0, Easing::Linear);
        assert!(matches!(
            fade,
            Err(AnimationError::UnsupportedCapability("fade"))
        ));

        let rotate = manager.animate_rotate(&target, 90.0, 1.0, Easing::Linear);
        assert!(matches!(
            rotate,
            Err(AnimationError::UnsupportedCapability("rotation"))
        ));

        // Move still works on a store-less target
        assert!(manager
            .animate_move(&target, Point::new(5.0, 5.0), 1.0, Easing::Linear)
            .is_ok());
    }

    #[test]
    fn test_finished_animations_are_removed_after_terminal_apply() {
        let manager = AnimationManager::new();
        let target = shared(BasicTarget::new(0.0, 0.0, 10.0, 10.0));
        manager
            .animate_move(&target, Point::new(100.0, 0.0), 1.0, Easing::Linear)
            .unwrap();

        manager.advance(0.5);
        assert_eq!(manager.animation_count(), 1);

        manager.advance(0.5);
        assert_eq!(manager.animation_count(), 0);
        assert_eq!(
            lock_target(&target).position(),
            Point::new(100.0, 0.0)
        );
    }

    #[test]
    fn test_overshooting_delta_still_lands_on_end_value() {
        let manager = AnimationManager::new();
        let target = shared(BasicTarget::new(0.0, 0.0, 10.0, 10.0));
        manager
            .animate_move(&target, Point::new(100.0, 40.0), 1.0, Easing::EaseInOutCubic)
            .unwrap();

        manager.advance(10.0);
        assert_eq!(manager.animation_count(), 0);
        assert_eq!(lock_target(&target).position(), Point::new(100.0, 40.0));
    }

    #[test]
    fn test_later_registration_wins_contested_field() {
        let manager = AnimationManager::new();
        let target = shared(BasicTarget::new(0.0, 0.0, 10.0, 10.0));

        manager
            .animate_move(&target, Point::new(100.0, 0.0), 1.0, Easing::Linear)
            .unwrap();
        manager
            .animate_move(&target, Point::new(0.0, 100.0), 1.0, Easing::Linear)
            .unwrap();

        manager.advance(0.5);
        assert_eq!(lock_target(&target).position(), Point::new(0.0, 50.0));
    }

    #[test]
    fn test_total_elapsed_accumulates_and_survives_stop() {
        let mut manager = AnimationManager::new();
        manager.advance(1.0);
        manager.advance(0.5);
        assert!((manager.total_elapsed() - 1.5).abs() < 1e-6);

        manager.stop();
        assert!((manager.total_elapsed() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_events_fire_from_tick() {
        let manager = AnimationManager::new();
        let count = Arc::new(AtomicU32::new(0));

        let c = Arc::clone(&count);
        manager
            .event_dispatcher()
            .add_event(Event::new(1.0, move || {
                c.fetch_add(1, Ordering::SeqCst);
            }));

        manager.advance(0.5);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        manager.advance(0.5);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_background_thread_advances_time() {
        let mut manager = AnimationManager::with_interval(5);
        let target = shared(BasicTarget::new(0.0, 0.0, 10.0, 10.0));
        manager
            .animate_move(&target, Point::new(100.0, 0.0), 0.05, Easing::Linear)
            .unwrap();

        manager.start();
        assert!(manager.is_running());
        thread::sleep(Duration::from_millis(150));
        manager.stop();
        assert!(!manager.is_running());

        assert!(manager.total_elapsed() > 0.05);
        assert_eq!(manager.animation_count(), 0);
        assert_eq!(lock_target(&target).position(), Point::new(100.0, 0.0));
    }

    /// Wraps a [`BasicTarget`] and records every repaint scope it receives
    struct Recorder {
        target: BasicTarget,
        scopes: Arc<Mutex<Vec<RepaintScope>>>,
    }

    impl AnimationTarget for Recorder {
        fn position(&self) -> Point {
            self.target.position()
        }
        fn set_position(&mut self, position: Point) {
            self.target.set_position(position);
        }
        fn size(&self) -> Size {
            self.target.size()
        }
        fn set_size(&mut self, size: Size) {
            self.target.set_size(size);
        }
        fn property_store(&mut self) -> Option<&mut drift_core::PropertyStore> {
            self.target.property_store()
        }
        fn request_repaint(&mut self, scope: RepaintScope) {
            self.scopes.lock().unwrap().push(scope);
        }
    }

    #[test]
    fn test_rotation_requests_parent_repaint_once_per_tick() {
        let manager = AnimationManager::new();
        let scopes = Arc::new(Mutex::new(Vec::new()));
        let target = shared(Recorder {
            target: BasicTarget::new(0.0, 0.0, 10.0, 10.0),
            scopes: Arc::clone(&scopes),
        });

        manager
            .animate_rotate(&target, 180.0, 1.0, Easing::Linear)
            .unwrap();
        manager
            .animate_fade(&target, 0.0, 1.0, Easing::Linear)
            .unwrap();

        manager.advance(0.5);

        // Both animations share the target, so the merged state is applied
        // with one repaint, parent-scoped because rotation changed.
        assert_eq!(*scopes.lock().unwrap(), vec![RepaintScope::Parent]);

        let rotation = lock_target(&target)
            .property_store()
            .map(|store| store.rotation())
            .unwrap();
        assert!((rotation - std::f32::consts::PI / 2.0).abs() < 1e-5);
    }
}
