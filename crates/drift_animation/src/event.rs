//! Time-triggered one-shot events
//!
//! Events fire once the manager's total elapsed time crosses their
//! threshold, then become inert. The dispatcher is a clonable handle over a
//! mutex-guarded list, so callers can register events from any context while
//! the tick loop iterates. Actions run after the list lock is released, so
//! an action can itself register new events or animations without
//! deadlocking.

use std::sync::{Arc, Mutex};

type Action = Box<dyn FnOnce() + Send>;

/// A one-shot callback with a trigger threshold on the manager's timeline
pub struct Event {
    trigger_time: f32,
    action: Option<Action>,
    fired: bool,
}

impl Event {
    /// Create an event that fires once total elapsed time reaches
    /// `trigger_time` seconds
    pub fn new<F>(trigger_time: f32, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            trigger_time,
            action: Some(Box::new(action)),
            fired: false,
        }
    }

    pub fn trigger_time(&self) -> f32 {
        self.trigger_time
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Take the action if due and not yet fired, marking it fired
    fn take_due(&mut self, total_elapsed: f32) -> Option<Action> {
        if self.fired || total_elapsed < self.trigger_time {
            return None;
        }
        self.fired = true;
        self.action.take()
    }
}

/// Holds registered events and fires the ones whose threshold has been
/// crossed. Clones share the same underlying collection.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event. Events are retained for the life of the
    /// dispatcher and fire at most once.
    pub fn add_event(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    /// Fire every unfired event whose threshold `total_elapsed` has
    /// crossed, in registration order.
    ///
    /// Idempotent: re-passing the same or a later time never fires an
    /// event twice.
    pub fn update(&self, total_elapsed: f32) {
        let due: Vec<Action> = {
            let mut events = self.events.lock().unwrap();
            events
                .iter_mut()
                .filter_map(|event| event.take_due(total_elapsed))
                .collect()
        };

        if !due.is_empty() {
            tracing::debug!(count = due.len(), total_elapsed, "firing timed events");
        }
        for action in due {
            action();
        }
    }

    /// Number of registered events, fired or not
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Number of events still waiting on their threshold
    pub fn pending_count(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| !event.has_fired())
            .count()
    }
}
