//! Scoped event registrations
//!
//! Every listener registered with a host or a state component is paired with
//! a [`Subscription`] guard. Dropping the guard unregisters the listener, so
//! teardown happens on every exit path of the owner.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Cancel = Box<dyn FnOnce() + Send + Sync>;

/// Guard for a registered listener; unregisters on drop
#[must_use = "dropping a Subscription immediately unregisters the listener"]
pub struct Subscription {
    cancel: Option<Cancel>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` when released
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// A subscription with nothing to release
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Release the registration now
    pub fn cancel(mut self) {
        self.release();
    }

    /// Whether releasing this guard still has an effect
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

type Listener<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Slots<A> {
    next_id: u64,
    entries: Vec<(u64, Listener<A>)>,
}

/// Registry of synchronous listeners for events of type `A`
///
/// Listeners are invoked in registration order. The registry lock is not held
/// while a listener runs, so listeners may register, unregister, or emit.
pub struct Listeners<A> {
    slots: Arc<Mutex<Slots<A>>>,
}

impl<A: 'static> Listeners<A> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots { next_id: 0, entries: Vec::new() })),
        }
    }

    /// Register a listener
    pub fn add(&self, listener: impl Fn(&A) + Send + Sync + 'static) -> Subscription {
        self.add_shared(Arc::new(listener))
    }

    /// Register an already shared listener
    pub fn add_shared(&self, listener: Arc<dyn Fn(&A) + Send + Sync>) -> Subscription {
        let id = {
            let mut slots = self.slots.lock();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.entries.push((id, listener));
            id
        };

        let weak: Weak<Mutex<Slots<A>>> = Arc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.lock().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Invoke every registered listener with `event`
    pub fn emit(&self, event: &A) {
        let snapshot: Vec<Listener<A>> = self
            .slots
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.slots.lock().entries.len()
    }

    /// Whether no listener is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A: 'static> Default for Listeners<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Listeners<A> {
    fn clone(&self) -> Self {
        Self { slots: self.slots.clone() }
    }
}
