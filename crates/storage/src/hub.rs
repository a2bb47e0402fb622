//! Change fan-out between contexts of one origin

use app_platform::{StorageEvent, StorageListener, Subscription};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

struct Registration {
    context: u64,
    id: u64,
    listener: StorageListener,
}

#[derive(Default)]
struct HubState {
    next_id: u64,
    registrations: Vec<Registration>,
}

/// Delivers each write to every context except the one that made it
#[derive(Default)]
pub(crate) struct ContextHub {
    next_context: AtomicU64,
    state: Arc<Mutex<HubState>>,
}

impl ContextHub {
    pub(crate) fn register_context(&self) -> u64 {
        self.next_context.fetch_add(1, Ordering::AcqRel)
    }

    pub(crate) fn listen(&self, context: u64, listener: StorageListener) -> Subscription {
        let id = {
            let mut state = self.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.registrations.push(Registration { context, id, listener });
            id
        };

        let weak: Weak<Mutex<HubState>> = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.lock().registrations.retain(|r| r.id != id);
            }
        })
    }

    pub(crate) fn broadcast(&self, origin: u64, event: StorageEvent) {
        let listeners: Vec<StorageListener> = self
            .state
            .lock()
            .registrations
            .iter()
            .filter(|r| r.context != origin)
            .map(|r| r.listener.clone())
            .collect();

        for listener in listeners {
            listener(&event);
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.state.lock().registrations.len()
    }
}
