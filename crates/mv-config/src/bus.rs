//! Process-wide compiler configuration with change notification.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::mermaid::MermaidConfig;

type Listener = Arc<dyn Fn(&MermaidConfig) + Send + Sync>;

#[derive(Default)]
struct BusState {
    config: MermaidConfig,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

/// Current compiler configuration plus its subscribers.
///
/// Clones share state. Listeners run on the thread calling
/// [`set_config`](Self::set_config), after the internal lock is released, so a
/// listener may read the bus or subscribe again.
#[derive(Clone, Default)]
pub struct ConfigBus {
    state: Arc<Mutex<BusState>>,
}

impl fmt::Debug for ConfigBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConfigBus")
            .field("config", &state.config)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl ConfigBus {
    #[must_use]
    pub fn new(initial: MermaidConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState {
                config: initial,
                ..BusState::default()
            })),
        }
    }

    /// Snapshot of the current configuration.
    #[must_use]
    pub fn config(&self) -> MermaidConfig {
        self.state.lock().config.clone()
    }

    /// Shallow-merge `partial` and broadcast the merged configuration.
    pub fn set_config(&self, partial: &MermaidConfig) -> MermaidConfig {
        let (merged, listeners) = {
            let mut state = self.state.lock();
            state.config.merge(partial);
            let listeners: Vec<Listener> =
                state.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (state.config.clone(), listeners)
        };

        tracing::debug!(listeners = listeners.len(), "Broadcasting compiler config");
        for listener in listeners {
            listener(&merged);
        }
        merged
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        listener: impl Fn(&MermaidConfig) + Send + Sync + 'static,
    ) -> Subscription {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            bus: Arc::downgrade(&self.state),
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }
}

/// Disposer for a bus listener.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<Mutex<BusState>>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.bus.upgrade() {
            state.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
