// Events module - Session lifecycle event registry
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Event kind used as the subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Session reached the Connected state
    Connected,
    /// Transport closed, caller- or device-initiated
    Disconnected,
    /// A raw packet was written to the transport
    PacketSent,
}

/// Session lifecycle event payloads
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Connected {
        /// Human-readable endpoint label
        endpoint_label: String,
        /// Negotiation result code reported by the handshake
        result_code: u8,
    },
    Disconnected,
    PacketSent {
        /// Raw bytes as written to the transport
        data: Vec<u8>,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::Connected { .. } => EventKind::Connected,
            SessionEvent::Disconnected => EventKind::Disconnected,
            SessionEvent::PacketSent { .. } => EventKind::PacketSent,
        }
    }
}

/// Handle returned by subscribe, used for explicit removal
pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

struct RegistryInner {
    next_id: ListenerId,
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
}

/// Subscription registry mapping event kinds to ordered listener lists.
///
/// Dispatch is synchronous and deterministic: listeners run in subscription
/// order, outside the registry lock, so a listener may subscribe or
/// unsubscribe reentrantly. Listener return values are ignored and listeners
/// are expected not to block.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Mutex<RegistryInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                next_id: 0,
                listeners: HashMap::new(),
            })),
        }
    }

    /// Register a listener for one event kind; returns its removal handle
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let mut inner = self.lock_inner();
        let id = inner.next_id;
        inner.next_id += 1;
        inner
            .listeners
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns false when the id is unknown
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.lock_inner();
        for list in inner.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Dispatch an event to every listener of its kind, in subscription order
    pub fn emit(&self, event: &SessionEvent) {
        let snapshot: Vec<Listener> = {
            let inner = self.lock_inner();
            inner
                .listeners
                .get(&event.kind())
                .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
                .unwrap_or_default()
        };

        debug!(kind = ?event.kind(), listeners = snapshot.len(), "dispatching session event");
        for listener in snapshot {
            listener(event);
        }
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
