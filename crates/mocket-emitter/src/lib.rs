//! String-keyed synchronous event emitter.
//!
//! [`Emitter`] is the publish/subscribe primitive underneath both `mocket`
//! endpoints: register handlers for a named event key, remove them, and
//! invoke every handler for a key in registration order.
//!
//! Dispatch is synchronous and re-entrant. [`Emitter::emit`] snapshots the
//! handler list and releases the registry lock before calling out, so a
//! running handler may subscribe, unsubscribe, or emit again without
//! deadlocking. Handlers are plain `Fn(&T)` closures; anything a handler
//! needs to mutate lives behind its own interior mutability.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

/// Shared handler invoked for every emission of its event key.
type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Identifier for a registered handler, returned by [`Emitter::on`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Registered<T> {
    id: HandlerId,
    handler: Handler<T>,
}

/// String-keyed event emitter with registration-order dispatch.
///
/// `T` is the payload type handed to every handler by reference. The
/// emitter itself is `Send + Sync`; handles to it are shared by reference
/// or `Arc` rather than cloned.
pub struct Emitter<T> {
    handlers: Mutex<HashMap<String, Vec<Registered<T>>>>,
    next_id: AtomicU64,
}

impl<T> Emitter<T> {
    /// Create an empty emitter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a handler for `event`.
    ///
    /// Handlers for the same key fire in registration order. The returned
    /// id removes exactly this registration via [`Emitter::off_handler`].
    pub fn on(
        &self,
        event: impl Into<String>,
        handler: impl Fn(&T) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut handlers = self.handlers.lock();
        handlers.entry(event.into()).or_default().push(Registered {
            id,
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove every handler registered for `event`.
    pub fn off(&self, event: &str) {
        let _ = self.handlers.lock().remove(event);
    }

    /// Remove a single handler by the id returned from [`Emitter::on`].
    ///
    /// Returns `true` if the handler was present.
    pub fn off_handler(&self, event: &str, id: HandlerId) -> bool {
        let mut handlers = self.handlers.lock();
        let Some(list) = handlers.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|registered| registered.id != id);
        let removed = list.len() < before;
        if list.is_empty() {
            let _ = handlers.remove(event);
        }
        removed
    }

    /// Invoke every handler registered for `event`, in registration order.
    ///
    /// Dispatch runs against a snapshot taken when `emit` is entered:
    /// handlers added or removed by a running handler take effect from the
    /// next emission. Returns the number of handlers invoked; 0 when
    /// nothing is registered for the key.
    pub fn emit(&self, event: &str, payload: &T) -> usize {
        let snapshot: Vec<Handler<T>> = {
            let handlers = self.handlers.lock();
            handlers.get(event).map_or_else(Vec::new, |list| {
                list.iter()
                    .map(|registered| Arc::clone(&registered.handler))
                    .collect()
            })
        };
        trace!(event, handlers = snapshot.len(), "dispatch");
        for handler in &snapshot {
            handler(payload);
        }
        snapshot.len()
    }

    /// Number of handlers currently registered for `event`.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.lock().get(event).map_or(0, Vec::len)
    }

    /// Remove every handler for every event.
    pub fn clear(&self) {
        self.handlers.lock().clear();
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.lock();
        f.debug_struct("Emitter")
            .field("events", &handlers.len())
            .field("handlers", &handlers.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
