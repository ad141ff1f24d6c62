//! The server half of the mocked channel: rooms, broadcast fan-out, and
//! inbound dispatch.
//!
//! [`ServerSocket::new`] builds the whole pair. The server owns its single
//! [`ClientSocket`](crate::client::ClientSocket) and hands out handles via
//! [`client`](ServerSocket::client). Inbound client emissions arrive at
//! [`emit_event`](ServerSocket::emit_event), where every argument is
//! deep-copied before subscribers run. Room-scoped broadcasts travel a
//! separate channel ([`on_emit`](ServerSocket::on_emit) /
//! [`broadcast`](ServerSocket::broadcast)) and never touch the subscriber
//! bus.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use mocket_emitter::{Emitter, HandlerId};

use crate::ack::AckSender;
use crate::client::ClientSocket;
use crate::delivery::Delivery;
use crate::error::Result;
use crate::payload::copy_args;

/// Reason reported to client-side subscribers on server teardown.
const SERVER_DISCONNECT_REASON: &str = "io server disconnect";

/// The single callback registered per broadcast event key.
type BroadcastCallback = Arc<dyn Fn(&[Value], &str) + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Shared endpoint state
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) struct ServerInner {
    bus: Emitter<Delivery>,
    rooms: Mutex<Vec<String>>,
    broadcast_callbacks: Mutex<HashMap<String, BroadcastCallback>>,
    client: ClientSocket,
}

impl ServerInner {
    /// Inbound dispatch: deep-copy every argument, then notify subscribers.
    pub(crate) fn emit_event(
        &self,
        event: &str,
        args: &[Value],
        ack: Option<AckSender>,
    ) -> Result<usize> {
        let args = copy_args(args)?;
        Ok(self.bus.emit(event, &Delivery { args, ack }))
    }

    /// Broadcast path: deep-copy, then invoke the registered callback with
    /// the copied arguments and the target room. Silent no-op when nothing
    /// is registered for `event`.
    fn broadcast_emit(&self, room: &str, event: &str, args: &[Value]) -> Result<()> {
        let args = copy_args(args)?;
        let callback = self.broadcast_callbacks.lock().get(event).cloned();
        match callback {
            Some(callback) => {
                debug!(event, room, "broadcast delivered");
                callback(&args, room);
            }
            None => debug!(event, room, "broadcast had no registered callback"),
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ServerSocket
// ─────────────────────────────────────────────────────────────────────────────

/// The server half of the pair. Cloning yields another handle to the same
/// endpoint.
#[derive(Clone)]
pub struct ServerSocket {
    inner: Arc<ServerInner>,
}

impl ServerSocket {
    /// Construct a fresh server/client pair.
    ///
    /// The paired client starts connected; retrieve it with
    /// [`client`](Self::client). The server owns the client; once every
    /// server handle is dropped, client emissions fail with
    /// [`MocketError::Detached`](crate::error::MocketError::Detached).
    #[must_use]
    pub fn new() -> Self {
        let inner = Arc::new_cyclic(|server: &Weak<ServerInner>| ServerInner {
            bus: Emitter::new(),
            rooms: Mutex::new(Vec::new()),
            broadcast_callbacks: Mutex::new(HashMap::new()),
            client: ClientSocket::attached(server.clone()),
        });
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<ServerInner>) -> Self {
        Self { inner }
    }

    /// Handle to the paired client endpoint.
    #[must_use]
    pub fn client(&self) -> ClientSocket {
        self.inner.client.clone()
    }

    /// Subscribe to client→server events.
    pub fn on(
        &self,
        event: impl Into<String>,
        handler: impl Fn(&Delivery) + Send + Sync + 'static,
    ) -> HandlerId {
        self.inner.bus.on(event, handler)
    }

    /// Remove every subscriber for `event`.
    pub fn off(&self, event: &str) {
        self.inner.bus.off(event);
    }

    /// Remove a single subscriber registered with [`on`](Self::on).
    pub fn off_handler(&self, event: &str, id: HandlerId) -> bool {
        self.inner.bus.off_handler(event, id)
    }

    /// Emit an event toward the client.
    ///
    /// Arguments are forwarded unchanged (no copy) to the client's inbound
    /// dispatch. Returns the number of client-side subscribers reached.
    pub fn emit(&self, event: &str, args: Vec<Value>) -> usize {
        self.inner.client.fire_event(event, args)
    }

    /// Inbound entry point, used by the paired client's `emit`.
    ///
    /// Deep-copies every element of `args`, then invokes all subscribers
    /// registered for `event` with the copies and `ack`. Copy failures
    /// propagate to the caller. Returns the number of subscribers reached.
    pub fn emit_event(
        &self,
        event: &str,
        args: &[Value],
        ack: Option<AckSender>,
    ) -> Result<usize> {
        self.inner.emit_event(event, args, ack)
    }

    /// Join a room. Repeated joins append duplicate entries.
    pub fn join(&self, room: impl Into<String>) {
        let room = room.into();
        debug!(room = %room, "joined room");
        self.inner.rooms.lock().push(room);
    }

    /// Leave a room.
    ///
    /// Removes the first matching entry only, leaving later duplicates
    /// intact; a silent no-op when the room was never joined.
    pub fn leave(&self, room: &str) {
        let mut rooms = self.inner.rooms.lock();
        if let Some(index) = rooms.iter().position(|joined| joined == room) {
            let _ = rooms.remove(index);
            debug!(room, "left room");
        }
    }

    /// Rooms currently joined, in join order, duplicates included.
    #[must_use]
    pub fn rooms(&self) -> Vec<String> {
        self.inner.rooms.lock().clone()
    }

    /// Alias for [`rooms`](Self::rooms); both read the same backing
    /// sequence, so a `join`/`leave` is visible through either accessor.
    #[must_use]
    pub fn joined_rooms(&self) -> Vec<String> {
        self.rooms()
    }

    /// Register the callback invoked when a broadcast targets `event`.
    ///
    /// The broadcast channel carries exactly one callback per event key;
    /// a later registration replaces the earlier one.
    pub fn on_emit(
        &self,
        event: impl Into<String>,
        callback: impl Fn(&[Value], &str) + Send + Sync + 'static,
    ) {
        let _ = self
            .inner
            .broadcast_callbacks
            .lock()
            .insert(event.into(), Arc::new(callback));
    }

    /// Room-scoped broadcast sender.
    #[must_use]
    pub fn broadcast(&self) -> Broadcast {
        Broadcast {
            server: Arc::clone(&self.inner),
        }
    }

    /// Shorthand for [`broadcast().to(room)`](Broadcast::to).
    #[must_use]
    pub fn to(&self, room: impl Into<String>) -> RoomEmitter {
        RoomEmitter {
            server: Arc::clone(&self.inner),
            room: room.into(),
        }
    }

    /// Identity passthrough for observing a value mid-assertion; the value
    /// is also reported through `tracing`.
    pub fn monitor<T: fmt::Debug>(&self, value: T) -> T {
        debug!(value = ?value, "monitor");
        value
    }

    /// Emit the teardown sequence toward the client: `disconnecting`, then
    /// `disconnect`, both with reason `"io server disconnect"`.
    ///
    /// Purely a convenience trigger for code listening to those lifecycle
    /// events; rooms, callbacks, and connection flags are untouched.
    pub fn disconnect(&self) -> &Self {
        let reason = Value::from(SERVER_DISCONNECT_REASON);
        let _ = self.emit("disconnecting", vec![reason.clone()]);
        let _ = self.emit("disconnect", vec![reason]);
        self
    }
}

impl Default for ServerSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServerSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSocket")
            .field("rooms", &self.inner.rooms.lock().len())
            .field("client_connected", &self.inner.client.connected())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Broadcast channel
// ─────────────────────────────────────────────────────────────────────────────

/// Broadcast accessor: pick a room, then emit into it.
pub struct Broadcast {
    server: Arc<ServerInner>,
}

impl Broadcast {
    /// Target a room.
    #[must_use]
    pub fn to(&self, room: impl Into<String>) -> RoomEmitter {
        RoomEmitter {
            server: Arc::clone(&self.server),
            room: room.into(),
        }
    }
}

/// Emits broadcast events into a single room.
pub struct RoomEmitter {
    server: Arc<ServerInner>,
    room: String,
}

impl RoomEmitter {
    /// Deep-copy `args`, then invoke the callback registered for `event`
    /// with the copies and the room key. Silent no-op when no callback is
    /// registered; copy failures still propagate.
    pub fn emit(&self, event: &str, args: &[Value]) -> Result<()> {
        self.server.broadcast_emit(&self.room, event, args)
    }
}
