//! The client half of the mocked channel.
//!
//! [`ClientSocket`] stands in for the application-facing side of a push
//! channel: subscribe to server events with [`on`](ClientSocket::on), send
//! events (optionally with an acknowledgement callback) with
//! [`emit`](ClientSocket::emit), and tear down with
//! [`close`](ClientSocket::close). Instances are created only by
//! [`ServerSocket::new`](crate::server::ServerSocket::new); the pair is
//! built together and the client holds a non-owning back-reference.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use serde_json::Value;
use tracing::debug;

use mocket_emitter::{Emitter, HandlerId};

use crate::ack::{AckCallback, AckSender};
use crate::delivery::Delivery;
use crate::error::{MocketError, Result};
use crate::server::{ServerInner, ServerSocket};

/// Reason reported to server-side subscribers when the client closes.
const CLIENT_DISCONNECT_REASON: &str = "io client disconnect";

// ─────────────────────────────────────────────────────────────────────────────
// EmitArgs — outbound argument disambiguation
// ─────────────────────────────────────────────────────────────────────────────

/// Arguments for an outbound client emission.
///
/// Socket.IO's JavaScript API treats a trailing callable argument as an
/// acknowledgement callback; here that duck-typing becomes an explicit
/// tagged union: either positional arguments alone, or positional
/// arguments plus a trailing acknowledgement callback.
pub enum EmitArgs {
    /// Positional arguments only.
    Plain(Vec<Value>),
    /// Positional arguments plus an acknowledgement callback. The callback
    /// runs synchronously, at most once, when a subscriber acknowledges.
    WithAck(Vec<Value>, AckCallback),
}

impl EmitArgs {
    /// An emission carrying no arguments.
    #[must_use]
    pub fn none() -> Self {
        Self::Plain(Vec::new())
    }

    /// Attach an acknowledgement callback to `args`.
    #[must_use]
    pub fn with_ack(args: Vec<Value>, ack: impl FnOnce(Value) + Send + 'static) -> Self {
        Self::WithAck(args, Box::new(ack))
    }
}

impl From<Vec<Value>> for EmitArgs {
    fn from(args: Vec<Value>) -> Self {
        Self::Plain(args)
    }
}

impl From<Value> for EmitArgs {
    fn from(arg: Value) -> Self {
        Self::Plain(vec![arg])
    }
}

impl From<()> for EmitArgs {
    fn from(_: ()) -> Self {
        Self::none()
    }
}

impl fmt::Debug for EmitArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(args) => f.debug_tuple("Plain").field(args).finish(),
            Self::WithAck(args, _) => f.debug_tuple("WithAck").field(args).field(&"..").finish(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ClientSocket
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) struct ClientInner {
    bus: Emitter<Delivery>,
    server: Weak<ServerInner>,
    connected: AtomicBool,
}

/// The client half of the pair. Cloning yields another handle to the same
/// endpoint.
#[derive(Clone)]
pub struct ClientSocket {
    inner: Arc<ClientInner>,
}

impl ClientSocket {
    /// Build the client half against its server's shared state.
    ///
    /// The client starts connected; there is no reconnect path, so once
    /// [`close`](Self::close) runs the instance is terminal.
    pub(crate) fn attached(server: Weak<ServerInner>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                bus: Emitter::new(),
                server,
                connected: AtomicBool::new(true),
            }),
        }
    }

    /// Subscribe to server→client events.
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

    /// Emit an event toward the server.
    ///
    /// Accepts anything convertible into [`EmitArgs`]: a single [`Value`],
    /// a `Vec<Value>` of positional arguments, `()` for no arguments, or an
    /// explicit [`EmitArgs::WithAck`]. Arguments are deep-copied by the
    /// server's inbound dispatch; copy failures propagate here. Returns the
    /// number of server-side subscribers reached.
    pub fn emit(&self, event: &str, args: impl Into<EmitArgs>) -> Result<usize> {
        let server = self.inner.server.upgrade().ok_or(MocketError::Detached)?;
        let (args, ack) = match args.into() {
            EmitArgs::Plain(args) => (args, None),
            EmitArgs::WithAck(args, callback) => (args, Some(AckSender::new(callback))),
        };
        server.emit_event(event, &args, ack)
    }

    /// Emit with a trailing acknowledgement callback.
    ///
    /// Shorthand for [`emit`](Self::emit) with [`EmitArgs::with_ack`].
    pub fn emit_with_ack(
        &self,
        event: &str,
        args: Vec<Value>,
        ack: impl FnOnce(Value) + Send + 'static,
    ) -> Result<usize> {
        self.emit(event, EmitArgs::with_ack(args, ack))
    }

    /// Inbound dispatch, used by the paired server's `emit`.
    ///
    /// Arguments are delivered to subscribers unchanged; only
    /// client→server traffic is serialized, and that asymmetry is part of
    /// the contract. Returns the number of subscribers reached.
    pub fn fire_event(&self, event: &str, args: Vec<Value>) -> usize {
        self.inner.bus.emit(event, &Delivery::plain(args))
    }

    /// Whether the client is nominally connected.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.inner.connected.load(Ordering::Relaxed)
    }

    /// Whether the client has been closed. Always the opposite of
    /// [`connected`](Self::connected).
    #[must_use]
    pub fn disconnected(&self) -> bool {
        !self.connected()
    }

    /// Close the socket.
    ///
    /// Flips the connection flags, then notifies server-side subscribers of
    /// `disconnect` with reason `"io client disconnect"`. Terminal: there
    /// is no reconnect; construct a fresh pair to resume testing.
    pub fn close(&self) -> &Self {
        self.inner.connected.store(false, Ordering::Relaxed);
        debug!("client socket closed");
        match self.emit("disconnect", Value::from(CLIENT_DISCONNECT_REASON)) {
            Ok(_) | Err(MocketError::Detached) => {}
            Err(error) => debug!(error = %error, "disconnect notification failed"),
        }
        self
    }

    /// Alias for [`close`](Self::close).
    pub fn disconnect(&self) -> &Self {
        self.close()
    }

    /// Handle to the paired server endpoint, if it is still alive.
    #[must_use]
    pub fn server(&self) -> Option<ServerSocket> {
        self.inner.server.upgrade().map(ServerSocket::from_inner)
    }
}

impl fmt::Debug for ClientSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSocket")
            .field("connected", &self.connected())
            .finish()
    }
}
