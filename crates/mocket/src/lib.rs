//! # mocket
//!
//! An in-process Socket.IO-style server/client pair for testing
//! event-driven application code without opening a network socket.
//!
//! - **[`ServerSocket`]**: the receiving side as application code sees it,
//!   with the subscriber bus, room membership, and the room-scoped
//!   broadcast channel.
//! - **[`ClientSocket`]**: the sending side, with connection flags,
//!   outbound `emit` with optional acknowledgement, and terminal `close`.
//! - **Payload discipline**: client→server arguments are deep-copied via a
//!   JSON encode/decode round trip (see [`payload`]), exactly as a real
//!   wire would force; the server→client direction and acknowledgement
//!   values travel uncopied.
//! - **Acknowledgements**: [`AckSender`] delivers at most one reply,
//!   synchronously, on the emitting call stack.
//!
//! Everything is synchronous and single-threaded in spirit: an `emit`
//! returns only after every matching subscriber (and any acknowledgement
//! it sends) has run. Diagnostics go through `tracing`; install whatever
//! subscriber the test suite prefers.
//!
//! ## Example
//!
//! ```rust
//! use mocket::ServerSocket;
//! use serde_json::json;
//!
//! let server = ServerSocket::new();
//! let client = server.client();
//!
//! let _ = server.on("chat message", |delivery| {
//!     assert_eq!(delivery.args[0], json!({"text": "hi"}));
//!     if let Some(ack) = &delivery.ack {
//!         let _ = ack.send(json!("seen"));
//!     }
//! });
//!
//! client
//!     .emit_with_ack("chat message", vec![json!({"text": "hi"})], |reply| {
//!         assert_eq!(reply, json!("seen"));
//!     })
//!     .unwrap();
//! ```

pub mod ack;
pub mod client;
pub mod delivery;
pub mod error;
pub mod payload;
pub mod server;

pub use ack::{AckCallback, AckSender};
pub use client::{ClientSocket, EmitArgs};
pub use delivery::Delivery;
pub use error::{MocketError, Result};
pub use server::{Broadcast, RoomEmitter, ServerSocket};
