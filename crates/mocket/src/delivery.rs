//! The shape subscribers receive for one dispatched event.

use serde_json::Value;

use crate::ack::AckSender;

/// Arguments and optional acknowledgement channel for one dispatched event.
///
/// Both endpoints dispatch this same shape to their subscribers.
/// Server-side subscribers see `ack: Some(..)` when the client requested an
/// acknowledgement; the server→client path never carries one.
#[derive(Clone, Debug)]
pub struct Delivery {
    /// Positional event arguments, deep-copied where the path requires it.
    pub args: Vec<Value>,
    /// Reply channel for acked emissions.
    pub ack: Option<AckSender>,
}

impl Delivery {
    /// A delivery carrying arguments only.
    pub(crate) fn plain(args: Vec<Value>) -> Self {
        Self { args, ack: None }
    }
}
