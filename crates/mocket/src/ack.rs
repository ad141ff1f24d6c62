//! Acknowledgement plumbing for emitted events.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

/// Callback invoked with the acknowledgement value.
pub type AckCallback = Box<dyn FnOnce(Value) + Send + 'static>;

/// At-most-once reply channel handed to subscribers of an acked emission.
///
/// The first [`send`](AckSender::send) runs the emitting side's callback
/// synchronously, on the current call stack, with the value passed through
/// uncopied; acknowledgement values are exempt from the round-trip copy
/// applied on the main payload path. Every later send is a no-op.
#[derive(Clone)]
pub struct AckSender {
    reply: Arc<Mutex<Option<AckCallback>>>,
}

impl AckSender {
    /// Wrap the emitting side's callback.
    pub(crate) fn new(callback: AckCallback) -> Self {
        Self {
            reply: Arc::new(Mutex::new(Some(callback))),
        }
    }

    /// Acknowledge with `value`.
    ///
    /// Returns `true` if this call delivered the acknowledgement, `false`
    /// if it had already been consumed.
    pub fn send(&self, value: Value) -> bool {
        let callback = self.reply.lock().take();
        match callback {
            Some(callback) => {
                callback(value);
                true
            }
            None => {
                debug!("acknowledgement already consumed");
                false
            }
        }
    }

    /// Acknowledge with no payload (`null`).
    pub fn send_empty(&self) -> bool {
        self.send(Value::Null)
    }

    /// Whether the acknowledgement has already been delivered.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.reply.lock().is_none()
    }
}

impl fmt::Debug for AckSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AckSender")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn capture() -> (Arc<Mutex<Vec<Value>>>, AckSender) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let sender = AckSender::new(Box::new(move |value| sink.lock().push(value)));
        (received, sender)
    }

    #[test]
    fn first_send_delivers_synchronously() {
        let (received, sender) = capture();
        assert!(sender.send(json!({"foo": "bar"})));
        assert_eq!(*received.lock(), vec![json!({"foo": "bar"})]);
    }

    #[test]
    fn second_send_is_a_reported_noop() {
        let (received, sender) = capture();
        assert!(sender.send(json!(1)));
        assert!(!sender.send(json!(2)));
        assert_eq!(*received.lock(), vec![json!(1)]);
    }

    #[test]
    fn send_empty_delivers_null() {
        let (received, sender) = capture();
        assert!(sender.send_empty());
        assert_eq!(*received.lock(), vec![Value::Null]);
    }

    #[test]
    fn consumption_is_shared_across_clones() {
        let (received, sender) = capture();
        let other = sender.clone();
        assert!(sender.send(json!("once")));
        assert!(!other.send(json!("twice")));
        assert_eq!(received.lock().len(), 1);
    }

    #[test]
    fn is_consumed_tracks_delivery() {
        let (_received, sender) = capture();
        assert!(!sender.is_consumed());
        let _ = sender.send_empty();
        assert!(sender.is_consumed());
    }

    #[test]
    fn debug_reports_consumption() {
        let (_received, sender) = capture();
        assert_eq!(format!("{sender:?}"), "AckSender { consumed: false }");
    }
}
