//! Payload copy discipline for values crossing the endpoints.
//!
//! Arguments routed client→server or through the broadcast channel pass
//! through a full JSON encode/decode round trip (the same deep copy a real
//! wire forces), so no shared structure survives delivery. Acknowledgement
//! values are exempt and travel uncopied; that asymmetry is part of the
//! contract, not an optimization.
//!
//! Only JSON-representable values (objects, arrays, strings, numbers,
//! booleans, null) are guaranteed to survive the trip.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Deep-copy a payload value via a JSON encode/decode round trip.
pub fn round_trip(value: &Value) -> Result<Value> {
    let encoded = serde_json::to_string(value)?;
    Ok(serde_json::from_str(&encoded)?)
}

/// Deep-copy every argument of one emission, preserving order.
pub fn copy_args(args: &[Value]) -> Result<Vec<Value>> {
    args.iter().map(round_trip).collect()
}

/// Build an argument [`Value`] from any serializable type.
///
/// Failures (for example map keys that do not serialize to strings)
/// surface here, before the value ever reaches an emit call.
pub fn to_payload<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
