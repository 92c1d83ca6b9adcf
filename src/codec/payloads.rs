//! Typed shapes for the payloads named in spec §4.2.
//!
//! Fields are tolerant of absence (`#[serde(default)]`) — the higher layer
//! checks for presence rather than relying on deserialization to fail,
//! matching the tolerant-parsing style of `user.orders.*` wire types.

use serde::Deserialize;

/// `error.{code, message}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// One `[price, size]` pair as found in a book snapshot's `bids`/`asks`
/// arrays.
pub type Level = (f64, f64);

/// `params.data.{timestamp?, bids, asks}` — a `book.*` notification payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookSnapshotPayload {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub bids: Vec<Level>,
    #[serde(default)]
    pub asks: Vec<Level>,
}

/// `result.order.{order_id, order_state}` — an order response payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResultPayload {
    pub order: OrderFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderFields {
    pub order_id: String,
    pub order_state: String,
}

/// `result.{bids, asks}` — a direct `public/get_order_book` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderBookResultPayload {
    #[serde(default)]
    pub bids: Vec<Level>,
    #[serde(default)]
    pub asks: Vec<Level>,
}

/// `params.data.{order_id, order_state}` — a `user.orders.*` notification
/// payload. The wire field is named `order_state` in both response and
/// notification shapes in this API.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUpdatePayload {
    pub order_id: String,
    pub order_state: String,
}
