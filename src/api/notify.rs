//! The narrow, one-way notification sink C3 calls into C4.
//!
//! Design Note §9 replaces the source's mutual Api↔Trader pointers with a
//! unidirectional callback: `Api` holds a non-owning `Arc<dyn
//! TradeNotifications>`; the caller (whoever owns both `Api` and `Trader`)
//! registers the trader as the sink. `Api` never owns a `Trader`.
//!
//! Callbacks are async and awaited inline from the message-routing path
//! (spec §5: the strategy callback runs on the reader thread/task, and
//! `place_order` consequently executes there too) — so `on_book_update` can
//! itself await a transport send without spawning off the routing path.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::book::BookSnapshot;

/// Notifications `Api` delivers to whatever is playing the trader role.
#[async_trait]
pub trait TradeNotifications: Send + Sync {
    /// A `book.*` notification or `get_order_book` response replaced the
    /// mirror; `snapshot` is a read-only copy, not a live reference, so the
    /// callback never blocks C3's book-mirror lock (spec §5: "read-snapshot-
    /// copied when passed to C4").
    async fn on_book_update(&self, snapshot: &BookSnapshot);

    /// An order response reported `order_state == "open"`.
    async fn on_order_open(&self, order_id: &str);

    /// A `user.orders.*` notification reported a terminal state
    /// (`filled`/`cancelled`/`rejected`).
    async fn on_order_closed(&self, order_id: &str);
}

/// A sink that drops every notification — the default before a trader
/// registers itself, and useful in tests that only exercise the correlator.
pub struct NullSink;

#[async_trait]
impl TradeNotifications for NullSink {
    async fn on_book_update(&self, _snapshot: &BookSnapshot) {}
    async fn on_order_open(&self, _order_id: &str) {}
    async fn on_order_closed(&self, _order_id: &str) {}
}

pub fn null_sink() -> Arc<dyn TradeNotifications> {
    Arc::new(NullSink)
}
