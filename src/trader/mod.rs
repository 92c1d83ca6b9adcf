//! C4 — the market-making strategy.
//!
//! `Trader` reacts to book and order notifications delivered by C3 through
//! the [`TradeNotifications`](crate::api::TradeNotifications) sink and
//! drives C3's outbound operations in response. It never touches the
//! transport or the wire format directly.
//!
//! Quoting rule (spec §5): when there are no open orders and the top-of-book
//! spread is at or above [`StrategyConfig::spread_threshold`], submit one
//! bid and one ask, each improved from the best level by
//! [`StrategyConfig::edge`]. The empty-open-orders check and the decision to
//! submit are made atomic against a second `on_book_update` call by
//! `pending_quotes` — message routing is single-threaded on the reader
//! (spec §5), so the only other writer of this state is the stale-order
//! canceller, which only removes.

mod open_orders;

pub use open_orders::OpenOrders;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use crate::api::{Api, BookSnapshot, TradeNotifications};
use crate::config::StrategyConfig;
use crate::log::EventLog;
use crate::types::Side;

pub struct Trader {
    config: StrategyConfig,
    api: Arc<Api>,
    open_orders: OpenOrders,
    pending_quotes: AtomicUsize,
    log: Arc<EventLog>,
}

impl Trader {
    pub fn new(config: StrategyConfig, api: Arc<Api>, log: Arc<EventLog>) -> Arc<Self> {
        Arc::new(Self {
            config,
            api,
            open_orders: OpenOrders::new(),
            pending_quotes: AtomicUsize::new(0),
            log,
        })
    }

    /// Subscribe to both channels, prime the book and positions, and spawn
    /// the stale-order canceller. Call once the transport is connected and
    /// the session is authenticated.
    pub async fn start(self: &Arc<Self>) {
        self.api.subscribe_public(&self.config.public_book_channel()).await;
        self.api.subscribe_private(&self.config.private_orders_channel()).await;
        self.api.get_order_book(&self.config.instrument).await;
        self.api.get_positions(&self.config.currency).await;
        self.spawn_canceller();
    }

    fn spawn_canceller(self: &Arc<Self>) {
        let trader = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(trader.config.tick);
            loop {
                ticker.tick().await;
                trader.cancel_stale_orders().await;
            }
        });
    }

    async fn cancel_stale_orders(&self) {
        let stale = self.open_orders.stale_ids(self.config.stale_after);
        for order_id in stale {
            self.log.emit("stale_order_cancel", json!({ "order_id": order_id }));
            self.open_orders.remove(&order_id);
            self.api.cancel_order(&order_id).await;
        }
    }

    fn try_begin_quoting(&self) -> bool {
        self.pending_quotes
            .compare_exchange(0, 2, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn quote_settled(&self) {
        let _ = self.pending_quotes.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            Some(n.saturating_sub(1))
        });
    }
}

#[async_trait]
impl TradeNotifications for Trader {
    async fn on_book_update(&self, snapshot: &BookSnapshot) {
        let (Some((bid_price, _)), Some((ask_price, _))) = (snapshot.best_bid(), snapshot.best_ask()) else {
            return;
        };
        let spread = ask_price - bid_price;
        if spread <= self.config.spread_threshold {
            return;
        }
        if !self.open_orders.is_empty() {
            return;
        }
        if !self.try_begin_quoting() {
            return;
        }

        let bid = bid_price + self.config.edge;
        let ask = ask_price - self.config.edge;
        self.log.emit(
            "quote_submitted",
            json!({ "bid": bid, "ask": ask, "size": self.config.size, "spread": spread }),
        );

        if !self.api.place_order(&self.config.instrument, Side::Buy, bid, self.config.size).await {
            self.quote_settled();
        }
        if !self.api.place_order(&self.config.instrument, Side::Sell, ask, self.config.size).await {
            self.quote_settled();
        }
    }

    async fn on_order_open(&self, order_id: &str) {
        self.open_orders.insert(order_id.to_owned());
        self.quote_settled();
    }

    async fn on_order_closed(&self, order_id: &str) {
        self.open_orders.remove(order_id);
        self.quote_settled();
    }
}
