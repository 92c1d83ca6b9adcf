//! C3 — the JSON-RPC correlator.
//!
//! `Api` owns the pending-request table, the session, the book mirror, and
//! the last-known positions, and drives all of it from a single inbound
//! message stream (spec §5: "routing is single-threaded on the reader").
//! Construction is two-phase: [`Api::new`] builds the correlator with no
//! transport attached, then [`Api::connect`] (which needs `Arc<Self>` to
//! hand a back-reference to the transport's message handler) opens the
//! socket and starts routing.

pub mod book;
pub mod notify;
mod pending;
mod session;

pub use book::BookSnapshot;
pub use notify::{TradeNotifications, null_sink};
pub use pending::{PendingRequest, PendingTable};
pub use session::Session;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Value, json};

use book::OrderBook;

use crate::codec::{
    BookSnapshotPayload, Envelope, OrderBookResultPayload, OrderFields, OrderUpdatePayload,
};
use crate::constants::{channels, methods};
use crate::error::Result;
use crate::log::EventLog;
use crate::transport::{MessageHandler, TlsTransport, Transport};
use crate::types::{OrderState, Position, RequestKind, Side};

/// The correlator: one request-id counter, one pending-request table, one
/// book mirror, one session, shared behind a single `Arc` so the transport's
/// message handler can hold a back-reference to it.
pub struct Api {
    transport: Mutex<Option<Arc<dyn Transport>>>,
    next_id: AtomicU32,
    pending: Mutex<PendingTable>,
    session: Mutex<Session>,
    book: Mutex<OrderBook>,
    positions: Mutex<Vec<Position>>,
    sink: Mutex<Arc<dyn TradeNotifications>>,
    log: Arc<EventLog>,
}

impl Api {
    pub fn new(log: Arc<EventLog>) -> Arc<Self> {
        Arc::new(Self {
            transport: Mutex::new(None),
            next_id: AtomicU32::new(1),
            pending: Mutex::new(PendingTable::new()),
            session: Mutex::new(Session::new()),
            book: Mutex::new(OrderBook::new()),
            positions: Mutex::new(Vec::new()),
            sink: Mutex::new(null_sink()),
            log,
        })
    }

    /// Register the trader (or anything else) as the notification sink.
    /// Only meant to be called once, before traffic starts flowing.
    pub fn register_sink(&self, sink: Arc<dyn TradeNotifications>) {
        *self.sink.lock() = sink;
    }

    /// Open a verified TLS connection to `host` at `path` and start routing
    /// inbound messages to `self`.
    pub async fn connect(self: &Arc<Self>, host: &str, path: &str) -> Result<()> {
        let handler: Arc<dyn MessageHandler> = Arc::new(ApiHandler(self.clone()));
        let transport = TlsTransport::connect(host, path, handler).await?;
        let transport: Arc<dyn Transport> = Arc::new(transport);
        *self.transport.lock() = Some(transport);
        Ok(())
    }

    /// Like [`Self::connect`] but parses `host` and `path` out of a full
    /// `wss://host/path` URL.
    pub async fn connect_url(self: &Arc<Self>, url: &str) -> Result<()> {
        let parsed = url::Url::parse(url)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| crate::error::Error::InvalidArgument(format!("no host in URL: {url}")))?;
        Self::connect(self, host, parsed.path()).await
    }

    /// Attach an already-constructed transport — used by tests to inject a
    /// loopback or in-memory [`Transport`] without a real TLS endpoint.
    pub fn attach_transport(&self, transport: Arc<dyn Transport>) {
        *self.transport.lock() = Some(transport);
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.lock().is_authenticated()
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.lock().access_token().map(str::to_owned)
    }

    pub fn book_snapshot(&self) -> BookSnapshot {
        self.book.lock().snapshot()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.positions.lock().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    // -- outbound operations (spec §4.3) --------------------------------

    pub async fn authenticate(&self, client_id: &str, client_secret: &str) -> bool {
        self.send_request(
            RequestKind::Auth,
            methods::AUTH,
            json!({
                "grant_type": "client_credentials",
                "client_id": client_id,
                "client_secret": client_secret,
            }),
        )
        .await
    }

    pub async fn subscribe_public(&self, channel: &str) -> bool {
        self.send_request(
            RequestKind::Subscribe,
            methods::SUBSCRIBE_PUBLIC,
            json!({ "channels": [channel] }),
        )
        .await
    }

    pub async fn subscribe_private(&self, channel: &str) -> bool {
        self.send_request(
            RequestKind::Subscribe,
            methods::SUBSCRIBE_PRIVATE,
            json!({ "channels": [channel] }),
        )
        .await
    }

    pub async fn place_order(&self, instrument: &str, side: Side, price: f64, amount: f64) -> bool {
        self.send_request(
            RequestKind::Order,
            side.method(),
            json!({
                "instrument_name": instrument,
                "price": price,
                "amount": amount,
            }),
        )
        .await
    }

    pub async fn cancel_order(&self, order_id: &str) -> bool {
        self.send_request(
            RequestKind::Cancel,
            methods::CANCEL,
            json!({ "order_id": order_id }),
        )
        .await
    }

    pub async fn edit_order(&self, order_id: &str, price: f64, amount: f64) -> bool {
        self.send_request(
            RequestKind::Edit,
            methods::EDIT,
            json!({
                "order_id": order_id,
                "price": price,
                "amount": amount,
            }),
        )
        .await
    }

    pub async fn get_order_book(&self, instrument: &str) -> bool {
        self.send_request(
            RequestKind::GetBook,
            methods::GET_ORDER_BOOK,
            json!({ "instrument_name": instrument }),
        )
        .await
    }

    pub async fn get_positions(&self, currency: &str) -> bool {
        self.send_request(
            RequestKind::GetPositions,
            methods::GET_POSITIONS,
            json!({ "currency": currency }),
        )
        .await
    }

    /// Build the envelope, record the pending entry under its lock *before*
    /// handing the text to the transport (spec §8.1: a response racing the
    /// send must never find the table empty), then hand off to C1.
    async fn send_request(&self, kind: RequestKind, method: &str, mut params: Value) -> bool {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        if method.starts_with("private/") {
            if let Some(token) = self.session.lock().access_token() {
                if let Value::Object(ref mut map) = params {
                    map.insert("access_token".to_owned(), Value::String(token.to_owned()));
                }
            }
        }

        let envelope = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        self.pending.lock().insert(id, kind, Instant::now());

        let transport = self.transport.lock().clone();
        match transport {
            Some(transport) => transport.send(&envelope.to_string()).await,
            None => false,
        }
    }

    // -- inbound routing (spec §4.3/§5) ----------------------------------

    async fn handle_inbound(&self, text: String) {
        match Envelope::parse(&text) {
            Envelope::Response { id, result, error } => self.handle_response(id, result, error).await,
            Envelope::Notification { channel, data } => self.handle_notification(channel, data).await,
            Envelope::Malformed => {
                self.log.emit("parse_error", json!({ "raw_len": text.len() }));
            }
        }
    }

    async fn handle_response(&self, id: u32, result: Option<Value>, error: Option<crate::codec::RpcError>) {
        let Some(pending) = self.pending.lock().take(id) else {
            self.log.emit("unsolicited_response", json!({ "id": id }));
            return;
        };
        let latency_ms = pending.sent_at.elapsed().as_secs_f64() * 1000.0;

        if let Some(error) = error {
            self.log.emit(
                "error",
                json!({
                    "id": id,
                    "kind": format!("{:?}", pending.kind),
                    "code": error.code,
                    "message": error.message,
                    "latency_ms": latency_ms,
                }),
            );
            return;
        }

        let Some(result) = result else {
            self.log.emit(
                "empty_result",
                json!({ "id": id, "kind": format!("{:?}", pending.kind) }),
            );
            return;
        };

        match pending.kind {
            RequestKind::Auth => self.handle_auth_result(&result, latency_ms),
            RequestKind::Subscribe => {
                self.log.emit(pending.kind.ack_event(), json!({ "latency_ms": latency_ms }));
            }
            RequestKind::Order | RequestKind::Cancel | RequestKind::Edit => {
                self.handle_order_result(pending.kind, &result, latency_ms).await;
            }
            RequestKind::GetBook => self.handle_book_result(&result, latency_ms),
            RequestKind::GetPositions => self.handle_positions_result(&result, latency_ms),
        }
    }

    fn handle_auth_result(&self, result: &Value, latency_ms: f64) {
        let Some(token) = result.get("access_token").and_then(Value::as_str) else {
            self.log.emit("auth_malformed", json!({ "latency_ms": latency_ms }));
            return;
        };
        self.session.lock().set_access_token(token.to_owned());
        self.log.emit("auth_success", json!({ "latency_ms": latency_ms }));
    }

    async fn handle_order_result(&self, kind: RequestKind, result: &Value, latency_ms: f64) {
        let order: Option<OrderFields> = result
            .get("order")
            .and_then(|o| serde_json::from_value(o.clone()).ok());
        let Some(order) = order else {
            self.log.emit(
                &format!("{}_malformed", kind.ack_event()),
                json!({ "latency_ms": latency_ms }),
            );
            return;
        };

        let state = OrderState::from_wire(&order.order_state);
        self.log.emit(
            kind.ack_event(),
            json!({
                "order_id": order.order_id,
                "order_state": state.as_wire(),
                "latency_ms": latency_ms,
            }),
        );

        let sink = self.sink.lock().clone();
        if state == OrderState::Open {
            sink.on_order_open(&order.order_id).await;
        } else if state.is_closed() {
            sink.on_order_closed(&order.order_id).await;
        }
    }

    fn handle_book_result(&self, result: &Value, latency_ms: f64) {
        let payload: OrderBookResultPayload = serde_json::from_value(result.clone()).unwrap_or_default();
        self.book.lock().replace(&payload.bids, &payload.asks);
        self.log.emit(
            "order_book_snapshot",
            json!({
                "bid_levels": payload.bids.len(),
                "ask_levels": payload.asks.len(),
                "latency_ms": latency_ms,
            }),
        );
        // Priming the mirror from a request/response is not a market data
        // event — the strategy is only notified from the `book.*`
        // subscription path (spec §4.3; the original's get_order_book
        // branch never calls onOrderBookUpdate either).
    }

    fn handle_positions_result(&self, result: &Value, latency_ms: f64) {
        let positions: Vec<Position> = serde_json::from_value(result.clone()).unwrap_or_default();
        self.log.emit(
            "positions_snapshot",
            json!({ "count": positions.len(), "latency_ms": latency_ms }),
        );
        *self.positions.lock() = positions;
    }

    async fn handle_notification(&self, channel: String, data: Value) {
        if channel.starts_with(channels::BOOK_PREFIX) {
            let processing_started_at = Instant::now();
            let payload: BookSnapshotPayload = serde_json::from_value(data).unwrap_or_default();
            self.book.lock().replace(&payload.bids, &payload.asks);
            let snapshot = self.book.lock().snapshot();

            // Wire-to-decision latency (spec §1/§2): time from the
            // exchange's own event timestamp to our receipt, and time
            // spent turning the payload into the updated mirror.
            let propagation_ms = payload
                .timestamp
                .map(|sent_at_ms| (Utc::now().timestamp_millis() - sent_at_ms) as f64);
            let process_ms = processing_started_at.elapsed().as_secs_f64() * 1000.0;

            let mut fields = json!({
                "channel": channel,
                "bid_levels": payload.bids.len(),
                "ask_levels": payload.asks.len(),
                "process_ms": process_ms,
            });
            if let Value::Object(ref mut map) = fields {
                if let Some(propagation_ms) = propagation_ms {
                    map.insert("propagation_ms".to_owned(), json!(propagation_ms));
                }
                if let Some(best_bid) = snapshot.best_bid() {
                    map.insert("best_bid".to_owned(), json!(best_bid));
                }
                if let Some(best_ask) = snapshot.best_ask() {
                    map.insert("best_ask".to_owned(), json!(best_ask));
                }
            }
            self.log.emit("market_update", fields);

            let sink = self.sink.lock().clone();
            sink.on_book_update(&snapshot).await;
            return;
        }

        if channel.starts_with(channels::ORDERS_PREFIX) {
            let Ok(payload) = serde_json::from_value::<OrderUpdatePayload>(data) else {
                self.log.emit("order_update_malformed", json!({ "channel": channel }));
                return;
            };
            let state = OrderState::from_wire(&payload.order_state);
            self.log.emit(
                "order_update",
                json!({ "order_id": payload.order_id, "order_state": state.as_wire() }),
            );
            if state.is_closed() {
                let sink = self.sink.lock().clone();
                sink.on_order_closed(&payload.order_id).await;
            }
            return;
        }

        self.log.emit("unknown_channel", json!({ "channel": channel }));
    }
}

/// Adapts `Api`'s inbound routing to the transport's async message-handler
/// seam (C1).
struct ApiHandler(Arc<Api>);

#[async_trait]
impl MessageHandler for ApiHandler {
    async fn on_message(&self, text: String) {
        self.0.handle_inbound(text).await;
    }
}
