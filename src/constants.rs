//! Wire-level and protocol constants for the exchange's JSON-RPC/WebSocket API.
//!
//! Strategy tuning constants live in [`crate::config::StrategyConfig`] — these
//! are the fixed parts of the wire contract that are never overridden.

/// RFC 6455 handshake magic GUID, concatenated with the client's
/// `Sec-WebSocket-Key` before SHA-1 hashing to derive `Sec-WebSocket-Accept`.
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// JSON-RPC methods used by this client.
pub mod methods {
    pub const AUTH: &str = "public/auth";
    pub const SUBSCRIBE_PUBLIC: &str = "public/subscribe";
    pub const SUBSCRIBE_PRIVATE: &str = "private/subscribe";
    pub const GET_ORDER_BOOK: &str = "public/get_order_book";
    pub const BUY: &str = "private/buy";
    pub const SELL: &str = "private/sell";
    pub const CANCEL: &str = "private/cancel";
    pub const EDIT: &str = "private/edit";
    pub const GET_POSITIONS: &str = "private/get_positions";
}

/// Notification channel prefixes.
pub mod channels {
    pub const BOOK_PREFIX: &str = "book.";
    pub const ORDERS_PREFIX: &str = "user.orders";
}

/// Absence threshold for a book level: sizes at or below this are treated
/// as a removed level.
pub const LEVEL_EPSILON: f64 = 1e-12;
