use serde::Serialize;

/// Order side, serialized lowercase to match the wire method names
/// (`private/buy`, `private/sell`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The JSON-RPC method used to submit an order of this side.
    pub fn method(self) -> &'static str {
        match self {
            Side::Buy => crate::constants::methods::BUY,
            Side::Sell => crate::constants::methods::SELL,
        }
    }
}
