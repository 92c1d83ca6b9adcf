use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Lifecycle state of an order, as reported in `result.order.order_state`
/// (order responses) or `data.state` (`user.orders.*` notifications).
///
/// Unrecognized wire values are preserved as [`OrderState::Other`] rather
/// than rejected — the exchange's state machine is a free string and this
/// client only needs to recognize the handful of states that affect the
/// open-order set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderState {
    Open,
    Filled,
    Cancelled,
    Rejected,
    Other(String),
}

impl OrderState {
    /// True for the terminal states that remove an order from the open set.
    pub fn is_closed(&self) -> bool {
        matches!(self, OrderState::Filled | OrderState::Cancelled | OrderState::Rejected)
    }

    /// Parse a raw wire string into an [`OrderState`].
    pub fn from_wire(s: &str) -> Self {
        match s {
            "open" => OrderState::Open,
            "filled" => OrderState::Filled,
            "cancelled" => OrderState::Cancelled,
            "rejected" => OrderState::Rejected,
            other => OrderState::Other(other.to_owned()),
        }
    }

    /// Render back to the wire string.
    pub fn as_wire(&self) -> &str {
        match self {
            OrderState::Open => "open",
            OrderState::Filled => "filled",
            OrderState::Cancelled => "cancelled",
            OrderState::Rejected => "rejected",
            OrderState::Other(s) => s,
        }
    }
}

impl Serialize for OrderState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for OrderState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer).map_err(de::Error::custom)?;
        Ok(OrderState::from_wire(&s))
    }
}
