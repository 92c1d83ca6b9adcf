//! JSON-RPC 2.0 parsing and typed payload extraction.
//!
//! Inbound text is parsed once into a tagged [`Envelope`] (Design Note §9:
//! "dispatch by string comparison... re-architect as tagged variants"),
//! rather than re-inspected with ad hoc `if msg.contains("subscription")`
//! checks at every call site. Malformed JSON is never fatal at this layer —
//! [`Envelope::parse`] returns [`Envelope::Malformed`] and the caller decides
//! what to do (spec §7: "Protocol-recoverable").

mod payloads;

pub use payloads::{
    BookSnapshotPayload, Level, OrderBookResultPayload, OrderFields, OrderResultPayload,
    OrderUpdatePayload, RpcError,
};

use serde_json::Value;

/// A parsed inbound JSON-RPC message.
#[derive(Debug, Clone)]
pub enum Envelope {
    /// A response to a request we sent, matched to its pending entry by id.
    Response {
        id: u32,
        result: Option<Value>,
        error: Option<RpcError>,
    },
    /// An unsolicited `"subscription"` notification.
    Notification { channel: String, data: Value },
    /// Valid JSON that doesn't match either known shape, or invalid JSON.
    Malformed,
}

impl Envelope {
    /// Parse a raw inbound text frame.
    pub fn parse(text: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            return Envelope::Malformed;
        };
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Self {
        let method = value.get("method").and_then(Value::as_str);

        if method == Some("subscription") {
            let channel = value
                .pointer("/params/channel")
                .and_then(Value::as_str)
                .map(str::to_owned);
            let data = value
                .pointer("/params/data")
                .cloned()
                .unwrap_or(Value::Null);
            return match channel {
                Some(channel) => Envelope::Notification { channel, data },
                None => Envelope::Malformed,
            };
        }

        if let Some(id) = value.get("id").and_then(Value::as_u64) {
            let error = value
                .get("error")
                .and_then(|e| serde_json::from_value::<RpcError>(e.clone()).ok());
            let result = value.get("result").cloned();
            return Envelope::Response {
                id: id as u32,
                result,
                error,
            };
        }

        Envelope::Malformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_response_with_result() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":{"access_token":"T"}}"#;
        match Envelope::parse(text) {
            Envelope::Response { id, result, error } => {
                assert_eq!(id, 1);
                assert!(error.is_none());
                assert_eq!(result.unwrap()["access_token"], "T");
            }
            other => panic!("expected Response, got {other:?}"),
        }
    }

    #[test]
    fn parses_response_with_error() {
        let text = r#"{"jsonrpc":"2.0","id":2,"error":{"code":10009,"message":"not_enough_funds"}}"#;
        match Envelope::parse(text) {
            Envelope::Response { id, error, .. } => {
                assert_eq!(id, 2);
                let err = error.unwrap();
                assert_eq!(err.code, 10009);
                assert_eq!(err.message, "not_enough_funds");
            }
            other => panic!("expected Response, got {other:?}"),
        }
    }

    #[test]
    fn parses_subscription_notification() {
        let text = r#"{"jsonrpc":"2.0","method":"subscription","params":{"channel":"book.BTC-PERPETUAL.raw","data":{"bids":[]}}}"#;
        match Envelope::parse(text) {
            Envelope::Notification { channel, data } => {
                assert_eq!(channel, "book.BTC-PERPETUAL.raw");
                assert!(data.get("bids").is_some());
            }
            other => panic!("expected Notification, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_non_fatal() {
        assert!(matches!(Envelope::parse("not json"), Envelope::Malformed));
        assert!(matches!(Envelope::parse(r#"{"foo":1}"#), Envelope::Malformed));
    }
}
