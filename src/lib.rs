//! A low-latency market-making client for a crypto derivatives exchange's
//! JSON-RPC-over-WebSocket API.
//!
//! - [`transport`] — C1: RFC 6455 framing, handshake, and TLS
//! - [`codec`] — C2: JSON-RPC envelope parsing and typed payloads
//! - [`api`] — C3: the request/response correlator, book mirror, and session
//! - [`trader`] — C4: the market-making strategy
//! - [`log`] — C5: the structured business event log
//! - [`config`] — strategy and connection tuning
//! - [`types`] — shared domain types
//! - [`error`] — the crate's error type

pub mod api;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod log;
pub mod trader;
pub mod transport;
pub mod types;

pub use api::Api;
pub use config::StrategyConfig;
pub use error::{Error, Result};
pub use trader::Trader;
