//! Error types for the `deribit-mm` crate.
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. [`Error`] covers:
//!
//! - **Transport-fatal** — TLS, socket I/O, handshake failures
//! - **Protocol-fatal** — malformed frame headers, non-101 handshake status
//! - **JSON errors** — malformed or unparseable message bodies
//! - **Invalid arguments** — client-side validation errors

use std::io;

/// All possible errors produced by the `deribit-mm` client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The WebSocket handshake failed (non-101 status, or the
    /// `Sec-WebSocket-Accept` header did not match the expected value).
    #[error("WebSocket handshake failed: {0}")]
    Handshake(String),

    /// A received frame had a malformed header (bad opcode, reserved bits
    /// set, or an invalid extended-length encoding).
    #[error("malformed WebSocket frame: {0}")]
    MalformedFrame(String),

    /// The transport was closed — either a close frame was received, or a
    /// prior I/O error already terminated the connection.
    #[error("transport closed")]
    Closed,

    /// An underlying socket or TLS I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A TLS handshake or configuration error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Failed to deserialize a JSON-RPC message body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A malformed or unreachable WebSocket URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The caller provided an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
