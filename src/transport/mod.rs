//! C1 — WebSocket transport: RFC 6455 framing over TLS.
//!
//! - [`frame`] — pure frame encode/decode and masking
//! - [`handshake`] — HTTP Upgrade request/response handling
//! - [`stream`] — the generic, transport-agnostic send/receive loop
//! - [`tls`] — the production TLS entry point

pub mod frame;
pub mod handshake;
pub mod stream;
pub mod tls;

pub use stream::{MessageHandler, WsTransport};
pub use tls::TlsTransport;

use async_trait::async_trait;

/// Object-safe facade over [`WsTransport<S>`] so C3 (the correlator) can
/// hold a transport without being generic over the stream type.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, text: &str) -> bool;
    async fn close(&self);
    fn is_running(&self) -> bool;
}

#[async_trait]
impl<S> Transport for WsTransport<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&self, text: &str) -> bool {
        WsTransport::send(self, text).await
    }

    async fn close(&self) {
        WsTransport::close(self).await
    }

    fn is_running(&self) -> bool {
        WsTransport::is_running(self)
    }
}
