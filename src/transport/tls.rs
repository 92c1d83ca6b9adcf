//! Production entry point: TCP + TLS ≥ 1.2 with SNI, wrapping the generic
//! [`WsTransport`] over the resulting stream.

use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use super::stream::{MessageHandler, WsTransport};
use crate::error::{Error, Result};

/// A transport running over a TLS-wrapped TCP stream — the type returned by
/// [`WsTransport::connect`].
pub type TlsTransport = WsTransport<TlsStream<TcpStream>>;

fn default_tls_config() -> ClientConfig {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

impl WsTransport<TlsStream<TcpStream>> {
    /// Connect to `host:443` over TLS with peer verification enabled
    /// (spec §4.1: "a hardened implementation SHOULD default to verify"),
    /// perform the RFC 6455 handshake against `path`, and start the reader.
    pub async fn connect(
        host: &str,
        path: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self> {
        Self::connect_with_config(host, path, default_tls_config(), handler).await
    }

    /// Like [`Self::connect`] but with peer certificate verification
    /// disabled. Never the default — intended for test harnesses against a
    /// self-signed or mock TLS endpoint only.
    pub async fn connect_insecure(
        host: &str,
        path: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self> {
        let mut config = default_tls_config();
        config
            .dangerous()
            .set_certificate_verifier(Arc::new(NoVerification));
        Self::connect_with_config(host, path, config, handler).await
    }

    async fn connect_with_config(
        host: &str,
        path: &str,
        config: ClientConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self> {
        let tcp = TcpStream::connect((host, 443)).await?;
        tcp.set_nodelay(true).ok();

        let connector = TlsConnector::from(Arc::new(config));
        let server_name = ServerName::try_from(host.to_owned())
            .map_err(|_| Error::Handshake(format!("invalid SNI host name: {host}")))?;
        let tls_stream = connector.connect(server_name, tcp).await?;

        WsTransport::connect_stream(tls_stream, host, path, handler).await
    }
}

#[derive(Debug)]
struct NoVerification;

impl rustls::client::danger::ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureVerified, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureVerified::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureVerified, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureVerified::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        use rustls::SignatureScheme::*;
        vec![
            RSA_PKCS1_SHA1,
            ECDSA_SHA1_Legacy,
            RSA_PKCS1_SHA256,
            ECDSA_NISTP256_SHA256,
            RSA_PKCS1_SHA384,
            ECDSA_NISTP384_SHA384,
            RSA_PKCS1_SHA512,
            ECDSA_NISTP521_SHA512,
            RSA_PSS_SHA256,
            RSA_PSS_SHA384,
            RSA_PSS_SHA512,
            ED25519,
        ]
    }
}
