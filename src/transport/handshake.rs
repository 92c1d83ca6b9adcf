//! HTTP/1.1 Upgrade handshake: request construction and response validation.
//!
//! Generic over `AsyncRead + AsyncWrite` so it can run either over a real
//! TLS stream or a plain loopback `TcpStream` in tests.

use base64::Engine;
use rand::RngCore;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::constants::WS_GUID;
use crate::error::{Error, Result};

/// Generate a fresh, base64-encoded 16-byte `Sec-WebSocket-Key`.
pub fn generate_key() -> String {
    let mut key = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut key);
    base64::engine::general_purpose::STANDARD.encode(key)
}

/// Compute the expected `Sec-WebSocket-Accept` value for a given client key.
pub fn expected_accept(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    let digest = hasher.finalize();
    base64::engine::general_purpose::STANDARD.encode(digest)
}

/// Perform the client side of the handshake over `stream`: send the Upgrade
/// request, read response headers until `\r\n\r\n`, and validate status 101
/// plus a byte-exact `Sec-WebSocket-Accept`.
pub async fn perform<S>(stream: &mut S, host: &str, path: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let key = generate_key();
    let request = format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {key}\r\n\
         Sec-WebSocket-Version: 13\r\n\
         \r\n"
    );
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;

    let response = read_headers(stream).await?;
    validate_response(&response, &key)
}

/// Read bytes one at a time until the `\r\n\r\n` header terminator is seen,
/// returning the headers as a string (without the terminator).
async fn read_headers<S>(stream: &mut S) -> Result<String>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = stream.read(&mut byte).await?;
        if n == 0 {
            return Err(Error::Handshake("connection closed during handshake".into()));
        }
        buf.push(byte[0]);
        if buf.ends_with(b"\r\n\r\n") {
            buf.truncate(buf.len() - 4);
            break;
        }
        if buf.len() > 16 * 1024 {
            return Err(Error::Handshake("handshake response too large".into()));
        }
    }
    String::from_utf8(buf).map_err(|e| Error::Handshake(format!("non-UTF8 response headers: {e}")))
}

fn validate_response(response: &str, key: &str) -> Result<()> {
    let mut lines = response.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| Error::Handshake("empty response".into()))?;

    if !status_line.contains(" 101 ") && !status_line.ends_with(" 101") {
        return Err(Error::Handshake(format!(
            "expected HTTP 101, got: {status_line}"
        )));
    }

    let mut accept: Option<String> = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("sec-websocket-accept") {
                accept = Some(value.trim().to_owned());
            }
        }
    }

    let accept = accept.ok_or_else(|| Error::Handshake("missing Sec-WebSocket-Accept".into()))?;
    let expected = expected_accept(key);
    if accept != expected {
        return Err(Error::Handshake(format!(
            "Sec-WebSocket-Accept mismatch: expected {expected}, got {accept}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 6455 §1.3 worked example.
    #[test]
    fn rfc6455_worked_example() {
        let key = "dGhlIHNhbXBsZSBub25jZQ==";
        assert_eq!(expected_accept(key), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
    }

    #[test]
    fn accepts_matching_101_response() {
        let key = "dGhlIHNhbXBsZSBub25jZQ==";
        let response = "HTTP/1.1 101 Switching Protocols\r\n\
                         Upgrade: websocket\r\n\
                         Connection: Upgrade\r\n\
                         Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=";
        assert!(validate_response(response, key).is_ok());
    }

    #[test]
    fn rejects_non_101_status() {
        let response = "HTTP/1.1 400 Bad Request\r\n\r\n";
        assert!(validate_response(response, "anykey").is_err());
    }

    #[test]
    fn rejects_accept_mismatch() {
        let response = "HTTP/1.1 101 Switching Protocols\r\n\
                         Sec-WebSocket-Accept: not-the-right-value\r\n";
        assert!(validate_response(response, "dGhlIHNhbXBsZSBub25jZQ==").is_err());
    }
}
