//! The generic, transport-agnostic half of C1: send/receive framing driven
//! over any `AsyncRead + AsyncWrite` stream. [`WsTransport::connect_tls`] in
//! [`super::tls`] is the production entry point (TCP + TLS); this module is
//! exercised directly in tests over a loopback `TcpStream`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rand::RngCore;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf, split};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::frame::{self, FrameHeader, Opcode};
use super::handshake;
use crate::error::{Error, Result};

/// Callback invoked once per complete inbound text message.
///
/// Async, and awaited in-line by the reader loop before the next frame is
/// read — this is what keeps routing single-threaded with respect to a
/// given connection (spec §5: "no interleaving occurs because routing is
/// single-threaded on the reader"), even though the strategy callback it
/// ultimately triggers may itself await a transport send. Implementors
/// typically forward the text into the correlator (C3); see `api::Api`.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(&self, text: String);
}

/// A live WebSocket connection over stream type `S`.
///
/// `send` is safe to call concurrently from any task — writes are
/// serialized under an internal mutex so no two frames interleave on the
/// wire (spec §4.1). The read loop runs in a dedicated spawned task and
/// delivers whole text messages to the registered [`MessageHandler`].
pub struct WsTransport<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    writer: Arc<Mutex<WriteHalf<S>>>,
    running: Arc<AtomicBool>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
}

impl<S> WsTransport<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    /// Perform the handshake over an already-connected stream and start the
    /// reader loop. `handler.on_message` is invoked from the reader task for
    /// every complete text frame.
    pub async fn connect_stream(
        mut stream: S,
        host: &str,
        path: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self> {
        handshake::perform(&mut stream, host, path).await?;

        let (read_half, write_half) = split(stream);
        let writer = Arc::new(Mutex::new(write_half));
        let running = Arc::new(AtomicBool::new(true));

        let reader_task = {
            let writer = writer.clone();
            let running = running.clone();
            tokio::spawn(async move {
                read_loop(read_half, writer, running, handler).await;
            })
        };

        Ok(Self {
            writer,
            running,
            reader_task: Mutex::new(Some(reader_task)),
        })
    }

    /// Whether the transport is still believed to be connected.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Send a text message. Returns `false` if the transport is not running
    /// or the write failed (which also marks the transport as not running).
    pub async fn send(&self, text: &str) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            return false;
        }
        let mask = random_mask();
        let frame = frame::encode_client_frame(Opcode::Text, text.as_bytes(), mask);

        let mut guard = self.writer.lock().await;
        if guard.write_all(&frame).await.is_err() || guard.flush().await.is_err() {
            self.running.store(false, Ordering::SeqCst);
            return false;
        }
        true
    }

    /// Idempotent shutdown: stop the reader, send a best-effort close
    /// frame, and join the reader task. Safe to call after a failed
    /// connect or multiple times.
    pub async fn close(&self) {
        self.running.store(false, Ordering::SeqCst);

        let mask = random_mask();
        let frame = frame::encode_client_frame(Opcode::Close, &[], mask);
        {
            let mut guard = self.writer.lock().await;
            let _ = guard.write_all(&frame).await;
            let _ = guard.flush().await;
            let _ = guard.shutdown().await;
        }

        if let Some(task) = self.reader_task.lock().await.take() {
            let _ = task.await;
        }
    }
}

fn random_mask() -> [u8; 4] {
    let mut mask = [0u8; 4];
    rand::thread_rng().fill_bytes(&mut mask);
    mask
}

async fn read_loop<S>(
    mut read_half: ReadHalf<S>,
    writer: Arc<Mutex<WriteHalf<S>>>,
    running: Arc<AtomicBool>,
    handler: Arc<dyn MessageHandler>,
) where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    loop {
        match read_frame(&mut read_half).await {
            Ok(Some((header, payload))) => {
                match header.opcode {
                    Opcode::Text => {
                        if let Ok(text) = String::from_utf8(payload) {
                            handler.on_message(text).await;
                        } else {
                            tracing::warn!("dropped non-UTF8 text frame");
                        }
                    }
                    Opcode::Close => {
                        tracing::info!("received close frame, shutting down transport");
                        running.store(false, Ordering::SeqCst);
                        let mask = random_mask();
                        let reply = frame::encode_client_frame(Opcode::Close, &[], mask);
                        let mut guard = writer.lock().await;
                        let _ = guard.write_all(&reply).await;
                        let _ = guard.flush().await;
                        break;
                    }
                    Opcode::Ping => {
                        let mask = random_mask();
                        let pong = frame::encode_client_frame(Opcode::Pong, &payload, mask);
                        let mut guard = writer.lock().await;
                        let _ = guard.write_all(&pong).await;
                        let _ = guard.flush().await;
                    }
                    Opcode::Pong | Opcode::Continuation | Opcode::Binary | Opcode::Other(_) => {
                        // Not exchanged by this API; ignore per spec §4.1's
                        // fragmentation-free, text-only contract.
                    }
                }
            }
            Ok(None) => {
                tracing::info!("transport read EOF");
                running.store(false, Ordering::SeqCst);
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "transport read error");
                running.store(false, Ordering::SeqCst);
                break;
            }
        }
    }
}

/// Read one complete frame, applying the mask if present. Returns `Ok(None)`
/// on clean EOF before any header bytes are read.
async fn read_frame<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Option<(FrameHeader, Vec<u8>)>> {
    let mut first_two = [0u8; 2];
    match reader.read_exact(&mut first_two).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(Error::Io(e)),
    }

    let len7 = first_two[1] & 0x7F;
    let extended_len_bytes = match len7 {
        126 => 2,
        127 => 8,
        _ => 0,
    };
    let mut header_rest = vec![0u8; extended_len_bytes];
    if extended_len_bytes > 0 {
        reader.read_exact(&mut header_rest).await?;
    }

    let mut header_buf = Vec::with_capacity(2 + extended_len_bytes);
    header_buf.extend_from_slice(&first_two);
    header_buf.extend_from_slice(&header_rest);
    let (header, _) = frame::decode_header(&header_buf)
        .ok_or_else(|| Error::MalformedFrame("incomplete header".into()))?;

    let mask = if header.masked {
        let mut m = [0u8; 4];
        reader.read_exact(&mut m).await?;
        Some(m)
    } else {
        None
    };

    let len = usize::try_from(header.payload_len)
        .map_err(|_| Error::MalformedFrame("payload length overflow".into()))?;
    let mut payload = vec![0u8; len];
    if len > 0 {
        reader.read_exact(&mut payload).await?;
    }
    if let Some(mask) = mask {
        frame::apply_mask(&mut payload, mask);
    }

    Ok(Some((header, payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tokio::io::duplex;
    use tokio::net::{TcpListener, TcpStream};

    struct CollectHandler(Arc<StdMutex<Vec<String>>>);

    #[async_trait::async_trait]
    impl MessageHandler for CollectHandler {
        async fn on_message(&self, text: String) {
            self.0.lock().unwrap().push(text);
        }
    }

    /// Drives the handshake against a minimal hand-written server that
    /// replies with the correct `Sec-WebSocket-Accept`, then exchanges one
    /// text message each way.
    #[tokio::test]
    async fn round_trips_a_text_message_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            // Read the request up to the blank line.
            let mut buf = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                sock.read_exact(&mut byte).await.unwrap();
                buf.push(byte[0]);
                if buf.ends_with(b"\r\n\r\n") {
                    break;
                }
            }
            let request = String::from_utf8(buf).unwrap();
            let key = request
                .lines()
                .find_map(|l| l.split_once(':').filter(|(n, _)| n.eq_ignore_ascii_case("sec-websocket-key")))
                .map(|(_, v)| v.trim().to_owned())
                .unwrap();
            let accept = handshake::expected_accept(&key);
            let response = format!(
                "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Accept: {accept}\r\n\r\n"
            );
            sock.write_all(response.as_bytes()).await.unwrap();

            // Server frames are unmasked per RFC 6455.
            let reply = super::frame::encode_client_frame(Opcode::Text, b"pong", [0, 0, 0, 0]);
            // Strip the mask bit/key to emulate a real (unmasked) server frame.
            let mut unmasked = vec![reply[0], reply[1] & 0x7F];
            unmasked.extend_from_slice(b"pong");
            sock.write_all(&unmasked).await.unwrap();

            // Read the client's masked text frame.
            let mut head = [0u8; 2];
            sock.read_exact(&mut head).await.unwrap();
            let len = (head[1] & 0x7F) as usize;
            let mut mask = [0u8; 4];
            sock.read_exact(&mut mask).await.unwrap();
            let mut payload = vec![0u8; len];
            sock.read_exact(&mut payload).await.unwrap();
            frame::apply_mask(&mut payload, mask);
            assert_eq!(payload, b"ping");
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(CollectHandler(received.clone()));
        let transport = WsTransport::connect_stream(stream, "127.0.0.1", "/", handler)
            .await
            .unwrap();

        assert!(transport.send("ping").await);

        // Give the reader task a beat to deliver the server's message.
        for _ in 0..50 {
            if !received.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(received.lock().unwrap().as_slice(), ["pong".to_owned()]);

        server.await.unwrap();
        transport.close().await;
    }

    #[tokio::test]
    async fn close_frame_stops_the_reader_and_send_returns_false() {
        let (client_side, server_side) = duplex(4096);
        let mut server_side = server_side;

        let server = tokio::spawn(async move {
            let mut buf = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                server_side.read_exact(&mut byte).await.unwrap();
                buf.push(byte[0]);
                if buf.ends_with(b"\r\n\r\n") {
                    break;
                }
            }
            let request = String::from_utf8(buf).unwrap();
            let key = request
                .lines()
                .find_map(|l| l.split_once(':').filter(|(n, _)| n.eq_ignore_ascii_case("sec-websocket-key")))
                .map(|(_, v)| v.trim().to_owned())
                .unwrap();
            let accept = handshake::expected_accept(&key);
            let response = format!(
                "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Accept: {accept}\r\n\r\n"
            );
            server_side.write_all(response.as_bytes()).await.unwrap();

            // 0x88 0x00 — a close frame with empty payload (spec §8 scenario 5).
            server_side.write_all(&[0x88, 0x00]).await.unwrap();
            // Keep the handle alive until the client has read the close frame.
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        });

        let handler = Arc::new(CollectHandler(Arc::new(StdMutex::new(Vec::new()))));
        let transport = WsTransport::connect_stream(client_side, "localhost", "/", handler)
            .await
            .unwrap();

        for _ in 0..50 {
            if !transport.is_running() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!transport.is_running());
        assert!(!transport.send("anything").await);

        server.await.unwrap();
    }
}
