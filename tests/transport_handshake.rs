//! End-to-end exercise of the public transport surface against a
//! hand-written TCP server, standing in for the project's own throwaway
//! mock-server harnesses: a real handshake, one message each way, and a
//! clean close, driven entirely through `deribit_mm`'s public API.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deribit_mm::transport::frame::Opcode;
use deribit_mm::transport::handshake;
use deribit_mm::transport::{MessageHandler, WsTransport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

struct CollectHandler(Arc<Mutex<Vec<String>>>);

#[async_trait]
impl MessageHandler for CollectHandler {
    async fn on_message(&self, text: String) {
        self.0.lock().unwrap().push(text);
    }
}

async fn read_request_headers(sock: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        sock.read_exact(&mut byte).await.unwrap();
        buf.push(byte[0]);
        if buf.ends_with(b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8(buf).unwrap()
}

fn extract_key(request: &str) -> String {
    request
        .lines()
        .find_map(|l| l.split_once(':').filter(|(n, _)| n.eq_ignore_ascii_case("sec-websocket-key")))
        .map(|(_, v)| v.trim().to_owned())
        .unwrap()
}

#[tokio::test]
async fn client_completes_handshake_exchanges_a_message_and_closes_cleanly() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let request = read_request_headers(&mut sock).await;
        assert!(request.starts_with("GET / HTTP/1.1"));
        let accept = handshake::expected_accept(&extract_key(&request));
        let response = format!(
            "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Accept: {accept}\r\n\r\n"
        );
        sock.write_all(response.as_bytes()).await.unwrap();

        // Unmasked server->client text frame: "hello".
        sock.write_all(&[0x81, 0x05]).await.unwrap();
        sock.write_all(b"hello").await.unwrap();

        // Expect the client's masked reply, then its close frame.
        let mut head = [0u8; 2];
        sock.read_exact(&mut head).await.unwrap();
        let len = (head[1] & 0x7F) as usize;
        let mut mask = [0u8; 4];
        sock.read_exact(&mut mask).await.unwrap();
        let mut payload = vec![0u8; len];
        sock.read_exact(&mut payload).await.unwrap();
        for (b, m) in payload.iter_mut().zip(mask.iter().cycle()) {
            *b ^= m;
        }
        assert_eq!(payload, b"world");

        sock.read_exact(&mut head).await.unwrap();
        assert_eq!(head[0] & 0x0F, Opcode::Close.to_u8());

        sock.write_all(&[0x88, 0x00]).await.unwrap();
    });

    let stream = TcpStream::connect(addr).await.unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(CollectHandler(received.clone()));
    let transport = WsTransport::connect_stream(stream, "127.0.0.1", "/", handler)
        .await
        .expect("handshake should succeed against a well-formed 101 response");

    assert!(transport.send("world").await);

    for _ in 0..50 {
        if !received.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(received.lock().unwrap().as_slice(), ["hello".to_owned()]);

    transport.close().await;
    assert!(!transport.is_running());

    server.await.unwrap();
}
