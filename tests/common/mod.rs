//! Common test utilities

#![allow(dead_code)]

use crlfscan::models::{Marker, ScanConfig};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_native_tls::TlsAcceptor;

/// Creates a test ScanConfig with short timeouts
pub fn test_config() -> ScanConfig {
    ScanConfig {
        concurrency: 4,
        timeout_secs: 5,
        follow_redirects: false,
        marker: Marker::new("X-Injected", "evidence-marker"),
        silent: true,
        ..ScanConfig::default()
    }
}

/// Raw request heads received by a [`spawn_server`] listener
pub type Captured = Arc<Mutex<Vec<Vec<u8>>>>;

/// Reads from the stream until the end of the request head or EOF
async fn read_head<S: AsyncRead + Unpin>(stream: &mut S) -> Vec<u8> {
    let mut head = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                head.extend_from_slice(&buf[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    head
}

/// Reads one request head, records it and writes `respond(head)` back
async fn answer<S, F>(mut stream: S, respond: &F, sink: &Captured)
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: Fn(&[u8]) -> Vec<u8>,
{
    let head = read_head(&mut stream).await;
    let reply = respond(&head);
    sink.lock().expect("capture lock").push(head);
    let _ = stream.write_all(&reply).await;
    let _ = stream.shutdown().await;
}

/// Starts a server answering every connection with `respond(head)`.
///
/// With an `acceptor` each connection is TLS-wrapped first. Every received
/// request head is recorded in the returned [`Captured`].
async fn serve<F>(respond: F, acceptor: Option<TlsAcceptor>) -> (SocketAddr, Captured)
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);
    let acceptor = acceptor.map(Arc::new);

    let sink = Arc::clone(&captured);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let sink = Arc::clone(&sink);
            let respond = Arc::clone(&respond);
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                match acceptor {
                    Some(acceptor) => {
                        if let Ok(tls) = acceptor.accept(stream).await {
                            answer(tls, respond.as_ref(), &sink).await;
                        }
                    }
                    None => answer(stream, respond.as_ref(), &sink).await,
                }
            });
        }
    });

    (addr, captured)
}

/// Plain TCP server answering every connection with `respond(head)`
pub async fn spawn_server<F>(respond: F) -> (SocketAddr, Captured)
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
{
    serve(respond, None).await
}

/// Acceptor presenting a freshly generated self-signed `localhost` certificate
fn self_signed_acceptor() -> TlsAcceptor {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .expect("generate certificate");
    let identity = native_tls::Identity::from_pkcs8(
        certified.cert.pem().as_bytes(),
        certified.key_pair.serialize_pem().as_bytes(),
    )
    .expect("identity");
    let acceptor = native_tls::TlsAcceptor::new(identity).expect("acceptor");
    TlsAcceptor::from(acceptor)
}

/// TLS server with an untrusted certificate that reflects the request
/// target into `Location`
pub async fn spawn_tls_reflecting_server() -> (SocketAddr, Captured) {
    serve(reflecting_response, Some(self_signed_acceptor())).await
}

/// Request target as it appears between the method and ` HTTP/1.1`
pub fn request_target(head: &[u8]) -> &[u8] {
    let start = head.iter().position(|b| *b == b' ').map_or(0, |i| i + 1);
    let end = head
        .windows(11)
        .position(|w| w == b" HTTP/1.1\r\n")
        .unwrap_or(head.len());
    &head[start.min(end)..end]
}

/// Simulates a server that copies the request target into `Location`
/// without stripping line breaks.
pub fn reflecting_response(head: &[u8]) -> Vec<u8> {
    let mut reply = b"HTTP/1.1 302 Found\r\nLocation: ".to_vec();
    reply.extend_from_slice(request_target(head));
    reply.extend_from_slice(b"\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
    reply
}

/// Server that reflects the request target into a response header
pub async fn spawn_reflecting_server() -> (SocketAddr, Captured) {
    spawn_server(reflecting_response).await
}

/// Address with nothing listening on it
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}
