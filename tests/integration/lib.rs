//! Shared harness helpers for Voicegate integration tests.
//!
//! Spins up a real relay on an ephemeral loopback port and mock upstream
//! gateways built from plain tokio-tungstenite servers, so the end-to-end
//! tests exercise the same code paths a production session would.

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;
use voicegate_core::SecretString;
use voicegate_relay::{RelayConfig, RelayServer, Tunables};

/// Start a relay on an ephemeral port, pointed at `upstream_url`.
pub async fn start_relay(upstream_url: String, tunables: Tunables) -> SocketAddr {
    start_relay_with_key(upstream_url, tunables, "sk-test").await
}

/// Start a relay with a specific credential.
pub async fn start_relay_with_key(
    upstream_url: String,
    tunables: Tunables,
    api_key: &str,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = RelayConfig::new(addr, SecretString::new(api_key));
    config.upstream_url = upstream_url;
    config.tunables = tunables;

    let server = RelayServer::new(config);
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    addr
}

/// Start a mock upstream that echoes every data message back and reports a
/// copy of each received data message over the returned channel.
pub async fn start_echo_upstream() -> (String, mpsc::UnboundedReceiver<Message>) {
    let (received_tx, received_rx) = mpsc::unbounded_channel();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let received_tx = received_tx.clone();
            tokio::spawn(async move {
                let ws = match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(_) => return,
                };
                let (mut sink, mut source) = ws.split();
                while let Some(Ok(msg)) = source.next().await {
                    match msg {
                        Message::Text(_) | Message::Binary(_) => {
                            let _ = received_tx.send(msg.clone());
                            if sink.send(msg).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
            });
        }
    });

    (format!("ws://{}/", addr), received_rx)
}

/// Start a mock upstream that accepts one connection, reports its
/// `Authorization` header, and then stays silent.
pub async fn start_header_capturing_upstream() -> (String, oneshot::Receiver<Option<String>>) {
    let (auth_tx, auth_rx) = oneshot::channel();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let ws = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, resp: Response| {
            let auth = req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let _ = auth_tx.send(auth);
            Ok(resp)
        })
        .await;

        // Keep the connection open but quiet.
        if let Ok(mut ws) = ws {
            while let Some(Ok(_)) = ws.next().await {}
        }
    });

    (format!("ws://{}/", addr), auth_rx)
}

/// Start a mock upstream that accepts connections and never sends anything.
pub async fn start_silent_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                if let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await {
                    while let Some(Ok(_)) = ws.next().await {}
                }
            });
        }
    });

    format!("ws://{}/", addr)
}
