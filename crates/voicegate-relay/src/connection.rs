//! Connection halves and the frames that move between them.
//!
//! Both sides of a session speak WebSocket, but through different stacks:
//! the client arrives over axum's `ws` extractor, the upstream gateway is
//! dialed with tokio-tungstenite. The [`MessageSource`] / [`MessageSink`]
//! traits give the pumps one seam over both, and [`Frame`] is the unit a
//! pump moves — data messages only, with their type tag preserved.
//!
//! Control traffic never surfaces as a [`Frame`]: pings and pongs are
//! absorbed by the adapters, and a Close frame (or the stream simply ending)
//! is reported as a clean end-of-stream (`Ok(None)`).

use crate::error::RelayError;
use axum::extract::ws::{Message as ClientMessage, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// The upstream WebSocket stream type.
pub type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A data message relayed through a session, type tag intact.
///
/// Payloads are opaque: the relay never parses or mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text message.
    Text(String),
    /// Binary message.
    Binary(Vec<u8>),
}

impl Frame {
    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Frame::Text(t) => t.len(),
            Frame::Binary(b) => b.len(),
        }
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Frame> for ClientMessage {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(t) => ClientMessage::Text(t),
            Frame::Binary(b) => ClientMessage::Binary(b),
        }
    }
}

impl From<Frame> for UpstreamMessage {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(t) => UpstreamMessage::Text(t),
            Frame::Binary(b) => UpstreamMessage::Binary(b),
        }
    }
}

/// The read half of a connection. Exactly one task reads from it.
#[async_trait::async_trait]
pub trait MessageSource: Send {
    /// Block for the next data frame.
    ///
    /// Returns `Ok(None)` on a clean end-of-stream (peer Close or the
    /// transport finishing), `Err` on a transport failure.
    async fn next_frame(&mut self) -> Result<Option<Frame>, RelayError>;
}

/// The write half of a connection.
///
/// A sink may be shared by up to two tasks (the client sink is written by
/// both the client-bound pump and the keepalive emitter), so it always
/// travels behind a [`SharedSink`] lock.
#[async_trait::async_trait]
pub trait MessageSink: Send {
    /// Write one data frame, preserving its type tag.
    async fn send_frame(&mut self, frame: Frame) -> Result<(), RelayError>;

    /// Write a liveness Ping control frame.
    async fn send_ping(&mut self) -> Result<(), RelayError>;

    /// Close the connection.
    async fn close(&mut self) -> Result<(), RelayError>;
}

/// A write half shared between tasks. The lock is the serialization point
/// for the two writers of the client connection.
pub type SharedSink = Arc<Mutex<Box<dyn MessageSink>>>;

/// Split a client socket into a shared sink and a boxed source.
pub fn split_client(socket: WebSocket) -> (SharedSink, Box<dyn MessageSource>) {
    let (sink, stream) = socket.split();
    (
        Arc::new(Mutex::new(
            Box::new(ClientSink { inner: sink }) as Box<dyn MessageSink>
        )),
        Box::new(ClientSource { inner: stream }),
    )
}

/// Split an upstream socket into a shared sink and a boxed source.
pub fn split_upstream(socket: UpstreamSocket) -> (SharedSink, Box<dyn MessageSource>) {
    let (sink, stream) = socket.split();
    (
        Arc::new(Mutex::new(
            Box::new(UpstreamSink { inner: sink }) as Box<dyn MessageSink>
        )),
        Box::new(UpstreamSource { inner: stream }),
    )
}

/// Read half of the client WebSocket.
struct ClientSource {
    inner: SplitStream<WebSocket>,
}

#[async_trait::async_trait]
impl MessageSource for ClientSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, RelayError> {
        loop {
            match self.inner.next().await {
                None => return Ok(None),
                Some(Err(e)) => return Err(RelayError::Client(e)),
                Some(Ok(ClientMessage::Text(t))) => return Ok(Some(Frame::Text(t))),
                Some(Ok(ClientMessage::Binary(b))) => return Ok(Some(Frame::Binary(b))),
                Some(Ok(ClientMessage::Close(_))) => return Ok(None),
                // Pings and pongs are answered by the transport layer.
                Some(Ok(_)) => continue,
            }
        }
    }
}

/// Write half of the client WebSocket.
struct ClientSink {
    inner: SplitSink<WebSocket, ClientMessage>,
}

#[async_trait::async_trait]
impl MessageSink for ClientSink {
    async fn send_frame(&mut self, frame: Frame) -> Result<(), RelayError> {
        self.inner.send(frame.into()).await.map_err(RelayError::Client)
    }

    async fn send_ping(&mut self) -> Result<(), RelayError> {
        self.inner
            .send(ClientMessage::Ping(Vec::new()))
            .await
            .map_err(RelayError::Client)
    }

    async fn close(&mut self) -> Result<(), RelayError> {
        self.inner.close().await.map_err(RelayError::Client)
    }
}

/// Read half of the upstream WebSocket.
struct UpstreamSource {
    inner: SplitStream<UpstreamSocket>,
}

#[async_trait::async_trait]
impl MessageSource for UpstreamSource {
    async fn next_frame(&mut self) -> Result<Option<Frame>, RelayError> {
        use tokio_tungstenite::tungstenite::Error as WsError;

        loop {
            match self.inner.next().await {
                None => return Ok(None),
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                    return Ok(None)
                }
                Some(Err(e)) => return Err(RelayError::Upstream(e)),
                Some(Ok(UpstreamMessage::Text(t))) => return Ok(Some(Frame::Text(t))),
                Some(Ok(UpstreamMessage::Binary(b))) => return Ok(Some(Frame::Binary(b))),
                Some(Ok(UpstreamMessage::Close(_))) => return Ok(None),
                // Pings, pongs, and raw frames stay on the control path.
                Some(Ok(_)) => continue,
            }
        }
    }
}

/// Write half of the upstream WebSocket.
struct UpstreamSink {
    inner: SplitSink<UpstreamSocket, UpstreamMessage>,
}

#[async_trait::async_trait]
impl MessageSink for UpstreamSink {
    async fn send_frame(&mut self, frame: Frame) -> Result<(), RelayError> {
        self.inner.send(frame.into()).await.map_err(RelayError::Upstream)
    }

    async fn send_ping(&mut self) -> Result<(), RelayError> {
        self.inner
            .send(UpstreamMessage::Ping(Vec::new()))
            .await
            .map_err(RelayError::Upstream)
    }

    async fn close(&mut self) -> Result<(), RelayError> {
        self.inner.close().await.map_err(RelayError::Upstream)
    }
}
