//! The relay server: accepting clients and wiring up sessions.

use crate::connection::{split_client, split_upstream};
use crate::error::RelayError;
use crate::session::{run_session, Tunables};
use crate::upstream;
use crate::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::SinkExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use voicegate_core::SecretString;

/// Relay configuration, constructed once and handed to the server.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the relay listens on.
    pub listen_addr: SocketAddr,

    /// Bearer credential for the upstream gateway.
    pub api_key: SecretString,

    /// Upstream gateway endpoint. Defaults to the production realtime URL.
    pub upstream_url: String,

    /// Session timing parameters.
    pub tunables: Tunables,
}

impl RelayConfig {
    /// Create a config pointing at the production realtime gateway.
    pub fn new(listen_addr: SocketAddr, api_key: SecretString) -> Self {
        Self {
            listen_addr,
            api_key,
            upstream_url: upstream::OPENAI_REALTIME_URL.to_string(),
            tunables: Tunables::default(),
        }
    }
}

/// Server state shared across sessions. Read-only after startup.
struct RelayState {
    config: RelayConfig,
}

/// The WebSocket relay server.
pub struct RelayServer {
    state: Arc<RelayState>,
}

impl RelayServer {
    /// Create a new relay server.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            state: Arc::new(RelayState { config }),
        }
    }

    /// Bind the configured address and serve until the process exits.
    ///
    /// A bind failure is startup-fatal and surfaces to the caller; session
    /// errors are logged and never escape this call.
    pub async fn run(&self) -> Result<()> {
        let addr = self.state.config.listen_addr;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(RelayError::Io)?;
        info!("Listening on {}", addr);
        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    ///
    /// Split out from [`run`](Self::run) so callers that need the ephemeral
    /// port can bind first.
    pub async fn serve(&self, listener: tokio::net::TcpListener) -> Result<()> {
        let app = self.create_router();
        axum::serve(listener, app).await.map_err(RelayError::Io)?;
        Ok(())
    }

    /// Create the Axum router. A single `/ws` route; nothing else inbound.
    fn create_router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws_handler))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }
}

/// WebSocket upgrade handler. Upgrade failure is answered with an error
/// status by axum and no session is created.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

/// Drive one session from upgrade to teardown.
///
/// Connecting -> Relaying -> Closing -> Closed; upstream connect failure
/// short-circuits straight to Closed after the synthetic error notice.
async fn handle_session(socket: WebSocket, state: Arc<RelayState>) {
    let session_id = uuid::Uuid::new_v4().to_string();
    info!(session = %session_id, "client connected");

    // Connecting: dial the gateway on the client's behalf.
    let upstream_socket =
        match upstream::connect(&state.config.upstream_url, &state.config.api_key).await {
            Ok(socket) => socket,
            Err(e) => {
                warn!(session = %session_id, error = %e, "upstream connect failed");
                notify_connect_failure(socket, &session_id).await;
                return;
            }
        };

    // Relaying: both pumps and the keepalive emitter run until the first
    // terminal signal, then the supervisor closes both connections.
    let (client_sink, client_source) = split_client(socket);
    let (upstream_sink, upstream_source) = split_upstream(upstream_socket);

    debug!(session = %session_id, "relaying");
    run_session(
        &session_id,
        client_source,
        client_sink,
        upstream_source,
        upstream_sink,
        state.config.tunables,
    )
    .await;

    debug!(session = %session_id, "closed");
}

/// Fail-fast path: one synthetic text message, then close. No pump ever
/// starts for this session.
async fn notify_connect_failure(mut socket: WebSocket, session_id: &str) {
    let notice = upstream::connect_failure_notice();
    if let Err(e) = socket.send(Message::Text(notice)).await {
        debug!(session = %session_id, error = %e, "could not deliver connect-failure notice");
    }
    let _ = socket.close().await;
}
