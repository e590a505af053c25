//! Dialing the OpenAI realtime gateway.

use crate::connection::UpstreamSocket;
use crate::error::RelayError;
use crate::Result;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tracing::debug;
use voicegate_core::SecretString;

/// The realtime gateway endpoint, pinned to a specific model.
pub const OPENAI_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime?model=gpt-realtime";

/// Open the upstream connection on the client's behalf.
///
/// The bearer credential travels only in the `Authorization` header of this
/// handshake; it is never echoed to the client or logged. Failure is
/// terminal for the session: the caller sends [`connect_failure_notice`] to
/// the client and gives up without retrying.
pub async fn connect(url: &str, api_key: &SecretString) -> Result<UpstreamSocket> {
    let mut request = url
        .into_client_request()
        .map_err(|e| RelayError::Handshake(e.to_string()))?;

    let bearer = format!("Bearer {}", api_key.expose_secret());
    let mut value = HeaderValue::from_str(&bearer)
        .map_err(|e| RelayError::Handshake(e.to_string()))?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);

    let (socket, response) = connect_async(request).await?;
    debug!(status = %response.status(), "upstream handshake complete");

    Ok(socket)
}

/// The single synthetic message a client sees when the upstream dial fails.
pub fn connect_failure_notice() -> String {
    serde_json::json!({"error": "cannot connect to openai realtime"}).to_string()
}
