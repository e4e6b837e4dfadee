use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PROTOCOL_VERSION;

/// Handshake request sent once, immediately after connect
#[derive(Debug, Clone, Serialize)]
pub struct HandshakeRequest<'a> {
    pub id: &'a str,
    /// Reconnect token from a previous session, serialized as `null`
    /// when absent
    pub token: Option<&'a str>,
    pub protocol: u8,
}

impl<'a> HandshakeRequest<'a> {
    pub fn new(id: &'a str, token: Option<&'a str>) -> Self {
        Self {
            id,
            token,
            protocol: PROTOCOL_VERSION,
        }
    }
}

/// General envelope of server frames
#[derive(Debug, Clone, Deserialize)]
pub struct ServerFrame {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<FramePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FramePayload {
    #[serde(default)]
    pub connection_token: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Meaningful content of a decoded server frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    ConnectionToken(String),
    ApiKey(String),
    ServerError(String),
}

/// Classify an inbound text frame.
///
/// Malformed JSON is logged and dropped (`None`): the connection must
/// survive keep-alives and intermediate frames we don't understand. A
/// well-formed frame carrying neither a recognised payload key nor an
/// error flag is likewise ignored.
pub fn decode_frame(raw: &str) -> Option<Frame> {
    let frame: ServerFrame = match serde_json::from_str(raw) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Invalid JSON from SSO service: {}", e);
            return None;
        }
    };

    if !frame.success
        && let Some(message) = frame.error
    {
        return Some(Frame::ServerError(message));
    }

    let payload = frame.data.unwrap_or_default();

    if let Some(token) = payload.connection_token {
        return Some(Frame::ConnectionToken(token));
    }

    if let Some(key) = payload.api_key {
        return Some(Frame::ApiKey(key));
    }

    debug!("Ignoring SSO frame without recognised payload");
    None
}
