use tracing::{debug, info};

use crate::events::SsoEvent;
use crate::protocol::Frame;

/// State of an authentication session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    HandshakeSent,
    AwaitingAuthorization,
    /// Terminal success; the credential has been received
    Authorized,
    /// A failure was reported; the session is still live and a later
    /// api-key frame is honoured
    Errored,
    Closed,
}

/// One authentication attempt.
///
/// Created by `start_auth` and owned exclusively by the session's
/// background task afterwards; every transition method returns the
/// event to deliver, so all events for a session flow from a single
/// place in order.
#[derive(Debug, Clone)]
pub struct AuthSession {
    session_id: String,
    reconnect_token: Option<String>,
    state: SessionState,
    credential: Option<String>,
    last_error: Option<String>,
}

impl AuthSession {
    pub fn new(session_id: String, reconnect_token: Option<String>) -> Self {
        Self {
            session_id,
            reconnect_token,
            state: SessionState::Idle,
            credential: None,
            last_error: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Token sent in the handshake: the server-issued one if received,
    /// otherwise whatever the caller supplied
    pub fn reconnect_token(&self) -> Option<&str> {
        self.reconnect_token.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn begin_connect(&mut self) {
        self.state = SessionState::Connecting;
    }

    /// Transport connected and handshake written
    pub fn handshake_sent(&mut self) -> SsoEvent {
        self.state = SessionState::HandshakeSent;
        SsoEvent::Connected
    }

    /// Advance the session with a decoded server frame.
    ///
    /// Frames arriving after terminal success are ignored, which is
    /// what makes `ApiKeyReceived` fire at most once per session.
    pub fn apply_frame(&mut self, frame: Frame) -> Option<SsoEvent> {
        if matches!(self.state, SessionState::Authorized | SessionState::Closed) {
            debug!(
                session_id = %self.session_id,
                "Ignoring frame in terminal state {:?}", self.state
            );
            return None;
        }

        match frame {
            Frame::ConnectionToken(token) => {
                // Server value is authoritative over any caller-supplied token
                self.reconnect_token = Some(token.clone());
                self.state = SessionState::AwaitingAuthorization;
                info!(session_id = %self.session_id, "Received connection token");
                Some(SsoEvent::ConnectionTokenReceived(token))
            }
            Frame::ApiKey(key) => {
                self.credential = Some(key.clone());
                self.state = SessionState::Authorized;
                info!(session_id = %self.session_id, "Received API key via SSO");
                Some(SsoEvent::ApiKeyReceived(key))
            }
            Frame::ServerError(message) => {
                self.last_error = Some(message.clone());
                self.state = SessionState::Errored;
                Some(SsoEvent::Error(message))
            }
        }
    }

    /// Record a transport-level failure. Suppressed once the session
    /// has already succeeded or closed.
    pub fn transport_error(&mut self, message: String) -> Option<SsoEvent> {
        if matches!(self.state, SessionState::Authorized | SessionState::Closed) {
            return None;
        }
        self.last_error = Some(message.clone());
        self.state = SessionState::Errored;
        Some(SsoEvent::Error(message))
    }

    /// Release the session. Emits `Closed` exactly once.
    pub fn mark_closed(&mut self) -> Option<SsoEvent> {
        if self.state == SessionState::Closed {
            return None;
        }
        self.state = SessionState::Closed;
        Some(SsoEvent::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AuthSession {
        AuthSession::new("session-1".to_string(), None)
    }

    #[test]
    fn test_happy_path_transitions_in_order() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Idle);

        s.begin_connect();
        assert_eq!(s.state(), SessionState::Connecting);

        assert_eq!(s.handshake_sent(), SsoEvent::Connected);
        assert_eq!(s.state(), SessionState::HandshakeSent);

        let event = s.apply_frame(Frame::ConnectionToken("tok-1".to_string()));
        assert_eq!(event, Some(SsoEvent::ConnectionTokenReceived("tok-1".to_string())));
        assert_eq!(s.state(), SessionState::AwaitingAuthorization);
        assert_eq!(s.reconnect_token(), Some("tok-1"));

        let event = s.apply_frame(Frame::ApiKey("abc123".to_string()));
        assert_eq!(event, Some(SsoEvent::ApiKeyReceived("abc123".to_string())));
        assert_eq!(s.state(), SessionState::Authorized);
        assert_eq!(s.credential(), Some("abc123"));

        assert_eq!(s.mark_closed(), Some(SsoEvent::Closed));
        assert_eq!(s.state(), SessionState::Closed);
    }

    #[test]
    fn test_api_key_delivered_at_most_once() {
        let mut s = session();
        s.begin_connect();
        s.handshake_sent();

        assert!(s.apply_frame(Frame::ApiKey("first".to_string())).is_some());
        // second api-key frame after terminal success is ignored
        assert!(s.apply_frame(Frame::ApiKey("second".to_string())).is_none());
        assert_eq!(s.credential(), Some("first"));
    }

    #[test]
    fn test_server_error_is_recoverable() {
        let mut s = session();
        s.begin_connect();
        s.handshake_sent();

        let event = s.apply_frame(Frame::ServerError("rejected".to_string()));
        assert_eq!(event, Some(SsoEvent::Error("rejected".to_string())));
        assert_eq!(s.state(), SessionState::Errored);
        assert_eq!(s.last_error(), Some("rejected"));

        // a valid api-key frame can still complete the session
        let event = s.apply_frame(Frame::ApiKey("abc123".to_string()));
        assert_eq!(event, Some(SsoEvent::ApiKeyReceived("abc123".to_string())));
        assert_eq!(s.state(), SessionState::Authorized);
    }

    #[test]
    fn test_server_token_overwrites_caller_token() {
        let mut s = AuthSession::new("session-1".to_string(), Some("old-tok".to_string()));
        assert_eq!(s.reconnect_token(), Some("old-tok"));

        s.begin_connect();
        s.handshake_sent();
        s.apply_frame(Frame::ConnectionToken("new-tok".to_string()));
        assert_eq!(s.reconnect_token(), Some("new-tok"));
    }

    #[test]
    fn test_mark_closed_is_idempotent() {
        let mut s = session();
        assert_eq!(s.mark_closed(), Some(SsoEvent::Closed));
        assert_eq!(s.mark_closed(), None);
        assert_eq!(s.mark_closed(), None);
    }

    #[test]
    fn test_no_events_after_closed() {
        let mut s = session();
        s.mark_closed();

        assert!(s.apply_frame(Frame::ApiKey("late".to_string())).is_none());
        assert!(s.transport_error("reset".to_string()).is_none());
        assert_eq!(s.credential(), None);
    }

    #[test]
    fn test_transport_error_suppressed_after_success() {
        let mut s = session();
        s.begin_connect();
        s.handshake_sent();
        s.apply_frame(Frame::ApiKey("abc123".to_string()));

        // close-handshake hiccups after the key arrived are not surfaced
        assert!(s.transport_error("broken pipe".to_string()).is_none());
        assert_eq!(s.state(), SessionState::Authorized);
    }
}
