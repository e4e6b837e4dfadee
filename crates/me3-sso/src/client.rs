use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::browser::{BrowserOpener, SystemBrowser, build_authorize_url};
use crate::config::SsoConfig;
use crate::errors::{Result, SsoError};
use crate::events::SsoEvent;
use crate::protocol::{self, HandshakeRequest};
use crate::session::{AuthSession, SessionState};

/// WebSocket client for the Nexus Mods SSO authentication flow.
///
/// Each call to [`start_auth`](Self::start_auth) spawns one background
/// task that owns the connection and the [`AuthSession`], and delivers
/// [`SsoEvent`]s over the channel returned by [`new`](Self::new). The
/// last event of every session is [`SsoEvent::Closed`].
pub struct SsoClient {
    config: SsoConfig,
    browser: Arc<dyn BrowserOpener>,
    events: mpsc::UnboundedSender<SsoEvent>,
    active: Option<ActiveSession>,
}

struct ActiveSession {
    session_id: String,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SsoClient {
    /// Create a client launching URLs with the platform default browser
    pub fn new(config: SsoConfig) -> (Self, mpsc::UnboundedReceiver<SsoEvent>) {
        Self::with_browser(config, Arc::new(SystemBrowser))
    }

    /// Create a client with a custom browser launcher
    pub fn with_browser(
        config: SsoConfig,
        browser: Arc<dyn BrowserOpener>,
    ) -> (Self, mpsc::UnboundedReceiver<SsoEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                config,
                browser,
                events,
                active: None,
            },
            receiver,
        )
    }

    /// Start the SSO authentication flow.
    ///
    /// Non-blocking: returns the freshly generated session id while
    /// connection establishment proceeds on a background task. Must be
    /// called within a Tokio runtime.
    ///
    /// Fails with [`SsoError::AlreadyActive`] while a previous session
    /// is still live; a session that already finished is reaped here.
    ///
    /// # Arguments
    /// * `reconnect_token` - Token from a previous session to resume
    ///   its authorization grant
    #[instrument(skip(self, reconnect_token))]
    pub fn start_auth(&mut self, reconnect_token: Option<String>) -> Result<String> {
        if let Some(active) = self.active.take() {
            if !active.task.is_finished() {
                self.active = Some(active);
                return Err(SsoError::AlreadyActive);
            }
        }

        let session_id = Uuid::new_v4().to_string();
        info!(session_id = %session_id, "Starting SSO authentication");

        let session = AuthSession::new(session_id.clone(), reconnect_token);
        let (cancel, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(run_session(
            self.config.clone(),
            session,
            self.events.clone(),
            cancel_rx,
        ));

        self.active = Some(ActiveSession {
            session_id: session_id.clone(),
            cancel,
            task,
        });

        Ok(session_id)
    }

    /// Close the active session and release its connection.
    ///
    /// Idempotent and safe in any state, including before the
    /// transport finished connecting. Joins the background task, so no
    /// further events are delivered after this returns.
    #[instrument(skip(self))]
    pub async fn close(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(session_id = %active.session_id, "Closing SSO session");
            let _ = active.cancel.send(true);
            let _ = active.task.await;
        }
    }

    /// Open the user's browser at the authorization page for the
    /// active session.
    ///
    /// Launch failure is non-fatal: it is surfaced as an
    /// [`SsoEvent::Error`] and the session stays open so the user can
    /// visit the returned URL manually.
    #[instrument(skip(self))]
    pub fn open_browser(&self) -> Result<Url> {
        let Some(active) = &self.active else {
            warn!("Cannot open browser: no active session");
            return Err(SsoError::NoActiveSession);
        };

        let url = build_authorize_url(&self.config, &active.session_id);
        info!("Opening SSO authorization page: {}", url);

        if let Err(e) = self.browser.open(&url) {
            error!("Failed to open browser: {}", e);
            let _ = self
                .events
                .send(SsoEvent::Error(format!("Failed to open browser: {e}")));
            return Err(SsoError::BrowserLaunch(e));
        }

        Ok(url)
    }

    /// Session id of the active session, if any
    pub fn session_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.session_id.as_str())
    }

    /// Whether a session task is currently live
    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.task.is_finished())
    }
}

/// Drive one session: connect, handshake, then read frames until the
/// credential arrives, the caller cancels, a deadline expires, or the
/// transport fails. Emits `Closed` last on every path.
async fn run_session(
    config: SsoConfig,
    mut session: AuthSession,
    events: mpsc::UnboundedSender<SsoEvent>,
    mut cancel: watch::Receiver<bool>,
) {
    session.begin_connect();

    let connect = time::timeout(
        config.connect_timeout,
        connect_async(config.service_url.as_str()),
    );

    let mut ws = tokio::select! {
        // `changed` also resolves when the client is dropped, which
        // tears the session down with it
        _ = cancel.changed() => {
            finish(&mut session, &events);
            return;
        }
        result = connect => match result {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => {
                error!("SSO WebSocket connect failed: {}", e);
                emit(&events, session.transport_error(e.to_string()));
                finish(&mut session, &events);
                return;
            }
            Err(_) => {
                let message = format!("Timed out connecting to {}", config.service_url);
                warn!("{message}");
                emit(&events, session.transport_error(message));
                finish(&mut session, &events);
                return;
            }
        }
    };
    info!(session_id = %session.session_id(), "SSO WebSocket connected");

    let payload = {
        let handshake = HandshakeRequest::new(session.session_id(), session.reconnect_token());
        serde_json::to_string(&handshake)
    };
    let payload = match payload {
        Ok(payload) => payload,
        Err(e) => {
            emit(
                &events,
                session.transport_error(format!("Failed to encode handshake: {e}")),
            );
            finish(&mut session, &events);
            return;
        }
    };

    if let Err(e) = ws.send(Message::Text(payload.into())).await {
        error!("Failed to send SSO handshake: {}", e);
        emit(
            &events,
            session.transport_error(format!("Failed to send handshake: {e}")),
        );
        finish(&mut session, &events);
        return;
    }
    debug!(session_id = %session.session_id(), "Sent SSO handshake");
    let _ = events.send(session.handshake_sent());

    let deadline = config.auth_timeout.map(|t| time::Instant::now() + t);

    loop {
        tokio::select! {
            _ = cancel.changed() => break,
            _ = authorization_deadline(deadline) => {
                warn!(session_id = %session.session_id(), "SSO authorization timed out");
                emit(
                    &events,
                    session.transport_error(
                        "Authorization timed out waiting for user approval".to_string(),
                    ),
                );
                break;
            }
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    debug!("SSO frame received ({} bytes)", text.len());
                    if let Some(decoded) = protocol::decode_frame(text.as_str())
                        && let Some(event) = session.apply_frame(decoded)
                    {
                        let _ = events.send(event);
                        if session.state() == SessionState::Authorized {
                            // credential received, terminate the connection
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    info!(session_id = %session.session_id(), "SSO service closed the connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("SSO WebSocket error: {}", e);
                    emit(&events, session.transport_error(e.to_string()));
                    break;
                }
                None => break,
            }
        }
    }

    if let Err(e) = ws.close(None).await {
        debug!("SSO WebSocket close: {}", e);
    }
    finish(&mut session, &events);
}

async fn authorization_deadline(deadline: Option<time::Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn emit(events: &mpsc::UnboundedSender<SsoEvent>, event: Option<SsoEvent>) {
    if let Some(event) = event {
        let _ = events.send(event);
    }
}

fn finish(session: &mut AuthSession, events: &mpsc::UnboundedSender<SsoEvent>) {
    emit(events, session.mark_closed());
}
