/// Events raised by an SSO session, delivered in order over the
/// channel handed out by [`SsoClient::new`](crate::SsoClient::new).
///
/// Events arrive from the session's background task, not from the
/// thread that called `start_auth`; a UI consumer must hop back to
/// its own context before touching shared state.
///
/// `ApiKeyReceived` is terminal success and is always followed by
/// `Closed`. `Error` is non-terminal unless followed by `Closed`: a
/// server rejection leaves the connection open and a later api-key
/// frame is still honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsoEvent {
    /// Transport connected and handshake sent
    Connected,

    /// Server issued a connection token usable to resume this
    /// authorization grant in a later session
    ConnectionTokenReceived(String),

    /// User authorized in the browser; carries the API key
    ApiKeyReceived(String),

    /// A failure the consumer should surface (transport, server
    /// rejection, browser launch, timeout)
    Error(String),

    /// Connection resources released; last event of every session
    Closed,
}
