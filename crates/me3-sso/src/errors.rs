use thiserror::Error;

/// SSO client error types
///
/// Failures that happen inside a running session (transport errors,
/// server rejections, timeouts) are delivered as
/// [`SsoEvent::Error`](crate::SsoEvent::Error) values, not as `Err`
/// returns; this enum covers only the caller-facing operations.
#[derive(Error, Debug)]
pub enum SsoError {
    #[error("an authentication session is already active")]
    AlreadyActive,

    #[error("no active authentication session")]
    NoActiveSession,

    #[error("failed to open browser: {0}")]
    BrowserLaunch(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SsoError>;
