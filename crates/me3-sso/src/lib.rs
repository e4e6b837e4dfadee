//! Nexus Mods SSO (Single Sign-On) authentication client
//!
//! Obtains a long-lived API key from Nexus Mods without the
//! application ever handling a password:
//!
//! 1. Connect to `wss://sso.nexusmods.com`
//! 2. Send a handshake with a fresh session UUID and protocol version
//! 3. Receive a connection token (usable to resume the grant later)
//! 4. The user authorizes in their browser at `nexusmods.com/sso`
//! 5. Receive the API key over the WebSocket and close the connection
//!
//! Events are delivered over a channel rather than callbacks, so the
//! thread boundary between the session's background task and the UI
//! is explicit.
//!
//! # Example
//!
//! ```no_run
//! use me3_sso::{SsoClient, SsoConfig, SsoEvent};
//!
//! #[tokio::main]
//! async fn main() -> me3_sso::Result<()> {
//!     let (mut client, mut events) = SsoClient::new(SsoConfig::nexus());
//!     client.start_auth(None)?;
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             SsoEvent::Connected => {}
//!             SsoEvent::ConnectionTokenReceived(_token) => {
//!                 // token can be persisted to resume this grant later
//!                 client.open_browser()?;
//!             }
//!             SsoEvent::ApiKeyReceived(key) => {
//!                 println!("Authorized, API key: {key}");
//!             }
//!             SsoEvent::Error(message) => {
//!                 eprintln!("SSO error: {message}");
//!             }
//!             SsoEvent::Closed => break,
//!         }
//!     }
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Important Notes
//!
//! - `ApiKeyReceived` fires at most once per session and is always
//!   followed by `Closed`; `Error` leaves the session open unless
//!   followed by `Closed`.
//! - A session waiting for authorization is bounded by
//!   [`SsoConfig::auth_timeout`] (default 5 minutes); set it to `None`
//!   for the unbounded wait and call [`SsoClient::close`] yourself.
//! - The API key is a bearer credential and should never be logged.

pub mod browser;
pub mod client;
pub mod config;
pub mod errors;
pub mod events;
pub mod protocol;
pub mod session;

// Re-export main types
pub use browser::{BrowserOpener, SystemBrowser, build_authorize_url};
pub use client::SsoClient;
pub use config::{APPLICATION_SLUG, PROTOCOL_VERSION, SsoConfig};
pub use errors::{Result, SsoError};
pub use events::SsoEvent;
pub use session::{AuthSession, SessionState};
