use std::time::Duration;

use url::Url;

/// Nexus Mods SSO endpoints
pub mod endpoints {
    pub const SSO_SERVICE: &str = "wss://sso.nexusmods.com";
    pub const SSO_AUTHORIZE_PAGE: &str = "https://www.nexusmods.com/sso";
}

/// Application slug registered with Nexus Mods for this manager
pub const APPLICATION_SLUG: &str = "2pz-me3manager";

/// SSO wire protocol version sent in the handshake
pub const PROTOCOL_VERSION: u8 = 2;

/// Default time allowed for the WebSocket connection to establish
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default wall-clock limit on a session waiting for the user to
/// authorize in the browser. `None` in [`SsoConfig`] disables the limit.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for [`SsoClient`](crate::SsoClient)
#[derive(Debug, Clone)]
pub struct SsoConfig {
    /// WebSocket endpoint of the SSO service
    pub service_url: Url,

    /// Authorization page opened in the user's browser
    pub authorize_page: Url,

    /// Application identifier embedded in the authorization URL
    pub application_slug: String,

    /// Time allowed for connection establishment
    pub connect_timeout: Duration,

    /// Wall-clock limit on waiting for user authorization.
    /// `None` waits forever; the caller is then responsible for
    /// calling `close()`.
    pub auth_timeout: Option<Duration>,
}

impl SsoConfig {
    /// Create config pointing at the production Nexus Mods service
    pub fn nexus() -> Self {
        Self {
            service_url: Url::parse(endpoints::SSO_SERVICE).expect("valid SSO service URL"),
            authorize_page: Url::parse(endpoints::SSO_AUTHORIZE_PAGE)
                .expect("valid SSO authorize page URL"),
            application_slug: APPLICATION_SLUG.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            auth_timeout: Some(DEFAULT_AUTH_TIMEOUT),
        }
    }

    /// Create config for a custom SSO deployment
    pub fn custom(service_url: Url, authorize_page: Url, application_slug: String) -> Self {
        Self {
            service_url,
            authorize_page,
            application_slug,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            auth_timeout: Some(DEFAULT_AUTH_TIMEOUT),
        }
    }
}

impl Default for SsoConfig {
    fn default() -> Self {
        Self::nexus()
    }
}
