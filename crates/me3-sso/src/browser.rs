use tracing::debug;
use url::Url;

use crate::config::SsoConfig;

/// Build the authorization URL the user visits to approve the session
pub fn build_authorize_url(config: &SsoConfig, session_id: &str) -> Url {
    let mut url = config.authorize_page.clone();
    url.query_pairs_mut()
        .append_pair("id", session_id)
        .append_pair("application", &config.application_slug);

    debug!("Built authorize URL: {}", url);
    url
}

/// OS capability for launching the default browser.
///
/// Launch failure (no browser registered, sandboxing) must never take
/// the session down; [`SsoClient`](crate::SsoClient) surfaces it as a
/// non-fatal error event and the user can open the link manually.
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &Url) -> std::io::Result<()>;
}

/// Opens URLs with the platform default browser
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &Url) -> std::io::Result<()> {
        open::that(url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_embeds_session_and_application() {
        let config = SsoConfig::nexus();
        let url = build_authorize_url(&config, "abc-123");

        assert_eq!(
            url.as_str(),
            "https://www.nexusmods.com/sso?id=abc-123&application=2pz-me3manager"
        );
    }

    #[test]
    fn test_authorize_url_uses_configured_page() {
        let config = SsoConfig::custom(
            Url::parse("ws://127.0.0.1:9000").unwrap(),
            Url::parse("http://127.0.0.1:9000/sso").unwrap(),
            "test-app".to_string(),
        );
        let url = build_authorize_url(&config, "id-1");

        assert_eq!(url.as_str(), "http://127.0.0.1:9000/sso?id=id-1&application=test-app");
    }
}
