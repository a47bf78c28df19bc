//! HTTP implementation of the URL reachability probe.

use async_trait::async_trait;
use reqwest::{Client, redirect};
use std::time::Duration;
use tracing::debug;

use crate::domain::url_probe::UrlProbe;

/// Maximum redirects followed before a URL is considered unreachable.
const MAX_REDIRECTS: usize = 5;

/// Probes URLs with a `HEAD` request.
///
/// A URL is reachable when the final response status is 2xx or 3xx.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Builds a probe whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!(url, status = status.as_u16(), "Probed URL");
                status.is_success() || status.is_redirection()
            }
            Err(e) => {
                debug!(url, error = %e, "URL probe failed");
                false
            }
        }
    }
}
