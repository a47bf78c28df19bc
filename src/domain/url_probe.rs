//! Port for checking whether a long URL still answers.

use async_trait::async_trait;

/// Reachability check used by the link health monitor.
///
/// # Implementations
///
/// - [`crate::infrastructure::http_probe::HttpProbe`] - HEAD request over HTTP(S)
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlProbe: Send + Sync {
    /// Returns true if `url` responded with a success or redirect status.
    ///
    /// Network failures and timeouts count as unreachable rather than errors.
    async fn is_reachable(&self, url: &str) -> bool;
}
