//! Validation and canonicalization of long URLs before they are shortened.

use url::Url;

/// Longest URL accepted for shortening.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a long URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed, got '{0}'")]
    UnsupportedProtocol(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("URL is {length} characters long, the limit is {MAX_URL_LENGTH}")]
    TooLong { length: usize },
}

/// Returns the canonical form of `input` that gets stored with a link.
///
/// Parsing already lowercases the host and drops default ports; on top of
/// that only `http`/`https` URLs with a host are accepted, and the fragment
/// is removed since browsers never send it to the redirect target anyway.
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTPS://Example.COM:443/Path#top").unwrap(),
///     "https://example.com/Path"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let input = input.trim();
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong {
            length: input.len(),
        });
    }

    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol(
            url.scheme().to_string(),
        ));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url.into())
}
