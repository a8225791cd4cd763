//! Error types for video-link-info

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while resolving a share link.
///
/// Only [`Error::NoUrlFound`] ever escapes [`LinkResolver::resolve`](crate::LinkResolver).
/// The other variants are produced internally and degrade into empty fields
/// or a dispatcher fallthrough.
#[derive(Debug, Error)]
pub enum Error {
    /// The input text contained no `http(s)://` link
    #[error("no URL found in input")]
    NoUrlFound,

    /// Failed to parse or validate the URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// URL parse error (from url crate)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP request failed (connect, TLS, body read)
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not finish before the deadline
    #[error("request timed out after {0:?}")]
    FetchTimeout(Duration),

    /// The server answered outside 200..=399
    #[error("unexpected HTTP status {0}")]
    FetchNonSuccessStatus(u16),

    /// Extraction found nothing for the named field
    #[error("no pattern matched for {0}")]
    NoPatternMatch(&'static str),

    /// A provider failed while resolving
    #[error("provider {provider} failed: {message}")]
    ProviderFailure {
        provider: &'static str,
        message: String,
    },

    /// Malformed JSON (oEmbed responses)
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for video-link-info operations.
pub type Result<T> = std::result::Result<T, Error>;
