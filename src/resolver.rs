//! End-to-end resolution: share text in, [`LinkMetadata`] out

use std::env;
use std::time::Duration;

use tracing::info;

use crate::LinkMetadata;
use crate::error::{Error, Result};
use crate::http::{Fetcher, HttpOptions};
use crate::oembed;
use crate::providers::Registry;
use crate::recovery::XIAOHONGSHU_BASE_URL;
use crate::text::pick_first_url;

/// Environment variable holding the Instagram Graph token (`APP_ID|APP_SECRET`).
pub const INSTAGRAM_TOKEN_ENV: &str = "IG_OEMBED_TOKEN";

/// Environment variable overriding the per-request deadline, in seconds.
pub const TIMEOUT_ENV: &str = "VIDEO_LINK_TIMEOUT_SECS";

/// Configuration for a [`LinkResolver`].
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Options for every outbound request
    pub http: HttpOptions,

    /// YouTube oEmbed endpoint
    pub youtube_oembed_endpoint: String,

    /// TikTok oEmbed endpoint
    pub tiktok_oembed_endpoint: String,

    /// Instagram Graph oEmbed endpoint
    pub instagram_oembed_endpoint: String,

    /// Instagram Graph token. Without it the oEmbed lookup is skipped.
    pub instagram_access_token: Option<String>,

    /// Origin of the Xiaohongshu recovery page
    pub xiaohongshu_base_url: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            http: HttpOptions::default(),
            youtube_oembed_endpoint: oembed::YOUTUBE_ENDPOINT.to_string(),
            tiktok_oembed_endpoint: oembed::TIKTOK_ENDPOINT.to_string(),
            instagram_oembed_endpoint: oembed::INSTAGRAM_ENDPOINT.to_string(),
            instagram_access_token: None,
            xiaohongshu_base_url: XIAOHONGSHU_BASE_URL.to_string(),
        }
    }
}

impl ResolverOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, overridden by `IG_OEMBED_TOKEN` and `VIDEO_LINK_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(token) = env::var(INSTAGRAM_TOKEN_ENV)
            && !token.trim().is_empty()
        {
            options.instagram_access_token = Some(token.trim().to_string());
        }
        if let Some(secs) = env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            options.http = options.http.timeout(Duration::from_secs(secs));
        }
        options
    }

    /// Set the HTTP options.
    pub fn http(mut self, http: HttpOptions) -> Self {
        self.http = http;
        self
    }

    /// Set the YouTube oEmbed endpoint.
    pub fn youtube_oembed_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.youtube_oembed_endpoint = endpoint.into();
        self
    }

    /// Set the TikTok oEmbed endpoint.
    pub fn tiktok_oembed_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.tiktok_oembed_endpoint = endpoint.into();
        self
    }

    /// Set the Instagram oEmbed endpoint.
    pub fn instagram_oembed_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.instagram_oembed_endpoint = endpoint.into();
        self
    }

    /// Set the Instagram Graph token.
    pub fn instagram_access_token(mut self, token: impl Into<String>) -> Self {
        self.instagram_access_token = Some(token.into());
        self
    }

    /// Set the Xiaohongshu recovery origin.
    pub fn xiaohongshu_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.xiaohongshu_base_url = base_url.into();
        self
    }
}

/// Resolves share text into [`LinkMetadata`].
///
/// Holds one HTTP client and the provider registry; build it once and share
/// it between requests.
pub struct LinkResolver {
    registry: Registry,
}

impl LinkResolver {
    /// Build a resolver with the standard providers.
    pub fn new(options: ResolverOptions) -> Result<Self> {
        let fetcher = Fetcher::new(options.http.clone())?;
        Ok(Self {
            registry: Registry::standard(&fetcher, &options),
        })
    }

    /// Build a resolver around a custom registry.
    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    /// Resolve the first link found in `text`.
    ///
    /// Fails only with [`Error::NoUrlFound`]; every other problem degrades
    /// into empty fields.
    pub async fn resolve(&self, text: &str) -> Result<LinkMetadata> {
        let url = pick_first_url(text);
        if url.is_empty() {
            return Err(Error::NoUrlFound);
        }
        Ok(self.resolve_url(&url).await)
    }

    /// Resolve a URL that has already been extracted.
    pub async fn resolve_url(&self, url: &str) -> LinkMetadata {
        let metadata = self.registry.dispatch(url).await;
        info!(
            url,
            platform = %metadata.platform,
            has_title = !metadata.title.is_empty(),
            has_media = !metadata.direct_media_url.is_empty(),
            "link resolved"
        );
        metadata
    }
}
