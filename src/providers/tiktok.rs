//! TikTok: oEmbed first, then the share page and its embedded JSON

use async_trait::async_trait;

use super::Provider;
use super::page::{finish, from_oembed, scrape};
use crate::LinkMetadata;
use crate::error::Result;
use crate::http::Fetcher;
use crate::oembed;
use crate::platform::PlatformKind;

#[derive(Debug, Clone)]
pub struct TikTokProvider {
    fetcher: Fetcher,
    endpoint: String,
}

impl TikTokProvider {
    pub fn new(fetcher: Fetcher, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Provider for TikTokProvider {
    fn can_handle(&self, url: &str) -> bool {
        PlatformKind::from_url(url) == PlatformKind::TikTok
    }

    async fn resolve(&self, url: &str) -> Result<LinkMetadata> {
        if let Some(info) = oembed::try_lookup(&self.fetcher, &self.endpoint, url, &[]).await {
            return Ok(from_oembed(PlatformKind::TikTok, url, info));
        }
        let scraped = scrape(&self.fetcher, PlatformKind::TikTok, url).await;
        Ok(finish(scraped.metadata))
    }

    fn name(&self) -> &'static str {
        "tiktok"
    }
}
