//! YouTube: oEmbed first, page scrape second

use async_trait::async_trait;

use super::Provider;
use super::page::{finish, from_oembed, scrape};
use crate::LinkMetadata;
use crate::error::Result;
use crate::http::Fetcher;
use crate::oembed;
use crate::platform::PlatformKind;

#[derive(Debug, Clone)]
pub struct YouTubeProvider {
    fetcher: Fetcher,
    endpoint: String,
}

impl YouTubeProvider {
    pub fn new(fetcher: Fetcher, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Provider for YouTubeProvider {
    fn can_handle(&self, url: &str) -> bool {
        PlatformKind::from_url(url) == PlatformKind::YouTube
    }

    async fn resolve(&self, url: &str) -> Result<LinkMetadata> {
        let extra = [("format", "json")];
        if let Some(info) = oembed::try_lookup(&self.fetcher, &self.endpoint, url, &extra).await {
            return Ok(from_oembed(PlatformKind::YouTube, url, info));
        }
        let scraped = scrape(&self.fetcher, PlatformKind::YouTube, url).await;
        Ok(finish(scraped.metadata))
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}
