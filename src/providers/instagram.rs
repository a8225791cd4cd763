//! Instagram
//!
//! The Graph oEmbed endpoint needs an app token (`APP_ID|APP_SECRET`).
//! Without one, only the public page is scraped.

use async_trait::async_trait;

use super::Provider;
use super::page::{finish, from_oembed, scrape};
use crate::LinkMetadata;
use crate::error::Result;
use crate::http::Fetcher;
use crate::oembed;
use crate::platform::PlatformKind;

#[derive(Debug, Clone)]
pub struct InstagramProvider {
    fetcher: Fetcher,
    endpoint: String,
    access_token: Option<String>,
}

impl InstagramProvider {
    pub fn new(fetcher: Fetcher, endpoint: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
            access_token: access_token.filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl Provider for InstagramProvider {
    fn can_handle(&self, url: &str) -> bool {
        PlatformKind::from_url(url) == PlatformKind::Instagram
    }

    async fn resolve(&self, url: &str) -> Result<LinkMetadata> {
        if let Some(token) = &self.access_token {
            let extra = [("access_token", token.as_str())];
            if let Some(info) = oembed::try_lookup(&self.fetcher, &self.endpoint, url, &extra).await {
                return Ok(from_oembed(PlatformKind::Instagram, url, info));
            }
        }
        let scraped = scrape(&self.fetcher, PlatformKind::Instagram, url).await;
        Ok(finish(scraped.metadata))
    }

    fn name(&self) -> &'static str {
        "instagram"
    }
}
