//! Xiaohongshu: share page, then the `/explore/<id>` page for missing fields

use async_trait::async_trait;

use super::Provider;
use super::page::{finish, scrape};
use crate::LinkMetadata;
use crate::error::Result;
use crate::http::Fetcher;
use crate::platform::PlatformKind;
use crate::recovery::{self, XiaohongshuRecovery};

#[derive(Debug, Clone)]
pub struct XiaohongshuProvider {
    fetcher: Fetcher,
    recovery: XiaohongshuRecovery,
}

impl XiaohongshuProvider {
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            recovery: XiaohongshuRecovery::new(base_url),
        }
    }
}

#[async_trait]
impl Provider for XiaohongshuProvider {
    fn can_handle(&self, url: &str) -> bool {
        PlatformKind::from_url(url) == PlatformKind::Xiaohongshu
    }

    async fn resolve(&self, url: &str) -> Result<LinkMetadata> {
        let scraped = scrape(&self.fetcher, PlatformKind::Xiaohongshu, url).await;
        let mut metadata = scraped.metadata;

        // Short links only carry the note id after redirection.
        let candidates = [scraped.final_url.as_str(), url];
        recovery::enrich(&self.fetcher, &self.recovery, &mut metadata, &candidates).await;

        Ok(finish(metadata))
    }

    fn name(&self) -> &'static str {
        "xiaohongshu"
    }
}
