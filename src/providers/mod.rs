//! Per-platform providers and the dispatcher that isolates their failures

mod instagram;
mod page;
mod tiktok;
mod xiaohongshu;
mod youtube;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::LinkMetadata;
use crate::error::{Error, Result};
use crate::http::Fetcher;
use crate::platform::PlatformKind;
use crate::resolver::ResolverOptions;

pub use instagram::InstagramProvider;
pub use page::PageProvider;
pub use tiktok::TikTokProvider;
pub use xiaohongshu::XiaohongshuProvider;
pub use youtube::YouTubeProvider;

/// Resolves links for one platform.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Whether this provider is responsible for `url`.
    fn can_handle(&self, url: &str) -> bool;

    /// Resolve `url` into metadata.
    ///
    /// Errors and panics are contained by [`Registry::dispatch`].
    async fn resolve(&self, url: &str) -> Result<LinkMetadata>;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Ordered, immutable list of providers.
pub struct Registry {
    providers: Vec<Box<dyn Provider>>,
}

impl Registry {
    /// A registry with exactly these providers, tried in order.
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// The built-in providers for every supported platform.
    pub fn standard(fetcher: &Fetcher, options: &ResolverOptions) -> Self {
        Self::new(vec![
            Box::new(YouTubeProvider::new(
                fetcher.clone(),
                &options.youtube_oembed_endpoint,
            )),
            Box::new(TikTokProvider::new(
                fetcher.clone(),
                &options.tiktok_oembed_endpoint,
            )),
            Box::new(PageProvider::new(fetcher.clone(), PlatformKind::Douyin)),
            Box::new(PageProvider::new(fetcher.clone(), PlatformKind::Kuaishou)),
            Box::new(XiaohongshuProvider::new(
                fetcher.clone(),
                &options.xiaohongshu_base_url,
            )),
            Box::new(PageProvider::new(fetcher.clone(), PlatformKind::Bilibili)),
            Box::new(InstagramProvider::new(
                fetcher.clone(),
                &options.instagram_oembed_endpoint,
                options.instagram_access_token.clone(),
            )),
        ])
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolve `url` with the first provider that accepts it.
    ///
    /// A provider that errors or panics is skipped as if it had declined.
    /// When nothing resolves the link, the result is
    /// [`LinkMetadata::unresolved`]. This never fails.
    pub async fn dispatch(&self, url: &str) -> LinkMetadata {
        for provider in &self.providers {
            let name = provider.name();

            let accepts = panic::catch_unwind(AssertUnwindSafe(|| provider.can_handle(url)));
            match accepts {
                Ok(true) => {}
                Ok(false) => continue,
                Err(payload) => {
                    warn!(provider = name, url, panic = %panic_message(&*payload), "can_handle panicked");
                    continue;
                }
            }

            debug!(provider = name, url, "provider selected");
            let outcome = AssertUnwindSafe(provider.resolve(url)).catch_unwind().await;
            let err = match outcome {
                Ok(Ok(metadata)) => return metadata.with_cleaned_topic(),
                Ok(Err(err)) => err,
                Err(payload) => Error::ProviderFailure {
                    provider: name,
                    message: format!("panicked: {}", panic_message(&*payload)),
                },
            };
            warn!(provider = name, url, error = %err, "provider failed, trying next");
        }

        debug!(url, "no provider resolved the link");
        LinkMetadata::unresolved(url)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
