//! Share-page scraping shared by all providers

use async_trait::async_trait;
use tracing::debug;

use super::Provider;
use crate::LinkMetadata;
use crate::error::Result;
use crate::http::{FetchResult, Fetcher};
use crate::media::extract_media_url;
use crate::metadata::PageMetadata;
use crate::oembed::OembedInfo;
use crate::platform::PlatformKind;

/// Result of the primary page fetch.
pub(crate) struct Scraped {
    pub metadata: LinkMetadata,
    /// Post-redirect URL, or the requested one if the fetch failed.
    pub final_url: String,
}

/// Fetch `url` and extract metadata and a media URL.
///
/// The platform is re-derived from the post-redirect URL so short links that
/// land on a canonical host use that host's cascade. A failed fetch yields
/// empty fields.
pub(crate) async fn scrape(fetcher: &Fetcher, platform: PlatformKind, url: &str) -> Scraped {
    let page = fetcher.fetch(url).await;
    Scraped {
        metadata: read_page(platform, url, &page),
        final_url: page.url,
    }
}

/// The platform a page belongs to after redirects. Unknown hosts keep the
/// provider's platform.
pub(crate) fn effective_platform(provider: PlatformKind, final_url: &str) -> PlatformKind {
    match PlatformKind::from_url(final_url) {
        PlatformKind::Unknown => provider,
        redirected => redirected,
    }
}

fn read_page(platform: PlatformKind, url: &str, page: &FetchResult) -> LinkMetadata {
    let effective = effective_platform(platform, &page.url);
    let mut metadata = LinkMetadata::empty(effective, url);

    if page.has_html() {
        metadata.apply_page(PageMetadata::extract(&page.body));
        metadata.direct_media_url = extract_media_url(effective, &page.body);
    } else {
        debug!(url, status = page.status_code, failure = ?page.failure, "share page unusable");
    }
    metadata
}

/// Metadata from an oEmbed answer.
pub(crate) fn from_oembed(platform: PlatformKind, url: &str, info: OembedInfo) -> LinkMetadata {
    LinkMetadata {
        title: info.title,
        cover_image_url: info.thumbnail_url,
        ..LinkMetadata::empty(platform, url)
    }
}

/// Give untitled results the platform placeholder title.
pub(crate) fn finish(mut metadata: LinkMetadata) -> LinkMetadata {
    if metadata.title.is_empty() {
        metadata.title = metadata.platform.placeholder_title();
    }
    metadata
}

/// Scrape-only provider for platforms without an oEmbed endpoint or
/// recovery page (Douyin, Kuaishou, Bilibili).
#[derive(Debug, Clone)]
pub struct PageProvider {
    fetcher: Fetcher,
    platform: PlatformKind,
}

impl PageProvider {
    pub fn new(fetcher: Fetcher, platform: PlatformKind) -> Self {
        Self { fetcher, platform }
    }
}

#[async_trait]
impl Provider for PageProvider {
    fn can_handle(&self, url: &str) -> bool {
        PlatformKind::from_url(url) == self.platform
    }

    async fn resolve(&self, url: &str) -> Result<LinkMetadata> {
        let scraped = scrape(&self.fetcher, self.platform, url).await;
        Ok(finish(scraped.metadata))
    }

    fn name(&self) -> &'static str {
        self.platform.tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_uses_placeholder() {
        let meta = finish(LinkMetadata::empty(PlatformKind::Kuaishou, "https://v.kuaishou.com/x"));
        assert_eq!(meta.title, "[快手] 内容");

        let titled = finish(LinkMetadata {
            title: "已有标题".into(),
            ..LinkMetadata::empty(PlatformKind::Kuaishou, "https://v.kuaishou.com/x")
        });
        assert_eq!(titled.title, "已有标题");
    }

    const SHORT_LINK: &str = "https://v.douyin.com/abc123/";

    // Douyin prefers playAddr, TikTok prefers downloadAddr.
    const MIXED_PAGE: &str = r#"<html><head><meta property="og:title" content="同一个视频"></head>
<body><script>{"downloadAddr":"https://v.example/dl.mp4","playAddr":"https://v.example/play.mp4"}</script></body></html>"#;

    fn landed_on(url: &str) -> FetchResult {
        FetchResult {
            url: url.to_string(),
            status_code: 200,
            body: MIXED_PAGE.to_string(),
            failure: None,
        }
    }

    #[test]
    fn test_effective_platform_follows_known_redirect() {
        assert_eq!(
            effective_platform(PlatformKind::Douyin, "https://www.tiktok.com/@u/video/1"),
            PlatformKind::TikTok
        );
        assert_eq!(
            effective_platform(PlatformKind::Xiaohongshu, "https://www.xiaohongshu.com/explore/1"),
            PlatformKind::Xiaohongshu
        );
    }

    #[test]
    fn test_effective_platform_keeps_provider_on_unknown_host() {
        assert_eq!(
            effective_platform(PlatformKind::Douyin, "https://cdn.example.net/landing"),
            PlatformKind::Douyin
        );
        assert_eq!(
            effective_platform(PlatformKind::Kuaishou, "not a url"),
            PlatformKind::Kuaishou
        );
    }

    #[test]
    fn test_redirected_page_uses_new_platform_cascade() {
        let meta = read_page(
            PlatformKind::Douyin,
            SHORT_LINK,
            &landed_on("https://www.tiktok.com/@u/video/1"),
        );
        assert_eq!(meta.platform, PlatformKind::TikTok);
        assert_eq!(meta.link, SHORT_LINK);
        assert_eq!(meta.title, "同一个视频");
        assert_eq!(meta.direct_media_url, "https://v.example/dl.mp4");
    }

    #[test]
    fn test_unknown_redirect_keeps_provider_cascade() {
        let meta = read_page(
            PlatformKind::Douyin,
            SHORT_LINK,
            &landed_on("https://cdn.example.net/landing"),
        );
        assert_eq!(meta.platform, PlatformKind::Douyin);
        assert_eq!(meta.direct_media_url, "https://v.example/play.mp4");
    }

    #[test]
    fn test_unusable_page_yields_empty_fields() {
        let failed = FetchResult {
            body: String::new(),
            status_code: 0,
            failure: Some(crate::http::FetchFailure::Timeout),
            ..landed_on(SHORT_LINK)
        };
        let meta = read_page(PlatformKind::Douyin, SHORT_LINK, &failed);
        assert_eq!(meta, LinkMetadata::empty(PlatformKind::Douyin, SHORT_LINK));
    }

    #[test]
    fn test_from_oembed() {
        let meta = from_oembed(
            PlatformKind::YouTube,
            "https://youtu.be/a",
            OembedInfo {
                title: "Clip".into(),
                thumbnail_url: "https://i.ytimg.example/a.jpg".into(),
            },
        );
        assert_eq!(meta.platform, PlatformKind::YouTube);
        assert_eq!(meta.title, "Clip");
        assert_eq!(meta.cover_image_url, "https://i.ytimg.example/a.jpg");
        assert_eq!(meta.link, "https://youtu.be/a");
        assert_eq!(meta.direct_media_url, "");
    }
}
