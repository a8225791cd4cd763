//! # video-link-info
//!
//! Resolve short-video share links into normalized metadata: platform,
//! title, description, cover image and, where the page exposes one, a
//! direct media URL.
//!
//! ## Features
//!
//! - Find the link inside noisy share text (CJK punctuation, emoji, brackets)
//! - Classify Douyin, TikTok, Kuaishou, Xiaohongshu, Bilibili, YouTube and Instagram links
//! - Per-platform providers with oEmbed lookups and page scraping
//! - Ordered pattern cascades for direct media URLs in embedded JSON
//! - Secondary fetch of canonical pages to fill gaps
//! - A failing provider never fails the resolution
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use video_link_info::{LinkResolver, ResolverOptions};
//!
//! #[tokio::main]
//! async fn main() -> video_link_info::Result<()> {
//!     let resolver = LinkResolver::new(ResolverOptions::from_env())?;
//!     let info = resolver.resolve("看看这个 https://v.douyin.com/abc123/ 超好笑").await?;
//!
//!     println!("Platform: {}", info.platform);
//!     println!("Title: {}", info.title);
//!     println!("Media: {}", info.direct_media_url);
//!     Ok(())
//! }
//! ```
//!
//! ## Parsing Only
//!
//! ```rust
//! use video_link_info::{PageMetadata, PlatformKind, extract_media_url, pick_first_url};
//!
//! let url = pick_first_url("【视频】https://www.xiaohongshu.com/explore/64ab 👀");
//! assert_eq!(PlatformKind::from_url(&url), PlatformKind::Xiaohongshu);
//!
//! let html = r#"<meta property="og:title" content="搞笑合集">"#;
//! assert_eq!(PageMetadata::extract(html).title, "搞笑合集");
//! assert_eq!(extract_media_url(PlatformKind::Xiaohongshu, html), "");
//! ```
//!
//! Disable the default `http` feature to use only the parsing functions:
//!
//! ```toml
//! [dependencies]
//! video-link-info = { version = "0.3", default-features = false }
//! ```

mod error;
mod media;
mod metadata;
mod platform;
mod text;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub mod oembed;
#[cfg(feature = "http")]
pub mod providers;
#[cfg(feature = "http")]
pub mod recovery;
#[cfg(feature = "http")]
mod resolver;

pub use error::{Error, Result};
pub use media::{Cascade, cascade_patterns, extract_media_url};
pub use metadata::{MAX_TITLE_CHARS, PageMetadata};
pub use platform::PlatformKind;
pub use text::{clean_topic, pick_first_url};

#[cfg(feature = "http")]
pub use http::{
    DESKTOP_USER_AGENT, FetchFailure, FetchResult, Fetcher, HttpOptions, MOBILE_USER_AGENT,
};
#[cfg(feature = "http")]
pub use providers::{Provider, Registry};
#[cfg(feature = "http")]
pub use recovery::RecoveredFields;
#[cfg(feature = "http")]
pub use resolver::{LinkResolver, ResolverOptions};

use serde::{Deserialize, Serialize};

/// Normalized metadata for a resolved link.
///
/// Every string field is empty rather than absent when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadata {
    /// Platform the link belongs to
    pub platform: PlatformKind,

    /// Post title
    pub title: String,

    /// Post description
    pub description: String,

    /// Cover/thumbnail image
    pub cover_image_url: String,

    /// Playable or downloadable media file
    pub direct_media_url: String,

    /// The link that was resolved
    pub link: String,

    /// Title with hashtags, mentions and decorations removed
    pub cleaned_topic: String,
}

impl LinkMetadata {
    /// The record returned when no provider could resolve `url`.
    pub fn unresolved(url: &str) -> Self {
        Self {
            platform: PlatformKind::Unknown,
            link: url.to_string(),
            ..Default::default()
        }
    }

    /// Empty metadata for `url` on a known platform.
    pub fn empty(platform: PlatformKind, url: &str) -> Self {
        Self {
            platform,
            link: url.to_string(),
            ..Default::default()
        }
    }

    /// Copy page metadata into the empty fields.
    pub fn apply_page(&mut self, page: PageMetadata) {
        fill(&mut self.title, page.title);
        fill(&mut self.description, page.description);
        fill(&mut self.cover_image_url, page.cover_image_url);
    }

    /// Merge recovered fields, only where this record is still empty.
    ///
    /// Returns `true` if any field was filled.
    #[cfg(feature = "http")]
    pub fn fill_missing(&mut self, recovered: RecoveredFields) -> bool {
        let filled = [
            fill(&mut self.title, recovered.title),
            fill(&mut self.description, recovered.description),
            fill(&mut self.cover_image_url, recovered.cover_image_url),
            fill(&mut self.direct_media_url, recovered.direct_media_url),
        ];
        filled.contains(&true)
    }

    /// Recompute `cleaned_topic` from the title.
    pub fn with_cleaned_topic(mut self) -> Self {
        self.cleaned_topic = clean_topic(&self.title);
        self
    }
}

fn fill(slot: &mut String, value: String) -> bool {
    if slot.is_empty() && !value.is_empty() {
        *slot = value;
        true
    } else {
        false
    }
}
