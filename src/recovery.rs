//! Secondary "recovery" fetches
//!
//! Some share pages come back without a title or media URL. When the link
//! carries a content id, a canonical detail page can be fetched instead and
//! used to fill the gaps. Fields the primary pass already found are never
//! replaced.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::LinkMetadata;
use crate::http::Fetcher;
use crate::media::{Cascade, unescape_url};
use crate::metadata::PageMetadata;
use crate::platform::PlatformKind;

pub const XIAOHONGSHU_BASE_URL: &str = "https://www.xiaohongshu.com";

/// Fields recovered from a secondary page. Empty means not found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveredFields {
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
    pub direct_media_url: String,
}

/// A platform-specific secondary page.
pub trait RecoverySource: Send + Sync {
    fn platform(&self) -> PlatformKind;

    /// Content id embedded in a post URL, if any.
    fn content_id(&self, url: &str) -> Option<String>;

    /// Canonical page for a content id.
    fn secondary_url(&self, id: &str) -> String;

    /// `Referer` sent with the secondary request.
    fn referer(&self) -> &str;

    /// Pull fields out of the secondary page.
    fn extract(&self, html: &str) -> RecoveredFields;
}

/// Primary results missing a title or media URL are worth a second fetch.
pub fn needs_recovery(metadata: &LinkMetadata) -> bool {
    metadata.title.is_empty() || metadata.direct_media_url.is_empty()
}

/// Fetch the secondary page for the first candidate URL that carries a
/// content id and merge what it yields into `metadata`.
///
/// Returns `true` if any field was filled. Failures are logged and swallowed.
pub async fn enrich(
    fetcher: &Fetcher,
    source: &dyn RecoverySource,
    metadata: &mut LinkMetadata,
    candidates: &[&str],
) -> bool {
    if !needs_recovery(metadata) {
        return false;
    }
    let Some(id) = candidates.iter().find_map(|url| source.content_id(url)) else {
        debug!(platform = %source.platform(), "no content id, skipping recovery");
        return false;
    };

    let secondary = source.secondary_url(&id);
    debug!(platform = %source.platform(), url = %secondary, "recovery fetch");

    let page = fetcher.fetch_with_referer(&secondary, source.referer()).await;
    if !page.has_html() {
        debug!(url = %secondary, failure = ?page.failure, status = page.status_code, "recovery fetch gave nothing");
        return false;
    }

    let recovered = source.extract(&page.body);
    metadata.fill_missing(recovered)
}

/// Xiaohongshu notes: `/explore/<id>` on the main site embeds the note JSON
/// even when short links and PC share pages do not.
#[derive(Debug, Clone)]
pub struct XiaohongshuRecovery {
    base_url: String,
}

impl Default for XiaohongshuRecovery {
    fn default() -> Self {
        Self::new(XIAOHONGSHU_BASE_URL)
    }
}

fn note_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:explore|item)/([0-9a-zA-Z]+)").unwrap())
}

fn xhs_title_cascade() -> &'static Cascade {
    static CASCADE: OnceLock<Cascade> = OnceLock::new();
    CASCADE.get_or_init(|| {
        Cascade::new(&[
            r#""title"\s*:\s*"([^"]+)""#,
            r#""noteTitle"\s*:\s*"([^"]+)""#,
        ])
    })
}

fn xhs_description_cascade() -> &'static Cascade {
    static CASCADE: OnceLock<Cascade> = OnceLock::new();
    CASCADE.get_or_init(|| Cascade::new(&[r#""desc"\s*:\s*"([^"]+)""#]))
}

fn xhs_cover_cascade() -> &'static Cascade {
    static CASCADE: OnceLock<Cascade> = OnceLock::new();
    CASCADE.get_or_init(|| {
        Cascade::new(&[
            r#""cover"\s*:\s*"([^"]+)""#,
            r#""image"\s*:\s*"([^"]+)""#,
        ])
    })
}

fn xhs_media_cascade() -> &'static Cascade {
    static CASCADE: OnceLock<Cascade> = OnceLock::new();
    CASCADE.get_or_init(|| {
        Cascade::new(&[
            r#""h264"\s*:\s*"([^"]+\.mp4[^"]*)""#,
            r#""m3u8"\s*:\s*"([^"]+\.m3u8[^"]*)""#,
        ])
    })
}

fn first_or(cascade: &Cascade, html: &str, fallback: &str) -> String {
    cascade
        .first_match(html)
        .map(|(_, raw)| unescape_url(raw))
        .unwrap_or_else(|| fallback.to_string())
}

impl XiaohongshuRecovery {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl RecoverySource for XiaohongshuRecovery {
    fn platform(&self) -> PlatformKind {
        PlatformKind::Xiaohongshu
    }

    fn content_id(&self, url: &str) -> Option<String> {
        note_id_regex()
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn secondary_url(&self, id: &str) -> String {
        format!("{}/explore/{}", self.base_url, id)
    }

    fn referer(&self) -> &str {
        &self.base_url
    }

    fn extract(&self, html: &str) -> RecoveredFields {
        let og = PageMetadata::extract(html);
        RecoveredFields {
            title: first_or(xhs_title_cascade(), html, &og.title),
            description: first_or(xhs_description_cascade(), html, &og.description),
            cover_image_url: first_or(xhs_cover_cascade(), html, &og.cover_image_url),
            direct_media_url: first_or(xhs_media_cascade(), html, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id() {
        let source = XiaohongshuRecovery::default();
        assert_eq!(
            source.content_id("https://www.xiaohongshu.com/explore/64ab12cd?xsec=1"),
            Some("64ab12cd".to_string())
        );
        assert_eq!(
            source.content_id("https://www.xiaohongshu.com/discovery/item/65ff00aa"),
            Some("65ff00aa".to_string())
        );
        assert_eq!(source.content_id("http://xhslink.com/a/b"), None);
    }

    #[test]
    fn test_secondary_url() {
        let source = XiaohongshuRecovery::new("http://127.0.0.1:8080/");
        assert_eq!(source.secondary_url("abc"), "http://127.0.0.1:8080/explore/abc");
        assert_eq!(source.referer(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_extract_from_embedded_json() {
        let html = r#"<html><script>window.__INITIAL_STATE__={"note":{"title":"夏日穿搭","desc":"分享一下",
            "cover":"https://sns.example/cover.jpg",
            "video":{"media":{"stream":{"h264":"https://sns.example/v.mp4"}}}}}</script></html>"#;

        let fields = XiaohongshuRecovery::default().extract(html);
        assert_eq!(fields.title, "夏日穿搭");
        assert_eq!(fields.description, "分享一下");
        assert_eq!(fields.cover_image_url, "https://sns.example/cover.jpg");
        assert_eq!(fields.direct_media_url, "https://sns.example/v.mp4");
    }

    #[test]
    fn test_extract_falls_back_to_og() {
        let html = r#"<meta property="og:title" content="OG 标题"><meta property="og:image" content="https://sns.example/og.jpg">"#;
        let fields = XiaohongshuRecovery::default().extract(html);
        assert_eq!(fields.title, "OG 标题");
        assert_eq!(fields.cover_image_url, "https://sns.example/og.jpg");
        assert_eq!(fields.direct_media_url, "");
    }

    #[test]
    fn test_needs_recovery() {
        let mut meta = LinkMetadata::unresolved("https://a.example/");
        assert!(needs_recovery(&meta));
        meta.title = "t".into();
        assert!(needs_recovery(&meta));
        meta.direct_media_url = "https://a.example/v.mp4".into();
        assert!(!needs_recovery(&meta));
    }
}
