//! Direct media URL extraction
//!
//! Platforms embed the playable file under keys that change between client
//! versions. Each platform gets an ordered list of single-capture patterns;
//! the first pattern that matches wins, even if a later one would match
//! something else.

use std::sync::OnceLock;

use regex::Regex;

use crate::platform::PlatformKind;

const OG_VIDEO_MP4: &str = r#"property=["']og:video["'][^>]+content=["']([^"']+\.mp4[^"']*)["']"#;
const OG_VIDEO_ANY: &str = r#"property=["']og:video(?::url)?["'][^>]+content=["']([^"']+)["']"#;

const DOUYIN: &[&str] = &[
    r#""playAddr"\s*:\s*"([^"]+\.mp4[^"]*)""#,
    r#""downloadAddr"\s*:\s*"([^"]+\.mp4[^"]*)""#,
    r#"srcUrls"\s*:\s*\["([^"]+\.mp4[^"]*)""#,
    r#""play_addr"\s*:\s*\{[^}]*?"url_list"\s*:\s*\["([^"]+)""#,
    r#""m3u8_url"\s*:\s*"([^"]+\.m3u8[^"]*)""#,
];

const KUAISHOU: &[&str] = &[
    r#""srcNoMark"\s*:\s*"([^"]+\.mp4[^"]*)""#,
    r#""photoH265Mp4Url"\s*:\s*"([^"]+\.mp4[^"]*)""#,
    r#""photoMp4Url"\s*:\s*"([^"]+\.mp4[^"]*)""#,
    r#""hlsPlayUrl"\s*:\s*"([^"]+\.m3u8[^"]*)""#,
];

const XIAOHONGSHU: &[&str] = &[
    OG_VIDEO_MP4,
    r#""h264"\s*:\s*"([^"]+\.mp4[^"]*)""#,
    r#""stream"\s*:\s*\{[^}]*"h264"\s*:\s*"([^"]+\.mp4[^"]*)""#,
    r#""m3u8"\s*:\s*"([^"]+\.m3u8[^"]*)""#,
];

const TIKTOK: &[&str] = &[
    r#""downloadAddr"\s*:\s*"([^"]+\.mp4[^"]*)""#,
    r#""playAddr"\s*:\s*"([^"]+\.mp4[^"]*)""#,
];

const BILIBILI: &[&str] = &[
    r#""baseUrl"\s*:\s*"([^"]+\.m3u8[^"]*)""#,
    r#""url"\s*:\s*"([^"]+\.m3u8[^"]*)""#,
    OG_VIDEO_ANY,
];

const INSTAGRAM: &[&str] = &[
    r#"property=["']og:video:secure_url["'][^>]+content=["']([^"']+)["']"#,
    OG_VIDEO_ANY,
    r#""video_url"\s*:\s*"([^"]+)""#,
];

const UNKNOWN: &[&str] = &[OG_VIDEO_ANY];

/// Pattern sources for a platform, highest priority first.
pub fn cascade_patterns(platform: PlatformKind) -> &'static [&'static str] {
    match platform {
        PlatformKind::Douyin => DOUYIN,
        PlatformKind::Kuaishou => KUAISHOU,
        PlatformKind::Xiaohongshu => XIAOHONGSHU,
        PlatformKind::TikTok => TIKTOK,
        PlatformKind::Bilibili => BILIBILI,
        PlatformKind::Instagram => INSTAGRAM,
        PlatformKind::YouTube => &[],
        PlatformKind::Unknown => UNKNOWN,
    }
}

// Unknown last; it doubles as the fallback slot.
const CASCADE_ORDER: [PlatformKind; 8] = [
    PlatformKind::Douyin,
    PlatformKind::TikTok,
    PlatformKind::Kuaishou,
    PlatformKind::Xiaohongshu,
    PlatformKind::Bilibili,
    PlatformKind::YouTube,
    PlatformKind::Instagram,
    PlatformKind::Unknown,
];

/// An ordered list of compiled single-capture patterns.
#[derive(Debug)]
pub struct Cascade {
    patterns: Vec<Regex>,
}

impl Cascade {
    /// Compile a cascade. Patterns are case-insensitive.
    ///
    /// Panics if a pattern is not a valid regex; cascades are static data.
    pub fn new(sources: &[&str]) -> Self {
        let patterns = sources
            .iter()
            .map(|src| Regex::new(&format!("(?i){src}")).unwrap())
            .collect();
        Self { patterns }
    }

    /// The compiled cascade for a platform.
    pub fn for_platform(platform: PlatformKind) -> &'static Cascade {
        static CASCADES: OnceLock<Vec<Cascade>> = OnceLock::new();
        let cascades = CASCADES.get_or_init(|| {
            CASCADE_ORDER
                .iter()
                .map(|p| Cascade::new(cascade_patterns(*p)))
                .collect()
        });
        let idx = CASCADE_ORDER
            .iter()
            .position(|p| *p == platform)
            .unwrap_or(CASCADE_ORDER.len() - 1);
        &cascades[idx]
    }

    /// Return the capture of the first matching pattern, and its position in the cascade.
    pub fn first_match<'h>(&self, haystack: &'h str) -> Option<(usize, &'h str)> {
        self.patterns.iter().enumerate().find_map(|(idx, re)| {
            re.captures(haystack)
                .and_then(|caps| caps.get(1))
                .map(|m| (idx, m.as_str()))
                .filter(|(_, s)| !s.is_empty())
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Locate a direct playable/downloadable URL inside raw HTML or embedded JSON.
///
/// Returns an empty string when no pattern of the platform's cascade matches.
///
/// ```
/// use video_link_info::{extract_media_url, PlatformKind};
///
/// let html = r#"{"playAddr":"https:\/\/v.example\/a.mp4","m3u8_url":"https://v.example/a.m3u8"}"#;
/// assert_eq!(extract_media_url(PlatformKind::Douyin, html), "https://v.example/a.mp4");
/// ```
pub fn extract_media_url(platform: PlatformKind, html: &str) -> String {
    Cascade::for_platform(platform)
        .first_match(html)
        .map(|(_, raw)| unescape_url(raw))
        .unwrap_or_default()
}

/// Undo JSON string escapes and HTML entity escapes commonly found in embedded URLs.
pub fn unescape_url(raw: &str) -> String {
    raw.replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("\\u0026", "&")
        .replace("\\/", "/")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_cascades_compile() {
        for platform in PlatformKind::ALL {
            let cascade = Cascade::for_platform(platform);
            assert_eq!(cascade.len(), cascade_patterns(platform).len());
        }
        assert!(Cascade::for_platform(PlatformKind::YouTube).is_empty());
    }

    #[test]
    fn test_first_pattern_wins_over_later_match() {
        // downloadAddr appears first in the text, but playAddr has priority for Douyin.
        let html = r#"{"downloadAddr":"https://cdn.example/dl.mp4","playAddr":"https://cdn.example/play.mp4"}"#;
        assert_eq!(
            extract_media_url(PlatformKind::Douyin, html),
            "https://cdn.example/play.mp4"
        );
        // TikTok has the opposite priority.
        assert_eq!(
            extract_media_url(PlatformKind::TikTok, html),
            "https://cdn.example/dl.mp4"
        );
    }

    #[test]
    fn test_priority_is_deterministic() {
        let html = r#""hlsPlayUrl":"https://k.example/x.m3u8" "photoMp4Url":"https://k.example/x.mp4""#;
        let first = extract_media_url(PlatformKind::Kuaishou, html);
        for _ in 0..10 {
            assert_eq!(extract_media_url(PlatformKind::Kuaishou, html), first);
        }
        assert_eq!(first, "https://k.example/x.mp4");
    }

    #[test]
    fn test_mp4_required_for_play_keys() {
        let html = r#""playAddr":"https://cdn.example/playlist""#;
        assert_eq!(extract_media_url(PlatformKind::Douyin, html), "");
    }

    #[test]
    fn test_douyin_url_list_and_hls_fallback() {
        let html = r#""play_addr":{"uri":"v0200","url_list":["https://aweme.example/play/?video_id=v0200"]}"#;
        assert_eq!(
            extract_media_url(PlatformKind::Douyin, html),
            "https://aweme.example/play/?video_id=v0200"
        );

        let html = r#""m3u8_url" : "https://cdn.example/index.m3u8?x=1""#;
        assert_eq!(
            extract_media_url(PlatformKind::Douyin, html),
            "https://cdn.example/index.m3u8?x=1"
        );
    }

    #[test]
    fn test_xiaohongshu_og_video_first() {
        let html = r#"<meta property="og:video" content="https://sns.example/og.mp4">
            <script>{"h264":"https://sns.example/json.mp4","m3u8":"https://sns.example/a.m3u8"}</script>"#;
        assert_eq!(
            extract_media_url(PlatformKind::Xiaohongshu, html),
            "https://sns.example/og.mp4"
        );
    }

    #[test]
    fn test_xiaohongshu_m3u8_last_resort() {
        let html = r#"{"m3u8":"https://sns.example/a.m3u8"}"#;
        assert_eq!(
            extract_media_url(PlatformKind::Xiaohongshu, html),
            "https://sns.example/a.m3u8"
        );
    }

    #[test]
    fn test_case_insensitive_keys() {
        let html = r#""PLAYADDR":"https://cdn.example/UP.MP4""#;
        assert_eq!(
            extract_media_url(PlatformKind::Douyin, html),
            "https://cdn.example/UP.MP4"
        );
    }

    #[test]
    fn test_youtube_never_matches() {
        let html = r#"<meta property="og:video" content="https://www.youtube.com/embed/x">"#;
        assert_eq!(extract_media_url(PlatformKind::YouTube, html), "");
    }

    #[test]
    fn test_unknown_uses_og_video() {
        let html = r#"<meta property="og:video:url" content="https://media.example/v.webm">"#;
        assert_eq!(
            extract_media_url(PlatformKind::Unknown, html),
            "https://media.example/v.webm"
        );
    }

    #[test]
    fn test_instagram_secure_url_first() {
        let html = r#"<meta property="og:video" content="http://ig.example/a.mp4">
            <meta property="og:video:secure_url" content="https://ig.example/a.mp4">"#;
        assert_eq!(
            extract_media_url(PlatformKind::Instagram, html),
            "https://ig.example/a.mp4"
        );
    }

    #[test]
    fn test_no_match_is_empty() {
        for platform in PlatformKind::ALL {
            assert_eq!(extract_media_url(platform, "<html></html>"), "");
        }
    }

    #[test]
    fn test_unescape_url() {
        assert_eq!(
            unescape_url(r"https:\/\/a.example/b.mp4?x=1&y=2&amp;z=3"),
            "https://a.example/b.mp4?x=1&y=2&z=3"
        );
    }
}
