//! Platform classification by hostname

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Short-video platform a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Douyin,
    #[serde(rename = "tiktok")]
    TikTok,
    Kuaishou,
    Xiaohongshu,
    Bilibili,
    #[serde(rename = "youtube")]
    YouTube,
    Instagram,
    #[default]
    Unknown,
}

// First matching rule wins. Each domain matches exactly or as a dot-delimited suffix.
const HOST_RULES: &[(PlatformKind, &[&str])] = &[
    (PlatformKind::Xiaohongshu, &["xiaohongshu.com", "xhslink.com"]),
    (PlatformKind::Douyin, &["douyin.com", "iesdouyin.com"]),
    (PlatformKind::TikTok, &["tiktok.com"]),
    (PlatformKind::Kuaishou, &["kuaishou.com", "gifshow.com"]),
    (PlatformKind::Bilibili, &["bilibili.com", "b23.tv"]),
    (PlatformKind::YouTube, &["youtube.com", "youtu.be"]),
    (PlatformKind::Instagram, &["instagram.com"]),
];

impl PlatformKind {
    /// All known platforms, excluding `Unknown`.
    pub const ALL: [PlatformKind; 7] = [
        PlatformKind::Douyin,
        PlatformKind::TikTok,
        PlatformKind::Kuaishou,
        PlatformKind::Xiaohongshu,
        PlatformKind::Bilibili,
        PlatformKind::YouTube,
        PlatformKind::Instagram,
    ];

    /// Classify a URL. Unparseable URLs and URLs without a host are `Unknown`.
    ///
    /// ```
    /// use video_link_info::PlatformKind;
    ///
    /// assert_eq!(PlatformKind::from_url("https://v.douyin.com/abc123/"), PlatformKind::Douyin);
    /// assert_eq!(PlatformKind::from_url("not a url"), PlatformKind::Unknown);
    /// ```
    pub fn from_url(url: &str) -> Self {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(Self::from_host))
            .unwrap_or(Self::Unknown)
    }

    /// Classify a bare hostname.
    pub fn from_host(host: &str) -> Self {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        HOST_RULES
            .iter()
            .find(|(_, domains)| domains.iter().any(|d| host_matches(&host, d)))
            .map(|(platform, _)| *platform)
            .unwrap_or(Self::Unknown)
    }

    /// Stable lowercase tag, matching the serde representation.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Douyin => "douyin",
            Self::TikTok => "tiktok",
            Self::Kuaishou => "kuaishou",
            Self::Xiaohongshu => "xiaohongshu",
            Self::Bilibili => "bilibili",
            Self::YouTube => "youtube",
            Self::Instagram => "instagram",
            Self::Unknown => "unknown",
        }
    }

    /// Name shown to users.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Douyin => "抖音",
            Self::TikTok => "TikTok",
            Self::Kuaishou => "快手",
            Self::Xiaohongshu => "小红书",
            Self::Bilibili => "哔哩哔哩",
            Self::YouTube => "YouTube",
            Self::Instagram => "Instagram",
            Self::Unknown => "未知",
        }
    }

    /// Title used when nothing better could be extracted, e.g. `[抖音] 内容`.
    pub fn placeholder_title(self) -> String {
        format!("[{}] 内容", self.display_name())
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hosts() {
        let cases = [
            ("https://v.douyin.com/abc123/", PlatformKind::Douyin),
            ("https://www.iesdouyin.com/share/video/123", PlatformKind::Douyin),
            ("https://www.tiktok.com/@user/video/1", PlatformKind::TikTok),
            ("https://vm.tiktok.com/ZMabc/", PlatformKind::TikTok),
            ("https://v.kuaishou.com/xyz", PlatformKind::Kuaishou),
            ("https://m.gifshow.com/fw/photo/1", PlatformKind::Kuaishou),
            ("https://www.xiaohongshu.com/explore/64ab", PlatformKind::Xiaohongshu),
            ("http://xhslink.com/a/b", PlatformKind::Xiaohongshu),
            ("https://b23.tv/BV1xx", PlatformKind::Bilibili),
            ("https://www.bilibili.com/video/BV1xx", PlatformKind::Bilibili),
            ("https://youtu.be/dQw4w9WgXcQ", PlatformKind::YouTube),
            ("https://m.youtube.com/watch?v=1", PlatformKind::YouTube),
            ("https://www.instagram.com/reel/abc/", PlatformKind::Instagram),
        ];

        for (url, expected) in cases {
            assert_eq!(PlatformKind::from_url(url), expected, "{url}");
        }
    }

    #[test]
    fn test_suffix_requires_label_boundary() {
        assert_eq!(
            PlatformKind::from_url("https://notdouyin.com/x"),
            PlatformKind::Unknown
        );
        assert_eq!(
            PlatformKind::from_url("https://douyin.com.evil.example/x"),
            PlatformKind::Unknown
        );
    }

    #[test]
    fn test_case_insensitive_host() {
        assert_eq!(PlatformKind::from_host("WWW.TikTok.COM"), PlatformKind::TikTok);
        assert_eq!(PlatformKind::from_host("youtu.be."), PlatformKind::YouTube);
    }

    #[test]
    fn test_malformed_urls_are_unknown() {
        assert_eq!(PlatformKind::from_url(""), PlatformKind::Unknown);
        assert_eq!(PlatformKind::from_url("douyin.com/abc"), PlatformKind::Unknown);
        assert_eq!(PlatformKind::from_url("mailto:a@douyin.com"), PlatformKind::Unknown);
        assert_eq!(PlatformKind::from_url("https://example.com/"), PlatformKind::Unknown);
    }

    #[test]
    fn test_serde_tags() {
        for platform in PlatformKind::ALL {
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{}\"", platform.tag()));
        }
    }

    #[test]
    fn test_placeholder_title() {
        assert_eq!(PlatformKind::Douyin.placeholder_title(), "[抖音] 内容");
        assert_eq!(PlatformKind::Instagram.placeholder_title(), "[Instagram] 内容");
    }
}
