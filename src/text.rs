//! Free-text helpers: link discovery in share text and topic cleaning

use std::sync::OnceLock;

use regex::Regex;

// Bracket/quote decorations that share texts wrap around links.
const DECORATIONS: &[char] = &[
    '【', '】', '《', '》', '「', '」', '“', '”', '‘', '’', '（', '）', '(', ')',
];

// Trailing ASCII punctuation that never ends a real share link.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

// Separator characters and brackets replaced by spaces when cleaning a topic.
const TOPIC_SEPARATORS: &[char] = &[
    '|', '｜', '·', '•', '…', '【', '】', '「', '」', '『', '』', '《', '》', '〔', '〕', '（',
    '）', '[', ']',
];

// Tokens consisting only of these are dropped when cleaning a topic.
const FILLER_CHARS: &[char] = &['-', '—', '–', '_', '~', '.'];

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)https?://[^\s<>"'，、。；！？：]+"#).unwrap())
}

fn bracket_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"【[^】]*】").unwrap())
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[#@][^\s#@]*").unwrap())
}

fn is_emoji(c: char) -> bool {
    matches!(c, '\u{1F300}'..='\u{1FAFF}' | '\u{2600}'..='\u{27BF}')
}

/// Find the first `http(s)://` link in arbitrary share text.
///
/// Decorative brackets and emoji are treated as whitespace, so a link glued
/// to `【…】` or an emoji is still found. Returns an empty string when the
/// text holds no link.
///
/// ```
/// use video_link_info::pick_first_url;
///
/// assert_eq!(
///     pick_first_url("看看这个 https://v.douyin.com/abc123/ 超好笑"),
///     "https://v.douyin.com/abc123/"
/// );
/// assert_eq!(pick_first_url("no link here"), "");
/// ```
pub fn pick_first_url(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if DECORATIONS.contains(&c) || is_emoji(c) {
                ' '
            } else {
                c
            }
        })
        .collect();

    url_regex()
        .find(&cleaned)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION).to_string())
        .unwrap_or_default()
}

/// Reduce a post title to a plain topic string.
///
/// Removes `【…】` blocks, hashtags and mentions, separator characters and
/// filler tokens, then collapses whitespace. Applying it twice gives the same
/// result as applying it once.
///
/// ```
/// use video_link_info::clean_topic;
///
/// assert_eq!(clean_topic("【搞笑】猫咪翻车 | 日常 #萌宠 @小明"), "猫咪翻车 日常");
/// ```
pub fn clean_topic(title: &str) -> String {
    let without_blocks = bracket_block_regex().replace_all(title, " ");
    let without_tags = tag_regex().replace_all(&without_blocks, " ");
    let spaced: String = without_tags
        .chars()
        .map(|c| if TOPIC_SEPARATORS.contains(&c) { ' ' } else { c })
        .collect();

    spaced
        .split_whitespace()
        .filter(|token| !token.chars().all(|c| FILLER_CHARS.contains(&c)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse runs of whitespace into single spaces and trim.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, on a char boundary.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
