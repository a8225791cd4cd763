//! Page metadata extraction (Open Graph tags and `<title>` fallback)

use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::text::{collapse_whitespace, truncate_chars};

/// Longest `<title>` fallback kept, in characters.
pub const MAX_TITLE_CHARS: usize = 120;

fn title_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("title").unwrap())
}

fn meta_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("meta[content]").unwrap())
}

/// Title, description and cover image of a page.
///
/// Every field is an empty string when nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
}

/// Meta values collected in one pass, before priority rules are applied.
#[derive(Default)]
struct MetaTags {
    og_title: Option<String>,
    og_description: Option<String>,
    og_image: Option<String>,
    og_image_secure: Option<String>,
    name_title: Option<String>,
    name_description: Option<String>,
}

impl MetaTags {
    fn collect(document: &Html) -> Self {
        let mut tags = Self::default();

        for element in document.select(meta_selector()) {
            let el = element.value();
            let Some(content) = el.attr("content").map(str::trim).filter(|c| !c.is_empty())
            else {
                continue;
            };
            let Some(key) = el.attr("property").or_else(|| el.attr("name")) else {
                continue;
            };

            // The first occurrence of each key wins.
            let slot = match key.trim().to_ascii_lowercase().as_str() {
                "og:title" => &mut tags.og_title,
                "og:description" => &mut tags.og_description,
                "og:image" | "og:image:url" => &mut tags.og_image,
                "og:image:secure_url" => &mut tags.og_image_secure,
                "title" => &mut tags.name_title,
                "description" => &mut tags.name_description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(content.to_string());
            }
        }

        tags
    }
}

impl PageMetadata {
    /// Extract metadata from raw HTML.
    ///
    /// Malformed or truncated markup never fails; missing fields are empty.
    ///
    /// ```
    /// use video_link_info::PageMetadata;
    ///
    /// let meta = PageMetadata::extract(r#"<meta property="og:title" content="搞笑合集">"#);
    /// assert_eq!(meta.title, "搞笑合集");
    /// assert_eq!(meta.cover_image_url, "");
    /// ```
    pub fn extract(html: &str) -> Self {
        let document = Html::parse_document(html);
        let tags = MetaTags::collect(&document);

        let title = tags
            .og_title
            .or(tags.name_title)
            .or_else(|| Self::extract_title_element(&document))
            .unwrap_or_default();

        Self {
            title,
            description: tags
                .og_description
                .or(tags.name_description)
                .unwrap_or_default(),
            cover_image_url: tags.og_image.or(tags.og_image_secure).unwrap_or_default(),
        }
    }

    fn extract_title_element(document: &Html) -> Option<String> {
        document
            .select(title_selector())
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|s| !s.is_empty())
            .map(|s| truncate_chars(&s, MAX_TITLE_CHARS))
    }

    /// Check if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty() && self.cover_image_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_og_tags() {
        let html = r#"
            <html><head>
                <title>Fallback</title>
                <meta property="og:title" content="X">
                <meta property="og:description" content="A clip">
                <meta property="og:image" content="https://cdn.example/cover.jpg">
            </head></html>
        "#;

        let meta = PageMetadata::extract(html);
        assert_eq!(meta.title, "X");
        assert_eq!(meta.description, "A clip");
        assert_eq!(meta.cover_image_url, "https://cdn.example/cover.jpg");
    }

    #[test]
    fn test_og_title_without_image() {
        let meta = PageMetadata::extract(r#"<meta property="og:title" content="搞笑合集">"#);
        assert_eq!(meta.title, "搞笑合集");
        assert_eq!(meta.description, "");
        assert_eq!(meta.cover_image_url, "");
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let meta = PageMetadata::extract(r#"<meta content="Reversed" property="og:title">"#);
        assert_eq!(meta.title, "Reversed");
    }

    #[test]
    fn test_title_element_fallback() {
        let html = "<html><head><title>\n   Some \t  page\n title  </title></head></html>";
        let meta = PageMetadata::extract(html);
        assert_eq!(meta.title, "Some page title");
    }

    #[test]
    fn test_name_title_before_title_element() {
        let html = r#"<title>Element</title><meta name="title" content="Named">"#;
        assert_eq!(PageMetadata::extract(html).title, "Named");
    }

    #[test]
    fn test_title_fallback_is_truncated() {
        let long = "长".repeat(300);
        let html = format!("<title>{long}</title>");
        let meta = PageMetadata::extract(&html);
        assert_eq!(meta.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_description_fallback() {
        let html = r#"<meta name="description" content="plain description">"#;
        assert_eq!(PageMetadata::extract(html).description, "plain description");
    }

    #[test]
    fn test_secure_image_fallback() {
        let html = r#"<meta property="og:image:secure_url" content="https://cdn.example/s.jpg">"#;
        assert_eq!(
            PageMetadata::extract(html).cover_image_url,
            "https://cdn.example/s.jpg"
        );
    }

    #[test]
    fn test_entities_decoded() {
        let html = r#"<meta property="og:title" content="Tom &amp; Jerry">"#;
        assert_eq!(PageMetadata::extract(html).title, "Tom & Jerry");
    }

    #[test]
    fn test_malformed_html() {
        let inputs = [
            "",
            "<",
            "<meta property=\"og:title\" content=\"unterminated",
            "<title>never closed",
            "<html><head><meta property=og:title content=Bare></head>",
            "\u{0}\u{1}<<<>>>",
        ];
        for html in inputs {
            let _ = PageMetadata::extract(html);
        }

        let meta = PageMetadata::extract("<html><head><meta property=og:title content=Bare></head>");
        assert_eq!(meta.title, "Bare");
    }

    #[test]
    fn test_empty() {
        let meta = PageMetadata::extract("<html><body><p>nothing</p></body></html>");
        assert!(meta.is_empty());
    }
}
