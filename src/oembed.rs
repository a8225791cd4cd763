//! oEmbed lookups
//!
//! Some platforms answer `GET <endpoint>?url=<post url>` with a small JSON
//! object. That is cheaper and more stable than scraping the share page, so
//! providers try it first when an endpoint is available.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::http::Fetcher;

pub const YOUTUBE_ENDPOINT: &str = "https://www.youtube.com/oembed";
pub const TIKTOK_ENDPOINT: &str = "https://www.tiktok.com/oembed";
pub const INSTAGRAM_ENDPOINT: &str = "https://graph.facebook.com/v17.0/instagram_oembed";

/// The subset of an oEmbed response we use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OembedInfo {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub thumbnail_url: String,
}

/// Build the request URL: `endpoint?url=<target>` plus any extra query pairs.
pub fn request_url(endpoint: &str, target: &str, extra: &[(&str, &str)]) -> Result<String> {
    let mut url = Url::parse(endpoint)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("url", target);
        for (key, value) in extra {
            query.append_pair(key, value);
        }
    }
    Ok(url.into())
}

/// Look up a post. Succeeds only when the endpoint returns a non-empty title.
pub async fn lookup(
    fetcher: &Fetcher,
    endpoint: &str,
    target: &str,
    extra: &[(&str, &str)],
) -> Result<OembedInfo> {
    let request = request_url(endpoint, target, extra)?;
    let info: OembedInfo = fetcher.get_json(&request).await?;
    let title = info.title.trim();
    if title.is_empty() {
        return Err(Error::NoPatternMatch("oembed title"));
    }
    Ok(OembedInfo {
        title: title.to_string(),
        thumbnail_url: info.thumbnail_url.trim().to_string(),
    })
}

/// Like [`lookup`], logging and discarding failures.
pub async fn try_lookup(
    fetcher: &Fetcher,
    endpoint: &str,
    target: &str,
    extra: &[(&str, &str)],
) -> Option<OembedInfo> {
    match lookup(fetcher, endpoint, target, extra).await {
        Ok(info) => Some(info),
        Err(err) => {
            debug!(endpoint, target, error = %err, "oembed lookup failed");
            None
        }
    }
}
