//! Bounded HTTP fetching for share pages and oEmbed endpoints

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_MAX_REDIRECTS: usize = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 8;
const DEFAULT_MAX_BODY_SIZE: usize = 5 * 1024 * 1024; // 5 MB

/// iPhone Safari. Share pages serve their embedded JSON to mobile clients.
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1";

/// Desktop Chrome on macOS.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9";

/// Why a fetch produced no usable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchFailure {
    /// The deadline expired and the request was dropped
    Timeout,
    /// Connection, TLS, redirect or body read error
    Network,
    /// The server answered outside 200..=399
    Status,
}

/// Outcome of a single page fetch.
///
/// A failed fetch still produces a value: the body is empty, `failure` says
/// why, and `status_code` is `0` unless the server answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    /// The final URL after following redirects
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Response body as string
    pub body: String,

    /// Set when the fetch did not succeed
    pub failure: Option<FetchFailure>,
}

impl FetchResult {
    fn failed(url: &str, err: &Error) -> Self {
        let (failure, status_code) = match err {
            Error::FetchTimeout(_) => (FetchFailure::Timeout, 0),
            Error::FetchNonSuccessStatus(code) => (FetchFailure::Status, *code),
            _ => (FetchFailure::Network, 0),
        };
        Self {
            url: url.to_string(),
            status_code,
            body: String::new(),
            failure: Some(failure),
        }
    }

    /// Status in 200..=399 and no transport failure.
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && (200..400).contains(&self.status_code)
    }

    /// A successful response whose body looks like markup.
    pub fn has_html(&self) -> bool {
        self.is_success() && self.body.contains('<')
    }
}

/// Configuration for HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Follow HTTP redirects
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow
    pub max_redirects: usize,

    /// Deadline for a whole request, including the body.
    ///
    /// Enforced by dropping the in-flight future, not only by the client.
    pub timeout: Duration,

    /// Maximum response body size in bytes. Longer bodies are truncated.
    pub max_body_size: usize,

    /// User-Agent header
    pub user_agent: String,

    /// Accept-Language header
    pub accept_language: String,

    /// Additional headers to send
    pub headers: Vec<(String, String)>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: MOBILE_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            headers: Vec::new(),
        }
    }
}

impl HttpOptions {
    /// Create a new HttpOptions with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow redirects.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the request deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum response body size in bytes.
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the Accept-Language header.
    pub fn accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.accept_language = accept_language.into();
        self
    }

    /// Add a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Build a reqwest Client from these options.
    fn build_client(&self) -> Result<Client> {
        let redirect_policy = if self.follow_redirects {
            reqwest::redirect::Policy::limited(self.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        if let Ok(value) = HeaderValue::from_str(&self.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                name.parse::<HeaderName>(),
                value.parse::<HeaderValue>(),
            ) {
                headers.insert(name, value);
            }
        }

        Ok(Client::builder()
            .redirect(redirect_policy)
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .default_headers(headers)
            .build()?)
    }
}

/// Shared HTTP client. Build once and pass it to everything that fetches.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    options: HttpOptions,
}

impl Fetcher {
    /// Create a fetcher from options.
    pub fn new(options: HttpOptions) -> Result<Self> {
        let client = options.build_client()?;
        Ok(Self { client, options })
    }

    /// Fetch a page with `Referer` set to the page itself. Never fails; see [`FetchResult`].
    pub async fn fetch(&self, url: &str) -> FetchResult {
        self.fetch_with_referer(url, url).await
    }

    /// Fetch a page with an explicit `Referer`. Never fails; see [`FetchResult`].
    pub async fn fetch_with_referer(&self, url: &str, referer: &str) -> FetchResult {
        match self.try_fetch(url, Some(referer)).await {
            Ok(result) => result,
            Err(err) => {
                debug!(url, error = %err, "fetch failed");
                FetchResult::failed(url, &err)
            }
        }
    }

    /// Fetch a page, reporting failures as errors.
    ///
    /// Statuses outside 200..=399 become [`Error::FetchNonSuccessStatus`].
    pub async fn try_fetch(&self, url: &str, referer: Option<&str>) -> Result<FetchResult> {
        let result = self.bounded(self.get(url, referer)).await?;
        if !(200..400).contains(&result.status_code) {
            return Err(Error::FetchNonSuccessStatus(result.status_code));
        }
        Ok(result)
    }

    /// GET a JSON document. Only 2xx responses are decoded.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let result = self.bounded(self.get(url, None)).await?;
        if !(200..300).contains(&result.status_code) {
            return Err(Error::FetchNonSuccessStatus(result.status_code));
        }
        Ok(serde_json::from_str(&result.body)?)
    }

    /// Run a request under the configured deadline, dropping it on expiry.
    ///
    /// The client carries the same deadline, so its own timeout error is
    /// reported as [`Error::FetchTimeout`] too.
    async fn bounded<F>(&self, request: F) -> Result<FetchResult>
    where
        F: Future<Output = Result<FetchResult>>,
    {
        let deadline = self.options.timeout;
        match tokio::time::timeout(deadline, request).await {
            Err(_) => Err(Error::FetchTimeout(deadline)),
            Ok(Err(Error::Http(err))) if err.is_timeout() => Err(Error::FetchTimeout(deadline)),
            Ok(result) => result,
        }
    }

    async fn get(&self, url: &str, referer: Option<&str>) -> Result<FetchResult> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme '{}', only http/https allowed",
                parsed.scheme()
            )));
        }

        let mut request = self.client.get(parsed);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }
        let response = request.send().await?;
        response_to_result(response, self.options.max_body_size).await
    }
}

/// Convert a reqwest Response to a FetchResult with streaming body size limit.
async fn response_to_result(response: Response, max_body_size: usize) -> Result<FetchResult> {
    let url = response.url().to_string();
    let status_code = response.status().as_u16();

    // Stream body with size limit - stops downloading when limit reached
    let content_length = response.content_length().unwrap_or(0) as usize;
    let capacity = content_length.min(max_body_size).min(1024 * 1024);
    let mut bytes = Vec::with_capacity(capacity);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let remaining = max_body_size.saturating_sub(bytes.len());
        if remaining == 0 {
            trim_partial_char(&mut bytes);
            break;
        }
        let to_take = chunk.len().min(remaining);
        bytes.extend_from_slice(&chunk[..to_take]);
        if to_take < chunk.len() {
            trim_partial_char(&mut bytes);
            break;
        }
    }

    Ok(FetchResult {
        url,
        status_code,
        body: String::from_utf8_lossy(&bytes).into_owned(),
        failure: None,
    })
}

/// Drop a UTF-8 sequence cut short by the body cap.
fn trim_partial_char(bytes: &mut Vec<u8>) {
    let len = bytes.len();
    let Some(lead) = (1..=len.min(4))
        .map(|back| len - back)
        .find(|&i| bytes[i] & 0xC0 != 0x80)
    else {
        return;
    };
    let width = match bytes[lead] {
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        b if b >= 0xC0 => 2,
        _ => 1,
    };
    if lead + width > len {
        bytes.truncate(lead);
    }
}
