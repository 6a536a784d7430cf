//! Link preview for pasted text
//!
//! Turns a block of pasted text into idea drafts: one per distinct link,
//! or a single text draft when the paste holds no links. Drafts are not
//! persisted; the client reviews them and posts the ones it keeps.
//!
//! Only TikTok links get remote metadata, via TikTok's oEmbed JSON
//! endpoint. Every other link (and any failed lookup) is titled with its
//! hostname.

use async_trait::async_trait;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use w2p_common::models::Source;

const TIKTOK_OEMBED_URL: &str = "https://www.tiktok.com/oembed";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Wish2Plan/1.0)";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Text drafts keep this many characters in the title
const TEXT_TITLE_CHARS: usize = 60;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("URL pattern is valid"));

/// Metadata recovered for a single link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Unsaved idea proposed from pasted input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaDraft {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: Source,
    pub image_url: Option<String>,
    pub raw_text: String,
}

/// Remote metadata lookup for a link
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// `None` means "nothing better than the hostname"
    async fn fetch(&self, url: &str, source: Source) -> Option<LinkMetadata>;
}

/// Distinct links in first-seen order
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for found in URL_PATTERN.find_iter(text) {
        let candidate = found.as_str();
        if !urls.iter().any(|u| u == candidate) {
            urls.push(candidate.to_string());
        }
    }
    urls
}

/// Classify a link by hostname
pub fn source_from_url(url: &str) -> Source {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_default();

    if host.contains("tiktok.com") {
        Source::Tiktok
    } else if host.contains("instagram.com") {
        Source::Instagram
    } else {
        Source::Other
    }
}

/// Hostname of a link, or the link itself when it does not parse
fn fallback_title(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// Draft for input without links
fn text_draft(text: &str) -> IdeaDraft {
    let is_long = text.chars().count() > TEXT_TITLE_CHARS;
    let mut title: String = text.chars().take(TEXT_TITLE_CHARS).collect();
    if is_long {
        title.push_str("...");
    }

    IdeaDraft {
        title,
        description: is_long.then(|| text.to_string()),
        url: None,
        source: Source::Text,
        image_url: None,
        raw_text: text.to_string(),
    }
}

/// Build drafts for pasted text
///
/// Lookups for multiple links run concurrently. A failed lookup only
/// degrades that link's draft.
pub async fn build_drafts(text: &str, fetcher: &dyn MetadataFetcher) -> Vec<IdeaDraft> {
    let urls = extract_urls(text);
    if urls.is_empty() {
        return vec![text_draft(text)];
    }

    let lookups = urls.into_iter().map(|url| async move {
        let source = source_from_url(&url);
        let metadata = fetcher.fetch(&url, source).await;

        let (title, description, image_url) = match metadata {
            Some(meta) => (meta.title, meta.description, meta.image_url),
            None => (fallback_title(&url), None, None),
        };

        IdeaDraft {
            title,
            description,
            url: Some(url),
            source,
            image_url,
            raw_text: text.to_string(),
        }
    });

    join_all(lookups).await
}

/// HTTP-backed fetcher using TikTok oEmbed
pub struct HttpMetadataFetcher {
    http_client: Client,
    oembed_url: String,
}

impl HttpMetadataFetcher {
    pub fn new() -> reqwest::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            oembed_url: TIKTOK_OEMBED_URL.to_string(),
        })
    }

    async fn fetch_tiktok(&self, url: &str) -> Option<LinkMetadata> {
        let response = self
            .http_client
            .get(&self.oembed_url)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| warn!(url = %url, "TikTok oEmbed request failed: {}", e))
            .ok()?;

        if !response.status().is_success() {
            debug!(url = %url, status = %response.status(), "TikTok oEmbed unavailable");
            return None;
        }

        let oembed: TikTokOEmbed = response
            .json()
            .await
            .map_err(|e| warn!(url = %url, "TikTok oEmbed parse failed: {}", e))
            .ok()?;

        Some(oembed.into_metadata())
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str, source: Source) -> Option<LinkMetadata> {
        match source {
            Source::Tiktok => self.fetch_tiktok(url).await,
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TikTokOEmbed {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

impl TikTokOEmbed {
    fn into_metadata(self) -> LinkMetadata {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        LinkMetadata {
            title: non_empty(self.title).unwrap_or_else(|| "TikTok Video".to_string()),
            description: non_empty(self.author_name).map(|author| format!("by {}", author)),
            image_url: non_empty(self.thumbnail_url),
        }
    }
}
