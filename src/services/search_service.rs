use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::images::{ImageResult, WebResult};

const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug)]
pub enum SearchError {
    NotConfigured,
    HttpError(reqwest::Error),
    ResponseError { status: u16, body: String },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::NotConfigured => write!(
                f,
                "Programmable Search API is not configured. Set GOOGLE_CUSTOM_SEARCH_KEY and GOOGLE_CUSTOM_SEARCH_CX."
            ),
            SearchError::HttpError(err) => write!(f, "Search HTTP error: {}", err),
            SearchError::ResponseError { status, body } => {
                write!(f, "Search request failed with status {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for SearchError {}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::HttpError(err)
    }
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn search_images(&self, query: &str, num: u32) -> Result<Vec<ImageResult>, SearchError>;

    async fn search_web(&self, query: &str, num: u32) -> Result<Vec<WebResult>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    #[serde(rename = "displayLink")]
    display_link: Option<String>,
    image: Option<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    #[serde(rename = "thumbnailLink")]
    thumbnail_link: Option<String>,
    #[serde(rename = "contextLink")]
    context_link: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Google Programmable Search (Custom Search JSON API).
pub struct CustomSearchClient {
    client: Client,
    credentials: Option<(String, String)>,
}

impl CustomSearchClient {
    pub fn new(config: &AppConfig) -> Result<Self, SearchError> {
        let credentials = match (&config.custom_search_key, &config.custom_search_cx) {
            (Some(key), Some(cx)) => Some((key.clone(), cx.clone())),
            _ => None,
        };
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    async fn execute(&self, params: &[(&str, String)]) -> Result<SearchResponse, SearchError> {
        let (key, cx) = self.credentials.as_ref().ok_or(SearchError::NotConfigured)?;

        let response = self
            .client
            .get(CUSTOM_SEARCH_URL)
            .query(&[("key", key.as_str()), ("cx", cx.as_str()), ("safe", "active")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ResponseError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl WebSearch for CustomSearchClient {
    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn search_images(&self, query: &str, num: u32) -> Result<Vec<ImageResult>, SearchError> {
        let data = self
            .execute(&[
                ("q", query.to_string()),
                ("searchType", "image".to_string()),
                ("imgType", "photo".to_string()),
                ("num", clamp_num(num).to_string()),
            ])
            .await?;
        Ok(data.items.into_iter().map(to_image_result).collect())
    }

    async fn search_web(&self, query: &str, num: u32) -> Result<Vec<WebResult>, SearchError> {
        let data = self
            .execute(&[("q", query.to_string()), ("num", clamp_num(num).to_string())])
            .await?;
        Ok(data
            .items
            .into_iter()
            .map(|item| WebResult {
                title: item.title,
                snippet: item.snippet,
                link: item.link,
                display_link: item.display_link,
            })
            .collect())
    }
}

/// The API serves between one and ten results per call.
fn clamp_num(num: u32) -> u32 {
    num.clamp(1, 10)
}

fn to_image_result(item: SearchItem) -> ImageResult {
    let image = item.image;
    ImageResult {
        title: item.title,
        link: item.link,
        thumbnail: image.as_ref().and_then(|i| i.thumbnail_link.clone()),
        context: image.as_ref().and_then(|i| i.context_link.clone()),
        width: image.as_ref().and_then(|i| i.width),
        height: image.as_ref().and_then(|i| i.height),
        display_link: item.display_link,
    }
}
