use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{ApiError, Result};
use crate::models::{BookRecord, OpenLibraryDoc, SearchCriteria, SearchPage};
use crate::services::query_builder::{build_query, SearchQuery};

pub const DEFAULT_SEARCH_URL: &str = "https://openlibrary.org/search.json";
pub const DEFAULT_PAGE_SIZE: usize = 12;

const MAX_ERROR_MESSAGE_CHARS: usize = 200;
const MAX_LOGGED_ERROR_CHARS: usize = 500;

/// One-page fetch against a bibliographic search backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookSearch: Send + Sync {
    async fn fetch_page(&self, query: &SearchQuery, limit: usize, offset: usize)
        -> Result<SearchPage>;
}

#[derive(Debug, Deserialize)]
struct OpenLibrarySearchResponse {
    #[serde(default, rename = "numFound")]
    num_found: Option<u64>,
    #[serde(default)]
    docs: Option<Vec<OpenLibraryDoc>>,
}

#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    client: Client,
    search_url: String,
}

impl OpenLibraryClient {
    pub fn new(search_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            search_url: search_url.to_string(),
        })
    }

    /// Builds the query and fetches one page. Criteria without any search
    /// term produce an empty page and no request.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage> {
        match build_query(criteria) {
            Some(query) => self.fetch_page(&query, limit, offset).await,
            None => {
                debug!("No search term given, skipping Open Library request");
                Ok(SearchPage::empty(offset))
            }
        }
    }
}

#[async_trait]
impl BookSearch for OpenLibraryClient {
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage> {
        let params = query.to_params(limit, offset);
        debug!(?params, "Requesting Open Library search page");

        let response = self
            .client
            .get(&self.search_url)
            .query(&params)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach Open Library API: {}", e);
                ApiError::TransportError(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("Unknown Status");
            let body = response.text().await.unwrap_or_default();
            let details = error_details(&body).unwrap_or_else(|| status_text.to_string());

            error!(
                "Open Library API error: {} {}",
                status.as_u16(),
                truncate_chars(&details, MAX_LOGGED_ERROR_CHARS)
            );
            return Err(ApiError::SearchFailed {
                status: status.as_u16(),
                message: truncate_chars(&details, MAX_ERROR_MESSAGE_CHARS),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::TransportError(e.to_string()))?;
        let parsed: OpenLibrarySearchResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::UpstreamContractError(format!(
                "Failed to parse Open Library response: {}",
                e
            ))
        })?;

        let items: Vec<BookRecord> = parsed
            .docs
            .unwrap_or_default()
            .into_iter()
            .map(BookRecord::from)
            .collect();
        let total_matching = parsed.num_found.unwrap_or(0) as usize;

        info!(
            "Open Library returned {} of {} books at offset {}",
            items.len(),
            total_matching,
            offset
        );

        Ok(SearchPage {
            items,
            total_matching,
            offset_consumed: offset,
        })
    }
}

/// Human-readable message from a JSON error body (`error`, then `message`).
fn error_details(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"].iter().find_map(|field| {
        value
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
