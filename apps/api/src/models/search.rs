use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::book::{BookRecord, BookSummary};

/// Result ordering offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// The search API's default ordering
    #[default]
    Relevance,
    Title,
    #[serde(alias = "new")]
    Newest,
    #[serde(alias = "old")]
    Oldest,
}

impl SortOrder {
    /// Value for the upstream `sort` parameter. Relevance is requested by
    /// omitting the parameter.
    pub fn as_query_value(self) -> Option<&'static str> {
        match self {
            SortOrder::Relevance => None,
            SortOrder::Title => Some("title"),
            SortOrder::Newest => Some("new"),
            SortOrder::Oldest => Some("old"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SearchCriteria {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn title_term(&self) -> Option<&str> {
        non_blank(&self.title)
    }

    pub fn author_term(&self) -> Option<&str> {
        non_blank(&self.author)
    }

    pub fn genre_term(&self) -> Option<&str> {
        non_blank(&self.genre)
    }

    /// At least one of title, author or genre is filled in.
    pub fn has_search_term(&self) -> bool {
        self.title_term().is_some() || self.author_term().is_some() || self.genre_term().is_some()
    }
}

/// One page of search results. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub items: Vec<BookRecord>,
    pub total_matching: usize,
    /// Offset the page was requested at
    pub offset_consumed: usize,
}

impl SearchPage {
    pub fn empty(offset: usize) -> Self {
        Self {
            items: Vec::new(),
            total_matching: 0,
            offset_consumed: offset,
        }
    }
}

/// Response body of `GET /api/search`
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<BookSummary>,
    pub total_matching: usize,
    pub offset_consumed: usize,
    pub next_offset: usize,
    pub has_more: bool,
}

impl From<SearchPage> for SearchResponse {
    fn from(page: SearchPage) -> Self {
        let next_offset = page.offset_consumed.saturating_add(page.items.len());
        Self {
            has_more: !page.items.is_empty() && next_offset < page.total_matching,
            next_offset,
            total_matching: page.total_matching,
            offset_consumed: page.offset_consumed,
            items: page.items.into_iter().map(BookSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_wire_names() {
        let sort: SortOrder = serde_json::from_str("\"newest\"").unwrap();
        assert_eq!(sort, SortOrder::Newest);
        let sort: SortOrder = serde_json::from_str("\"old\"").unwrap();
        assert_eq!(sort, SortOrder::Oldest);
        assert_eq!(serde_json::to_string(&SortOrder::Title).unwrap(), "\"title\"");
    }

    #[test]
    fn test_has_search_term_ignores_blank_fields() {
        assert!(!SearchCriteria::default().has_search_term());
        assert!(!SearchCriteria::default()
            .with_title("   ")
            .with_author("")
            .has_search_term());
        assert!(SearchCriteria::default().with_genre("poetry").has_search_term());
    }

    fn record() -> BookRecord {
        BookRecord {
            id: "/works/OL1W".to_string(),
            title: "One".to_string(),
            authors: vec![],
            first_publish_year: None,
            isbn_list: None,
            cover_id: None,
            subjects: None,
            edition_keys: None,
        }
    }

    #[test]
    fn test_response_from_page() {
        let page = SearchPage {
            items: vec![record()],
            total_matching: 30,
            offset_consumed: 12,
        };

        let response = SearchResponse::from(page);
        assert_eq!(response.next_offset, 13);
        assert!(response.has_more);

        let response = SearchResponse::from(SearchPage::empty(24));
        assert_eq!(response.next_offset, 24);
        assert!(!response.has_more);
    }

    #[test]
    fn test_next_offset_saturates_at_max_offset() {
        let page = SearchPage {
            items: vec![record()],
            total_matching: 30,
            offset_consumed: usize::MAX,
        };

        let response = SearchResponse::from(page);
        assert_eq!(response.next_offset, usize::MAX);
        assert!(!response.has_more);
    }
}
