use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use book::{
    BookRecord, BookSummary, CoverSize, OpenLibraryDoc, PLACEHOLDER_COVER_URL,
};
pub use recommendation::{RecommendationRequest, RecommendationResult, RecommendedBook};
pub use search::{SearchCriteria, SearchPage, SearchResponse, SortOrder};

mod book;
mod recommendation;
mod search;

/// Health check response structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Status of the service
    #[schema(example = "ok")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    #[schema(example = "2024-01-15T10:30:00Z")]
    pub timestamp: String,
}

/// Error response structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    #[schema(example = "Please enter at least one search criteria (title, author, or genre).")]
    pub error: String,
    /// HTTP status code
    #[schema(example = 400)]
    pub status: u16,
}
