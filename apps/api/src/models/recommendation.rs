use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Request structure for description-based recommendations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationRequest {
    /// Description of a book the reader liked; at least 20 characters
    #[schema(example = "A lonely lighthouse keeper finds letters from a sailor lost at sea.")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct RecommendedBook {
    /// The title of the recommended book.
    pub title: String,
    /// The author of the recommended book.
    pub author: String,
    /// The genre of the recommended book.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present_string"
    )]
    #[schemars(with = "String")]
    pub genre: Option<String>,
    /// Why the book is recommended based on the provided description.
    pub reason: String,
}

// optional, but `null` is not an accepted value
fn deserialize_present_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}

/// Structured model output; also the response body of `POST /api/recommendations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct RecommendationResult {
    /// A list of recommended books.
    pub recommendations: Vec<RecommendedBook>,
}
