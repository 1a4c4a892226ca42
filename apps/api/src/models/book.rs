use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

pub const COVERS_BASE_URL: &str = "https://covers.openlibrary.org/b";
pub const OPEN_LIBRARY_SITE_URL: &str = "https://openlibrary.org";

/// Shown when a book has no cover, and when a cover URL fails to load.
pub const PLACEHOLDER_COVER_URL: &str = "https://placehold.co/200x300.png";

const UNKNOWN_AUTHOR: &str = "Unknown Author";
const UNKNOWN_GENRE: &str = "N/A";
const DISPLAYED_SUBJECTS: usize = 3;

fn deserialize_optional_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i32),
        Null,
    }

    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                i32::from_str(s.trim())
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
        }
        StringOrInt::Int(i) => Ok(Some(i)),
        StringOrInt::Null => Ok(None),
    }
}

/// One `docs[]` entry as returned by the Open Library search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenLibraryDoc {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub first_publish_year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<Vec<String>>,
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub subject: Option<Vec<String>>,
    #[serde(default)]
    pub edition_key: Option<Vec<String>>,
}

/// A book as reported by the search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    /// Work key (`/works/OL45883W`) or, failing that, an edition key
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition_keys: Option<Vec<String>>,
}

impl From<OpenLibraryDoc> for BookRecord {
    fn from(doc: OpenLibraryDoc) -> Self {
        let id = doc
            .key
            .filter(|key| !key.is_empty())
            .or_else(|| {
                doc.edition_key
                    .as_ref()
                    .and_then(|keys| keys.first().cloned())
            })
            .unwrap_or_default();

        Self {
            id,
            title: doc.title.unwrap_or_default(),
            authors: doc.author_name.unwrap_or_default(),
            first_publish_year: doc.first_publish_year,
            isbn_list: doc.isbn,
            cover_id: doc.cover_i,
            subjects: doc.subject,
            edition_keys: doc.edition_key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl CoverSize {
    fn suffix(self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }
}

impl BookRecord {
    /// Cover image URL: by cover id, then by first ISBN, then the placeholder.
    pub fn cover_url(&self, size: CoverSize) -> String {
        if let Some(cover_id) = self.cover_id.filter(|id| *id > 0) {
            return format!("{}/id/{}-{}.jpg", COVERS_BASE_URL, cover_id, size.suffix());
        }

        match self.isbn_list.as_ref().and_then(|isbns| isbns.first()) {
            Some(isbn) if !isbn.is_empty() => {
                format!("{}/isbn/{}-{}.jpg", COVERS_BASE_URL, isbn, size.suffix())
            }
            _ => PLACEHOLDER_COVER_URL.to_string(),
        }
    }

    /// Link to the book page, preferring the first edition over the work.
    pub fn info_url(&self) -> Option<String> {
        if let Some(edition) = self
            .edition_keys
            .as_ref()
            .and_then(|keys| keys.first())
            .filter(|key| !key.is_empty())
        {
            return Some(format!("{}/books/{}", OPEN_LIBRARY_SITE_URL, edition));
        }

        if self.id.starts_with('/') {
            Some(format!("{}{}", OPEN_LIBRARY_SITE_URL, self.id))
        } else {
            None
        }
    }

    pub fn authors_display(&self) -> String {
        if self.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            self.authors.join(", ")
        }
    }

    /// The first few subjects, which stand in for genres.
    pub fn genre_display(&self) -> String {
        match self.subjects.as_deref() {
            Some(subjects) if !subjects.is_empty() => subjects
                .iter()
                .take(DISPLAYED_SUBJECTS)
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            _ => UNKNOWN_GENRE.to_string(),
        }
    }
}

/// Book as served to API clients, with derived links.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    #[serde(flatten)]
    pub book: BookRecord,
    pub cover_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,
}

impl From<BookRecord> for BookSummary {
    fn from(book: BookRecord) -> Self {
        Self {
            cover_url: book.cover_url(CoverSize::Medium),
            info_url: book.info_url(),
            book,
        }
    }
}
