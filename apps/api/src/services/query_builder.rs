use crate::models::SearchCriteria;

/// Projection requested from the search API. Full descriptions are not
/// available from bulk search, so they are never asked for.
pub const SEARCH_FIELDS: &str =
    "key,title,author_name,first_publish_year,isbn,cover_i,subject,edition_key";

/// Upstream query parameters built from [`SearchCriteria`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    title: Option<String>,
    author: Option<String>,
    subject: Option<String>,
    sort: Option<&'static str>,
}

impl SearchQuery {
    pub fn sort(&self) -> Option<&'static str> {
        self.sort
    }

    /// Parameters for one page request, in the order the API documents them.
    pub fn to_params(&self, limit: usize, offset: usize) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(7);

        if let Some(title) = &self.title {
            params.push(("title", title.clone()));
        }
        if let Some(author) = &self.author {
            params.push(("author", author.clone()));
        }
        // genre is called "subject" upstream
        if let Some(subject) = &self.subject {
            params.push(("subject", subject.clone()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort", sort.to_string()));
        }

        params.push(("fields", SEARCH_FIELDS.to_string()));
        params.push(("limit", limit.to_string()));
        params.push(("offset", offset.to_string()));
        params
    }
}

/// Builds the upstream query, or `None` when the criteria carry no search
/// term. `None` means "do not call the API".
pub fn build_query(criteria: &SearchCriteria) -> Option<SearchQuery> {
    if !criteria.has_search_term() {
        return None;
    }

    Some(SearchQuery {
        title: criteria.title_term().map(str::to_string),
        author: criteria.author_term().map(str::to_string),
        subject: criteria.genre_term().map(str::to_string),
        sort: criteria.sort.as_query_value(),
    })
}
