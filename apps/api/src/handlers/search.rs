use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    config::Config,
    error::ApiError,
    models::{ErrorResponse, SearchCriteria, SearchResponse, SortOrder},
    services::{accumulator::MISSING_CRITERIA_MESSAGE, build_query, BookSearch},
};

const MAX_PAGE_SIZE: usize = 100;

pub fn search_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/search").route(web::get().to(search_books)));
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Book title or keyword
    pub title: Option<String>,
    pub author: Option<String>,
    /// Genre, matched against Open Library subjects
    pub genre: Option<String>,
    /// relevance (default), title, newest or oldest
    pub sort: Option<SortOrder>,
    /// Page size, 1 to 100
    pub limit: Option<usize>,
    /// Zero-based offset of the first result
    pub offset: Option<usize>,
}

impl SearchParams {
    fn into_criteria(self) -> SearchCriteria {
        SearchCriteria {
            title: self.title,
            author: self.author,
            genre: self.genre,
            sort: self.sort.unwrap_or_default(),
        }
    }
}

/// Search books by title, author and/or genre
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "Search",
    params(SearchParams),
    responses(
        (status = 200, description = "One page of matching books", body = SearchResponse),
        (status = 400, description = "No search criteria given", body = ErrorResponse),
        (status = 502, description = "The book service failed", body = ErrorResponse),
    )
)]
pub async fn search_books(
    params: web::Query<SearchParams>,
    search: web::Data<dyn BookSearch>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let limit = params
        .limit
        .unwrap_or(config.results_per_page)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0);

    let criteria = params.into_criteria();
    let query = build_query(&criteria)
        .ok_or_else(|| ApiError::InvalidInput(MISSING_CRITERIA_MESSAGE.to_string()))?;

    let page = search.fetch_page(&query, limit, offset).await?;

    Ok(HttpResponse::Ok().json(SearchResponse::from(page)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookRecord, SearchPage};
    use crate::services::open_library::MockBookSearch;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;
    use std::sync::Arc;

    fn test_config() -> Config {
        Config::from_env_prefix("NAVIGATOR_SEARCH_HANDLER_TEST").unwrap()
    }

    fn book(id: &str) -> BookRecord {
        BookRecord {
            id: id.to_string(),
            title: "Foundation".to_string(),
            authors: vec!["Isaac Asimov".to_string()],
            first_publish_year: Some(1951),
            isbn_list: None,
            cover_id: Some(42),
            subjects: None,
            edition_keys: None,
        }
    }

    macro_rules! init_app {
        ($mock:expr) => {{
            let search: Arc<dyn BookSearch> = Arc::new($mock);
            test::init_service(
                App::new()
                    .app_data(web::Data::from(search))
                    .app_data(web::Data::new(test_config()))
                    .configure(search_config),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_missing_criteria_is_bad_request() {
        let mut mock = MockBookSearch::new();
        mock.expect_fetch_page().times(0);
        let app = init_app!(mock);

        let req = test::TestRequest::get()
            .uri("/search?title=&sort=newest")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], MISSING_CRITERIA_MESSAGE);
        assert_eq!(body["status"], 400);
    }

    #[actix_web::test]
    async fn test_search_returns_page() {
        let mut mock = MockBookSearch::new();
        mock.expect_fetch_page()
            .withf(|query, limit, offset| {
                query.sort() == Some("new") && *limit == 12 && *offset == 12
            })
            .times(1)
            .returning(|_, _, offset| {
                Ok(SearchPage {
                    items: vec![book("/works/OL1W"), book("/works/OL2W")],
                    total_matching: 30,
                    offset_consumed: offset,
                })
            });
        let app = init_app!(mock);

        let req = test::TestRequest::get()
            .uri("/search?genre=science%20fiction&sort=newest&offset=12")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["totalMatching"], 30);
        assert_eq!(body["offsetConsumed"], 12);
        assert_eq!(body["nextOffset"], 14);
        assert_eq!(body["hasMore"], true);
        assert_eq!(body["items"][0]["id"], "/works/OL1W");
        assert_eq!(
            body["items"][0]["coverUrl"],
            "https://covers.openlibrary.org/b/id/42-M.jpg"
        );
    }

    #[actix_web::test]
    async fn test_limit_is_clamped() {
        let mut mock = MockBookSearch::new();
        mock.expect_fetch_page()
            .withf(|_, limit, _| *limit == MAX_PAGE_SIZE)
            .times(1)
            .returning(|_, _, offset| Ok(SearchPage::empty(offset)));
        let app = init_app!(mock);

        let req = test::TestRequest::get()
            .uri("/search?author=Asimov&limit=500")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["items"], serde_json::json!([]));
        assert_eq!(body["hasMore"], false);
    }

    #[actix_web::test]
    async fn test_forbidden_upstream_maps_to_bad_gateway() {
        let mut mock = MockBookSearch::new();
        mock.expect_fetch_page().times(1).returning(|_, _, _| {
            Err(ApiError::SearchFailed {
                status: 403,
                message: "blocked".to_string(),
            })
        });
        let app = init_app!(mock);

        let req = test::TestRequest::get()
            .uri("/search?title=Dune")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Access to the book service is currently forbidden"));
    }

    #[actix_web::test]
    async fn test_huge_offset_does_not_overflow() {
        let mut mock = MockBookSearch::new();
        mock.expect_fetch_page()
            .withf(|_, _, offset| *offset == usize::MAX)
            .times(1)
            .returning(|_, _, offset| {
                Ok(SearchPage {
                    items: vec![book("/works/OL1W")],
                    total_matching: 30,
                    offset_consumed: offset,
                })
            });
        let app = init_app!(mock);

        let req = test::TestRequest::get()
            .uri(&format!("/search?title=Dune&offset={}", usize::MAX))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["nextOffset"], usize::MAX as u64);
        assert_eq!(body["hasMore"], false);
    }
}
