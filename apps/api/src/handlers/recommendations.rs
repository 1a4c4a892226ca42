use crate::{
    error::ApiError,
    models::{ErrorResponse, RecommendationRequest, RecommendationResult},
    services::RecommendationClient,
};
use actix_web::{
    web::{self, Json},
    HttpResponse,
};

pub fn recommendations_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/recommendations").route(web::post().to(get_recommendations)));
}

/// Recommend books from a description
///
/// Sends the description to a generative model through a fixed prompt and returns the
/// schema-validated list of similar books. The list may be empty.
#[utoipa::path(
    post,
    path = "/api/recommendations",
    tag = "Recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Recommendations generated", body = RecommendationResult),
        (status = 400, description = "Description shorter than 20 characters", body = ErrorResponse),
        (status = 502, description = "The model failed or returned malformed output", body = ErrorResponse),
        (status = 503, description = "No completion model configured", body = ErrorResponse),
    )
)]
pub async fn get_recommendations(
    request: Json<RecommendationRequest>,
    recommendation_client: Option<web::Data<RecommendationClient>>,
) -> Result<HttpResponse, ApiError> {
    let client = recommendation_client.ok_or_else(|| {
        ApiError::ConfigError("Recommendation model is not configured".to_string())
    })?;

    let result = client.recommend(&request.description).await?;

    Ok(HttpResponse::Ok().json(result))
}
