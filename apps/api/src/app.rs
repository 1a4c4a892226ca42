use crate::{
    config::Config,
    error::Result,
    handlers,
    models::{
        BookRecord, BookSummary, ErrorResponse, HealthResponse, RecommendationRequest,
        RecommendationResult, RecommendedBook, SearchResponse, SortOrder,
    },
    routes::{api_routes, swagger_redirect_route, swagger_routes},
    services::{BookSearch, ChatCompletionClient, OpenLibraryClient, RecommendationClient},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};
use std::{net::TcpListener, sync::Arc};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::search::search_books,
        handlers::recommendations::get_recommendations,
    ),
    components(schemas(
        HealthResponse,
        ErrorResponse,
        SearchResponse,
        BookSummary,
        BookRecord,
        SortOrder,
        RecommendationRequest,
        RecommendationResult,
        RecommendedBook,
    )),
    tags(
        (name = "Search", description = "Book search over Open Library"),
        (name = "Recommendations", description = "Model-backed recommendations from a description"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind((self.host.as_str(), self.port))?;
        info!("Starting server at http://{}:{}", self.host, self.port);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let search_client: Arc<dyn BookSearch> = Arc::new(
            OpenLibraryClient::new(&self.config.open_library_url)
                .context("Failed to initialize Open Library client")?,
        );
        let search_client = web::Data::from(search_client);
        let recommendation_client = self.recommendation_client()?;
        let config = web::Data::new(self.config.clone());

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            let mut app = App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(search_client.clone())
                .app_data(config.clone());
            if let Some(client) = &recommendation_client {
                app = app.app_data(client.clone());
            }

            app.service(api_routes())
                .service(swagger_redirect_route())
                .service(swagger_routes())
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }

    fn recommendation_client(&self) -> Result<Option<web::Data<RecommendationClient>>> {
        let Some(api_key) = &self.config.completion_api_key else {
            warn!("APP_COMPLETION_API_KEY is not set; recommendations are disabled");
            return Ok(None);
        };

        let completion = ChatCompletionClient::new(
            &self.config.completion_base_url,
            api_key,
            &self.config.completion_model,
        )
        .context("Failed to initialize completion client")?;
        info!(
            "Recommendations enabled with model {}",
            self.config.completion_model
        );

        Ok(Some(web::Data::new(RecommendationClient::new(Arc::new(
            completion,
        )))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendations_disabled_without_key() {
        let config = Config::from_env_prefix("NAVIGATOR_APP_TEST").unwrap();
        let application = Application::new(&config);

        assert!(application.recommendation_client().unwrap().is_none());
    }

    #[test]
    fn test_recommendations_enabled_with_key() {
        let mut config = Config::from_env_prefix("NAVIGATOR_APP_TEST").unwrap();
        config.completion_api_key = Some("sk-test".to_string());
        let application = Application::new(&config);

        assert!(application.recommendation_client().unwrap().is_some());
    }
}
