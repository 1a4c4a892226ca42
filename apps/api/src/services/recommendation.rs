use std::sync::Arc;

use schemars::schema_for;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::models::RecommendationResult;
use crate::services::completion::CompletionCapability;

pub const MIN_DESCRIPTION_LENGTH: usize = 20;

const PROMPT_TEMPLATE: &str = r#"You are an expert book recommender. Read the book description below and suggest 3 similar books a reader of it would enjoy.

Give every recommended book:
- title
- author
- genre, only when it is clear from the description or well known for that book
- reason: a short explanation of why it fits the description

Description:
{{description}}

Answer with a JSON object holding a 'recommendations' array."#;

/// Checks a description before anything is sent to the model.
pub fn validate_description(description: &str) -> Result<&str> {
    if description.chars().count() < MIN_DESCRIPTION_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Description must be at least {} characters.",
            MIN_DESCRIPTION_LENGTH
        )));
    }
    Ok(description)
}

pub fn render_prompt(description: &str) -> String {
    PROMPT_TEMPLATE.replace("{{description}}", description)
}

/// JSON Schema the model output must satisfy.
pub fn output_schema() -> Result<Value> {
    Ok(serde_json::to_value(schema_for!(RecommendationResult))?)
}

/// Recommends books similar to a free-text description.
#[derive(Clone)]
pub struct RecommendationClient {
    completion: Arc<dyn CompletionCapability>,
}

impl RecommendationClient {
    pub fn new(completion: Arc<dyn CompletionCapability>) -> Self {
        Self { completion }
    }

    pub async fn recommend(&self, description: &str) -> Result<RecommendationResult> {
        let description = validate_description(description)?;
        let prompt = render_prompt(description);
        let schema = output_schema()?;

        let output = self
            .completion
            .complete(&prompt, &schema)
            .await?
            .ok_or_else(|| {
                warn!("Completion returned no output for recommendation prompt");
                ApiError::UpstreamContractError("Model returned no output".to_string())
            })?;

        let result: RecommendationResult = serde_json::from_value(output).map_err(|e| {
            warn!("Model output failed schema validation: {}", e);
            ApiError::UpstreamContractError(format!(
                "Model output does not match the recommendation schema: {}",
                e
            ))
        })?;

        info!(
            "Generated {} recommendations from description",
            result.recommendations.len()
        );
        Ok(result)
    }
}
