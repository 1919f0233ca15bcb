use serde::Deserialize;
use serde_json::Value as JsonValue;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ScreenCvRequest {
    #[validate(email)]
    pub candidate_email: String,
    /// Pre-screening question id → answer, persisted verbatim alongside the
    /// decision.
    pub pre_screening_answers: Option<JsonValue>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateScreeningPromptRequest {
    #[validate(length(min = 1))]
    pub cv_screening_prompt: String,
}
