use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    pub career_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ManualTransitionRequest {
    /// "drop" or "promote".
    #[validate(length(min = 1))]
    pub action: String,
    /// Target status label, required when promoting.
    pub to_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    pub career_id: Option<Uuid>,
    pub status: Option<String>,
}
