use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCareerPayload {
    #[validate(length(min = 1, max = 200))]
    pub job_title: String,
    pub description: Option<String>,
    /// "Only Strong Fit" | "Good Fit and above" | anything else (no override).
    pub screening_setting: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCareerPayload {
    #[validate(length(min = 1, max = 200))]
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub screening_setting: Option<String>,
    pub status: Option<String>,
}
