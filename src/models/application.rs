use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// One application per (candidate, career) pairing. Rows are never deleted;
/// terminal states are reached through `application_status`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub uid: Uuid,
    pub candidate_email: String,
    pub candidate_name: String,
    pub career_id: Uuid,
    pub organization_id: Uuid,
    pub status: String,
    pub application_status: Option<String>,
    pub current_step: Option<String>,
    pub cv_status: Option<String>,
    pub cv_screening_reason: Option<String>,
    pub confidence: Option<i32>,
    pub job_fit_score: Option<i32>,
    pub state_class: Option<String>,
    pub cv_setting_result: Option<String>,
    pub status_dates: Option<JsonValue>,
    pub application_metadata: Option<JsonValue>,
    pub pre_screening_answers: Option<JsonValue>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Last transition recorded on the application itself (the full trail lives
/// in `interview_history`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationMetadata {
    pub updated_by: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregation row for the recruiter dashboard: candidates per career,
/// per pipeline status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateGroup {
    pub career_id: Uuid,
    pub job_title: String,
    pub status: String,
    pub candidate_count: i64,
}
