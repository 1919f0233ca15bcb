use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only audit record of a stage transition. Rows are inserted by the
/// screening engine and by manual reviewer actions, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewHistory {
    pub id: Uuid,
    pub interview_uid: Uuid,
    pub from_stage: Option<String>,
    pub to_stage: Option<String>,
    pub action: String,
    pub updated_by: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A not-yet-persisted history entry produced by a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTransaction {
    pub from_stage: Option<String>,
    pub to_stage: Option<String>,
    pub action: String,
    pub updated_by: String,
}
