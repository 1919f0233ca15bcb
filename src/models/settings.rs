use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Singleton configuration row. Only the screening prompt is read by the
/// engine; the row is managed through the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GlobalSettings {
    pub id: i32,
    pub cv_screening_prompt: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
