use crate::error::Result;
use crate::models::settings::GlobalSettings;
use sqlx::PgPool;

/// The singleton configuration row lives at id = 1 and is created by the
/// initial migration.
#[derive(Clone)]
pub struct SettingsService {
    pool: PgPool,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<GlobalSettings> {
        let settings = sqlx::query_as::<_, GlobalSettings>(
            "SELECT id, cv_screening_prompt, updated_at FROM global_settings WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    pub async fn set_screening_prompt(&self, prompt: &str) -> Result<GlobalSettings> {
        let settings = sqlx::query_as::<_, GlobalSettings>(
            r#"
            UPDATE global_settings SET cv_screening_prompt = $1, updated_at = NOW()
            WHERE id = 1
            RETURNING id, cv_screening_prompt, updated_at
            "#,
        )
        .bind(prompt)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }
}
