use crate::error::Result;
use crate::models::cv::{ApplicantCv, CvSection};
use sqlx::types::Json;
use sqlx::PgPool;

#[derive(Clone)]
pub struct CvService {
    pool: PgPool,
}

impl CvService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert: the latest upload replaces any prior CV for this email.
    pub async fn upsert(&self, email: &str, sections: Vec<CvSection>) -> Result<ApplicantCv> {
        let cv = sqlx::query_as::<_, ApplicantCv>(
            r#"
            INSERT INTO applicant_cvs (candidate_email, digital_cv)
            VALUES ($1, $2)
            ON CONFLICT (candidate_email)
            DO UPDATE SET digital_cv = EXCLUDED.digital_cv, updated_at = NOW()
            RETURNING candidate_email, digital_cv, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(Json(sections))
        .fetch_one(&self.pool)
        .await?;
        Ok(cv)
    }

    pub async fn get(&self, email: &str) -> Result<Option<ApplicantCv>> {
        let cv = sqlx::query_as::<_, ApplicantCv>(
            r#"
            SELECT candidate_email, digital_cv, created_at, updated_at
            FROM applicant_cvs
            WHERE candidate_email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cv)
    }
}
