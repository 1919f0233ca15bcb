use crate::dto::career_dto::{CreateCareerPayload, UpdateCareerPayload};
use crate::error::{Error, Result};
use crate::models::career::Career;
use sqlx::PgPool;
use uuid::Uuid;

const CAREER_COLUMNS: &str = "id, organization_id, job_title, description, screening_setting, \
                              status, last_activity_at, created_at, updated_at";

#[derive(Clone)]
pub struct CareerService {
    pool: PgPool,
}

impl CareerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_org(&self, organization_id: Uuid) -> Result<Vec<Career>> {
        let rows = sqlx::query_as::<_, Career>(&format!(
            "SELECT {CAREER_COLUMNS} FROM careers WHERE organization_id = $1 ORDER BY created_at DESC"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_open(&self) -> Result<Vec<Career>> {
        let rows = sqlx::query_as::<_, Career>(&format!(
            "SELECT {CAREER_COLUMNS} FROM careers WHERE status = 'open' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_open(&self, id: Uuid) -> Result<Career> {
        sqlx::query_as::<_, Career>(&format!(
            "SELECT {CAREER_COLUMNS} FROM careers WHERE id = $1 AND status = 'open'"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("career not found".to_string()))
    }

    pub async fn get_for_org(&self, id: Uuid, organization_id: Uuid) -> Result<Career> {
        sqlx::query_as::<_, Career>(&format!(
            "SELECT {CAREER_COLUMNS} FROM careers WHERE id = $1 AND organization_id = $2"
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("career not found".to_string()))
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        payload: &CreateCareerPayload,
    ) -> Result<Career> {
        let career = sqlx::query_as::<_, Career>(&format!(
            r#"
            INSERT INTO careers (id, organization_id, job_title, description, screening_setting, status)
            VALUES ($1, $2, $3, $4, $5, 'open')
            RETURNING {CAREER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(&payload.job_title)
        .bind(&payload.description)
        .bind(&payload.screening_setting)
        .fetch_one(&self.pool)
        .await?;
        Ok(career)
    }

    pub async fn update(
        &self,
        id: Uuid,
        organization_id: Uuid,
        payload: &UpdateCareerPayload,
    ) -> Result<Career> {
        let career = sqlx::query_as::<_, Career>(&format!(
            r#"
            UPDATE careers SET
                job_title = COALESCE($3, job_title),
                description = COALESCE($4, description),
                screening_setting = COALESCE($5, screening_setting),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2
            RETURNING {CAREER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(organization_id)
        .bind(&payload.job_title)
        .bind(&payload.description)
        .bind(&payload.screening_setting)
        .bind(&payload.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("career not found".to_string()))?;
        Ok(career)
    }

    pub async fn close(&self, id: Uuid, organization_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE careers SET status = 'closed', updated_at = NOW() WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("career not found".to_string()));
        }
        Ok(())
    }
}
