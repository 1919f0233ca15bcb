use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationMetadata, CandidateGroup};
use crate::models::history::{HistoryTransaction, InterviewHistory};
use crate::models::screening::*;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an application for (candidate, career). The at-most-one-pending
    /// guard is an existence check, not a storage constraint; concurrent
    /// submissions can race past it.
    pub async fn apply(
        &self,
        candidate_email: &str,
        candidate_name: &str,
        career_id: Uuid,
    ) -> Result<Application> {
        let career = sqlx::query_as::<_, crate::models::career::Career>(
            r#"
            SELECT id, organization_id, job_title, description, screening_setting,
                   status, last_activity_at, created_at, updated_at
            FROM careers WHERE id = $1 AND status = 'open'
            "#,
        )
        .bind(career_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("career not found or no longer open".to_string()))?;

        let pending: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT uid FROM applications
            WHERE candidate_email = $1 AND career_id = $2
              AND (application_status IS NULL OR application_status NOT IN ($3, $4))
            "#,
        )
        .bind(candidate_email)
        .bind(career_id)
        .bind(APPLICATION_DROPPED)
        .bind(APPLICATION_CANCELLED)
        .fetch_optional(&self.pool)
        .await?;
        if pending.is_some() {
            return Err(Error::Conflict(
                "an application for this job is already in progress".to_string(),
            ));
        }

        // An applicant who already uploaded a CV skips straight to screening.
        let has_cv: Option<String> = sqlx::query_scalar(
            "SELECT candidate_email FROM applicant_cvs WHERE candidate_email = $1",
        )
        .bind(candidate_email)
        .fetch_optional(&self.pool)
        .await?;
        let (status, step) = if has_cv.is_some() {
            (STATUS_FOR_CV_SCREENING, STAGE_CV_SCREENING)
        } else {
            (STATUS_FOR_CV_UPLOAD, STAGE_CV_UPLOAD)
        };

        let now = Utc::now();
        let stage_dates = serde_json::json!({ step: now });
        let metadata = serde_json::to_value(ApplicationMetadata {
            updated_by: candidate_email.to_string(),
            action: "Applied".to_string(),
            timestamp: now,
        })?;

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications
                (uid, candidate_email, candidate_name, career_id, organization_id,
                 status, application_status, current_step, status_dates, application_metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING uid, candidate_email, candidate_name, career_id, organization_id,
                   status, application_status, current_step, cv_status, cv_screening_reason,
                   confidence, job_fit_score, state_class, cv_setting_result,
                   status_dates, application_metadata, pre_screening_answers,
                   created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_email)
        .bind(candidate_name)
        .bind(career.id)
        .bind(career.organization_id)
        .bind(status)
        .bind(APPLICATION_ONGOING)
        .bind(step)
        .bind(stage_dates)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query("UPDATE careers SET last_activity_at = NOW() WHERE id = $1")
            .bind(career.id)
            .execute(&self.pool)
            .await?;

        Ok(application)
    }

    pub async fn list_for_candidate(&self, email: &str) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, Application>(
            r#"
            SELECT uid, candidate_email, candidate_name, career_id, organization_id,
                   status, application_status, current_step, cv_status, cv_screening_reason,
                   confidence, job_fit_score, state_class, cv_setting_result,
                   status_dates, application_metadata, pre_screening_answers,
                   created_at, updated_at
            FROM applications
            WHERE candidate_email = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_org(
        &self,
        organization_id: Uuid,
        career_id: Option<Uuid>,
        status: Option<&str>,
    ) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, Application>(
            r#"
            SELECT uid, candidate_email, candidate_name, career_id, organization_id,
                   status, application_status, current_step, cv_status, cv_screening_reason,
                   confidence, job_fit_score, state_class, cv_setting_result,
                   status_dates, application_metadata, pre_screening_answers,
                   created_at, updated_at
            FROM applications
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR career_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(organization_id)
        .bind(career_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Candidate-grouping aggregation: per-career counts per pipeline status
    /// for the recruiter dashboard.
    pub async fn group_by_career(&self, organization_id: Uuid) -> Result<Vec<CandidateGroup>> {
        let rows = sqlx::query_as::<_, CandidateGroup>(
            r#"
            SELECT a.career_id, c.job_title, a.status, COUNT(*) AS candidate_count
            FROM applications a
            JOIN careers c ON c.id = a.career_id
            WHERE a.organization_id = $1
              AND (a.application_status IS NULL OR a.application_status = 'Ongoing')
            GROUP BY a.career_id, c.job_title, a.status
            ORDER BY c.job_title, a.status
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_for_org(&self, uid: Uuid, organization_id: Uuid) -> Result<Application> {
        let row = sqlx::query_as::<_, Application>(
            r#"
            SELECT uid, candidate_email, candidate_name, career_id, organization_id,
                   status, application_status, current_step, cv_status, cv_screening_reason,
                   confidence, job_fit_score, state_class, cv_setting_result,
                   status_dates, application_metadata, pre_screening_answers,
                   created_at, updated_at
            FROM applications
            WHERE uid = $1 AND organization_id = $2
            "#,
        )
        .bind(uid)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("no application found for this job".to_string()))?;
        Ok(row)
    }

    /// Manual reviewer transition (promote to a named status or drop), with
    /// the same history/metadata side effects as the automatic path.
    pub async fn manual_transition(
        &self,
        uid: Uuid,
        organization_id: Uuid,
        action: &str,
        to_status: Option<&str>,
        actor: &str,
    ) -> Result<Application> {
        let current = self.get_for_org(uid, organization_id).await?;
        if matches!(
            current.application_status.as_deref(),
            Some(APPLICATION_DROPPED) | Some(APPLICATION_CANCELLED)
        ) {
            return Err(Error::Conflict(
                "application is in a terminal state".to_string(),
            ));
        }

        let now = Utc::now();
        let dropped = action.eq_ignore_ascii_case("drop");
        let (new_status, application_status) = if dropped {
            (current.status.clone(), Some(APPLICATION_DROPPED))
        } else {
            let status = to_status.ok_or_else(|| {
                Error::BadRequest("a target status is required to promote".to_string())
            })?;
            (status.to_string(), None)
        };

        let metadata = serde_json::to_value(ApplicationMetadata {
            updated_by: actor.to_string(),
            action: if dropped { "Dropped" } else { "Promoted" }.to_string(),
            timestamp: now,
        })?;

        let updated = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications SET
                status = $2,
                application_status = COALESCE($3, application_status),
                application_metadata = $4,
                updated_at = NOW()
            WHERE uid = $1
            RETURNING uid, candidate_email, candidate_name, career_id, organization_id,
                   status, application_status, current_step, cv_status, cv_screening_reason,
                   confidence, job_fit_score, state_class, cv_setting_result,
                   status_dates, application_metadata, pre_screening_answers,
                   created_at, updated_at
            "#,
        )
        .bind(uid)
        .bind(&new_status)
        .bind(application_status)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await?;

        let tx = HistoryTransaction {
            from_stage: current.current_step.clone(),
            to_stage: if dropped { None } else { Some(new_status) },
            action: if dropped { "Dropped" } else { "Promoted" }.to_string(),
            updated_by: actor.to_string(),
        };
        sqlx::query(
            r#"
            INSERT INTO interview_history (interview_uid, from_stage, to_stage, action, updated_by)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(uid)
        .bind(&tx.from_stage)
        .bind(&tx.to_stage)
        .bind(&tx.action)
        .bind(&tx.updated_by)
        .execute(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn history(&self, uid: Uuid, organization_id: Uuid) -> Result<Vec<InterviewHistory>> {
        // Access check first; history rows carry no org column.
        self.get_for_org(uid, organization_id).await?;
        let rows = sqlx::query_as::<_, InterviewHistory>(
            r#"
            SELECT id, interview_uid, from_stage, to_stage, action, updated_by, created_at
            FROM interview_history
            WHERE interview_uid = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// CV upload moves any of the applicant's applications waiting at
    /// "For CV Upload" into the screening stage.
    pub async fn advance_to_screening(&self, candidate_email: &str) -> Result<u64> {
        let now = Utc::now();
        let stage_dates = serde_json::json!({ STAGE_CV_SCREENING: now });
        let result = sqlx::query(
            r#"
            UPDATE applications SET
                status = $2,
                current_step = $3,
                status_dates = COALESCE(status_dates, '{}'::jsonb) || $4,
                updated_at = NOW()
            WHERE candidate_email = $1 AND status = $5
            "#,
        )
        .bind(candidate_email)
        .bind(STATUS_FOR_CV_SCREENING)
        .bind(STAGE_CV_SCREENING)
        .bind(stage_dates)
        .bind(STATUS_FOR_CV_UPLOAD)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
