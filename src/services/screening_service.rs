use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationMetadata};
use crate::models::career::Career;
use crate::models::cv::ApplicantCv;
use crate::models::history::HistoryTransaction;
use crate::models::screening::*;
use crate::services::classifier_service::{build_prompt, CvClassifier, PromptContext};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Storage operations the screening engine needs. Kept narrow so the engine
/// stays a function of (application, CV, job config, global prompt,
/// classifier) plus these calls.
#[async_trait]
pub trait ScreeningStore: Send + Sync {
    async fn find_application(&self, uid: Uuid, email: &str) -> Result<Option<Application>>;
    async fn find_cv(&self, email: &str) -> Result<Option<ApplicantCv>>;
    async fn find_career(&self, id: Uuid) -> Result<Option<Career>>;
    async fn screening_prompt(&self) -> Result<Option<String>>;
    /// Conditional set-update keyed by the application uid. Applies only
    /// while the row's status still matches `expected_status` as observed at
    /// read time; returns whether a row was written.
    async fn apply_screening_update(
        &self,
        uid: Uuid,
        expected_status: &str,
        update: &ScreeningUpdate,
    ) -> Result<bool>;
    async fn append_history(&self, uid: Uuid, tx: &HistoryTransaction) -> Result<()>;
    async fn touch_career_activity(&self, career_id: Uuid) -> Result<()>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningRequest {
    pub application_uid: Uuid,
    pub candidate_email: String,
    pub pre_screening_answers: Option<JsonValue>,
}

/// Deterministic translation of one verdict under one job setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningDecision {
    pub verdict: Verdict,
    pub bucket: Bucket,
    pub status: String,
    pub current_step: String,
    pub application_status: Option<String>,
    pub state_class: StateClass,
    pub setting_result: SettingResult,
    pub stage_entered: Option<&'static str>,
    pub history: Option<HistoryTransaction>,
    pub metadata_action: Option<&'static str>,
}

/// Map a verdict plus the job's configured screening setting onto the
/// pipeline transition, UI state class and pass/fail result.
///
/// The threshold override adjusts only state class and result; it never
/// reverses the stage/status transition chosen by the bucket, so a promoted
/// "Good Fit" can carry a Failed result under "Only Strong Fit".
pub fn decide(verdict: Verdict, setting: Option<ScreeningSetting>) -> ScreeningDecision {
    let bucket = Bucket::from(verdict);

    let (status, current_step, application_status, stage_entered, history, metadata_action) =
        match bucket {
            Bucket::Review => (
                STATUS_FOR_CV_SCREENING.to_string(),
                STAGE_CV_SCREENING.to_string(),
                None,
                None,
                None,
                None,
            ),
            Bucket::Drop => (
                STATUS_FOR_CV_SCREENING.to_string(),
                STAGE_CV_SCREENING.to_string(),
                Some(APPLICATION_DROPPED.to_string()),
                None,
                Some(HistoryTransaction {
                    from_stage: Some(STAGE_CV_SCREENING.to_string()),
                    to_stage: None,
                    action: "Dropped".to_string(),
                    updated_by: SYSTEM_ACTOR.to_string(),
                }),
                Some("Dropped"),
            ),
            Bucket::Promotion => (
                STATUS_FOR_AI_INTERVIEW.to_string(),
                STAGE_AI_INTERVIEW.to_string(),
                None,
                Some(STAGE_AI_INTERVIEW),
                Some(HistoryTransaction {
                    from_stage: Some(STAGE_CV_SCREENING.to_string()),
                    to_stage: Some(STAGE_PENDING_AI_INTERVIEW.to_string()),
                    action: "Auto-Promoted".to_string(),
                    updated_by: SYSTEM_ACTOR.to_string(),
                }),
                Some("Endorsed"),
            ),
        };

    // Base state class by verdict, independent of the transition above.
    let (mut state_class, mut setting_result) = match verdict {
        Verdict::StrongFit => (StateClass::Accepted, SettingResult::Passed),
        Verdict::GoodFit => (StateClass::Good, SettingResult::Passed),
        Verdict::NoFit | Verdict::BadFit | Verdict::IneligibleCv | Verdict::InsufficientData => {
            (StateClass::Rejected, SettingResult::Failed)
        }
    };

    // Threshold override, evaluated once.
    if let Some(setting) = setting {
        let passes = match setting {
            ScreeningSetting::OnlyStrongFit => verdict == Verdict::StrongFit,
            ScreeningSetting::GoodFitAndAbove => {
                verdict == Verdict::GoodFit || verdict == Verdict::StrongFit
            }
        };
        if passes {
            state_class = StateClass::Accepted;
            setting_result = SettingResult::Passed;
        } else {
            state_class = StateClass::Rejected;
            setting_result = SettingResult::Failed;
        }
    }

    ScreeningDecision {
        verdict,
        bucket,
        status,
        current_step,
        application_status,
        state_class,
        setting_result,
        stage_entered,
        history,
        metadata_action,
    }
}

/// The full decision document written onto the application in one
/// conditional set-update.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningUpdate {
    pub status: String,
    pub current_step: String,
    pub application_status: Option<String>,
    pub cv_status: String,
    pub cv_screening_reason: String,
    pub confidence: i32,
    pub job_fit_score: i32,
    pub state_class: String,
    pub cv_setting_result: String,
    pub stage_dates: JsonValue,
    pub metadata: Option<JsonValue>,
    pub pre_screening_answers: Option<JsonValue>,
}

/// What a successful screening call returns to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningOutcome {
    pub application_uid: Uuid,
    #[serde(flatten)]
    pub update: ScreeningUpdate,
    pub history: Option<HistoryTransaction>,
}

/// Run one screening end-to-end: resolve preconditions, classify once,
/// translate the verdict, persist.
///
/// Not-found preconditions and malformed classifier output come back as
/// structured errors with no state mutated; all writes happen after the
/// classifier call succeeds.
pub async fn run_screening(
    store: &dyn ScreeningStore,
    classifier: &dyn CvClassifier,
    req: &ScreeningRequest,
    now: DateTime<Utc>,
) -> Result<ScreeningOutcome> {
    let application = store
        .find_application(req.application_uid, &req.candidate_email)
        .await?
        .ok_or_else(|| Error::NotFound("no application found for this job".to_string()))?;

    if matches!(
        application.application_status.as_deref(),
        Some(APPLICATION_DROPPED) | Some(APPLICATION_CANCELLED)
    ) {
        return Err(Error::Conflict(
            "application is in a terminal state".to_string(),
        ));
    }

    let cv = store
        .find_cv(&req.candidate_email)
        .await?
        .ok_or_else(|| Error::NotFound("CV not uploaded for this application".to_string()))?;

    let career = store
        .find_career(application.career_id)
        .await?
        .ok_or_else(|| Error::NotFound("career no longer exists".to_string()))?;

    let global_instructions = store.screening_prompt().await?;

    let cv_text = cv.flatten();
    let prompt = build_prompt(&PromptContext {
        job_title: &career.job_title,
        job_description: career.description.as_deref().unwrap_or_default(),
        candidate_name: &application.candidate_name,
        cv_text: &cv_text,
        global_instructions: global_instructions.as_deref(),
    });

    // Single classifier call; retries are the caller's concern.
    let verdict = classifier.classify(&prompt).await?;

    let setting = career
        .screening_setting
        .as_deref()
        .and_then(ScreeningSetting::parse);
    let decision = decide(verdict.result, setting);

    tracing::info!(
        uid = %application.uid,
        verdict = %verdict.result,
        bucket = ?decision.bucket,
        "cv screening decided"
    );

    let mut stage_dates = serde_json::Map::new();
    if let Some(stage) = decision.stage_entered {
        stage_dates.insert(stage.to_string(), serde_json::json!(now));
    }
    let metadata = decision.metadata_action.map(|action| {
        serde_json::to_value(ApplicationMetadata {
            updated_by: SYSTEM_ACTOR.to_string(),
            action: action.to_string(),
            timestamp: now,
        })
        .unwrap_or(JsonValue::Null)
    });

    let update = ScreeningUpdate {
        status: decision.status.clone(),
        current_step: decision.current_step.clone(),
        application_status: decision.application_status.clone(),
        cv_status: decision.verdict.as_str().to_string(),
        cv_screening_reason: verdict.reason.clone(),
        confidence: verdict.confidence,
        job_fit_score: verdict.job_fit_score,
        state_class: decision.state_class.as_str().to_string(),
        cv_setting_result: decision.setting_result.as_str().to_string(),
        stage_dates: JsonValue::Object(stage_dates),
        metadata,
        pre_screening_answers: req.pre_screening_answers.clone(),
    };

    let applied = store
        .apply_screening_update(application.uid, &application.status, &update)
        .await?;
    if !applied {
        return Err(Error::Conflict(
            "application changed while screening was in progress".to_string(),
        ));
    }

    if let Some(tx) = &decision.history {
        store.append_history(application.uid, tx).await?;
    }
    store.touch_career_activity(application.career_id).await?;

    Ok(ScreeningOutcome {
        application_uid: application.uid,
        update,
        history: decision.history,
    })
}

/// Postgres-backed store used by the HTTP handlers.
#[derive(Clone)]
pub struct ScreeningService {
    pool: PgPool,
}

impl ScreeningService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn screen_application(
        &self,
        classifier: &dyn CvClassifier,
        req: &ScreeningRequest,
    ) -> Result<ScreeningOutcome> {
        run_screening(self, classifier, req, Utc::now()).await
    }
}

#[async_trait]
impl ScreeningStore for ScreeningService {
    async fn find_application(&self, uid: Uuid, email: &str) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            SELECT uid, candidate_email, candidate_name, career_id, organization_id,
                   status, application_status, current_step, cv_status, cv_screening_reason,
                   confidence, job_fit_score, state_class, cv_setting_result,
                   status_dates, application_metadata, pre_screening_answers,
                   created_at, updated_at
            FROM applications
            WHERE uid = $1 AND candidate_email = $2
            "#,
        )
        .bind(uid)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }

    async fn find_cv(&self, email: &str) -> Result<Option<ApplicantCv>> {
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

    async fn find_career(&self, id: Uuid) -> Result<Option<Career>> {
        let career = sqlx::query_as::<_, Career>(
            r#"
            SELECT id, organization_id, job_title, description, screening_setting,
                   status, last_activity_at, created_at, updated_at
            FROM careers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(career)
    }

    async fn screening_prompt(&self) -> Result<Option<String>> {
        let prompt: Option<Option<String>> = sqlx::query_scalar(
            "SELECT cv_screening_prompt FROM global_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(prompt.flatten())
    }

    async fn apply_screening_update(
        &self,
        uid: Uuid,
        expected_status: &str,
        update: &ScreeningUpdate,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE applications SET
                status = $2,
                current_step = $3,
                application_status = COALESCE($4, application_status),
                cv_status = $5,
                cv_screening_reason = $6,
                confidence = $7,
                job_fit_score = $8,
                state_class = $9,
                cv_setting_result = $10,
                status_dates = COALESCE(status_dates, '{}'::jsonb) || $11,
                application_metadata = COALESCE($12, application_metadata),
                pre_screening_answers = COALESCE($13, pre_screening_answers),
                updated_at = NOW()
            WHERE uid = $1 AND status = $14
            "#,
        )
        .bind(uid)
        .bind(&update.status)
        .bind(&update.current_step)
        .bind(&update.application_status)
        .bind(&update.cv_status)
        .bind(&update.cv_screening_reason)
        .bind(update.confidence)
        .bind(update.job_fit_score)
        .bind(&update.state_class)
        .bind(&update.cv_setting_result)
        .bind(&update.stage_dates)
        .bind(&update.metadata)
        .bind(&update.pre_screening_answers)
        .bind(expected_status)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_history(&self, uid: Uuid, tx: &HistoryTransaction) -> Result<()> {
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
        Ok(())
    }

    async fn touch_career_activity(&self, career_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE careers SET last_activity_at = NOW() WHERE id = $1")
            .bind(career_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_of(verdict: Verdict) -> (StateClass, SettingResult) {
        let d = decide(verdict, None);
        (d.state_class, d.setting_result)
    }

    #[test]
    fn base_state_class_table() {
        assert_eq!(
            state_of(Verdict::StrongFit),
            (StateClass::Accepted, SettingResult::Passed)
        );
        assert_eq!(
            state_of(Verdict::GoodFit),
            (StateClass::Good, SettingResult::Passed)
        );
        for v in [
            Verdict::NoFit,
            Verdict::BadFit,
            Verdict::IneligibleCv,
            Verdict::InsufficientData,
        ] {
            assert_eq!(state_of(v), (StateClass::Rejected, SettingResult::Failed));
        }
    }

    #[test]
    fn bucket_transitions_are_exclusive_and_total() {
        for v in Verdict::ALL {
            let d = decide(v, None);
            match d.bucket {
                Bucket::Review => {
                    assert_eq!(d.status, STATUS_FOR_CV_SCREENING);
                    assert!(d.application_status.is_none());
                    assert!(d.history.is_none());
                    assert!(d.stage_entered.is_none());
                }
                Bucket::Drop => {
                    assert_eq!(d.application_status.as_deref(), Some(APPLICATION_DROPPED));
                    let h = d.history.expect("drop emits history");
                    assert_eq!(h.action, "Dropped");
                    assert!(h.to_stage.is_none());
                    assert_eq!(d.metadata_action, Some("Dropped"));
                }
                Bucket::Promotion => {
                    assert_eq!(d.status, STATUS_FOR_AI_INTERVIEW);
                    assert_eq!(d.stage_entered, Some(STAGE_AI_INTERVIEW));
                    let h = d.history.expect("promotion emits history");
                    assert_eq!(h.action, "Auto-Promoted");
                    assert_eq!(h.to_stage.as_deref(), Some(STAGE_PENDING_AI_INTERVIEW));
                    assert_eq!(d.metadata_action, Some("Endorsed"));
                }
            }
        }
    }

    #[test]
    fn only_strong_fit_passes_strong_fit_alone() {
        for v in Verdict::ALL {
            let d = decide(v, Some(ScreeningSetting::OnlyStrongFit));
            if v == Verdict::StrongFit {
                assert_eq!(d.state_class, StateClass::Accepted);
                assert_eq!(d.setting_result, SettingResult::Passed);
            } else {
                assert_eq!(d.state_class, StateClass::Rejected);
                assert_eq!(d.setting_result, SettingResult::Failed);
            }
        }
    }

    #[test]
    fn good_fit_and_above_passes_both_upper_verdicts() {
        for v in Verdict::ALL {
            let d = decide(v, Some(ScreeningSetting::GoodFitAndAbove));
            if v == Verdict::GoodFit || v == Verdict::StrongFit {
                assert_eq!(d.state_class, StateClass::Accepted);
                assert_eq!(d.setting_result, SettingResult::Passed);
            } else {
                assert_eq!(d.state_class, StateClass::Rejected);
                assert_eq!(d.setting_result, SettingResult::Failed);
            }
        }
    }

    #[test]
    fn absent_setting_keeps_base_result() {
        for v in Verdict::ALL {
            let with_none = decide(v, None);
            assert_eq!((with_none.state_class, with_none.setting_result), state_of(v));
        }
        // Unrecognized settings parse to None upstream, same path.
        assert_eq!(ScreeningSetting::parse("Everyone Welcome"), None);
    }

    #[test]
    fn override_never_reverses_promotion() {
        // Good Fit under "Only Strong Fit": still promoted, but marked Failed.
        let d = decide(Verdict::GoodFit, Some(ScreeningSetting::OnlyStrongFit));
        assert_eq!(d.bucket, Bucket::Promotion);
        assert_eq!(d.status, STATUS_FOR_AI_INTERVIEW);
        assert_eq!(d.setting_result, SettingResult::Failed);
        assert_eq!(d.state_class, StateClass::Rejected);
        assert!(d.history.is_some());
    }
}
