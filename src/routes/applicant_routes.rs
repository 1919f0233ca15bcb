use crate::dto::application_dto::ApplyRequest;
use crate::dto::cv_dto::UpsertCvRequest;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::application::Application;
use crate::models::cv::ApplicantCv;
use crate::services::notification_service::application_received_email;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use validator::Validate;

/// Upsert the caller's digital CV, then move any of their applications
/// waiting at "For CV Upload" into the screening stage.
pub async fn upsert_cv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpsertCvRequest>,
) -> Result<Json<ApplicantCv>> {
    payload.validate()?;
    let sections = payload.sections.into_iter().map(Into::into).collect();
    let cv = state.cv_service.upsert(&claims.sub, sections).await?;

    let advanced = state
        .application_service
        .advance_to_screening(&claims.sub)
        .await?;
    if advanced > 0 {
        tracing::info!(email = %claims.sub, advanced, "applications moved to CV screening");
    }

    Ok(Json(cv))
}

pub async fn my_cv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApplicantCv>> {
    let cv = state
        .cv_service
        .get(&claims.sub)
        .await?
        .ok_or_else(|| Error::NotFound("no CV on file".to_string()))?;
    Ok(Json(cv))
}

pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ApplyRequest>,
) -> Result<Json<Application>> {
    payload.validate()?;

    let name = state
        .auth_service
        .user_name(&claims.sub)
        .await?
        .ok_or_else(|| Error::Unauthorized("unknown user".to_string()))?;
    let application = state
        .application_service
        .apply(&claims.sub, &name, payload.career_id)
        .await?;

    // Email is best-effort: a failed enqueue never rolls back the application.
    let career = state
        .career_service
        .get_open(application.career_id)
        .await
        .ok();
    let job_title = career
        .map(|c| c.job_title)
        .unwrap_or_else(|| "the position".to_string());
    let (subject, body) = application_received_email(&application.candidate_name, &job_title);
    state
        .notification_service
        .enqueue_best_effort(&application.candidate_email, &subject, &body)
        .await;

    Ok(Json(application))
}

pub async fn my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Application>>> {
    let rows = state
        .application_service
        .list_for_candidate(&claims.sub)
        .await?;
    Ok(Json(rows))
}
