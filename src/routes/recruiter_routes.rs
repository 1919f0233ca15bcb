use crate::dto::application_dto::{CandidateQuery, ManualTransitionRequest};
use crate::dto::career_dto::{CreateCareerPayload, UpdateCareerPayload};
use crate::dto::screening_dto::ScreenCvRequest;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::application::{Application, CandidateGroup};
use crate::models::career::Career;
use crate::models::history::InterviewHistory;
use crate::services::screening_service::{ScreeningOutcome, ScreeningRequest};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

fn org_of(claims: &Claims) -> Result<Uuid> {
    claims
        .org
        .ok_or_else(|| Error::Forbidden("caller has no organization".to_string()))
}

pub async fn list_careers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Career>>> {
    let careers = state.career_service.list_for_org(org_of(&claims)?).await?;
    Ok(Json(careers))
}

pub async fn create_career(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCareerPayload>,
) -> Result<(StatusCode, Json<Career>)> {
    payload.validate()?;
    let career = state
        .career_service
        .create(org_of(&claims)?, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(career)))
}

pub async fn get_career(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Career>> {
    let career = state
        .career_service
        .get_for_org(id, org_of(&claims)?)
        .await?;
    Ok(Json(career))
}

pub async fn update_career(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCareerPayload>,
) -> Result<Json<Career>> {
    payload.validate()?;
    let career = state
        .career_service
        .update(id, org_of(&claims)?, &payload)
        .await?;
    Ok(Json(career))
}

pub async fn close_career(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.career_service.close(id, org_of(&claims)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_candidates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<Vec<Application>>> {
    let rows = state
        .application_service
        .list_for_org(org_of(&claims)?, query.career_id, query.status.as_deref())
        .await?;
    Ok(Json(rows))
}

pub async fn grouped_candidates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<CandidateGroup>>> {
    let rows = state
        .application_service
        .group_by_career(org_of(&claims)?)
        .await?;
    Ok(Json(rows))
}

/// The CV screening decision engine. One classifier call; the decision is
/// persisted atomically and the transition recorded in history.
pub async fn screen_cv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(uid): Path<Uuid>,
    Json(payload): Json<ScreenCvRequest>,
) -> Result<Json<ScreeningOutcome>> {
    payload.validate()?;

    // Org-scoped access check before the engine runs.
    state
        .application_service
        .get_for_org(uid, org_of(&claims)?)
        .await?;

    let req = ScreeningRequest {
        application_uid: uid,
        candidate_email: payload.candidate_email,
        pre_screening_answers: payload.pre_screening_answers,
    };
    let outcome = state
        .screening_service
        .screen_application(&state.classifier_service, &req)
        .await?;
    Ok(Json(outcome))
}

pub async fn manual_transition(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(uid): Path<Uuid>,
    Json(payload): Json<ManualTransitionRequest>,
) -> Result<Json<Application>> {
    payload.validate()?;
    let application = state
        .application_service
        .manual_transition(
            uid,
            org_of(&claims)?,
            &payload.action,
            payload.to_status.as_deref(),
            &claims.sub,
        )
        .await?;
    Ok(Json(application))
}

pub async fn application_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(uid): Path<Uuid>,
) -> Result<Json<Vec<InterviewHistory>>> {
    let rows = state
        .application_service
        .history(uid, org_of(&claims)?)
        .await?;
    Ok(Json(rows))
}
