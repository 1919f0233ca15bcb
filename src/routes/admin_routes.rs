use crate::dto::screening_dto::UpdateScreeningPromptRequest;
use crate::error::Result;
use crate::models::organization::Organization;
use crate::models::settings::GlobalSettings;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<GlobalSettings>> {
    let settings = state.settings_service.get().await?;
    Ok(Json(settings))
}

pub async fn update_screening_prompt(
    State(state): State<AppState>,
    Json(payload): Json<UpdateScreeningPromptRequest>,
) -> Result<Json<GlobalSettings>> {
    payload.validate()?;
    let settings = state
        .settings_service
        .set_screening_prompt(&payload.cv_screening_prompt)
        .await?;
    Ok(Json(settings))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

pub async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Organization>>> {
    let orgs = state.auth_service.organizations().await?;
    Ok(Json(orgs))
}

pub async fn create_organization(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>)> {
    payload.validate()?;
    let org = state.auth_service.create_organization(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(org)))
}
