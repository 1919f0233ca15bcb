use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::Result;
use crate::services::auth_service::issue_token;
use crate::AppState;
use axum::{extract::State, Json};
use validator::Validate;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;
    let user = state
        .auth_service
        .register_applicant(&payload.email, &payload.name, &payload.password)
        .await?;
    let token = issue_token(&user)?;
    Ok(Json(AuthResponse { token, user }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;
    let (user, token) = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(AuthResponse { token, user }))
}
