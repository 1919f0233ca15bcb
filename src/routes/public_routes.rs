use crate::error::Result;
use crate::models::career::Career;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

pub async fn list_open_careers(State(state): State<AppState>) -> Result<Json<Vec<Career>>> {
    let careers = state.career_service.list_open().await?;
    Ok(Json(careers))
}

pub async fn get_open_career(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Career>> {
    let career = state.career_service.get_open(id).await?;
    Ok(Json(career))
}
