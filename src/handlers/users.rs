// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

pub async fn get_secondary_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(admin): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_service.list_secondary(&admin).await?;
    Ok((StatusCode::OK, Json(users)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSecondaryPayload {
    #[validate(email(message = "E-mail inválido."))]
    pub email: String,
}

pub async fn create_secondary_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Json(payload): Json<CreateSecondaryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state
        .user_service
        .create_secondary(&admin, &payload.email)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn delete_secondary_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(admin): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.user_service.delete_secondary(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
