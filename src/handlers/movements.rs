// src/handlers/movements.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::inventory::MovementKind,
    services::movement_service::MovementFilters,
    services::refdata::ReferenceData,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMovementPayload {
    #[validate(length(min = 1, message = "O nome do item é obrigatório."))]
    pub item: String,

    pub quantity: Decimal,

    #[serde(rename = "type")]
    pub kind: MovementKind,
}

pub async fn add_movement(
    State(app_state): State<AppState>,
    Json(payload): Json<AddMovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let movement = app_state
        .movement_service
        .apply_movement(payload.item.trim(), payload.quantity, payload.kind)
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub item_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<Uuid>,
}

pub async fn get_movements(
    State(app_state): State<AppState>,
    Query(params): Query<MovementQuery>,
) -> Result<impl IntoResponse, AppError> {
    // O snapshot de referência resolve categoria e nomes por consulta.
    let refdata = ReferenceData::load(&app_state.store).await?;

    let filters = MovementFilters {
        item_name: params.item_name,
        start_date: params.start_date,
        end_date: params.end_date,
        category: params.category,
    };
    let views = app_state
        .movement_service
        .list_movements(&refdata, &filters)
        .await?;

    Ok((StatusCode::OK, Json(views)))
}
