// src/handlers/inventory.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::MaybeUser,
    models::auth::Actor,
    services::inventory_service::ItemPatch,
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateItem
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    pub category_id: Uuid,
}

pub async fn create_item(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .inventory_service
        .create_item(
            &payload.name,
            payload.quantity,
            payload.price,
            payload.category_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

// ---
// Handler: get_all_items (com a pesquisa da tela de estoque)
// ---
#[derive(Debug, Deserialize, Default)]
pub struct ItemSearchParams {
    pub search: Option<String>,
}

pub async fn get_all_items(
    State(app_state): State<AppState>,
    Query(params): Query<ItemSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state
        .inventory_service
        .list_items(params.search.as_deref().unwrap_or(""))
        .await?;

    Ok((StatusCode::OK, Json(items)))
}

// ---
// Payload: UpdateItem (campos opcionais; só o que mudou vai para o log)
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    pub name: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,

    pub category_id: Option<Uuid>,
}

pub async fn update_item(
    State(app_state): State<AppState>,
    MaybeUser(session): MaybeUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let actor = Actor::from_session(session);
    let patch = ItemPatch {
        name: payload.name,
        quantity: payload.quantity,
        price: payload.price,
        category_id: payload.category_id,
    };
    let item = app_state
        .inventory_service
        .update_item(&actor, id, patch)
        .await?;

    Ok((StatusCode::OK, Json(item)))
}

pub async fn delete_item(
    State(app_state): State<AppState>,
    MaybeUser(session): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_session(session);
    app_state.inventory_service.delete_item(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Payload: CreateCategoryPayload
// ---
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
}

pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .inventory_service
        .create_category(&payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_all_categories(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.inventory_service.list_categories().await?;
    Ok((StatusCode::OK, Json(categories)))
}

pub async fn rename_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .inventory_service
        .rename_category(id, &payload.name)
        .await?;

    Ok((StatusCode::OK, Json(category)))
}

pub async fn delete_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.inventory_service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
