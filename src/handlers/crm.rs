// src/handlers/crm.rs

use axum::{
    Json,
    extract::{Path, Query, State},
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
    middleware::auth::MaybeUser,
    models::auth::Actor,
    services::crm_service::{ClientFilters, ClientInput, ServiceFilters},
};

// ---
// Clientes
// ---

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub cpf_cnpj: String,
}

impl From<ClientPayload> for ClientInput {
    fn from(payload: ClientPayload) -> Self {
        ClientInput {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            cpf_cnpj: payload.cpf_cnpj,
        }
    }
}

pub async fn create_client(
    State(app_state): State<AppState>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.crm_service.create_client(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cpf_cnpj: Option<String>,
}

pub async fn get_all_clients(
    State(app_state): State<AppState>,
    Query(params): Query<ClientQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = ClientFilters {
        name: params.name,
        email: params.email,
        phone: params.phone,
        address: params.address,
        cpf_cnpj: params.cpf_cnpj,
    };
    let clients = app_state.crm_service.list_clients(&filters).await?;
    Ok((StatusCode::OK, Json(clients)))
}

pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state
        .crm_service
        .update_client(id, payload.into())
        .await?;
    Ok((StatusCode::OK, Json(client)))
}

pub async fn delete_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.crm_service.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Serviços
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServicePayload {
    pub client_id: Uuid,

    pub value: Decimal,

    #[validate(length(min = 1, message = "A data é obrigatória."))]
    pub date: String,

    #[serde(default)]
    pub observations: String,
}

pub async fn create_service(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateServicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let service = app_state
        .crm_service
        .create_service(
            payload.client_id,
            payload.value,
            &payload.date,
            &payload.observations,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(service)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuery {
    pub client: Option<String>,
    pub date: Option<String>,
    pub observations: Option<String>,
}

pub async fn get_service_history(
    State(app_state): State<AppState>,
    Query(params): Query<ServiceQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = ServiceFilters {
        client: params.client,
        date: params.date,
        observations: params.observations,
    };
    let history = app_state.crm_service.service_history(&filters).await?;
    Ok((StatusCode::OK, Json(history)))
}

pub async fn delete_service(
    State(app_state): State<AppState>,
    MaybeUser(session): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = Actor::from_session(session);
    app_state.crm_service.delete_service(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_service_logs(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let logs = app_state.crm_service.list_service_logs().await?;
    Ok((StatusCode::OK, Json(logs)))
}
