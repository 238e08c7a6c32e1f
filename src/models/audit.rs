// src/models/audit.rs
//
// Trilha de auditoria: documentos gravados uma única vez, nunca alterados
// nem apagados. O timestamp é o do momento da gravação do log, não o do
// pedido de mutação.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::strip_id;
use crate::store::Document;

/// Exclusão de item: carrega o snapshot completo de antes da exclusão.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLog {
    #[serde(skip_deserializing, default)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub item: Value,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

impl DeleteLog {
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        let mut log: DeleteLog = serde_json::from_value(doc.body.clone())?;
        log.id = doc.id;
        Ok(log)
    }

    pub fn to_body(&self) -> Result<Value, AppError> {
        Ok(strip_id(serde_json::to_value(self)?))
    }
}

/// Edição de item: só o mapa dos campos que mudaram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditLog {
    #[serde(skip_deserializing, default)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub changes: Value,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

impl EditLog {
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        let mut log: EditLog = serde_json::from_value(doc.body.clone())?;
        log.id = doc.id;
        Ok(log)
    }

    pub fn to_body(&self) -> Result<Value, AppError> {
        Ok(strip_id(serde_json::to_value(self)?))
    }
}

/// Exclusão de serviço, com o campo `action` fixo em "delete" como no
/// cliente original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLog {
    #[serde(skip_deserializing, default)]
    pub id: Uuid,
    pub action: String,
    pub service_id: Uuid,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

impl ServiceLog {
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        let mut log: ServiceLog = serde_json::from_value(doc.body.clone())?;
        log.id = doc.id;
        Ok(log)
    }

    pub fn to_body(&self) -> Result<Value, AppError> {
        Ok(strip_id(serde_json::to_value(self)?))
    }
}
