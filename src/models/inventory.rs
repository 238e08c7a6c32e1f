// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::strip_id;
use crate::store::Document;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(skip_deserializing, default)]
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        let mut category: Category = serde_json::from_value(doc.body.clone())?;
        category.id = doc.id;
        Ok(category)
    }

    pub fn to_body(&self) -> Result<Value, AppError> {
        Ok(strip_id(serde_json::to_value(self)?))
    }
}

// --- 2. Itens ---
// O item guarda o nome da categoria (snapshot) e a referência por id,
// como nas revisões mais novas do cadastro.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(skip_deserializing, default)]
    pub id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub category: String,
    #[serde(rename = "categoryID")]
    pub category_id: Uuid,
}

impl Item {
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        let mut item: Item = serde_json::from_value(doc.body.clone())?;
        item.id = doc.id;
        Ok(item)
    }

    pub fn to_body(&self) -> Result<Value, AppError> {
        Ok(strip_id(serde_json::to_value(self)?))
    }
}

// --- 3. Movimentações ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MovementKind {
    #[serde(rename = "entrada")]
    Entrada,
    #[serde(rename = "saída")]
    Saida,
}

/// Registro apenas-append: cada movimentação mexe no saldo de exatamente
/// um item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    #[serde(skip_deserializing, default)]
    pub id: Uuid,
    pub item: String,
    #[serde(rename = "itemID")]
    pub item_id: Uuid,
    pub quantity: Decimal,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub timestamp: DateTime<Utc>,
}

impl Movement {
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        let mut movement: Movement = serde_json::from_value(doc.body.clone())?;
        movement.id = doc.id;
        Ok(movement)
    }

    pub fn to_body(&self) -> Result<Value, AppError> {
        Ok(strip_id(serde_json::to_value(self)?))
    }
}

/// Movimentação decorada com o nome da categoria do item, como a tela de
/// histórico exibe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementView {
    #[serde(flatten)]
    pub movement: Movement,
    pub category: String,
}
