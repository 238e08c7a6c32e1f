// src/store.rs
//
// O "Document Store Gateway": a aplicação inteira fala com as coleções
// (items, categories, movements, ...) através deste trait, nunca com o
// banco diretamente.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;

pub mod memory;
pub mod postgres;
pub mod predicate;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use predicate::{Operator, Predicate};

// --- Nomes das coleções ---
pub mod collections {
    pub const ITEMS: &str = "items";
    pub const CATEGORIES: &str = "categories";
    pub const MOVEMENTS: &str = "movements";
    pub const CLIENTS: &str = "clients";
    pub const SERVICES: &str = "services";
    pub const USERS: &str = "users";
    pub const DELETE_LOGS: &str = "deleteLogs";
    pub const EDIT_LOGS: &str = "editLogs";
    pub const SERVICE_LOGS: &str = "serviceLogs";
}

/// Um documento de uma coleção: o corpo JSON mais o id gerado pelo gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Value,
}

/// Uma escrita dentro de um lote atômico (`run_atomic`).
#[derive(Debug, Clone)]
pub enum WriteOp {
    Insert {
        collection: &'static str,
        id: Uuid,
        body: Value,
    },
    Update {
        collection: &'static str,
        id: Uuid,
        patch: Value,
    },
    Delete {
        collection: &'static str,
        id: Uuid,
    },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insere um documento e devolve o id gerado.
    async fn insert(&self, collection: &str, body: Value) -> Result<Uuid, AppError>;

    /// Busca todos os documentos da coleção que satisfazem os predicados
    /// (AND entre eles). Lista vazia de predicados devolve a coleção inteira.
    async fn get_all(
        &self,
        collection: &str,
        predicates: &[Predicate],
    ) -> Result<Vec<Document>, AppError>;

    async fn get_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, AppError>;

    /// Mescla `patch` no corpo do documento (merge raso de campos).
    /// Documento inexistente é erro, como o `updateDoc` original.
    async fn update_by_id(&self, collection: &str, id: Uuid, patch: Value)
    -> Result<(), AppError>;

    async fn delete_by_id(&self, collection: &str, id: Uuid) -> Result<(), AppError>;

    /// Executa o lote inteiro ou nada dele. Usado pelo reconciliador de
    /// estoque para gravar a movimentação e o novo saldo juntos.
    async fn run_atomic(&self, ops: Vec<WriteOp>) -> Result<(), AppError>;
}

/// Mescla rasa: cada campo do patch substitui o campo homônimo do corpo.
pub(crate) fn merge_patch(body: &mut Value, patch: &Value) {
    if let (Some(body_map), Some(patch_map)) = (body.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_map {
            body_map.insert(key.clone(), value.clone());
        }
    }
}
