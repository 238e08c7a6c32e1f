// src/store/memory.rs
//
// Backend em memória do gateway de documentos. É o que os testes usam:
// mesma semântica do backend Postgres, sem rede.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::store::{Document, DocumentStore, Predicate, WriteOp, merge_patch};

#[derive(Default)]
pub struct MemoryStore {
    // Vec por coleção preserva a ordem de inserção, que os filtros devem manter.
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantos documentos a coleção tem (auxiliar de testes).
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .expect("lock envenenado")
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn apply_op(
        collections: &mut HashMap<String, Vec<Document>>,
        op: &WriteOp,
    ) -> Result<(), AppError> {
        match op {
            WriteOp::Insert { collection, id, body } => {
                collections
                    .entry(collection.to_string())
                    .or_default()
                    .push(Document {
                        id: *id,
                        body: body.clone(),
                    });
                Ok(())
            }
            WriteOp::Update { collection, id, patch } => {
                let docs = collections
                    .get_mut(*collection)
                    .ok_or_else(|| AppError::DocumentNotFound(collection.to_string()))?;
                let doc = docs
                    .iter_mut()
                    .find(|d| d.id == *id)
                    .ok_or_else(|| AppError::DocumentNotFound(collection.to_string()))?;
                merge_patch(&mut doc.body, patch);
                Ok(())
            }
            WriteOp::Delete { collection, id } => {
                let docs = collections
                    .get_mut(*collection)
                    .ok_or_else(|| AppError::DocumentNotFound(collection.to_string()))?;
                let before = docs.len();
                docs.retain(|d| d.id != *id);
                if docs.len() == before {
                    return Err(AppError::DocumentNotFound(collection.to_string()));
                }
                Ok(())
            }
        }
    }

    /// Confere que um Update/Delete tem alvo antes de aplicar qualquer escrita
    /// do lote. É o que garante o tudo-ou-nada do `run_atomic`.
    fn check_op(
        collections: &HashMap<String, Vec<Document>>,
        op: &WriteOp,
    ) -> Result<(), AppError> {
        match op {
            WriteOp::Insert { .. } => Ok(()),
            WriteOp::Update { collection, id, .. } | WriteOp::Delete { collection, id } => {
                let exists = collections
                    .get(*collection)
                    .map(|docs| docs.iter().any(|d| d.id == *id))
                    .unwrap_or(false);
                if exists {
                    Ok(())
                } else {
                    Err(AppError::DocumentNotFound(collection.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, body: Value) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let mut collections = self.collections.write().expect("lock envenenado");
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document { id, body });
        Ok(id)
    }

    async fn get_all(
        &self,
        collection: &str,
        predicates: &[Predicate],
    ) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.read().expect("lock envenenado");
        let docs = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| predicates.iter().all(|p| p.matches(&d.body)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn get_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, AppError> {
        let collections = self.collections.read().expect("lock envenenado");
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: Uuid,
        patch: Value,
    ) -> Result<(), AppError> {
        let mut collections = self.collections.write().expect("lock envenenado");
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::DocumentNotFound(collection.to_string()))?;
        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::DocumentNotFound(collection.to_string()))?;
        merge_patch(&mut doc.body, &patch);
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, id: Uuid) -> Result<(), AppError> {
        let mut collections = self.collections.write().expect("lock envenenado");
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::DocumentNotFound(collection.to_string()))?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(AppError::DocumentNotFound(collection.to_string()));
        }
        Ok(())
    }

    async fn run_atomic(&self, ops: Vec<WriteOp>) -> Result<(), AppError> {
        let mut collections = self.collections.write().expect("lock envenenado");
        for op in &ops {
            Self::check_op(&collections, op)?;
        }
        for op in &ops {
            Self::apply_op(&mut collections, op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use audit_fail::AuditFailStore;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::collections::ITEMS;
    use serde_json::json;

    #[tokio::test]
    async fn insere_e_consulta_com_predicados() {
        let store = MemoryStore::new();
        store
            .insert(ITEMS, json!({ "name": "MARTELO", "quantity": 3 }))
            .await
            .unwrap();
        store
            .insert(ITEMS, json!({ "name": "SERROTE", "quantity": 1 }))
            .await
            .unwrap();

        let all = store.get_all(ITEMS, &[]).await.unwrap();
        assert_eq!(all.len(), 2);
        // Ordem de inserção preservada.
        assert_eq!(all[0].body["name"], "MARTELO");

        let only = store
            .get_all(ITEMS, &[Predicate::starts_with("name", "MART")])
            .await
            .unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].body["name"], "MARTELO");
    }

    #[tokio::test]
    async fn update_faz_merge_raso() {
        let store = MemoryStore::new();
        let id = store
            .insert(ITEMS, json!({ "name": "PREGO", "quantity": 10, "price": 1.5 }))
            .await
            .unwrap();

        store
            .update_by_id(ITEMS, id, json!({ "quantity": 7 }))
            .await
            .unwrap();

        let doc = store.get_by_id(ITEMS, id).await.unwrap().unwrap();
        assert_eq!(doc.body["quantity"], 7);
        assert_eq!(doc.body["name"], "PREGO");
    }

    #[tokio::test]
    async fn update_de_documento_inexistente_falha() {
        let store = MemoryStore::new();
        let err = store
            .update_by_id(ITEMS, Uuid::new_v4(), json!({ "quantity": 1 }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn lote_atomico_nao_aplica_nada_quando_uma_escrita_falha() {
        let store = MemoryStore::new();
        let id = store
            .insert(ITEMS, json!({ "name": "TRENA", "quantity": 5 }))
            .await
            .unwrap();

        let ops = vec![
            WriteOp::Update {
                collection: ITEMS,
                id,
                patch: json!({ "quantity": 4 }),
            },
            // Alvo inexistente: o lote inteiro deve ser rejeitado.
            WriteOp::Delete {
                collection: ITEMS,
                id: Uuid::new_v4(),
            },
        ];
        assert!(store.run_atomic(ops).await.is_err());

        let doc = store.get_by_id(ITEMS, id).await.unwrap().unwrap();
        assert_eq!(doc.body["quantity"], 5);
    }
}
