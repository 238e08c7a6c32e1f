// src/services/audit.rs
//
// Trilha de auditoria das mutações. O contrato de ordem é do chamador:
// primeiro a mutação primária é confirmada, só então um destes registros é
// gravado. Mutação que falhou nunca gera log.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::audit::{DeleteLog, EditLog, ServiceLog};
use crate::models::auth::Actor;
use crate::store::{DocumentStore, collections};

#[derive(Clone)]
pub struct AuditTrail {
    store: Arc<dyn DocumentStore>,
}

impl AuditTrail {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Exclusão de item: grava o snapshot completo de antes da exclusão.
    pub async fn record_item_delete(&self, actor: &Actor, item_id: Uuid, snapshot: Value) {
        let log = DeleteLog {
            id: Uuid::nil(),
            item_id,
            item: snapshot,
            user: actor.label(),
            timestamp: Utc::now(),
        };
        self.write(collections::DELETE_LOGS, log.to_body()).await;
    }

    /// Edição de item: grava só o mapa de campos alterados.
    pub async fn record_item_edit(&self, actor: &Actor, item_id: Uuid, changes: Value) {
        let log = EditLog {
            id: Uuid::nil(),
            item_id,
            changes,
            user: actor.label(),
            timestamp: Utc::now(),
        };
        self.write(collections::EDIT_LOGS, log.to_body()).await;
    }

    /// Exclusão de serviço, com `action: "delete"` como no cliente original.
    pub async fn record_service_delete(&self, actor: &Actor, service_id: Uuid) {
        let log = ServiceLog {
            id: Uuid::nil(),
            action: "delete".to_string(),
            service_id,
            user: actor.label(),
            timestamp: Utc::now(),
        };
        self.write(collections::SERVICE_LOGS, log.to_body()).await;
    }

    // A mutação primária já foi confirmada quando chegamos aqui: uma falha na
    // gravação do log não derruba a operação, mas deixa um buraco na trilha.
    // Esse buraco é registrado de forma distinta no log da aplicação.
    async fn write(&self, collection: &'static str, body: Result<Value, AppError>) {
        let result = match body {
            Ok(body) => self.store.insert(collection, body).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(
                "Falha ao gravar log de auditoria em '{}': {} (a mutação primária já foi aplicada)",
                collection,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{SessionUser, UNAUTHENTICATED_LABEL};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn trail() -> (Arc<MemoryStore>, AuditTrail) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), AuditTrail::new(store))
    }

    #[tokio::test]
    async fn exclusao_gera_exatamente_um_log_com_snapshot() {
        let (store, trail) = trail();
        let actor = Actor::User(SessionUser {
            id: Uuid::new_v4(),
            email: "admin@exemplo.com".into(),
        });
        let snapshot = json!({ "name": "MARTELO", "quantity": 3 });
        let item_id = Uuid::new_v4();

        trail
            .record_item_delete(&actor, item_id, snapshot.clone())
            .await;

        let logs = store.get_all(collections::DELETE_LOGS, &[]).await.unwrap();
        assert_eq!(logs.len(), 1);
        let log = DeleteLog::from_document(&logs[0]).unwrap();
        assert_eq!(log.item, snapshot);
        assert_eq!(log.item_id, item_id);
        assert_eq!(log.user, "admin@exemplo.com");
    }

    #[tokio::test]
    async fn sem_sessao_o_ator_vira_a_sentinela() {
        let (store, trail) = trail();
        trail
            .record_service_delete(&Actor::Anonymous, Uuid::new_v4())
            .await;

        let logs = store.get_all(collections::SERVICE_LOGS, &[]).await.unwrap();
        assert_eq!(logs.len(), 1);
        let log = ServiceLog::from_document(&logs[0]).unwrap();
        assert_eq!(log.user, UNAUTHENTICATED_LABEL);
        assert_eq!(log.action, "delete");
    }
}
