// src/services/inventory_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::Actor;
use crate::models::inventory::{Category, Item};
use crate::services::audit::AuditTrail;
use crate::store::{DocumentStore, Predicate, collections};

/// Campos editáveis de um item; só o que vier preenchido é comparado e
/// aplicado.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub category_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn DocumentStore>,
    audit: AuditTrail,
}

impl InventoryService {
    pub fn new(store: Arc<dyn DocumentStore>, audit: AuditTrail) -> Self {
        Self { store, audit }
    }

    // ---
    // Itens
    // ---

    pub async fn create_item(
        &self,
        name: &str,
        quantity: Decimal,
        price: Decimal,
        category_id: Uuid,
    ) -> Result<Item, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::EmptyName);
        }
        let category = self.require_category(category_id).await?;

        let mut item = Item {
            id: Uuid::nil(),
            name: name.to_string(),
            quantity,
            price,
            category: category.name,
            category_id,
        };
        item.id = self
            .store
            .insert(collections::ITEMS, item.to_body()?)
            .await?;
        Ok(item)
    }

    /// A pesquisa da tela de estoque: substring sem caixa sobre nome OU
    /// categoria, avaliada sobre o snapshot carregado.
    pub async fn list_items(&self, search: &str) -> Result<Vec<Item>, AppError> {
        let items = self
            .store
            .get_all(collections::ITEMS, &[])
            .await?
            .iter()
            .map(Item::from_document)
            .collect::<Result<Vec<_>, _>>()?;

        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(items);
        }
        Ok(items
            .into_iter()
            .filter(|item| {
                item.name.to_lowercase().contains(&needle)
                    || item.category.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Edita um item e grava um EditLog com o mapa de campos alterados —
    /// depois da confirmação da escrita primária, nunca antes.
    pub async fn update_item(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: ItemPatch,
    ) -> Result<Item, AppError> {
        let doc = self
            .store
            .get_by_id(collections::ITEMS, id)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(id.to_string()))?;
        let current = Item::from_document(&doc)?;

        let mut changes = Map::new();
        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::EmptyName);
            }
            if name != current.name {
                changes.insert("name".into(), json!(name));
            }
        }
        if let Some(quantity) = patch.quantity {
            if quantity != current.quantity {
                changes.insert("quantity".into(), json!(quantity));
            }
        }
        if let Some(price) = patch.price {
            if price != current.price {
                changes.insert("price".into(), json!(price));
            }
        }
        if let Some(category_id) = patch.category_id {
            if category_id != current.category_id {
                let category = self.require_category(category_id).await?;
                changes.insert("category".into(), json!(category.name));
                changes.insert("categoryID".into(), json!(category_id));
            }
        }

        // Nada mudou: sem escrita e sem log.
        if changes.is_empty() {
            return Ok(current);
        }

        let changes = Value::Object(changes);
        self.store
            .update_by_id(collections::ITEMS, id, changes.clone())
            .await?;
        self.audit.record_item_edit(actor, id, changes).await;

        let updated = self
            .store
            .get_by_id(collections::ITEMS, id)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(id.to_string()))?;
        Item::from_document(&updated)
    }

    /// Exclui um item e grava exatamente um DeleteLog com o snapshot
    /// completo de antes da exclusão.
    pub async fn delete_item(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        let doc = self
            .store
            .get_by_id(collections::ITEMS, id)
            .await?
            .ok_or_else(|| AppError::ItemNotFound(id.to_string()))?;
        let snapshot = doc.body.clone();

        self.store.delete_by_id(collections::ITEMS, id).await?;
        self.audit.record_item_delete(actor, id, snapshot).await;
        Ok(())
    }

    // ---
    // Categorias
    // ---

    pub async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::EmptyName);
        }
        let mut category = Category {
            id: Uuid::nil(),
            name: name.to_string(),
        };
        category.id = self
            .store
            .insert(collections::CATEGORIES, category.to_body()?)
            .await?;
        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.store
            .get_all(collections::CATEGORIES, &[])
            .await?
            .iter()
            .map(Category::from_document)
            .collect()
    }

    pub async fn rename_category(&self, id: Uuid, name: &str) -> Result<Category, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::EmptyName);
        }
        self.require_category(id).await?;
        self.store
            .update_by_id(collections::CATEGORIES, id, json!({ "name": name }))
            .await?;
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    /// Exclusão bloqueada enquanto algum item referenciar a categoria:
    /// conflito, zero escritas.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        let category = self.require_category(id).await?;

        let referencing = self
            .store
            .get_all(
                collections::ITEMS,
                &[Predicate::eq("categoryID", id.to_string())],
            )
            .await?;
        if !referencing.is_empty() {
            return Err(AppError::CategoryInUse(category.name));
        }

        self.store.delete_by_id(collections::CATEGORIES, id).await
    }

    async fn require_category(&self, id: Uuid) -> Result<Category, AppError> {
        let doc = self
            .store
            .get_by_id(collections::CATEGORIES, id)
            .await?
            .ok_or(AppError::CategoryNotFound)?;
        Category::from_document(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit::{DeleteLog, EditLog};
    use crate::models::auth::SessionUser;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, InventoryService) {
        let store = Arc::new(MemoryStore::new());
        let dyn_store = store.clone() as Arc<dyn DocumentStore>;
        let service = InventoryService::new(dyn_store.clone(), AuditTrail::new(dyn_store));
        (store, service)
    }

    fn actor() -> Actor {
        Actor::User(SessionUser {
            id: Uuid::new_v4(),
            email: "admin@exemplo.com".into(),
        })
    }

    #[tokio::test]
    async fn criar_item_exige_categoria_existente() {
        let (_store, svc) = setup();
        let err = svc
            .create_item("MARTELO", Decimal::from(3), Decimal::from(25), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CategoryNotFound));
    }

    #[tokio::test]
    async fn excluir_item_gera_um_delete_log_com_o_snapshot() {
        let (store, svc) = setup();
        let category = svc.create_category("FERRAMENTAS").await.unwrap();
        let item = svc
            .create_item("MARTELO", Decimal::from(3), Decimal::from(25), category.id)
            .await
            .unwrap();

        let before = store
            .get_by_id(collections::ITEMS, item.id)
            .await
            .unwrap()
            .unwrap()
            .body;

        svc.delete_item(&actor(), item.id).await.unwrap();

        assert_eq!(store.count(collections::ITEMS), 0);
        let logs = store.get_all(collections::DELETE_LOGS, &[]).await.unwrap();
        assert_eq!(logs.len(), 1);
        let log = DeleteLog::from_document(&logs[0]).unwrap();
        assert_eq!(log.item, before);
        assert_eq!(log.item_id, item.id);
    }

    #[tokio::test]
    async fn excluir_item_inexistente_nao_gera_log() {
        let (store, svc) = setup();
        let err = svc.delete_item(&actor(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound(_)));
        assert_eq!(store.count(collections::DELETE_LOGS), 0);
    }

    #[tokio::test]
    async fn editar_item_loga_so_os_campos_alterados() {
        let (store, svc) = setup();
        let category = svc.create_category("FERRAMENTAS").await.unwrap();
        let item = svc
            .create_item("MARTELO", Decimal::from(3), Decimal::from(25), category.id)
            .await
            .unwrap();

        let patch = ItemPatch {
            price: Some(Decimal::from(30)),
            // Mesmo valor atual: não deve entrar no log.
            quantity: Some(Decimal::from(3)),
            ..Default::default()
        };
        let updated = svc.update_item(&actor(), item.id, patch).await.unwrap();
        assert_eq!(updated.price, Decimal::from(30));

        let logs = store.get_all(collections::EDIT_LOGS, &[]).await.unwrap();
        assert_eq!(logs.len(), 1);
        let log = EditLog::from_document(&logs[0]).unwrap();
        let changes = log.changes.as_object().unwrap();
        assert_eq!(changes.len(), 1);
        assert!(changes.contains_key("price"));
    }

    #[tokio::test]
    async fn edicao_sem_mudanca_nao_escreve_nem_loga() {
        let (store, svc) = setup();
        let category = svc.create_category("FERRAMENTAS").await.unwrap();
        let item = svc
            .create_item("MARTELO", Decimal::from(3), Decimal::from(25), category.id)
            .await
            .unwrap();

        svc.update_item(&actor(), item.id, ItemPatch::default())
            .await
            .unwrap();
        assert_eq!(store.count(collections::EDIT_LOGS), 0);
    }

    #[tokio::test]
    async fn trocar_categoria_atualiza_nome_e_referencia() {
        let (_store, svc) = setup();
        let old = svc.create_category("FERRAMENTAS").await.unwrap();
        let new = svc.create_category("FIXAÇÃO").await.unwrap();
        let item = svc
            .create_item("PREGO", Decimal::from(100), Decimal::ONE, old.id)
            .await
            .unwrap();

        let patch = ItemPatch {
            category_id: Some(new.id),
            ..Default::default()
        };
        let updated = svc.update_item(&actor(), item.id, patch).await.unwrap();
        assert_eq!(updated.category, "FIXAÇÃO");
        assert_eq!(updated.category_id, new.id);
    }

    #[tokio::test]
    async fn categoria_referenciada_nao_pode_ser_excluida() {
        let (store, svc) = setup();
        let category = svc.create_category("FERRAMENTAS").await.unwrap();
        svc.create_item("MARTELO", Decimal::from(3), Decimal::from(25), category.id)
            .await
            .unwrap();

        let err = svc.delete_category(category.id).await.unwrap_err();
        assert!(matches!(err, AppError::CategoryInUse(_)));
        assert_eq!(store.count(collections::CATEGORIES), 1);
    }

    #[tokio::test]
    async fn categoria_sem_itens_pode_ser_excluida() {
        let (store, svc) = setup();
        let category = svc.create_category("VAZIA").await.unwrap();
        svc.delete_category(category.id).await.unwrap();
        assert_eq!(store.count(collections::CATEGORIES), 0);
    }

    #[tokio::test]
    async fn pesquisa_cobre_nome_e_categoria() {
        let (_store, svc) = setup();
        let tools = svc.create_category("FERRAMENTAS").await.unwrap();
        let fix = svc.create_category("FIXAÇÃO").await.unwrap();
        svc.create_item("MARTELO", Decimal::ONE, Decimal::ONE, tools.id)
            .await
            .unwrap();
        svc.create_item("PREGO", Decimal::ONE, Decimal::ONE, fix.id)
            .await
            .unwrap();

        let by_name = svc.list_items("mart").await.unwrap();
        assert_eq!(by_name.len(), 1);

        let by_category = svc.list_items("fixa").await.unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].name, "PREGO");

        assert_eq!(svc.list_items("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn falha_no_log_nao_derruba_a_mutacao_primaria() {
        use crate::store::memory::AuditFailStore;

        let inner = Arc::new(MemoryStore::new());
        let store: Arc<dyn DocumentStore> = Arc::new(AuditFailStore::new(inner.clone()));
        let svc = InventoryService::new(store.clone(), AuditTrail::new(store));

        let category = svc.create_category("FERRAMENTAS").await.unwrap();
        let item = svc
            .create_item("MARTELO", Decimal::from(3), Decimal::from(25), category.id)
            .await
            .unwrap();

        // A edição confirma mesmo com a gravação do EditLog falhando.
        let patch = ItemPatch {
            price: Some(Decimal::from(30)),
            ..Default::default()
        };
        let updated = svc.update_item(&actor(), item.id, patch).await.unwrap();
        assert_eq!(updated.price, Decimal::from(30));
        assert_eq!(inner.count(collections::EDIT_LOGS), 0);

        // Idem para a exclusão: o item some, o DeleteLog fica de fora.
        svc.delete_item(&actor(), item.id).await.unwrap();
        assert_eq!(inner.count(collections::ITEMS), 0);
        assert_eq!(inner.count(collections::DELETE_LOGS), 0);
    }

    #[tokio::test]
    async fn nome_vazio_e_rejeitado() {
        let (_store, svc) = setup();
        assert!(matches!(
            svc.create_category("   ").await.unwrap_err(),
            AppError::EmptyName
        ));
    }
}
