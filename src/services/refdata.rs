// src/services/refdata.rs
//
// Dados de referência de uma tela: todas as categorias e itens, carregados
// de uma vez na montagem e atualizados localmente por um redutor explícito.
// Cada tela recarrega por conta própria; não há invalidação entre telas.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::inventory::{Category, Item};
use crate::store::{DocumentStore, collections};

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
}

/// O resultado de uma chamada remota, aplicado ao snapshot local sem
/// refazer a consulta.
#[derive(Debug, Clone)]
pub enum LocalChange {
    ItemCreated(Item),
    ItemUpdated(Item),
    ItemDeleted(Uuid),
    QuantityChanged { item_id: Uuid, new_quantity: Decimal },
    CategoryCreated(Category),
    CategoryRenamed { id: Uuid, name: String },
    CategoryDeleted(Uuid),
}

impl ReferenceData {
    /// Busca completa, sem paginação, como as telas fazem ao montar.
    pub async fn load(store: &Arc<dyn DocumentStore>) -> Result<Self, AppError> {
        let categories = store
            .get_all(collections::CATEGORIES, &[])
            .await?
            .iter()
            .map(Category::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        let items = store
            .get_all(collections::ITEMS, &[])
            .await?
            .iter()
            .map(Item::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { categories, items })
    }

    pub fn category_name(&self, id: Uuid) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    pub fn items_in_category(&self, category_id: Uuid) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|i| i.category_id == category_id)
            .collect()
    }

    pub fn item_by_id(&self, id: Uuid) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// O redutor: (estado, resultado da chamada remota) -> novo estado.
    /// Puro sobre o snapshot; nenhuma dependência de rede.
    pub fn apply(&mut self, change: LocalChange) {
        match change {
            LocalChange::ItemCreated(item) => self.items.push(item),
            LocalChange::ItemUpdated(item) => {
                if let Some(slot) = self.items.iter_mut().find(|i| i.id == item.id) {
                    *slot = item;
                }
            }
            LocalChange::ItemDeleted(id) => self.items.retain(|i| i.id != id),
            LocalChange::QuantityChanged { item_id, new_quantity } => {
                if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
                    item.quantity = new_quantity;
                }
            }
            LocalChange::CategoryCreated(category) => self.categories.push(category),
            LocalChange::CategoryRenamed { id, name } => {
                if let Some(category) = self.categories.iter_mut().find(|c| c.id == id) {
                    category.name = name;
                }
            }
            LocalChange::CategoryDeleted(id) => self.categories.retain(|c| c.id != id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, category_id: Uuid) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: Decimal::from(1),
            price: Decimal::from(10),
            category: "FERRAMENTAS".into(),
            category_id,
        }
    }

    #[test]
    fn redutor_atualiza_saldo_sem_rede() {
        let cat = Uuid::new_v4();
        let mut state = ReferenceData::default();
        let i = item("MARTELO", cat);
        let id = i.id;
        state.apply(LocalChange::ItemCreated(i));

        state.apply(LocalChange::QuantityChanged {
            item_id: id,
            new_quantity: Decimal::from(9),
        });
        assert_eq!(state.item_by_id(id).unwrap().quantity, Decimal::from(9));

        state.apply(LocalChange::ItemDeleted(id));
        assert!(state.item_by_id(id).is_none());
    }

    #[test]
    fn categorias_renomeiam_e_somem_do_snapshot() {
        let mut state = ReferenceData::default();
        let category = Category {
            id: Uuid::new_v4(),
            name: "FERRAMENTAS".into(),
        };
        let id = category.id;
        state.apply(LocalChange::CategoryCreated(category));

        state.apply(LocalChange::CategoryRenamed {
            id,
            name: "FERRAGENS".into(),
        });
        assert_eq!(state.category_name(id), Some("FERRAGENS"));

        state.apply(LocalChange::CategoryDeleted(id));
        assert_eq!(state.category_name(id), None);
    }

    #[test]
    fn itens_por_categoria() {
        let cat_a = Uuid::new_v4();
        let cat_b = Uuid::new_v4();
        let mut state = ReferenceData::default();
        state.apply(LocalChange::ItemCreated(item("MARTELO", cat_a)));
        state.apply(LocalChange::ItemCreated(item("PREGO", cat_b)));
        state.apply(LocalChange::ItemCreated(item("SERROTE", cat_a)));

        let names: Vec<&str> = state
            .items_in_category(cat_a)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["MARTELO", "SERROTE"]);
    }
}
