// src/services/movement_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::inventory::{Item, Movement, MovementKind, MovementView};
use crate::services::refdata::ReferenceData;
use crate::store::{DocumentStore, Predicate, WriteOp, collections};

/// Filtros da tela de movimentações, todos opcionais.
#[derive(Debug, Clone, Default)]
pub struct MovementFilters {
    pub item_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<Uuid>,
}

#[derive(Clone)]
pub struct MovementService {
    store: Arc<dyn DocumentStore>,
}

impl MovementService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// O reconciliador de saldo: valida a quantidade, resolve o item pelo
    /// nome exato e grava a movimentação junto com o novo saldo num único
    /// lote atômico. Nenhuma escrita acontece quando a validação ou a
    /// resolução falham.
    pub async fn apply_movement(
        &self,
        item_name: &str,
        quantity: Decimal,
        kind: MovementKind,
    ) -> Result<Movement, AppError> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity);
        }

        let matches = self
            .store
            .get_all(collections::ITEMS, &[Predicate::eq("name", item_name)])
            .await?;
        let item = match matches.as_slice() {
            [] => return Err(AppError::ItemNotFound(item_name.to_string())),
            [only] => Item::from_document(only)?,
            // Nome duplicado: rejeitamos em vez de escolher um item ao acaso.
            _ => return Err(AppError::AmbiguousItemName(item_name.to_string())),
        };

        // Sem piso: saída maior que o saldo deixa a quantidade negativa,
        // como no comportamento herdado.
        let new_quantity = match kind {
            MovementKind::Entrada => item.quantity + quantity,
            MovementKind::Saida => item.quantity - quantity,
        };

        let movement = Movement {
            id: Uuid::new_v4(),
            item: item.name.clone(),
            item_id: item.id,
            quantity,
            kind,
            timestamp: Utc::now(),
        };

        // As duas escritas confirmam juntas ou nenhuma delas.
        self.store
            .run_atomic(vec![
                WriteOp::Insert {
                    collection: collections::MOVEMENTS,
                    id: movement.id,
                    body: movement.to_body()?,
                },
                WriteOp::Update {
                    collection: collections::ITEMS,
                    id: item.id,
                    patch: json!({ "quantity": new_quantity }),
                },
            ])
            .await?;

        Ok(movement)
    }

    /// Histórico filtrado, mais recente primeiro, com o nome da categoria de
    /// cada item resolvido pelo snapshot de referência.
    pub async fn list_movements(
        &self,
        refdata: &ReferenceData,
        filters: &MovementFilters,
    ) -> Result<Vec<MovementView>, AppError> {
        let mut predicates = Vec::new();

        if let Some(name) = non_empty(&filters.item_name) {
            predicates.push(Predicate::starts_with("item", name));
        }
        if let Some(start) = non_empty(&filters.start_date) {
            predicates.push(day_boundary("timestamp", start, Boundary::Start));
        }
        if let Some(end) = non_empty(&filters.end_date) {
            predicates.push(day_boundary("timestamp", end, Boundary::End));
        }
        if let Some(category_id) = filters.category {
            let names: Vec<String> = refdata
                .items_in_category(category_id)
                .iter()
                .map(|i| i.name.clone())
                .collect();
            // Categoria sem itens: nada pode casar, nem vale consultar.
            if names.is_empty() {
                return Ok(Vec::new());
            }
            predicates.push(Predicate::is_in("item", names));
        }

        let mut movements = self
            .store
            .get_all(collections::MOVEMENTS, &predicates)
            .await?
            .iter()
            .map(Movement::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        movements.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(movements
            .into_iter()
            .map(|movement| {
                let category = refdata
                    .item_by_id(movement.item_id)
                    .and_then(|item| refdata.category_name(item.category_id))
                    .unwrap_or("Categoria não encontrada")
                    .to_string();
                MovementView { movement, category }
            })
            .collect())
    }
}

enum Boundary {
    Start,
    End,
}

// Limites de dia para o intervalo de timestamps. O corpo guarda RFC 3339;
// um limite sem sufixo compara lexicograficamente abaixo de qualquer
// timestamp do mesmo instante, então [inícioT00:00:00, dia+1T00:00:00]
// cobre os dias inteiros do intervalo. Data malformada vira um limite
// impossível, nunca um erro.
fn day_boundary(field: &str, value: &str, boundary: Boundary) -> Predicate {
    use crate::common::format::parse_flexible_date;
    match (parse_flexible_date(value), boundary) {
        (Some(date), Boundary::Start) => Predicate::gte(field, format!("{}T00:00:00", date)),
        (Some(date), Boundary::End) => {
            let next = date.succ_opt().unwrap_or(date);
            Predicate::lte(field, format!("{}T00:00:00", next))
        }
        (None, Boundary::Start) => Predicate::gte(field, "\u{f8ff}".to_string()),
        (None, Boundary::End) => Predicate::lte(field, String::new()),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
