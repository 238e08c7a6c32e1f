// src/store/postgres.rs
//
// Backend Postgres do gateway: todas as coleções vivem numa única tabela
// `documents` com o corpo em JSONB. Os predicados viram comparações sobre
// `body ->> campo`, sempre textuais (ver predicate.rs).

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::store::{Document, DocumentStore, Operator, Predicate, WriteOp};
use crate::store::predicate::{PREFIX_SENTINEL, PredicateValue};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_predicates<'a>(qb: &mut QueryBuilder<'a, Postgres>, predicates: &'a [Predicate]) {
        for p in predicates {
            match (&p.op, &p.value) {
                (Operator::Eq, PredicateValue::One(v)) => {
                    qb.push(" AND (body ->> ")
                        .push_bind(&p.field)
                        .push(") = ")
                        .push_bind(v);
                }
                (Operator::Gte, PredicateValue::One(v)) => {
                    qb.push(" AND (body ->> ")
                        .push_bind(&p.field)
                        .push(") >= ")
                        .push_bind(v);
                }
                (Operator::Lte, PredicateValue::One(v)) => {
                    qb.push(" AND (body ->> ")
                        .push_bind(&p.field)
                        .push(") <= ")
                        .push_bind(v);
                }
                (Operator::In, PredicateValue::Many(vs)) => {
                    qb.push(" AND (body ->> ")
                        .push_bind(&p.field)
                        .push(") = ANY(")
                        .push_bind(vs)
                        .push(")");
                }
                // O truque do sentinela alto: intervalo [v, v + U+F8FF].
                (Operator::StartsWith, PredicateValue::One(v)) => {
                    let upper = format!("{}{}", v, PREFIX_SENTINEL);
                    qb.push(" AND (body ->> ")
                        .push_bind(&p.field)
                        .push(") >= ")
                        .push_bind(v)
                        .push(" AND (body ->> ")
                        .push_bind(&p.field)
                        .push(") <= ")
                        .push_bind(upper);
                }
                // Combinações inválidas (In com valor único etc.) não ocorrem:
                // os construtores de Predicate não as produzem.
                _ => {}
            }
        }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert(&self, collection: &str, body: Value) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(&body)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn get_all(
        &self,
        collection: &str,
        predicates: &[Predicate],
    ) -> Result<Vec<Document>, AppError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT id, body FROM documents WHERE collection = ");
        qb.push_bind(collection);
        Self::push_predicates(&mut qb, predicates);
        // Mesma ordem estável do backend em memória: ordem de inserção.
        qb.push(" ORDER BY inserted_at ASC, id ASC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| Document {
                id: row.get("id"),
                body: row.get("body"),
            })
            .collect())
    }

    async fn get_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, AppError> {
        let row = sqlx::query("SELECT id, body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| Document {
            id: row.get("id"),
            body: row.get("body"),
        }))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: Uuid,
        patch: Value,
    ) -> Result<(), AppError> {
        // `||` em JSONB é exatamente o merge raso do contrato do gateway.
        let result =
            sqlx::query("UPDATE documents SET body = body || $3 WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .bind(&patch)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::DocumentNotFound(collection.to_string()));
        }
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::DocumentNotFound(collection.to_string()));
        }
        Ok(())
    }

    async fn run_atomic(&self, ops: Vec<WriteOp>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for op in &ops {
            match op {
                WriteOp::Insert { collection, id, body } => {
                    sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
                        .bind(*collection)
                        .bind(*id)
                        .bind(body)
                        .execute(&mut *tx)
                        .await?;
                }
                WriteOp::Update { collection, id, patch } => {
                    let result = sqlx::query(
                        "UPDATE documents SET body = body || $3 WHERE collection = $1 AND id = $2",
                    )
                    .bind(*collection)
                    .bind(*id)
                    .bind(patch)
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        // O drop da transação sem commit desfaz o lote.
                        return Err(AppError::DocumentNotFound(collection.to_string()));
                    }
                }
                WriteOp::Delete { collection, id } => {
                    let result =
                        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                            .bind(*collection)
                            .bind(*id)
                            .execute(&mut *tx)
                            .await?;
                    if result.rows_affected() == 0 {
                        return Err(AppError::DocumentNotFound(collection.to_string()));
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
