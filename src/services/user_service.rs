// src/services/user_service.rs
//
// Contas secundárias: criadas por um administrador e visíveis só para ele.
// Toda consulta é escopada pelo adminId da sessão.

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::{SessionUser, UserAccount, UserView};
use crate::services::auth::DEFAULT_SECONDARY_PASSWORD;
use crate::store::{DocumentStore, Predicate, collections};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list_secondary(&self, admin: &SessionUser) -> Result<Vec<UserView>, AppError> {
        let docs = self
            .store
            .get_all(
                collections::USERS,
                &[
                    Predicate::eq("isSecondary", "true"),
                    Predicate::eq("adminId", admin.id.to_string()),
                ],
            )
            .await?;
        docs.iter()
            .map(|doc| UserAccount::from_document(doc).map(|a| UserView::from(&a)))
            .collect()
    }

    /// Cria a conta secundária com a senha padrão. E-mail repetido é
    /// rejeitado antes de qualquer escrita.
    pub async fn create_secondary(
        &self,
        admin: &SessionUser,
        email: &str,
    ) -> Result<UserView, AppError> {
        let email = email.trim();
        let existing = self
            .store
            .get_all(collections::USERS, &[Predicate::eq("email", email)])
            .await?;
        if !existing.is_empty() {
            return Err(AppError::EmailAlreadyExists);
        }

        let mut account = UserAccount {
            id: Uuid::nil(),
            email: email.to_string(),
            password_hash: bcrypt::hash(DEFAULT_SECONDARY_PASSWORD, bcrypt::DEFAULT_COST)?,
            is_secondary: true,
            admin_id: Some(admin.id),
        };
        account.id = self
            .store
            .insert(collections::USERS, account.to_body()?)
            .await?;
        Ok(UserView::from(&account))
    }

    /// Só o administrador dono pode excluir a conta; qualquer outra
    /// combinação responde como não-encontrado.
    pub async fn delete_secondary(&self, admin: &SessionUser, id: Uuid) -> Result<(), AppError> {
        let doc = self
            .store
            .get_by_id(collections::USERS, id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        let account = UserAccount::from_document(&doc)?;

        if !account.is_secondary || account.admin_id != Some(admin.id) {
            return Err(AppError::UserNotFound);
        }

        self.store.delete_by_id(collections::USERS, id).await
    }
}
