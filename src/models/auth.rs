// src/models/auth.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::strip_id;
use crate::store::Document;

/// Rótulo gravado na auditoria quando não há sessão ativa.
pub const UNAUTHENTICATED_LABEL: &str = "Usuário não autenticado";

/// Identidade da sessão corrente, extraída do token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// Quem está executando a operação. É passado explicitamente para cada
/// serviço que precisa de identidade, em vez de um "usuário corrente" global.
#[derive(Debug, Clone)]
pub enum Actor {
    User(SessionUser),
    Anonymous,
}

impl Actor {
    pub fn from_session(session: Option<SessionUser>) -> Self {
        match session {
            Some(user) => Actor::User(user),
            None => Actor::Anonymous,
        }
    }

    /// O texto que vai para o campo `user` dos logs de auditoria.
    pub fn label(&self) -> String {
        match self {
            Actor::User(user) => user.email.clone(),
            Actor::Anonymous => UNAUTHENTICATED_LABEL.to_string(),
        }
    }
}

/// Claims do token HS256 de sessão.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

/// Documento da coleção `users`. Contas secundárias apontam para o
/// administrador dono via `adminId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(skip_deserializing, default)]
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_secondary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<Uuid>,
}

impl UserAccount {
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        let mut account: UserAccount = serde_json::from_value(doc.body.clone())?;
        account.id = doc.id;
        Ok(account)
    }

    pub fn to_body(&self) -> Result<Value, AppError> {
        Ok(strip_id(serde_json::to_value(self)?))
    }
}

/// Forma exposta pela API: nunca devolve o hash de senha.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub is_secondary: bool,
}

impl From<&UserAccount> for UserView {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            is_secondary: account.is_secondary,
        }
    }
}
