// src/services/auth.rs
//
// A superfície de identidade que a aplicação consome: login com e-mail e
// senha contra a coleção `users` e validação do token de sessão. Cadastro
// de administrador e redefinição de senha ficam fora do escopo.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::common::error::AppError;
use crate::models::auth::{Claims, SessionUser, UserAccount};
use crate::store::{DocumentStore, Predicate, collections};

/// Senha inicial das contas secundárias, a mesma do cliente original.
pub const DEFAULT_SECONDARY_PASSWORD: &str = "senha-padrao123";

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn DocumentStore>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(store: Arc<dyn DocumentStore>, jwt_secret: String) -> Self {
        Self { store, jwt_secret }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let docs = self
            .store
            .get_all(collections::USERS, &[Predicate::eq("email", email)])
            .await?;
        let doc = docs.first().ok_or(AppError::InvalidCredentials)?;
        let account = UserAccount::from_document(doc)?;

        if !bcrypt::verify(password, &account.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let claims = Claims {
            sub: account.id,
            email: account.email,
            exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn validate_token(&self, token: &str) -> Result<SessionUser, AppError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(SessionUser {
            id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn service(store: Arc<MemoryStore>) -> AuthService {
        AuthService::new(store as Arc<dyn DocumentStore>, "segredo-de-teste".into())
    }

    #[tokio::test]
    async fn login_e_validacao_do_token() {
        let store = Arc::new(MemoryStore::new());
        let hash = bcrypt::hash("minha-senha", bcrypt::DEFAULT_COST).unwrap();
        store
            .insert(
                collections::USERS,
                json!({
                    "email": "admin@exemplo.com",
                    "passwordHash": hash,
                    "isSecondary": false,
                }),
            )
            .await
            .unwrap();

        let svc = service(store);
        let token = svc.login("admin@exemplo.com", "minha-senha").await.unwrap();
        let session = svc.validate_token(&token).unwrap();
        assert_eq!(session.email, "admin@exemplo.com");
    }

    #[tokio::test]
    async fn senha_errada_e_usuario_inexistente_dao_o_mesmo_erro() {
        let store = Arc::new(MemoryStore::new());
        let hash = bcrypt::hash("certa", bcrypt::DEFAULT_COST).unwrap();
        store
            .insert(
                collections::USERS,
                json!({
                    "email": "admin@exemplo.com",
                    "passwordHash": hash,
                    "isSecondary": false,
                }),
            )
            .await
            .unwrap();

        let svc = service(store);
        assert!(matches!(
            svc.login("admin@exemplo.com", "errada").await.unwrap_err(),
            AppError::InvalidCredentials
        ));
        assert!(matches!(
            svc.login("ninguem@exemplo.com", "x").await.unwrap_err(),
            AppError::InvalidCredentials
        ));
    }

    #[test]
    fn token_adulterado_e_rejeitado() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);
        assert!(matches!(
            svc.validate_token("nao-e-um-token").unwrap_err(),
            AppError::InvalidToken
        ));
    }
}
