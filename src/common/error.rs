use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Taxonomia: validação, não-encontrado, conflito, auth e falha remota.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Quantidade inválida")]
    InvalidQuantity,

    #[error("O nome não pode estar vazio")]
    EmptyName,

    #[error("Data inválida")]
    InvalidDate,

    #[error("Item não encontrado: {0}")]
    ItemNotFound(String),

    #[error("Categoria não encontrada")]
    CategoryNotFound,

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Serviço não encontrado")]
    ServiceNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Documento não encontrado na coleção '{0}'")]
    DocumentNotFound(String),

    // Mais de um item com o mesmo nome: a movimentação é rejeitada em vez de
    // escolher um deles arbitrariamente.
    #[error("Mais de um item com o nome '{0}'")]
    AmbiguousItemName(String),

    #[error("A categoria '{0}' está associada a um ou mais itens")]
    CategoryInUse(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Variante para erros de banco de dados (o gateway Postgres)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Documento armazenado que não bate com o modelo esperado
    #[error("Documento malformado")]
    MalformedDocument(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidQuantity => {
                (StatusCode::BAD_REQUEST, "Quantidade inválida.".to_string())
            }
            AppError::EmptyName => (
                StatusCode::BAD_REQUEST,
                "O nome não pode estar vazio.".to_string(),
            ),
            AppError::InvalidDate => (StatusCode::BAD_REQUEST, "Data inválida.".to_string()),
            AppError::ItemNotFound(name) => (
                StatusCode::NOT_FOUND,
                format!("Item '{}' não encontrado.", name),
            ),
            AppError::CategoryNotFound => (
                StatusCode::NOT_FOUND,
                "Categoria não encontrada.".to_string(),
            ),
            AppError::ClientNotFound => {
                (StatusCode::NOT_FOUND, "Cliente não encontrado.".to_string())
            }
            AppError::ServiceNotFound => {
                (StatusCode::NOT_FOUND, "Serviço não encontrado.".to_string())
            }
            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::DocumentNotFound(collection) => (
                StatusCode::NOT_FOUND,
                format!("Documento não encontrado na coleção '{}'.", collection),
            ),
            AppError::AmbiguousItemName(name) => (
                StatusCode::CONFLICT,
                format!("Mais de um item cadastrado com o nome '{}'.", name),
            ),
            AppError::CategoryInUse(_) => (
                StatusCode::CONFLICT,
                "Não é possível excluir esta categoria porque ela está associada a um ou mais itens."
                    .to_string(),
            ),
            AppError::EmailAlreadyExists => (
                StatusCode::CONFLICT,
                "Este e-mail já está em uso.".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "E-mail ou senha inválidos.".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
