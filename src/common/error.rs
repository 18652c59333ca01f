// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros de domínio e infraestrutura. A tradução para HTTP fica em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Avaliação não encontrada")]
    ReviewNotFound,

    #[error("Usuário já avaliou esta empresa")]
    ReviewAlreadyExists,

    #[error("Apenas o autor pode editar a avaliação")]
    NotReviewAuthor,

    #[error("Apenas o autor ou um admin pode excluir a avaliação")]
    DeleteForbidden,

    #[error("Autor não pode votar na própria avaliação")]
    CannotVoteOwnReview,

    #[error("Voto inválido: {0}")]
    InvalidVote(String),

    #[error("Papel insuficiente, requer: {0}")]
    InsufficientRole(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Status HTTP + chave do catálogo de mensagens
    pub fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "error.validation"),
            AppError::InvalidVote(_) => (StatusCode::BAD_REQUEST, "error.invalid_vote"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "error.email_taken"),
            AppError::UsernameAlreadyExists => (StatusCode::CONFLICT, "error.username_taken"),
            AppError::ReviewAlreadyExists => (StatusCode::CONFLICT, "error.review_exists"),
            AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, "error.conflict"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "error.invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "error.invalid_token"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "error.user_not_found"),
            AppError::CompanyNotFound => (StatusCode::NOT_FOUND, "error.company_not_found"),
            AppError::ReviewNotFound => (StatusCode::NOT_FOUND, "error.review_not_found"),
            AppError::NotReviewAuthor => (StatusCode::FORBIDDEN, "error.not_review_author"),
            AppError::DeleteForbidden => (StatusCode::FORBIDDEN, "error.delete_forbidden"),
            AppError::CannotVoteOwnReview => (StatusCode::FORBIDDEN, "error.self_vote"),
            AppError::InsufficientRole(_) => (StatusCode::FORBIDDEN, "error.insufficient_role"),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error.internal"),
        }
    }

    /// Converte o erro em resposta HTTP já traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe vai para o log, nunca para o cliente
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => Some(validation_details(errors, locale, store)),
            _ => None,
        };

        ApiError {
            status,
            error: store.translate(&locale.0, key),
            details,
        }
    }
}

// { "campoCamelCase": ["mensagem", ...] }
fn validation_details(
    errors: &validator::ValidationErrors,
    locale: &Locale,
    store: &I18nStore,
) -> Value {
    let mut details: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                let code = e.message.as_deref().unwrap_or(e.code.as_ref());
                store.translate(&locale.0, &format!("validation.{}", code))
            })
            .collect();
        details.insert(to_camel_case(&field), messages);
    }

    json!(details)
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ---
// ApiError: o que de fato vai para o cliente
// ---
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn domain_errors_map_to_expected_status() {
        let cases = [
            (AppError::ReviewNotFound, StatusCode::NOT_FOUND),
            (AppError::CompanyNotFound, StatusCode::NOT_FOUND),
            (AppError::ReviewAlreadyExists, StatusCode::CONFLICT),
            (AppError::CannotVoteOwnReview, StatusCode::FORBIDDEN),
            (AppError::NotReviewAuthor, StatusCode::FORBIDDEN),
            (AppError::DeleteForbidden, StatusCode::FORBIDDEN),
            (AppError::InvalidVote("meh".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AppError::InternalServerError(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_and_key().0, expected, "{:?}", err);
        }
    }

    #[test]
    fn api_error_message_is_localized() {
        let api = AppError::CannotVoteOwnReview.to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert_eq!(api.error, "Você não pode votar na sua própria avaliação.");
        assert!(api.details.is_none());
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco vazou"))
            .to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.error, "An unexpected error occurred.");
    }

    #[test]
    fn validation_details_use_camel_case_fields_and_catalog_messages() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("name_length".into());
        errors.add("first_name", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("en".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(
            details["firstName"][0],
            "Name must be between 1 and 50 characters."
        );
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(to_camel_case("is_recommended"), "isRecommended");
        assert_eq!(to_camel_case("rating"), "rating");
    }
}
