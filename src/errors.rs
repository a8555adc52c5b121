// ============================================================================
// ERREURS - TYPE UNIQUE POUR SERVICES, EXTRACTEURS ET ROUTES
// ============================================================================
//
// Chaque variante correspond à un code HTTP et à un message public.
// Les détails internes (DbErr, transport SMTP...) sont loggés mais jamais
// renvoyés au client : le corps est toujours {"message": "..."}.
//
// ============================================================================

use actix_web::{HttpResponse, ResponseError, error::BlockingError, http::StatusCode};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Champ manquant ou invalide
    #[error("{message}")]
    Validation { message: String },

    /// Texte de todo vide après trim
    #[error("todo text is empty")]
    EmptyText,

    /// Email déjà utilisé par un autre compte
    #[error("email already registered")]
    DuplicateEmail,

    /// Token de reset inconnu, déjà utilisé ou expiré
    #[error("invalid or expired reset token")]
    InvalidOrExpiredToken,

    /// Utilisateur absent, inactif ou mauvais mot de passe (volontairement indistinct)
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Header Authorization absent ou mal formé
    #[error("access token required")]
    MissingToken,

    /// JWT invalide (signature, format ou expiration)
    #[error("invalid token")]
    InvalidToken,

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("{message}")]
    RateLimited { message: String },

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error("failed to {operation}")]
    Internal { operation: String },
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub fn internal(operation: impl Into<String>) -> Self {
        Error::Internal {
            operation: operation.into(),
        }
    }

    /// Message renvoyé au client, sans détail d'implémentation
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { message } | Error::RateLimited { message } => message.clone(),
            Error::EmptyText => "Todo text is required".to_string(),
            Error::DuplicateEmail => "Email already registered".to_string(),
            Error::InvalidOrExpiredToken | Error::InvalidToken => "Invalid or expired token".to_string(),
            Error::InvalidCredentials => "Invalid credentials".to_string(),
            Error::MissingToken => "Access token required".to_string(),
            Error::NotFound { resource } => format!("{resource} not found"),
            Error::Database(_) | Error::Internal { .. } => "Internal server error".to_string(),
        }
    }
}

impl From<BlockingError> for Error {
    fn from(e: BlockingError) -> Self {
        Error::internal(format!("run blocking task: {e}"))
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. }
            | Error::EmptyText
            | Error::DuplicateEmail
            | Error::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::MissingToken => StatusCode::UNAUTHORIZED,
            Error::InvalidToken => StatusCode::FORBIDDEN,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::Database(_) | Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Niveau de log selon la gravité
        match self {
            Error::Database(_) | Error::Internal { .. } => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::InvalidCredentials | Error::MissingToken | Error::InvalidToken => {
                tracing::info!("Authentication error: {}", self);
            }
            Error::RateLimited { .. } => {
                tracing::warn!("Rate limit exceeded: {}", self);
            }
            _ => {
                tracing::debug!("Client error: {}", self);
            }
        }

        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: self.user_message(),
        })
    }
}
