// Data Transfer Objects : corps des requêtes et réponses de l'API
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{todos, users};

// ----------------------------------------------------------------------------
// Requêtes auth (champs absents = chaîne vide, validés par AuthService)
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// ----------------------------------------------------------------------------
// Requêtes todos
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTodoRequest {
    pub text: String,
}

/// Champs absents = inchangés
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

// ----------------------------------------------------------------------------
// Réponses
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user_id: i32,
}

/// Utilisateur renvoyé après connexion
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<&users::Model> for SessionUser {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Profil public (jamais de mot de passe ni de token de reset)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<users::Model> for ProfileUser {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: ProfileUser,
}

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub message: String,
    pub todo: todos::Model,
}

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub message: String,
    pub todos: Vec<todos::Model>,
}
