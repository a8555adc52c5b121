// ============================================================================
// SERVICE : AUTHENTIFICATION
// ============================================================================
//
// Workflow reset password (par utilisateur):
//   AucunReset -> ResetEnCours(token, expiry) -> AucunReset
//
//   1. POST /api/auth/forgot-password : token hex de 64 caractères, expire 1h,
//      écrase le précédent, envoyé par email
//   2. POST /api/auth/reset-password : token + nouveau mot de passe
//   3. Le token est remis à NULL dès qu'il est utilisé (usage unique)
//
// Points d'attention:
//   - signin : même erreur si user absent, inactif ou mauvais mot de passe
//   - forgot-password : même réponse que l'email existe ou non
//   - un échec d'envoi d'email ne supprime pas le token déjà enregistré
//
// ============================================================================

use chrono::Utc;
use sea_orm::DatabaseConnection;
use validator::ValidateEmail;

use crate::config::AuthConfig;
use crate::errors::Error;
use crate::models::dto::{ResetPasswordRequest, SignupRequest};
use crate::models::users;
use crate::services::email::{Mailer, password_reset_email};
use crate::services::user_service::{NewUser, UserPatch, UserService};
use crate::utils::jwt::TokenService;
use crate::utils::password::{self, MIN_PASSWORD_LENGTH};

pub const RESET_REQUESTED_MESSAGE: &str = "If the email exists, check your inbox for reset instructions";

pub struct AuthService;

/// Résultat d'une connexion réussie
#[derive(Debug)]
pub struct SignedIn {
    pub access_token: String,
    pub refresh_token: String,
    pub user: users::Model,
}

impl AuthService {
    /// Inscription : crée un utilisateur actif
    pub async fn signup(
        db: &DatabaseConnection,
        settings: &AuthConfig,
        request: &SignupRequest,
    ) -> Result<users::Model, Error> {
        let username = request.username.trim();
        let email = request.email.trim();

        // 1. Validation (ordre fixe des messages)
        if username.is_empty() || email.is_empty() || request.password.is_empty() || request.confirm_password.is_empty()
        {
            return Err(Error::validation("All fields are required"));
        }
        if request.password != request.confirm_password {
            return Err(Error::validation("Passwords do not match"));
        }
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        if !email.validate_email() {
            return Err(Error::validation("Invalid email address"));
        }

        // 2. Vérifier si l'email existe déjà
        if UserService::find_by_email(db, email).await?.is_some() {
            return Err(Error::DuplicateEmail);
        }

        // 3. Hash le mot de passe
        let password_hash =
            password::hash_password_blocking(request.password.clone(), settings.password_hash_rounds).await?;

        // 4. Créer l'utilisateur (la contrainte UNIQUE couvre les inscriptions concurrentes)
        UserService::create(
            db,
            NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            },
        )
        .await
    }

    /// Connexion : vérifie les identifiants et émet les deux tokens
    pub async fn signin(
        db: &DatabaseConnection,
        tokens: &TokenService,
        email: &str,
        password_input: &str,
    ) -> Result<SignedIn, Error> {
        let email = email.trim();
        if email.is_empty() || password_input.is_empty() {
            return Err(Error::validation("Email and password required"));
        }

        // 1. Trouver l'utilisateur (absent ou inactif : même erreur)
        let user = UserService::find_by_email(db, email)
            .await?
            .filter(|user| user.is_active)
            .ok_or(Error::InvalidCredentials)?;

        // 2. Vérifier le mot de passe
        let is_valid =
            password::verify_password_blocking(password_input.to_string(), user.password_hash.clone()).await?;
        if !is_valid {
            return Err(Error::InvalidCredentials);
        }

        // 3. Mettre à jour lastLogin
        let user = UserService::update(
            db,
            user.id,
            UserPatch {
                last_login: Some(Some(Utc::now())),
                ..Default::default()
            },
        )
        .await?;

        // 4. Générer les JWT
        let access_token = tokens.issue_access_token(user.id)?;
        let refresh_token = tokens.issue_refresh_token(user.id)?;

        tracing::info!(user_id = user.id, "User signed in");
        Ok(SignedIn {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Nouveau token d'accès à partir d'un refresh token (pas de rotation)
    pub fn refresh(tokens: &TokenService, refresh_token: &str) -> Result<String, Error> {
        if refresh_token.trim().is_empty() {
            return Err(Error::validation("Refresh token required"));
        }

        let user_id = tokens.verify_refresh_token(refresh_token.trim())?;
        tokens.issue_access_token(user_id)
    }

    /// Demande de reset. Ok(()) dans tous les cas où l'email est absent ou inactif.
    pub async fn request_password_reset(
        db: &DatabaseConnection,
        mailer: &dyn Mailer,
        settings: &AuthConfig,
        email: &str,
    ) -> Result<(), Error> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::validation("Email is required"));
        }

        // 1. Trouver l'utilisateur actif (ne pas révéler s'il existe)
        let Some(user) = UserService::find_active_by_email(db, email).await? else {
            tracing::debug!("Password reset requested for unknown or inactive email");
            return Ok(());
        };

        // 2. Générer et enregistrer le token (écrase le précédent)
        let reset_token = password::generate_reset_token();
        let expiry = Utc::now() + settings.reset_token_ttl;
        UserService::update(
            db,
            user.id,
            UserPatch {
                reset_token: Some(Some(reset_token.clone())),
                reset_token_expiry: Some(Some(expiry)),
                ..Default::default()
            },
        )
        .await?;

        // 3. Envoyer l'email (le token reste enregistré même si l'envoi échoue)
        let reset_url = format!(
            "{}/reset-password/{}",
            settings.reset_base_url.trim_end_matches('/'),
            reset_token
        );
        mailer
            .send(&password_reset_email(&user.username, &user.email, &reset_url))
            .await?;

        tracing::info!(user_id = user.id, "Password reset email sent");
        Ok(())
    }

    /// Reset du mot de passe avec un token valide, qui est ensuite invalidé
    pub async fn reset_password(
        db: &DatabaseConnection,
        settings: &AuthConfig,
        request: &ResetPasswordRequest,
    ) -> Result<(), Error> {
        let token = request.token.trim();

        // 1. Validation
        if token.is_empty() || request.password.is_empty() || request.confirm_password.is_empty() {
            return Err(Error::validation("All fields required"));
        }
        if request.password != request.confirm_password {
            return Err(Error::validation("Passwords don't match"));
        }
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::validation("Password too short"));
        }

        // 2. Vérifier le token : existe et pas expiré
        let user = UserService::find_by_reset_token(db, token)
            .await?
            .ok_or(Error::InvalidOrExpiredToken)?;

        if !user.has_live_reset_token(Utc::now()) {
            // Token expiré : on le supprime
            UserService::update(db, user.id, clear_reset_token()).await?;
            return Err(Error::InvalidOrExpiredToken);
        }

        // 3. Hasher le nouveau mot de passe
        let password_hash =
            password::hash_password_blocking(request.password.clone(), settings.password_hash_rounds).await?;

        // 4. Consommer le token et enregistrer le mot de passe en une seule requête.
        // Une requête concurrente avec le même token ne met à jour aucune ligne.
        if !UserService::redeem_reset_token(db, user.id, token, password_hash, Utc::now()).await? {
            return Err(Error::InvalidOrExpiredToken);
        }

        tracing::info!(user_id = user.id, "Password reset completed");
        Ok(())
    }

    /// Profil de l'utilisateur authentifié
    pub async fn profile(db: &DatabaseConnection, user_id: i32) -> Result<users::Model, Error> {
        UserService::find_by_id(db, user_id)
            .await?
            .ok_or(Error::NotFound { resource: "User" })
    }
}

fn clear_reset_token() -> UserPatch {
    UserPatch {
        reset_token: Some(None),
        reset_token_expiry: Some(None),
        ..Default::default()
    }
}
