// Fixtures partagées par les tests (config, BD SQLite en mémoire, mailer)

use async_trait::async_trait;
use chrono::Duration;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::{Arc, Mutex};

use crate::config::{
    AuthConfig, Config, DatabaseConfig, EmailConfig, EmailTransportConfig, RateLimitConfig, ServerConfig,
};
use crate::db;
use crate::errors::Error;
use crate::models::users;
use crate::services::email::{Mailer, OutgoingEmail};
use crate::services::user_service::{NewUser, UserService};
use crate::state::AppState;
use crate::utils::password;

// Hash rapide pour les tests (la prod utilise DEFAULT_PASSWORD_HASH_ROUNDS)
pub const TEST_HASH_ROUNDS: u32 = 1_000;

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            sync_schema: true,
        },
        auth: AuthConfig {
            access_secret: "test-access-secret-0123456789abcdef".to_string(),
            refresh_secret: "test-refresh-secret-0123456789abcdef".to_string(),
            access_token_ttl: Duration::hours(1),
            refresh_token_ttl: Duration::days(7),
            reset_token_ttl: Duration::hours(1),
            password_hash_rounds: TEST_HASH_ROUNDS,
            reset_base_url: "http://localhost:5173".to_string(),
        },
        email: EmailConfig {
            from_email: "noreply@localhost".to_string(),
            from_name: "Todo App".to_string(),
            transport: EmailTransportConfig::File {
                path: std::env::temp_dir().join("todo-backend-test-emails"),
            },
        },
        rate_limits: RateLimitConfig {
            window: std::time::Duration::from_secs(15 * 60),
            signin_max_attempts: 5,
            forgot_password_max_attempts: 3,
        },
    }
}

/// BD SQLite en mémoire : une seule connexion, sinon chaque connexion voit une base vide
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect to in-memory sqlite");
    db::sync_schema(&db).await.expect("create schema");
    db
}

/// Crée un utilisateur actif avec un mot de passe en clair connu
pub async fn create_user(db: &DatabaseConnection, username: &str, email: &str, plain_password: &str) -> users::Model {
    let password_hash = password::hash_password(plain_password, TEST_HASH_ROUNDS).expect("hash password");

    UserService::create(
        db,
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        },
    )
    .await
    .expect("create user")
}

/// Mailer qui garde les emails en mémoire (ou échoue sur demande)
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), Error> {
        if self.fail {
            return Err(Error::internal("send email: transport unavailable"));
        }
        self.sent.lock().expect("mailer lock").push(email.clone());
        Ok(())
    }
}

/// État applicatif complet pour les tests HTTP ; renvoie aussi le mailer pour inspection
pub async fn test_app_state() -> (AppState, Arc<RecordingMailer>) {
    let db = test_db().await;
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(db, &test_config(), mailer.clone());
    (state, mailer)
}
