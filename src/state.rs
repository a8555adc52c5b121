// Handles partagés entre les workers actix (tous derrière un Arc via web::Data)

use actix_web::{error::JsonPayloadError, web, HttpRequest};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::{AuthConfig, Config};
use crate::errors::Error;
use crate::middleware::AuthRateLimits;
use crate::services::email::Mailer;
use crate::utils::jwt::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub db: web::Data<DatabaseConnection>,
    pub tokens: web::Data<TokenService>,
    pub mailer: web::Data<dyn Mailer>,
    pub auth: web::Data<AuthConfig>,
    pub rate_limits: web::Data<AuthRateLimits>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db: web::Data::new(db),
            tokens: web::Data::new(TokenService::new(&config.auth)),
            mailer: web::Data::from(mailer),
            auth: web::Data::new(config.auth.clone()),
            rate_limits: web::Data::new(AuthRateLimits::new(&config.rate_limits)),
        }
    }

    /// Enregistre l'état dans l'application (appelé pour chaque worker)
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.db.clone())
            .app_data(self.tokens.clone())
            .app_data(self.mailer.clone())
            .app_data(self.auth.clone())
            .app_data(self.rate_limits.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error));
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Rejected JSON body: {err}");
    Error::validation("Invalid JSON body").into()
}
