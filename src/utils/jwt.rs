use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::errors::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub iat: i64, // issued at
    pub exp: i64, // expiration timestamp
}

/// Clés et durée de vie d'un type de token
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKeys {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    fn issue(&self, user_id: i32, issued_at: DateTime<Utc>) -> Result<String, Error> {
        let expiration = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::internal("calculate token expiration"))?;

        let claims = Claims {
            user_id,
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::internal(format!("generate token: {e}")))
    }

    fn verify(&self, token: &str) -> Result<i32, Error> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims.user_id)
            .map_err(|e| {
                tracing::debug!("Token rejected: {e}");
                Error::InvalidToken
            })
    }
}

/// Émission et vérification des JWT d'accès (1h) et de refresh (7j).
///
/// Les deux types utilisent des secrets distincts : un token d'accès n'est
/// jamais accepté comme refresh token, et inversement.
pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: SigningKeys::new(&config.access_secret, config.access_token_ttl),
            refresh: SigningKeys::new(&config.refresh_secret, config.refresh_token_ttl),
        }
    }

    pub fn issue_access_token(&self, user_id: i32) -> Result<String, Error> {
        self.issue_access_token_at(user_id, Utc::now())
    }

    pub fn issue_access_token_at(&self, user_id: i32, issued_at: DateTime<Utc>) -> Result<String, Error> {
        self.access.issue(user_id, issued_at)
    }

    pub fn issue_refresh_token(&self, user_id: i32) -> Result<String, Error> {
        self.issue_refresh_token_at(user_id, Utc::now())
    }

    pub fn issue_refresh_token_at(&self, user_id: i32, issued_at: DateTime<Utc>) -> Result<String, Error> {
        self.refresh.issue(user_id, issued_at)
    }

    /// Vérifie un token d'accès et retourne l'id utilisateur
    pub fn verify_access_token(&self, token: &str) -> Result<i32, Error> {
        self.access.verify(token)
    }

    /// Vérifie un refresh token et retourne l'id utilisateur
    pub fn verify_refresh_token(&self, token: &str) -> Result<i32, Error> {
        self.refresh.verify(token)
    }
}
