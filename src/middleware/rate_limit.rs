//! Limitation du nombre de tentatives par client (fenêtre glissante).

use actix_web::HttpRequest;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::errors::Error;

// Au-delà, on purge les clients sans tentative récente
const PRUNE_THRESHOLD: usize = 10_000;

pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    message: &'static str,
    history: DashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration, message: &'static str) -> Self {
        Self {
            max_requests,
            window,
            message,
            history: DashMap::new(),
        }
    }

    /// Enregistre une tentative pour ce client ; erreur si la limite est atteinte
    pub fn check(&self, key: &str) -> Result<(), Error> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), Error> {
        if self.history.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut attempts = self.history.entry(key.to_string()).or_default();
        attempts.retain(|at| now.duration_since(*at) < self.window);

        if attempts.len() >= self.max_requests {
            return Err(Error::RateLimited {
                message: self.message.to_string(),
            });
        }

        attempts.push(now);
        Ok(())
    }

    fn prune(&self, now: Instant) {
        self.history.retain(|_, attempts| {
            attempts.retain(|at| now.duration_since(*at) < self.window);
            !attempts.is_empty()
        });
    }

    /// Clé client : adresse IP du pair TCP
    pub fn client_key(req: &HttpRequest) -> String {
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Limiteurs des routes d'authentification sensibles
pub struct AuthRateLimits {
    pub signin: RateLimiter,
    pub forgot_password: RateLimiter,
}

impl AuthRateLimits {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            signin: RateLimiter::new(
                config.signin_max_attempts,
                config.window,
                "Too many login attempts, please try again later",
            ),
            forgot_password: RateLimiter::new(
                config.forgot_password_max_attempts,
                config.window,
                "Too many forgot password requests, please try again later",
            ),
        }
    }
}
