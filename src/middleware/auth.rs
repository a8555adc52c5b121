use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::errors::Error;
use crate::utils::jwt::TokenService;

/// Utilisateur authentifié par son token d'accès.
/// Utilisé comme extracteur dans les routes protégées.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i32,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(Into::into))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, Error> {
    // 1. Extraire le token (format: "Bearer <token>")
    let token = bearer_token(req).ok_or(Error::MissingToken)?;

    // 2. Vérifier le JWT avec le TokenService partagé
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| Error::internal("find token service in app data"))?;
    let user_id = tokens.verify_access_token(token)?;

    Ok(AuthUser { user_id })
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
