use actix_web::{post, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::AuthConfig;
use crate::errors::Error;
use crate::middleware::{AuthRateLimits, AuthUser, RateLimiter};
use crate::models::dto::{
    ForgotPasswordRequest, MessageResponse, RefreshRequest, ResetPasswordRequest, SessionUser, SigninRequest,
    SigninResponse, SignupRequest, SignupResponse, RefreshResponse,
};
use crate::services::auth_service::{AuthService, RESET_REQUESTED_MESSAGE};
use crate::services::email::Mailer;
use crate::utils::jwt::TokenService;

/// POST /auth/signup - Créer un compte (PUBLIC)
#[post("/signup")]
pub async fn signup(
    body: web::Json<SignupRequest>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<AuthConfig>,
) -> Result<HttpResponse, Error> {
    let user = AuthService::signup(db.get_ref(), settings.get_ref(), &body).await?;

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User registered successfully".to_string(),
        user_id: user.id,
    }))
}

/// POST /auth/signin - Se connecter (PUBLIC, limité par IP)
#[post("/signin")]
pub async fn signin(
    req: HttpRequest,
    body: web::Json<SigninRequest>,
    db: web::Data<DatabaseConnection>,
    tokens: web::Data<TokenService>,
    limits: web::Data<AuthRateLimits>,
) -> Result<HttpResponse, Error> {
    limits.signin.check(&RateLimiter::client_key(&req))?;

    let signed_in = AuthService::signin(db.get_ref(), tokens.get_ref(), &body.email, &body.password).await?;

    Ok(HttpResponse::Ok().json(SigninResponse {
        message: "Signed in successfully".to_string(),
        user: SessionUser::from(&signed_in.user),
        access_token: signed_in.access_token,
        refresh_token: signed_in.refresh_token,
    }))
}

/// POST /auth/forgot-password - Demander un lien de reset (PUBLIC, limité par IP)
/// Même réponse que l'email existe ou non.
#[post("/forgot-password")]
pub async fn forgot_password(
    req: HttpRequest,
    body: web::Json<ForgotPasswordRequest>,
    db: web::Data<DatabaseConnection>,
    mailer: web::Data<dyn Mailer>,
    settings: web::Data<AuthConfig>,
    limits: web::Data<AuthRateLimits>,
) -> Result<HttpResponse, Error> {
    limits.forgot_password.check(&RateLimiter::client_key(&req))?;

    AuthService::request_password_reset(db.get_ref(), mailer.get_ref(), settings.get_ref(), &body.email).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(RESET_REQUESTED_MESSAGE)))
}

/// POST /auth/reset-password - Nouveau mot de passe avec un token de reset (PUBLIC)
#[post("/reset-password")]
pub async fn reset_password(
    body: web::Json<ResetPasswordRequest>,
    db: web::Data<DatabaseConnection>,
    settings: web::Data<AuthConfig>,
) -> Result<HttpResponse, Error> {
    AuthService::reset_password(db.get_ref(), settings.get_ref(), &body).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Password reset successfully")))
}

/// POST /auth/refresh - Nouveau token d'accès (PUBLIC)
#[post("/refresh")]
pub async fn refresh(
    body: web::Json<RefreshRequest>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, Error> {
    let access_token = AuthService::refresh(tokens.get_ref(), &body.refresh_token)?;

    Ok(HttpResponse::Ok().json(RefreshResponse { access_token }))
}

/// POST /auth/logout - Déconnexion (PROTÉGÉE)
/// Rien n'est invalidé côté serveur : le client supprime ses tokens.
#[post("/logout")]
pub async fn logout(auth_user: AuthUser) -> HttpResponse {
    tracing::info!(user_id = auth_user.user_id, "User logged out");
    HttpResponse::Ok().json(MessageResponse::new("Logged out successfully"))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(signup)
            .service(signin)
            .service(forgot_password)
            .service(reset_password)
            .service(refresh)
            .service(logout),
    );
}
