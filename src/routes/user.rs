use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::errors::Error;
use crate::middleware::AuthUser;
use crate::models::dto::{ProfileResponse, ProfileUser};
use crate::services::auth_service::AuthService;

/// GET /user/profile - Profil de l'utilisateur connecté (PROTÉGÉE)
#[get("/profile")]
pub async fn profile(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let user = AuthService::profile(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        message: "Profile fetched successfully".to_string(),
        user: ProfileUser::from(user),
    }))
}

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/user").service(profile));
}
