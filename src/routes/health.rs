use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::models::health::HealthResponse;

#[get("/health")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    match db.ping().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "ok",
            database: "up",
            time: Utc::now(),
        }),
        Err(e) => {
            tracing::warn!("Health check: database unreachable: {e}");
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "degraded",
                database: "down",
                time: Utc::now(),
            })
        }
    }
}
