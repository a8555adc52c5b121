mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod telemetry;
mod utils;

#[cfg(test)]
mod test_utils;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, middleware::{DefaultHeaders, Logger}};
use anyhow::Context;
use std::sync::Arc;

use crate::config::Config;
use crate::services::email::LettreMailer;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    tracing::info!("Connecting to database...");
    let db = db::establish_connection(&config.database)
        .await
        .context("Failed to connect to database")?;
    if config.database.sync_schema {
        db::sync_schema(&db).await.context("Failed to create database schema")?;
    }
    tracing::info!("Database connected");

    let mailer = LettreMailer::new(&config.email).context("Failed to configure email transport")?;
    mailer.verify().await;

    let state = AppState::new(db, &config, Arc::new(mailer));
    let allowed_origins = config.server.cors_allowed_origins.clone();

    tracing::info!("Starting server on http://{}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        let security_headers = DefaultHeaders::new()
            .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
            .add((header::X_FRAME_OPTIONS, "DENY"))
            .add((header::REFERRER_POLICY, "no-referrer"));

        App::new()
            .wrap(Logger::default())
            .wrap(security_headers)
            .wrap(cors)
            .configure(|cfg| state.configure(cfg))
            .configure(routes::configure_routes)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
