use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use api_server::config::AppConfig;
use api_server::state::AppState;
use api_server::{handlers, middleware, telemetry};
use taskwell_core::ports::{PasswordService, TokenService};
use taskwell_infra::{Argon2PasswordService, JwtTokenService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&telemetry::TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Taskwell API server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new();
    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()))
            .app_data(
                web::JsonConfig::default().error_handler(middleware::error::json_error_handler),
            )
            .app_data(
                web::QueryConfig::default().error_handler(middleware::error::query_error_handler),
            )
            .app_data(
                web::PathConfig::default().error_handler(middleware::error::path_error_handler),
            )
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
