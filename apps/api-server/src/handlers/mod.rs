//! HTTP handlers and route configuration.

mod auth;
mod health;
mod tasks;
mod user;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check));

    cfg.service(
        web::scope("/v1")
            .service(
                web::scope("/auth")
                    // Public
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/refresh", web::post().to(auth::refresh))
                    // Requires a valid access token
                    .route("/logout", web::post().to(auth::logout)),
            )
            .service(web::scope("/user").route("/profile", web::get().to(user::profile)))
            .service(
                web::scope("/tasks")
                    .route("", web::post().to(tasks::create))
                    .route("", web::get().to(tasks::list))
                    .route("/{id}", web::get().to(tasks::get))
                    .route("/{id}", web::put().to(tasks::update))
                    .route("/{id}", web::delete().to(tasks::delete))
                    .route("/{id}/archive", web::patch().to(tasks::archive)),
            ),
    );
}
