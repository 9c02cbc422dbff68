use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::AuthService;
use crate::logger::LoggerMiddleware;
use crate::routes::{
    health_check, issue_tokens, refresh_tokens, ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER,
};

/// Seconds a browser may cache a preflight response
pub const CORS_MAX_AGE_SECONDS: usize = 300;

/// Cross-origin policy for browser clients
///
/// Any `http://` or `https://` origin is allowed with credentials. The
/// matching origin is echoed back, never `*`.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allowed_origin_fn(|origin, _req_head| {
            origin
                .to_str()
                .map(|o| o.starts_with("https://") || o.starts_with("http://"))
                .unwrap_or(false)
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD"])
        .allowed_headers(vec![
            "Accept",
            "Authorization",
            "Content-Type",
            "X-CSRF-Token",
            "X-Requested-With",
            "X-Request-Id",
            "X-Session-Id",
            "Apikey",
            "X-Api-Key",
            ACCESS_TOKEN_HEADER,
            REFRESH_TOKEN_HEADER,
        ])
        .expose_headers(vec!["Link"])
        .supports_credentials()
        .max_age(CORS_MAX_AGE_SECONDS)
}

pub fn run(listener: TcpListener, service: AuthService) -> Result<Server, std::io::Error> {
    let service = web::Data::new(service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_policy())
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)
            .app_data(service.clone())
            .route("/health_check", web::get().to(health_check))
            .route("/auth", web::post().to(issue_tokens))
            .route("/auth/refresh", web::post().to(refresh_tokens))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
