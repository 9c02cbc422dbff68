use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use session_auth::auth::{AuthService, TokenCodec};
use session_auth::clock::{Clock, SystemClock};
use session_auth::configuration::get_configuration;
use session_auth::startup::run;
use session_auth::store::PgSessionStore;
use session_auth::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let codec = TokenCodec::from_settings(&configuration.jwt, clock.clone()).map_err(|e| {
        tracing::error!("Invalid signing configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    tracing::info!("Attempting to connect to database");

    // `connect` rather than `connect_lazy`: an unreachable store is fatal at startup
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(configuration.database.acquire_timeout())
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    tracing::info!("Database connection pool created successfully");

    let store = Arc::new(PgSessionStore::new(pool));
    let service = AuthService::new(codec, store, clock);

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, service)?.await
}
