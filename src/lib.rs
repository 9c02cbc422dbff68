pub mod auth;
pub mod clock;
pub mod configuration;
pub mod error;
pub mod logger;
pub mod origin;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
