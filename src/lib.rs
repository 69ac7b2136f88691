//! Business simulation and education backend: REST resources over PostgreSQL
//! with a typed filter/sort/paginate query layer and bearer-token accounts.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod schemas;
pub mod service;
pub mod sql;
pub mod state;

pub use config::Settings;
pub use db::{connect, ensure_database_exists};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use response::{success_created, success_many, success_one};
pub use routes::app;
pub use service::{EntityManager, PgExecutor, QueryExecutor};
pub use state::AppState;
