//! Product catalog REST service: product entity, stores, and axum routes.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{ServiceConfig, StoreKind};
pub use error::{AppError, ConfigError};
pub use model::{Category, Product};
pub use routes::{app, common_routes, product_routes};
pub use state::AppState;
pub use store::{ensure_database_exists, InMemoryProductStore, PgProductStore, ProductFilter, ProductStore};
