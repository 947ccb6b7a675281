//! Product service binary: reads config from env (and `.env`), picks the store, serves the API.

use product_service::{
    app, ensure_database_exists, AppState, InMemoryProductStore, PgProductStore, ServiceConfig, StoreKind,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("product_service=info,tower_http=info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let state = match config.store {
        StoreKind::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            let store = PgProductStore::new(pool);
            store.ensure_schema().await?;
            AppState::new(store)
        }
        StoreKind::Memory => {
            tracing::warn!("using in-memory product store; data is lost on exit");
            AppState::new(InMemoryProductStore::new())
        }
    };

    let router = app(state, config.body_limit_bytes);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
