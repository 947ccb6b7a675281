//! Common routes: index, health, readiness, version.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct HealthcheckBody {
    status: u16,
    message: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    store: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "OK" })
}

async fn healthcheck() -> Json<HealthcheckBody> {
    Json(HealthcheckBody {
        status: StatusCode::OK.as_u16(),
        message: "Healthy",
    })
}

async fn ready(State(state): State<AppState>) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    if let Err(e) = state.store.ping().await {
        tracing::warn!(error = %e, "store not ready");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                store: "unavailable",
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        store: "ok",
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn index() -> Json<Value> {
    Json(json!({
        "service_name": "Product Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "This service provides products for a catalog (id, name, description, price, etc.).",
        "endpoints": [
            {
                "path": "/products",
                "description": "Returns all the products in the database (can be filtered by name, category or available)",
                "methods": ["GET"]
            },
            {
                "path": "/products",
                "description": "Create a new product",
                "methods": ["POST"]
            },
            {
                "path": "/products/collect",
                "description": "Create multiple products",
                "methods": ["POST"]
            },
            {
                "path": "/products/{id}",
                "description": "Read, update or delete the product with the given id",
                "methods": ["GET", "PUT", "DELETE"]
            },
            {
                "path": "/products/{id}/change_availability",
                "description": "Toggle the availability of the product with the given id",
                "methods": ["PUT", "POST"]
            },
            {
                "path": "/categories",
                "description": "Returns the product category names",
                "methods": ["GET"]
            }
        ]
    }))
}

/// GET /, /health, /healthcheck, /ready, /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/healthcheck", get(healthcheck))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
