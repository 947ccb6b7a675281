//! Product catalog routes.

use crate::handlers::products::{
    bulk_create, categories, change_availability, create, delete as delete_handler, list, read, update,
};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn product_routes(state: AppState) -> Router {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/", get(list).post(create))
        .route("/products/collect", post(bulk_create))
        .route(
            "/products/:id",
            get(read).put(update).delete(delete_handler),
        )
        .route(
            "/products/:id/change_availability",
            post(change_availability).put(change_availability),
        )
        .route("/categories", get(categories))
        .with_state(state)
}
