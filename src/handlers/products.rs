//! Product handlers: list, create, bulk create, read, update, delete, availability toggle, categories.

use crate::error::AppError;
use crate::extractors::{JsonPayload, QueryParams};
use crate::model::{Category, Product};
use crate::state::AppState;
use crate::store::ProductFilter;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

/// Maximum number of items accepted by `POST /products/collect`.
pub const BULK_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
    pub category: Option<String>,
    pub available: Option<String>,
}

impl ListParams {
    /// Empty query values are treated as absent.
    pub fn into_filter(self) -> Result<ProductFilter, AppError> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        Ok(ProductFilter {
            name: present(self.name),
            category: present(self.category).map(|c| c.parse::<Category>()).transpose()?,
            available: present(self.available).map(|a| parse_bool(&a)).transpose()?,
        })
    }
}

/// Accepts true/false, 1/0, yes/no, on/off (any case).
pub fn parse_bool(s: &str) -> Result<bool, AppError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::BadRequest(format!("invalid boolean value '{}' for available", s))),
    }
}

/// Non-integer ids can never match a stored product.
fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::product_not_found(id_str))
}

async fn find_or_404(state: &AppState, id_str: &str) -> Result<Product, AppError> {
    let id = parse_id(id_str)?;
    Product::find(state.store.as_ref(), id)
        .await?
        .ok_or_else(|| AppError::product_not_found(id))
}

/// Absolute URL of a product built from the request's Host header; relative path without one.
fn location_url(headers: &HeaderMap, id: i64) -> String {
    let path = format!("/products/{}", id);
    let Some(host) = headers.get(header::HOST).and_then(|h| h.to_str().ok()) else {
        return path;
    };
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}{}", scheme, host, path)
}

pub async fn list(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(params = ?params, "Request to list products");
    let filter = params.into_filter()?;
    let products = state.store.list(&filter).await?;
    tracing::info!(count = products.len(), "products returned");
    Ok(Json(products))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonPayload(body): JsonPayload,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Request to create a product");
    tracing::debug!(payload = %body, "create payload");
    let mut product = Product::from_json(&body)?;
    product.create(state.store.as_ref()).await?;
    let id = product.id.unwrap_or_default();
    tracing::info!(product_id = id, "product created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location_url(&headers, id))],
        Json(product),
    ))
}

pub async fn bulk_create(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Request to create multiple products");
    let items = match body {
        Value::Array(items) => items,
        _ => return Err(AppError::BadRequest("body must be a JSON array".into())),
    };
    if items.len() > BULK_LIMIT {
        return Err(AppError::BadRequest(format!(
            "bulk create limited to {} items",
            BULK_LIMIT
        )));
    }
    let products = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            Product::from_json(item).map_err(|e| match e {
                AppError::Validation(msg) => AppError::Validation(format!("item {}: {}", i, msg)),
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let created = Product::create_many(state.store.as_ref(), &products).await?;
    for p in &created {
        tracing::info!(product_id = ?p.id, "product created");
    }
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(product_id = %id_str, "Request to read a product");
    let product = find_or_404(&state, &id_str).await?;
    Ok(Json(product))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonPayload(body): JsonPayload,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(product_id = %id_str, "Request to update a product");
    tracing::debug!(payload = %body, "update payload");
    let mut product = find_or_404(&state, &id_str).await?;
    product.deserialize(&body)?;
    product.update(state.store.as_ref()).await?;
    Ok(Json(product))
}

/// Always 204: deleting an absent or malformed id is a no-op.
pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(product_id = %id_str, "Request to delete a product");
    if let Ok(id) = id_str.parse::<i64>() {
        if let Some(product) = Product::find(state.store.as_ref(), id).await? {
            product.delete(state.store.as_ref()).await?;
            tracing::info!(product_id = id, "product deleted");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_availability(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(product_id = %id_str, "Request to change product availability");
    let mut product = find_or_404(&state, &id_str).await?;
    product.available = !product.available;
    product.update(state.store.as_ref()).await?;

    let mut body = serde_json::Map::new();
    body.insert(
        "message".into(),
        Value::String(format!("Product availability changed to {}", product.available)),
    );
    if let Value::Object(fields) = product.serialize() {
        body.extend(fields);
    }
    tracing::info!(product_id = ?product.id, available = product.available, "availability changed");
    Ok(Json(Value::Object(body)))
}

pub async fn categories() -> Json<Vec<&'static str>> {
    Json(Category::names())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_boolean_spellings() {
        for t in ["true", "TRUE", "1", "yes", "On"] {
            assert!(parse_bool(t).unwrap(), "{t}");
        }
        for f in ["false", "False", "0", "no", "off"] {
            assert!(!parse_bool(f).unwrap(), "{f}");
        }
        assert!(matches!(parse_bool("maybe"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn list_params_build_filter() {
        let filter = ListParams {
            name: Some(String::new()),
            category: Some("FOOD".into()),
            available: Some("false".into()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.name, None);
        assert_eq!(filter.category, Some(Category::Food));
        assert_eq!(filter.available, Some(false));

        assert!(ListParams::default().into_filter().unwrap().is_empty());
        let bad = ListParams {
            category: Some("food".into()),
            ..ListParams::default()
        };
        assert!(bad.into_filter().is_err());
    }

    #[test]
    fn location_uses_host_and_forwarded_proto() {
        let mut headers = HeaderMap::new();
        assert_eq!(location_url(&headers, 4), "/products/4");
        headers.insert(header::HOST, HeaderValue::from_static("shop.local:8080"));
        assert_eq!(location_url(&headers, 4), "http://shop.local:8080/products/4");
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(location_url(&headers, 4), "https://shop.local:8080/products/4");
    }

    #[test]
    fn non_integer_ids_are_not_found() {
        assert!(matches!(parse_id("abc"), Err(AppError::NotFound(_))));
        assert_eq!(parse_id("12").unwrap(), 12);
    }
}
