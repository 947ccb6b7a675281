//! In-memory product store for tests and local runs without PostgreSQL.

use super::{ProductFilter, ProductStore};
use crate::error::AppError;
use crate::model::Product;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    products: BTreeMap<i64, Product>,
}

impl Inner {
    fn insert(&mut self, product: &Product) -> Product {
        self.last_id += 1;
        let stored = Product {
            id: Some(self.last_id),
            ..product.clone()
        };
        self.products.insert(self.last_id, stored.clone());
        stored
    }
}

/// Ids start at 1 and are never reused, matching a serial column.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, product: &Product) -> Result<Product, AppError> {
        let stored = self.inner.write().await.insert(product);
        tracing::debug!(product_id = ?stored.id, "stored product in memory");
        Ok(stored)
    }

    async fn create_many(&self, products: &[Product]) -> Result<Vec<Product>, AppError> {
        let mut inner = self.inner.write().await;
        Ok(products.iter().map(|p| inner.insert(p)).collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn update(&self, product: &Product) -> Result<Product, AppError> {
        let id = product
            .id
            .ok_or_else(|| AppError::NotFound("product has no id".into()))?;
        let mut inner = self.inner.write().await;
        let slot = inner
            .products
            .get_mut(&id)
            .ok_or_else(|| AppError::product_not_found(id))?;
        *slot = product.clone();
        Ok(slot.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.write().await.products.remove(&id).is_some())
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
