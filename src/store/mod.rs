//! Persistence for products: the [`ProductStore`] trait with PostgreSQL and in-memory backends.

mod memory;
mod postgres;
pub use memory::InMemoryProductStore;
pub use postgres::{ensure_database_exists, PgProductStore};

use crate::error::AppError;
use crate::model::{Category, Product};
use async_trait::async_trait;

/// Attribute filters for listing products. Set fields combine with AND; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Exact, case-sensitive match.
    pub name: Option<String>,
    pub category: Option<Category>,
    pub available: Option<bool>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.available.is_none()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(name) = &self.name {
            if &product.name != name {
                return false;
            }
        }
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }
        if let Some(available) = self.available {
            if product.available != available {
                return false;
            }
        }
        true
    }
}

/// Create/read/update/delete by integer id. Results of `list` are ordered by id.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a product, ignoring any `id` it carries. Returns the stored record with its new id.
    async fn create(&self, product: &Product) -> Result<Product, AppError>;

    /// Insert all products atomically: either every item is stored or none is.
    async fn create_many(&self, products: &[Product]) -> Result<Vec<Product>, AppError>;

    async fn find(&self, id: i64) -> Result<Option<Product>, AppError>;

    /// Overwrite the record with `product.id`. `NotFound` when the id is missing or unknown.
    async fn update(&self, product: &Product) -> Result<Product, AppError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError>;

    /// Cheap liveness check used by `/ready`.
    async fn ping(&self) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, category: Category, available: bool) -> Product {
        Product {
            name: name.into(),
            category,
            available,
            ..Product::default()
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = ProductFilter::default();
        assert!(f.is_empty());
        assert!(f.matches(&product("Kettle", Category::Housewares, false)));
    }

    #[test]
    fn filters_combine_with_and() {
        let f = ProductFilter {
            name: None,
            category: Some(Category::Food),
            available: Some(true),
        };
        assert!(f.matches(&product("Apple", Category::Food, true)));
        assert!(!f.matches(&product("Apple", Category::Food, false)));
        assert!(!f.matches(&product("Wrench", Category::Tools, true)));
    }

    #[test]
    fn name_filter_is_exact() {
        let f = ProductFilter {
            name: Some("Tire".into()),
            ..ProductFilter::default()
        };
        assert!(f.matches(&product("Tire", Category::Automotive, true)));
        assert!(!f.matches(&product("Tires", Category::Automotive, true)));
        assert!(!f.matches(&product("tire", Category::Automotive, true)));
    }
}
