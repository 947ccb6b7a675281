//! Product entity: JSON validation, serialization, and persistence through a [`ProductStore`].

use crate::error::AppError;
use crate::model::Category;
use crate::store::{ProductFilter, ProductStore};
use serde::Serialize;
use serde_json::{Map, Value};

/// Keys that must be present in every create or update payload.
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "description", "price", "available", "image_url"];

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Assigned by the store on create; `None` until persisted.
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub available: bool,
    pub image_url: String,
    pub category: Category,
}

impl Default for Product {
    fn default() -> Self {
        Product {
            id: None,
            name: String::new(),
            description: String::new(),
            price: 0.0,
            available: true,
            image_url: String::new(),
            category: Category::Unknown,
        }
    }
}

/// Wire form of a product. `id` is rendered as a string.
#[derive(Serialize)]
struct ProductView<'a> {
    id: String,
    name: &'a str,
    description: &'a str,
    price: f64,
    available: bool,
    image_url: &'a str,
    category: &'static str,
}

impl Serialize for Product {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ProductView {
            id: self.id.map(|id| id.to_string()).unwrap_or_default(),
            name: &self.name,
            description: &self.description,
            price: self.price,
            available: self.available,
            image_url: &self.image_url,
            category: self.category.name(),
        }
        .serialize(serializer)
    }
}

impl Product {
    /// Build an unsaved product from a JSON payload.
    pub fn from_json(data: &Value) -> Result<Self, AppError> {
        let mut product = Product::default();
        product.deserialize(data)?;
        Ok(product)
    }

    /// Populate fields from a JSON object. All fields are checked before any is assigned; `id` is never touched.
    pub fn deserialize(&mut self, data: &Value) -> Result<(), AppError> {
        let obj = data.as_object().ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid product: body of request contained bad or no data ({})",
                json_type_name(data)
            ))
        })?;
        let name = required_str(obj, "name")?;
        let description = required_str(obj, "description")?;
        let price = required(obj, "price")?;
        let price = price.as_f64().ok_or_else(|| invalid_type("number", "price", price))?;
        let available = required(obj, "available")?;
        let available = available
            .as_bool()
            .ok_or_else(|| invalid_type("boolean", "available", available))?;
        let image_url = required_str(obj, "image_url")?;

        self.name = name;
        self.description = description;
        self.price = price;
        self.available = available;
        self.image_url = image_url;
        self.category = Category::decode(obj.get("category"));
        Ok(())
    }

    pub fn serialize(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Persist as a new record; the store assigns `id`.
    pub async fn create(&mut self, store: &dyn ProductStore) -> Result<(), AppError> {
        tracing::info!(name = %self.name, "creating product");
        let saved = store.create(self).await?;
        self.id = saved.id;
        Ok(())
    }

    /// Persist changes to an existing record.
    pub async fn update(&self, store: &dyn ProductStore) -> Result<(), AppError> {
        let id = self
            .id
            .ok_or_else(|| AppError::NotFound("product has no id; create it first".into()))?;
        tracing::info!(product_id = id, "saving product");
        store.update(self).await?;
        Ok(())
    }

    /// Remove from the store. Deleting an unsaved or already deleted product is a no-op.
    pub async fn delete(&self, store: &dyn ProductStore) -> Result<(), AppError> {
        if let Some(id) = self.id {
            tracing::info!(product_id = id, "deleting product");
            store.delete(id).await?;
        }
        Ok(())
    }

    /// Create all items in one store transaction.
    pub async fn create_many(store: &dyn ProductStore, items: &[Product]) -> Result<Vec<Product>, AppError> {
        tracing::info!(count = items.len(), "creating products");
        store.create_many(items).await
    }

    pub async fn find(store: &dyn ProductStore, id: i64) -> Result<Option<Product>, AppError> {
        tracing::debug!(product_id = id, "find product");
        store.find(id).await
    }

    pub async fn all(store: &dyn ProductStore) -> Result<Vec<Product>, AppError> {
        store.list(&ProductFilter::default()).await
    }

    /// Exact, case-sensitive name match.
    pub async fn find_by_name(store: &dyn ProductStore, name: &str) -> Result<Vec<Product>, AppError> {
        store
            .list(&ProductFilter {
                name: Some(name.to_string()),
                ..ProductFilter::default()
            })
            .await
    }

    pub async fn find_by_category(store: &dyn ProductStore, category: Category) -> Result<Vec<Product>, AppError> {
        store
            .list(&ProductFilter {
                category: Some(category),
                ..ProductFilter::default()
            })
            .await
    }

    pub async fn find_by_availability(store: &dyn ProductStore, available: bool) -> Result<Vec<Product>, AppError> {
        store
            .list(&ProductFilter {
                available: Some(available),
                ..ProductFilter::default()
            })
            .await
    }
}

fn required<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value, AppError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(AppError::Validation(format!("Invalid product: missing {}", key))),
        Some(v) => Ok(v),
    }
}

fn required_str(obj: &Map<String, Value>, key: &str) -> Result<String, AppError> {
    let v = required(obj, key)?;
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid_type("string", key, v))
}

fn invalid_type(expected: &str, key: &str, got: &Value) -> AppError {
    AppError::Validation(format!(
        "Invalid type for {} [{}]: {}",
        expected,
        key,
        json_type_name(got)
    ))
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
