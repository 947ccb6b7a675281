//! PostgreSQL product store. Table and enum type are created on startup if missing.

use super::{ProductFilter, ProductStore};
use crate::error::AppError;
use crate::model::{Category, Product};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgRow};
use sqlx::{ConnectOptions, PgPool, Postgres, QueryBuilder, Row};
use std::str::FromStr;

const SELECT_COLUMNS: &str =
    "id, name, description, price, available, image_url, category::text AS category";

/// String columns are unbounded `TEXT`; payload validation imposes no length limits either.
const CREATE_PRODUCTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL,
        available BOOLEAN NOT NULL DEFAULT TRUE,
        image_url TEXT NOT NULL,
        category product_category NOT NULL DEFAULT 'UNKNOWN'
    )
"#;

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `product_category` enum type and `products` table if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let values: Vec<String> = Category::ALL.iter().map(|c| format!("'{}'", c.name())).collect();
        let create_type = format!(
            r#"
            DO $$ BEGIN
                CREATE TYPE product_category AS ENUM ({});
            EXCEPTION WHEN duplicate_object THEN NULL;
            END $$
            "#,
            values.join(", ")
        );
        sqlx::query(&create_type).execute(&self.pool).await?;
        // Members added after the type was first created.
        for c in Category::ALL {
            let alter = format!("ALTER TYPE product_category ADD VALUE IF NOT EXISTS '{}'", c.name());
            if let Err(e) = sqlx::query(&alter).execute(&self.pool).await {
                tracing::warn!(error = %e, category = %c, "failed to add category to product_category type");
            }
        }
        sqlx::query(CREATE_PRODUCTS_TABLE).execute(&self.pool).await?;
        tracing::info!("products schema ready");
        Ok(())
    }

    fn insert_query(product: &Product) -> QueryBuilder<'static, Postgres> {
        let mut q = QueryBuilder::new(
            "INSERT INTO products (name, description, price, available, image_url, category) VALUES (",
        );
        q.push_bind(product.name.clone())
            .push(", ")
            .push_bind(product.description.clone())
            .push(", ")
            .push_bind(product.price)
            .push(", ")
            .push_bind(product.available)
            .push(", ")
            .push_bind(product.image_url.clone())
            .push(", ")
            .push_bind(product.category.name())
            .push("::product_category) RETURNING ")
            .push(SELECT_COLUMNS);
        q
    }

    /// SELECT with one `AND`-joined condition per set filter field, ordered by id.
    fn list_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
        let mut q = QueryBuilder::new("SELECT ");
        q.push(SELECT_COLUMNS).push(" FROM products");
        let mut sep = " WHERE ";
        if let Some(name) = &filter.name {
            q.push(sep).push("name = ").push_bind(name.clone());
            sep = " AND ";
        }
        if let Some(category) = filter.category {
            q.push(sep)
                .push("category = ")
                .push_bind(category.name())
                .push("::product_category");
            sep = " AND ";
        }
        if let Some(available) = filter.available {
            q.push(sep).push("available = ").push_bind(available);
        }
        q.push(" ORDER BY id");
        q
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn create(&self, product: &Product) -> Result<Product, AppError> {
        let mut q = Self::insert_query(product);
        tracing::debug!(sql = %q.sql(), "query");
        let row = q.build().fetch_one(&self.pool).await?;
        row_to_product(&row)
    }

    async fn create_many(&self, products: &[Product]) -> Result<Vec<Product>, AppError> {
        let mut out = Vec::with_capacity(products.len());
        let mut tx = self.pool.begin().await?;
        for product in products {
            let mut q = Self::insert_query(product);
            tracing::debug!(sql = %q.sql(), "query (tx)");
            let row = q.build().fetch_one(&mut *tx).await?;
            out.push(row_to_product(&row)?);
        }
        tx.commit().await?;
        Ok(out)
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, AppError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", SELECT_COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn update(&self, product: &Product) -> Result<Product, AppError> {
        let id = product
            .id
            .ok_or_else(|| AppError::NotFound("product has no id".into()))?;
        let sql = format!(
            "UPDATE products SET name = $1, description = $2, price = $3, available = $4, \
             image_url = $5, category = $6::product_category WHERE id = $7 RETURNING {}",
            SELECT_COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.available)
            .bind(&product.image_url)
            .bind(product.category.name())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::product_not_found(id))?;
        row_to_product(&row)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        tracing::debug!(id, "delete product");
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, AppError> {
        let mut q = Self::list_query(filter);
        tracing::debug!(sql = %q.sql(), filter = ?filter, "query");
        let rows = q.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn row_to_product(row: &PgRow) -> Result<Product, AppError> {
    let category: String = row.try_get("category")?;
    Ok(Product {
        id: Some(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        available: row.try_get("available")?,
        image_url: row.try_get("image_url")?,
        category: Category::from_name(&category).unwrap_or_default(),
    })
}

/// Connect to the server's `postgres` database and create the target database if it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin, db_name) = admin_options(database_url)?;
    let Some(db_name) = db_name.filter(|n| !n.is_empty() && n != "postgres") else {
        return Ok(());
    };
    let mut conn = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Options for the server's `postgres` database plus the database named by `url`, if any.
fn admin_options(url: &str) -> Result<(PgConnectOptions, Option<String>), AppError> {
    let opts = PgConnectOptions::from_str(url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let db_name = opts.get_database().map(str::to_string);
    Ok((opts.database("postgres"), db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_database_name_from_url() {
        let (admin, db) = admin_options("postgres://u:p@localhost:5432/products").unwrap();
        assert_eq!(db.as_deref(), Some("products"));
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "localhost");
        assert_eq!(admin.get_port(), 5432);
    }

    #[test]
    fn slashes_in_query_options_do_not_change_database_name() {
        let (admin, db) = admin_options("postgres://localhost/shop?sslrootcert=/etc/ssl/ca.pem").unwrap();
        assert_eq!(db.as_deref(), Some("shop"));
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "localhost");
    }

    #[test]
    fn url_without_path_keeps_host() {
        let (admin, _) = admin_options("postgres://dbhost:5433").unwrap();
        assert_eq!(admin.get_host(), "dbhost");
        assert_eq!(admin.get_port(), 5433);
        assert_eq!(admin.get_database(), Some("postgres"));
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(matches!(admin_options("not a url"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn table_uses_unbounded_text_columns() {
        assert!(!CREATE_PRODUCTS_TABLE.contains("VARCHAR"));
        assert!(CREATE_PRODUCTS_TABLE.contains("name TEXT NOT NULL"));
        assert!(CREATE_PRODUCTS_TABLE.contains("description TEXT NOT NULL"));
    }

    #[test]
    fn list_query_without_filter_selects_all() {
        let q = PgProductStore::list_query(&ProductFilter::default());
        assert_eq!(q.sql(), format!("SELECT {} FROM products ORDER BY id", SELECT_COLUMNS));
    }

    #[test]
    fn list_query_single_filters() {
        let by_name = PgProductStore::list_query(&ProductFilter {
            name: Some("Hammer".into()),
            ..ProductFilter::default()
        });
        assert!(by_name.sql().ends_with(" FROM products WHERE name = $1 ORDER BY id"));

        let by_category = PgProductStore::list_query(&ProductFilter {
            category: Some(Category::Food),
            ..ProductFilter::default()
        });
        assert!(by_category
            .sql()
            .ends_with(" FROM products WHERE category = $1::product_category ORDER BY id"));

        let by_available = PgProductStore::list_query(&ProductFilter {
            available: Some(false),
            ..ProductFilter::default()
        });
        assert!(by_available.sql().ends_with(" FROM products WHERE available = $1 ORDER BY id"));
    }

    #[test]
    fn list_query_joins_filters_with_and() {
        let q = PgProductStore::list_query(&ProductFilter {
            name: Some("Apple".into()),
            category: Some(Category::Food),
            available: Some(true),
        });
        assert!(q.sql().ends_with(
            " FROM products WHERE name = $1 AND category = $2::product_category AND available = $3 ORDER BY id"
        ));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("my\"db"), "\"my\"\"db\"");
    }
}
