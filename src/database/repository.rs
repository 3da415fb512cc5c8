use std::time::Instant;

use async_trait::async_trait;

use crate::database::manager::{Database, DatabaseError};
use crate::models::{CreateProduct, Product, ProductQuery, UpdateProduct};

/// CRUD operations on the product table.
///
/// `get`, `update` and `delete` return [`DatabaseError::NotFound`] when the id
/// does not exist. `list` returns rows in ascending id order.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: &CreateProduct) -> Result<Product, DatabaseError>;

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, DatabaseError>;

    async fn get(&self, id: i64) -> Result<Product, DatabaseError>;

    async fn update(&self, id: i64, changes: &UpdateProduct) -> Result<Product, DatabaseError>;

    async fn delete(&self, id: i64) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

pub(crate) fn not_found(id: i64) -> DatabaseError {
    DatabaseError::NotFound { entity: "Product", id }
}

/// Escape LIKE metacharacters so filters match literally
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const SELECT_PRODUCTS: &str = r#"
    SELECT id, name, category, price
    FROM products
    WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' ESCAPE '\')
      AND ($2::text IS NULL OR category ILIKE '%' || $2 || '%' ESCAPE '\')
    ORDER BY id
"#;

const UPDATE_PRODUCT: &str = r#"
    UPDATE products
    SET name = COALESCE($2, name),
        category = COALESCE($3, category),
        price = COALESCE($4, price)
    WHERE id = $1
    RETURNING id, name, category, price
"#;

/// Postgres-backed repository
pub struct PgProductRepository {
    db: Database,
}

impl PgProductRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: &CreateProduct) -> Result<Product, DatabaseError> {
        let started = Instant::now();
        let mut session = self.db.session().await?;

        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, category, price) VALUES ($1, $2, $3)
             RETURNING id, name, category, price",
        )
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price)
        .fetch_one(&mut *session)
        .await?;

        self.db.observe("create", started);
        Ok(product)
    }

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, DatabaseError> {
        let started = Instant::now();
        let mut session = self.db.session().await?;

        let products = sqlx::query_as::<_, Product>(SELECT_PRODUCTS)
            .bind(query.name.as_deref().map(escape_like))
            .bind(query.category.as_deref().map(escape_like))
            .fetch_all(&mut *session)
            .await?;

        self.db.observe("list", started);
        Ok(products)
    }

    async fn get(&self, id: i64) -> Result<Product, DatabaseError> {
        let started = Instant::now();
        let mut session = self.db.session().await?;

        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, category, price FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *session)
        .await?;

        self.db.observe("get", started);
        product.ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: i64, changes: &UpdateProduct) -> Result<Product, DatabaseError> {
        let started = Instant::now();
        let mut session = self.db.session().await?;

        // Absent fields bind as NULL and COALESCE keeps the stored value
        let product = sqlx::query_as::<_, Product>(UPDATE_PRODUCT)
            .bind(id)
            .bind(changes.name.value().map(String::as_str))
            .bind(changes.category.value().map(String::as_str))
            .bind(changes.price.value().copied())
            .fetch_optional(&mut *session)
            .await?;

        self.db.observe("update", started);
        product.ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let started = Instant::now();
        let mut session = self.db.session().await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *session)
            .await?;

        self.db.observe("delete", started);
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.db.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(escape_like("Toy"), "Toy");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
