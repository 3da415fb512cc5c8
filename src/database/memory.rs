use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::repository::{not_found, ProductRepository};
use crate::models::{CreateProduct, Product, ProductQuery, UpdateProduct};

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<i64, Product>,
}

/// In-process repository for local runs and tests.
///
/// Ids start at 1 and are never reused, matching a serial column.
#[derive(Default)]
pub struct MemoryProductRepository {
    state: RwLock<MemoryState>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create(&self, input: &CreateProduct) -> Result<Product, DatabaseError> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let product = Product {
            id: state.last_id,
            name: input.name.clone(),
            category: input.category.clone(),
            price: input.price,
        };
        state.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.rows.values().filter(|p| query.matches(p)).cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Product, DatabaseError> {
        let state = self.state.read().await;
        state.rows.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn update(&self, id: i64, changes: &UpdateProduct) -> Result<Product, DatabaseError> {
        let mut state = self.state.write().await;
        let product = state.rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        changes.apply_to(product);
        Ok(product.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        state.rows.remove(&id).map(|_| ()).ok_or_else(|| not_found(id))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patch;

    fn input(name: &str, category: &str, price: f64) -> CreateProduct {
        CreateProduct { name: name.into(), category: category.into(), price }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = MemoryProductRepository::new();
        let created = repo.create(&input("Doll", "Toy", 10.99)).await.unwrap();
        assert_eq!(created.id, 1);

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Doll");
        assert_eq!(fetched.price, 10.99);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let repo = MemoryProductRepository::new();
        assert!(matches!(repo.get(999).await, Err(DatabaseError::NotFound { id: 999, .. })));
        assert!(matches!(
            repo.update(999, &UpdateProduct::default()).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(repo.delete(999).await, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn update_is_a_partial_patch() {
        let repo = MemoryProductRepository::new();
        let ball = repo.create(&input("Ball", "Toy", 5.99)).await.unwrap();

        let changes = UpdateProduct { price: Patch::Value(7.99), ..Default::default() };
        let updated = repo.update(ball.id, &changes).await.unwrap();
        assert_eq!(updated, Product { price: 7.99, ..ball.clone() });

        let unchanged = repo.update(ball.id, &UpdateProduct::default()).await.unwrap();
        assert_eq!(unchanged, updated);
    }

    #[tokio::test]
    async fn delete_is_permanent_and_ids_are_not_reused() {
        let repo = MemoryProductRepository::new();
        let kite = repo.create(&input("Kite", "Toy", 12.99)).await.unwrap();

        repo.delete(kite.id).await.unwrap();
        assert!(repo.get(kite.id).await.is_err());
        assert!(repo.delete(kite.id).await.is_err());

        let next = repo.create(&input("Kite", "Toy", 12.99)).await.unwrap();
        assert!(next.id > kite.id);
    }

    #[tokio::test]
    async fn list_filters_and_keeps_insertion_order() {
        let repo = MemoryProductRepository::new();
        repo.create(&input("Puzzle", "Game", 20.0)).await.unwrap();
        repo.create(&input("Car", "Toy", 15.99)).await.unwrap();
        repo.create(&input("Board Game", "game", 30.0)).await.unwrap();

        let games = repo
            .list(&ProductQuery { category: Some("GAME".into()), ..Default::default() })
            .await
            .unwrap();
        let names: Vec<_> = games.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Puzzle", "Board Game"]);

        let toys_by_name = repo
            .list(&ProductQuery { name: Some("Toy".into()), ..Default::default() })
            .await
            .unwrap();
        assert!(toys_by_name.is_empty());

        assert_eq!(repo.list(&ProductQuery::default()).await.unwrap().len(), 3);
    }
}
