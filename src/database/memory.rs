//! In-process adapters used by tests and `STORAGE_BACKEND=memory`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Product, ProductPatch, ProductSummary, User};
use crate::database::repository::{ProductRepository, UserRepository};

#[derive(Clone, Default)]
pub struct MemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, DatabaseError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        newest_first(&mut products, |p| p.created_at);
        Ok(products)
    }

    async fn find_all_without_owner(&self) -> Result<Vec<ProductSummary>, DatabaseError> {
        let mut products: Vec<ProductSummary> = self
            .products
            .read()
            .await
            .values()
            .cloned()
            .map(ProductSummary::from)
            .collect();
        newest_first(&mut products, |p| p.created_at);
        Ok(products)
    }

    async fn insert(&self, product: Product) -> Result<Product, DatabaseError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(DatabaseError::QueryError(format!(
                "duplicate key value violates unique constraint: products.id = {}",
                product.id
            )));
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, DatabaseError> {
        let mut products = self.products.write().await;
        Ok(products.get_mut(&id).map(|product| {
            patch.apply(product);
            product.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .map(|u| User {
                roles: Vec::new(),
                ..u.clone()
            }))
    }

    async fn find_with_roles(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(DatabaseError::QueryError(format!(
                "duplicate key value violates unique constraint: users.email = {}",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewProduct;
    use rust_decimal::Decimal;

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: "test".into(),
            price: Decimal::new(100, 2),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn filters_by_owner() {
        let repo = MemoryProductRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        repo.insert(new_product("a1").into_product(alice)).await.unwrap();
        repo.insert(new_product("b1").into_product(bob)).await.unwrap();
        repo.insert(new_product("a2").into_product(alice)).await.unwrap();

        let mine = repo.find_by_owner(alice).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|p| p.owner_id == alice));
        assert_eq!(repo.find_all_without_owner().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = MemoryProductRepository::new();
        let missing = Uuid::new_v4();

        let patch = ProductPatch {
            name: Some("renamed".into()),
            ..Default::default()
        };
        assert!(repo.update(missing, patch).await.unwrap().is_none());
        assert!(!repo.delete(missing).await.unwrap());

        let saved = repo.insert(new_product("x").into_product(Uuid::new_v4())).await.unwrap();
        assert!(repo.delete(saved.id).await.unwrap());
        assert!(!repo.delete(saved.id).await.unwrap());
    }

    #[tokio::test]
    async fn email_lookup_omits_roles() {
        let repo = MemoryUserRepository::new();
        let user = repo
            .save(User::new("admin@example.com", vec!["admin".into()]))
            .await
            .unwrap();

        let by_email = repo.find_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(by_email.roles.is_empty());

        let with_roles = repo.find_with_roles(user.id).await.unwrap().unwrap();
        assert!(with_roles.is_admin());
    }

    #[tokio::test]
    async fn rejects_duplicate_emails() {
        let repo = MemoryUserRepository::new();
        repo.save(User::new("dup@example.com", vec![])).await.unwrap();
        let err = repo.save(User::new("dup@example.com", vec![])).await.unwrap_err();
        assert!(matches!(err, DatabaseError::QueryError(_)));
    }
}
