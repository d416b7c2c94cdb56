//! Storage ports. Handlers only ever see these traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Product, ProductPatch, ProductSummary, User};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DatabaseError>;

    /// Newest first
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, DatabaseError>;

    /// Every product, projected without its owner. Newest first.
    async fn find_all_without_owner(&self) -> Result<Vec<ProductSummary>, DatabaseError>;

    async fn insert(&self, product: Product) -> Result<Product, DatabaseError>;

    /// Returns `None` when no row has `id`
    async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, DatabaseError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Plain lookup; `roles` is left empty
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Lookup including role associations
    async fn find_with_roles(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn save(&self, user: User) -> Result<User, DatabaseError>;
}
