#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use uuid::Uuid;

use product_api::auth::JwtKeys;
use product_api::config::AppConfig;
use product_api::database::models::{Product, ProductPatch, ProductSummary, User};
use product_api::database::{
    DatabaseError, MemoryProductRepository, MemoryUserRepository, ProductRepository, UserRepository,
};
use product_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub jwt: JwtKeys,
    pub users: Arc<MemoryUserRepository>,
    pub product_calls: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Provision a user and return it with a valid bearer token
    pub async fn user(&self, email: &str, roles: &[&str]) -> Result<(User, String)> {
        let roles = roles.iter().map(|r| r.to_string()).collect();
        let user = self.users.save(User::new(email, roles)).await?;
        let token = self.jwt.generate(user.id, user.email.clone())?;
        Ok((user, token))
    }

    /// Token for an id the user store has never seen
    pub fn orphan_token(&self) -> Result<String> {
        Ok(self.jwt.generate(Uuid::new_v4(), "ghost@example.com")?)
    }

    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }
}

/// Start the real router on a free port, backed by in-memory stores
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(Arc::new(MemoryProductRepository::new())).await
}

pub async fn spawn_server_with(products: Arc<dyn ProductRepository>) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let jwt = JwtKeys::new(TEST_SECRET, 1)?;
    let users = Arc::new(MemoryUserRepository::new());
    let product_calls = Arc::new(AtomicUsize::new(0));
    let counted = Arc::new(CountingProducts {
        inner: products,
        calls: product_calls.clone(),
    });

    let state = AppState::new(counted, users.clone(), jwt.clone());
    let router = app(state, &AppConfig::from_env());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server");
    });

    Ok(TestServer {
        base_url,
        client: reqwest::Client::new(),
        jwt,
        users,
        product_calls,
    })
}

/// Delegates to another store and counts every call
struct CountingProducts {
    inner: Arc<dyn ProductRepository>,
    calls: Arc<AtomicUsize>,
}

impl CountingProducts {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductRepository for CountingProducts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        self.hit();
        self.inner.find_by_id(id).await
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, DatabaseError> {
        self.hit();
        self.inner.find_by_owner(owner_id).await
    }

    async fn find_all_without_owner(&self) -> Result<Vec<ProductSummary>, DatabaseError> {
        self.hit();
        self.inner.find_all_without_owner().await
    }

    async fn insert(&self, product: Product) -> Result<Product, DatabaseError> {
        self.hit();
        self.inner.insert(product).await
    }

    async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, DatabaseError> {
        self.hit();
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.hit();
        self.inner.delete(id).await
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.inner.health_check().await
    }
}

/// A store whose every operation fails, as if the database were gone
pub struct BrokenProducts;

fn broken() -> DatabaseError {
    DatabaseError::QueryError("connection reset by peer: products".to_string())
}

#[async_trait]
impl ProductRepository for BrokenProducts {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Product>, DatabaseError> {
        Err(broken())
    }

    async fn find_by_owner(&self, _owner_id: Uuid) -> Result<Vec<Product>, DatabaseError> {
        Err(broken())
    }

    async fn find_all_without_owner(&self) -> Result<Vec<ProductSummary>, DatabaseError> {
        Err(broken())
    }

    async fn insert(&self, _product: Product) -> Result<Product, DatabaseError> {
        Err(broken())
    }

    async fn update(&self, _id: Uuid, _patch: ProductPatch) -> Result<Option<Product>, DatabaseError> {
        Err(broken())
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, DatabaseError> {
        Err(broken())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Err(broken())
    }
}
