use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::database::{ProductRepository, UserRepository};

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
        jwt: JwtKeys,
    ) -> Self {
        Self { products, users, jwt }
    }
}
