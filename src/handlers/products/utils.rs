use uuid::Uuid;

use crate::database::models::{Product, User};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// A path segment that is not a UUID cannot name a product
pub fn parse_product_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(PRODUCT_NOT_FOUND))
}

/// Re-resolve the token holder against the user store, roles included.
/// A token for a user that no longer exists is not an identity.
pub async fn resolve_acting_user(state: &AppState, auth_user: &AuthUser) -> Result<User, ApiError> {
    match state.users.find_with_roles(auth_user.id).await? {
        Some(user) => Ok(user),
        None => {
            tracing::warn!(user_id = %auth_user.id, "Token subject has no user record");
            Err(ApiError::unauthorized("Unauthorized: You are not logged in"))
        }
    }
}

/// Owners may mutate their products; admins may mutate any
pub fn ensure_can_modify(user: &User, product: &Product) -> Result<(), ApiError> {
    if product.owner_id == user.id || user.is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id, product_id = %product.id, "Ownership check failed");
        Err(ApiError::forbidden("Forbidden: You do not own this product"))
    }
}

/// Load a product that the acting user is allowed to change
pub async fn load_modifiable_product(
    state: &AppState,
    user: &User,
    id: Uuid,
) -> Result<Product, ApiError> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))?;
    ensure_can_modify(user, &product)?;
    Ok(product)
}
