use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::models::{Product, ProductSummary};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::validate_new_product;

use super::utils::resolve_acting_user;

/// POST /products - Create a product owned by the caller
pub async fn post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let user = resolve_acting_user(&state, &auth_user).await?;
    let Json(body) = payload?;
    let new_product = validate_new_product(&body)?;

    let product = state
        .products
        .insert(new_product.into_product(user.id))
        .await?;

    tracing::info!(product_id = %product.id, owner_id = %product.owner_id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "id": product.id,
        })),
    ))
}

/// GET /products - Every product, without owner information
pub async fn get(State(state): State<AppState>) -> Result<Json<Vec<ProductSummary>>, ApiError> {
    let products = state.products.find_all_without_owner().await?;
    Ok(Json(products))
}

/// GET /products/mine - Products owned by the caller
pub async fn mine(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.find_by_owner(auth_user.id).await?;
    Ok(Json(products))
}
