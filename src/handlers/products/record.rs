use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::models::Product;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::validate_product_patch;

use super::utils::{load_modifiable_product, parse_product_id, resolve_acting_user, PRODUCT_NOT_FOUND};

/// GET /products/:id - Get a single product by ID
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_product_id(&id)?;

    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))?;

    Ok(Json(product))
}

/// PUT /products/:id - Partially update a product the caller owns
pub async fn put(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let user = resolve_acting_user(&state, &auth_user).await?;

    let Json(body) = payload?;
    let patch = validate_product_patch(&body)?;

    let id = parse_product_id(&id)?;
    load_modifiable_product(&state, &user, id).await?;

    // The row can disappear between the ownership check and the write
    let updated = state
        .products
        .update(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found(PRODUCT_NOT_FOUND))?;

    tracing::info!(product_id = %updated.id, user_id = %user.id, "Product updated");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product updated successfully" })),
    ))
}

/// DELETE /products/:id - Delete a product the caller owns
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = resolve_acting_user(&state, &auth_user).await?;

    let id = parse_product_id(&id)?;
    load_modifiable_product(&state, &user, id).await?;

    if !state.products.delete(id).await? {
        return Err(ApiError::not_found(PRODUCT_NOT_FOUND));
    }

    tracing::info!(product_id = %id, user_id = %user.id, "Product deleted");

    Ok((StatusCode::OK, Json(json!({ "message": "Product deleted" }))))
}
