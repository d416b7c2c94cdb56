pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod validation;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::error::ApiError;
pub use crate::state::AppState;

/// Build the full application router around `state`
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(product_routes())
        // Identity is resolved for every route; handlers decide whether they need it
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::jwt_auth_middleware,
                )),
        );

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn product_routes() -> Router<AppState> {
    use handlers::products;

    Router::new()
        // Collection
        .route(
            "/products",
            get(products::products_get).post(products::products_post),
        )
        .route("/products/mine", get(products::products_mine))
        // Individual product
        .route(
            "/products/:id",
            get(products::product_get)
                .put(products::product_put)
                .delete(products::product_delete),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::very_permissive().allow_origin(origins)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Product API",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "products": "GET /products, GET /products/:id (public); POST /products (protected)",
            "mine": "GET /products/mine (protected)",
            "mutate": "PUT /products/:id, DELETE /products/:id (protected, owner or admin)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let now = chrono::Utc::now();

    match state.products.health_check().await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        )),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("database unavailable"))
        }
    }
}
