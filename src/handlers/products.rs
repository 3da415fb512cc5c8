use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::api::{parse_id, ApiQuery, ValidatedJson};
use crate::app::AppState;
use crate::error::ApiError;
use crate::models::{CreateProduct, Product, ProductQuery, UpdateProduct};

/// POST /products/ - Create a product
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> Result<Json<Product>, ApiError> {
    let product = state.products.create(&input).await?;
    info!(product_id = product.id, "Created product");
    Ok(Json(product))
}

/// GET /products/ - List products, optionally filtered by name and category
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list(&query).await?;
    Ok(Json(products))
}

/// GET /products/:id - Get a single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;
    let product = state.products.get(id).await?;
    Ok(Json(product))
}

/// PUT /products/:id - Apply a partial update
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(changes): ValidatedJson<UpdateProduct>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;
    let product = state.products.update(id, &changes).await?;
    info!(product_id = id, noop = changes.is_empty(), "Updated product");
    Ok(Json(product))
}

/// DELETE /products/:id - Remove a product permanently
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state.products.delete(id).await?;
    info!(product_id = id, "Deleted product");
    Ok(Json(json!({ "detail": "Product deleted" })))
}
