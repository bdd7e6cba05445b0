//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use oakmint_core::{Product, ProductId};
use tracing::instrument;

use crate::catalog::ALL_CATEGORIES_SLUG;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Full catalog, in catalog order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog().get_all().to_vec())
}

/// Featured products.
#[instrument(skip(state))]
pub async fn featured(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog().get_featured().into_iter().cloned().collect())
}

/// One product.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let product = state.catalog().get_by_id(&ProductId::new(id))?;
    Ok(Json(product.clone()))
}

/// Category listing. Unknown categories are a 404.
#[instrument(skip(state))]
pub async fn category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let known = slug.eq_ignore_ascii_case(ALL_CATEGORIES_SLUG)
        || slug.parse::<oakmint_core::Category>().is_ok();
    if !known {
        return Err(AppError::NotFound(format!("category {slug}")));
    }
    Ok(Json(
        state.catalog().by_category(&slug).into_iter().cloned().collect(),
    ))
}
