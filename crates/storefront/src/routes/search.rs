//! Search route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use oakmint_core::Product;
use serde::Deserialize;
use tracing::instrument;

use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Catalog search; an empty query returns an empty list.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Product>> {
    Json(state.catalog().search(&query.q).into_iter().cloned().collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use super::super::tests::get_json;

    #[tokio::test]
    async fn test_search() {
        let (status, body) = get_json("/api/search?q=Chair").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["2", "5", "7", "14"]);
    }

    #[tokio::test]
    async fn test_empty_search() {
        for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.as_array().unwrap().is_empty(), "{uri}");
        }
    }
}
