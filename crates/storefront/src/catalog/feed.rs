//! Catalog feed client.
//!
//! Fetches the read-only product dataset from the backend's
//! `GET /api/products` endpoint. There is no write-back interface.

use oakmint_core::Product;
use tracing::{info, instrument};
use url::Url;

use super::{Catalog, CatalogError};

/// Path of the catalog feed on the backend.
pub const PRODUCTS_PATH: &str = "/api/products";

/// Fetch the full catalog from the backend.
///
/// # Errors
///
/// Returns an error if the request fails, the backend answers with a
/// non-success status, or the records are invalid.
#[instrument(skip(client), fields(backend = %backend_url))]
pub async fn fetch(client: &reqwest::Client, backend_url: &Url) -> Result<Catalog, CatalogError> {
    let endpoint = feed_url(backend_url);
    let products: Vec<Product> = client
        .get(endpoint)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let catalog = Catalog::from_products(products)?;
    info!(products = catalog.len(), "Catalog fetched from backend");
    Ok(catalog)
}

fn feed_url(backend_url: &Url) -> Url {
    let mut url = backend_url.clone();
    url.set_path(PRODUCTS_PATH);
    url.set_query(None);
    url
}
