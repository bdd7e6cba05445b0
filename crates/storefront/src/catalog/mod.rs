//! Read-only product catalog.
//!
//! The catalog is loaded once at startup (from the bundled dataset, a JSON
//! file, or the backend feed) and shared by reference everywhere. It never
//! changes after load; a fresh catalog is a fresh value.
//!
//! # Queries
//!
//! - [`Catalog::get_all`] - every product, catalog order
//! - [`Catalog::get_by_id`] - one product or [`CatalogError::NotFound`]
//! - [`Catalog::get_featured`] - bestsellers and new arrivals, capped
//! - [`Catalog::search`] - case-insensitive substring search, capped
//! - [`Catalog::by_category`] - category listing

pub mod feed;
mod search;
pub mod view;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use oakmint_core::{Category, Product, ProductError, ProductId};
use thiserror::Error;
use tracing::{debug, instrument};

pub use view::ProductView;

/// Maximum number of products shown in the featured grid.
pub const FEATURED_LIMIT: usize = 8;

/// Maximum number of search results returned.
pub const SEARCH_LIMIT: usize = 8;

/// Category slug that lists every product.
pub const ALL_CATEGORIES_SLUG: &str = "all";

const BUNDLED_CATALOG: &str = include_str!("../../catalog/products.json");

/// Errors that can occur when loading or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product with the requested ID.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// A record failed validation.
    #[error("Invalid product record: {0}")]
    InvalidProduct(#[from] ProductError),

    /// Two records share an ID.
    #[error("Duplicate product id: {0}")]
    DuplicateId(ProductId),

    /// The dataset is not valid JSON.
    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The dataset file could not be read.
    #[error("Catalog read error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend feed could not be fetched.
    #[error("Catalog feed error: {0}")]
    Feed(#[from] reqwest::Error),
}

/// Immutable product catalog.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone, Debug)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

#[derive(Debug)]
struct CatalogInner {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog from product records, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns an error if any record is invalid or two records share an ID.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            product.validate()?;
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        Ok(Self {
            inner: Arc::new(CatalogInner { products, index }),
        })
    }

    /// Parse a catalog from a JSON array of product records.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a record is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::from_products(products)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        debug!(path = %path.display(), products = catalog.len(), "Catalog loaded from file");
        Ok(catalog)
    }

    /// The dataset compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled dataset is malformed.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Every product, in catalog order.
    #[must_use]
    pub fn get_all(&self) -> &[Product] {
        &self.inner.products
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.products.is_empty()
    }

    /// Look up a product, returning `None` when it is not in the catalog.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.inner
            .index
            .get(id)
            .and_then(|&position| self.inner.products.get(position))
    }

    /// Look up a product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown IDs; detail views treat
    /// that as "nothing to display".
    pub fn get_by_id(&self, id: &ProductId) -> Result<&Product, CatalogError> {
        self.find(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Bestsellers and new arrivals, in catalog order, capped at
    /// [`FEATURED_LIMIT`].
    #[must_use]
    pub fn get_featured(&self) -> Vec<&Product> {
        self.inner
            .products
            .iter()
            .filter(|p| p.is_featured())
            .take(FEATURED_LIMIT)
            .collect()
    }

    /// Search name, description, category, and materials.
    ///
    /// Matching is a case-insensitive substring test; results keep catalog
    /// order and are capped at [`SEARCH_LIMIT`]. An empty or whitespace-only
    /// query returns no results.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let Some(needle) = search::normalize_query(query) else {
            return Vec::new();
        };

        let results: Vec<&Product> = self
            .inner
            .products
            .iter()
            .filter(|p| search::matches(p, &needle))
            .take(SEARCH_LIMIT)
            .collect();

        debug!(results = results.len(), "Catalog search");
        results
    }

    /// Products in a category, in catalog order.
    ///
    /// The `all` slug lists every product; unknown slugs list nothing.
    #[must_use]
    pub fn by_category(&self, slug: &str) -> Vec<&Product> {
        if slug.trim().eq_ignore_ascii_case(ALL_CATEGORIES_SLUG) {
            return self.inner.products.iter().collect();
        }

        slug.parse::<Category>().map_or_else(
            |_| Vec::new(),
            |category| {
                self.inner
                    .products
                    .iter()
                    .filter(|p| p.category == category)
                    .collect()
            },
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal::Decimal;

    /// Minimal valid product for tests.
    pub(crate) fn product(id: &str, name: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: format!("{name} description"),
            category: Category::Decor,
            price: Decimal::from(price),
            original_price: None,
            images: vec![format!("https://images.test/{id}.jpg")],
            materials: None,
            colors: None,
            dimensions: None,
            rating: 4.0,
            reviews: 0,
            new: false,
            bestseller: false,
            in_stock: true,
        }
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        assert_eq!(catalog.len(), 16);
        assert_eq!(catalog.get_all().first().unwrap().id, ProductId::new("1"));
    }

    #[test]
    fn test_get_by_id() {
        let catalog = Catalog::bundled().unwrap();
        let product = catalog.get_by_id(&ProductId::new("3")).unwrap();
        assert_eq!(product.name, "Atlas Dining Table");
    }

    #[test]
    fn test_get_by_id_not_found() {
        let catalog = Catalog::bundled().unwrap();
        let err = catalog.get_by_id(&ProductId::new("999")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(id) if id.as_str() == "999"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = Catalog::from_products(vec![product("1", "A", 10), product("1", "B", 20)]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(_))));
    }

    #[test]
    fn test_rejects_invalid_record() {
        let mut bad = product("1", "A", 10);
        bad.images.clear();
        let result = Catalog::from_products(vec![bad]);
        assert!(matches!(result, Err(CatalogError::InvalidProduct(_))));
    }

    #[test]
    fn test_featured_is_capped_and_ordered() {
        let catalog = Catalog::bundled().unwrap();
        let ids: Vec<&str> = catalog
            .get_featured()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "5", "6", "7", "9", "11"]);
    }

    #[test]
    fn test_featured_includes_new_and_bestsellers_only() {
        let mut fresh = product("1", "Fresh", 10);
        fresh.new = true;
        let plain = product("2", "Plain", 10);
        let mut popular = product("3", "Popular", 10);
        popular.bestseller = true;

        let catalog = Catalog::from_products(vec![fresh, plain, popular]).unwrap();
        let ids: Vec<&str> = catalog
            .get_featured()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_by_category() {
        let catalog = Catalog::bundled().unwrap();
        let chairs: Vec<&str> = catalog
            .by_category("chairs")
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(chairs, vec!["2", "7"]);
        assert_eq!(catalog.by_category("ALL").len(), catalog.len());
        assert!(catalog.by_category("thrones").is_empty());
    }
}
