//! Substring matching used by [`super::Catalog::search`].

use oakmint_core::Product;

/// Lowercase the query, or `None` when there is nothing to search for.
///
/// An empty query means "show nothing", never "show everything".
pub(super) fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Whether `needle` (already lowercase) occurs in any searchable field.
pub(super) fn matches(product: &Product, needle: &str) -> bool {
    contains(&product.name, needle)
        || contains(&product.description, needle)
        || contains(product.category.slug(), needle)
        || product.materials().iter().any(|m| contains(m, needle))
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
