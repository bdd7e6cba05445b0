//! Cart display models.
//!
//! Built at the presentation boundary from the cart lines and the live
//! catalog. Prices are pre-formatted; crypto amounts are a display-only
//! conversion of the USD subtotal.

use oakmint_core::{CurrencyCode, Price, RateTable};
use serde::Serialize;

use super::state::CartState;
use crate::catalog::Catalog;

/// Title shown for lines whose product has left the catalog.
pub const UNAVAILABLE_TITLE: &str = "Unavailable product";

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub product_id: String,
    pub title: String,
    pub sku: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
    pub price: Option<String>,
    pub line_price: Option<String>,
    pub image: Option<String>,
    /// `false` when the product is no longer in the catalog.
    pub available: bool,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    /// Subtotal in each settlement currency, e.g. `0.9000 ETH`.
    pub crypto_subtotals: Vec<String>,
    pub item_count: u64,
    pub has_missing: bool,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Price::zero(CurrencyCode::USD).display(),
            crypto_subtotals: Vec::new(),
            item_count: 0,
            has_missing: false,
        }
    }

    /// Join cart lines against the catalog and format every amount.
    #[must_use]
    pub fn build(cart: &CartState, catalog: &Catalog, rates: &RateTable) -> Self {
        if cart.is_empty() {
            return Self::empty();
        }

        let totals = cart.totals(catalog);
        let items = cart
            .lines()
            .iter()
            .map(|line| match catalog.find(&line.product_id) {
                Some(product) => CartItemView {
                    product_id: line.product_id.to_string(),
                    title: product.name.clone(),
                    sku: Some(product.sku()),
                    color: line.selected_color.clone(),
                    quantity: line.quantity,
                    price: Some(product.price().display()),
                    line_price: Some(product.price().times(line.quantity).display()),
                    image: product.images.first().cloned(),
                    available: true,
                },
                None => CartItemView {
                    product_id: line.product_id.to_string(),
                    title: UNAVAILABLE_TITLE.to_string(),
                    sku: None,
                    color: line.selected_color.clone(),
                    quantity: line.quantity,
                    price: None,
                    line_price: None,
                    image: None,
                    available: false,
                },
            })
            .collect();

        Self {
            items,
            subtotal: totals.subtotal.display(),
            crypto_subtotals: rates
                .convert_all(totals.subtotal)
                .iter()
                .map(Price::display)
                .collect(),
            item_count: totals.item_count,
            has_missing: !totals.missing.is_empty(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use oakmint_core::ProductId;

    use super::*;
    use crate::catalog::tests::product;

    #[test]
    fn test_empty_view() {
        let catalog = Catalog::bundled().unwrap();
        let view = CartView::build(&CartState::new(), &catalog, &RateTable::default());
        assert_eq!(view, CartView::empty());
        assert_eq!(view.subtotal, "$0.00");
    }

    #[test]
    fn test_view_formats_lines_and_crypto() {
        let catalog = Catalog::from_products(vec![product("1", "Lamp", 1125)]).unwrap();
        let mut cart = CartState::new();
        cart.add(ProductId::new("1"), 2, None);

        let view = CartView::build(&cart, &catalog, &RateTable::default());
        let item = view.items.first().unwrap();
        assert_eq!(item.title, "Lamp");
        assert_eq!(item.sku.as_deref(), Some("FRN-000001"));
        assert_eq!(item.price.as_deref(), Some("$1,125.00"));
        assert_eq!(item.line_price.as_deref(), Some("$2,250.00"));
        assert_eq!(view.subtotal, "$2,250.00");
        assert_eq!(view.crypto_subtotals, vec!["0.9000 ETH", "2250.00 USDC"]);
        assert_eq!(view.item_count, 2);
        assert!(!view.has_missing);
    }

    #[test]
    fn test_view_flags_missing_products() {
        let catalog = Catalog::from_products(vec![product("1", "Lamp", 100)]).unwrap();
        let mut cart = CartState::new();
        cart.add(ProductId::new("1"), 1, None);
        cart.add(ProductId::new("gone"), 3, Some("Red".into()));

        let view = CartView::build(&cart, &catalog, &RateTable::empty());
        let stale = view.items.last().unwrap();
        assert!(!stale.available);
        assert_eq!(stale.title, UNAVAILABLE_TITLE);
        assert_eq!(stale.color.as_deref(), Some("Red"));
        assert_eq!(stale.line_price, None);
        assert_eq!(view.subtotal, "$100.00");
        assert_eq!(view.item_count, 4);
        assert!(view.has_missing);
        assert!(view.crypto_subtotals.is_empty());
    }
}
