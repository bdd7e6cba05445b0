//! Cart engine.
//!
//! Owns the session's cart lines, validates additions against the product
//! they reference, and writes a snapshot after every change. Totals are
//! always computed against the live catalog passed in by the caller.

mod state;
mod view;

use std::sync::Arc;

use oakmint_core::{Product, ProductId, RateTable};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::error::add_breadcrumb;
use crate::persistence::{self, SnapshotStore, keys};

pub use state::{CartLine, CartState, CartTotals};
pub use view::{CartItemView, CartView, UNAVAILABLE_TITLE};

/// Errors from cart operations. Rejected operations leave the cart as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The requested line is not valid for this product.
    #[error("Validation rejected for product {product_id}: {reason}")]
    ValidationRejected { product_id: ProductId, reason: String },
}

/// Session cart with snapshot persistence.
pub struct CartEngine {
    state: CartState,
    store: Arc<dyn SnapshotStore>,
}

impl std::fmt::Debug for CartEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEngine")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CartEngine {
    /// An empty cart writing to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            state: CartState::new(),
            store,
        }
    }

    /// Restore the cart saved in `store`, or start empty.
    #[must_use]
    pub fn rehydrate(store: Arc<dyn SnapshotStore>) -> Self {
        let state = persistence::restore::<Vec<CartLine>>(store.as_ref(), keys::CART)
            .map(CartState::from_lines)
            .unwrap_or_default();
        info!(lines = state.lines().len(), "Cart rehydrated");
        Self { state, store }
    }

    /// Current cart state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.state.lines()
    }

    /// Add a product to the cart.
    ///
    /// `quantity` is clamped to at least 1. A colour must be one the product
    /// declares (matched case-insensitively, stored in the product's own
    /// spelling); no colour is invented when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ValidationRejected`] when the colour is not
    /// offered for this product.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(
        &mut self,
        product: &Product,
        quantity: u32,
        color: Option<&str>,
    ) -> Result<CartLine, CartError> {
        let color = resolve_color(product, color)?;
        let line = self.state.add(product.id.clone(), quantity, color);

        debug!(quantity = line.quantity, "Added to cart");
        let quantity = line.quantity.to_string();
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[
                ("product_id", product.id.as_str()),
                ("quantity", quantity.as_str()),
            ]),
        );
        self.persist();
        Ok(line)
    }

    /// Set a line's quantity; zero or below removes it.
    ///
    /// Returns `false` (and changes nothing) when no line has this key.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, product_id: &ProductId, color: Option<&str>, quantity: i64) -> bool {
        let changed = self.state.set_quantity(product_id, color, quantity);
        if changed {
            let quantity = quantity.to_string();
            add_breadcrumb(
                "cart",
                "Updated quantity",
                Some(&[
                    ("product_id", product_id.as_str()),
                    ("quantity", quantity.as_str()),
                ]),
            );
            self.persist();
        }
        changed
    }

    /// Remove a line. Returns `false` when no line has this key.
    #[instrument(skip(self))]
    pub fn remove_line(&mut self, product_id: &ProductId, color: Option<&str>) -> bool {
        let removed = self.state.remove(product_id, color);
        if removed {
            add_breadcrumb(
                "cart",
                "Removed from cart",
                Some(&[("product_id", product_id.as_str())]),
            );
            self.persist();
        }
        removed
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.state.clear();
        add_breadcrumb("cart", "Cleared cart", None);
        self.persist();
    }

    /// Item count and subtotal against the live catalog.
    #[must_use]
    pub fn totals(&self, catalog: &crate::catalog::Catalog) -> CartTotals {
        self.state.totals(catalog)
    }

    /// Display model for the cart.
    #[must_use]
    pub fn view(&self, catalog: &crate::catalog::Catalog, rates: &RateTable) -> CartView {
        CartView::build(&self.state, catalog, rates)
    }

    fn persist(&self) {
        persistence::persist(self.store.as_ref(), keys::CART, &self.state);
    }
}

fn resolve_color(product: &Product, color: Option<&str>) -> Result<Option<String>, CartError> {
    let Some(requested) = color.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    let rejected = |reason: String| CartError::ValidationRejected {
        product_id: product.id.clone(),
        reason,
    };

    if product.colors().is_empty() {
        return Err(rejected("product has no colour variants".to_string()));
    }

    product
        .colors()
        .iter()
        .find(|c| c.eq_ignore_ascii_case(requested))
        .map(|c| Some(c.clone()))
        .ok_or_else(|| rejected(format!("colour {requested:?} is not offered")))
}
