//! Application session.
//!
//! Bundles the catalog, the cart engine and the wallet session created at
//! startup. Storefront content is only reachable through [`Session`] while
//! the wallet is connected; every other status yields
//! [`SessionError::Locked`].

use std::sync::Arc;

use oakmint_core::{ProductId, RateTable, WalletStatus};
use thiserror::Error;
use tracing::{info, instrument};

use crate::cart::{CartEngine, CartError, CartLine, CartView};
use crate::catalog::{Catalog, CatalogError, ProductView};
use crate::gate::Connectivity;
use crate::persistence::SnapshotStore;
use crate::shell::{self, Screen};
use crate::wallet::{WalletProvider, WalletSession};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Content requested while the wallet is not connected.
    #[error("Storefront is locked (wallet {0})")]
    Locked(WalletStatus),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    /// The product cannot be added to the bag.
    #[error("Product is out of stock: {0}")]
    OutOfStock(ProductId),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// One application session.
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    cart: CartEngine,
    wallet: WalletSession,
    rates: RateTable,
}

impl Session {
    /// Assemble a session from parts.
    #[must_use]
    pub fn new(catalog: Catalog, cart: CartEngine, wallet: WalletSession) -> Self {
        Self {
            catalog,
            cart,
            wallet,
            rates: RateTable::default(),
        }
    }

    /// Rehydrate the cart and wallet from `store` and resolve the wallet
    /// against the provider's authorized accounts.
    #[instrument(skip_all, fields(products = catalog.len()))]
    pub async fn start(
        catalog: Catalog,
        provider: Arc<dyn WalletProvider>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        let wallet = WalletSession::start(provider, store.clone()).await;
        let cart = CartEngine::rehydrate(store);
        info!(
            wallet = %wallet.status(),
            cart_lines = cart.lines().len(),
            "Session started"
        );
        Self::new(catalog, cart, wallet)
    }

    /// Replace the display rate table.
    #[must_use]
    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = rates;
        self
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn wallet(&self) -> &WalletSession {
        &self.wallet
    }

    #[must_use]
    pub const fn cart(&self) -> &CartEngine {
        &self.cart
    }

    #[must_use]
    pub const fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// What the shell should render right now.
    #[must_use]
    pub fn screen(&self, connectivity: Connectivity) -> Screen {
        shell::screen(connectivity, &self.wallet.snapshot())
    }

    /// Featured products.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Locked`] unless the wallet is connected.
    pub fn featured(&self) -> Result<Vec<ProductView>> {
        self.ensure_unlocked()?;
        Ok(self.views(self.catalog.get_featured()))
    }

    /// Catalog search.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Locked`] unless the wallet is connected.
    pub fn search(&self, query: &str) -> Result<Vec<ProductView>> {
        self.ensure_unlocked()?;
        Ok(self.views(self.catalog.search(query)))
    }

    /// Category listing.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Locked`] unless the wallet is connected.
    pub fn category(&self, slug: &str) -> Result<Vec<ProductView>> {
        self.ensure_unlocked()?;
        Ok(self.views(self.catalog.by_category(slug)))
    }

    /// Product detail.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Locked`] unless the wallet is connected, or
    /// [`CatalogError::NotFound`] for an unknown id.
    pub fn product(&self, id: &ProductId) -> Result<ProductView> {
        self.ensure_unlocked()?;
        let product = self.catalog.get_by_id(id)?;
        Ok(ProductView::new(product, &self.rates))
    }

    /// Add a catalog product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Locked`], [`CatalogError::NotFound`],
    /// [`SessionError::OutOfStock`], or the cart's validation error. The
    /// cart is unchanged on error.
    pub fn add_to_cart(&mut self, id: &ProductId, quantity: u32, color: Option<&str>) -> Result<CartLine> {
        self.ensure_unlocked()?;
        let product = self.catalog.get_by_id(id)?;
        if !product.in_stock {
            return Err(SessionError::OutOfStock(id.clone()));
        }
        Ok(self.cart.add_to_cart(product, quantity, color)?)
    }

    /// Set a line's quantity; zero or below removes it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Locked`] unless the wallet is connected.
    pub fn update_quantity(&mut self, id: &ProductId, color: Option<&str>, quantity: i64) -> Result<bool> {
        self.ensure_unlocked()?;
        Ok(self.cart.update_quantity(id, color, quantity))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Locked`] unless the wallet is connected.
    pub fn remove_line(&mut self, id: &ProductId, color: Option<&str>) -> Result<bool> {
        self.ensure_unlocked()?;
        Ok(self.cart.remove_line(id, color))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Locked`] unless the wallet is connected.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.ensure_unlocked()?;
        self.cart.clear();
        Ok(())
    }

    /// Cart display model.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Locked`] unless the wallet is connected.
    pub fn cart_view(&self) -> Result<CartView> {
        self.ensure_unlocked()?;
        Ok(self.cart.view(&self.catalog, &self.rates))
    }

    fn ensure_unlocked(&self) -> Result<()> {
        let status = self.wallet.status();
        if status.unlocks_content() {
            Ok(())
        } else {
            Err(SessionError::Locked(status))
        }
    }

    fn views<'a>(&self, products: impl IntoIterator<Item = &'a oakmint_core::Product>) -> Vec<ProductView> {
        products
            .into_iter()
            .map(|product| ProductView::new(product, &self.rates))
            .collect()
    }
}
