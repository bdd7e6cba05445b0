//! Pure cart state: ordered lines keyed by `(product, colour)`.

use oakmint_core::{Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// One cart line.
///
/// The product is held by ID only; price and name come from the live catalog
/// at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
}

impl CartLine {
    fn has_key(&self, product_id: &ProductId, color: Option<&str>) -> bool {
        self.product_id == *product_id && self.selected_color.as_deref() == color
    }
}

/// Item count and subtotal joined against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of line quantities, including lines whose product is missing.
    pub item_count: u64,
    /// Sum of `quantity × price` over lines whose product is in the catalog.
    pub subtotal: Price,
    /// Products referenced by the cart but absent from the catalog.
    pub missing: Vec<ProductId>,
}

/// Ordered cart lines. Insertion order is display order.
///
/// Invariants: no two lines share a key, and every quantity is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a cart from stored lines, restoring the invariants.
    ///
    /// Zero-quantity lines are dropped and duplicate keys are merged into
    /// the first occurrence.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut state = Self::new();
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            state.add(line.product_id, line.quantity, line.selected_color);
        }
        state
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for a key, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId, color: Option<&str>) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.has_key(product_id, color))
    }

    /// Add `quantity` of a key, merging into an existing line.
    ///
    /// A zero quantity is treated as one. Returns the resulting line.
    pub fn add(&mut self, product_id: ProductId, quantity: u32, color: Option<String>) -> CartLine {
        let quantity = quantity.max(1);
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.has_key(&product_id, color.as_deref()))
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return line.clone();
        }

        let line = CartLine {
            product_id,
            quantity,
            selected_color: color,
        };
        self.lines.push(line.clone());
        line
    }

    /// Set a line's quantity exactly; zero or below removes the line.
    ///
    /// Returns `false` when no line has this key.
    pub fn set_quantity(&mut self, product_id: &ProductId, color: Option<&str>, quantity: i64) -> bool {
        let Some(index) = self.lines.iter().position(|l| l.has_key(product_id, color)) else {
            return false;
        };

        if quantity <= 0 {
            self.lines.remove(index);
        } else if let Some(line) = self.lines.get_mut(index) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        true
    }

    /// Remove a line. Returns `false` when no line has this key.
    pub fn remove(&mut self, product_id: &ProductId, color: Option<&str>) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| !l.has_key(product_id, color));
        self.lines.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Totals against the live catalog.
    ///
    /// Lines whose product has left the catalog still count towards
    /// `item_count` but contribute nothing to `subtotal`; they are listed in
    /// `missing` and left in place.
    #[must_use]
    pub fn totals(&self, catalog: &Catalog) -> CartTotals {
        let mut item_count = 0u64;
        let mut subtotal = Decimal::ZERO;
        let mut missing = Vec::new();

        for line in &self.lines {
            item_count += u64::from(line.quantity);
            match catalog.find(&line.product_id) {
                Some(product) => {
                    let line_total = product.price.saturating_mul(Decimal::from(line.quantity));
                    subtotal = subtotal.saturating_add(line_total);
                }
                None => {
                    if !missing.contains(&line.product_id) {
                        missing.push(line.product_id.clone());
                    }
                }
            }
        }

        CartTotals {
            item_count,
            subtotal: Price::usd(subtotal),
            missing,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;

    fn id(s: &str) -> ProductId {
        ProductId::new(s)
    }

    #[test]
    fn test_add_merges_same_key() {
        let mut cart = CartState::new();
        cart.add(id("1"), 1, Some("Oak".into()));
        cart.add(id("1"), 2, Some("Oak".into()));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(&id("1"), Some("Oak")).unwrap().quantity, 3);
    }

    #[test]
    fn test_colour_is_part_of_the_key() {
        let mut cart = CartState::new();
        cart.add(id("1"), 1, Some("Oak".into()));
        cart.add(id("1"), 1, Some("Walnut".into()));
        cart.add(id("1"), 1, None);

        assert_eq!(cart.lines().len(), 3);
        assert_eq!(
            cart.lines()
                .iter()
                .map(|l| l.selected_color.as_deref())
                .collect::<Vec<_>>(),
            vec![Some("Oak"), Some("Walnut"), None]
        );
    }

    #[test]
    fn test_add_clamps_zero_quantity() {
        let mut cart = CartState::new();
        assert_eq!(cart.add(id("1"), 0, None).quantity, 1);
    }

    #[test]
    fn test_add_saturates() {
        let mut cart = CartState::new();
        cart.add(id("1"), u32::MAX - 1, None);
        cart.add(id("1"), 5, None);
        assert_eq!(cart.line(&id("1"), None).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = CartState::new();
        cart.add(id("1"), 1, None);

        assert!(cart.set_quantity(&id("1"), None, 7));
        assert_eq!(cart.line(&id("1"), None).unwrap().quantity, 7);

        assert!(!cart.set_quantity(&id("2"), None, 7));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_set_quantity_zero_removes_and_readd_is_fresh() {
        let mut cart = CartState::new();
        cart.add(id("1"), 4, Some("Oak".into()));
        cart.add(id("2"), 1, None);

        assert!(cart.set_quantity(&id("1"), Some("Oak"), 0));
        assert!(cart.line(&id("1"), Some("Oak")).is_none());

        cart.add(id("1"), 1, Some("Oak".into()));
        assert_eq!(cart.line(&id("1"), Some("Oak")).unwrap().quantity, 1);
        // Fresh line goes to the end.
        assert_eq!(cart.lines().last().unwrap().product_id, id("1"));
    }

    #[test]
    fn test_set_quantity_negative_removes() {
        let mut cart = CartState::new();
        cart.add(id("1"), 1, None);
        assert!(cart.set_quantity(&id("1"), None, -3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = CartState::new();
        cart.add(id("1"), 1, None);
        cart.add(id("2"), 1, None);

        assert!(cart.remove(&id("1"), None));
        assert!(!cart.remove(&id("1"), None));
        assert_eq!(cart.lines().len(), 1);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_follow_live_catalog() {
        let full = Catalog::from_products(vec![product("A", "Armchair", 1000), product("B", "Bench", 250)])
            .unwrap();
        let mut cart = CartState::new();
        cart.add(id("A"), 2, None);
        cart.add(id("B"), 1, None);

        let totals = cart.totals(&full);
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.subtotal, Price::usd(Decimal::from(2250)));
        assert!(totals.missing.is_empty());

        let shrunk = Catalog::from_products(vec![product("A", "Armchair", 1000)]).unwrap();
        let totals = cart.totals(&shrunk);
        assert_eq!(totals.subtotal, Price::usd(Decimal::from(2000)));
        assert_eq!(totals.missing, vec![id("B")]);
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn test_totals_saturate_on_extreme_prices() {
        let mut pricey = product("A", "Armchair", 0);
        pricey.price = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
        let catalog = Catalog::from_products(vec![pricey, product("B", "Bench", 250)]).unwrap();

        let mut cart = CartState::new();
        cart.add(id("A"), u32::MAX, None);
        cart.add(id("B"), 1, None);

        let totals = cart.totals(&catalog);
        assert_eq!(totals.item_count, u64::from(u32::MAX) + 1);
        assert_eq!(totals.subtotal, Price::usd(Decimal::MAX));
    }

    #[test]
    fn test_from_lines_restores_invariants() {
        let lines = vec![
            CartLine {
                product_id: id("1"),
                quantity: 2,
                selected_color: None,
            },
            CartLine {
                product_id: id("2"),
                quantity: 0,
                selected_color: None,
            },
            CartLine {
                product_id: id("1"),
                quantity: 3,
                selected_color: None,
            },
        ];

        let cart = CartState::from_lines(lines);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(&id("1"), None).unwrap().quantity, 5);
    }

    #[test]
    fn test_serializes_as_line_array() {
        let mut cart = CartState::new();
        cart.add(id("7"), 2, Some("Sage".into()));
        cart.add(id("8"), 1, None);

        let json = serde_json::to_string(&cart).unwrap();
        assert_eq!(
            json,
            r#"[{"productId":"7","quantity":2,"selectedColor":"Sage"},{"productId":"8","quantity":1}]"#
        );
    }
}
