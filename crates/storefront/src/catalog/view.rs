//! Product display models.

use oakmint_core::{Price, Product, RateTable};
use serde::Serialize;

/// Product display data for cards and the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    /// Struck-through pre-sale price.
    pub original_price: Option<String>,
    pub savings: Option<String>,
    /// Price in each settlement currency, e.g. `0.5196 ETH`.
    pub crypto_prices: Vec<String>,
    pub crypto_original_prices: Vec<String>,
    pub image: Option<String>,
    pub colors: Vec<String>,
    /// Pre-selected colour in the detail view.
    pub default_color: Option<String>,
    pub materials: Option<String>,
    pub dimensions: Option<String>,
    pub rating: String,
    pub reviews: u32,
    pub badges: Vec<&'static str>,
    pub in_stock: bool,
}

impl ProductView {
    /// Format a product for display.
    #[must_use]
    pub fn new(product: &Product, rates: &RateTable) -> Self {
        let price = product.price();
        let original = product.original_price();

        let mut badges = Vec::new();
        if product.new {
            badges.push("New");
        }
        if product.bestseller {
            badges.push("Bestseller");
        }
        if product.is_on_sale() {
            badges.push("Sale");
        }

        Self {
            id: product.id.to_string(),
            sku: product.sku(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.label().to_string(),
            price: price.display(),
            original_price: original.map(|p| p.display()),
            savings: product.savings().map(|p| p.display()),
            crypto_prices: display_all(rates, price),
            crypto_original_prices: original.map(|p| display_all(rates, p)).unwrap_or_default(),
            image: product.images.first().cloned(),
            colors: product.colors().to_vec(),
            default_color: product.default_color().map(str::to_string),
            materials: (!product.materials().is_empty()).then(|| product.materials().join(", ")),
            dimensions: product.dimensions.as_ref().map(ToString::to_string),
            rating: format!("{:.1}", product.rating),
            reviews: product.reviews,
            badges,
            in_stock: product.in_stock,
        }
    }
}

fn display_all(rates: &RateTable, price: Price) -> Vec<String> {
    rates.convert_all(price).iter().map(Price::display).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::tests::product;

    #[test]
    fn test_sale_product_view() {
        let mut p = product("42", "Cloud Sofa", 1299);
        p.original_price = Some(Decimal::from(1599));
        p.bestseller = true;
        p.colors = Some(vec!["Sand".into(), "Slate".into()]);
        p.materials = Some(vec!["Oak".into(), "Linen".into()]);

        let view = ProductView::new(&p, &RateTable::default());
        assert_eq!(view.sku, "FRN-000042");
        assert_eq!(view.price, "$1,299.00");
        assert_eq!(view.original_price.as_deref(), Some("$1,599.00"));
        assert_eq!(view.savings.as_deref(), Some("$300.00"));
        assert_eq!(view.crypto_prices, vec!["0.5196 ETH", "1299.00 USDC"]);
        assert_eq!(view.crypto_original_prices, vec!["0.6396 ETH", "1599.00 USDC"]);
        assert_eq!(view.default_color.as_deref(), Some("Sand"));
        assert_eq!(view.materials.as_deref(), Some("Oak, Linen"));
        assert_eq!(view.badges, vec!["Bestseller", "Sale"]);
        assert_eq!(view.rating, "4.0");
    }

    #[test]
    fn test_plain_product_view() {
        let view = ProductView::new(&product("7", "Stool", 275), &RateTable::empty());
        assert_eq!(view.original_price, None);
        assert_eq!(view.savings, None);
        assert!(view.crypto_prices.is_empty());
        assert!(view.crypto_original_prices.is_empty());
        assert_eq!(view.default_color, None);
        assert_eq!(view.materials, None);
        assert!(view.badges.is_empty());
    }
}
