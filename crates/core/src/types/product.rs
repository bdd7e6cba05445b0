//! Catalog product model.
//!
//! Products are immutable once loaded into the catalog. Field names follow
//! the catalog feed's camelCase JSON (`originalPrice`, `inStock`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Reasons a product record is rejected by [`Product::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("product id cannot be empty")]
    EmptyId,
    #[error("product {0} has no images")]
    NoImages(ProductId),
    #[error("product {0} declares an empty colour list")]
    EmptyColors(ProductId),
    #[error("product {0} has a non-positive dimension")]
    NonPositiveDimension(ProductId),
    #[error("product {0} has a rating outside 0-5")]
    RatingOutOfRange(ProductId),
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
    #[error("product {0} has an original price that is not above its price")]
    OriginalPriceNotHigher(ProductId),
}

/// Closed set of furniture categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sofas,
    Chairs,
    Tables,
    Beds,
    Storage,
    Lighting,
    Decor,
    Outdoor,
}

impl Category {
    /// Every category, in navigation order.
    pub const ALL: [Self; 8] = [
        Self::Sofas,
        Self::Chairs,
        Self::Tables,
        Self::Beds,
        Self::Storage,
        Self::Lighting,
        Self::Decor,
        Self::Outdoor,
    ];

    /// URL slug (also the serialized form).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Sofas => "sofas",
            Self::Chairs => "chairs",
            Self::Tables => "tables",
            Self::Beds => "beds",
            Self::Storage => "storage",
            Self::Lighting => "lighting",
            Self::Decor => "decor",
            Self::Outdoor => "outdoor",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sofas => "Sofas",
            Self::Chairs => "Chairs",
            Self::Tables => "Tables",
            Self::Beds => "Beds",
            Self::Storage => "Storage",
            Self::Lighting => "Lighting",
            Self::Decor => "Decor",
            Self::Outdoor => "Outdoor",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}

/// Physical dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    fn is_positive(&self) -> bool {
        [self.width, self.height, self.depth]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} × {} × {} cm", self.width, self.height, self.depth)
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Price in USD.
    pub price: Decimal,
    /// Pre-sale price in USD; present only when the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    pub rating: f64,
    pub reviews: u32,
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

const fn default_in_stock() -> bool {
    true
}

impl Product {
    /// Minimum and maximum rating values.
    pub const RATING_RANGE: (f64, f64) = (0.0, 5.0);

    /// Current price in the canonical unit.
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Pre-sale price, if the product is on sale.
    #[must_use]
    pub fn original_price(&self) -> Option<Price> {
        self.original_price.map(Price::usd)
    }

    /// Whether the product is discounted.
    #[must_use]
    pub const fn is_on_sale(&self) -> bool {
        self.original_price.is_some()
    }

    /// Amount saved against the original price.
    #[must_use]
    pub fn savings(&self) -> Option<Price> {
        self.original_price
            .map(|original| Price::usd(original - self.price))
    }

    /// Whether the product is highlighted on the home page.
    #[must_use]
    pub const fn is_featured(&self) -> bool {
        self.bestseller || self.new
    }

    /// Declared colour variants (empty when the product has none).
    #[must_use]
    pub fn colors(&self) -> &[String] {
        self.colors.as_deref().unwrap_or_default()
    }

    /// Declared materials (empty when the product has none).
    #[must_use]
    pub fn materials(&self) -> &[String] {
        self.materials.as_deref().unwrap_or_default()
    }

    /// First colour, used by detail views as the pre-selected variant.
    #[must_use]
    pub fn default_color(&self) -> Option<&str> {
        self.colors().first().map(String::as_str)
    }

    /// Stock keeping unit, e.g. `FRN-000042`.
    #[must_use]
    pub fn sku(&self) -> String {
        format!("FRN-{:0>6}", self.id.as_str())
    }

    /// Check the record against the catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductError`] found.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ProductError::EmptyId);
        }
        if self.images.is_empty() {
            return Err(ProductError::NoImages(self.id.clone()));
        }
        if self.colors.as_ref().is_some_and(Vec::is_empty) {
            return Err(ProductError::EmptyColors(self.id.clone()));
        }
        if self.dimensions.as_ref().is_some_and(|d| !d.is_positive()) {
            return Err(ProductError::NonPositiveDimension(self.id.clone()));
        }
        let (min, max) = Self::RATING_RANGE;
        if !(min..=max).contains(&self.rating) {
            return Err(ProductError::RatingOutOfRange(self.id.clone()));
        }
        if self.price.is_sign_negative() {
            return Err(ProductError::NegativePrice(self.id.clone()));
        }
        if self.original_price.is_some_and(|original| original <= self.price) {
            return Err(ProductError::OriginalPriceNotHigher(self.id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn armchair() -> Product {
        Product {
            id: ProductId::new("7"),
            name: "Nordic Armchair".to_string(),
            description: "Solid oak lounge chair".to_string(),
            category: Category::Chairs,
            price: Decimal::from(450),
            original_price: Some(Decimal::from(600)),
            images: vec!["https://img.example/armchair.jpg".to_string()],
            materials: Some(vec!["Oak".to_string(), "Wool".to_string()]),
            colors: Some(vec!["Natural".to_string(), "Charcoal".to_string()]),
            dimensions: Some(Dimensions {
                width: 70.0,
                height: 80.0,
                depth: 75.0,
            }),
            rating: 4.6,
            reviews: 31,
            new: false,
            bestseller: true,
            in_stock: true,
        }
    }

    #[test]
    fn test_valid_product() {
        assert!(armchair().validate().is_ok());
    }

    #[test]
    fn test_sku_pads_id() {
        assert_eq!(armchair().sku(), "FRN-000007");
    }

    #[test]
    fn test_savings() {
        let product = armchair();
        assert!(product.is_on_sale());
        assert_eq!(product.savings(), Some(Price::usd(Decimal::from(150))));
    }

    #[test]
    fn test_default_color() {
        assert_eq!(armchair().default_color(), Some("Natural"));
        let plain = Product {
            colors: None,
            ..armchair()
        };
        assert_eq!(plain.default_color(), None);
        assert!(plain.colors().is_empty());
    }

    #[test]
    fn test_validate_rejects_no_images() {
        let product = Product {
            images: Vec::new(),
            ..armchair()
        };
        assert!(matches!(product.validate(), Err(ProductError::NoImages(_))));
    }

    #[test]
    fn test_validate_rejects_empty_colors() {
        let product = Product {
            colors: Some(Vec::new()),
            ..armchair()
        };
        assert!(matches!(
            product.validate(),
            Err(ProductError::EmptyColors(_))
        ));
    }

    #[test]
    fn test_validate_rejects_original_price_not_higher() {
        let product = Product {
            original_price: Some(Decimal::from(450)),
            ..armchair()
        };
        assert!(matches!(
            product.validate(),
            Err(ProductError::OriginalPriceNotHigher(_))
        ));
    }

    #[test]
    fn test_validate_rejects_rating() {
        let product = Product {
            rating: 5.5,
            ..armchair()
        };
        assert!(matches!(
            product.validate(),
            Err(ProductError::RatingOutOfRange(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let product = Product {
            dimensions: Some(Dimensions {
                width: 0.0,
                height: 80.0,
                depth: 75.0,
            }),
            ..armchair()
        };
        assert!(matches!(
            product.validate(),
            Err(ProductError::NonPositiveDimension(_))
        ));
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("Chairs".parse::<Category>().unwrap(), Category::Chairs);
        assert!("thrones".parse::<Category>().is_err());
    }

    #[test]
    fn test_deserialize_feed_record() {
        let json = r#"{
            "id": "12",
            "name": "Arc Floor Lamp",
            "description": "Brass arc lamp",
            "category": "lighting",
            "price": "320",
            "images": ["https://img.example/lamp.jpg"],
            "rating": 4.2,
            "reviews": 8,
            "inStock": false
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, Category::Lighting);
        assert!(!product.in_stock);
        assert!(!product.new);
        assert!(product.colors.is_none());
        assert!(product.validate().is_ok());
    }
}
