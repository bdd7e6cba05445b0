//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices and cart totals are always held in the canonical unit
//! (USD). Settlement currencies such as ETH and USDC are a display-only
//! transform applied through a [`RateTable`]; converted amounts are never
//! stored in cart state.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors raised by price arithmetic and conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    /// No conversion rate is configured for the currency.
    #[error("no conversion rate for {0}")]
    UnsupportedCurrency(CurrencyCode),
    /// Conversion rates must be strictly positive.
    #[error("conversion rate for {0} must be positive")]
    NonPositiveRate(CurrencyCode),
    /// The source price is not denominated in the canonical unit.
    #[error("expected a {expected} price, got {actual}")]
    CurrencyMismatch {
        /// Currency the operation requires.
        expected: CurrencyCode,
        /// Currency that was supplied.
        actual: CurrencyCode,
    },
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// Currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A price in the canonical unit.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply by a line quantity, saturating at the largest representable
    /// amount.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(
            self.amount.saturating_mul(Decimal::from(quantity)),
            self.currency_code,
        )
    }

    /// Format for display, e.g. `$1,299.00`, `0.5196 ETH`, `1299.00 USDC`.
    #[must_use]
    pub fn display(&self) -> String {
        let scale = self.currency_code.display_scale();
        let rounded = self
            .amount
            .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{rounded:.prec$}", prec = scale as usize);
        match self.currency_code {
            CurrencyCode::USD => {
                let (sign, digits) = text
                    .strip_prefix('-')
                    .map_or(("", text.as_str()), |rest| ("-", rest));
                format!("{sign}${}", group_thousands(digits))
            }
            CurrencyCode::ETH | CurrencyCode::USDC => {
                format!("{text} {}", self.currency_code.code())
            }
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `,` separators into the integer part of a plain decimal string.
fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if frac_part.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac_part}")
    }
}

/// Currencies the storefront prices in or displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Canonical catalog unit.
    #[default]
    USD,
    /// Ether.
    ETH,
    /// USD Coin.
    USDC,
}

impl CurrencyCode {
    /// Ticker / ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::ETH => "ETH",
            Self::USDC => "USDC",
        }
    }

    /// Number of decimal places shown for this currency.
    #[must_use]
    pub const fn display_scale(self) -> u32 {
        match self {
            Self::ETH => 4,
            Self::USD | Self::USDC => 2,
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Fixed-point conversion rates from the canonical unit to settlement
/// currencies, expressed as USD per one unit of the target currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    usd_per_unit: HashMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Default ETH rate: 1 ETH = 2500 USD.
    pub const ETH_USD: Decimal = Decimal::from_parts(2500, 0, 0, false, 0);
    /// Default USDC rate: 1 USDC = 1 USD.
    pub const USDC_USD: Decimal = Decimal::ONE;

    /// An empty table; only USD prices can be "converted".
    #[must_use]
    pub fn empty() -> Self {
        Self {
            usd_per_unit: HashMap::new(),
        }
    }

    /// Set the rate for a currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NonPositiveRate`] for zero or negative rates.
    pub fn with_rate(mut self, currency: CurrencyCode, usd_per_unit: Decimal) -> Result<Self, PriceError> {
        if usd_per_unit <= Decimal::ZERO {
            return Err(PriceError::NonPositiveRate(currency));
        }
        self.usd_per_unit.insert(currency, usd_per_unit);
        Ok(self)
    }

    /// Currencies this table can convert into (USD excluded), in a stable order.
    #[must_use]
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        [CurrencyCode::ETH, CurrencyCode::USDC]
            .into_iter()
            .filter(|code| self.usd_per_unit.contains_key(code))
            .collect()
    }

    /// Convert a canonical price into `target`, rounded to the target's
    /// display scale.
    ///
    /// # Errors
    ///
    /// Returns an error if `price` is not in USD or no rate is configured
    /// for `target`.
    pub fn convert(&self, price: Price, target: CurrencyCode) -> Result<Price, PriceError> {
        if price.currency_code != CurrencyCode::USD {
            return Err(PriceError::CurrencyMismatch {
                expected: CurrencyCode::USD,
                actual: price.currency_code,
            });
        }
        if target == CurrencyCode::USD {
            return Ok(price);
        }
        let rate = self
            .usd_per_unit
            .get(&target)
            .ok_or(PriceError::UnsupportedCurrency(target))?;
        let amount = (price.amount / rate)
            .round_dp_with_strategy(target.display_scale(), RoundingStrategy::MidpointAwayFromZero);
        Ok(Price::new(amount, target))
    }

    /// Convert into every configured settlement currency.
    #[must_use]
    pub fn convert_all(&self, price: Price) -> Vec<Price> {
        self.currencies()
            .into_iter()
            .filter_map(|code| self.convert(price, code).ok())
            .collect()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        let mut usd_per_unit = HashMap::new();
        usd_per_unit.insert(CurrencyCode::ETH, Self::ETH_USD);
        usd_per_unit.insert(CurrencyCode::USDC, Self::USDC_USD);
        Self { usd_per_unit }
    }
}
