//! Wallet account address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`WalletAddress`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The input string is empty.
    #[error("address cannot be empty")]
    Empty,
    /// The input does not start with `0x`.
    #[error("address must start with 0x")]
    MissingPrefix,
    /// The input has the wrong number of hex digits.
    #[error("address must have {expected} hex digits (got {actual})")]
    WrongLength {
        /// Required number of hex digits.
        expected: usize,
        /// Number of digits supplied.
        actual: usize,
    },
    /// The input contains a non-hex character.
    #[error("address contains a non-hex character: {0:?}")]
    InvalidCharacter(char),
}

/// An externally-owned account address reported by a wallet provider.
///
/// Addresses are `0x` followed by 40 hex digits. Providers may return
/// checksummed (mixed-case) addresses, so the value is normalized to
/// lowercase on parse and two addresses compare equal regardless of the
/// case they were reported in.
///
/// ## Examples
///
/// ```
/// use oakmint_core::WalletAddress;
///
/// let a = WalletAddress::parse("0x52908400098527886E0F7030069857D2E4169EE7").unwrap();
/// let b = WalletAddress::parse("0x52908400098527886e0f7030069857d2e4169ee7").unwrap();
/// assert_eq!(a, b);
///
/// assert!(WalletAddress::parse("").is_err());
/// assert!(WalletAddress::parse("52908400098527886e0f7030069857d2e4169ee7").is_err());
/// assert!(WalletAddress::parse("0x1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Number of hex digits after the `0x` prefix.
    pub const HEX_DIGITS: usize = 40;

    /// Parse a `WalletAddress` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, lacks the `0x` prefix, has the
    /// wrong length, or contains a non-hex character.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;

        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidCharacter(bad));
        }

        if digits.len() != Self::HEX_DIGITS {
            return Err(AddressError::WrongLength {
                expected: Self::HEX_DIGITS,
                actual: digits.len(),
            });
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// Returns the normalized address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for compact display, e.g. `0x5290…9ee7`.
    #[must_use]
    pub fn short(&self) -> String {
        let head = self.0.get(..6).unwrap_or(&self.0);
        let tail = self.0.get(self.0.len().saturating_sub(4)..).unwrap_or("");
        format!("{head}…{tail}")
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for WalletAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(address: WalletAddress) -> Self {
        address.0
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
