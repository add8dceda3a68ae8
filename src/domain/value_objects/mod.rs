//! Value Objects for the storefront client

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Server-assigned product identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub fn new(value: u64) -> Self { Self(value) }
    pub fn value(&self) -> u64 { self.0 }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(&self.0.to_string()) }
}

/// Identity of one cart line (not of the product it holds)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(u64);

impl CartItemId {
    pub fn new(value: u64) -> Self { Self(value) }
    pub fn value(&self) -> u64 { self.0 }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(&self.0.to_string()) }
}

/// Non-negative unit price. Travels as a JSON number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() { return Err(PriceError::Negative); }
        Ok(Self(amount))
    }
    pub fn zero() -> Self { Self(Decimal::ZERO) }
    pub fn amount(&self) -> Decimal { self.0 }
    /// Line amount, saturating at `Decimal::MAX`.
    pub fn times(&self, qty: u32) -> Decimal { self.0.checked_mul(Decimal::from(qty)).unwrap_or(Decimal::MAX) }
}

impl Default for Price { fn default() -> Self { Self::zero() } }

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(&format!("{:.2}", self.0)) }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Price::new(amount).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum PriceError { Negative }
impl std::error::Error for PriceError {}
impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "price must not be negative") }
}

/// Unit count: stock on hand or units held in a cart line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: u32) -> Self { Self(self.0.saturating_add(other)) }
    /// Subtraction floored at zero.
    pub fn saturating_sub(&self, other: u32) -> Self { Self(self.0.saturating_sub(other)) }
    pub fn is_zero(&self) -> bool { self.0 == 0 }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(&self.0.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rejects_negative() {
        assert_eq!(Price::new(Decimal::new(-1, 2)), Err(PriceError::Negative));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_price_json_number() {
        let p: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(p.amount(), Decimal::new(1999, 2));
        assert_eq!(p.times(3), Decimal::new(5997, 2));
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }

    #[test]
    fn test_price_times_saturates() {
        let p = Price::new(Decimal::MAX).unwrap();
        assert_eq!(p.times(2), Decimal::MAX);
        assert_eq!(p.times(0), Decimal::ZERO);
    }

    #[test]
    fn test_quantity_floor() {
        let q = Quantity::new(3);
        assert_eq!(q.saturating_sub(5), Quantity::new(0));
        assert_eq!(q.saturating_sub(2), Quantity::new(1));
        assert_eq!(q.add(u32::MAX), Quantity::new(u32::MAX));
    }
}
