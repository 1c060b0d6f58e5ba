//! Core types used throughout haggle

use crate::error::HaggleError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer percentage clamped to `[0, 100]`.
///
/// Construction never fails: out-of-range input saturates at the nearest bound.
/// Deserialization goes through the same clamp, so configuration files cannot
/// smuggle in a patience of 250.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "i64", into = "i64")]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const FULL: Percentage = Percentage(100);

    /// Create a percentage, clamping into range
    pub fn new(value: i64) -> Self {
        Percentage(value.clamp(0, 100) as u8)
    }

    /// Raw value in `[0, 100]`
    pub fn value(self) -> u8 {
        self.0
    }

    /// Value as an exact fraction in `[0, 1]`
    pub fn fraction(self) -> Decimal {
        Decimal::from(self.0) / Decimal::ONE_HUNDRED
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(self, amount: u32) -> Self {
        Percentage::new(i64::from(self.0) - i64::from(amount))
    }

    pub fn saturating_add(self, amount: u32) -> Self {
        Percentage::new(i64::from(self.0) + i64::from(amount))
    }
}

impl From<i64> for Percentage {
    fn from(value: i64) -> Self {
        Percentage::new(value)
    }
}

impl From<Percentage> for i64 {
    fn from(p: Percentage) -> Self {
        i64::from(p.0)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Product category. Preference and inventory matching are keyed on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductType {
    Food,
    Electronics,
    Clothing,
    Furniture,
    Toys,
    Books,
    Tools,
    SportsEquipment,
    Jewelry,
    BeautyProducts,
}

impl ProductType {
    pub const ALL: [ProductType; 10] = [
        ProductType::Food,
        ProductType::Electronics,
        ProductType::Clothing,
        ProductType::Furniture,
        ProductType::Toys,
        ProductType::Books,
        ProductType::Tools,
        ProductType::SportsEquipment,
        ProductType::Jewelry,
        ProductType::BeautyProducts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Food => "Food",
            ProductType::Electronics => "Electronics",
            ProductType::Clothing => "Clothing",
            ProductType::Furniture => "Furniture",
            ProductType::Toys => "Toys",
            ProductType::Books => "Books",
            ProductType::Tools => "Tools",
            ProductType::SportsEquipment => "SportsEquipment",
            ProductType::Jewelry => "Jewelry",
            ProductType::BeautyProducts => "BeautyProducts",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = HaggleError;

    /// Accepts `SportsEquipment`, `sports-equipment`, `sports_equipment`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        ProductType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| HaggleError::InvalidArgument(format!("unknown product type: {}", s)))
    }
}

/// A product offered by a vendor
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    name: String,
    category: ProductType,
    rarity: Percentage,
}

impl Product {
    pub fn new(name: impl Into<String>, category: ProductType, rarity: Percentage) -> Self {
        Self {
            name: name.into(),
            category,
            rarity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ProductType {
        self.category
    }

    pub fn rarity(&self) -> Percentage {
        self.rarity
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, rarity {})", self.name, self.category, self.rarity)
    }
}

/// Offer status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferStatus {
    /// Parties may keep countering
    Ongoing,
    /// The trade completes at this offer's price
    Accepted,
    /// Negotiation ended without a trade
    Stopped,
}

/// Which side made an offer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonType {
    Customer,
    Vendor,
}

impl fmt::Display for PersonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonType::Customer => f.write_str("Customer"),
            PersonType::Vendor => f.write_str("Vendor"),
        }
    }
}

/// One negotiation turn's proposal.
///
/// Offers are values: status and price transitions produce a new `Offer`
/// rather than mutating one shared between the parties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    status: OfferStatus,
    product: Product,
    price: Decimal,
    offered_by: PersonType,
}

impl Offer {
    /// Create an ongoing offer
    pub fn new(product: Product, price: Decimal, offered_by: PersonType) -> Self {
        Self {
            status: OfferStatus::Ongoing,
            product,
            price,
            offered_by,
        }
    }

    pub fn status(&self) -> OfferStatus {
        self.status
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn offered_by(&self) -> PersonType {
        self.offered_by
    }

    pub fn is_ongoing(&self) -> bool {
        self.status == OfferStatus::Ongoing
    }

    pub fn accepted(&self) -> Offer {
        Offer {
            status: OfferStatus::Accepted,
            ..self.clone()
        }
    }

    pub fn stopped(&self) -> Offer {
        Offer {
            status: OfferStatus::Stopped,
            ..self.clone()
        }
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} offers {} for {} [{:?}]",
            self.offered_by,
            self.product.name(),
            self.price,
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percentage_clamps() {
        assert_eq!(Percentage::new(-20).value(), 0);
        assert_eq!(Percentage::new(250).value(), 100);
        assert_eq!(Percentage::new(42).value(), 42);
        assert_eq!(Percentage::new(80).fraction(), dec!(0.8));
    }

    #[test]
    fn test_percentage_saturating_arithmetic() {
        assert_eq!(Percentage::new(10).saturating_sub(25), Percentage::ZERO);
        assert_eq!(Percentage::new(90).saturating_add(25), Percentage::FULL);
        assert_eq!(Percentage::new(50).saturating_sub(5).value(), 45);
    }

    #[test]
    fn test_percentage_deserialization_clamps() {
        let p: Percentage = serde_json::from_str("250").unwrap();
        assert_eq!(p, Percentage::FULL);
        let p: Percentage = serde_json::from_str("-3").unwrap();
        assert_eq!(p, Percentage::ZERO);
    }

    #[test]
    fn test_product_type_parsing() {
        assert_eq!(
            "sports-equipment".parse::<ProductType>().unwrap(),
            ProductType::SportsEquipment
        );
        assert_eq!("TOYS".parse::<ProductType>().unwrap(), ProductType::Toys);
        assert_eq!(
            "beauty_products".parse::<ProductType>().unwrap(),
            ProductType::BeautyProducts
        );
        assert!(matches!(
            "spaceships".parse::<ProductType>(),
            Err(HaggleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_offer_transitions_return_new_values() {
        let product = Product::new("Lamp", ProductType::Furniture, Percentage::new(10));
        let offer = Offer::new(product, dec!(40), PersonType::Vendor);

        let accepted = offer.accepted();

        assert_eq!(offer.status(), OfferStatus::Ongoing);
        assert_eq!(accepted.status(), OfferStatus::Accepted);
        assert_eq!(accepted.price(), dec!(40));
        assert_eq!(accepted.offered_by(), PersonType::Vendor);
        assert_eq!(offer.stopped().status(), OfferStatus::Stopped);
    }

    #[test]
    fn test_offer_serialization() {
        let product = Product::new("Ring", ProductType::Jewelry, Percentage::new(95));
        let offer = Offer::new(product, dec!(199.99), PersonType::Customer);

        let serialized = serde_json::to_string(&offer).unwrap();
        let deserialized: Offer = serde_json::from_str(&serialized).unwrap();

        assert_eq!(offer, deserialized);
    }
}
