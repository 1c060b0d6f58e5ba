//! Vendor side of a negotiation
//!
//! The customer only sees a vendor through the [`Vendor`] trait. The crate
//! ships [`MarketVendor`], a deterministic stall keeper used by the simulator
//! and the tests.

use crate::negotiation::customer::Customer;
use crate::negotiation::pricing::round_price;
use crate::types::{Offer, OfferStatus, PersonType, Percentage, Product, ProductType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Counterparty of a customer
pub trait Vendor {
    fn name(&self) -> &str;

    /// Catalog, read-only for customers
    fn products(&self) -> &[Product];

    /// Opening ask for `product`. May be called once per candidate while the
    /// customer probes affordability, so it must not depend on call order.
    fn opening_offer(&mut self, product: &Product, customer: &Customer) -> Offer;

    /// Reply to a customer offer: the offer marked accepted, a stop, or a new ask
    fn respond_to_offer(&mut self, offer: &Offer, customer: &Customer) -> Offer;

    fn accept_trade(&mut self, offer: &Offer);

    fn stop_trade(&mut self);
}

const DEFAULT_MARKUP: Decimal = dec!(1.5);
const DEFAULT_FLOOR_SHARE: Decimal = dec!(0.9);
const DEFAULT_CONCESSION: Decimal = dec!(0.25);
const DEFAULT_PATIENCE_PER_ROUND: u32 = 10;
/// Offers within this share of the next ask are taken
const ACCEPT_TOLERANCE: Decimal = dec!(0.01);

/// List price before rarity
fn category_base_price(category: ProductType) -> Decimal {
    match category {
        ProductType::Food => dec!(8),
        ProductType::Electronics => dec!(450),
        ProductType::Clothing => dec!(60),
        ProductType::Furniture => dec!(300),
        ProductType::Toys => dec!(35),
        ProductType::Books => dec!(20),
        ProductType::Tools => dec!(90),
        ProductType::SportsEquipment => dec!(120),
        ProductType::Jewelry => dec!(600),
        ProductType::BeautyProducts => dec!(40),
    }
}

/// Marks up, concedes a fixed share of the gap each round, never sells under
/// its floor, and walks away when out of patience
#[derive(Clone, Debug)]
pub struct MarketVendor {
    name: String,
    patience: Percentage,
    products: Vec<Product>,
    markup: Decimal,
    floor_share: Decimal,
    concession: Decimal,
    patience_per_round: u32,
    last_offer: Option<Offer>,
    revenue: Decimal,
    sold: Vec<Product>,
}

impl MarketVendor {
    pub fn new(name: impl Into<String>, products: Vec<Product>) -> Self {
        Self {
            name: name.into(),
            patience: Percentage::FULL,
            products,
            markup: DEFAULT_MARKUP,
            floor_share: DEFAULT_FLOOR_SHARE,
            concession: DEFAULT_CONCESSION,
            patience_per_round: DEFAULT_PATIENCE_PER_ROUND,
            last_offer: None,
            revenue: Decimal::ZERO,
            sold: Vec::new(),
        }
    }

    /// A stall with one or two products in every category
    pub fn demo() -> Self {
        let p = |name: &str, category, rarity| {
            Product::new(name, category, Percentage::new(rarity))
        };
        Self::new(
            "Bazaar",
            vec![
                p("Spiced Dates", ProductType::Food, 12),
                p("Saffron Tin", ProductType::Food, 78),
                p("Transistor Radio", ProductType::Electronics, 35),
                p("Prototype Phone", ProductType::Electronics, 93),
                p("Wool Coat", ProductType::Clothing, 20),
                p("Oak Chest", ProductType::Furniture, 55),
                p("Tin Robot", ProductType::Toys, 64),
                p("Atlas Folio", ProductType::Books, 88),
                p("Paperback Novel", ProductType::Books, 4),
                p("Brass Compass", ProductType::Tools, 47),
                p("Racing Bicycle", ProductType::SportsEquipment, 30),
                p("Opal Ring", ProductType::Jewelry, 96),
                p("Rose Oil", ProductType::BeautyProducts, 41),
            ],
        )
    }

    pub fn with_concession(mut self, concession: Decimal) -> Self {
        self.concession = concession;
        self
    }

    pub fn with_patience_per_round(mut self, points: u32) -> Self {
        self.patience_per_round = points;
        self
    }

    /// Category base scaled up to double for the rarest items
    pub fn list_price(&self, product: &Product) -> Decimal {
        let base = category_base_price(product.category());
        round_price(base * (Decimal::ONE + product.rarity().fraction()))
    }

    /// Opening ask: list price with markup
    pub fn asking_price(&self, product: &Product) -> Decimal {
        round_price(self.list_price(product) * self.markup)
    }

    fn floor_price(&self, product: &Product) -> Decimal {
        round_price(self.list_price(product) * self.floor_share)
    }

    pub fn patience(&self) -> Percentage {
        self.patience
    }

    pub fn revenue(&self) -> Decimal {
        self.revenue
    }

    pub fn sold(&self) -> &[Product] {
        &self.sold
    }

    fn reset(&mut self) {
        self.last_offer = None;
        self.patience = Percentage::FULL;
    }
}

impl Vendor for MarketVendor {
    fn name(&self) -> &str {
        &self.name
    }

    fn products(&self) -> &[Product] {
        &self.products
    }

    fn opening_offer(&mut self, product: &Product, _customer: &Customer) -> Offer {
        self.reset();
        let offer = Offer::new(product.clone(), self.asking_price(product), PersonType::Vendor);
        self.last_offer = Some(offer.clone());
        offer
    }

    fn respond_to_offer(&mut self, offer: &Offer, customer: &Customer) -> Offer {
        let product = offer.product();
        let floor = self.floor_price(product);
        let ask = match &self.last_offer {
            Some(last) => last.price(),
            None => self.asking_price(product),
        };

        self.patience = self.patience.saturating_sub(self.patience_per_round);

        let next = round_price(ask - (ask - offer.price()) * self.concession).max(floor);
        if offer.price() >= floor && offer.price() >= next * (Decimal::ONE - ACCEPT_TOLERANCE) {
            tracing::debug!(
                "{} takes {}'s offer of {}",
                self.name,
                customer.name(),
                offer.price()
            );
            return offer.accepted();
        }

        if self.patience.is_zero() {
            tracing::debug!("{} has had enough of {}", self.name, customer.name());
            return offer.stopped();
        }

        let reply = Offer::new(product.clone(), next, PersonType::Vendor);
        self.last_offer = Some(reply.clone());
        reply
    }

    fn accept_trade(&mut self, offer: &Offer) {
        if offer.status() == OfferStatus::Stopped {
            return;
        }
        self.revenue += offer.price();
        self.sold.push(offer.product().clone());
        self.reset();
    }

    fn stop_trade(&mut self) {
        self.reset();
    }
}
