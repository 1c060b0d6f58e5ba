//! Customer agent: preference state, wallet, and the per-offer turn protocol

use crate::config::PolicyConfig;
use crate::error::{HaggleError, Result};
use crate::negotiation::policy::{PatienceInputs, Policy, PolicyKind};
use crate::negotiation::types::{OfferDecision, Preference};
use crate::types::{Offer, OfferStatus, PersonType, Percentage, Product, ProductType};
use crate::vendor::Vendor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// A haggling customer.
///
/// Identity state (budget, inventory, preferences) lasts for the customer's
/// lifetime. Negotiation state (patience, last offers, counter count) covers
/// a single in-flight negotiation and is reset whenever a trade is accepted
/// or stopped.
#[derive(Clone, Debug)]
pub struct Customer {
    name: String,
    age: u32,
    patience: Percentage,
    budget: Decimal,
    likes: BTreeSet<ProductType>,
    dislikes: BTreeSet<ProductType>,
    must_haves: BTreeSet<ProductType>,
    elasticity: Percentage,
    inventory: Vec<Product>,
    last_vendor_offer: Option<Offer>,
    last_customer_offer: Option<Offer>,
    counter_offers_made: u32,
    policy: Policy,
    config: PolicyConfig,
    rng: StdRng,
}

impl Customer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn patience(&self) -> Percentage {
        self.patience
    }

    /// Override patience, e.g. to resume a negotiation from a snapshot
    pub fn set_patience(&mut self, patience: Percentage) {
        self.patience = patience;
    }

    pub fn budget(&self) -> Decimal {
        self.budget
    }

    pub fn elasticity(&self) -> Percentage {
        self.elasticity
    }

    pub fn likes(&self) -> &BTreeSet<ProductType> {
        &self.likes
    }

    pub fn dislikes(&self) -> &BTreeSet<ProductType> {
        &self.dislikes
    }

    pub fn must_haves(&self) -> &BTreeSet<ProductType> {
        &self.must_haves
    }

    pub fn inventory(&self) -> &[Product] {
        &self.inventory
    }

    pub fn last_vendor_offer(&self) -> Option<&Offer> {
        self.last_vendor_offer.as_ref()
    }

    pub fn last_customer_offer(&self) -> Option<&Offer> {
        self.last_customer_offer.as_ref()
    }

    pub fn counter_offers_made(&self) -> u32 {
        self.counter_offers_made
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Preference tier of a category. Must-have wins over liked.
    pub fn preference(&self, category: ProductType) -> Preference {
        if self.must_haves.contains(&category) {
            Preference::MustHave
        } else if self.likes.contains(&category) {
            Preference::Liked
        } else if self.dislikes.contains(&category) {
            Preference::Disliked
        } else {
            Preference::Neutral
        }
    }

    pub fn owns_category(&self, category: ProductType) -> bool {
        self.inventory.iter().any(|p| p.category() == category)
    }

    /// Pick the product to negotiate for, recording the vendor's opening
    /// offer for it as `last_vendor_offer`.
    ///
    /// Candidates are probed in policy order; the first whose opening ask
    /// fits the budget wins.
    pub fn choose_product(&mut self, vendor: &mut dyn Vendor) -> Result<Product> {
        self.reset_negotiation();
        let candidates = self.policy.candidate_order(self, vendor.products());

        for product in candidates {
            let opening = vendor.opening_offer(&product, self);
            if opening.price() <= self.budget {
                tracing::debug!(
                    "{} picks {} at an opening ask of {}",
                    self.name,
                    product,
                    opening.price()
                );
                self.last_vendor_offer = Some(opening);
                return Ok(product);
            }
            tracing::debug!(
                "{} skips {}: ask {} exceeds budget {}",
                self.name,
                product.name(),
                opening.price(),
                self.budget
            );
        }

        Err(HaggleError::NoViableProduct(format!(
            "{} finds nothing to buy from {} with a budget of {}",
            self.name,
            vendor.name(),
            self.budget
        )))
    }

    /// Handle one vendor offer: update patience, record it, decide, act.
    ///
    /// Returns the offer marked accepted, the offer marked stopped, or a new
    /// counter-offer from this customer.
    pub fn respond_to_offer(&mut self, offer: &Offer) -> Result<Offer> {
        Self::validate_incoming(offer)?;

        self.update_patience(offer);
        self.last_vendor_offer = Some(offer.clone());

        match self.evaluate_offer(offer) {
            // Accepts are always affordable; the shortfall arms guard accept_trade's own check
            OfferDecision::Accept => match self.accept_trade(offer) {
                Ok(()) => Ok(offer.accepted()),
                Err(HaggleError::BudgetShortfall { .. }) if self.policy.aborts_on_shortfall() => {
                    self.stop_trade();
                    Ok(offer.stopped())
                }
                Err(HaggleError::BudgetShortfall { .. }) => self.counter(offer),
                Err(e) => Err(e),
            },
            OfferDecision::Decline => {
                self.stop_trade();
                Ok(offer.stopped())
            }
            OfferDecision::Counter => self.counter(offer),
        }
    }

    fn counter(&mut self, offer: &Offer) -> Result<Offer> {
        let counter = self.build_counter_offer(offer.product())?;
        self.last_customer_offer = Some(counter.clone());
        Ok(counter)
    }

    fn validate_incoming(offer: &Offer) -> Result<()> {
        if offer.offered_by() != PersonType::Vendor {
            return Err(HaggleError::InvalidArgument(
                "customer can only respond to vendor offers".to_string(),
            ));
        }
        if !offer.is_ongoing() {
            return Err(HaggleError::InvalidArgument(format!(
                "cannot respond to a {:?} offer",
                offer.status()
            )));
        }
        if offer.price() < Decimal::ZERO {
            return Err(HaggleError::InvalidArgument(format!(
                "negative price {}",
                offer.price()
            )));
        }
        Ok(())
    }

    pub fn evaluate_offer(&self, offer: &Offer) -> OfferDecision {
        let decision = self.policy.evaluate(self, offer);
        tracing::debug!(
            "{} ({}) weighs {} at {}: {:?}",
            self.name,
            self.policy.kind(),
            offer.product().name(),
            offer.price(),
            decision
        );
        decision
    }

    /// Build the next counter-offer for `product` against the recorded vendor offer
    pub fn build_counter_offer(&mut self, product: &Product) -> Result<Offer> {
        let vendor_offer = self.last_vendor_offer.as_ref().ok_or_else(|| {
            HaggleError::InvalidState("vendor must make the first offer".to_string())
        })?;

        let price = self.policy.counter_price(self, vendor_offer, product);
        self.counter_offers_made += 1;

        tracing::debug!(
            "{} counters {} with {} (round {})",
            self.name,
            product.name(),
            price,
            self.counter_offers_made
        );
        Ok(Offer::new(product.clone(), price, PersonType::Customer))
    }

    /// Apply the policy's patience penalty for `offer`.
    ///
    /// The opening offer recorded by product selection is not a previous
    /// offer: nothing has been countered yet, so it gets the initial drop.
    pub fn update_patience(&mut self, offer: &Offer) {
        let previous_vendor_price = match (&self.last_vendor_offer, &self.last_customer_offer) {
            (Some(previous), Some(_)) => Some(previous.price()),
            _ => None,
        };
        let inputs = PatienceInputs {
            current: self.patience,
            elasticity: self.elasticity,
            previous_vendor_price,
            incoming_price: offer.price(),
        };
        self.patience = self
            .policy
            .patience_after(&inputs, &self.config, &mut self.rng);
    }

    /// Complete the trade at `offer`'s price.
    ///
    /// Refused with `BudgetShortfall` when the price exceeds the budget, in
    /// which case nothing changes.
    pub fn accept_trade(&mut self, offer: &Offer) -> Result<()> {
        if offer.status() == OfferStatus::Stopped {
            return Err(HaggleError::InvalidArgument(
                "cannot accept a stopped offer".to_string(),
            ));
        }
        if offer.price() < Decimal::ZERO {
            return Err(HaggleError::InvalidArgument(format!(
                "negative price {}",
                offer.price()
            )));
        }
        if offer.price() > self.budget {
            tracing::warn!(
                "{} cannot accept {} for {}: budget is {}",
                self.name,
                offer.product().name(),
                offer.price(),
                self.budget
            );
            return Err(HaggleError::BudgetShortfall {
                required: offer.price(),
                available: self.budget,
            });
        }

        self.budget -= offer.price();
        self.inventory.push(offer.product().clone());
        self.reset_negotiation();

        tracing::info!(
            "{} accepts the trade: {} for {}",
            self.name,
            offer.product().name(),
            offer.price()
        );
        Ok(())
    }

    /// Walk away from the current negotiation
    pub fn stop_trade(&mut self) {
        self.reset_negotiation();
        tracing::info!("{} stopped negotiating", self.name);
    }

    fn reset_negotiation(&mut self) {
        self.last_vendor_offer = None;
        self.last_customer_offer = None;
        self.patience = Percentage::FULL;
        self.counter_offers_made = 0;
    }
}

enum PolicyChoice {
    Kind(PolicyKind),
    Explicit(Policy),
}

/// Explicit constructor for [`Customer`]
pub struct CustomerBuilder {
    name: String,
    age: u32,
    budget: Decimal,
    elasticity: Percentage,
    likes: BTreeSet<ProductType>,
    dislikes: BTreeSet<ProductType>,
    must_haves: BTreeSet<ProductType>,
    policy: PolicyChoice,
    config: PolicyConfig,
    seed: Option<u64>,
}

impl CustomerBuilder {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
            budget: Decimal::ZERO,
            elasticity: Percentage::new(50),
            likes: BTreeSet::new(),
            dislikes: BTreeSet::new(),
            must_haves: BTreeSet::new(),
            policy: PolicyChoice::Kind(PolicyKind::Standard),
            config: PolicyConfig::default(),
            seed: None,
        }
    }

    pub fn budget(mut self, budget: Decimal) -> Self {
        self.budget = budget;
        self
    }

    pub fn elasticity(mut self, elasticity: Percentage) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn like(mut self, category: ProductType) -> Self {
        self.likes.insert(category);
        self
    }

    pub fn likes(mut self, categories: impl IntoIterator<Item = ProductType>) -> Self {
        self.likes.extend(categories);
        self
    }

    pub fn dislike(mut self, category: ProductType) -> Self {
        self.dislikes.insert(category);
        self
    }

    pub fn dislikes(mut self, categories: impl IntoIterator<Item = ProductType>) -> Self {
        self.dislikes.extend(categories);
        self
    }

    pub fn must_have(mut self, category: ProductType) -> Self {
        self.must_haves.insert(category);
        self
    }

    pub fn must_haves(mut self, categories: impl IntoIterator<Item = ProductType>) -> Self {
        self.must_haves.extend(categories);
        self
    }

    /// Policy family; per-customer parameters are drawn from the customer's RNG
    pub fn policy(mut self, kind: PolicyKind) -> Self {
        self.policy = PolicyChoice::Kind(kind);
        self
    }

    /// Fully specified policy
    pub fn strategy(mut self, policy: Policy) -> Self {
        self.policy = PolicyChoice::Explicit(policy);
        self
    }

    pub fn config(mut self, config: PolicyConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed for patience jitter; unseeded customers draw from OS entropy
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Customer> {
        if self.budget < Decimal::ZERO {
            return Err(HaggleError::InvalidArgument(format!(
                "budget must not be negative, got {}",
                self.budget
            )));
        }

        if let Some(conflict) = self
            .dislikes
            .iter()
            .find(|c| self.likes.contains(c) || self.must_haves.contains(c))
        {
            return Err(HaggleError::InvalidArgument(format!(
                "{} is both disliked and wanted",
                conflict
            )));
        }

        self.config.validate()?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let policy = match self.policy {
            PolicyChoice::Kind(kind) => Policy::from_kind(kind, &mut rng),
            PolicyChoice::Explicit(policy) => policy,
        };

        Ok(Customer {
            name: self.name,
            age: self.age,
            patience: Percentage::FULL,
            budget: self.budget,
            likes: self.likes,
            dislikes: self.dislikes,
            must_haves: self.must_haves,
            elasticity: self.elasticity,
            inventory: Vec::new(),
            last_vendor_offer: None,
            last_customer_offer: None,
            counter_offers_made: 0,
            policy,
            config: self.config,
            rng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::MarketVendor;
    use rust_decimal_macros::dec;

    fn electronics_fan() -> Customer {
        CustomerBuilder::new("Ada", 34)
            .budget(dec!(1000))
            .elasticity(Percentage::new(40))
            .must_have(ProductType::Electronics)
            .dislike(ProductType::Toys)
            .seed(42)
            .build()
            .unwrap()
    }

    fn vendor_offer(category: ProductType, price: Decimal) -> Offer {
        Offer::new(
            Product::new("Gadget", category, Percentage::new(30)),
            price,
            PersonType::Vendor,
        )
    }

    #[test]
    fn test_must_have_within_threshold_accepted() {
        let mut c = electronics_fan();
        let reply = c.respond_to_offer(&vendor_offer(ProductType::Electronics, dec!(750))).unwrap();

        assert_eq!(reply.status(), OfferStatus::Accepted);
        assert_eq!(c.budget(), dec!(250));
        assert_eq!(c.inventory().len(), 1);
    }

    #[test]
    fn test_must_have_above_threshold_countered() {
        let mut c = electronics_fan();
        let reply = c.respond_to_offer(&vendor_offer(ProductType::Electronics, dec!(950))).unwrap();

        assert_eq!(reply.status(), OfferStatus::Ongoing);
        assert_eq!(reply.offered_by(), PersonType::Customer);
        assert!(reply.price() < dec!(950));
        assert!(reply.price() >= dec!(95));
        assert_eq!(c.counter_offers_made(), 1);
        assert_eq!(c.last_customer_offer(), Some(&reply));
    }

    #[test]
    fn test_disliked_declined() {
        let mut c = electronics_fan();
        let reply = c.respond_to_offer(&vendor_offer(ProductType::Toys, dec!(5))).unwrap();

        assert_eq!(reply.status(), OfferStatus::Stopped);
        assert_eq!(c.budget(), dec!(1000));
        assert!(c.last_vendor_offer().is_none());
    }

    #[test]
    fn test_zero_patience_declines_anything() {
        let mut c = electronics_fan();
        c.set_patience(Percentage::ZERO);
        let decision = c.evaluate_offer(&vendor_offer(ProductType::Electronics, dec!(1)));
        assert_eq!(decision, OfferDecision::Decline);
    }

    #[test]
    fn test_first_offer_applies_initial_drop() {
        let mut c = electronics_fan();
        let max_drop = c.config().initial_drop.max;
        c.update_patience(&vendor_offer(ProductType::Food, dec!(10)));

        assert!(c.patience().value() <= 100);
        assert!(u32::from(c.patience().value()) >= 100 - max_drop);
    }

    #[test]
    fn test_counter_requires_vendor_offer() {
        let mut c = electronics_fan();
        let product = Product::new("Radio", ProductType::Electronics, Percentage::new(10));
        assert!(matches!(
            c.build_counter_offer(&product),
            Err(HaggleError::InvalidState(_))
        ));
        assert_eq!(c.counter_offers_made(), 0);
    }

    #[test]
    fn test_rejects_malformed_offer_without_mutation() {
        let mut c = electronics_fan();
        let from_customer = Offer::new(
            Product::new("Radio", ProductType::Electronics, Percentage::new(10)),
            dec!(10),
            PersonType::Customer,
        );
        assert!(matches!(
            c.respond_to_offer(&from_customer),
            Err(HaggleError::InvalidArgument(_))
        ));

        let stopped = vendor_offer(ProductType::Electronics, dec!(10)).stopped();
        assert!(c.respond_to_offer(&stopped).is_err());

        let negative = vendor_offer(ProductType::Electronics, dec!(-1));
        assert!(c.respond_to_offer(&negative).is_err());

        assert_eq!(c.patience(), Percentage::FULL);
        assert!(c.last_vendor_offer().is_none());
    }

    #[test]
    fn test_accept_trade_budget_shortfall() {
        let mut c = electronics_fan();
        let offer = vendor_offer(ProductType::Electronics, dec!(1500));

        let result = c.accept_trade(&offer);

        assert!(matches!(result, Err(HaggleError::BudgetShortfall { .. })));
        assert_eq!(c.budget(), dec!(1000));
        assert!(c.inventory().is_empty());
    }

    #[test]
    fn test_reset_after_accept_and_stop() {
        let mut c = electronics_fan();
        c.respond_to_offer(&vendor_offer(ProductType::Electronics, dec!(950))).unwrap();
        assert!(c.last_customer_offer().is_some());

        c.stop_trade();
        assert!(c.last_vendor_offer().is_none());
        assert!(c.last_customer_offer().is_none());
        assert_eq!(c.patience(), Percentage::FULL);
        assert_eq!(c.counter_offers_made(), 0);

        c.respond_to_offer(&vendor_offer(ProductType::Electronics, dec!(950))).unwrap();
        c.accept_trade(&vendor_offer(ProductType::Electronics, dec!(900))).unwrap();
        assert!(c.last_vendor_offer().is_none());
        assert!(c.last_customer_offer().is_none());
        assert_eq!(c.patience(), Percentage::FULL);
        assert_eq!(c.counter_offers_made(), 0);
    }

    #[test]
    fn test_successive_counters_climb() {
        let mut c = electronics_fan();
        let first = c.respond_to_offer(&vendor_offer(ProductType::Electronics, dec!(980))).unwrap();
        let second = c
            .respond_to_offer(&vendor_offer(ProductType::Electronics, dec!(960)))
            .unwrap();

        assert_eq!(second.status(), OfferStatus::Ongoing);
        assert!(second.price() >= first.price());
        assert!(second.price() < dec!(960));
        assert_eq!(c.counter_offers_made(), 2);
    }

    #[test]
    fn test_choose_product_prefers_must_have() {
        let mut c = electronics_fan();
        let mut vendor = MarketVendor::new(
            "Stall",
            vec![
                Product::new("Bread", ProductType::Food, Percentage::new(5)),
                Product::new("Radio", ProductType::Electronics, Percentage::new(10)),
            ],
        );

        let chosen = c.choose_product(&mut vendor).unwrap();

        assert_eq!(chosen.name(), "Radio");
        let opening = c.last_vendor_offer().unwrap();
        assert_eq!(opening.product(), &chosen);
        assert!(opening.price() <= c.budget());
    }

    #[test]
    fn test_choose_product_skips_unaffordable() {
        let mut c = CustomerBuilder::new("Bo", 19)
            .budget(dec!(100))
            .must_have(ProductType::Jewelry)
            .seed(3)
            .build()
            .unwrap();
        let mut vendor = MarketVendor::new(
            "Stall",
            vec![
                Product::new("Ring", ProductType::Jewelry, Percentage::new(90)),
                Product::new("Bread", ProductType::Food, Percentage::new(5)),
            ],
        );

        let chosen = c.choose_product(&mut vendor).unwrap();
        assert_eq!(chosen.name(), "Bread");
    }

    #[test]
    fn test_choose_product_no_viable() {
        let mut c = CustomerBuilder::new("Bo", 19)
            .budget(dec!(1))
            .dislike(ProductType::Food)
            .seed(3)
            .build()
            .unwrap();
        let mut vendor = MarketVendor::demo();

        let result = c.choose_product(&mut vendor);
        assert!(matches!(result, Err(HaggleError::NoViableProduct(_))));
        assert!(c.last_vendor_offer().is_none());
    }

    #[test]
    fn test_choose_product_skips_owned_categories() {
        let mut c = electronics_fan();
        let mut vendor = MarketVendor::new(
            "Stall",
            vec![
                Product::new("Radio", ProductType::Electronics, Percentage::new(10)),
                Product::new("Phone", ProductType::Electronics, Percentage::new(10)),
                Product::new("Bread", ProductType::Food, Percentage::new(5)),
            ],
        );
        c.accept_trade(&vendor_offer(ProductType::Electronics, dec!(100))).unwrap();

        let chosen = c.choose_product(&mut vendor).unwrap();
        assert_eq!(chosen.name(), "Bread");
    }

    #[test]
    fn test_builder_rejects_conflicting_preferences() {
        let result = CustomerBuilder::new("Cy", 40)
            .budget(dec!(10))
            .like(ProductType::Books)
            .dislike(ProductType::Books)
            .build();
        assert!(matches!(result, Err(HaggleError::InvalidArgument(_))));

        let negative = CustomerBuilder::new("Cy", 40).budget(dec!(-5)).build();
        assert!(negative.is_err());
    }

    #[test]
    fn test_guardian_aborts_on_shortfall_path() {
        let c = CustomerBuilder::new("Greta", 61)
            .budget(dec!(10))
            .policy(PolicyKind::BudgetGuardian)
            .seed(8)
            .build()
            .unwrap();
        assert!(c.policy().aborts_on_shortfall());
        assert!(!electronics_fan().policy().aborts_on_shortfall());
    }
}
