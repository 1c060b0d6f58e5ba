//! Customer negotiation policies
//!
//! A customer carries exactly one [`Policy`], chosen when it is built. Each
//! policy answers the same four questions: which products to try first, what
//! to do with an incoming offer, what to counter with, and how patience moves
//! after a vendor offer.

mod budget_guardian;
mod rarity_hunter;
mod standard;

use crate::config::{PenaltyRange, PolicyConfig};
use crate::negotiation::customer::Customer;
use crate::negotiation::types::OfferDecision;
use crate::types::{Offer, Percentage, Product};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stubborn rounds a budget guardian insists on, drawn per customer
pub const GUARDIAN_ROUNDS_MIN: u32 = 3;
pub const GUARDIAN_ROUNDS_MAX: u32 = 5;

/// Policy family, without per-customer parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    Standard,
    BudgetGuardian,
    RarityHunter,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Standard => f.write_str("standard"),
            PolicyKind::BudgetGuardian => f.write_str("budget-guardian"),
            PolicyKind::RarityHunter => f.write_str("rarity-hunter"),
        }
    }
}

/// Negotiation strategy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    /// Baseline thresholds, catalog-order selection
    Standard,
    /// Tighter thresholds, refuses to accept before `min_counter_rounds` counters
    BudgetGuardian { min_counter_rounds: u32 },
    /// Rarest-first selection, overpays for scarce products
    RarityHunter,
}

/// What a patience update looks at
#[derive(Clone, Copy, Debug)]
pub struct PatienceInputs {
    pub current: Percentage,
    pub elasticity: Percentage,
    /// Price of the vendor offer this one follows, `None` on the first offer
    pub previous_vendor_price: Option<Decimal>,
    pub incoming_price: Decimal,
}

impl Policy {
    /// Build a policy of `kind`, drawing any per-customer parameters from `rng`
    pub fn from_kind<R: Rng + ?Sized>(kind: PolicyKind, rng: &mut R) -> Self {
        match kind {
            PolicyKind::Standard => Policy::Standard,
            PolicyKind::BudgetGuardian => Policy::BudgetGuardian {
                min_counter_rounds: rng.gen_range(GUARDIAN_ROUNDS_MIN..=GUARDIAN_ROUNDS_MAX),
            },
            PolicyKind::RarityHunter => Policy::RarityHunter,
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Standard => PolicyKind::Standard,
            Policy::BudgetGuardian { .. } => PolicyKind::BudgetGuardian,
            Policy::RarityHunter => PolicyKind::RarityHunter,
        }
    }

    /// Catalog products worth probing, best candidate first
    pub fn candidate_order(&self, customer: &Customer, catalog: &[Product]) -> Vec<Product> {
        match self {
            Policy::Standard | Policy::BudgetGuardian { .. } => {
                standard::candidate_order(customer, catalog, false)
            }
            Policy::RarityHunter => standard::candidate_order(customer, catalog, true),
        }
    }

    /// Verdict on `offer`. Every accept rule requires the price to fit the
    /// customer's budget, so `Accept` always implies an affordable price.
    pub fn evaluate(&self, customer: &Customer, offer: &Offer) -> OfferDecision {
        match self {
            Policy::Standard => {
                standard::evaluate(customer, offer, standard::thresholds(customer.config()))
            }
            Policy::BudgetGuardian { min_counter_rounds } => {
                budget_guardian::evaluate(customer, offer, *min_counter_rounds)
            }
            Policy::RarityHunter => rarity_hunter::evaluate(customer, offer),
        }
    }

    /// Price of the next counter against `vendor_offer`
    pub fn counter_price(
        &self,
        customer: &Customer,
        vendor_offer: &Offer,
        product: &Product,
    ) -> Decimal {
        match self {
            Policy::Standard => standard::counter_price(customer, vendor_offer, product),
            Policy::BudgetGuardian { .. } => {
                budget_guardian::counter_price(customer, vendor_offer, product)
            }
            Policy::RarityHunter => rarity_hunter::counter_price(customer, vendor_offer, product),
        }
    }

    pub fn patience_after<R: Rng + ?Sized>(
        &self,
        inputs: &PatienceInputs,
        config: &PolicyConfig,
        rng: &mut R,
    ) -> Percentage {
        match self {
            Policy::Standard => {
                base_patience_after(inputs, config, rng, standard::penalty_scale(inputs.elasticity))
            }
            Policy::BudgetGuardian { .. } => budget_guardian::patience_after(inputs, config, rng),
            Policy::RarityHunter => base_patience_after(
                inputs,
                config,
                rng,
                rarity_hunter::penalty_scale(inputs.elasticity),
            ),
        }
    }

    /// Whether a refused accept ends the negotiation instead of leaving it open.
    /// Only reachable if a policy ever accepts a price above budget.
    pub fn aborts_on_shortfall(&self) -> bool {
        matches!(self, Policy::BudgetGuardian { .. })
    }
}

/// Penalty draw shared by every policy: initial drop on the first offer,
/// a heavier hit when the vendor stalls, a lighter one when it moves.
fn base_patience_after<R: Rng + ?Sized>(
    inputs: &PatienceInputs,
    config: &PolicyConfig,
    rng: &mut R,
    scale: Decimal,
) -> Percentage {
    let penalty = match inputs.previous_vendor_price {
        None => draw(rng, config.initial_drop),
        Some(previous) => {
            let stalled = relative_change(previous, inputs.incoming_price) < config.stall_threshold;
            let range = if stalled {
                config.stall_penalty
            } else {
                config.move_penalty
            };
            scale_penalty(draw(rng, range), scale)
        }
    };

    let next = inputs.current.saturating_sub(penalty);
    tracing::debug!(
        "patience {} -> {} (penalty {})",
        inputs.current,
        next,
        penalty
    );
    next
}

fn relative_change(previous: Decimal, incoming: Decimal) -> Decimal {
    if previous.is_zero() {
        return if incoming.is_zero() {
            Decimal::ZERO
        } else {
            Decimal::ONE
        };
    }
    (incoming - previous).abs() / previous
}

fn draw<R: Rng + ?Sized>(rng: &mut R, range: PenaltyRange) -> u32 {
    rng.gen_range(range.min..=range.max)
}

fn scale_penalty(raw: u32, scale: Decimal) -> u32 {
    (Decimal::from(raw) * scale.max(Decimal::ZERO))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn inputs(previous: Option<Decimal>, incoming: Decimal) -> PatienceInputs {
        PatienceInputs {
            current: Percentage::FULL,
            elasticity: Percentage::new(50),
            previous_vendor_price: previous,
            incoming_price: incoming,
        }
    }

    #[test]
    fn test_policy_kind_names() {
        assert_eq!(PolicyKind::Standard.to_string(), "standard");
        assert_eq!(PolicyKind::BudgetGuardian.to_string(), "budget-guardian");
        assert_eq!(PolicyKind::RarityHunter.to_string(), "rarity-hunter");
        assert_eq!(
            serde_json::to_string(&PolicyKind::RarityHunter).unwrap(),
            "\"rarity-hunter\""
        );
    }

    #[test]
    fn test_guardian_rounds_drawn_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            match Policy::from_kind(PolicyKind::BudgetGuardian, &mut rng) {
                Policy::BudgetGuardian { min_counter_rounds } => {
                    let allowed = GUARDIAN_ROUNDS_MIN..=GUARDIAN_ROUNDS_MAX;
                    assert!(allowed.contains(&min_counter_rounds));
                }
                other => panic!("unexpected policy {:?}", other),
            }
        }
    }

    #[test]
    fn test_relative_change() {
        assert_eq!(relative_change(dec!(100), dec!(99.5)), dec!(0.005));
        assert_eq!(relative_change(dec!(100), dec!(120)), dec!(0.2));
        assert_eq!(relative_change(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(relative_change(Decimal::ZERO, dec!(3)), Decimal::ONE);
    }

    #[test]
    fn test_initial_drop_bounded() {
        let config = PolicyConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let first = inputs(None, dec!(50));
            let next = base_patience_after(&first, &config, &mut rng, Decimal::ONE);
            assert!(next.value() >= 100 - config.initial_drop.max as u8);
        }
    }

    #[test]
    fn test_stalling_hurts_more_than_moving() {
        let config = PolicyConfig {
            stall_penalty: PenaltyRange::new(15, 15),
            move_penalty: PenaltyRange::new(4, 4),
            ..PolicyConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let stalled = base_patience_after(
            &inputs(Some(dec!(100)), dec!(99.9)),
            &config,
            &mut rng,
            Decimal::ONE,
        );
        let moved = base_patience_after(
            &inputs(Some(dec!(100)), dec!(80)),
            &config,
            &mut rng,
            Decimal::ONE,
        );

        assert_eq!(stalled.value(), 85);
        assert_eq!(moved.value(), 96);
    }

    #[test]
    fn test_scale_penalty_rounds_half_away() {
        assert_eq!(scale_penalty(5, dec!(0.5)), 3);
        assert_eq!(scale_penalty(10, dec!(1.5)), 15);
        assert_eq!(scale_penalty(10, dec!(-1)), 0);
    }
}
