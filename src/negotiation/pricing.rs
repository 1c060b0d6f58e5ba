//! Price arithmetic shared by the counter-offer policies
//!
//! All prices are exact decimals. Ratio curves are computed in decimals too,
//! and every emitted price is rounded to cents, half away from zero.

use crate::types::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Smallest counter-offer the customer will ever make
pub const MIN_COUNTER_PRICE: Decimal = dec!(0.01);

const MEANINGFUL_FLOOR: Decimal = dec!(0.50);
const MEANINGFUL_SHARE_OF_ASK: Decimal = dec!(0.10);

const OPENING_BASE_RATIO: Decimal = dec!(0.30);
const OPENING_RARITY_WEIGHT: Decimal = dec!(0.50);

const STEP_BASE: Decimal = dec!(0.20);
const STEP_ELASTICITY_WEIGHT: Decimal = dec!(0.25);
const STEP_IMPATIENCE_WEIGHT: Decimal = dec!(0.15);

/// Round to cents, midpoint away from zero
pub fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Lowest counter worth making against `vendor_price`: max(0.50, 10% of the ask)
pub fn min_meaningful_offer(vendor_price: Decimal) -> Decimal {
    round_price(MEANINGFUL_FLOOR.max(vendor_price * MEANINGFUL_SHARE_OF_ASK)).max(MIN_COUNTER_PRICE)
}

/// Share of the vendor's ask the first counter opens at: 30% for common
/// products up to 80% for the rarest
pub fn opening_ratio(rarity: Percentage) -> Decimal {
    OPENING_BASE_RATIO + OPENING_RARITY_WEIGHT * rarity.fraction()
}

/// Allowed range of the concession step for one policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepBand {
    pub min: Decimal,
    pub max: Decimal,
}

impl StepBand {
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, step: Decimal) -> Decimal {
        step.max(self.min).min(self.max)
    }
}

/// Fraction of the remaining gap conceded this round, before clamping.
/// Elastic and impatient customers concede faster.
pub fn raw_concession_step(elasticity: Percentage, patience: Percentage) -> Decimal {
    STEP_BASE
        + STEP_ELASTICITY_WEIGHT * elasticity.fraction()
        + STEP_IMPATIENCE_WEIGHT * (Decimal::ONE - patience.fraction())
}

/// Limits a counter-offer must respect
#[derive(Clone, Copy, Debug)]
pub struct CounterBounds {
    /// The customer's previous counter in this negotiation
    pub previous: Option<Decimal>,
    /// The vendor's current ask
    pub vendor_price: Decimal,
    /// Highest price the policy is willing to target, at most `vendor_price`
    pub ceiling: Decimal,
    pub budget: Decimal,
    pub floor: Decimal,
}

/// Truncate to whole cents, so the result never exceeds `price`
fn cents_at_most(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Clamp a candidate price into `bounds`.
///
/// Precedence, lowest to highest: ceiling, no regression below the previous
/// counter (while that counter is still under the ask), meaningful floor
/// (never above the ask), budget. The candidate is rounded to cents first and
/// every cap is truncated to cents, so the result is a whole-cent price that
/// never exceeds the ask, the ceiling or the budget.
pub fn clamp_counter(candidate: Decimal, bounds: CounterBounds) -> Decimal {
    let ask_cap = cents_at_most(bounds.ceiling.min(bounds.vendor_price));
    let mut price = round_price(candidate).min(ask_cap);

    if let Some(previous) = bounds.previous {
        if previous <= bounds.vendor_price {
            price = price.max(cents_at_most(previous));
        }
    }

    price = price.max(cents_at_most(bounds.floor.min(bounds.vendor_price)));

    price.min(cents_at_most(bounds.budget)).max(Decimal::ZERO)
}
