//! Conservative policy: tighter thresholds, a cushion below the vendor's ask,
//! and no accept before a minimum number of counters.

use super::standard::{self, AcceptThresholds};
use super::{base_patience_after, PatienceInputs};
use crate::config::PolicyConfig;
use crate::negotiation::customer::Customer;
use crate::negotiation::pricing::{
    clamp_counter, min_meaningful_offer, raw_concession_step, CounterBounds, StepBand,
};
use crate::negotiation::types::{OfferDecision, Preference};
use crate::types::{Offer, Percentage, Product};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

const STEP_BAND: StepBand = StepBand::new(dec!(0.10), dec!(0.40));
const OPENING_DISCOUNT: Decimal = dec!(0.95);
const MAX_CUSHION: Decimal = dec!(0.08);
const MIN_CUSHION: Decimal = dec!(0.01);

pub(super) fn evaluate(
    customer: &Customer,
    offer: &Offer,
    min_counter_rounds: u32,
) -> OfferDecision {
    if customer.patience().is_zero() {
        return OfferDecision::Decline;
    }

    let config = customer.config();
    let price = offer.price();
    let budget = customer.budget();
    let preference = customer.preference(offer.product().category());
    let rounds = customer.counter_offers_made();

    let decision = if preference != Preference::Disliked
        && price <= budget
        && close_to_own_counter(customer, price, config.guardian_epsilon)
    {
        OfferDecision::Accept
    } else {
        let tightened = AcceptThresholds {
            must_have: config.must_have_accept_threshold - config.guardian_tightening,
            liked: config.like_accept_threshold - config.guardian_tightening,
        };
        match standard::evaluate(customer, offer, tightened) {
            OfferDecision::Counter
                if rounds >= min_counter_rounds
                    && preference == Preference::Neutral
                    && price > budget * config.guardian_decline_fraction =>
            {
                OfferDecision::Decline
            }
            other => other,
        }
    };

    if decision == OfferDecision::Accept && rounds < min_counter_rounds {
        tracing::debug!(
            "{} holds out: {} of {} stubborn rounds",
            customer.name(),
            rounds,
            min_counter_rounds
        );
        return OfferDecision::Counter;
    }
    decision
}

/// The vendor met the customer's last counter, or came within `epsilon` of it
fn close_to_own_counter(customer: &Customer, price: Decimal, epsilon: Decimal) -> bool {
    match customer.last_customer_offer() {
        Some(own) if own.price() > Decimal::ZERO => {
            let own = own.price();
            price <= own || (price - own) / own <= epsilon
        }
        _ => false,
    }
}

/// Margin kept below the vendor's ask: wide while patient, narrowing as
/// counters pile up
fn cushion(patience: Percentage, rounds: u32) -> Decimal {
    let widened = MAX_CUSHION * (dec!(0.5) + dec!(0.5) * patience.fraction());
    let narrowed = widened / (Decimal::ONE + dec!(0.5) * Decimal::from(rounds));
    narrowed.max(MIN_CUSHION).min(MAX_CUSHION)
}

pub(super) fn counter_price(
    customer: &Customer,
    vendor_offer: &Offer,
    product: &Product,
) -> Decimal {
    let vendor_price = vendor_offer.price();
    let previous = customer.last_customer_offer().map(Offer::price);
    let floor = min_meaningful_offer(vendor_price);

    let (candidate, ceiling) = match previous {
        None => (
            standard::opening_candidate(vendor_price, product) * OPENING_DISCOUNT,
            vendor_price,
        ),
        Some(previous) => {
            let ceiling = vendor_price
                * (Decimal::ONE - cushion(customer.patience(), customer.counter_offers_made()));
            let step = STEP_BAND.clamp(raw_concession_step(
                customer.elasticity(),
                customer.patience(),
            ));
            (standard::next_candidate(previous, ceiling, step), ceiling)
        }
    };

    clamp_counter(
        candidate,
        CounterBounds {
            previous,
            vendor_price,
            ceiling,
            budget: customer.budget(),
            floor,
        },
    )
}

/// Standard penalty, then win back part of the gap to full patience
pub(super) fn patience_after<R: Rng + ?Sized>(
    inputs: &PatienceInputs,
    config: &PolicyConfig,
    rng: &mut R,
) -> Percentage {
    let scale = standard::penalty_scale(inputs.elasticity);
    let dropped = base_patience_after(inputs, config, rng, scale);
    let gap = Decimal::from(100 - dropped.value());
    let recovered = (gap * config.guardian_recovery)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0);
    dropped.saturating_add(recovered)
}
