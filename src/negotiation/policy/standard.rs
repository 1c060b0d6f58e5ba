//! Baseline customer policy. The other policies build on these rules.

use crate::config::PolicyConfig;
use crate::negotiation::customer::Customer;
use crate::negotiation::pricing::{
    clamp_counter, min_meaningful_offer, opening_ratio, raw_concession_step, CounterBounds,
    StepBand,
};
use crate::negotiation::types::{OfferDecision, Preference};
use crate::types::{Offer, Percentage, Product};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub(super) const STEP_BAND: StepBand = StepBand::new(dec!(0.15), dec!(0.60));

/// Accept thresholds as shares of budget
#[derive(Clone, Copy, Debug)]
pub(super) struct AcceptThresholds {
    pub must_have: Decimal,
    pub liked: Decimal,
}

pub(super) fn thresholds(config: &PolicyConfig) -> AcceptThresholds {
    AcceptThresholds {
        must_have: config.must_have_accept_threshold,
        liked: config.like_accept_threshold,
    }
}

/// Must-haves, then liked, then neutral. Owned and disliked categories never
/// appear. Within a tier, catalog order unless `by_rarity`, which sorts
/// rarest first and keeps catalog order among ties.
pub(super) fn candidate_order(
    customer: &Customer,
    catalog: &[Product],
    by_rarity: bool,
) -> Vec<Product> {
    let pool: Vec<&Product> = catalog
        .iter()
        .filter(|p| !customer.owns_category(p.category()))
        .filter(|p| customer.preference(p.category()) != Preference::Disliked)
        .collect();

    let mut ordered = Vec::with_capacity(pool.len());
    for tier in [Preference::MustHave, Preference::Liked, Preference::Neutral] {
        let mut group: Vec<&Product> = pool
            .iter()
            .copied()
            .filter(|p| customer.preference(p.category()) == tier)
            .collect();
        if by_rarity {
            group.sort_by(|a, b| b.rarity().cmp(&a.rarity()));
        }
        ordered.extend(group.into_iter().cloned());
    }
    ordered
}

pub(super) fn evaluate(
    customer: &Customer,
    offer: &Offer,
    thresholds: AcceptThresholds,
) -> OfferDecision {
    let patience = customer.patience();
    if patience.is_zero() {
        return OfferDecision::Decline;
    }

    let price = offer.price();
    let budget = customer.budget();
    let low_patience = patience.value() < customer.config().low_patience_threshold;
    let preference = customer.preference(offer.product().category());

    match preference {
        Preference::MustHave if price <= budget => {
            if price <= budget * thresholds.must_have {
                OfferDecision::Accept
            } else {
                OfferDecision::Counter
            }
        }
        Preference::Liked if price <= budget * thresholds.liked => OfferDecision::Accept,
        Preference::Liked if price <= budget => OfferDecision::Counter,
        _ if preference == Preference::Disliked || price > budget || low_patience => {
            OfferDecision::Decline
        }
        _ => OfferDecision::Counter,
    }
}

pub(super) fn opening_candidate(vendor_price: Decimal, product: &Product) -> Decimal {
    vendor_price * opening_ratio(product.rarity())
}

/// Move `step` of the way from `previous` to `target`
pub(super) fn next_candidate(previous: Decimal, target: Decimal, step: Decimal) -> Decimal {
    previous + (target - previous) * step
}

pub(super) fn counter_price(
    customer: &Customer,
    vendor_offer: &Offer,
    product: &Product,
) -> Decimal {
    let vendor_price = vendor_offer.price();
    let previous = customer.last_customer_offer().map(Offer::price);

    let candidate = match previous {
        None => opening_candidate(vendor_price, product),
        Some(previous) => {
            let step = STEP_BAND.clamp(raw_concession_step(
                customer.elasticity(),
                customer.patience(),
            ));
            next_candidate(previous, vendor_price, step)
        }
    };

    clamp_counter(
        candidate,
        CounterBounds {
            previous,
            vendor_price,
            ceiling: vendor_price,
            budget: customer.budget(),
            floor: min_meaningful_offer(vendor_price),
        },
    )
}

/// Elastic customers lose patience faster
pub(super) fn penalty_scale(elasticity: Percentage) -> Decimal {
    dec!(0.5) + elasticity.fraction()
}
