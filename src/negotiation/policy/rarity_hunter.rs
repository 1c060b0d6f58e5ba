//! Scarcity-seeking policy: rarest products first, willing to overpay for them.

use super::standard;
use crate::negotiation::customer::Customer;
use crate::negotiation::pricing::{
    clamp_counter, min_meaningful_offer, raw_concession_step, round_price, CounterBounds,
};
use crate::negotiation::types::{OfferDecision, Preference};
use crate::types::{Offer, Percentage, Product};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const RARITY_STEP_BIAS: Decimal = dec!(0.10);
const BASE_CUSHION: Decimal = dec!(0.05);
const CUSHION_RARITY_WEIGHT: Decimal = dec!(0.10);
const MAX_CUSHION: Decimal = dec!(0.10);

/// Standard verdict, except a counter on a rare enough must-have or liked
/// product becomes an accept within a relaxed share of budget
pub(super) fn evaluate(customer: &Customer, offer: &Offer) -> OfferDecision {
    let config = customer.config();
    let base = standard::evaluate(customer, offer, standard::thresholds(config));
    if base != OfferDecision::Counter
        || offer.product().rarity().value() < config.rarity_hunter_threshold
    {
        return base;
    }

    let price = offer.price();
    let budget = customer.budget();
    let relax = config.rarity_hunter_relaxation;

    match customer.preference(offer.product().category()) {
        Preference::MustHave if price <= budget * (config.must_have_accept_threshold + relax) => {
            tracing::debug!("{} overpays for rare {}", customer.name(), offer.product());
            OfferDecision::Accept
        }
        Preference::Liked if price <= budget * (config.like_accept_threshold + relax) => {
            tracing::debug!("{} overpays for rare {}", customer.name(), offer.product());
            OfferDecision::Accept
        }
        _ => base,
    }
}

/// 5% below the ask at rarity 50, up to 10% for common items and down to
/// nothing for the rarest; wider while patient, narrower each round
fn cushion(rarity: Percentage, patience: Percentage, rounds: u32) -> Decimal {
    let offset = Decimal::from(50 - i64::from(rarity.value())) / Decimal::ONE_HUNDRED;
    let base = (BASE_CUSHION + offset * CUSHION_RARITY_WEIGHT)
        .max(Decimal::ZERO)
        .min(MAX_CUSHION);
    base * (dec!(0.5) + dec!(0.5) * patience.fraction())
        / (Decimal::ONE + dec!(0.5) * Decimal::from(rounds))
}

pub(super) fn counter_price(
    customer: &Customer,
    vendor_offer: &Offer,
    product: &Product,
) -> Decimal {
    let vendor_price = vendor_offer.price();
    let previous = customer.last_customer_offer().map(Offer::price);
    let rarity = product.rarity();

    let candidate = match previous {
        None => standard::opening_candidate(vendor_price, product),
        Some(previous) => {
            let step = standard::STEP_BAND.clamp(
                raw_concession_step(customer.elasticity(), customer.patience())
                    + RARITY_STEP_BIAS * rarity.fraction(),
            );
            standard::next_candidate(previous, vendor_price, step)
        }
    };

    let ceiling = round_price(
        vendor_price
            * (Decimal::ONE
                - cushion(rarity, customer.patience(), customer.counter_offers_made())),
    );

    clamp_counter(
        candidate,
        CounterBounds {
            previous,
            vendor_price,
            ceiling,
            budget: customer.budget(),
            floor: min_meaningful_offer(vendor_price),
        },
    )
}

/// Hunters care about the item more than the price: elastic ones lose
/// patience slower than the standard customer
pub(super) fn penalty_scale(elasticity: Percentage) -> Decimal {
    dec!(1.5) - elasticity.fraction()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation::customer::CustomerBuilder;
    use crate::negotiation::policy::PolicyKind;
    use crate::types::{PersonType, ProductType};

    fn hunter() -> Customer {
        CustomerBuilder::new("Rhea", 29)
            .budget(dec!(1000))
            .elasticity(Percentage::new(50))
            .must_have(ProductType::Jewelry)
            .like(ProductType::Books)
            .policy(PolicyKind::RarityHunter)
            .seed(21)
            .build()
            .unwrap()
    }

    fn offer(category: ProductType, rarity: i64, price: Decimal) -> Offer {
        Offer::new(
            Product::new("Item", category, Percentage::new(rarity)),
            price,
            PersonType::Vendor,
        )
    }

    #[test]
    fn test_overpays_for_rare_must_have() {
        let c = hunter();
        let decide = |rarity, price| evaluate(&c, &offer(ProductType::Jewelry, rarity, price));
        assert_eq!(decide(95, dec!(880)), OfferDecision::Accept);
        assert_eq!(decide(95, dec!(920)), OfferDecision::Counter);
        assert_eq!(decide(60, dec!(880)), OfferDecision::Counter);
    }

    #[test]
    fn test_overpays_for_rare_liked() {
        let c = hunter();
        assert_eq!(evaluate(&c, &offer(ProductType::Books, 90, dec!(790))), OfferDecision::Accept);
        assert_eq!(evaluate(&c, &offer(ProductType::Books, 90, dec!(810))), OfferDecision::Counter);
    }

    #[test]
    fn test_neutral_not_upgraded() {
        let c = hunter();
        assert_eq!(evaluate(&c, &offer(ProductType::Food, 99, dec!(100))), OfferDecision::Counter);
    }

    #[test]
    fn test_cushion_shrinks_with_rarity() {
        let full = Percentage::FULL;
        assert_eq!(cushion(Percentage::new(50), full, 0), dec!(0.05));
        assert_eq!(cushion(Percentage::ZERO, full, 0), dec!(0.10));
        assert_eq!(cushion(Percentage::FULL, full, 0), Decimal::ZERO);
        assert!(cushion(Percentage::new(50), full, 3) < dec!(0.05));
    }

    #[test]
    fn test_opening_counter_capped_below_ask() {
        let c = hunter();
        let rare = offer(ProductType::Jewelry, 100, dec!(500));
        // 80% of the ask; cushion is zero at full rarity
        assert_eq!(counter_price(&c, &rare, rare.product()), dec!(400.00));
    }

    /// Share of the remaining gap the second counter closes
    fn second_round_concession(rarity: i64) -> (Decimal, Customer) {
        let mut c = hunter();
        let first = c.respond_to_offer(&offer(ProductType::Food, rarity, dec!(1000))).unwrap();
        let ask = dec!(950);
        let second = c.respond_to_offer(&offer(ProductType::Food, rarity, ask)).unwrap();

        let ceiling = ask * (Decimal::ONE - cushion(Percentage::new(rarity), c.patience(), 1));
        assert!(second.is_ongoing());
        assert!(second.price() <= ceiling);
        assert!(second.price() >= first.price());

        let share = (second.price() - first.price()) / (ask - first.price());
        (share, c)
    }

    #[test]
    fn test_follow_up_counter_under_cushion() {
        let (_, c) = second_round_concession(60);
        assert_eq!(c.counter_offers_made(), 2);
    }

    #[test]
    fn test_rare_items_concede_faster() {
        let (rare, rare_customer) = second_round_concession(95);
        let (common, common_customer) = second_round_concession(10);

        assert_eq!(rare_customer.patience(), common_customer.patience());
        assert!(rare > common);
    }

    #[test]
    fn test_penalty_scale_falls_with_elasticity() {
        assert!(penalty_scale(Percentage::FULL) < penalty_scale(Percentage::ZERO));
    }
}
