//! Seeded generation of random customers for simulations

use crate::config::PolicyConfig;
use crate::error::Result;
use crate::negotiation::customer::{Customer, CustomerBuilder};
use crate::negotiation::policy::PolicyKind;
use crate::types::{Percentage, ProductType};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::ops::RangeInclusive;

const BUDGET_RANGE: RangeInclusive<u32> = 200..=2000;
const LIKES_RANGE: RangeInclusive<usize> = 2..=3;
const DISLIKES_RANGE: RangeInclusive<usize> = 1..=2;

/// Draws customers from one seeded stream. Two factories built with the same
/// seed hand out identical customers in the same order.
pub struct CustomerFactory {
    rng: StdRng,
    config: PolicyConfig,
}

impl CustomerFactory {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config: PolicyConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PolicyConfig) -> Self {
        self.config = config;
        self
    }

    /// One must-have, two or three likes and one or two dislikes, all
    /// different categories
    pub fn create_customer(
        &mut self,
        name: impl Into<String>,
        age: u32,
        policy: PolicyKind,
    ) -> Result<Customer> {
        let mut categories = ProductType::ALL.to_vec();
        categories.shuffle(&mut self.rng);

        let likes = self.rng.gen_range(LIKES_RANGE);
        let dislikes = self.rng.gen_range(DISLIKES_RANGE);
        let (must_have, rest) = categories.split_at(1);
        let (liked, rest) = rest.split_at(likes);
        let disliked = &rest[..dislikes];

        let budget = Decimal::from(self.rng.gen_range(BUDGET_RANGE));
        let elasticity = Percentage::new(self.rng.gen_range(0..=100));
        let seed = self.rng.gen::<u64>();

        CustomerBuilder::new(name, age)
            .budget(budget)
            .elasticity(elasticity)
            .must_haves(must_have.iter().copied())
            .likes(liked.iter().copied())
            .dislikes(disliked.iter().copied())
            .policy(policy)
            .config(self.config.clone())
            .seed(seed)
            .build()
    }
}
