//! Tunable thresholds for the customer negotiation policies

use crate::error::{HaggleError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive range of patience points
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyRange {
    pub min: u32,
    pub max: u32,
}

impl PenaltyRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Policy configuration.
///
/// Every field has a default so a JSON file only needs the values it
/// overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Must-have offers at or below this share of budget are accepted
    pub must_have_accept_threshold: Decimal,
    /// Liked offers at or below this share of budget are accepted
    pub like_accept_threshold: Decimal,
    /// Below this patience a non-preferred offer is declined
    pub low_patience_threshold: u8,

    /// Points the budget guardian subtracts from both accept thresholds
    pub guardian_tightening: Decimal,
    /// Relative gap to its own last counter the guardian treats as agreement
    pub guardian_epsilon: Decimal,
    /// Share of lost patience the guardian wins back after every update
    pub guardian_recovery: Decimal,
    /// Once stubborn rounds are over, neutral offers above this share of budget are declined
    pub guardian_decline_fraction: Decimal,

    /// Rarity at which the rarity hunter overpays
    pub rarity_hunter_threshold: u8,
    /// How far past the tier threshold the rarity hunter will go
    pub rarity_hunter_relaxation: Decimal,

    /// Relative vendor price move under which the vendor counts as stalling
    pub stall_threshold: Decimal,
    pub initial_drop: PenaltyRange,
    pub stall_penalty: PenaltyRange,
    pub move_penalty: PenaltyRange,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            must_have_accept_threshold: dec!(0.80),
            like_accept_threshold: dec!(0.70),
            low_patience_threshold: 30,
            guardian_tightening: dec!(0.10),
            guardian_epsilon: dec!(0.03),
            guardian_recovery: dec!(0.20),
            guardian_decline_fraction: dec!(0.90),
            rarity_hunter_threshold: 90,
            rarity_hunter_relaxation: dec!(0.10),
            stall_threshold: dec!(0.01),
            initial_drop: PenaltyRange::new(0, 5),
            stall_penalty: PenaltyRange::new(5, 20),
            move_penalty: PenaltyRange::new(0, 8),
        }
    }
}

impl PolicyConfig {
    /// Load and validate a configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: PolicyConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fractions = [
            ("must_have_accept_threshold", self.must_have_accept_threshold),
            ("like_accept_threshold", self.like_accept_threshold),
            ("guardian_epsilon", self.guardian_epsilon),
            ("guardian_recovery", self.guardian_recovery),
            ("guardian_decline_fraction", self.guardian_decline_fraction),
            ("stall_threshold", self.stall_threshold),
        ];
        for (name, value) in fractions {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(HaggleError::InvalidConfig(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }

        let offsets = [
            ("guardian_tightening", self.guardian_tightening),
            ("rarity_hunter_relaxation", self.rarity_hunter_relaxation),
        ];
        for (name, value) in offsets {
            if value < Decimal::ZERO || value >= Decimal::ONE {
                return Err(HaggleError::InvalidConfig(format!(
                    "{} must be in [0, 1), got {}",
                    name, value
                )));
            }
        }

        if self.guardian_tightening >= self.like_accept_threshold {
            return Err(HaggleError::InvalidConfig(format!(
                "guardian_tightening {} would disable liked accepts",
                self.guardian_tightening
            )));
        }

        if self.low_patience_threshold > 100 || self.rarity_hunter_threshold > 100 {
            return Err(HaggleError::InvalidConfig(
                "percentage thresholds must not exceed 100".to_string(),
            ));
        }

        let ranges = [
            ("initial_drop", self.initial_drop),
            ("stall_penalty", self.stall_penalty),
            ("move_penalty", self.move_penalty),
        ];
        for (name, range) in ranges {
            if range.min > range.max || range.max > 100 {
                return Err(HaggleError::InvalidConfig(format!(
                    "{} range {}..={} is not within 0..=100",
                    name, range.min, range.max
                )));
            }
        }

        Ok(())
    }
}
