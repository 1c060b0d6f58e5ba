//! Haggle
//!
//! Customer-side haggling engine. A customer picks a product from a vendor's
//! catalog, then answers each vendor offer by accepting it, walking away, or
//! countering under one of three policies:
//! - Standard: threshold accepts, rarity-based opening, steady concession
//! - BudgetGuardian: tighter thresholds, a price cushion, stubborn rounds
//! - RarityHunter: rarest-first selection, overpays for scarce products

pub mod cli;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod types;
pub mod vendor;

pub use config::{PenaltyRange, PolicyConfig};
pub use error::{HaggleError, Result};
pub use negotiation::{
    Customer, CustomerBuilder, CustomerFactory, NegotiationSession, OfferDecision, Policy,
    PolicyKind, Preference, SessionReport, SessionState,
};
pub use types::{Offer, OfferStatus, PersonType, Percentage, Product, ProductType};
pub use vendor::{MarketVendor, Vendor};
