//! Customer-side negotiation: policies, the customer agent, and the session driver

pub mod customer;
pub mod factory;
pub mod policy;
pub mod pricing;
pub mod session;
pub mod types;

pub use customer::{Customer, CustomerBuilder};
pub use factory::CustomerFactory;
pub use policy::{Policy, PolicyKind};
pub use session::NegotiationSession;
pub use types::{OfferDecision, Preference, SessionReport, SessionState};
