//! Negotiation types and session state machine

use crate::types::{Offer, PersonType, Product};
use serde::{Deserialize, Serialize};

/// Customer's verdict on one incoming offer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferDecision {
    Accept,
    Decline,
    Counter,
}

/// How a customer feels about a product category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preference {
    MustHave,
    Liked,
    Disliked,
    Neutral,
}

/// Session state machine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionState {
    /// Offers still being exchanged
    Bargaining { round: u32 },
    /// A party accepted this offer
    Agreed { offer: Offer },
    /// A party walked away
    Stopped { by: PersonType, reason: String },
    /// The caller's round bound ran out
    Exhausted { rounds: u32 },
}

impl SessionState {
    /// Check if the session is in a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Bargaining { .. })
    }

    /// Check if the session is still bargaining
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

/// Outcome of one session, suitable for printing or JSON output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionReport {
    pub customer: String,
    pub vendor: String,
    pub product: Product,
    pub state: SessionState,
    pub transcript: Vec<Offer>,
}

impl SessionReport {
    pub fn agreed_price(&self) -> Option<rust_decimal::Decimal> {
        match &self.state {
            SessionState::Agreed { offer } => Some(offer.price()),
            _ => None,
        }
    }

    pub fn offers(&self) -> usize {
        self.transcript.len()
    }
}
