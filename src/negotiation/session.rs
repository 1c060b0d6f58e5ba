//! Negotiation session management

use crate::error::{HaggleError, Result};
use crate::negotiation::customer::Customer;
use crate::types::{Offer, OfferStatus, PersonType, Product};
use crate::vendor::Vendor;

use super::types::{SessionReport, SessionState};

/// One negotiation between a customer and a vendor, from product selection
/// to agreement, walk-away, or the caller's round bound
#[derive(Clone, Debug)]
pub struct NegotiationSession {
    customer: String,
    vendor: String,
    product: Product,
    state: SessionState,
    pending: Option<Offer>,
    transcript: Vec<Offer>,
}

impl NegotiationSession {
    /// Let the customer pick a product; the vendor's opening ask starts the transcript
    pub fn open(customer: &mut Customer, vendor: &mut dyn Vendor) -> Result<Self> {
        let product = customer.choose_product(vendor)?;
        let opening = customer.last_vendor_offer().cloned().ok_or_else(|| {
            HaggleError::InvalidState("selection left no opening offer".to_string())
        })?;

        tracing::info!(
            "{} opens on {} at {} with {}",
            customer.name(),
            product,
            opening.price(),
            vendor.name()
        );

        Ok(Self {
            customer: customer.name().to_string(),
            vendor: vendor.name().to_string(),
            product,
            state: SessionState::Bargaining { round: 0 },
            pending: Some(opening.clone()),
            transcript: vec![opening],
        })
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transcript(&self) -> &[Offer] {
        &self.transcript
    }

    /// Update state
    pub fn set_state(&mut self, state: SessionState) -> Result<()> {
        if self.state.is_terminal() {
            return Err(HaggleError::InvalidState(
                "Cannot transition from terminal state".to_string(),
            ));
        }

        self.state = state;
        Ok(())
    }

    fn round(&self) -> u32 {
        match self.state {
            SessionState::Bargaining { round } => round,
            _ => 0,
        }
    }

    /// One round: the customer answers the pending vendor offer, and the
    /// vendor answers any counter
    pub fn step(&mut self, customer: &mut Customer, vendor: &mut dyn Vendor) -> Result<()> {
        if self.state.is_terminal() {
            return Err(HaggleError::InvalidState(
                "Cannot step a finished session".to_string(),
            ));
        }
        let vendor_offer = self.pending.clone().ok_or_else(|| {
            HaggleError::InvalidState("no vendor offer to answer".to_string())
        })?;

        let reply = customer.respond_to_offer(&vendor_offer)?;
        self.pending = None;
        self.transcript.push(reply.clone());

        match reply.status() {
            OfferStatus::Accepted => {
                vendor.accept_trade(&reply);
                self.set_state(SessionState::Agreed { offer: reply })
            }
            OfferStatus::Stopped => {
                vendor.stop_trade();
                self.set_state(SessionState::Stopped {
                    by: PersonType::Customer,
                    reason: format!("declined {}", reply.price()),
                })
            }
            OfferStatus::Ongoing => {
                let answer = vendor.respond_to_offer(&reply, customer);
                self.transcript.push(answer.clone());
                self.handle_vendor_answer(customer, vendor, answer)
            }
        }
    }

    fn handle_vendor_answer(
        &mut self,
        customer: &mut Customer,
        vendor: &mut dyn Vendor,
        answer: Offer,
    ) -> Result<()> {
        match answer.status() {
            OfferStatus::Accepted => match customer.accept_trade(&answer) {
                Ok(()) => {
                    vendor.accept_trade(&answer);
                    self.set_state(SessionState::Agreed { offer: answer })
                }
                Err(e) if e.is_recoverable() => {
                    customer.stop_trade();
                    vendor.stop_trade();
                    self.set_state(SessionState::Stopped {
                        by: PersonType::Customer,
                        reason: e.to_string(),
                    })
                }
                Err(e) => Err(e),
            },
            OfferStatus::Stopped => {
                customer.stop_trade();
                self.set_state(SessionState::Stopped {
                    by: PersonType::Vendor,
                    reason: "vendor walked away".to_string(),
                })
            }
            OfferStatus::Ongoing => {
                let round = self.round() + 1;
                self.pending = Some(answer);
                self.set_state(SessionState::Bargaining { round })
            }
        }
    }

    /// Step until the session resolves or `max_rounds` rounds have passed
    pub fn run(
        customer: &mut Customer,
        vendor: &mut dyn Vendor,
        max_rounds: u32,
    ) -> Result<SessionReport> {
        let mut session = Self::open(customer, vendor)?;

        while session.state.is_active() {
            let round = session.round();
            if round >= max_rounds {
                tracing::warn!(
                    "{} and {} gave up on {} after {} rounds",
                    session.customer,
                    session.vendor,
                    session.product.name(),
                    round
                );
                customer.stop_trade();
                vendor.stop_trade();
                session.set_state(SessionState::Exhausted { rounds: round })?;
                break;
            }
            session.step(customer, vendor)?;
        }

        match session.state() {
            SessionState::Agreed { offer } => tracing::info!(
                "{} bought {} from {} for {}",
                session.customer,
                session.product.name(),
                session.vendor,
                offer.price()
            ),
            SessionState::Stopped { by, reason } => tracing::info!(
                "{} stopped the negotiation for {}: {}",
                by,
                session.product.name(),
                reason
            ),
            _ => {}
        }

        Ok(session.into_report())
    }

    pub fn into_report(self) -> SessionReport {
        SessionReport {
            customer: self.customer,
            vendor: self.vendor,
            product: self.product,
            state: self.state,
            transcript: self.transcript,
        }
    }
}
