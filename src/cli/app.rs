//! Haggle application wiring policies, customers and the demo vendor together

use crate::config::PolicyConfig;
use crate::error::{HaggleError, Result};
use crate::negotiation::{
    CustomerBuilder, CustomerFactory, NegotiationSession, OfferDecision, PolicyKind,
    SessionReport, SessionState,
};
use crate::types::{Offer, PersonType, Percentage, Product, ProductType};
use crate::vendor::{MarketVendor, Vendor};
use rust_decimal::Decimal;
use serde::Serialize;

const NAMES: [&str; 12] = [
    "Amara", "Bastian", "Chiara", "Dmitri", "Esme", "Farid", "Greta", "Hiro", "Ines", "Joaquin",
    "Kalani", "Lior",
];

const POLICY_CYCLE: [PolicyKind; 3] = [
    PolicyKind::Standard,
    PolicyKind::BudgetGuardian,
    PolicyKind::RarityHunter,
];

/// Simulation parameters
#[derive(Clone, Debug)]
pub struct SimulateRequest {
    pub seed: u64,
    pub customers: u32,
    pub policy: Option<PolicyKind>,
    pub max_rounds: u32,
    pub trades: u32,
}

/// One-shot evaluation of a vendor offer
#[derive(Clone, Debug)]
pub struct EvaluateRequest {
    pub budget: Decimal,
    pub category: ProductType,
    pub price: Decimal,
    pub rarity: Percentage,
    pub patience: Percentage,
    pub must_haves: Vec<ProductType>,
    pub likes: Vec<ProductType>,
    pub dislikes: Vec<ProductType>,
    pub policy: PolicyKind,
}

/// Totals across a simulation run
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub sessions: usize,
    pub agreed: usize,
    pub stopped: usize,
    pub exhausted: usize,
    pub skipped: usize,
    pub revenue: Decimal,
}

impl SimulationSummary {
    fn record(&mut self, report: &SessionReport) {
        self.sessions += 1;
        match &report.state {
            SessionState::Agreed { offer } => {
                self.agreed += 1;
                self.revenue += offer.price();
            }
            SessionState::Stopped { .. } => self.stopped += 1,
            SessionState::Exhausted { .. } => self.exhausted += 1,
            SessionState::Bargaining { .. } => {}
        }
    }
}

/// Spread generated customers over ages 18..=77
fn simulated_age(index: usize) -> u32 {
    18 + (index.wrapping_mul(17) % 60) as u32
}

/// Main Haggle application
#[derive(Clone, Debug, Default)]
pub struct HaggleApp {
    config: PolicyConfig,
}

impl HaggleApp {
    pub fn new(config: PolicyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Run every generated customer against the demo bazaar in turn
    pub fn simulate(
        &self,
        request: &SimulateRequest,
    ) -> Result<(Vec<SessionReport>, SimulationSummary)> {
        let mut factory = CustomerFactory::new(request.seed).with_config(self.config.clone());
        let mut vendor = MarketVendor::demo();
        let mut reports = Vec::new();
        let mut summary = SimulationSummary::default();

        for i in 0..request.customers as usize {
            let kind = request.policy.unwrap_or(POLICY_CYCLE[i % POLICY_CYCLE.len()]);
            let name = format!("{}-{}", NAMES[i % NAMES.len()], i + 1);
            let mut customer = factory.create_customer(name, simulated_age(i), kind)?;

            tracing::info!(
                "{}, {} ({}), enters with {} to spend",
                customer.name(),
                customer.age(),
                kind,
                customer.budget()
            );

            for _ in 0..request.trades {
                match NegotiationSession::run(&mut customer, &mut vendor, request.max_rounds) {
                    Ok(report) => {
                        summary.record(&report);
                        reports.push(report);
                    }
                    Err(e) if e.is_recoverable() => {
                        tracing::info!("{}", e);
                        summary.skipped += 1;
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        tracing::info!(
            "Simulation done: {} sessions, {} agreed, vendor revenue {}",
            summary.sessions,
            summary.agreed,
            summary.revenue
        );
        Ok((reports, summary))
    }

    /// Decide on a single offer without running a negotiation
    pub fn evaluate(&self, request: &EvaluateRequest) -> Result<OfferDecision> {
        if request.price < Decimal::ZERO {
            return Err(HaggleError::InvalidArgument(format!(
                "negative price {}",
                request.price
            )));
        }

        let mut customer = CustomerBuilder::new("customer", 0)
            .budget(request.budget)
            .must_haves(request.must_haves.iter().copied())
            .likes(request.likes.iter().copied())
            .dislikes(request.dislikes.iter().copied())
            .policy(request.policy)
            .config(self.config.clone())
            .seed(0)
            .build()?;
        customer.set_patience(request.patience);

        let offer = Offer::new(
            Product::new("offered item", request.category, request.rarity),
            request.price,
            PersonType::Vendor,
        );
        Ok(customer.evaluate_offer(&offer))
    }

    /// Demo catalog with list prices and opening asks
    pub fn catalog(&self) -> Vec<(Product, Decimal, Decimal)> {
        let vendor = MarketVendor::demo();
        vendor
            .products()
            .iter()
            .map(|p| (p.clone(), vendor.list_price(p), vendor.asking_price(p)))
            .collect()
    }
}

pub fn render_reports(reports: &[SessionReport], summary: &SimulationSummary) {
    for report in reports {
        let outcome = match &report.state {
            SessionState::Agreed { offer } => format!("agreed at {}", offer.price()),
            SessionState::Stopped { by, reason } => format!("stopped by {} ({})", by, reason),
            SessionState::Exhausted { rounds } => format!("no deal after {} rounds", rounds),
            SessionState::Bargaining { round } => format!("still bargaining at round {}", round),
        };
        println!(
            "{:<14} {:<20} {:>3} offers  {}",
            report.customer,
            report.product.name(),
            report.offers(),
            outcome
        );
    }
    println!();
    println!(
        "sessions: {}  agreed: {}  stopped: {}  exhausted: {}  no purchase: {}  revenue: {}",
        summary.sessions,
        summary.agreed,
        summary.stopped,
        summary.exhausted,
        summary.skipped,
        summary.revenue
    );
}

pub fn render_catalog(entries: &[(Product, Decimal, Decimal)]) {
    println!(
        "{:<18} {:<16} {:>6} {:>10} {:>10}",
        "product", "category", "rarity", "list", "ask"
    );
    for (product, list, ask) in entries {
        println!(
            "{:<18} {:<16} {:>6} {:>10} {:>10}",
            product.name(),
            product.category(),
            product.rarity(),
            list,
            ask
        );
    }
}
