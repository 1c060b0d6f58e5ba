//! CLI command definitions

use crate::negotiation::PolicyKind;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "haggle")]
#[command(about = "Haggle - customer-side price negotiation simulator", long_about = None)]
pub struct Cli {
    /// Policy tuning file (JSON); missing fields take defaults
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run seeded negotiations between generated customers and the demo bazaar
    Simulate {
        /// RNG seed for customer generation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Number of customers to generate
        #[arg(short = 'n', long, default_value = "5")]
        customers: u32,

        /// Policy for every customer; cycles through all three when omitted
        #[arg(short, long, value_enum)]
        policy: Option<PolicyArg>,

        /// Round bound per negotiation
        #[arg(short = 'r', long, default_value = "50")]
        max_rounds: u32,

        /// Trades each customer attempts
        #[arg(short, long, default_value = "1")]
        trades: u32,

        /// Print session reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a customer's verdict on a single vendor offer
    Evaluate {
        /// Customer budget
        #[arg(short, long)]
        budget: Decimal,

        /// Category of the offered product
        #[arg(short, long)]
        category: String,

        /// Vendor's asking price
        #[arg(short, long)]
        price: Decimal,

        /// Product rarity, 0-100
        #[arg(long, default_value = "50")]
        rarity: i64,

        /// Customer patience, 0-100
        #[arg(long, default_value = "100")]
        patience: i64,

        /// Must-have category (repeatable)
        #[arg(long = "must-have")]
        must_have: Vec<String>,

        /// Liked category (repeatable)
        #[arg(long)]
        like: Vec<String>,

        /// Disliked category (repeatable)
        #[arg(long)]
        dislike: Vec<String>,

        #[arg(long, value_enum, default_value = "standard")]
        policy: PolicyArg,
    },

    /// List the demo bazaar's products and asking prices
    Catalog,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    Standard,
    BudgetGuardian,
    RarityHunter,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Standard => PolicyKind::Standard,
            PolicyArg::BudgetGuardian => PolicyKind::BudgetGuardian,
            PolicyArg::RarityHunter => PolicyKind::RarityHunter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "haggle",
            "evaluate",
            "--budget",
            "1000",
            "--category",
            "electronics",
            "--price",
            "750",
            "--must-have",
            "electronics",
            "--policy",
            "budget-guardian",
        ])
        .unwrap();

        match cli.command {
            Commands::Evaluate {
                budget,
                price,
                must_have,
                policy,
                ..
            } => {
                assert_eq!(budget, dec!(1000));
                assert_eq!(price, dec!(750));
                assert_eq!(must_have, vec!["electronics".to_string()]);
                assert_eq!(PolicyKind::from(policy), PolicyKind::BudgetGuardian);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_simulate_defaults() {
        let cli = Cli::try_parse_from(["haggle", "simulate"]).unwrap();
        match cli.command {
            Commands::Simulate {
                seed,
                customers,
                policy,
                json,
                ..
            } => {
                assert_eq!(seed, 42);
                assert_eq!(customers, 5);
                assert!(policy.is_none());
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(cli.config.is_none());
    }
}
