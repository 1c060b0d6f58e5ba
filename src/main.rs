//! Haggle CLI binary

use anyhow::Context;
use clap::Parser;
use haggle::cli::{
    render_catalog, render_reports, Cli, Commands, EvaluateRequest, HaggleApp, SimulateRequest,
};
use haggle::{Percentage, PolicyConfig, ProductType};

fn parse_categories(raw: &[String]) -> anyhow::Result<Vec<ProductType>> {
    raw.iter()
        .map(|s| s.parse::<ProductType>().map_err(anyhow::Error::from))
        .collect()
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PolicyConfig::from_json_file(path)
            .with_context(|| format!("loading policy config from {}", path.display()))?,
        None => PolicyConfig::default(),
    };
    let app = HaggleApp::new(config)?;

    match cli.command {
        Commands::Simulate {
            seed,
            customers,
            policy,
            max_rounds,
            trades,
            json,
        } => {
            tracing::info!("Simulating {} customers with seed {}", customers, seed);

            let request = SimulateRequest {
                seed,
                customers,
                policy: policy.map(Into::into),
                max_rounds,
                trades,
            };
            let (reports, summary) = app.simulate(&request)?;

            if json {
                let out = serde_json::json!({ "sessions": reports, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                render_reports(&reports, &summary);
            }
        }

        Commands::Evaluate {
            budget,
            category,
            price,
            rarity,
            patience,
            must_have,
            like,
            dislike,
            policy,
        } => {
            let request = EvaluateRequest {
                budget,
                category: category.parse()?,
                price,
                rarity: Percentage::new(rarity),
                patience: Percentage::new(patience),
                must_haves: parse_categories(&must_have)?,
                likes: parse_categories(&like)?,
                dislikes: parse_categories(&dislike)?,
                policy: policy.into(),
            };
            let decision = app.evaluate(&request)?;
            println!("{:?}", decision);
        }

        Commands::Catalog => {
            render_catalog(&app.catalog());
        }
    }

    Ok(())
}
