//! Fraud Scoring Operator Console - Main Entry Point
//!
//! Usage:
//!   fraud-client --amount 420 --hour 3 --c1 12 --c13 40
//!   fraud-client --interactive

use anyhow::Context;
use clap::Parser;
use client::{
    build_payload, render_outcome, ScoringClient, TransactionInputs, AMOUNT, C1, C13,
    DEFAULT_API_URL, DEFAULT_FEATURES_PATH, HOUR,
};
use decision_engine::FeatureSchema;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "fraud-client", about = "Real-time e-commerce fraud detection console")]
struct Cli {
    /// Prediction endpoint
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Feature-name list shared with the scoring service
    #[arg(long, default_value = DEFAULT_FEATURES_PATH)]
    features: PathBuf,

    /// Transaction amount in USD (0-1000)
    #[arg(long, default_value_t = AMOUNT.default, value_parser = |s: &str| AMOUNT.parse(s))]
    amount: f64,

    /// Hour of the day (0-23)
    #[arg(long, default_value_t = HOUR.default, value_parser = |s: &str| HOUR.parse(s))]
    hour: f64,

    /// C1 anonymized count (0-100)
    #[arg(long, default_value_t = C1.default, value_parser = |s: &str| C1.parse(s))]
    c1: f64,

    /// C13 anonymized count (0-100)
    #[arg(long, default_value_t = C13.default, value_parser = |s: &str| C13.parse(s))]
    c13: f64,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Prompt for values repeatedly instead of scoring once
    #[arg(long)]
    interactive: bool,

    /// Show debug logs
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("Real-time E-commerce Fraud Detection");
    println!("Adjust the key features to see how they impact the prediction.\n");

    let schema = match FeatureSchema::from_json_file(&cli.features) {
        Ok(schema) => Some(schema),
        Err(e) => {
            error!(error = %e, "Feature list unavailable");
            eprintln!(
                "Error: {e}. Make sure the artifacts folder is reachable; scoring is disabled."
            );
            None
        }
    };

    let client = ScoringClient::new(&cli.api_url, Duration::from_secs(cli.timeout_secs))
        .context("failed to build HTTP client")?;
    let inputs = TransactionInputs {
        amount: cli.amount,
        hour: cli.hour,
        c1: cli.c1,
        c13: cli.c13,
    };

    if cli.interactive {
        return interactive(&client, schema.as_ref(), inputs).await;
    }

    let schema = schema.context("feature list is required to score a transaction")?;
    if !submit(&client, &schema, &inputs).await {
        std::process::exit(1);
    }
    Ok(())
}

/// Score once and print the outcome; returns false on failure
async fn submit(
    client: &ScoringClient,
    schema: &FeatureSchema,
    inputs: &TransactionInputs,
) -> bool {
    let payload = build_payload(schema, inputs);
    match client.score(&payload).await {
        Ok(outcome) => {
            println!("{}\n", render_outcome(&outcome));
            true
        }
        Err(e) => {
            eprintln!("Error: {e}\n");
            false
        }
    }
}

enum Prompt {
    Continue,
    Quit,
}

/// Edit each control in turn; blank keeps the current value, `q` quits
async fn edit_inputs(
    lines: &mut Lines<BufReader<Stdin>>,
    inputs: &mut TransactionInputs,
) -> anyhow::Result<Prompt> {
    let mut stdout = tokio::io::stdout();
    for (control, value) in inputs.controls_mut() {
        loop {
            stdout
                .write_all(format!("{} [{}]: ", control.label, control.format(*value)).as_bytes())
                .await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                return Ok(Prompt::Quit);
            };
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                return Ok(Prompt::Quit);
            }
            if line.is_empty() {
                break;
            }
            match control.parse(line) {
                Ok(parsed) => {
                    *value = parsed;
                    break;
                }
                Err(message) => eprintln!("{message}"),
            }
        }
    }
    Ok(Prompt::Continue)
}

async fn interactive(
    client: &ScoringClient,
    schema: Option<&FeatureSchema>,
    mut inputs: TransactionInputs,
) -> anyhow::Result<()> {
    println!("Scoring against {} (enter q to quit)\n", client.url());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if let Prompt::Quit = edit_inputs(&mut lines, &mut inputs).await? {
            return Ok(());
        }
        match schema {
            Some(schema) => {
                submit(client, schema, &inputs).await;
            }
            None => eprintln!("Scoring is disabled: feature list not loaded.\n"),
        }
    }
}
