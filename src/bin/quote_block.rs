//! Quote a block of client requests from a CSV file
//!
//! Prices every request in parallel against one shared engine and writes the
//! cheapest quote per request.

use anyhow::Context;
use clap::Parser;
use premium_quote::batch::{load_requests, BatchQuoter};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "quote_block")]
struct Args {
    /// Underwriting JSON file
    #[arg(long, default_value = "data/carrier_underwriting.json")]
    data: PathBuf,

    /// Request CSV (age,gender,state,coverage,term,product,health,nicotine,modality)
    #[arg(long, default_value = "data/sample_requests.csv")]
    requests: PathBuf,

    /// Output CSV
    #[arg(long, default_value = "block_quote_output.csv")]
    output: PathBuf,
}

/// One output row per request
#[derive(Debug, Serialize)]
struct OutputRow {
    row: usize,
    age: f64,
    gender: String,
    state: String,
    coverage: f64,
    quote_count: usize,
    best_carrier: Option<String>,
    best_product: Option<String>,
    best_premium: Option<String>,
    modality: Option<String>,
    error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading underwriting data from {}...", args.data.display());
    let quoter = BatchQuoter::from_path(&args.data)
        .with_context(|| format!("Failed to load {}", args.data.display()))?;
    println!("Loaded {} carriers in {:?}", quoter.engine().list_carriers().len(), start.elapsed());

    let requests = load_requests(&args.requests)
        .with_context(|| format!("Failed to read {}", args.requests.display()))?;
    println!("Loaded {} requests", requests.len());

    println!("Pricing...");
    let quote_start = Instant::now();
    let results = quoter.run_batch_parallel(&requests);
    println!("Pricing complete in {:?}", quote_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let mut priced = 0;
    let mut failed = 0;
    for (i, (request, result)) in requests.iter().zip(results).enumerate() {
        let mut row = OutputRow {
            row: i + 1,
            age: request.age,
            gender: request.gender.clone(),
            state: request.state.clone(),
            coverage: request.coverage_amount,
            quote_count: 0,
            best_carrier: None,
            best_product: None,
            best_premium: None,
            modality: None,
            error: None,
        };

        match result {
            Ok(quotes) => {
                row.quote_count = quotes.len();
                if let Some(best) = quotes.into_iter().next() {
                    priced += 1;
                    row.best_premium = Some(format!("{:.2}", best.premium));
                    row.best_carrier = Some(best.carrier);
                    row.best_product = Some(best.product);
                    row.modality = Some(best.modality);
                }
            }
            Err(e) => {
                failed += 1;
                row.error = Some(e.to_string());
            }
        }

        writer.serialize(&row)?;
    }
    writer.flush()?;

    println!("Output written to {}", args.output.display());

    println!("\nBlock Summary:");
    println!("  Requests: {}", requests.len());
    println!("  Priced:   {}", priced);
    println!("  No match: {}", requests.len() - priced - failed);
    println!("  Failed:   {}", failed);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
