//! Premium Quote CLI
//!
//! Prices one client profile against an underwriting dataset and prints the
//! quotes cheapest first.

use anyhow::Context;
use clap::{ArgAction, CommandFactory, Parser};
use clap::error::ErrorKind;
use premium_quote::{
    render::TextTarget, render_quote_list, DatasetSource, QuoteEngine, QuoteRequest, RenderOptions,
};
use std::process::ExitCode;

/// Insurance premium quotes from carrier underwriting data
#[derive(Debug, Parser)]
#[command(name = "premium_quote", version)]
struct Cli {
    /// Path or URL of the underwriting JSON
    #[arg(long, value_name = "PATH", default_value = "./carrier_underwriting.json")]
    data: String,

    /// Client age
    #[arg(long, default_value_t = 35.0)]
    age: f64,

    /// Client gender (male|female)
    #[arg(long, default_value = "male")]
    gender: String,

    /// Two-letter state code
    #[arg(long, default_value = "TX")]
    state: String,

    /// Coverage amount in dollars
    #[arg(long, default_value_t = 250_000.0)]
    coverage: f64,

    /// Term length in years
    #[arg(long, default_value_t = 20)]
    term: u32,

    /// Product type: term | whole | iul | fe
    #[arg(long, default_value = "term")]
    product: String,

    /// Health class
    #[arg(long, default_value = "preferred plus")]
    health: String,

    /// Nicotine use flag (true|false)
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    nicotine: bool,

    /// Payment mode: monthly | annual | quarterly | semiannual
    #[arg(long, default_value = "monthly")]
    modality: String,

    /// CTA button label
    #[arg(long, default_value = "Book now")]
    button: String,

    /// CTA destination URL
    #[arg(long, default_value = "https://example.com/book")]
    link: String,
}

impl Cli {
    fn to_request(&self) -> QuoteRequest {
        QuoteRequest {
            term_years: Some(self.term),
            product_type: Some(self.product.to_lowercase()),
            health_class: Some(self.health.to_lowercase()),
            nicotine_use: self.nicotine,
            modality: Some(self.modality.to_lowercase()),
            button_text: Some(self.button.clone()),
            link_url: Some(self.link.clone()),
            ..QuoteRequest::new(self.age, self.coverage, &self.gender.to_lowercase(), &self.state)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let source = match DatasetSource::from_arg(&cli.data) {
        DatasetSource::Path(path) => {
            let cwd = std::env::current_dir().context("Unable to resolve working directory")?;
            DatasetSource::Path(cwd.join(path))
        }
        other => other,
    };

    let underwriting_data = source.load().await?;
    let engine = QuoteEngine::from_value(underwriting_data)?;
    let quotes = engine.calculate_quotes(&cli.to_request())?;

    if quotes.is_empty() {
        println!("No quotes available for the supplied criteria.");
        return Ok(());
    }

    let mut target = TextTarget::new(std::io::stdout().lock());
    render_quote_list(&quotes, Some(&mut target), RenderOptions::default())?;
    Ok(())
}

fn print_usage() {
    let _ = Cli::command().print_help();
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // Usage errors exit 1 like every other failure
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["premium_quote"]).unwrap();
        let request = cli.to_request();
        assert_eq!(request.age, 35.0);
        assert_eq!(request.coverage_amount, 250_000.0);
        assert_eq!(request.gender, "male");
        assert_eq!(request.state, "TX");
        assert_eq!(request.term_years, Some(20));
        assert_eq!(request.product_type.as_deref(), Some("term"));
        assert_eq!(request.health_class.as_deref(), Some("preferred plus"));
        assert!(!request.nicotine_use);
        assert_eq!(request.link_url.as_deref(), Some("https://example.com/book"));
    }

    #[test]
    fn test_cli_usage_errors() {
        // Missing value
        assert!(Cli::try_parse_from(["premium_quote", "--age"]).is_err());
        // Unknown boolean
        assert!(Cli::try_parse_from(["premium_quote", "--nicotine", "maybe"]).is_err());

        let cli = Cli::try_parse_from(["premium_quote", "--nicotine", "true", "--gender", "Female"]).unwrap();
        let request = cli.to_request();
        assert!(request.nicotine_use);
        assert_eq!(request.gender, "female");
    }
}
