//! triage-cli - standalone front end for the ticket triage pipeline.
//!
//! `process` runs one ticket through the same pipeline the server uses and
//! prints the analysis without persisting anything. `check-key` verifies
//! that the configured API key can reach the model.

mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use triage_core::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use triage_core::{CompletionModel, GeminiClient, GeminiConfig, Pipeline};

#[derive(Debug, Parser)]
#[command(name = "triage-cli", version, about = "Classify, prioritise and answer a support ticket")]
struct Cli {
    /// API key for the generation endpoint.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model name.
    #[arg(long, env = "TRIAGE_LLM_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// API root URL.
    #[arg(long, env = "TRIAGE_LLM_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Per-call timeout in seconds (at least 1).
    #[arg(
        long,
        env = "TRIAGE_LLM_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one ticket through the pipeline and print the analysis.
    Process {
        /// Ticket title, e.g. "Unable to access my account".
        #[arg(long)]
        title: String,
        /// Detailed description of the issue.
        #[arg(long)]
        description: String,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check that the API key is present and accepted by the model.
    CheckKey,
}

impl Cli {
    fn client(&self) -> Result<GeminiClient> {
        let config = GeminiConfig::new(self.api_key.clone())
            .with_model(self.model.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));
        GeminiClient::new(config).context("failed to build the completion client")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Process {
            title,
            description,
            json,
        } => process(&cli, title, description, *json).await,
        Command::CheckKey => check_key(&cli).await,
    }
}

async fn process(cli: &Cli, title: &str, description: &str, json: bool) -> Result<()> {
    if title.trim().is_empty() || description.trim().is_empty() {
        bail!("Please fill in both the title and description fields.");
    }

    let client = cli.client()?;
    if !client.has_credential() {
        bail!("Cannot process ticket: API key is not configured.");
    }

    eprintln!("Analyzing ticket...");
    let triage = Pipeline::new(Arc::new(client)).triage(description).await;

    if json {
        let report = render::Report {
            title,
            description,
            triage: &triage,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::dashboard(title, &triage));
    }
    Ok(())
}

async fn check_key(cli: &Cli) -> Result<()> {
    let client = cli.client()?;
    if !client.has_credential() {
        bail!("GOOGLE_API_KEY was not found in the environment.");
    }
    println!("Step 1: API key found.");
    println!("Step 2: completion client configured for model {}.", client.model());
    println!("Step 3: calling the model...");

    let reply = client
        .complete("test")
        .await
        .context("the API key might be invalid")?;
    println!("SUCCESS: the API key is working.");
    println!("Response: {reply}");
    Ok(())
}
