use anyhow::Result;
use clap::Parser;
use colored::*;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use testgen::cli::Cli;
use testgen::executor::SystemCommandRunner;
use testgen::{ChangeSet, Config, OpenAIClient, Pipeline, RunSummary};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.paths.root = root.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.paths.output_dir = output_dir.clone();
    }
    debug!("Model: {}, max tokens: {}", config.ai.model, config.ai.max_tokens);

    let client = OpenAIClient::new(config.ai.clone())?;
    let mut pipeline = Pipeline::new(&config, Box::new(client), Arc::new(SystemCommandRunner));
    if cli.skip_coverage {
        pipeline = pipeline.without_coverage();
    }

    let changes = ChangeSet::parse(cli.changed_files.as_deref());
    info!("testgen v{}", env!("CARGO_PKG_VERSION"));
    let summary = pipeline.run(&changes).await;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if summary.results.is_empty() {
        println!("{}", "No files changed.".yellow());
        return;
    }

    println!(
        "{} generated, {} skipped, {} failed",
        summary.generated().to_string().green().bold(),
        summary.skipped().to_string().yellow(),
        summary.failed().to_string().red()
    );
}
