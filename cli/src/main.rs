//! CLI for the version bump bot.
//!
//! Compares the repo2docker and BinderHub versions deployed on mybinder.org
//! with the latest releases and opens or updates bump pull requests.

use bump_bot::{BotConfig, ProcessingResult, RunSummary, Runner, RunnerConfig, RunnerError};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Bump Bot - Open pull requests bumping repo2docker and BinderHub on mybinder.org.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file overriding the default settings.
    #[arg(long, env = "BUMP_BOT_CONFIG")]
    config: Option<PathBuf>,

    /// Report decisions without touching the fork, git or pull requests.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    install_crypto_provider();
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::from(0)
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            ExitCode::from(2)
        }
    }
}

/// Selects aws-lc-rs for rustls; octocrab and reqwest otherwise leave two
/// providers enabled and rustls refuses to pick one.
fn install_crypto_provider() {
    // Err means a provider is already installed.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Installs a compact subscriber filtered by `RUST_LOG` (default "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let bot = match args.config {
        Some(path) => BotConfig::load(&path)?,
        None => BotConfig::default(),
    };
    let runner = Runner::from_config(RunnerConfig::new(bot, args.dry_run))?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Dependencies checked: {}", summary.dependencies_checked);
    println!("  Up to date: {}", summary.up_to_date);

    if summary.dry_run {
        for result in &summary.results {
            if let ProcessingResult::Planned { dependency, action } = result {
                println!("  {dependency}: {action:?}");
            }
        }
        return;
    }

    println!("  Already proposed: {}", summary.already_proposed);
    println!("  PRs created: {}", summary.prs_created);
    println!("  PRs updated: {}", summary.prs_updated);
    println!(
        "  Fork removed: {}",
        if summary.fork_removed { "yes" } else { "no" }
    );

    for result in &summary.results {
        if let ProcessingResult::Published { dependency, pr } = result {
            println!("  {dependency}: {} {}", pr.as_str(), pr.url());
        }
    }
}
