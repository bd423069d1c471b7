use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use carmedian_core::AppConfig;

mod run;

#[derive(Debug, Parser)]
#[command(name = "carmedian")]
#[command(about = "Used-vehicle price scraper: per-target quartile summaries")]
struct Cli {
    /// Target catalog CSV with year, make, model columns.
    #[arg(long, default_value = "data/targets.csv")]
    targets: PathBuf,

    /// Optional YAML config override file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Result store CSV (read for merge, rewritten on success).
    #[arg(long, default_value = "data/scraped_used.csv")]
    out: PathBuf,

    /// Zero-based offset into the resolved target list.
    #[arg(long, env = "OFFSET")]
    offset: Option<usize>,

    /// Number of targets to process from the offset.
    #[arg(long, env = "LIMIT")]
    limit: Option<usize>,

    /// Minimum delay between targets, in milliseconds.
    #[arg(long = "rate-limit-ms", env = "RATE_LIMIT_MS")]
    rate_limit_ms: Option<u64>,

    /// Headless-mode toggle forwarded to the browsing backend.
    #[arg(long, env = "HEADLESS", value_parser = flag)]
    headless: Option<bool>,

    /// Log raw and parsed price samples per target.
    #[arg(long, env = "DEBUG", value_parser = flag)]
    debug: Option<bool>,

    /// Skip targets whose identity is already in the result store.
    #[arg(long = "skip-existing", env = "SKIP_EXISTING", value_parser = flag)]
    skip_existing: Option<bool>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape the planned targets and merge results into the store.
    Run,
    /// Print the effective work list without fetching anything.
    Plan,
}

impl Cli {
    /// Fold run controls onto the loaded configuration. Clap already
    /// resolved flag-over-environment precedence; anything left unset
    /// keeps the config value.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(offset) = self.offset {
            config.offset = offset;
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(rate_limit_ms) = self.rate_limit_ms {
            config.rate_limit_ms = rate_limit_ms;
        }
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
        if let Some(skip_existing) = self.skip_existing {
            config.skip_existing = skip_existing;
        }
    }
}

/// Flag-value parser matching the config layer: anything but an
/// explicit off-value counts as on.
fn flag(raw: &str) -> Result<bool, std::convert::Infallible> {
    Ok(!matches!(raw.trim(), "" | "0" | "false" | "no" | "off"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Catalog/config failures are the only startup-fatal class; anything
    // after this point that is per-target gets logged and skipped inside
    // the driver.
    let mut config = carmedian_core::load_config(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    let targets = carmedian_core::load_targets(&cli.targets)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Plan => run::plan(&config, &targets, &cli.out),
        Commands::Run => run::scrape(&config, &targets, &cli.out).await,
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
