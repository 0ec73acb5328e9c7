//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use apiscout_core::pipeline::{Pipeline, ProgressReporter, RunReport};
use apiscout_shared::{
    AppConfig, init_config, load_config, load_config_from, resolve_credentials,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// apiscout — find API documentation and load it into a knowledge base.
#[derive(Parser)]
#[command(
    name = "apiscout",
    version,
    about = "Find an API's documentation, ingest it into a knowledge base, and summarize its endpoints.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.apiscout/apiscout.toml.
    #[arg(long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the full search → crawl → ingest → query pipeline.
    Run(RunArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for a single pipeline run.
#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// API to look for (e.g. "Stripe"). Also seeds the query and collection
    /// metadata unless those are given explicitly.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Web search query.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Location used to localize search results.
    #[arg(long)]
    pub location: Option<String>,

    /// Collection name.
    #[arg(long)]
    pub collection_name: Option<String>,

    /// Collection description.
    #[arg(long)]
    pub collection_description: Option<String>,

    /// Question asked of the populated collection.
    #[arg(long)]
    pub final_query: Option<String>,

    /// Maximum pages to crawl from the chosen documentation link.
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Drop repeated links before ingestion.
    #[arg(long)]
    pub dedupe: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

impl RunArgs {
    /// Layer these flags over the loaded config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(target) = &self.target {
            config.pipeline.target = target.clone();
            config.search.query = format!("{target} API documentation");
            config.collection.name = format!("{target} API docs");
            config.collection.description =
                format!("Content ingested from {target} API + embedded links");
        }
        if let Some(query) = &self.query {
            config.search.query = query.clone();
        }
        if let Some(location) = &self.location {
            config.search.location = location.clone();
        }
        if let Some(name) = &self.collection_name {
            config.collection.name = name.clone();
        }
        if let Some(description) = &self.collection_description {
            config.collection.description = description.clone();
        }
        if let Some(final_query) = &self.final_query {
            config.pipeline.final_query = final_query.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.crawl.limit = max_pages;
        }
        if self.dedupe {
            config.pipeline.dedupe_links = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "apiscout=info",
        1 => "apiscout=debug",
        _ => "apiscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Run(args) => cmd_run(config, &args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

async fn cmd_run(mut config: AppConfig, args: &RunArgs) -> Result<()> {
    args.apply(&mut config);

    // Fail on missing keys before any provider is contacted
    let creds = resolve_credentials(&config)?;

    let pipeline = Pipeline::from_config(&config, &creds)?;
    info!(
        api = %pipeline.config().target,
        query = %pipeline.config().query,
        "running documentation pipeline"
    );

    let reporter = CliProgress::new();
    let report = pipeline.run(&reporter).await?;

    println!();
    println!("  Best link:   {}", report.best_link);
    println!("  Collection:  {}", report.collection_id);
    println!(
        "  Ingested:    {}/{} links",
        report.ingested.len(),
        report.valid_links.len()
    );
    for (url, error) in &report.failed {
        println!("  Failed:      {url} ({error})");
    }
    println!("  Time:        {:.1}s", report.elapsed.as_secs_f64());
    println!();
    println!("{}", report.answer);

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn url_ingested(&self, url: &str, error: Option<&str>, current: usize, total: usize) {
        match error {
            None => self
                .spinner
                .println(format!("  [{current}/{total}] Successfully ingested website: {url}")),
            Some(e) => self
                .spinner
                .println(format!("  [{current}/{total}] Failed to ingest website {url}: {e}")),
        }
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // A failed run never reaches `done`
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
