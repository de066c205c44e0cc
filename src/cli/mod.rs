//! Command-line interface.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{ConfigStore, Settings};
use crate::llm::{CompletionBackend, Evaluator, HttpCompletionBackend};
use crate::repository::{run_migrations, AsyncSqlitePool, JobRepository, ScanStateRepository};
use crate::scan::{run_scan, ScanContext, StopSignal};
use crate::scrapers::LinkedInBoard;
use crate::server;

#[derive(Parser)]
#[command(name = "jobscout", about = "Job discovery and evaluation", version)]
struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize the data directory, database, and default config
    Init,
    /// Run one scan in the foreground
    Scan,
    /// Start the API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8734)]
        port: u16,
    },
    /// Show database counters and the persisted scan state
    Status,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the active config
    Show,
    /// Print the config file path
    Path,
}

/// Whether verbose logging was requested, checked before clap runs so the
/// tracing subscriber can be installed first.
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(cli.data_dir);

    match cli.command {
        Command::Init => init(&settings).await,
        Command::Scan => scan(&settings).await,
        Command::Serve { host, port } => server::serve(&settings, &host, port).await,
        Command::Status => status(&settings).await,
        Command::Config { command } => config(&settings, command),
    }
}

async fn init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_dirs()?;
    run_migrations(&settings.db_path().display().to_string()).await?;
    ConfigStore::new(settings).load()?;

    println!(
        "{} Initialized data directory at {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    println!("  Database: {}", settings.db_path().display());
    println!("  Config:   {}", settings.config_path().display());
    Ok(())
}

async fn scan(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_dirs()?;
    let db_url = settings.db_path().display().to_string();
    run_migrations(&db_url).await?;

    let pool = AsyncSqlitePool::new(&db_url);
    let ctx = ScanContext {
        jobs: JobRepository::new(pool.clone()),
        scan_state: ScanStateRepository::new(pool),
        config_store: Arc::new(ConfigStore::new(settings)),
        board: Arc::new(LinkedInBoard::new()),
        evaluator: Arc::new(Evaluator::with_backend(
            Box::new(HttpCompletionBackend::new()) as Box<dyn CompletionBackend>,
        )),
    };

    let stop = StopSignal::new();
    let ctrl_c_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Stopping after the current step...", style("!").yellow());
            ctrl_c_stop.request_stop();
        }
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Scanning for jobs (ctrl-c to stop)...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let jobs = ctx.jobs.clone();
    run_scan(ctx, stop).await;
    spinner.finish_and_clear();

    let (discovered, approved, applied, analyzed) = jobs.scan_counters().await?;
    println!("{} Scan finished", style("✓").green());
    println!("  Discovered: {}", discovered);
    println!("  Analyzed:   {}", analyzed);
    println!("  Approved:   {}", approved);
    println!("  Applied:    {}", applied);
    Ok(())
}

async fn status(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_dirs()?;
    let db_url = settings.db_path().display().to_string();
    run_migrations(&db_url).await?;

    let pool = AsyncSqlitePool::new(&db_url);
    let jobs = JobRepository::new(pool.clone());
    let scan_state = ScanStateRepository::new(pool);

    let (stop_requested, scan_active) = scan_state.flags().await?;
    let stats = jobs.statistics().await?;

    println!("{}", style("Scan state (persisted)").bold());
    println!("  Active:         {}", scan_active);
    println!("  Stop requested: {}", stop_requested);
    println!();
    println!("{}", style("Jobs").bold());
    println!("  Discovered:   {}", stats.total_discovered);
    println!("  With details: {}", stats.total_with_details);
    println!("  Analyzed:     {}", stats.total_analyzed);
    println!("  Approved:     {}", stats.total_approved);
    println!("  Applied:      {}", stats.total_applied);
    println!("  Archived:     {}", stats.total_archived);

    if !stats.by_keyword.is_empty() {
        println!();
        println!("{}", style("Top keywords").bold());
        for entry in &stats.by_keyword {
            println!("  {:>5}  {}", entry.count, entry.name);
        }
    }
    Ok(())
}

fn config(settings: &Settings, command: ConfigCommand) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Show => {
            settings.ensure_dirs()?;
            let config = ConfigStore::new(settings).load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommand::Path => {
            println!("{}", settings.config_path().display());
        }
    }
    Ok(())
}
