mod config;
mod db;
mod harvest;
mod normalize;
mod parser;
mod records;
mod session;
mod table;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use tracing::warn;

use config::{CleanConfig, HarvestConfig};
use harvest::Harvester;
use session::{PageSource, Session};

#[derive(Parser)]
#[command(name = "job_harvest", about = "HelloWork job offers: harvest and clean")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect raw offers from the search results into a `;` CSV
    Harvest(HarvestArgs),
    /// Normalize a raw CSV into the clean analytics table
    Clean {
        #[arg(short, long, default_value = config::DEFAULT_RAW_PATH)]
        input: PathBuf,
        #[arg(short, long, default_value = config::DEFAULT_CLEAN_PATH)]
        output: PathBuf,
    },
    /// Harvest then clean in one go
    Run {
        #[command(flatten)]
        harvest: HarvestArgs,
        /// Clean table path
        #[arg(long, default_value = config::DEFAULT_CLEAN_PATH)]
        clean_output: PathBuf,
    },
    /// Show what the run archive holds
    Stats {
        #[arg(long, env = "HARVEST_DB", default_value = config::DEFAULT_DB_PATH)]
        db: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct HarvestArgs {
    /// Number of offers to collect
    #[arg(short = 'n', long, env = "HARVEST_TARGET", default_value_t = config::DEFAULT_TARGET)]
    target: usize,
    /// Search filter (city, region); empty searches all of France
    #[arg(short, long, env = "HARVEST_LOCATION", default_value = "")]
    location: String,
    /// Raw table path
    #[arg(short, long, default_value = config::DEFAULT_RAW_PATH)]
    output: PathBuf,
    /// Run archive
    #[arg(long, env = "HARVEST_DB", default_value = config::DEFAULT_DB_PATH)]
    db: PathBuf,
    /// Lower bound of the pause between pages
    #[arg(long, default_value_t = config::DEFAULT_DELAY_MIN_MS)]
    delay_min_ms: u64,
    /// Upper bound of the pause between pages
    #[arg(long, default_value_t = config::DEFAULT_DELAY_MAX_MS)]
    delay_max_ms: u64,
}

impl HarvestArgs {
    fn to_config(&self) -> HarvestConfig {
        HarvestConfig {
            target: self.target,
            location_filter: self.location.clone(),
            delay_min: Duration::from_millis(self.delay_min_ms),
            delay_max: Duration::from_millis(self.delay_max_ms),
            ..Default::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Harvest(args) => run_harvest(&args).await.map(|_| ()),
        Commands::Clean { input, output } => run_clean(&CleanConfig { input, output }),
        Commands::Run {
            harvest,
            clean_output,
        } => {
            let collected = run_harvest(&harvest).await?;
            if collected == 0 {
                println!("Nothing to clean.");
                return Ok(());
            }
            run_clean(&CleanConfig {
                input: harvest.output.clone(),
                output: clean_output,
            })
        }
        Commands::Stats { db: path, json } => {
            let conn = db::connect(&path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&s)?);
            } else {
                println!("Runs:          {}", s.runs);
                println!("Pages:         {}", s.pages);
                println!("Listings:      {}", s.listings);
                println!("With salary:   {}", s.with_salary_text);
                println!("Dropped cards: {}", s.dropped_cards);
                if let Some(last) = s.last_run {
                    println!(
                        "Last run:      {} ({}/{} offers, {})",
                        last.started_at, last.records, last.target, last.stop_reason
                    );
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Open the archive and a session, then harvest into the raw table.
async fn run_harvest(args: &HarvestArgs) -> anyhow::Result<usize> {
    let config = args.to_config();
    let conn = db::connect(&args.db)?;
    db::init_schema(&conn)?;

    println!(
        "Harvesting {} offers ({})...",
        config.target,
        if config.location_filter.is_empty() {
            "all of France"
        } else {
            config.location_filter.as_str()
        }
    );
    let session = Session::open(&config.user_agent)?;
    harvest_into(&config, session, &conn, &args.output).await
}

/// Harvest from `source`, archive the run, write the raw table. An empty
/// harvest is archived but leaves `output` untouched. Returns how many
/// offers were collected.
async fn harvest_into<S: PageSource>(
    config: &HarvestConfig,
    source: S,
    conn: &Connection,
    output: &Path,
) -> anyhow::Result<usize> {
    let outcome = Harvester::new(config, source).run().await?;

    let run_id = db::save_run(conn, config, &outcome)?;
    println!(
        "Run #{}: {} offers over {} pages ({}).",
        run_id,
        outcome.records.len(),
        outcome.pages.len(),
        outcome.stop.as_str()
    );

    if outcome.records.is_empty() {
        warn!("No offers collected, {} not written", output.display());
        return Ok(0);
    }
    table::write_raw(output, &outcome.records)?;
    println!("Raw table: {}", output.display());
    Ok(outcome.records.len())
}

/// Load the raw table, normalize, dedup, write the clean table.
fn run_clean(config: &CleanConfig) -> anyhow::Result<()> {
    if !config.input.exists() {
        anyhow::bail!("Input file {} not found", config.input.display());
    }

    let loaded = table::read_raw(&config.input)?;
    println!(
        "Loaded {} raw rows ({} skipped).",
        loaded.records.len(),
        loaded.skipped
    );

    let (dataset, stats) = normalize::run(&loaded.records);
    if dataset.is_empty() {
        warn!("No usable rows in {}, clean table has a header only", config.input.display());
    }
    table::write_clean(&config.output, &dataset)?;

    println!("Clean table: {}", config.output.display());
    stats.print();
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match (secs / 3600, secs % 3600 / 60, secs % 60) {
        (0, 0, _) => format!("{:.1}s", d.as_secs_f64()),
        (0, m, s) => format!("{}m {:02}s", m, s),
        (h, m, s) => format!("{}h {:02}m {:02}s", h, m, s),
    }
}

// ── Tests ──
