//! gtfs2sql command line: load a GTFS directory into a SQL database.

use anyhow::Result;
use clap::Parser;
use gtfs2sql::{ConnectionTarget, Credentials, LoadConfig, DEFAULT_BATCH_SIZE};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "gtfs2sql", version)]
#[command(about = "Load a GTFS feed directory into SQLite or PostgreSQL", long_about = None)]
struct Cli {
    /// Directory holding the GTFS .txt/.csv files
    #[arg(short, long, value_name = "DIR")]
    gtfs: PathBuf,

    /// Target database: sqlite:<path>, sqlite::memory:, <file>.db or postgres://...
    #[arg(short = 's', long, env = "GTFS2SQL_CONNECTION")]
    connection: String,

    /// File names to leave out (e.g. shapes.txt); repeat or comma-separate
    #[arg(short, long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Compute trip times and last stops after loading
    #[arg(short, long, default_value_t = false)]
    optimize: bool,

    /// Database user (PostgreSQL)
    #[arg(long, env = "GTFS2SQL_DB_USERNAME")]
    dbusername: Option<String>,

    /// Database password (PostgreSQL)
    #[arg(long, env = "GTFS2SQL_DB_PASSWORD", hide_env_values = true)]
    dbpassword: Option<String>,

    /// Rows per insert batch and progress report
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = LoadConfig::new(cli.gtfs, ConnectionTarget::parse(&cli.connection)?)
        .exclude(&cli.exclude);
    config.credentials = Credentials {
        username: cli.dbusername,
        password: cli.dbpassword,
    };
    config.optimize = cli.optimize;
    config.batch_size = cli.batch_size;
    config.report = cli.report;

    info!(version = gtfs2sql::VERSION, "gtfs2sql starting");
    let report = gtfs2sql::run(&config)?;

    if report.failures() > 0 {
        warn!(failures = report.failures(), "Some files could not be loaded");
    }

    Ok(())
}
