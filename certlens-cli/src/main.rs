mod display;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use certlens_core::colors::PaletteExt;
use certlens_core::output::{get_formatter, OutputFormat};
use certlens_core::{
    normalize_host, parse_bulk_items_from_file, validate_port, BulkExecutor, CertChecker,
    CheckStatus, CheckerConfig, ProgressCallback,
};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::display::{finish_bulk_progress, start_bulk_progress, ProgressWriterFactory, Spinner};

#[derive(Parser)]
#[command(name = "certlens")]
#[command(about = "TLS certificate expiry checks for single hosts and bulk inventories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (human or json)
    #[arg(short, long, global = true, default_value = "human")]
    format: OutputFormat,

    /// TOML file with checker settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// TCP connect timeout in milliseconds
    #[arg(long, global = true)]
    connect_timeout_ms: Option<u64>,

    /// Handshake and read timeout in milliseconds
    #[arg(long, global = true)]
    read_timeout_ms: Option<u64>,

    /// Report certificates with this many days or fewer left as EXPIRING
    #[arg(long, global = true)]
    expiring_days: Option<u32>,

    /// Maximum checks in flight during a bulk run
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Overall deadline for a bulk run in milliseconds
    #[arg(long, global = true)]
    bulk_timeout_ms: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the certificate served by a single host
    Check {
        /// Host name or IP address
        host: String,
        /// TCP port
        #[arg(short, long, default_value_t = 443)]
        port: u32,
        /// Address to retry against when the certificate looks intercepted
        #[arg(long)]
        fallback_ip: Option<String>,
        /// Resolve the host to find retry addresses when no fallback IP is given
        #[arg(long)]
        resolve_dns: bool,
    },
    /// Check every target listed in a file
    Bulk {
        /// JSON array of items, or lines of `domain`, `name,domain`,
        /// `name,domain,port` or `name,domain,port,ip` (# for comments)
        file: PathBuf,
        /// Retry intercepted results through each item's IP
        #[arg(long)]
        fallback: bool,
        /// With --fallback, resolve items that have no IP
        #[arg(long)]
        resolve_dns: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".danger().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "certlens_core=debug,certlens=debug,warn",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(ProgressWriterFactory)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<CheckerConfig> {
    let mut config = match cli.config {
        Some(ref path) => CheckerConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => CheckerConfig::default(),
    };

    if let Some(ms) = cli.connect_timeout_ms {
        config = config.with_connect_timeout(Duration::from_millis(ms));
    }
    if let Some(ms) = cli.read_timeout_ms {
        config = config.with_read_timeout(Duration::from_millis(ms));
    }
    if let Some(days) = cli.expiring_days {
        config = config.with_expiring_days(days);
    }
    if let Some(concurrency) = cli.concurrency {
        config = config.with_bulk_concurrency(concurrency);
    }
    if let Some(ms) = cli.bulk_timeout_ms {
        config = config.with_bulk_timeout(Duration::from_millis(ms));
    }

    config.validate()?;
    debug!(?config, "Loaded checker configuration");
    Ok(config)
}

/// Returns whether every result was OK.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(&cli)?;
    let checker = CertChecker::from_config(&config)?;
    let formatter = get_formatter(cli.format);

    match cli.command {
        Commands::Check {
            host,
            port,
            fallback_ip,
            resolve_dns,
        } => {
            let host = normalize_host(&host)?;
            let port = validate_port(port)?;

            let spinner = (cli.format == OutputFormat::Human)
                .then(|| Spinner::checking(&host, port));
            let report = checker
                .inspect_with_fallback(&host, port, fallback_ip.as_deref(), resolve_dns)
                .await;
            if let Some(spinner) = spinner {
                spinner.finish();
            }

            println!("{}", formatter.format_check(&report));
            Ok(report.result.status == CheckStatus::Ok)
        }
        Commands::Bulk {
            file,
            fallback,
            resolve_dns,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let items = parse_bulk_items_from_file(&content)?;
            if items.is_empty() {
                anyhow::bail!("no targets found in {}", file.display());
            }

            let executor =
                BulkExecutor::from_config(checker, &config).with_fallback(fallback, resolve_dns);

            let progress = start_bulk_progress(items.len());
            let callback: ProgressCallback = Box::new(move |current, _total, host| {
                progress.set_position(current as u64);
                progress.set_message(host.to_string());
            });

            let results = executor.execute(items, Some(callback)).await;
            finish_bulk_progress();
            let results = results?;

            println!("{}", formatter.format_bulk(&results));
            Ok(results.iter().all(|r| r.result.status == CheckStatus::Ok))
        }
    }
}
