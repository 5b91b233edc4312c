use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use activity_summary::config::DEFAULT_POLL_INTERVAL_MS;
use activity_summary::host::{FileHost, HttpHost, PageHost};
use activity_summary::parser::{extract_activity_with, extract_splits};
use activity_summary::record::LocalizedSplits;
use activity_summary::session::run_gated;
use activity_summary::{FieldNames, Locale, PollConfig, PollState, Session, Settings};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

#[derive(Parser)]
#[command(name = "activity_summary", about = "Workout summary extractor for Strava activity pages")]
struct Cli {
    /// Language of output field names and messages
    #[arg(long, global = true, value_enum, env = "ACTIVITY_LOCALE", default_value = "en")]
    locale: Locale,
    /// JSON file overriding output field names
    #[arg(long, global = true)]
    field_names: Option<PathBuf>,
    /// Regex an address must match to count as an activity page
    #[arg(long, global = true)]
    gate_pattern: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Activity page URL or a saved HTML file
    source: String,
    /// Page address to gate against; required when SOURCE is a file
    #[arg(long)]
    url: Option<String>,
    /// Session cookie sent with HTTP requests
    #[arg(long, env = "ACTIVITY_COOKIE", hide_env_values = true)]
    cookie: Option<String>,
    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full extraction and print the summary
    Extract {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Extract, then poll until the splits table is rendered
    Watch {
        #[command(flatten)]
        source: SourceArgs,
        /// Polling period in milliseconds
        #[arg(long, env = "ACTIVITY_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
        interval_ms: u64,
        /// Give up after this many polls (default: poll until splits appear)
        #[arg(long, env = "ACTIVITY_MAX_ATTEMPTS", value_parser = clap::value_parser!(u32).range(1..))]
        max_attempts: Option<u32>,
    },
    /// Print only the splits table
    Splits {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = build_settings(&cli)?;

    match cli.command {
        Commands::Extract { source } => {
            let host = open_host(&source)?;
            let record = run_gated(&*host, &settings, |page| {
                extract_activity_with(page, &settings.scanner)
            })
            .await?;
            emit(&record.to_json_pretty(&settings.field_names)?, &source, &settings)?;
        }
        Commands::Splits { source } => {
            let host = open_host(&source)?;
            let splits = run_gated(&*host, &settings, extract_splits).await?;
            let json = serde_json::to_string_pretty(&LocalizedSplits::new(
                &splits,
                &settings.field_names,
            ))?;
            emit(&json, &source, &settings)?;
        }
        Commands::Watch {
            source,
            interval_ms,
            max_attempts,
        } => {
            let settings = settings.with_poll(PollConfig {
                interval: Duration::from_millis(interval_ms),
                max_attempts,
            });
            let host = open_host(&source)?;
            watch(host, &source, &settings).await?;
        }
    }

    info!("Done in {:.1}s", t0.elapsed().as_secs_f64());
    Ok(())
}

fn build_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::for_locale(cli.locale);
    if let Some(path) = &cli.field_names {
        settings = settings.with_field_names(FieldNames::from_json_file(path)?);
    }
    if let Some(pattern) = &cli.gate_pattern {
        settings = settings.with_gate_pattern(pattern)?;
    }
    Ok(settings)
}

fn open_host(args: &SourceArgs) -> anyhow::Result<Arc<dyn PageHost>> {
    if args.source.starts_with("http://") || args.source.starts_with("https://") {
        let host = HttpHost::new(&args.source, args.cookie.clone())
            .context("Failed to create HTTP client")?;
        Ok(Arc::new(host))
    } else {
        let Some(url) = &args.url else {
            anyhow::bail!("--url is required when reading {} from disk", args.source);
        };
        Ok(Arc::new(FileHost::new(&args.source, Some(url.clone()))))
    }
}

async fn watch(host: Arc<dyn PageHost>, source: &SourceArgs, settings: &Settings) -> anyhow::Result<()> {
    let session = Session::open(host, settings).await?;
    let first = session.current();
    emit(&first.record.to_json_pretty(&settings.field_names)?, source, settings)?;
    if first.state != PollState::AwaitingSplits {
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    spinner.set_message(settings.messages.loading_splits.clone());
    spinner.enable_steady_tick(Duration::from_millis(120));

    let last = tokio::select! {
        snapshot = session.settled() => Some(snapshot),
        _ = tokio::signal::ctrl_c() => None,
    };
    spinner.finish_and_clear();

    match last {
        Some(snapshot) if snapshot.state == PollState::Settled => {
            emit(&snapshot.record.to_json_pretty(&settings.field_names)?, source, settings)?;
        }
        Some(_) => eprintln!("{}", settings.messages.splits_unavailable),
        None => info!("Interrupted while waiting for splits"),
    }
    session.close().await;
    Ok(())
}

fn emit(json: &str, source: &SourceArgs, settings: &Settings) -> anyhow::Result<()> {
    match &source.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} {}", settings.messages.written_to, path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
