// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Command-line interface for the gitstats binary.
//!
//! Collects statistics for one GitHub account and writes the summary JSON to
//! `<output>/data/<username>-stats.json`.

use std::{path::PathBuf, process, sync::Arc, time::Duration};

use chrono::Local;
use clap::{ArgAction, Parser};
use gitstats::{
    AppConfig, Cache, Clients, Error, GithubSession, HttpTransport, Orchestrator, PayloadSource,
    Provenance, STATISTICS_KEY, StatisticsPayload, Visibility, load_config, write_summary,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command line interface for collecting GitHub statistics.
#[derive(Debug, Parser,)]
#[command(name = "gitstats", version, about = "Collect GitHub statistics for stats cards")]
struct Cli
{
    /// Path to the YAML configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// GitHub login whose statistics are collected.
    #[arg(long = "username", env = "GITHUB_USERNAME", value_name = "LOGIN")]
    username: Option<String,>,

    /// Personal access token.
    #[arg(long = "token", env = "GITHUB_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Repository visibility filter.
    #[arg(long = "visibility", value_enum)]
    visibility: Option<Visibility,>,

    /// Comma separated languages left out of the language breakdown.
    #[arg(long = "exclude-languages", value_name = "LANGS", value_delimiter = ',')]
    exclude_languages: Option<Vec<String,>,>,

    /// Skip traffic view collection.
    #[arg(long = "no-views", action = ArgAction::SetTrue)]
    no_views: bool,

    /// Collect at most this many repositories.
    #[arg(long = "max-repositories", value_name = "N")]
    max_repositories: Option<usize,>,

    /// Upper bound of in-flight per-repository requests.
    #[arg(long = "concurrency", value_name = "N")]
    concurrency: Option<usize,>,

    /// Root directory for the summary and the cache.
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf,>,

    /// Rebuild statistics from the cached payload when it is still fresh.
    #[arg(long = "use-cached", action = ArgAction::SetTrue)]
    use_cached: bool,

    /// Remove every cache entry before collecting.
    #[arg(long = "clear-cache", action = ArgAction::SetTrue)]
    clear_cache: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors and hide the progress spinner.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue, conflicts_with = "verbose")]
    quiet: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main()
{
    if let Err(error,) = run() {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates configuration, collection and storage failures.
fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();
    init_logging(&cli,);

    let config = resolve_config(&cli,)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::internal(format!("failed to start async runtime: {e}"),),)?;

    runtime.block_on(collect(&cli, &config,),)
}

async fn collect(cli: &Cli, config: &AppConfig,) -> Result<(), Error,>
{
    let cache = Cache::open(config.cache_dir(), config.cache_ttl(),)?;
    if cli.clear_cache {
        let removed = cache.clear()?;
        info!("removed {} cache entries", removed);
    }

    let source = payload_source(cli.use_cached, &cache, config,)?;
    let orchestrator = Orchestrator::new(config, Local::now().date_naive(),);

    let spinner = spinner(cli.quiet,);
    spinner.set_message(format!("collecting statistics for {}", config.github.username),);
    let outcome = orchestrator.collect(source,).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    if outcome.provenance == Provenance::Live {
        cache.set(STATISTICS_KEY, &outcome.payload,)?;
    }

    let path = config.summary_path();
    write_summary(&outcome.statistics, &path,)?;
    println!("{}", path.display());
    Ok((),)
}

/// Picks the cached payload when requested and usable, otherwise a live
/// session.
fn payload_source(
    use_cached: bool,
    cache: &Cache,
    config: &AppConfig,
) -> Result<PayloadSource<HttpTransport,>, Error,>
{
    if use_cached {
        match cache.get::<StatisticsPayload>(STATISTICS_KEY,) {
            Some(payload,) if payload.user.login.eq_ignore_ascii_case(&config.github.username,) => {
                return Ok(PayloadSource::Cached(payload,),);
            }
            Some(payload,) => {
                warn!("cached statistics belong to {}, fetching from API", payload.user.login)
            }
            None => warn!("no fresh cached statistics, fetching from API"),
        }
    }

    let session = Arc::new(GithubSession::connect(config.client_config(),)?,);
    Ok(PayloadSource::Live(Clients::new(session,),),)
}

/// Builds the configuration from the optional file, then applies CLI
/// overrides and validates the result.
fn resolve_config(cli: &Cli,) -> Result<AppConfig, Error,>
{
    let mut config = match &cli.config {
        Some(path,) => load_config(path,)?,
        None => AppConfig::new(String::new(), String::new(),),
    };

    if let Some(username,) = &cli.username {
        config.github.username = username.trim().to_owned();
    }
    if let Some(token,) = &cli.token {
        config.github.token = token.trim().to_owned();
    }
    if let Some(visibility,) = cli.visibility {
        config.github.visibility = visibility;
    }
    if let Some(languages,) = &cli.exclude_languages {
        config.collection.excluded_languages = languages.clone();
    }
    if cli.no_views {
        config.collection.include_views = false;
    }
    if let Some(limit,) = cli.max_repositories {
        config.collection.max_repositories = Some(limit,);
    }
    if let Some(concurrency,) = cli.concurrency {
        config.collection.concurrency = concurrency;
    }
    if let Some(directory,) = &cli.output_dir {
        config.output.directory = directory.clone();
    }

    config.validate()?;
    Ok(config,)
}

fn log_level(verbose: u8, quiet: bool,) -> &'static str
{
    match (quiet, verbose,) {
        (true, _,) => "error",
        (false, 0,) => "info",
        (false, 1,) => "debug",
        (false, _,) => "trace",
    }
}

fn init_logging(cli: &Cli,)
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose, cli.quiet,),),);
    let _ = tracing_subscriber::fmt().with_env_filter(filter,).with_writer(std::io::stderr,).try_init();
}

fn spinner(quiet: bool,) -> ProgressBar
{
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_spinner(),),
    );
    pb.enable_steady_tick(Duration::from_millis(120,),);
    pb
}
