// Allow dead code for functions that are part of the API surface but not used in all code paths
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod batch;
mod cli;
mod config;
mod domain_utils;
mod export;
mod liveness;
mod logger;
mod normalizer;
mod resolver;
mod search;

use cli::Cli;
use config::AppConfig;
use logger::{ResolutionLogger, VerbosityLevel};
use resolver::{EntityResolver, ResolutionQuery, ResolutionResult};

/// Location bucket for rows that arrive without a hint
const UNKNOWN_LOCATION: &str = "UNKNOWN";

/// Global flag for interrupt signaling; the batch loop checks it between entities
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle --init-config first (before any other processing)
    if cli.init_config {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("Created default configuration file at: {}", path.display());
                println!("Edit this file to customize settings, then run sitefinder again.");
                return Ok(());
            }
            Err(e) => {
                eprintln!("Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = cli.validate() {
        eprintln!("Invalid arguments: {}", e);
        std::process::exit(2);
    }

    let verbosity = VerbosityLevel::from_flags(cli.verbose, cli.quiet);
    init_tracing(verbosity)?;

    let config_path = cli.config.as_deref().map(Path::new);
    let mut config = match AppConfig::load_or_default(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    apply_cli_overrides(&mut config, &cli);
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let logger = ResolutionLogger::new(verbosity, cli.no_progress);

    // First Ctrl+C stops between entities, the second one stops right now
    ctrlc::set_handler(move || {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            eprintln!("\nSecond interrupt, exiting immediately.");
            std::process::exit(130); // 128 + SIGINT
        }
        eprintln!("\nInterrupt received. Finishing the current entity; press Ctrl+C again to exit immediately.");
    })
    .unwrap_or_else(|e| {
        eprintln!("Warning: failed to set Ctrl-C handler: {}", e);
    });

    // validate() guarantees an input path outside --init-config
    let input = cli
        .input
        .as_ref()
        .expect("Input file is required when not using --init-config");

    let batch = batch::read_entity_file(
        Path::new(input),
        &cli.name_col,
        &cli.location_col,
        cli.limit,
    )?;

    let credentials = config.search_credentials();
    let mode = if credentials.is_some() {
        "search + guess"
    } else {
        "guess-only (no search credentials)"
    };

    if verbosity > VerbosityLevel::Silent {
        println!("sitefinder v{}", env!("CARGO_PKG_VERSION"));
        println!(
            "Input: {} ({} entities, {} blank rows skipped{})",
            input,
            batch.records.len(),
            batch.skipped_blank,
            if batch.truncated {
                format!(", truncated to first {}", cli.limit)
            } else {
                String::new()
            }
        );
        println!("Mode: {}", mode);
        println!(
            "Guess TLDs: {}",
            config.resolver.candidate_tlds.join(", ")
        );
        println!("Probe timeout: {}s", config.http.timeout_secs);
        println!("Output: {}/ ({})", cli.out, cli.format);
        println!();
    }

    if batch.records.is_empty() {
        logger.error("No usable rows in the input file");
        return Ok(());
    }

    let resolver =
        EntityResolver::new(config.resolver_settings()).context("Failed to build HTTP client")?;

    let total = batch.records.len();
    let entity_sleep = config.entity_sleep();
    let start = Instant::now();

    logger.start_progress(total as u64).await;

    let mut results: Vec<ResolutionResult> = Vec::with_capacity(total);
    let mut interrupted = false;

    for (i, record) in batch.records.iter().enumerate() {
        if is_interrupted() {
            logger.log_interrupted();
            interrupted = true;
            break;
        }

        let location_hint = if record.location_hint.is_empty() {
            UNKNOWN_LOCATION.to_string()
        } else {
            record.location_hint.clone()
        };

        logger.log_entity_start(i + 1, total, &record.entity_name);
        logger.set_current_entity(&record.entity_name).await;

        let mut query = ResolutionQuery::new(record.entity_name.clone(), location_hint)
            .with_tlds(config.resolver.candidate_tlds.clone())
            .with_timeout(config.probe_timeout());
        if let Some(creds) = &credentials {
            query = query.with_credentials(creds.clone());
        }

        let result = resolver.resolve(&query).await;
        logger.log_entity_outcome(&result);
        results.push(result);
        logger.advance().await;

        // Pacing only matters when the search API is in play
        if credentials.is_some() && !entity_sleep.is_zero() && i + 1 < total {
            tokio::time::sleep(entity_sleep).await;
        }
    }

    logger.finish_progress().await;

    let out_dir = Path::new(&cli.out);
    let written = match cli.format.as_str() {
        "json" => export::export_json(&results, out_dir)?,
        _ => export::export_csv(&results, out_dir)?,
    };
    logger.log_export_success(&written.display().to_string());

    export::print_run_summary(&results, start.elapsed(), interrupted);

    Ok(())
}

/// CLI flags and environment variables win over the config file.
fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(api_key) = &cli.api_key {
        config.search.api_key = api_key.clone();
    }
    if let Some(cx) = &cli.cx {
        config.search.cx = cx.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(tlds) = &cli.tlds {
        config.resolver.candidate_tlds = tlds.iter().map(|t| t.trim().to_string()).collect();
    }
    if let Some(sleep) = cli.sleep {
        config.resolver.entity_sleep_ms = (sleep * 1000.0).round() as u64;
    }
}

/// Diagnostics go to stderr through `tracing`; RUST_LOG wins when set,
/// otherwise -vv turns on debug output for this crate only.
fn init_tracing(verbosity: VerbosityLevel) -> Result<()> {
    let default_filter = match verbosity {
        VerbosityLevel::Debug => "sitefinder=debug",
        _ => "off",
    };
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
