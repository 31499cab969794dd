// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (RUST_LOG, defaults to info for this crate)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = product not checked, 2 = error)
//
// The runtime is single-threaded on purpose: tasks take turns at every
// .await (network I/O, waiting on a queue), which is all the concurrency a
// polite crawler needs.
// =============================================================================

mod checker;
mod cli;
mod config;
mod crawl;
mod product;
mod sink;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checker::{Inspection, Qualifier, ScriptDetector};
use cli::{Cli, Commands};
use config::CrawlConfig;
use crawl::{Crawler, FetchOutcome, Fetcher, StatsSnapshot};
use sink::CsvSink;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "composition_crawler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            config,
            out,
            workers,
            max_delay_ms,
            json,
        } => handle_crawl(&config, &out, workers, max_delay_ms, json).await,
        Commands::Product { url, config, json } => handle_product(&url, &config, json).await,
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(
    config_path: &Path,
    out: &Path,
    workers: Option<usize>,
    max_delay_ms: Option<u64>,
    json: bool,
) -> Result<i32> {
    let mut config = CrawlConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(workers) = workers {
        config.workers = workers;
    }
    if let Some(max_delay_ms) = max_delay_ms {
        config.max_delay_ms = max_delay_ms;
    }
    config.validate()?;

    let sink = CsvSink::open(out)?;
    println!("🔍 Crawling {} categor(ies)", config.start_urls.len());
    println!("📄 Saving qualifying products to {}", sink.path().display());

    let fetcher = Fetcher::new(&config).context("building the HTTP client")?;
    let qualifier = Qualifier::new(
        Box::new(ScriptDetector::default()),
        config.stop_lists.clone(),
    );
    let crawler = Crawler::new(&config, fetcher, qualifier, Arc::new(sink));

    let stats = crawler.run().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_summary(&stats);
    }
    Ok(0)
}

// Handles the 'product' subcommand
//
// Same fetch and checks as the crawl, without the delay, retries or sink.
async fn handle_product(url: &str, config_path: &Path, json: bool) -> Result<i32> {
    let mut config = CrawlConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.max_delay_ms = 0;

    let fetcher = Fetcher::new(&config).context("building the HTTP client")?;
    let page = match fetcher.fetch(url).await {
        FetchOutcome::Parsed(page) => page,
        FetchOutcome::Drop { reason, .. } => {
            eprintln!("❌ Could not fetch {}: {:?}", url, reason);
            return Ok(1);
        }
        FetchOutcome::RescheduleAsListing(_) | FetchOutcome::RescheduleAsProduct(_) => {
            eprintln!("⏱️  {} is temporarily unavailable, try again later", url);
            return Ok(1);
        }
    };

    let qualifier = Qualifier::new(Box::new(ScriptDetector::default()), config.stop_lists);
    let inspection = qualifier.inspect(&page);

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        print_inspection(url, &inspection);
    }
    Ok(0)
}

fn print_inspection(url: &str, inspection: &Inspection) {
    println!("🔍 {}", url);

    match inspection {
        Inspection::NoComposition => println!("⚠️  No ingredient list on this page"),
        Inspection::Undetected { reason } => println!("⚠️  Language not detected: {}", reason),
        Inspection::Rejected { language, term } => {
            println!("❌ Rejected ({:?}): contains '{}'", language, term)
        }
        Inspection::Incomplete { language, reason } => {
            println!("⚠️  Qualifies ({:?}) but the record is incomplete: {}", language, reason)
        }
        Inspection::Qualified { language, record } => {
            println!("✅ Qualifies ({:?})", language);
            for (column, value) in product::COLUMNS.iter().zip(record.to_row()) {
                println!("   {:<18} {}", column, value);
            }
        }
    }
}

fn print_summary(stats: &StatsSnapshot) {
    println!();
    println!("📊 Summary:");
    println!("   🌐 Pages fetched: {}", stats.pages_fetched);
    println!("   🔁 Rescheduled: {}", stats.rescheduled);
    println!("   🗑️  Dropped: {}", stats.dropped);
    println!("   📋 Products inspected: {}", stats.products_inspected);
    println!("      no composition: {}", stats.no_composition);
    println!("      language unknown: {}", stats.undetected);
    println!("      rejected: {}", stats.rejected);
    println!("      incomplete: {}", stats.incomplete);
    println!("   ✅ Saved: {}", stats.saved);
    if stats.sink_failures > 0 {
        println!("   ⚠️  Failed to save: {}", stats.sink_failures);
    }
}
