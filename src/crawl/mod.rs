// src/crawl/mod.rs
// =============================================================================
// This module handles the concurrent catalog crawl.
//
// Features:
// - Two FIFO work queues: listing pages and product pages
// - One listing consumer plus a pool of product consumers
// - Failed fetches re-enter the pipeline based on the URL's shape
// - Shutdown driven by queue drain, not by task completion
// - Random delay before every request
//
// Rust concepts:
// - Arc: the crawler is shared by every task it spawns
// - tokio tasks and CancellationToken: consumers run until told to stop
// =============================================================================

mod fetch;
mod pipeline;
mod queue;
mod retry;
mod stats;

pub use fetch::{FetchOutcome, Fetcher};
pub use pipeline::Crawler;
pub use stats::StatsSnapshot;
