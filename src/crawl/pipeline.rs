// src/crawl/pipeline.rs
// =============================================================================
// This module wires the crawl together.
//
//   start urls -> discoverers -> listing queue -> listing consumer
//              -> product queue -> product consumers (xN) -> sink
//
// Tasks:
// - discover: puts a category URL on the listing queue, then every page of
//   its pagination control
// - consume_listings: turns each listing page into product URLs
// - consume_products: inspects each product page and saves qualifying ones
//
// A failed fetch is sent back into the graph by reschedule(): listing-shaped
// URLs get a fresh discoverer, product-shaped ones go back on the product
// queue. Each URL has a limited retry budget.
//
// The consumers loop forever, so the crawl can't end "when the tasks
// finish". Instead run() walks through explicit phases and moves on when a
// queue reports zero outstanding work:
//
//   Discovering -> DrainingListings -> DrainingProducts -> Shutdown
//                        ^                    |
//                        +--------------------+  (listing work reappeared)
// =============================================================================

use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::fetch::{DropReason, FetchOutcome, Fetcher};
use super::queue::WorkQueue;
use super::retry::RetryBudget;
use super::stats::{bump, CrawlStats, StatsSnapshot};
use crate::checker::{Inspection, Qualifier};
use crate::config::CrawlConfig;
use crate::product::Page;
use crate::sink::RecordSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Pagination discoverers run for every start URL
    Discovering,
    /// Listing consumer and product pool run until the listing queue is joined
    DrainingListings,
    /// Listing consumer stopped, waiting for the product queue
    DrainingProducts,
    /// Both queues empty, product pool stopped
    Shutdown,
}

pub struct Crawler {
    start_urls: Vec<String>,
    workers: usize,
    fetcher: Fetcher,
    qualifier: Qualifier,
    sink: Arc<dyn RecordSink>,
    listings: Arc<WorkQueue>,
    products: Arc<WorkQueue>,
    retries: RetryBudget,
    stats: CrawlStats,
}

impl Crawler {
    pub fn new(
        config: &CrawlConfig,
        fetcher: Fetcher,
        qualifier: Qualifier,
        sink: Arc<dyn RecordSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            start_urls: config.start_urls.clone(),
            workers: config.workers,
            fetcher,
            qualifier,
            sink,
            listings: Arc::new(WorkQueue::new("listings")),
            products: Arc::new(WorkQueue::new("products")),
            retries: RetryBudget::new(config.max_retries),
            stats: CrawlStats::default(),
        })
    }

    // Runs the whole crawl and returns what happened
    pub async fn run(self: Arc<Self>) -> StatsSnapshot {
        let pool_token = CancellationToken::new();
        let mut pool: Vec<JoinHandle<()>> = Vec::new();
        let mut phase = Phase::Discovering;

        loop {
            info!(
                ?phase,
                listings = self.listings.outstanding(),
                products = self.products.outstanding(),
                "entering crawl phase"
            );

            phase = match phase {
                Phase::Discovering => {
                    let discoverers = self
                        .start_urls
                        .iter()
                        .map(|url| Arc::clone(&self).discover(url.clone()));
                    join_all(discoverers).await;

                    pool = (0..self.workers)
                        .map(|worker| {
                            tokio::spawn(
                                Arc::clone(&self).consume_products(worker, pool_token.clone()),
                            )
                        })
                        .collect();

                    Phase::DrainingListings
                }

                Phase::DrainingListings => {
                    let listing_token = CancellationToken::new();
                    let listing_consumer = tokio::spawn(
                        Arc::clone(&self).consume_listings(listing_token.clone()),
                    );

                    self.listings.join().await;
                    listing_token.cancel();
                    finish(self.listings.name(), listing_consumer).await;

                    Phase::DrainingProducts
                }

                Phase::DrainingProducts => {
                    self.products.join().await;

                    // A product consumer may have handed a listing-shaped URL
                    // to a new discoverer after the listing consumer stopped
                    if self.listings.outstanding() > 0 {
                        warn!(
                            outstanding = self.listings.outstanding(),
                            "listing work appeared while draining products, resuming listings"
                        );
                        Phase::DrainingListings
                    } else {
                        Phase::Shutdown
                    }
                }

                Phase::Shutdown => break,
            };
        }

        pool_token.cancel();
        for worker in pool {
            finish(self.products.name(), worker).await;
        }

        self.stats.snapshot()
    }

    // Pagination discoverer
    //
    // Returns a boxed future because it can be spawned again from reschedule(),
    // which runs inside this very future.
    fn discover(self: Arc<Self>, start_url: String) -> BoxFuture<'static, ()> {
        async move {
            self.listings.put(start_url.clone());

            let Some(page) = self.fetch(&start_url).await else {
                return;
            };

            let pages = page.pagination_links();
            debug!(url = %start_url, pages = pages.len(), "pagination discovered");
            for link in pages {
                self.listings.put(link);
            }
        }
        .boxed()
    }

    async fn consume_listings(self: Arc<Self>, cancel: CancellationToken) {
        while let Some(url) = next_url(&self.listings, &cancel).await {
            if let Some(page) = self.fetch(&url).await {
                let products = page.product_links();
                debug!(url = %url, products = products.len(), "listing page read");
                for link in products {
                    self.products.put(link);
                }
            }
            // Done even when the fetch failed: a reschedule is a new entry
            self.listings.task_done();
        }
        debug!("listing consumer stopped");
    }

    async fn consume_products(self: Arc<Self>, worker: usize, cancel: CancellationToken) {
        while let Some(url) = next_url(&self.products, &cancel).await {
            if let Some(page) = self.fetch(&url).await {
                self.inspect(worker, page).await;
            }
            self.products.task_done();
        }
        debug!(worker, "product consumer stopped");
    }

    async fn inspect(&self, worker: usize, page: Page) {
        bump(&self.stats.products_inspected);
        let url = page.url();

        match self.qualifier.inspect(&page) {
            Inspection::NoComposition => {
                bump(&self.stats.no_composition);
                debug!(worker, url, "no composition on page, skipping");
            }
            Inspection::Undetected { reason } => {
                bump(&self.stats.undetected);
                debug!(worker, url, %reason, "composition language unknown, skipping");
            }
            Inspection::Rejected { language, term } => {
                bump(&self.stats.rejected);
                debug!(worker, url, ?language, %term, "rejected by stop-list");
            }
            Inspection::Incomplete { reason, .. } => {
                bump(&self.stats.incomplete);
                warn!(worker, url, %reason, "product qualified but its record is incomplete");
            }
            Inspection::Qualified { record, .. } => match self.sink.append(&record).await {
                Ok(()) => {
                    bump(&self.stats.saved);
                    info!(worker, url, title = %record.title, "product saved");
                }
                Err(e) => {
                    bump(&self.stats.sink_failures);
                    error!(worker, url, error = %e, "failed to save product");
                }
            },
        }
    }

    // Fetches a page; failures are rescheduled or dropped here and yield None
    async fn fetch(self: &Arc<Self>, url: &str) -> Option<Page> {
        match self.fetcher.fetch(url).await {
            FetchOutcome::Parsed(page) => {
                bump(&self.stats.pages_fetched);
                Some(page)
            }
            failed => {
                self.reschedule(failed);
                None
            }
        }
    }

    fn reschedule(self: &Arc<Self>, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Parsed(_) => {}

            FetchOutcome::RescheduleAsListing(url) => {
                if !self.spend_retry(&url) {
                    return;
                }
                info!(url = %url, "listing failed, starting a new pagination pass");

                // Keeps the listing queue from draining until the pass is over
                let hold = self.listings.hold();
                let crawler = Arc::clone(self);
                tokio::spawn(async move {
                    crawler.discover(url).await;
                    drop(hold);
                });
            }

            FetchOutcome::RescheduleAsProduct(url) => {
                if !self.spend_retry(&url) {
                    return;
                }
                info!(url = %url, "product failed, queueing it again");
                self.products.put(url);
            }

            FetchOutcome::Drop { url, reason } => self.drop_url(&url, reason),
        }
    }

    fn spend_retry(&self, url: &str) -> bool {
        if self.retries.try_spend(url) {
            bump(&self.stats.rescheduled);
            true
        } else {
            self.drop_url(url, DropReason::RetriesExhausted);
            false
        }
    }

    fn drop_url(&self, url: &str, reason: DropReason) {
        bump(&self.stats.dropped);
        match reason {
            DropReason::ClientError(status) => {
                warn!(url, status = status.as_u16(), "a problem with the url, dropping it")
            }
            DropReason::UnexpectedStatus(status) => {
                warn!(url, status = status.as_u16(), "unexpected status, dropping url")
            }
            DropReason::UnroutableUrl => {
                warn!(url, "failed url is neither a listing nor a product, dropping it")
            }
            DropReason::RetriesExhausted => warn!(url, "retries exhausted, dropping url"),
        }
    }
}

// Next URL from a queue, or None once the consumer is cancelled
//
// Cancellation is only observed here, between items, so a URL that was
// taken is always marked done.
async fn next_url(queue: &WorkQueue, cancel: &CancellationToken) -> Option<String> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        url = queue.get() => url,
    }
}

async fn finish(queue: &str, consumer: JoinHandle<()>) {
    if let Err(e) = consumer.await {
        error!(queue, error = %e, "consumer task failed");
    }
}
