// src/crawl/stats.rs
// =============================================================================
// Counters describing what a crawl did.
//
// Every task updates the same CrawlStats, so the counters are atomics.
// snapshot() copies them into a plain serializable struct for the final
// report (table or JSON, see main.rs).
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct CrawlStats {
    pub pages_fetched: AtomicUsize,
    pub rescheduled: AtomicUsize,
    pub dropped: AtomicUsize,
    pub products_inspected: AtomicUsize,
    pub no_composition: AtomicUsize,
    pub undetected: AtomicUsize,
    pub rejected: AtomicUsize,
    pub incomplete: AtomicUsize,
    pub saved: AtomicUsize,
    pub sink_failures: AtomicUsize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub pages_fetched: usize,
    pub rescheduled: usize,
    pub dropped: usize,
    pub products_inspected: usize,
    pub no_composition: usize,
    pub undetected: usize,
    pub rejected: usize,
    pub incomplete: usize,
    pub saved: usize,
    pub sink_failures: usize,
}

// Counters are independent; Relaxed is all they need
pub(crate) fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl CrawlStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        let read = |counter: &AtomicUsize| counter.load(Ordering::Relaxed);

        StatsSnapshot {
            pages_fetched: read(&self.pages_fetched),
            rescheduled: read(&self.rescheduled),
            dropped: read(&self.dropped),
            products_inspected: read(&self.products_inspected),
            no_composition: read(&self.no_composition),
            undetected: read(&self.undetected),
            rejected: read(&self.rejected),
            incomplete: read(&self.incomplete),
            saved: read(&self.saved),
            sink_failures: read(&self.sink_failures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = CrawlStats::default();
        bump(&stats.pages_fetched);
        bump(&stats.pages_fetched);
        bump(&stats.saved);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.pages_fetched, 2);
        assert_eq!(snapshot.saved, 1);
        assert_eq!(snapshot.rejected, 0);
    }
}
