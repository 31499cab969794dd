// src/crawl/retry.rs
// =============================================================================
// Caps how often a single URL is sent back into the pipeline.
//
// Without a cap a page that keeps answering 503 would be rescheduled
// forever and the queues would never drain.
// =============================================================================

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub struct RetryBudget {
    limit: u32,
    used: Mutex<HashMap<String, u32>>,
}

impl RetryBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            used: Mutex::new(HashMap::new()),
        }
    }

    // Spends one retry for this URL; false once the budget is gone
    pub fn try_spend(&self, url: &str) -> bool {
        let mut used = self.used.lock().unwrap_or_else(PoisonError::into_inner);
        let count = used.entry(url.to_string()).or_insert(0);

        if *count >= self.limit {
            return false;
        }
        *count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_per_url() {
        let budget = RetryBudget::new(2);
        assert!(budget.try_spend("https://shop.example/a"));
        assert!(budget.try_spend("https://shop.example/a"));
        assert!(!budget.try_spend("https://shop.example/a"));

        // Other URLs have their own budget
        assert!(budget.try_spend("https://shop.example/b"));
    }

    #[test]
    fn test_zero_budget_never_retries() {
        let budget = RetryBudget::new(0);
        assert!(!budget.try_spend("https://shop.example/a"));
    }
}
