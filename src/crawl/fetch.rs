// src/crawl/fetch.rs
// =============================================================================
// This module fetches one catalog page and classifies the result.
//
// Every fetch:
// 1. Sleeps a random 0..=max_delay first (crude rate limiting)
// 2. Sends one GET request
// 3. Turns the response into a FetchOutcome
//
// HTTP status bands:
// - 2xx/3xx: success, the body becomes a Page
// - 5xx:     transient, send the URL back into the pipeline
// - 4xx:     permanent, drop it
// - other:   unexpected, drop it
//
// Network failures (timeouts, DNS, refused connections) are treated like 5xx.
//
// The Fetcher never touches the queues itself. "Send the URL back" is a
// returned instruction (RescheduleAsListing / RescheduleAsProduct) that the
// caller carries out. Which one is decided by the shape of the URL alone,
// see UrlShape.
// =============================================================================

use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use crate::config::CrawlConfig;
use crate::product::Page;

// What kind of page a URL points at, judged by counting its slashes
//
// "https://shop.example/argan-shampoo"   -> 3 slashes -> Product
// "https://shop.example/hair/shampoo"    -> 4 slashes -> Listing
// "https://shop.example"                 -> 2 slashes -> Unknown
//
// The catalog puts products directly under the root and categories at least
// one level deeper, so this is the only classification rule we need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlShape {
    Product,
    Listing,
    Unknown,
}

impl UrlShape {
    pub fn of(url: &str) -> Self {
        match url.matches('/').count() {
            3 => UrlShape::Product,
            n if n > 3 => UrlShape::Listing,
            _ => UrlShape::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// 4xx, the URL itself is bad
    ClientError(StatusCode),
    /// 1xx or anything else we don't expect from a GET
    UnexpectedStatus(StatusCode),
    /// Failed, but the URL is neither product- nor listing-shaped
    UnroutableUrl,
    /// Failed too many times already
    RetriesExhausted,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Parsed(Page),
    RescheduleAsListing(String),
    RescheduleAsProduct(String),
    Drop { url: String, reason: DropReason },
}

// Picks the reschedule instruction for a URL whose fetch failed transiently
pub fn reroute(url: &str) -> FetchOutcome {
    match UrlShape::of(url) {
        UrlShape::Listing => FetchOutcome::RescheduleAsListing(url.to_string()),
        UrlShape::Product => FetchOutcome::RescheduleAsProduct(url.to_string()),
        UrlShape::Unknown => FetchOutcome::Drop {
            url: url.to_string(),
            reason: DropReason::UnroutableUrl,
        },
    }
}

pub struct Fetcher {
    client: Client,
    max_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &CrawlConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self::with_client(client, config.max_delay()))
    }

    pub fn with_client(client: Client, max_delay: Duration) -> Self {
        Self { client, max_delay }
    }

    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        self.pause().await;

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "request failed");
                return reroute(url);
            }
        };

        let status = response.status();
        info!(url, status = status.as_u16(), "fetched");

        if status.is_success() || status.is_redirection() {
            let final_url = response.url().to_string();
            match response.text().await {
                Ok(body) => FetchOutcome::Parsed(Page::new(url, body).served_from(final_url)),
                Err(e) => {
                    warn!(url, error = %e, "failed to read response body");
                    reroute(url)
                }
            }
        } else if status.is_server_error() {
            reroute(url)
        } else if status.is_client_error() {
            FetchOutcome::Drop {
                url: url.to_string(),
                reason: DropReason::ClientError(status),
            }
        } else {
            FetchOutcome::Drop {
                url: url.to_string(),
                reason: DropReason::UnexpectedStatus(status),
            }
        }
    }

    async fn pause(&self) {
        let max_ms = self.max_delay.as_millis() as u64;
        if max_ms == 0 {
            return;
        }

        let delay = rand::rng().random_range(0..=max_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}
