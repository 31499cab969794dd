// src/product/record.rs
// =============================================================================
// The row we store for every product that passes the stop-list.
//
// The output table has fixed columns, so the field order of ProductRecord
// IS the column order. Don't reorder the struct without reordering COLUMNS.
//
// Numbers on the page are messy. A volume or price we can't parse becomes 0
// instead of failing the whole record, and price per volume is 0 whenever
// the volume is 0.
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::page::{selector, text_of, Page};

pub const COLUMNS: [&str; 9] = [
    "section",
    "kind",
    "subkind",
    "title",
    "subtitle",
    "volume",
    "price",
    "price_per_volume",
    "link",
];

// Breadcrumb levels the catalog doesn't have are shown as a dash
const NO_LEVEL: &str = "-";

// Length of the currency suffix after the price, e.g. " руб."
const PRICE_SUFFIX_CHARS: usize = 5;

// The "Объем: 250 мл" line on a product page
static VOLUME_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Объем:\s\d+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("product page has no {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub section: String,
    pub kind: String,
    pub subkind: String,
    pub title: String,
    pub subtitle: String,
    pub volume: u32,
    pub price: u32,
    pub price_per_volume: f64,
    pub link: String,
}

impl ProductRecord {
    /// The record as table cells, in column order
    pub fn to_row(&self) -> [String; 9] {
        [
            self.section.clone(),
            self.kind.clone(),
            self.subkind.clone(),
            self.title.clone(),
            self.subtitle.clone(),
            self.volume.to_string(),
            self.price.to_string(),
            self.price_per_volume.to_string(),
            self.link.clone(),
        ]
    }
}

// round(price / volume, 2), or 0 for a zero volume
//
// Exact halves round to even, so 1 / 8 = 0.125 gives 0.12.
pub fn price_per_volume(price: u32, volume: u32) -> f64 {
    if volume == 0 {
        return 0.0;
    }
    (price as f64 / volume as f64 * 100.0).round_ties_even() / 100.0
}

// Builds a ProductRecord from a product page
//
// Breadcrumbs, title and subtitle are structural: without them the page
// isn't a product page we understand, so the record is Incomplete.
pub fn extract_record(page: &Page) -> Result<ProductRecord, ExtractError> {
    let document = page.document();

    let crumbs: Vec<String> = document
        .select(&selector("ol.breadcrumbs.list-inline a[href]"))
        .map(|a| text_of(a).trim().to_string())
        .collect();

    // crumbs[0] is the home page link
    if crumbs.len() < 2 {
        return Err(ExtractError::Missing("breadcrumbs"));
    }
    let level = |i: usize| crumbs.get(i).cloned().unwrap_or_else(|| NO_LEVEL.to_string());

    let title = document
        .select(&selector(r#"h1[itemprop="name"]"#))
        .next()
        .map(|h1| text_of(h1).trim().to_string())
        .ok_or(ExtractError::Missing("title"))?;

    let subtitle = document
        .select(&selector("h2.model"))
        .next()
        .map(|h2| text_of(h2).trim().to_string())
        .ok_or(ExtractError::Missing("subtitle"))?;

    let volume = document
        .select(&selector("li"))
        .map(text_of)
        .find(|text| VOLUME_LINE.is_match(text))
        .map(|text| parse_volume(&text))
        .unwrap_or(0);

    let price = document
        .select(&selector("span.price-new"))
        .next()
        .map(|span| parse_price(&text_of(span)))
        .unwrap_or(0);

    Ok(ProductRecord {
        section: level(1),
        kind: level(2),
        subkind: level(3),
        title,
        subtitle,
        volume,
        price,
        price_per_volume: price_per_volume(price, volume),
        link: page.url().to_string(),
    })
}

// "Объем: 250 мл" -> 250
fn parse_volume(text: &str) -> u32 {
    text.split_whitespace()
        .nth(1)
        .and_then(|number| number.parse().ok())
        .unwrap_or(0)
}

// "1250 руб." -> 1250
fn parse_price(text: &str) -> u32 {
    let text = text.trim();
    let keep = text.chars().count().saturating_sub(PRICE_SUFFIX_CHARS);
    let number: String = text.chars().take(keep).collect();
    number.trim().parse().unwrap_or(0)
}
