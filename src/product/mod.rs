// src/product/mod.rs
// =============================================================================
// This module knows the catalog's page layout.
//
// Submodules:
// - page: a fetched page, plus the links and ingredient text inside it
// - record: the nine-column ProductRecord extracted from a product page
// =============================================================================

mod page;
mod record;

pub use page::Page;
pub use record::{extract_record, ProductRecord, COLUMNS};
