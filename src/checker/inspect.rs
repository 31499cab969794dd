// src/checker/inspect.rs
// =============================================================================
// This module runs one product page through the qualification steps:
//
//   composition? -> detect language -> stop-list -> extract record
//
// Every step that can fail ends the inspection with a descriptive
// Inspection variant instead of an error. The crawl keeps going no matter
// what a single product page looks like.
// =============================================================================

use serde::Serialize;

use super::{Language, LanguageDetector, StopLists};
use crate::product::{extract_record, Page, ProductRecord};

// What happened to a product page
//
// #[serde(tag = "outcome")] gives JSON like {"outcome": "rejected", ...}
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Inspection {
    /// The page has no ingredient list (not every product has one)
    NoComposition,
    /// The language of the ingredient list couldn't be determined
    Undetected { reason: String },
    /// A stop-list term was found
    Rejected { language: Language, term: String },
    /// Qualified, but the page lacks fields the record needs
    Incomplete { language: Language, reason: String },
    /// Qualified and extracted, ready for the sink
    Qualified {
        language: Language,
        record: ProductRecord,
    },
}

pub struct Qualifier {
    detector: Box<dyn LanguageDetector>,
    stop_lists: StopLists,
}

impl Qualifier {
    pub fn new(detector: Box<dyn LanguageDetector>, stop_lists: StopLists) -> Self {
        Self {
            detector,
            stop_lists,
        }
    }

    pub fn inspect(&self, page: &Page) -> Inspection {
        let Some(composition) = page.composition() else {
            return Inspection::NoComposition;
        };

        let language = match self.detector.detect(&composition) {
            Ok(language) => language,
            Err(e) => {
                return Inspection::Undetected {
                    reason: e.to_string(),
                }
            }
        };

        if !self.stop_lists.qualifies(&composition, language) {
            let term = self
                .stop_lists
                .first_match(&composition, language)
                .unwrap_or_default();
            return Inspection::Rejected {
                language,
                term: term.to_string(),
            };
        }

        match extract_record(page) {
            Ok(record) => Inspection::Qualified { language, record },
            Err(e) => Inspection::Incomplete {
                language,
                reason: e.to_string(),
            },
        }
    }
}
