// src/checker/mod.rs
// =============================================================================
// This module decides whether a product's ingredient list is acceptable.
//
// Submodules:
// - language: Guesses which alphabet/language the composition is written in
// - stoplist: The two lists of disqualifying ingredient terms
// - inspect: Runs a fetched product page through detection, the stop-list
//            and field extraction, and reports what happened
//
// Rust concepts:
// - Traits: LanguageDetector lets us swap the detection strategy
// - pub use: Re-export items to simplify imports for users of this module
// =============================================================================

mod inspect;
mod language;
mod stoplist;

pub use inspect::{Inspection, Qualifier};
pub use language::{Language, LanguageDetector, ScriptDetector};
pub use stoplist::StopLists;
