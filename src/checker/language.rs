// src/checker/language.rs
// =============================================================================
// This module guesses the language of an ingredient list.
//
// The stop-lists are split by alphabet, so all we really need to know is
// whether the text is mostly Latin or mostly Cyrillic. ScriptDetector counts
// letters per script and picks the dominant one.
//
// Detection can fail:
// - too few letters to say anything (e.g. "5%" or "-")
// - two scripts tied for first place
// Callers treat a failure as "skip this product", never as a crash.
// =============================================================================

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Latin alphabet
    English,
    /// Cyrillic alphabet
    Russian,
    /// Letters from neither alphabet
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    #[error("text has {letters} letter(s), at least {needed} are needed")]
    TooShort { letters: usize, needed: usize },

    #[error("text is evenly split between alphabets")]
    Ambiguous,
}

/// Anything that can tell which language a composition is written in
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Result<Language, DetectionError>;
}

#[derive(Debug, Clone)]
pub struct ScriptDetector {
    min_letters: usize,
}

impl ScriptDetector {
    pub fn new(min_letters: usize) -> Self {
        Self { min_letters }
    }
}

impl Default for ScriptDetector {
    fn default() -> Self {
        Self::new(4)
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Result<Language, DetectionError> {
        let mut latin = 0;
        let mut cyrillic = 0;
        let mut other = 0;

        for c in text.chars().filter(|c| c.is_alphabetic()) {
            if is_latin(c) {
                latin += 1;
            } else if is_cyrillic(c) {
                cyrillic += 1;
            } else {
                other += 1;
            }
        }

        let letters = latin + cyrillic + other;
        if letters < self.min_letters {
            return Err(DetectionError::TooShort {
                letters,
                needed: self.min_letters,
            });
        }

        let mut counts = [
            (Language::English, latin),
            (Language::Russian, cyrillic),
            (Language::Other, other),
        ];
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        if counts[0].1 == counts[1].1 {
            return Err(DetectionError::Ambiguous);
        }

        Ok(counts[0].0)
    }
}

// Basic Latin plus the Latin-1 / Extended-A / Extended-B letters
fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c)
}

fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_latin_composition() {
        let detector = ScriptDetector::default();
        assert_eq!(
            detector.detect("aqua, parfum, alcohol denat"),
            Ok(Language::English)
        );
    }

    #[test]
    fn test_detect_cyrillic_composition() {
        let detector = ScriptDetector::default();
        assert_eq!(detector.detect("вода, глицерин"), Ok(Language::Russian));
    }

    #[test]
    fn test_majority_wins_in_mixed_text() {
        // Russian labels often carry a few INCI names in Latin
        let detector = ScriptDetector::default();
        assert_eq!(
            detector.detect("вода, глицерин, масло ши (shea)"),
            Ok(Language::Russian)
        );
    }

    #[test]
    fn test_other_script() {
        let detector = ScriptDetector::default();
        assert_eq!(detector.detect("νερό, γλυκερίνη"), Ok(Language::Other));
    }

    #[test]
    fn test_too_short() {
        let detector = ScriptDetector::default();
        assert_eq!(
            detector.detect("5% -"),
            Err(DetectionError::TooShort { letters: 0, needed: 4 })
        );
    }

    #[test]
    fn test_tie_is_ambiguous() {
        let detector = ScriptDetector::default();
        assert_eq!(detector.detect("abcd абвг"), Err(DetectionError::Ambiguous));
    }
}
