// src/checker/stoplist.rs
// =============================================================================
// The two stop-lists: ingredient terms that disqualify a product.
//
// A composition is rejected when any term of the list picked for its
// language occurs anywhere in the (lower-cased) text. Plain substring
// matching, no tokenising: "alcohol denat" also hits "alcohol denat.".
//
// Only English uses the Latin list. Everything else, including languages we
// have no list for, falls back to the Cyrillic one.
// =============================================================================

use serde::Deserialize;

use super::Language;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopLists {
    #[serde(default)]
    pub latin: Vec<String>,
    #[serde(default)]
    pub cyrillic: Vec<String>,
}

impl StopLists {
    #[cfg(test)]
    pub fn new(latin: Vec<String>, cyrillic: Vec<String>) -> Self {
        Self { latin, cyrillic }.normalized()
    }

    // Lower-cases and trims every term, dropping blank ones
    //
    // A blank term would match every composition.
    pub fn normalized(self) -> Self {
        fn clean(terms: Vec<String>) -> Vec<String> {
            terms
                .into_iter()
                .map(|term| term.trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect()
        }

        Self {
            latin: clean(self.latin),
            cyrillic: clean(self.cyrillic),
        }
    }

    pub fn for_language(&self, language: Language) -> &[String] {
        match language {
            Language::English => &self.latin,
            Language::Russian | Language::Other => &self.cyrillic,
        }
    }

    /// First stop-list term found in the composition, if any
    pub fn first_match(&self, composition: &str, language: Language) -> Option<&str> {
        self.for_language(language)
            .iter()
            .find(|term| composition.contains(term.as_str()))
            .map(String::as_str)
    }

    pub fn qualifies(&self, composition: &str, language: Language) -> bool {
        self.first_match(composition, language).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists() -> StopLists {
        StopLists::new(
            vec!["alcohol denat".into(), "paraben".into()],
            vec!["спирт".into(), "парабен".into()],
        )
    }

    #[test]
    fn test_english_stop_term_rejects() {
        let lists = lists();
        assert!(!lists.qualifies("aqua, parfum, alcohol denat", Language::English));
        assert_eq!(
            lists.first_match("aqua, parfum, alcohol denat", Language::English),
            Some("alcohol denat")
        );
    }

    #[test]
    fn test_clean_cyrillic_composition_qualifies() {
        assert!(lists().qualifies("вода, глицерин", Language::Russian));
    }

    #[test]
    fn test_substring_match() {
        assert!(!lists().qualifies("methylparaben, aqua", Language::English));
    }

    #[test]
    fn test_lists_are_not_mixed() {
        // A Cyrillic term only counts when the text was detected as non-English
        let lists = lists();
        assert!(lists.qualifies("aqua, спирт", Language::English));
        assert!(!lists.qualifies("aqua, спирт", Language::Russian));
    }

    #[test]
    fn test_other_language_uses_cyrillic_list() {
        assert_eq!(
            lists().for_language(Language::Other),
            lists().for_language(Language::Russian)
        );
    }

    #[test]
    fn test_qualification_is_repeatable() {
        let lists = lists();
        let text = "aqua, glycerin, paraben";
        let first = lists.qualifies(text, Language::English);
        for _ in 0..5 {
            assert_eq!(lists.qualifies(text, Language::English), first);
        }
    }
}
