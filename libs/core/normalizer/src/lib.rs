//! Label normalization for dimension-member deduplication (§4.H). Pure,
//! injectable, deterministic: the same label always normalizes to the same
//! `base_name`, independent of locale or process state.

mod stopwords;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Tokenizes and canonicalizes labels. Implementations must be pure and
/// deterministic; the registry builder treats this as the sole authority on
/// what counts as a "total" token (§4.G Stage 3 `hasTotal`).
pub trait LabelNormalizer: Send + Sync {
    /// NFC-normalize, lowercase, tokenize, drop stopwords/non-alphabetic
    /// tokens, sort lexicographically, join with a single space.
    fn normalize(&self, label: &str) -> String;

    /// `true` if any surviving token after normalization is a "total" marker
    /// in a language this normalizer understands.
    fn contains_total_token(&self, label: &str) -> bool {
        self.normalize(label).split(' ').any(|token| token == "total")
    }
}

/// Bilingual (English/French) default normalizer. WDS labels arrive in both
/// languages without a reliable per-field language tag, so the stopword set
/// and the "total" synonym list cover both rather than switching on locale.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNormalizer;

impl LabelNormalizer for DefaultNormalizer {
    fn normalize(&self, label: &str) -> String {
        let nfc: String = label.nfc().collect();
        let mut tokens: Vec<String> = nfc
            .unicode_words()
            .map(|word| word.to_lowercase())
            .filter(|word| word.chars().all(char::is_alphabetic))
            .filter(|word| !stopwords::is_stopword(word))
            .collect();
        tokens.sort();
        tokens.join(" ")
    }

    fn contains_total_token(&self, label: &str) -> bool {
        let nfc: String = label.nfc().collect();
        nfc.unicode_words()
            .map(|word| word.to_lowercase())
            .any(|word| stopwords::is_total_synonym(&word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_case_and_whitespace() {
        let normalizer = DefaultNormalizer;
        assert_eq!(normalizer.normalize("  Canada  "), "canada");
        assert_eq!(normalizer.normalize("canada"), "canada");
    }

    #[test]
    fn drops_stopwords_and_sorts_tokens() {
        let normalizer = DefaultNormalizer;
        // "of" is a stopword; remaining tokens sort lexicographically.
        assert_eq!(normalizer.normalize("Provinces of Canada"), "canada provinces");
    }

    #[test]
    fn drops_non_alphabetic_tokens() {
        let normalizer = DefaultNormalizer;
        assert_eq!(normalizer.normalize("Quarter 3, 2020"), "quarter");
    }

    #[test]
    fn recognizes_french_total_synonym() {
        let normalizer = DefaultNormalizer;
        assert!(normalizer.contains_total_token("Totaux, tous les groupes"));
        assert!(normalizer.contains_total_token("All strata, total"));
        assert!(!normalizer.contains_total_token("British Columbia"));
    }

    #[test]
    fn is_stable_across_repeated_calls() {
        let normalizer = DefaultNormalizer;
        let once = normalizer.normalize("North American Industry Classification System");
        let twice = normalizer.normalize("North American Industry Classification System");
        assert_eq!(once, twice);
    }
}
