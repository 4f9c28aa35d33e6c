//! Small hand-maintained stopword list. Not meant to be linguistically
//! exhaustive — only common function words that show up in WDS dimension
//! labels often enough to hurt deduplication if left in (`"Canada"` vs
//! `"of Canada"`).
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "by", "for", "in", "of", "or", "the", "to", "with",
    "au", "aux", "de", "des", "du", "en", "et", "l", "la", "le", "les", "par", "pour", "un", "une",
];

const TOTAL_SYNONYMS: &[&str] = &["total", "totaux", "totale", "totales"];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

pub fn is_total_synonym(word: &str) -> bool {
    TOTAL_SYNONYMS.contains(&word)
}
