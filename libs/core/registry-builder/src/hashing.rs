use sha2::{Digest, Sha256};
use wds_domain_models::Hash12;

/// First 12 hex characters of the SHA-256 digest of `input`, the content
/// address used throughout this pipeline (§3 GLOSSARY "Hash").
pub fn h12(input: &str) -> Hash12 {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    Hash12::from_full_hex(&hex::encode(digest))
}

/// Pipe-delimited concatenation with a fixed empty-string sentinel for
/// `None`, the composition rule named throughout §3/§4.G.
pub fn pipe_join(fields: &[Option<&str>]) -> String {
    fields.iter().map(|f| f.unwrap_or("")).collect::<Vec<_>>().join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h12_is_deterministic_and_twelve_chars() {
        let a = h12("canada");
        let b = h12("canada");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 12);
    }

    #[test]
    fn h12_differs_for_different_input() {
        assert_ne!(h12("canada"), h12("Canada"));
    }

    #[test]
    fn pipe_join_uses_sentinel_for_none() {
        assert_eq!(pipe_join(&[Some("1"), None, Some("x")]), "1||x");
    }
}
