use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Captures whatever fields a `#[serde(flatten)]`-annotated struct didn't have a
/// named field for. WDS's JSON payloads are not versioned; rather than silently
/// drop fields a future response might add, parsers attach this alongside the
/// known fields so callers can inspect and log what showed up unexpectedly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnknownFields(Map<String, Value>);

impl UnknownFields {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Renders the captured keys as a comma-separated list, suitable for a
    /// single `tracing::warn!` line at the call site.
    pub fn describe(&self) -> String {
        self.keys().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct KnownShape {
        name: String,
        #[serde(flatten)]
        unknown: UnknownFields,
    }

    #[test]
    fn captures_fields_outside_the_known_shape() {
        let parsed: KnownShape =
            serde_json::from_str(r#"{"name":"geo","surpriseField":42}"#).unwrap();
        assert_eq!(parsed.name, "geo");
        assert!(!parsed.unknown.is_empty());
        assert_eq!(parsed.unknown.describe(), "surpriseField");
    }

    #[test]
    fn empty_when_shape_is_fully_known() {
        let parsed: KnownShape = serde_json::from_str(r#"{"name":"geo"}"#).unwrap();
        assert!(parsed.unknown.is_empty());
    }
}
