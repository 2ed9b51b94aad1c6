//! JSON encoding of list and object columns.
//!
//! Decoding is lenient: a missing or malformed blob becomes an empty list or
//! `None` instead of failing the row.

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub(crate) fn encode_optional<T: Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value.as_ref().map(encode).transpose()
}

pub(crate) fn decode_list<T: DeserializeOwned>(raw: Option<String>) -> Vec<T> {
    decode_optional(raw).unwrap_or_default()
}

pub(crate) fn decode_optional<T: DeserializeOwned>(raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed JSON column");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Decision, WorkLogEntry};

    #[test]
    fn test_missing_list_decodes_empty() {
        let entries: Vec<WorkLogEntry> = decode_list(None);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_malformed_list_decodes_empty() {
        let entries: Vec<WorkLogEntry> = decode_list(Some("{not json".to_string()));
        assert!(entries.is_empty());

        let steps: Vec<String> = decode_list(Some(r#"{"wrong": "shape"}"#.to_string()));
        assert!(steps.is_empty());
    }

    #[test]
    fn test_malformed_optional_decodes_none() {
        let decisions: Option<Vec<Decision>> = decode_optional(Some("[1, 2".to_string()));
        assert!(decisions.is_none());
    }

    #[test]
    fn test_decision_without_rationale() {
        let decisions: Option<Vec<Decision>> =
            decode_optional(Some(r#"[{"decision": "Use SQLite"}]"#.to_string()));
        let decisions = decisions.unwrap();
        assert_eq!(decisions[0].decision, "Use SQLite");
        assert!(decisions[0].rationale.is_none());
    }

    #[test]
    fn test_encode_optional_keeps_none() {
        let none: Option<Vec<String>> = None;
        assert_eq!(encode_optional(&none).unwrap(), None);
        assert_eq!(
            encode_optional(&Some(vec!["a".to_string()])).unwrap(),
            Some(r#"["a"]"#.to_string())
        );
    }
}
