use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One FAQ entry as it appears in the source json. Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FaqRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("faq source not found: {0}")]
    NotFound(String),

    #[error("failed to read faq source {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse faq source {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("faq record {id} has an empty {field}")]
    EmptyField { id: i64, field: &'static str },

    #[error("duplicate faq id {0}")]
    DuplicateId(i64),
}

/// Load and validate the FAQ source file. Any malformed record fails the
/// whole load; a rebuild never runs on partially valid data.
pub fn load_faqs(path: impl AsRef<Path>) -> Result<Vec<FaqRecord>, SourceError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SourceError::NotFound(path.display().to_string()));
    }

    let raw = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let records: Vec<FaqRecord> =
        serde_json::from_str(&raw).map_err(|source| SourceError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    let mut seen = HashSet::new();
    for record in &records {
        if record.question.trim().is_empty() {
            return Err(SourceError::EmptyField {
                id: record.id,
                field: "question",
            });
        }
        if record.answer.trim().is_empty() {
            return Err(SourceError::EmptyField {
                id: record.id,
                field: "answer",
            });
        }
        if !seen.insert(record.id) {
            return Err(SourceError::DuplicateId(record.id));
        }
    }

    log::debug!("loaded {} faq records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_source(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faqs.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_valid_source() {
        let (_dir, path) = write_source(
            r#"[
                {"id": 1, "question": "How long does delivery take?", "answer": "2-4 business days."},
                {"id": 2, "question": "Can I return items?", "answer": "Within 30 days."}
            ]"#,
        );
        let records = load_faqs(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].answer, "Within 30 days.");
    }

    #[test]
    fn empty_array_is_valid() {
        let (_dir, path) = write_source("[]");
        assert!(load_faqs(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_faqs(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let (_dir, path) = write_source("{not json");
        assert!(matches!(
            load_faqs(&path).unwrap_err(),
            SourceError::Parse { .. }
        ));
    }

    #[test]
    fn missing_field_is_parse_error() {
        let (_dir, path) = write_source(r#"[{"id": 1, "question": "q"}]"#);
        assert!(matches!(
            load_faqs(&path).unwrap_err(),
            SourceError::Parse { .. }
        ));
    }

    #[test]
    fn whitespace_answer_rejected() {
        let (_dir, path) = write_source(r#"[{"id": 7, "question": "q", "answer": "  "}]"#);
        match load_faqs(&path).unwrap_err() {
            SourceError::EmptyField { id, field } => {
                assert_eq!(id, 7);
                assert_eq!(field, "answer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_id_rejected() {
        let (_dir, path) = write_source(
            r#"[
                {"id": 3, "question": "a", "answer": "b"},
                {"id": 3, "question": "c", "answer": "d"}
            ]"#,
        );
        assert!(matches!(
            load_faqs(&path).unwrap_err(),
            SourceError::DuplicateId(3)
        ));
    }
}
