//! Reading the triggering pull request from the workflow event document.

use std::path::Path;

use critique_core::{CritiqueError, PullRequestRef};

/// Read the pull-request number from the event JSON at `path`.
///
/// # Errors
///
/// Returns [`CritiqueError::ReadFile`] if the file cannot be read, and see
/// [`parse_pull_request`] for content errors.
pub fn read_pull_request(path: &Path) -> Result<PullRequestRef, CritiqueError> {
    let content = std::fs::read_to_string(path).map_err(|source| CritiqueError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_pull_request(&content)
}

/// Extract `pull_request.number` from an event document.
///
/// # Errors
///
/// Returns [`CritiqueError::Serialization`] for invalid JSON and
/// [`CritiqueError::MissingField`] if the number is absent or not a
/// non-negative integer.
///
/// # Examples
///
/// ```
/// use critique_core::PullRequestRef;
/// use critique_review::event::parse_pull_request;
///
/// let pr = parse_pull_request(r#"{"action":"opened","pull_request":{"number":7}}"#).unwrap();
/// assert_eq!(pr, PullRequestRef(7));
/// ```
pub fn parse_pull_request(content: &str) -> Result<PullRequestRef, CritiqueError> {
    let event: serde_json::Value = serde_json::from_str(content)?;
    event
        .pointer("/pull_request/number")
        .and_then(serde_json::Value::as_u64)
        .map(PullRequestRef)
        .ok_or(CritiqueError::MissingField {
            document: "event metadata",
            field: "pull_request.number",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_event_has_no_pull_request() {
        let err = parse_pull_request(r#"{"ref":"refs/heads/main"}"#).unwrap_err();
        assert!(matches!(
            err,
            CritiqueError::MissingField { field: "pull_request.number", .. }
        ));
    }

    #[test]
    fn string_number_is_rejected() {
        let err = parse_pull_request(r#"{"pull_request":{"number":"12"}}"#).unwrap_err();
        assert!(matches!(err, CritiqueError::MissingField { .. }));
    }

    #[test]
    fn invalid_json_is_a_serialization_error() {
        let err = parse_pull_request("{not json").unwrap_err();
        assert!(matches!(err, CritiqueError::Serialization(_)));
    }

    #[test]
    fn reads_number_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"pull_request":{"number":1347,"title":"x"}}"#).unwrap();
        assert_eq!(read_pull_request(&path).unwrap(), PullRequestRef(1347));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_pull_request(Path::new("/definitely/not/event.json")).unwrap_err();
        assert!(matches!(err, CritiqueError::ReadFile { .. }));
    }
}
