//! Error types and result types for document store operations.
//!
//! Every failure surfaced by the store facade is a [`DocumentStoreError`]. Backend failures
//! reach callers only after passing through [`translate`], which maps the backend's string
//! code onto a closed [`ErrorKind`] taxonomy. Absence conditions detected locally (a missing
//! document, a query with no matches) and deserializer failures get their own kinds so callers
//! can tell "no data" apart from "the operation failed".
//!
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.

use std::fmt::{self, Display};
use thiserror::Error;

use crate::backend::BackendError;

/// Backend failure subcodes.
///
/// These follow the canonical status codes shared by most remote document stores.
/// `not-found` and `unknown` are not subcodes; they map to [`ErrorKind::NotFound`] and
/// [`ErrorKind::UnknownFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCode {
    Cancelled,
    InvalidArgument,
    DeadlineExceeded,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl BackendCode {
    /// Returns the normalized string code for this subcode.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendCode::Cancelled => "cancelled",
            BackendCode::InvalidArgument => "invalid-argument",
            BackendCode::DeadlineExceeded => "deadline-exceeded",
            BackendCode::AlreadyExists => "already-exists",
            BackendCode::PermissionDenied => "permission-denied",
            BackendCode::ResourceExhausted => "resource-exhausted",
            BackendCode::FailedPrecondition => "failed-precondition",
            BackendCode::Aborted => "aborted",
            BackendCode::OutOfRange => "out-of-range",
            BackendCode::Unimplemented => "unimplemented",
            BackendCode::Internal => "internal",
            BackendCode::Unavailable => "unavailable",
            BackendCode::DataLoss => "data-loss",
            BackendCode::Unauthenticated => "unauthenticated",
        }
    }
}

impl Display for BackendCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed classification of every failure the facade can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A single requested document does not exist.
    NotFound,
    /// A filtered or ordered query succeeded but matched no records.
    EmptyResult,
    /// A caller-supplied deserializer rejected a record.
    DeserializationFailure,
    /// The backend reported a recognized failure.
    BackendFailure(BackendCode),
    /// The backend reported a failure with an unrecognized code.
    UnknownFailure,
}

/// Normalized, backend-independent failure.
///
/// Constructed once where the failure is detected and propagated unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DocumentStoreError {
    pub kind: ErrorKind,
    /// Stable string code (`not-found`, `empty-result`, `permission-denied`, ...).
    pub code: String,
    pub message: String,
    /// The collection or document path that was being accessed.
    pub path: Option<String>,
    /// Underlying detail: backend message and stack, or the deserializer's error.
    pub cause: Option<String>,
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

pub const NOT_FOUND_CODE: &str = "not-found";
pub const EMPTY_RESULT_CODE: &str = "empty-result";
pub const DESERIALIZATION_CODE: &str = "deserialization-failed";
pub const UNKNOWN_CODE: &str = "unknown";

impl DocumentStoreError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            path: None,
            cause: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The document `id` does not exist in the collection at `path`.
    pub fn not_found(path: &str, id: &str) -> Self {
        Self::new(
            ErrorKind::NotFound,
            NOT_FOUND_CODE,
            format!("No document exists at {}", document_path(path, id)),
        )
        .with_path(path)
    }

    /// A query against `path` executed but returned zero records.
    pub fn empty_result(path: &str) -> Self {
        Self::new(
            ErrorKind::EmptyResult,
            EMPTY_RESULT_CODE,
            format!("Query on {path} returned no documents"),
        )
        .with_path(path)
    }

    /// A deserializer rejected record `id` of the collection at `path`.
    pub fn deserialization(path: &str, id: &str, cause: impl Display) -> Self {
        Self::new(
            ErrorKind::DeserializationFailure,
            DESERIALIZATION_CODE,
            format!("Failed to deserialize document at {}", document_path(path, id)),
        )
        .with_path(path)
        .with_cause(cause.to_string())
    }

    /// The caller broke an argument contract (wrong value shape, unserializable payload).
    pub fn invalid_argument(path: Option<&str>, message: impl Into<String>) -> Self {
        let error = Self::new(
            ErrorKind::BackendFailure(BackendCode::InvalidArgument),
            BackendCode::InvalidArgument.as_str(),
            message,
        );

        match path {
            Some(path) => error.with_path(path),
            None => error,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_empty_result(&self) -> bool {
        self.kind == ErrorKind::EmptyResult
    }

    /// True for either absence condition.
    pub fn is_absence(&self) -> bool {
        self.is_not_found() || self.is_empty_result()
    }
}

/// Joins a collection path and a record identifier.
pub fn document_path(path: &str, id: &str) -> String {
    format!("{}/{}", path.trim_end_matches('/'), id)
}

/// Backend codes understood by [`translate`], with the message template for each.
///
/// `{path}` in a template is replaced with the accessed path.
const CODE_TABLE: &[(&str, ErrorKind, &str)] = &[
    ("not-found", ErrorKind::NotFound, "No document exists at {path}"),
    ("cancelled", ErrorKind::BackendFailure(BackendCode::Cancelled), "The operation on {path} was cancelled"),
    ("invalid-argument", ErrorKind::BackendFailure(BackendCode::InvalidArgument), "The backend rejected an argument for {path}"),
    ("deadline-exceeded", ErrorKind::BackendFailure(BackendCode::DeadlineExceeded), "The operation on {path} timed out"),
    ("already-exists", ErrorKind::BackendFailure(BackendCode::AlreadyExists), "A document already exists at {path}"),
    ("permission-denied", ErrorKind::BackendFailure(BackendCode::PermissionDenied), "Permission denied for {path}"),
    ("resource-exhausted", ErrorKind::BackendFailure(BackendCode::ResourceExhausted), "Quota or resources exhausted while accessing {path}"),
    ("failed-precondition", ErrorKind::BackendFailure(BackendCode::FailedPrecondition), "The backend is not in a state to serve {path} (missing index?)"),
    ("aborted", ErrorKind::BackendFailure(BackendCode::Aborted), "The operation on {path} was aborted"),
    ("out-of-range", ErrorKind::BackendFailure(BackendCode::OutOfRange), "The operation on {path} went past the valid range"),
    ("unimplemented", ErrorKind::BackendFailure(BackendCode::Unimplemented), "The operation on {path} is not supported by the backend"),
    ("internal", ErrorKind::BackendFailure(BackendCode::Internal), "The backend failed internally while accessing {path}"),
    ("unavailable", ErrorKind::BackendFailure(BackendCode::Unavailable), "The backend is unavailable for {path}"),
    ("data-loss", ErrorKind::BackendFailure(BackendCode::DataLoss), "Unrecoverable data loss at {path}"),
    ("unauthenticated", ErrorKind::BackendFailure(BackendCode::Unauthenticated), "The request for {path} is not authenticated"),
];

const UNKNOWN_TEMPLATE: &str = "Unknown backend failure while accessing {path}";

/// Normalizes a backend code for lookup.
///
/// `PERMISSION_DENIED`, `firestore/permission-denied` and ` permission-denied ` all become
/// `permission-denied`.
pub fn normalize_code(code: &str) -> String {
    let code = code.trim();
    let code = code.rsplit_once('/').map_or(code, |(_, tail)| tail);

    code.to_ascii_lowercase().replace('_', "-")
}

/// Maps a backend failure onto a [`DocumentStoreError`] for `path`.
///
/// Total: every code yields an error, unrecognized ones as [`ErrorKind::UnknownFailure`].
pub fn translate(error: &BackendError, path: &str) -> DocumentStoreError {
    let code = normalize_code(&error.code);
    let (kind, template) = CODE_TABLE
        .iter()
        .find(|(known, _, _)| *known == code)
        .map(|(_, kind, template)| (*kind, *template))
        .unwrap_or((ErrorKind::UnknownFailure, UNKNOWN_TEMPLATE));

    let code = match kind {
        ErrorKind::UnknownFailure if code.is_empty() => UNKNOWN_CODE.to_string(),
        _ => code,
    };

    let cause = match &error.stack {
        Some(stack) => format!("{}\n{}", error.message, stack),
        None => error.message.clone(),
    };

    tracing::warn!(path, code = %code, kind = ?kind, "backend failure: {}", error.message);

    DocumentStoreError::new(kind, code, template.replace("{path}", path))
        .with_path(path)
        .with_cause(cause)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_error(code: &str) -> BackendError {
        BackendError::new(code, "boom")
    }

    #[test]
    fn test_translate_known_codes() {
        for (code, kind, _) in CODE_TABLE {
            let error = translate(&backend_error(code), "users");

            assert_eq!(error.kind, *kind);
            assert_eq!(error.code, *code);
            assert_eq!(error.path.as_deref(), Some("users"));
            assert!(error.message.contains("users"));
        }
    }

    #[test]
    fn test_translate_table_covers_every_backend_code() {
        let codes = [
            BackendCode::Cancelled,
            BackendCode::InvalidArgument,
            BackendCode::DeadlineExceeded,
            BackendCode::AlreadyExists,
            BackendCode::PermissionDenied,
            BackendCode::ResourceExhausted,
            BackendCode::FailedPrecondition,
            BackendCode::Aborted,
            BackendCode::OutOfRange,
            BackendCode::Unimplemented,
            BackendCode::Internal,
            BackendCode::Unavailable,
            BackendCode::DataLoss,
            BackendCode::Unauthenticated,
        ];

        for code in codes {
            let error = translate(&backend_error(code.as_str()), "c");
            assert_eq!(error.kind, ErrorKind::BackendFailure(code));
        }
    }

    #[test]
    fn test_translate_unknown_codes() {
        for code in ["unknown", "totally-new-code", "", "42"] {
            let error = translate(&backend_error(code), "orders/1");
            assert_eq!(error.kind, ErrorKind::UnknownFailure);
            assert!(!error.code.is_empty());
        }
    }

    #[test]
    fn test_translate_normalizes_codes() {
        let error = translate(&backend_error("PERMISSION_DENIED"), "users");
        assert_eq!(error.kind, ErrorKind::BackendFailure(BackendCode::PermissionDenied));

        let error = translate(&backend_error("firestore/unavailable"), "users");
        assert_eq!(error.kind, ErrorKind::BackendFailure(BackendCode::Unavailable));
        assert_eq!(error.code, "unavailable");
    }

    #[test]
    fn test_translate_keeps_backend_detail_as_cause() {
        let error = translate(
            &BackendError::new("aborted", "contention").with_stack("at commit()"),
            "users",
        );

        assert_eq!(error.cause.as_deref(), Some("contention\nat commit()"));
    }

    #[test]
    fn test_backend_not_found_is_not_found_kind() {
        let error = translate(&backend_error("not-found"), "users/abc");
        assert!(error.is_not_found());
        assert!(error.is_absence());
    }

    #[test]
    fn test_local_conditions() {
        let error = DocumentStoreError::not_found("users/", "abc");
        assert_eq!(error.kind, ErrorKind::NotFound);
        assert_eq!(error.path.as_deref(), Some("users/"));
        assert!(error.message.ends_with("users/abc"));

        let error = DocumentStoreError::empty_result("users");
        assert_eq!(error.kind, ErrorKind::EmptyResult);
        assert_eq!(error.code, EMPTY_RESULT_CODE);

        let error = DocumentStoreError::deserialization("users", "abc", "missing field `name`");
        assert_eq!(error.kind, ErrorKind::DeserializationFailure);
        assert_eq!(error.cause.as_deref(), Some("missing field `name`"));
    }
}
