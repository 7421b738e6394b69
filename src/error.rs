//! Error types for repository access.
//!
//! Two layers:
//! - `StoreError`: what an `ObjectStore` reports, with no repository context.
//! - `Error`: what the accessor hands to callers. Every variant names the
//!   repository path, and resolution failures also name the operation and
//!   the identifier or reference name that was attempted.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("store failure: {0}")]
    Backend(String),

    #[error("operation not supported by this store: {0}")]
    Unsupported(&'static str),
}

impl From<git2::Error> for StoreError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::InvalidSpec => {
                StoreError::NotFound(err.message().to_string())
            }
            _ => StoreError::Backend(err.message().to_string()),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("failed to open repository {path}: {message}")]
    Open { path: String, message: String },

    #[error("{operation}: {target} not found in repository {path}")]
    NotFound {
        operation: &'static str,
        target: String,
        path: String,
    },

    #[error("{operation}: store error for {target} in repository {path}: {message}")]
    Store {
        operation: &'static str,
        target: String,
        path: String,
        message: String,
    },

    #[error("invalid object id {id:?} for repository {path}")]
    InvalidId { id: String, path: String },

    #[error("no default branch found in repository {path} (tried {})", .candidates.join(", "))]
    DefaultBranchUndetectable {
        path: String,
        candidates: Vec<String>,
    },

    #[error("history walk from {start} failed in repository {path}: {message}")]
    Traversal {
        start: String,
        path: String,
        message: String,
    },
}

impl Error {
    /// Attach accessor context to a store failure.
    pub(crate) fn from_store(
        err: StoreError,
        operation: &'static str,
        target: impl Into<String>,
        path: &str,
    ) -> Self {
        let target = target.into();
        match err {
            StoreError::NotFound(_) => Error::NotFound {
                operation,
                target,
                path: path.to_string(),
            },
            StoreError::Backend(message) => Error::Store {
                operation,
                target,
                path: path.to_string(),
                message,
            },
            StoreError::Unsupported(what) => Error::Store {
                operation,
                target,
                path: path.to_string(),
                message: format!("unsupported: {}", what),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_keeps_context() {
        let err = Error::from_store(
            StoreError::NotFound("gone".into()),
            "get_commit",
            "abc",
            "/repo",
        );
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("get_commit"));
        assert!(msg.contains("abc"));
        assert!(msg.contains("/repo"));
    }

    #[test]
    fn backend_failure_is_a_store_error() {
        let err = Error::from_store(
            StoreError::Backend("corrupt pack".into()),
            "get_tree",
            "def",
            "/repo",
        );
        match err {
            Error::Store { message, operation, .. } => {
                assert_eq!(message, "corrupt pack");
                assert_eq!(operation, "get_tree");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn undetectable_lists_candidates() {
        let err = Error::DefaultBranchUndetectable {
            path: "/repo".into(),
            candidates: vec!["refs/heads/master".into(), "refs/heads/trunk".into()],
        };
        assert!(err.to_string().contains("refs/heads/master, refs/heads/trunk"));
    }
}
