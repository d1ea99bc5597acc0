use thiserror::Error;

use super::todo::TodoId;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of the record store itself, as opposed to "no such record".
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// A stored record did not decode into a todo.
    #[error("malformed stored record: {0}")]
    Malformed(String),
    /// The database rejected or could not serve the request.
    #[error("database error: {source}")]
    Backend {
        #[source]
        source: BoxError,
        retryable: bool,
    },
}

impl StoreError {
    /// Transient database failures (connection, pool, driver i/o) may succeed on retry.
    /// Nothing in the request path retries; this only classifies the failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Backend { retryable: true, .. })
    }
}

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Todo with id: \"{0}\" not found.")]
    NotFound(TodoId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_errors_are_not_retryable() {
        let err = StoreError::Io(std::io::Error::other("disk gone"));
        assert!(!err.is_retryable());
        let err = StoreError::Backend { source: "pool timed out".into(), retryable: true };
        assert!(err.is_retryable());
    }

    #[test]
    fn not_found_names_the_id() {
        let id = TodoId::new();
        assert_eq!(TodoError::NotFound(id).to_string(), format!("Todo with id: \"{id}\" not found."));
    }
}
