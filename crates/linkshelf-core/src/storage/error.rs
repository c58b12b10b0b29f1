//! Storage error handling
//!
//! Every durable-storage failure collapses into one of two kinds the
//! presentation layer knows how to report. Neither is fatal: the caller
//! keeps its in-memory state and carries on for the session.

use std::io;
use thiserror::Error;

/// Errors that can occur when writing to durable storage
#[derive(Error, Debug)]
pub enum StoreError {
    /// The write would exceed the storage budget, or the disk is full
    #[error("Storage quota exceeded while writing '{key}': {reason}. Delete some links or free up space.")]
    QuotaExceeded { key: String, reason: String },

    /// Storage is disabled, unreachable or refused the write
    #[error("Storage unavailable for '{key}': {reason}")]
    Unavailable { key: String, reason: String },
}

impl StoreError {
    /// Classify an I/O error raised while accessing a slot
    pub fn from_io(error: io::Error, key: &str) -> Self {
        let reason = error.to_string();
        if is_disk_full_error(&error) {
            StoreError::QuotaExceeded {
                key: key.to_string(),
                reason,
            }
        } else {
            StoreError::Unavailable {
                key: key.to_string(),
                reason,
            }
        }
    }

    /// The slot the failed operation targeted
    pub fn key(&self) -> &str {
        match self {
            StoreError::QuotaExceeded { key, .. } | StoreError::Unavailable { key, .. } => key,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StoreError::QuotaExceeded { .. } => {
                "Delete links you no longer need, or raise quota_bytes in the configuration."
            }
            StoreError::Unavailable { .. } => {
                "Check that the data directory exists and is writable. Changes are kept for this session only."
            }
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_full_classification() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StoreError::from_io(io_err, "links");

        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(err.key(), "links");
    }

    #[test]
    fn test_quota_message_classification() {
        let io_err = io::Error::new(io::ErrorKind::Other, "Disk quota exceeded (os error 122)");
        let err = StoreError::from_io(io_err, "links");

        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_permission_denied_is_unavailable() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StoreError::from_io(io_err, "theme");

        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert_eq!(err.key(), "theme");
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::Unavailable {
            key: "links".to_string(),
            reason: "storage is disabled".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("unavailable"));
        assert!(msg.contains("links"));
        assert!(msg.contains("storage is disabled"));
    }

    #[test]
    fn test_recovery_suggestions_differ() {
        let quota = StoreError::QuotaExceeded {
            key: "links".to_string(),
            reason: "full".to_string(),
        };
        let unavailable = StoreError::Unavailable {
            key: "links".to_string(),
            reason: "gone".to_string(),
        };

        assert!(quota.recovery_suggestion().contains("quota_bytes"));
        assert!(unavailable.recovery_suggestion().contains("session"));
    }
}
