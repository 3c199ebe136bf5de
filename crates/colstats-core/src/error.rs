//! Error types for column statistics
//!
//! Provides a unified error type for all colstats crates.

use thiserror::Error;

/// Core error type for histogram construction and persistence
#[derive(Error, Debug)]
pub enum Error {
    /// A caller broke an argument contract (zero buckets, bad sampling rate)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Growing the bucket store failed
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    /// A persisted document has the wrong shape or content
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Text could not be parsed as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for a malformed document
    pub fn malformed(context: impl std::fmt::Display) -> Self {
        Self::MalformedDocument(context.to_string())
    }

    /// Create an error for a document field that is missing or has the wrong kind
    pub fn field_kind(field: &str, expected: &str) -> Self {
        Self::MalformedDocument(format!("field '{field}' must be {expected}"))
    }

    /// Create an error for a failed reservation
    pub fn allocation(requested: usize, source: std::collections::TryReserveError) -> Self {
        Self::AllocationFailure(format!("reserving {requested} buckets: {source}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidArgument("bucket count must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid argument: bucket count must be positive");

        let err = Error::AllocationFailure("out of memory".to_string());
        assert_eq!(err.to_string(), "Allocation failure: out of memory");

        let err = Error::MalformedDocument("bucket arity".to_string());
        assert_eq!(err.to_string(), "Malformed document: bucket arity");
    }

    #[test]
    fn test_error_helper_functions() {
        let err = Error::field_kind("sampling_rate", "a floating-point number");
        assert_eq!(
            err.to_string(),
            "Malformed document: field 'sampling_rate' must be a floating-point number"
        );

        let err = Error::malformed(format_args!("bucket {} has {} fields", 3, 2));
        match err {
            Error::MalformedDocument(msg) => assert_eq!(msg, "bucket 3 has 2 fields"),
            _ => panic!("Wrong error type"),
        }

        let source = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let err = Error::allocation(usize::MAX, source);
        assert!(matches!(err, Error::AllocationFailure(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();

        match err {
            Error::Json(_) => assert!(err.to_string().starts_with("JSON error:")),
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_error_debug_impl() {
        let err = Error::InvalidArgument("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("InvalidArgument"));
        assert!(debug_str.contains("test"));
    }
}
