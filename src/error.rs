//! Error handling for socgraph-rs
//!
//! This module defines the error type shared by the descriptor arena, the
//! graph session, and the controller backends, plus a Result alias used
//! throughout the crate.
//!
//! Every failure the controller boundary can produce is a distinct variant,
//! so callers and tests can branch on the cause instead of matching on log
//! text.

use thiserror::Error;

use crate::types::TensorDims;

/// Main error type for socgraph-rs operations
#[derive(Error, Debug)]
pub enum SocGraphError {
    /// A descriptor append (or input-tensor fill) asked for more room than
    /// the preallocated storage has left
    #[error("{what}: requested {requested} entries but only {available} available")]
    CapacityExceeded {
        what: &'static str,
        requested: usize,
        available: usize,
    },

    /// An operation that needs a target graph ran before one was set up
    #[error("graph id has not been set yet")]
    GraphNotSet,

    /// A caller-declared byte length disagrees with the computed size
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Tensor dimensions whose element count overflows usize
    #[error("tensor dims {0} overflow the element count")]
    DimsOverflow(TensorDims),

    /// Paired input sequences of unequal length
    #[error("node id / port length mismatch: {ids} ids, {ports} ports")]
    LengthMismatch { ids: usize, ports: usize },

    /// The controller service reported a nonzero or negative status code
    #[error("controller {op} failed with code {code}")]
    Controller { op: &'static str, code: i32 },

    /// The controller handed back the reserved graph id 0
    #[error("failed to set up graph (version {version})")]
    GraphSetup { version: i32 },

    /// Backing storage for the descriptor arena could not be reserved
    #[error("descriptor storage allocation failed: {0}")]
    Allocation(#[from] std::collections::TryReserveError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration deserialization errors
    #[error("Configuration parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// Configuration serialization errors
    #[error("Configuration write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Errors raised while loading or resolving the vendor library
    #[cfg(feature = "vendor-sdk")]
    #[error("Vendor library error: {0}")]
    VendorLibrary(#[from] libloading::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SocGraphError>,
    },
}

impl SocGraphError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SocGraphError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for socgraph-rs operations
pub type Result<T> = std::result::Result<T, SocGraphError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SocGraphError::GraphNotSet;
        assert_eq!(err.to_string(), "graph id has not been set yet");
    }

    #[test]
    fn test_capacity_error_display() {
        let err = SocGraphError::CapacityExceeded {
            what: "node inputs",
            requested: 8,
            available: 3,
        };
        assert!(err.to_string().contains("requested 8"));
        assert!(err.to_string().contains("3 available"));
    }

    #[test]
    fn test_controller_error_display() {
        let err = SocGraphError::Controller {
            op: "append_node",
            code: -22,
        };
        assert_eq!(
            err.to_string(),
            "controller append_node failed with code -22"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = SocGraphError::SizeMismatch {
            expected: 16,
            actual: 15,
        };
        let with_ctx = err.with_context("Failed to fill input node");
        assert!(with_ctx.to_string().contains("Failed to fill input node"));
    }
}
