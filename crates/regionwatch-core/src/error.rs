//! Error types for regionwatch
//!
//! Two variants carry the control flow of the whole system:
//!
//! - [`Error::Resolution`]: the active region could not be determined.
//!   The workflow runner aborts the run.
//! - [`Error::ActiveRegionChanged`]: the active region moved since the last
//!   access. The workflow runner restarts the workflow from scratch.
//!
//! Components between the client cache and the runner must propagate both
//! unmodified.

use crate::region::ActiveRegion;
use thiserror::Error;

/// Result type alias for regionwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for regionwatch
#[derive(Error, Debug)]
pub enum Error {
    /// Active region lookup failed or returned an ambiguous/malformed answer
    #[error("Region resolution error: {0}")]
    Resolution(String),

    /// The resolved active region differs from the last known region
    #[error("Active region has changed from [{old}] to [{new}]")]
    ActiveRegionChanged {
        /// Region the cached client was bound to
        old: ActiveRegion,
        /// Freshly resolved region
        new: ActiveRegion,
    },

    /// Building a client for a region failed
    #[error("Failed to construct client for region {region}: {message}")]
    ClientConstruction {
        /// Region the client was being bound to
        region: ActiveRegion,
        /// Error message
        message: String,
    },

    /// Error returned by the regional service
    #[error("Service error: {0}")]
    Service(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The workflow kept restarting past the configured cap
    #[error("Workflow restarted {restarts} times without completing")]
    RestartLimitExceeded {
        /// Number of restarts performed before giving up
        restarts: usize,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a client construction error
    pub fn client_construction(region: &ActiveRegion, message: impl Into<String>) -> Self {
        Self::ClientConstruction {
            region: region.clone(),
            message: message.into(),
        }
    }

    /// Create a service error
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error signals an active region change
    pub fn is_region_change(&self) -> bool {
        matches!(self, Self::ActiveRegionChanged { .. })
    }

    /// Whether this error signals that the active region could not be resolved
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_change_message_names_both_regions() {
        let err = Error::ActiveRegionChanged {
            old: ActiveRegion::new("us-east-1"),
            new: ActiveRegion::new("us-east-2"),
        };

        assert!(err.is_region_change());
        assert!(!err.is_resolution());
        assert_eq!(
            err.to_string(),
            "Active region has changed from [us-east-1] to [us-east-2]"
        );
    }

    #[test]
    fn resolution_is_classified() {
        let err = Error::resolution("no answer");
        assert!(err.is_resolution());
        assert!(!err.is_region_change());
    }
}
