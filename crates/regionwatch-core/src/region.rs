//! Active region identifiers
//!
//! The active region is published through an indirection record whose target
//! follows the `<service>.<region>.<domain-suffix>` naming convention, e.g.
//! `health.us-east-1.amazonaws.com.`. The region is the second `.`-delimited
//! segment of that target.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiter between the labels of a resolved target name
pub const TARGET_DELIMITER: char = '.';

/// Position of the region label within the split target name
pub const REGION_SEGMENT_INDEX: usize = 1;

/// Minimum number of segments of a well-formed target (`service.region.suffix`)
pub const MIN_TARGET_SEGMENTS: usize = 3;

/// Identifier of the region currently serving a multi-region service
///
/// A value type: a new resolution produces a new `ActiveRegion`, existing
/// values are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveRegion(String);

impl ActiveRegion {
    /// Wrap a region code such as `us-east-1`
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Extract the region from a resolved target name
    ///
    /// `svc.us-west-2.example.com.` yields `us-west-2`.
    pub fn from_target(target: &str) -> Result<Self> {
        let segments: Vec<&str> = target.split(TARGET_DELIMITER).collect();

        if segments.len() < MIN_TARGET_SEGMENTS {
            return Err(Error::resolution(format!(
                "Target {} has {} segment(s), expected at least {}",
                target,
                segments.len(),
                MIN_TARGET_SEGMENTS
            )));
        }

        let region = segments[REGION_SEGMENT_INDEX];
        if region.is_empty() {
            return Err(Error::resolution(format!(
                "Target {} has an empty region segment",
                target
            )));
        }

        Ok(Self::new(region))
    }

    /// Extract the region from the complete answer set of an indirection lookup
    ///
    /// Exactly one answer is accepted. Zero answers, or several, are a
    /// resolution error; no candidate is ever picked silently.
    pub fn from_answers<S: AsRef<str>>(query: &str, answers: &[S]) -> Result<Self> {
        match answers {
            [target] => Self::from_target(target.as_ref()),
            _ => Err(Error::resolution(format!(
                "Failed to get a single answer when resolving {} (got {})",
                query,
                answers.len()
            ))),
        }
    }

    /// The region code
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActiveRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ActiveRegion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
