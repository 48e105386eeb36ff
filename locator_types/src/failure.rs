//! Failure classification for resolution steps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a resolution step did not produce a usable descriptor.
///
/// Only [`FailureKind::MissingRequiredData`] aborts a step; every other kind
/// degrades to skipping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The inference service was unreachable or returned an error status.
    TransportFailure,
    /// The service answered but the body did not match `{action, selector}`.
    SchemaViolation,
    /// The selector did not appear on the live page in time.
    StaleSelector,
    /// Fill or select was requested without a payload.
    MissingRequiredData,
    /// The service named an action the executor does not know.
    UnrecognizedAction,
}

impl FailureKind {
    /// Whether the failure aborts the step instead of skipping it.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::MissingRequiredData)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TransportFailure => "transport failure",
            Self::SchemaViolation => "schema violation",
            Self::StaleSelector => "stale selector",
            Self::MissingRequiredData => "missing required data",
            Self::UnrecognizedAction => "unrecognized action",
        };
        f.write_str(s)
    }
}
