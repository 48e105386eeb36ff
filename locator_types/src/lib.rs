//! # Locator Types
//!
//! Plain data shared by the locator workspace: resolved descriptors, cache
//! fingerprints, inference tiers, usage records and the fixed rate table.
//!
//! Nothing here performs I/O, so the crate can be used by tooling that only
//! needs to read cache or usage files.

#![warn(missing_docs)]

mod descriptor;
mod failure;
mod fingerprint;
mod usage;

pub use descriptor::{ActionKind, LocatorDescriptor};
pub use failure::FailureKind;
pub use fingerprint::{Fingerprint, SNAPSHOT_PREFIX_CHARS};
pub use usage::{
    DailyUsage, SummaryScope, Tier, TierSummary, TokenRate, UsageSummary, UsageTotals,
};
