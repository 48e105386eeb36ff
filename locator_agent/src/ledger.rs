//! Per-day, per-tier usage ledger.

use crate::error::LocatorResult;
use crate::persist::{read_optional, write_json_atomic};
use locator_types::{DailyUsage, SummaryScope, Tier, UsageSummary};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default usage log file name.
pub const DEFAULT_USAGE_LOG: &str = "usageLog.json";

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Durable usage counters keyed by (date, tier).
///
/// Counters only grow. The whole log is rewritten after every
/// accumulation. The ledger is `Sync` and meant to be shared between
/// sessions through an `Arc`.
#[derive(Debug)]
pub struct UsageLedger {
    path: PathBuf,
    days: Mutex<BTreeMap<String, DailyUsage>>,
}

impl UsageLedger {
    /// Open the ledger at `path`.
    ///
    /// A missing or unreadable log starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let days = Self::load(&path);

        Self {
            path,
            days: Mutex::new(days),
        }
    }

    fn load(path: &Path) -> BTreeMap<String, DailyUsage> {
        let text = match read_optional(path) {
            Ok(Some(text)) => text,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                log::warn!("could not read usage log {}: {}", path.display(), e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&text) {
            Ok(days) => days,
            Err(e) => {
                log::warn!("could not parse usage log {}: {}", path.display(), e);
                BTreeMap::new()
            }
        }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one call against today's date.
    pub fn accumulate(
        &self,
        tier: Tier,
        prompt_tokens: u64,
        completion_tokens: u64,
    ) -> LocatorResult<()> {
        self.accumulate_on(&today(), tier, prompt_tokens, completion_tokens)
    }

    /// Record one call against `date`.
    pub fn accumulate_on(
        &self,
        date: &str,
        tier: Tier,
        prompt_tokens: u64,
        completion_tokens: u64,
    ) -> LocatorResult<()> {
        let mut days = self.days.lock();

        let previous = days.get(date).copied();
        let mut updated = previous.unwrap_or_default();
        updated
            .tier_mut(tier)
            .record_call(prompt_tokens, completion_tokens);
        days.insert(date.to_string(), updated);

        // only a persisted call counts
        if let Err(e) = write_json_atomic(&self.path, &*days) {
            match previous {
                Some(day) => days.insert(date.to_string(), day),
                None => days.remove(date),
            };
            return Err(e);
        }

        Ok(())
    }

    /// Summarize relative to today's date.
    pub fn summarize(&self, scope: SummaryScope) -> UsageSummary {
        self.summarize_on(scope, &today())
    }

    /// Summarize treating `today` as the current date.
    pub fn summarize_on(&self, scope: SummaryScope, today: &str) -> UsageSummary {
        let days = self.days.lock();

        match scope {
            SummaryScope::Today => UsageSummary::from_days(scope, days.get(today)),
            SummaryScope::AllTime => UsageSummary::from_days(scope, days.values()),
        }
    }

    /// Usage recorded for one date.
    pub fn day(&self, date: &str) -> Option<DailyUsage> {
        self.days.lock().get(date).copied()
    }

    /// Number of dates with recorded usage.
    pub fn len(&self) -> usize {
        self.days.lock().len()
    }

    /// Whether nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.days.lock().is_empty()
    }
}
