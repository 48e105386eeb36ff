//! Usage records, tiers and the fixed rate table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cost/capability class of the inference backend.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Lower cost, lower capability.
    #[default]
    #[serde(alias = "gpt35")]
    Standard,
    /// Higher cost, higher capability.
    #[serde(alias = "gpt4")]
    Advanced,
}

impl Tier {
    /// All tiers in report order.
    pub const ALL: [Tier; 2] = [Tier::Standard, Tier::Advanced];

    /// Lowercase name used in logs and files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Advanced => "advanced",
        }
    }

    /// Fixed price of this tier.
    pub fn rate(self) -> TokenRate {
        match self {
            Self::Standard => TokenRate::STANDARD,
            Self::Advanced => TokenRate::ADVANCED,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "gpt35" | "3.5" => Ok(Self::Standard),
            "advanced" | "gpt4" | "4" => Ok(Self::Advanced),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}

/// Price per 1000 tokens, in US dollars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenRate {
    /// Prompt (input) price per 1K tokens.
    pub prompt_per_1k: f64,
    /// Completion (output) price per 1K tokens.
    pub completion_per_1k: f64,
}

impl TokenRate {
    /// Standard tier pricing.
    pub const STANDARD: TokenRate = TokenRate {
        prompt_per_1k: 0.0015,
        completion_per_1k: 0.002,
    };

    /// Advanced tier pricing.
    pub const ADVANCED: TokenRate = TokenRate {
        prompt_per_1k: 0.03,
        completion_per_1k: 0.06,
    };

    /// Estimated cost of the given token counts.
    pub fn cost(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        (prompt_tokens as f64 / 1000.0) * self.prompt_per_1k
            + (completion_tokens as f64 / 1000.0) * self.completion_per_1k
    }
}

/// Aggregate counters for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    /// Prompt tokens consumed.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Completion tokens produced.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Number of service calls.
    #[serde(default)]
    pub api_calls: u64,
}

impl UsageTotals {
    /// Record one call.
    pub fn record_call(&mut self, prompt_tokens: u64, completion_tokens: u64) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(completion_tokens);
        self.api_calls = self.api_calls.saturating_add(1);
    }

    /// Add another set of totals.
    pub fn merge(&mut self, other: &UsageTotals) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(other.completion_tokens);
        self.api_calls = self.api_calls.saturating_add(other.api_calls);
    }

    /// Total tokens in both directions.
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// One day of usage, split by tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// Standard tier counters.
    #[serde(default, alias = "gpt35")]
    pub standard: UsageTotals,
    /// Advanced tier counters.
    #[serde(default, alias = "gpt4")]
    pub advanced: UsageTotals,
}

impl DailyUsage {
    /// Counters for a tier.
    pub fn tier(&self, tier: Tier) -> &UsageTotals {
        match tier {
            Tier::Standard => &self.standard,
            Tier::Advanced => &self.advanced,
        }
    }

    /// Mutable counters for a tier.
    pub fn tier_mut(&mut self, tier: Tier) -> &mut UsageTotals {
        match tier {
            Tier::Standard => &mut self.standard,
            Tier::Advanced => &mut self.advanced,
        }
    }
}

/// Window a usage summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryScope {
    /// The current local calendar day.
    #[default]
    Today,
    /// Every recorded day.
    AllTime,
}

impl fmt::Display for SummaryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::AllTime => f.write_str("all-time"),
        }
    }
}

impl FromStr for SummaryScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "all-time" | "all_time" | "alltime" | "all" => Ok(Self::AllTime),
            other => Err(format!("unknown summary scope: {}", other)),
        }
    }
}

/// Totals and estimated cost for one tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSummary {
    /// Which tier.
    pub tier: Tier,
    /// Summed counters.
    pub totals: UsageTotals,
    /// Estimated cost in US dollars.
    pub cost: f64,
}

impl TierSummary {
    fn from_totals(tier: Tier, totals: UsageTotals) -> Self {
        Self {
            tier,
            totals,
            cost: tier
                .rate()
                .cost(totals.prompt_tokens, totals.completion_tokens),
        }
    }
}

/// Aggregated usage over a [`SummaryScope`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSummary {
    /// Window covered.
    pub scope: SummaryScope,
    /// Standard tier summary.
    pub standard: TierSummary,
    /// Advanced tier summary.
    pub advanced: TierSummary,
}

impl UsageSummary {
    /// Sum the given days.
    pub fn from_days<'a>(
        scope: SummaryScope,
        days: impl IntoIterator<Item = &'a DailyUsage>,
    ) -> Self {
        let mut standard = UsageTotals::default();
        let mut advanced = UsageTotals::default();

        for day in days {
            standard.merge(&day.standard);
            advanced.merge(&day.advanced);
        }

        Self {
            scope,
            standard: TierSummary::from_totals(Tier::Standard, standard),
            advanced: TierSummary::from_totals(Tier::Advanced, advanced),
        }
    }

    /// Summary for one tier.
    pub fn tier(&self, tier: Tier) -> &TierSummary {
        match tier {
            Tier::Standard => &self.standard,
            Tier::Advanced => &self.advanced,
        }
    }

    /// Cost across both tiers.
    pub fn total_cost(&self) -> f64 {
        self.standard.cost + self.advanced.cost
    }
}

impl fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inference usage ({})", self.scope)?;
        for tier in Tier::ALL {
            let s = self.tier(tier);
            writeln!(f, "  {} calls:          {}", tier, s.totals.api_calls)?;
            writeln!(f, "    prompt tokens:     {}", s.totals.prompt_tokens)?;
            writeln!(f, "    completion tokens: {}", s.totals.completion_tokens)?;
            writeln!(f, "    estimated cost:    ${:.4}", s.cost)?;
        }
        write!(f, "  total estimated cost: ${:.4}", self.total_cost())
    }
}
