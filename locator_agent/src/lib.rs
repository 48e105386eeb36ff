//! # Locator Agent
//!
//! Resolves natural-language UI instructions ("fill username", "click login")
//! into element locators on a live page, caching every resolution so repeat
//! runs make no inference calls.
//!
//! ## Features
//!
//! - **Cache first**: descriptors are keyed by the instruction plus a prefix
//!   of the page snapshot and persisted per named store
//! - **Self-healing**: a cached selector missing from the live page is
//!   invalidated and re-resolved exactly once
//! - **Small payloads**: snapshots are reduced with [`locator_html`] before
//!   they are sent to the model
//! - **Cost tracking**: per-day, per-tier usage ledger with fixed pricing
//! - **Feature-gated**: WebDriver support behind `webdriver`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use locator_agent::{LocatorConfig, LocatorSession, WebDriverPage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let driver = WebDriverPage::connect_chrome("http://localhost:9515", true).await?;
//!     let mut session = LocatorSession::from_config(&LocatorConfig::from_env(), driver)?;
//!
//!     session.navigate("https://www.saucedemo.com").await?;
//!     session.prompt("fill username", Some("standard_user")).await?;
//!     session.prompt("fill password", Some("secret_sauce")).await?;
//!     session.prompt("click login", None).await?;
//!
//!     println!("inference calls: {}", session.inference_calls());
//!     Ok(())
//! }
//! ```
//!
//! ## Failure handling
//!
//! Service, schema and staleness failures skip the step and the session
//! carries on. A fill or select without data is the one hard error.

#![warn(missing_docs)]

pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod inference;
mod json;
pub mod ledger;
pub mod llm;
mod persist;
pub mod resolver;
pub mod session;
pub mod store;

#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use config::LocatorConfig;
pub use driver::PageDriver;
pub use error::{LocatorError, LocatorResult};
pub use executor::{ActionExecutor, ActionOutcome};
pub use inference::{InferenceClient, InferenceFailure, InferenceResult};
pub use json::extract_last_json_object;
pub use ledger::UsageLedger;
pub use llm::{
    CompletionOptions, CompletionResponse, LLMProvider, Message, OpenAIProvider, TokenUsage,
};
pub use resolver::{LocatorResolver, Resolution, ResolutionSource};
pub use session::{LocatorSession, StepOutcome};
pub use store::{CacheStats, LocatorCacheStore};

#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverPage;

pub use locator_html::{ReducerOptions, SnapshotReducer};
pub use locator_types::{
    ActionKind, FailureKind, Fingerprint, LocatorDescriptor, SummaryScope, Tier, UsageSummary,
};
