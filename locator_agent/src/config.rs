//! Configuration for locator sessions.

use crate::error::{LocatorError, LocatorResult};
use crate::executor::{ActionExecutor, DEFAULT_SETTLE_DELAY};
use crate::inference::InferenceClient;
use crate::ledger::{UsageLedger, DEFAULT_USAGE_LOG};
use crate::llm::CompletionOptions;
use crate::resolver::{LocatorResolver, DEFAULT_VALIDATION_TIMEOUT};
use crate::store::{LocatorCacheStore, DEFAULT_STORE_NAME};
use locator_html::{ReducerOptions, SnapshotReducer};
use locator_types::Tier;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Default standard tier model.
pub const DEFAULT_STANDARD_MODEL: &str = "gpt-3.5-turbo";
/// Default advanced tier model.
pub const DEFAULT_ADVANCED_MODEL: &str = "gpt-4";

/// Locator session configuration.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// API key for the inference service.
    pub api_key: Option<String>,

    /// Chat-completions endpoint override.
    pub api_url: Option<String>,

    /// Tier used for inference.
    pub tier: Tier,

    /// Model behind the standard tier.
    pub standard_model: String,

    /// Model behind the advanced tier.
    pub advanced_model: String,

    /// LLM temperature.
    pub temperature: f32,

    /// Max tokens for LLM response.
    pub max_tokens: u16,

    /// Whether to request JSON output from the LLM.
    pub json_mode: bool,

    /// HTTP request timeout for inference calls.
    pub request_timeout: Duration,

    /// Bound on the live-selector wait.
    pub validation_timeout: Duration,

    /// Pause after each performed action.
    pub settle_delay: Duration,

    /// Directory holding cache stores.
    pub cache_dir: PathBuf,

    /// Active cache store name.
    pub store_name: String,

    /// Usage log file. `None` disables usage tracking.
    pub usage_log: Option<PathBuf>,

    /// Snapshot reducer options.
    pub reducer: ReducerOptions,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        let completion = CompletionOptions::default();

        Self {
            api_key: None,
            api_url: None,
            tier: Tier::Standard,
            standard_model: DEFAULT_STANDARD_MODEL.to_string(),
            advanced_model: DEFAULT_ADVANCED_MODEL.to_string(),
            temperature: completion.temperature,
            max_tokens: completion.max_tokens,
            json_mode: completion.json_mode,
            request_timeout: Duration::from_secs(30),
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            cache_dir: PathBuf::from("."),
            store_name: DEFAULT_STORE_NAME.to_string(),
            usage_log: Some(PathBuf::from(DEFAULT_USAGE_LOG)),
            reducer: ReducerOptions::default(),
        }
    }
}

impl LocatorConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by process environment variables.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `OPENAI_API_KEY` | `api_key` |
    /// | `LOCATOR_API_URL` | `api_url` |
    /// | `LOCATOR_TIER` | `tier` (`standard` / `advanced`) |
    /// | `LOCATOR_STANDARD_MODEL` | `standard_model` |
    /// | `LOCATOR_ADVANCED_MODEL` | `advanced_model` |
    /// | `LOCATOR_VALIDATION_TIMEOUT_MS` | `validation_timeout` |
    /// | `LOCATOR_CACHE_DIR` | `cache_dir` |
    /// | `LOCATOR_STORE` | `store_name` |
    /// | `LOCATOR_USAGE_LOG` | `usage_log` |
    /// | `LOCATOR_DUMP_DIR` | `reducer.dump_dir` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(key) = get("OPENAI_API_KEY") {
            config.api_key = Some(key);
        }
        if let Some(url) = get("LOCATOR_API_URL") {
            config.api_url = Some(url);
        }
        if let Some(tier) = get("LOCATOR_TIER") {
            match Tier::from_str(&tier) {
                Ok(tier) => config.tier = tier,
                Err(e) => log::warn!("ignoring LOCATOR_TIER: {}", e),
            }
        }
        if let Some(model) = get("LOCATOR_STANDARD_MODEL") {
            config.standard_model = model;
        }
        if let Some(model) = get("LOCATOR_ADVANCED_MODEL") {
            config.advanced_model = model;
        }
        if let Some(ms) = get("LOCATOR_VALIDATION_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => config.validation_timeout = Duration::from_millis(ms),
                Err(e) => log::warn!("ignoring LOCATOR_VALIDATION_TIMEOUT_MS: {}", e),
            }
        }
        if let Some(dir) = get("LOCATOR_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(name) = get("LOCATOR_STORE") {
            config.store_name = name;
        }
        if let Some(path) = get("LOCATOR_USAGE_LOG") {
            config.usage_log = Some(PathBuf::from(path));
        }
        if let Some(dir) = get("LOCATOR_DUMP_DIR") {
            config.reducer.dump_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the chat-completions endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the inference tier.
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Set the model for a tier.
    pub fn with_model(mut self, tier: Tier, model: impl Into<String>) -> Self {
        match tier {
            Tier::Standard => self.standard_model = model.into(),
            Tier::Advanced => self.advanced_model = model.into(),
        }
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, tokens: u16) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// Enable/disable JSON mode.
    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    /// Set request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the live-selector wait bound.
    pub fn with_validation_timeout(mut self, timeout: Duration) -> Self {
        self.validation_timeout = timeout;
        self
    }

    /// Set the post-action settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the store name.
    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    /// Set or disable the usage log.
    pub fn with_usage_log(mut self, path: Option<PathBuf>) -> Self {
        self.usage_log = path;
        self
    }

    /// Set reducer options.
    pub fn with_reducer(mut self, options: ReducerOptions) -> Self {
        self.reducer = options;
        self
    }

    /// Completion options derived from this config.
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_mode: self.json_mode,
        }
    }

    /// Build an OpenAI-compatible inference client (without a ledger).
    pub fn inference_client(&self) -> LocatorResult<InferenceClient> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(LocatorError::NotConfigured("api_key"))?;

        let client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?;

        Ok(InferenceClient::openai(
            api_key,
            &self.standard_model,
            &self.advanced_model,
            self.api_url.as_deref(),
        )
        .with_tier(self.tier)
        .with_options(self.completion_options())
        .with_client(client))
    }

    /// Build the resolver: inference client, usage ledger, cache store and reducer.
    ///
    /// Fails before touching any file when the inference client cannot be built.
    pub fn resolver(&self) -> LocatorResult<LocatorResolver> {
        let mut inference = self.inference_client()?;

        if let Some(path) = &self.usage_log {
            inference = inference.with_ledger(Arc::new(UsageLedger::open(path)));
        }

        let store = LocatorCacheStore::open_named(&self.cache_dir, &self.store_name);

        Ok(LocatorResolver::new(store, inference)
            .with_reducer(SnapshotReducer::new(self.reducer.clone()))
            .with_validation_timeout(self.validation_timeout))
    }

    /// Build the action executor.
    pub fn executor(&self) -> ActionExecutor {
        ActionExecutor::new().with_settle_delay(self.settle_delay)
    }
}
