//! Inference client: (instruction, reduced snapshot) → descriptor.

use crate::error::{LocatorError, LocatorResult};
use crate::json::extract_last_json_object;
use crate::ledger::UsageLedger;
use crate::llm::{CompletionOptions, LLMProvider, Message, OpenAIProvider, TokenUsage};
use locator_types::{ActionKind, FailureKind, LocatorDescriptor, Tier};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// System prompt constraining the reply to the two-field schema.
const SYSTEM_PROMPT: &str = "You are an assistant that returns JSON describing element locators \
for browser automation. Only output a single valid JSON object with keys 'action' and 'selector'.";

/// Why an inference produced no usable descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceFailure {
    /// Transport or schema failure.
    pub kind: FailureKind,
    /// Human-readable cause.
    pub reason: String,
}

impl InferenceFailure {
    fn from_error(e: &LocatorError) -> Self {
        Self {
            kind: e.kind().unwrap_or(FailureKind::TransportFailure),
            reason: e.to_string(),
        }
    }
}

impl fmt::Display for InferenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)
    }
}

/// Outcome of one inference call. Failures are values, never errors.
pub type InferenceResult = Result<LocatorDescriptor, InferenceFailure>;

/// Build the user message for an instruction and reduced snapshot.
pub fn build_prompt(instruction: &str, reduced_snapshot: &str) -> String {
    format!(
        "Find the best CSS selector for the following action: \"{}\".\n\
Here is the HTML snippet:\n\
{}\n\
\n\
Return the result as a JSON object with two properties:\n\
{{\n  \"action\": \"fill\" | \"click\" | \"select\",\n  \"selector\": \"the CSS selector\"\n}}",
        instruction, reduced_snapshot
    )
}

/// Strictly parse a reply into a descriptor.
///
/// The last JSON object in the reply must carry non-empty string fields
/// `action` and `selector`. Unknown action names parse to
/// [`ActionKind::Unknown`]; they conform to the schema.
pub fn parse_descriptor(content: &str) -> LocatorResult<LocatorDescriptor> {
    let raw = extract_last_json_object(content).ok_or(LocatorError::InvalidField("body"))?;
    let value: serde_json::Value = serde_json::from_str(raw)?;

    let action = ActionKind::parse(string_field(&value, "action")?);
    let selector = string_field(&value, "selector")?;

    Ok(LocatorDescriptor::new(action, selector))
}

fn string_field<'a>(value: &'a serde_json::Value, name: &'static str) -> LocatorResult<&'a str> {
    let field = value.get(name).ok_or(LocatorError::MissingField(name))?;
    let s = field.as_str().ok_or(LocatorError::InvalidField(name))?.trim();

    if s.is_empty() {
        Err(LocatorError::InvalidField(name))
    } else {
        Ok(s)
    }
}

/// Resolves descriptors through an LLM provider and records usage.
///
/// Holds one provider per [`Tier`]; the selected tier decides which one is
/// called. Never retries.
pub struct InferenceClient {
    standard: Arc<dyn LLMProvider>,
    advanced: Arc<dyn LLMProvider>,
    tier: Tier,
    options: CompletionOptions,
    client: reqwest::Client,
    ledger: Option<Arc<UsageLedger>>,
    calls: AtomicU64,
}

impl InferenceClient {
    /// Use `provider` for both tiers.
    pub fn new(provider: impl LLMProvider + 'static) -> Self {
        let provider: Arc<dyn LLMProvider> = Arc::new(provider);

        Self {
            standard: provider.clone(),
            advanced: provider,
            tier: Tier::default(),
            options: CompletionOptions::default(),
            client: reqwest::Client::new(),
            ledger: None,
            calls: AtomicU64::new(0),
        }
    }

    /// OpenAI-compatible providers for both tiers.
    pub fn openai(
        api_key: &str,
        standard_model: &str,
        advanced_model: &str,
        api_url: Option<&str>,
    ) -> Self {
        let build = |model: &str| {
            let provider = OpenAIProvider::new(api_key, model);
            match api_url {
                Some(url) => provider.with_api_url(url),
                None => provider,
            }
        };

        Self::new(build(standard_model)).with_provider(Tier::Advanced, build(advanced_model))
    }

    /// Replace the provider of one tier.
    pub fn with_provider(mut self, tier: Tier, provider: impl LLMProvider + 'static) -> Self {
        let provider: Arc<dyn LLMProvider> = Arc::new(provider);
        match tier {
            Tier::Standard => self.standard = provider,
            Tier::Advanced => self.advanced = provider,
        }
        self
    }

    /// Select the tier to call.
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Set completion options.
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Record usage into `ledger`.
    pub fn with_ledger(mut self, ledger: Arc<UsageLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Change the tier at runtime.
    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }

    /// The selected tier.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// The attached ledger, if any.
    pub fn ledger(&self) -> Option<&Arc<UsageLedger>> {
        self.ledger.as_ref()
    }

    /// Number of service calls issued.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn provider(&self) -> &Arc<dyn LLMProvider> {
        match self.tier {
            Tier::Standard => &self.standard,
            Tier::Advanced => &self.advanced,
        }
    }

    /// Ask the service for a descriptor.
    pub async fn infer(&self, instruction: &str, reduced_snapshot: &str) -> InferenceResult {
        let provider = self.provider();
        if !provider.is_configured() {
            log::warn!(
                "[{}:{}] provider is not configured, skipping \"{}\"",
                provider.provider_name(),
                provider.model(),
                instruction
            );
            return Err(InferenceFailure::from_error(&LocatorError::NotConfigured(
                "provider",
            )));
        }

        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(build_prompt(instruction, reduced_snapshot)),
        ];

        self.calls.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "[{}:{}] resolving locator for \"{}\"",
            provider.provider_name(),
            provider.model(),
            instruction
        );

        let response = match provider.complete(messages, &self.options, &self.client).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("inference failed for \"{}\": {}", instruction, e);
                return Err(InferenceFailure::from_error(&e));
            }
        };

        self.record_usage(&response.usage);

        match parse_descriptor(&response.content) {
            Ok(descriptor) => {
                log::debug!("locator for \"{}\": {}", instruction, descriptor);
                Ok(descriptor)
            }
            Err(e) => {
                log::warn!(
                    "unusable inference reply for \"{}\": {} ({:?})",
                    instruction,
                    e,
                    response.content
                );
                Err(InferenceFailure::from_error(&e))
            }
        }
    }

    fn record_usage(&self, usage: &TokenUsage) {
        let prompt = u64::from(usage.prompt_tokens);
        let completion = u64::from(usage.completion_tokens);

        log::info!(
            "inference [{}] prompt tokens: {}, completion tokens: {}, estimated cost: ${:.4}",
            self.tier,
            prompt,
            completion,
            self.tier.rate().cost(prompt, completion)
        );

        if let Some(ledger) = &self.ledger {
            if let Err(e) = ledger.accumulate(self.tier, prompt, completion) {
                log::warn!("could not persist usage to {}: {}", ledger.path().display(), e);
            }
        }
    }
}

impl fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceClient")
            .field("standard", &self.standard.model())
            .field("advanced", &self.advanced.model())
            .field("tier", &self.tier)
            .field("options", &self.options)
            .field("calls", &self.calls())
            .finish()
    }
}
