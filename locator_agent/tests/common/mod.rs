//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use locator_agent::llm::{CompletionOptions, CompletionResponse, LLMProvider, Message, TokenUsage};
use locator_agent::{
    ActionExecutor, InferenceClient, LocatorCacheStore, LocatorError, LocatorResolver,
    LocatorResult, LocatorSession, PageDriver, UsageLedger,
};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// An action the mock page received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Fill(String, String),
    Click(String),
    Select(String, String),
}

/// In-memory page: a fixed snapshot and a set of selectors that are "live".
#[derive(Debug, Default)]
pub struct MockPage {
    snapshot: Mutex<String>,
    live: Mutex<HashSet<String>>,
    actions: Mutex<Vec<PageAction>>,
    waits: Mutex<Vec<String>>,
    visited: Mutex<Vec<String>>,
}

impl MockPage {
    pub fn new(snapshot: &str, live: &[&str]) -> Arc<Self> {
        let page = Self::default();
        *page.snapshot.lock() = snapshot.to_string();
        page.live.lock().extend(live.iter().map(|s| s.to_string()));
        Arc::new(page)
    }

    pub fn set_live(&self, live: &[&str]) {
        let mut set = self.live.lock();
        set.clear();
        set.extend(live.iter().map(|s| s.to_string()));
    }

    pub fn actions(&self) -> Vec<PageAction> {
        self.actions.lock().clone()
    }

    pub fn waits(&self) -> Vec<String> {
        self.waits.lock().clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().clone()
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn navigate(&self, url: &str) -> LocatorResult<()> {
        self.visited.lock().push(url.to_string());
        Ok(())
    }

    async fn capture_snapshot(&self) -> LocatorResult<String> {
        Ok(self.snapshot.lock().clone())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> LocatorResult<()> {
        self.waits.lock().push(selector.to_string());
        if self.live.lock().contains(selector) {
            Ok(())
        } else {
            Err(LocatorError::Driver(format!("no element matches {}", selector)))
        }
    }

    async fn fill(&self, selector: &str, text: &str) -> LocatorResult<()> {
        self.actions
            .lock()
            .push(PageAction::Fill(selector.into(), text.into()));
        Ok(())
    }

    async fn click(&self, selector: &str) -> LocatorResult<()> {
        self.actions.lock().push(PageAction::Click(selector.into()));
        Ok(())
    }

    async fn select_by_label(&self, selector: &str, label: &str) -> LocatorResult<()> {
        self.actions
            .lock()
            .push(PageAction::Select(selector.into(), label.into()));
        Ok(())
    }
}

/// Provider that replays scripted replies and records every request.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    model: String,
    replies: Arc<Mutex<VecDeque<LocatorResult<CompletionResponse>>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Default::default()
        }
    }

    /// Queue a reply body with some token usage.
    pub fn reply(self, content: &str) -> Self {
        self.replies.lock().push_back(Ok(CompletionResponse {
            content: content.to_string(),
            usage: TokenUsage {
                prompt_tokens: 1000,
                completion_tokens: 20,
                total_tokens: 1020,
            },
        }));
        self
    }

    /// Queue a transport error.
    pub fn fail(self, error: LocatorError) -> Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        _options: &CompletionOptions,
        _client: &reqwest::Client,
    ) -> LocatorResult<CompletionResponse> {
        self.requests.lock().push(messages);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LocatorError::Remote("no scripted reply".into())))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        true
    }
}

pub const LOGIN_PAGE: &str = r#"<html><head><script>window.analytics = {}</script>
<style>.login{color:red}</style></head><body>
<form id="login">
<input id="user-name" data-test="username" placeholder="Username">
<input id="password" type="password" placeholder="Password">
<input id="login-button" type="submit" value="Login">
</form>
<select class="product_sort_container"><option>Name (A to Z)</option><option>Price (low to high)</option></select>
</body></html>"#;

/// Route `log` output through the test harness; `RUST_LOG=debug` shows resolver traces.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Session over `page` with a store in `dir` and a ledger at `dir/usage.json`.
pub fn session(
    dir: &Path,
    provider: ScriptedProvider,
    page: Arc<MockPage>,
) -> (LocatorSession<Arc<MockPage>>, Arc<UsageLedger>) {
    let ledger = Arc::new(UsageLedger::open(dir.join("usage.json")));
    let inference = InferenceClient::new(provider).with_ledger(ledger.clone());

    (session_with(dir, inference, page), ledger)
}

/// Session over `page` with a store named `suite` in `dir`.
pub fn session_with(
    dir: &Path,
    inference: InferenceClient,
    page: Arc<MockPage>,
) -> LocatorSession<Arc<MockPage>> {
    init_logging();
    let store = LocatorCacheStore::open_named(dir, "suite");
    let resolver =
        LocatorResolver::new(store, inference).with_validation_timeout(Duration::from_millis(10));
    let executor = ActionExecutor::new().with_settle_delay(Duration::ZERO);

    LocatorSession::new(page, resolver, executor)
}
