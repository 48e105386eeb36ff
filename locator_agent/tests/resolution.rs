mod common;

use common::{session, session_with, MockPage, PageAction, ScriptedProvider, LOGIN_PAGE};
use locator_agent::{
    ActionKind, FailureKind, Fingerprint, InferenceClient, LocatorCacheStore, LocatorDescriptor,
    LocatorError, ResolutionSource, StepOutcome, SummaryScope, Tier, UsageLedger,
};
use std::sync::Arc;

const FILL_USERNAME: &str = r##"{"action": "fill", "selector": "#user-name"}"##;
const CLICK_LOGIN: &str = r##"{"action": "click", "selector": "#login-button"}"##;

#[tokio::test]
async fn fill_username_on_empty_cache() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo").reply(FILL_USERNAME);
    let page = MockPage::new(LOGIN_PAGE, &["#user-name", "#password", "#login-button"]);
    let (mut session, ledger) = session(dir.path(), provider.clone(), page.clone());

    let outcome = session
        .prompt("fill username", Some("standard_user"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        StepOutcome::Performed {
            descriptor: LocatorDescriptor::fill("#user-name"),
            source: ResolutionSource::Inference,
        }
    );
    assert_eq!(session.inference_calls(), 1);
    assert_eq!(
        page.actions(),
        vec![PageAction::Fill("#user-name".into(), "standard_user".into())]
    );

    let usage = ledger.summarize(SummaryScope::AllTime);
    assert_eq!(usage.standard.totals.api_calls, 1);
    assert_eq!(usage.standard.totals.prompt_tokens, 1000);
    assert_eq!(usage.advanced.totals.api_calls, 0);

    let stored = LocatorCacheStore::open_named(dir.path(), "suite");
    assert_eq!(
        stored.peek(&Fingerprint::new("fill username", LOGIN_PAGE)),
        Some(&LocatorDescriptor::fill("#user-name"))
    );
}

#[tokio::test]
async fn second_resolution_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo").reply(CLICK_LOGIN);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, ledger) = session(dir.path(), provider.clone(), page.clone());

    let first = session.prompt("click login", None).await.unwrap();
    let second = session.prompt("click login", None).await.unwrap();

    assert_eq!(session.inference_calls(), 1);
    assert_eq!(provider.request_count(), 1);
    assert_eq!(
        second,
        StepOutcome::Performed {
            descriptor: LocatorDescriptor::click("#login-button"),
            source: ResolutionSource::Cache,
        }
    );
    assert!(first.is_performed());
    assert_eq!(ledger.summarize(SummaryScope::Today).standard.totals.api_calls, 1);

    let stats = session.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn deleted_entry_triggers_exactly_one_inference() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo")
        .reply(CLICK_LOGIN)
        .reply(CLICK_LOGIN);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, _) = session(dir.path(), provider.clone(), page);

    session.prompt("click login", None).await.unwrap();
    assert_eq!(session.inference_calls(), 1);

    let fingerprint = Fingerprint::new("click login", LOGIN_PAGE);
    assert!(session
        .resolver_mut()
        .store_mut()
        .delete(&fingerprint)
        .unwrap());

    session.prompt("click login", None).await.unwrap();
    assert_eq!(session.inference_calls(), 2);
}

#[tokio::test]
async fn stale_cached_selector_is_replaced_once() {
    let dir = tempfile::tempdir().unwrap();
    let fingerprint = Fingerprint::new("click login", LOGIN_PAGE);
    LocatorCacheStore::open_named(dir.path(), "suite")
        .put(&fingerprint, LocatorDescriptor::click("button.login-old"))
        .unwrap();

    let provider = ScriptedProvider::new("gpt-3.5-turbo").reply(CLICK_LOGIN);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, _) = session(dir.path(), provider.clone(), page.clone());

    let outcome = session.prompt("click login", None).await.unwrap();

    assert_eq!(
        outcome,
        StepOutcome::Performed {
            descriptor: LocatorDescriptor::click("#login-button"),
            source: ResolutionSource::Retry,
        }
    );
    assert_eq!(session.inference_calls(), 1);
    assert_eq!(page.waits(), vec!["button.login-old", "#login-button"]);
    assert_eq!(page.actions(), vec![PageAction::Click("#login-button".into())]);

    let stored = LocatorCacheStore::open_named(dir.path(), "suite");
    assert_eq!(
        stored.peek(&fingerprint),
        Some(&LocatorDescriptor::click("#login-button"))
    );
}

#[tokio::test]
async fn failed_retry_skips_without_further_inference() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo")
        .reply(r##"{"action": "click", "selector": "#login"}"##)
        .reply(r##"{"action": "click", "selector": "#sign-in"}"##)
        .reply(CLICK_LOGIN);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, _) = session(dir.path(), provider.clone(), page.clone());

    let outcome = session.prompt("click login", None).await.unwrap();

    match outcome {
        StepOutcome::Skipped { kind, .. } => assert_eq!(kind, FailureKind::StaleSelector),
        other => panic!("expected skip, got {:?}", other),
    }
    // the initial miss plus exactly one retry
    assert_eq!(session.inference_calls(), 2);
    assert_eq!(provider.request_count(), 2);
    assert!(page.actions().is_empty());
    assert!(session.resolver().store().is_empty());
}

#[tokio::test]
async fn select_without_data_aborts_the_step() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo")
        .reply(r#"{"action": "selectOption", "selector": "select.product_sort_container"}"#);
    let page = MockPage::new(LOGIN_PAGE, &["select.product_sort_container"]);
    let (mut session, _) = session(dir.path(), provider, page.clone());

    let err = session.prompt("select sort order", None).await.unwrap_err();

    match err {
        LocatorError::MissingData { action, instruction } => {
            assert_eq!(action, ActionKind::Select);
            assert_eq!(instruction, "select sort order");
        }
        other => panic!("expected missing data, got {:?}", other),
    }
    assert!(page.actions().is_empty());
}

#[tokio::test]
async fn fill_without_data_aborts_the_step() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo").reply(FILL_USERNAME);
    let page = MockPage::new(LOGIN_PAGE, &["#user-name"]);
    let (mut session, _) = session(dir.path(), provider, page.clone());

    let err = session.prompt("fill username", None).await.unwrap_err();

    match err {
        LocatorError::MissingData {
            action,
            instruction,
        } => {
            assert_eq!(action, ActionKind::Fill);
            assert_eq!(instruction, "fill username");
        }
        other => panic!("expected missing data, got {:?}", other),
    }
    assert!(page.actions().is_empty());
}

#[tokio::test]
async fn stale_entry_with_failed_reinference_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let fingerprint = Fingerprint::new("click login", LOGIN_PAGE);
    LocatorCacheStore::open_named(dir.path(), "suite")
        .put(&fingerprint, LocatorDescriptor::click("button.login-old"))
        .unwrap();

    let provider = ScriptedProvider::new("gpt-3.5-turbo").fail(LocatorError::RateLimited);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, ledger) = session(dir.path(), provider.clone(), page.clone());

    let outcome = session.prompt("click login", None).await.unwrap();

    match outcome {
        StepOutcome::Skipped { kind, .. } => assert_eq!(kind, FailureKind::TransportFailure),
        other => panic!("expected skip, got {:?}", other),
    }
    assert_eq!(session.inference_calls(), 1);
    assert_eq!(provider.request_count(), 1);
    assert!(page.actions().is_empty());
    assert!(ledger.is_empty());

    let stored = LocatorCacheStore::open_named(dir.path(), "suite");
    assert!(stored.peek(&fingerprint).is_none());
}

#[tokio::test]
async fn select_with_data_chooses_label() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo")
        .reply(r#"{"action": "select", "selector": "select.product_sort_container"}"#);
    let page = MockPage::new(LOGIN_PAGE, &["select.product_sort_container"]);
    let (mut session, _) = session(dir.path(), provider, page.clone());

    let outcome = session
        .prompt("select sort order", Some("Price (low to high)"))
        .await
        .unwrap();

    assert!(outcome.is_performed());
    assert_eq!(
        page.actions(),
        vec![PageAction::Select(
            "select.product_sort_container".into(),
            "Price (low to high)".into()
        )]
    );
}

#[tokio::test]
async fn malformed_reply_is_skipped_and_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let provider =
        ScriptedProvider::new("gpt-3.5-turbo").reply(r##"{"action": "click", "selector": "#log"##);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, ledger) = session(dir.path(), provider, page.clone());

    let outcome = session.prompt("click login", None).await.unwrap();

    match outcome {
        StepOutcome::Skipped { kind, .. } => assert_eq!(kind, FailureKind::SchemaViolation),
        other => panic!("expected skip, got {:?}", other),
    }
    assert!(session.resolver().store().is_empty());
    assert!(!dir.path().join("suite.json").exists());
    assert!(page.actions().is_empty());
    // the service answered, so the call is still billed
    assert_eq!(ledger.summarize(SummaryScope::AllTime).standard.totals.api_calls, 1);
}

#[tokio::test]
async fn transport_failure_is_skipped_and_not_billed() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo").fail(LocatorError::Timeout);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, ledger) = session(dir.path(), provider, page);

    let outcome = session.prompt("click login", None).await.unwrap();

    match outcome {
        StepOutcome::Skipped { kind, reason } => {
            assert_eq!(kind, FailureKind::TransportFailure);
            assert!(reason.contains("timed out"));
        }
        other => panic!("expected skip, got {:?}", other),
    }
    assert!(session.resolver().store().is_empty());
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn unrecognized_action_is_skipped_and_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo")
        .reply(r##"{"action": "hover", "selector": "#login-button"}"##);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, _) = session(dir.path(), provider, page.clone());

    let outcome = session.prompt("hover login", None).await.unwrap();

    match outcome {
        StepOutcome::Skipped { kind, reason } => {
            assert_eq!(kind, FailureKind::UnrecognizedAction);
            assert!(reason.contains("hover"));
        }
        other => panic!("expected skip, got {:?}", other),
    }
    assert!(page.actions().is_empty());
    assert!(session.resolver().store().is_empty());
}

#[tokio::test]
async fn session_continues_after_skipped_step() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo")
        .reply("sorry, no idea")
        .reply(CLICK_LOGIN);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, _) = session(dir.path(), provider, page.clone());

    let skipped = session.prompt("click ghost", None).await.unwrap();
    let performed = session.prompt("click login", None).await.unwrap();

    assert!(!skipped.is_performed());
    assert!(performed.is_performed());
    assert_eq!(page.actions(), vec![PageAction::Click("#login-button".into())]);
}

#[tokio::test]
async fn inference_sees_reduced_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo").reply(FILL_USERNAME);
    let page = MockPage::new(LOGIN_PAGE, &["#user-name"]);
    let (mut session, _) = session(dir.path(), provider.clone(), page);

    session.prompt("fill username", Some("x")).await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0][0].role, "system");
    let user = &requests[0][1].content;
    assert!(user.contains("\"fill username\""));
    assert!(user.contains(r#"<input id="user-name" placeholder="Username">"#));
    assert!(!user.contains("<script"));
    assert!(!user.contains("data-test"));
}

#[tokio::test]
async fn switching_store_reloads_entries() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new("gpt-3.5-turbo")
        .reply(CLICK_LOGIN)
        .reply(CLICK_LOGIN);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let (mut session, _) = session(dir.path(), provider, page);

    session.prompt("click login", None).await.unwrap();
    assert_eq!(session.inference_calls(), 1);

    session.set_store("checkout-suite");
    session.prompt("click login", None).await.unwrap();
    assert_eq!(session.inference_calls(), 2);

    session.set_store("suite");
    session.prompt("click login", None).await.unwrap();
    assert_eq!(session.inference_calls(), 2);

    assert!(dir.path().join("checkout-suite.json").exists());
}

#[tokio::test]
async fn advanced_tier_bills_advanced_rates() {
    let dir = tempfile::tempdir().unwrap();
    let standard = ScriptedProvider::new("gpt-3.5-turbo");
    let advanced = ScriptedProvider::new("gpt-4").reply(CLICK_LOGIN);
    let page = MockPage::new(LOGIN_PAGE, &["#login-button"]);
    let ledger = Arc::new(UsageLedger::open(dir.path().join("usage.json")));
    let inference = InferenceClient::new(standard.clone())
        .with_provider(Tier::Advanced, advanced.clone())
        .with_tier(Tier::Advanced)
        .with_ledger(ledger.clone());
    let mut session = session_with(dir.path(), inference, page);

    session.prompt("click login", None).await.unwrap();

    assert_eq!(standard.request_count(), 0);
    assert_eq!(advanced.request_count(), 1);

    let usage = ledger.summarize(SummaryScope::Today);
    assert_eq!(usage.advanced.totals.api_calls, 1);
    assert_eq!(usage.standard.totals.api_calls, 0);
    // 1000 prompt tokens at $0.03/1K + 20 completion tokens at $0.06/1K
    assert!((usage.advanced.cost - 0.0312).abs() < 1e-9);
}

#[tokio::test]
async fn navigate_reaches_driver() {
    let dir = tempfile::tempdir().unwrap();
    let page = MockPage::new(LOGIN_PAGE, &[]);
    let (session, _) = session(dir.path(), ScriptedProvider::new("gpt-3.5-turbo"), page.clone());

    session.navigate("https://www.saucedemo.com").await.unwrap();
    assert_eq!(page.visited(), vec!["https://www.saucedemo.com"]);
}
