//! The narrow page-driver surface the resolver and executor depend on.

use crate::error::LocatorResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Browser automation primitives.
///
/// Implementations wrap a concrete engine (see the `webdriver` feature).
/// `wait_for_selector` must return an error when the selector does not
/// match within `timeout`; the resolver treats any such error as staleness.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL.
    async fn navigate(&self, url: &str) -> LocatorResult<()>;

    /// Serialize the current page structure.
    async fn capture_snapshot(&self) -> LocatorResult<String>;

    /// Block until `selector` matches an element or `timeout` elapses.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> LocatorResult<()>;

    /// Replace the element's value with `text`.
    async fn fill(&self, selector: &str, text: &str) -> LocatorResult<()>;

    /// Click the element.
    async fn click(&self, selector: &str) -> LocatorResult<()>;

    /// Choose the option whose visible label is `label`.
    async fn select_by_label(&self, selector: &str, label: &str) -> LocatorResult<()>;
}

#[async_trait]
impl<T: PageDriver + ?Sized> PageDriver for Arc<T> {
    async fn navigate(&self, url: &str) -> LocatorResult<()> {
        (**self).navigate(url).await
    }

    async fn capture_snapshot(&self) -> LocatorResult<String> {
        (**self).capture_snapshot().await
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> LocatorResult<()> {
        (**self).wait_for_selector(selector, timeout).await
    }

    async fn fill(&self, selector: &str, text: &str) -> LocatorResult<()> {
        (**self).fill(selector, text).await
    }

    async fn click(&self, selector: &str) -> LocatorResult<()> {
        (**self).click(selector).await
    }

    async fn select_by_label(&self, selector: &str, label: &str) -> LocatorResult<()> {
        (**self).select_by_label(selector, label).await
    }
}
