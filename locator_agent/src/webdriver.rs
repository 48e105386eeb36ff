//! WebDriver-backed [`PageDriver`].
//!
//! Wraps a thirtyfour session. Requires the `webdriver` feature and a running
//! WebDriver server (chromedriver, geckodriver, ...).

use crate::driver::PageDriver;
use crate::error::{LocatorError, LocatorResult};
use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::components::SelectElement;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;

/// Poll interval while waiting for a selector.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl From<WebDriverError> for LocatorError {
    fn from(e: WebDriverError) -> Self {
        Self::Driver(e.to_string())
    }
}

/// A page driven through WebDriver.
pub struct WebDriverPage {
    driver: WebDriver,
}

impl WebDriverPage {
    /// Wrap an existing session.
    pub fn new(driver: WebDriver) -> Self {
        Self { driver }
    }

    /// Start a Chrome session on the WebDriver server at `server_url`.
    pub async fn connect_chrome(server_url: &str, headless: bool) -> LocatorResult<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if headless {
            caps.set_headless()?;
        }
        let driver = WebDriver::new(server_url, caps).await?;
        Ok(Self::new(driver))
    }

    /// The underlying session.
    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    /// End the session.
    pub async fn quit(self) -> LocatorResult<()> {
        self.driver.quit().await?;
        Ok(())
    }

    async fn find(&self, selector: &str) -> LocatorResult<WebElement> {
        Ok(self.driver.find(By::Css(selector)).await?)
    }
}

#[async_trait]
impl PageDriver for WebDriverPage {
    async fn navigate(&self, url: &str) -> LocatorResult<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn capture_snapshot(&self) -> LocatorResult<String> {
        Ok(self.driver.source().await?)
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> LocatorResult<()> {
        self.driver
            .query(By::Css(selector))
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> LocatorResult<()> {
        let element = self.find(selector).await?;
        element.clear().await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> LocatorResult<()> {
        self.find(selector).await?.click().await?;
        Ok(())
    }

    async fn select_by_label(&self, selector: &str, label: &str) -> LocatorResult<()> {
        let element = self.find(selector).await?;
        let select = SelectElement::new(&element).await?;
        select.select_by_visible_text(label).await?;
        Ok(())
    }
}

impl std::fmt::Debug for WebDriverPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDriverPage").finish_non_exhaustive()
    }
}
