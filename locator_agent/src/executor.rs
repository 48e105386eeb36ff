//! Performs a resolved action on the page.

use crate::driver::PageDriver;
use crate::error::{LocatorError, LocatorResult};
use locator_types::{ActionKind, LocatorDescriptor};
use std::time::Duration;

/// Default pause after a performed action.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Result of executing a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action ran.
    Performed,
    /// The action kind is not one the executor knows.
    Unrecognized(String),
}

/// Runs fill/click/select against a [`PageDriver`].
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    settle_delay: Duration,
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionExecutor {
    /// Create an executor with the default settle delay.
    pub fn new() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Pause this long after each performed action.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Execute `descriptor` with an optional data payload.
    ///
    /// Fill and select without `data` fail with
    /// [`LocatorError::MissingData`] before touching the page.
    pub async fn execute<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        instruction: &str,
        descriptor: &LocatorDescriptor,
        data: Option<&str>,
    ) -> LocatorResult<ActionOutcome> {
        let selector = descriptor.selector.as_str();

        let payload = match data {
            Some(data) => data,
            None if descriptor.action.requires_data() => {
                return Err(LocatorError::MissingData {
                    action: descriptor.action.clone(),
                    instruction: instruction.to_string(),
                });
            }
            None => "",
        };

        match &descriptor.action {
            ActionKind::Fill => {
                log::info!("fill {} for \"{}\"", selector, instruction);
                driver.fill(selector, payload).await?;
            }
            ActionKind::Click => {
                log::info!("click {} for \"{}\"", selector, instruction);
                driver.click(selector).await?;
            }
            ActionKind::Select => {
                log::info!("select {:?} in {} for \"{}\"", payload, selector, instruction);
                driver.select_by_label(selector, payload).await?;
            }
            ActionKind::Unknown(raw) => {
                log::warn!(
                    "unrecognized action {:?} for \"{}\", skipping",
                    raw,
                    instruction
                );
                return Ok(ActionOutcome::Unrecognized(raw.clone()));
            }
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(ActionOutcome::Performed)
    }
}
