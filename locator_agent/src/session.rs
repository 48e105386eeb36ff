//! Per-test entry point: one instruction in, one UI action out.

use crate::config::LocatorConfig;
use crate::driver::PageDriver;
use crate::error::LocatorResult;
use crate::executor::{ActionExecutor, ActionOutcome};
use crate::resolver::{LocatorResolver, Resolution, ResolutionSource};
use crate::store::CacheStats;
use locator_types::{FailureKind, LocatorDescriptor, SummaryScope, UsageSummary};

/// What happened to one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The action ran on the page.
    Performed {
        /// The descriptor that was executed.
        descriptor: LocatorDescriptor,
        /// How it was resolved.
        source: ResolutionSource,
    },
    /// The step was skipped; the session can continue.
    Skipped {
        /// Why.
        kind: FailureKind,
        /// Diagnostic message.
        reason: String,
    },
}

impl StepOutcome {
    /// Whether the action ran.
    pub fn is_performed(&self) -> bool {
        matches!(self, Self::Performed { .. })
    }
}

/// A driver plus the resolver and executor acting on it.
///
/// # Example
/// ```ignore
/// use locator_agent::{LocatorConfig, LocatorSession};
///
/// let config = LocatorConfig::from_env().with_store_name("login-suite");
/// let mut session = LocatorSession::from_config(&config, driver)?;
///
/// session.navigate("https://www.saucedemo.com").await?;
/// session.prompt("fill username", Some("standard_user")).await?;
/// session.prompt("fill password", Some("secret_sauce")).await?;
/// session.prompt("click login", None).await?;
/// ```
#[derive(Debug)]
pub struct LocatorSession<D> {
    driver: D,
    resolver: LocatorResolver,
    executor: ActionExecutor,
}

impl<D: PageDriver> LocatorSession<D> {
    /// Assemble a session from parts.
    pub fn new(driver: D, resolver: LocatorResolver, executor: ActionExecutor) -> Self {
        Self {
            driver,
            resolver,
            executor,
        }
    }

    /// Build the full stack from configuration.
    pub fn from_config(config: &LocatorConfig, driver: D) -> LocatorResult<Self> {
        Ok(Self::new(driver, config.resolver()?, config.executor()))
    }

    /// Navigate the driver.
    pub async fn navigate(&self, url: &str) -> LocatorResult<()> {
        log::debug!("navigate {}", url);
        self.driver.navigate(url).await
    }

    /// Resolve `instruction` on the current page and perform it.
    ///
    /// Only missing payloads and driver failures are errors. Service,
    /// schema and staleness failures yield [`StepOutcome::Skipped`].
    pub async fn prompt(
        &mut self,
        instruction: &str,
        data: Option<&str>,
    ) -> LocatorResult<StepOutcome> {
        let (descriptor, source) = match self.resolver.resolve(&self.driver, instruction).await? {
            Resolution::Resolved { descriptor, source } => (descriptor, source),
            Resolution::Failed { kind, reason } => {
                log::warn!("skipping \"{}\": {}: {}", instruction, kind, reason);
                return Ok(StepOutcome::Skipped { kind, reason });
            }
        };

        match self
            .executor
            .execute(&self.driver, instruction, &descriptor, data)
            .await
        {
            Ok(ActionOutcome::Performed) => Ok(StepOutcome::Performed { descriptor, source }),
            Ok(ActionOutcome::Unrecognized(raw)) => Ok(StepOutcome::Skipped {
                kind: FailureKind::UnrecognizedAction,
                reason: format!("unrecognized action \"{}\"", raw),
            }),
            Err(e) => {
                if e.kind().is_some_and(FailureKind::is_fatal) {
                    log::error!("aborting \"{}\": {}", instruction, e);
                }
                Err(e)
            }
        }
    }

    /// Switch the cache store, e.g. per test suite.
    pub fn set_store(&mut self, name: impl Into<String>) {
        self.resolver.store_mut().switch_store(name);
    }

    /// Inference calls issued by this session.
    pub fn inference_calls(&self) -> u64 {
        self.resolver.inference_calls()
    }

    /// Cache statistics of the active store.
    pub fn cache_stats(&self) -> CacheStats {
        self.resolver.cache_stats()
    }

    /// Usage summary from the attached ledger.
    pub fn summarize(&self, scope: SummaryScope) -> Option<UsageSummary> {
        self.resolver
            .inference()
            .ledger()
            .map(|ledger| ledger.summarize(scope))
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The resolver.
    pub fn resolver(&self) -> &LocatorResolver {
        &self.resolver
    }

    /// Mutable access to the resolver.
    pub fn resolver_mut(&mut self) -> &mut LocatorResolver {
        &mut self.resolver
    }

    /// Take the driver back, e.g. to quit it.
    pub fn into_driver(self) -> D {
        self.driver
    }
}
