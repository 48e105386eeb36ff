//! Cache-first locator resolution with live validation and one retry.
//!
//! ```text
//! CACHE_LOOKUP ── hit ──► VALIDATE ──────────────┬─► RESOLVED
//!      │                     ▲                   │
//!      └─ miss ─► INFER ─────┘                stale
//!                                                │
//!                 INVALIDATE ─► INFER ─► VALIDATE ┴─► RESOLVED | FAILED
//! ```

use crate::driver::PageDriver;
use crate::error::LocatorResult;
use crate::inference::{InferenceClient, InferenceResult};
use crate::store::{CacheStats, LocatorCacheStore};
use locator_html::SnapshotReducer;
use locator_types::{FailureKind, Fingerprint, LocatorDescriptor};
use std::time::Duration;

/// Default bound on the live-selector wait.
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Where a resolved descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Served from the cache store.
    Cache,
    /// First inference for this fingerprint.
    Inference,
    /// Re-inference after the previous selector proved stale.
    Retry,
}

/// Terminal state of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A descriptor whose selector is live on the page.
    Resolved {
        /// The validated descriptor.
        descriptor: LocatorDescriptor,
        /// How it was obtained.
        source: ResolutionSource,
    },
    /// Nothing usable; the step should be skipped.
    Failed {
        /// Failure classification.
        kind: FailureKind,
        /// Diagnostic message.
        reason: String,
    },
}

impl Resolution {
    /// Whether a descriptor was resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// The resolved descriptor, if any.
    pub fn descriptor(&self) -> Option<&LocatorDescriptor> {
        match self {
            Self::Resolved { descriptor, .. } => Some(descriptor),
            Self::Failed { .. } => None,
        }
    }
}

/// Orchestrates cache lookup, inference, validation and the single retry.
///
/// Owns its cache store. Resolutions take `&mut self`, so one resolver
/// serves one session in issue order.
#[derive(Debug)]
pub struct LocatorResolver {
    store: LocatorCacheStore,
    inference: InferenceClient,
    reducer: SnapshotReducer,
    validation_timeout: Duration,
}

impl LocatorResolver {
    /// Create a resolver.
    pub fn new(store: LocatorCacheStore, inference: InferenceClient) -> Self {
        Self {
            store,
            inference,
            reducer: SnapshotReducer::default(),
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
        }
    }

    /// Use a configured reducer.
    pub fn with_reducer(mut self, reducer: SnapshotReducer) -> Self {
        self.reducer = reducer;
        self
    }

    /// Bound the live-selector wait.
    pub fn with_validation_timeout(mut self, timeout: Duration) -> Self {
        self.validation_timeout = timeout;
        self
    }

    /// The cache store.
    pub fn store(&self) -> &LocatorCacheStore {
        &self.store
    }

    /// Mutable access to the cache store.
    pub fn store_mut(&mut self) -> &mut LocatorCacheStore {
        &mut self.store
    }

    /// The inference client.
    pub fn inference(&self) -> &InferenceClient {
        &self.inference
    }

    /// Mutable access to the inference client.
    pub fn inference_mut(&mut self) -> &mut InferenceClient {
        &mut self.inference
    }

    /// Inference calls issued so far.
    pub fn inference_calls(&self) -> u64 {
        self.inference.calls()
    }

    /// Cache statistics of the active store.
    pub fn cache_stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Capture the page and resolve `instruction` against it.
    ///
    /// Only a failed snapshot capture is an error; every other failure is a
    /// [`Resolution::Failed`].
    pub async fn resolve<D: PageDriver + ?Sized>(
        &mut self,
        driver: &D,
        instruction: &str,
    ) -> LocatorResult<Resolution> {
        let snapshot = driver.capture_snapshot().await?;
        Ok(self.resolve_snapshot(driver, instruction, &snapshot).await)
    }

    /// Resolve `instruction` against an already captured snapshot.
    pub async fn resolve_snapshot<D: PageDriver + ?Sized>(
        &mut self,
        driver: &D,
        instruction: &str,
        snapshot: &str,
    ) -> Resolution {
        let fingerprint = Fingerprint::new(instruction, snapshot);

        let (descriptor, source) = match self.store.get(&fingerprint) {
            Some(descriptor) => {
                log::debug!("cache hit for \"{}\": {}", instruction, descriptor);
                (descriptor, ResolutionSource::Cache)
            }
            None => {
                log::debug!("cache miss for \"{}\"", instruction);
                match self.infer_and_cache(&fingerprint, instruction, snapshot).await {
                    Ok(descriptor) => (descriptor, ResolutionSource::Inference),
                    Err(failure) => {
                        return Resolution::Failed {
                            kind: failure.kind,
                            reason: failure.reason,
                        }
                    }
                }
            }
        };

        if self.validate(driver, &descriptor).await {
            return Resolution::Resolved { descriptor, source };
        }

        log::warn!(
            "selector {:?} not found within {:?} for \"{}\", re-resolving",
            descriptor.selector,
            self.validation_timeout,
            instruction
        );
        self.invalidate(&fingerprint);

        let retried = match self.infer_and_cache(&fingerprint, instruction, snapshot).await {
            Ok(descriptor) => descriptor,
            Err(failure) => {
                return Resolution::Failed {
                    kind: failure.kind,
                    reason: failure.reason,
                }
            }
        };

        if self.validate(driver, &retried).await {
            log::info!("re-resolved \"{}\": {}", instruction, retried);
            return Resolution::Resolved {
                descriptor: retried,
                source: ResolutionSource::Retry,
            };
        }

        // the retry result was never seen live
        self.invalidate(&fingerprint);

        Resolution::Failed {
            kind: FailureKind::StaleSelector,
            reason: format!(
                "selector {:?} not found after re-resolving \"{}\"",
                retried.selector, instruction
            ),
        }
    }

    async fn infer_and_cache(
        &mut self,
        fingerprint: &Fingerprint,
        instruction: &str,
        snapshot: &str,
    ) -> InferenceResult {
        let reduced = self.reducer.reduce(snapshot);
        let descriptor = self.inference.infer(instruction, &reduced).await?;

        if descriptor.is_cacheable() {
            if let Err(e) = self.store.put(fingerprint, descriptor.clone()) {
                log::warn!("could not persist locator for \"{}\": {}", instruction, e);
            }
        } else {
            log::debug!("not caching {} for \"{}\"", descriptor, instruction);
        }

        Ok(descriptor)
    }

    async fn validate<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        descriptor: &LocatorDescriptor,
    ) -> bool {
        match driver
            .wait_for_selector(&descriptor.selector, self.validation_timeout)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                log::debug!("validation of {:?} failed: {}", descriptor.selector, e);
                false
            }
        }
    }

    fn invalidate(&mut self, fingerprint: &Fingerprint) {
        if let Err(e) = self.store.delete(fingerprint) {
            log::warn!("could not persist cache invalidation: {}", e);
        }
    }
}
