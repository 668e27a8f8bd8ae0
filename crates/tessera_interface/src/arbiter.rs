//! Timeout and retry discipline for arbitration calls.

use crate::ArbiterDriver;
use std::time::Duration;
use tessera_core::{CompletionRequest, CompletionResponse};
use tessera_error::{ProviderError, ProviderErrorKind};
use tracing::warn;

/// Wraps an [`ArbiterDriver`] with an explicit deadline and retry policy.
///
/// Every arbitration call in the workspace goes through this wrapper; the
/// serialized merge pass must never block indefinitely on a provider, so a
/// timeout is treated as a provider failure and the caller degrades to its
/// heuristic path.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
/// use tessera_interface::Arbiter;
///
/// let arbiter = Arbiter::new(driver)
///     .with_timeout(Duration::from_secs(10))
///     .with_max_retries(2);
/// let answer = arbiter.ask(request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Arbiter<D: ArbiterDriver> {
    driver: D,
    timeout: Duration,
    max_retries: usize,
    initial_backoff_ms: u64,
}

impl<D: ArbiterDriver> Arbiter<D> {
    /// Create a new arbiter with default timeout (10s) and retry (2) policy.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            timeout: Duration::from_secs(10),
            max_retries: 2,
            initial_backoff_ms: 250,
        }
    }

    /// Builder method to set the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to set the retry count for transient failures.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Builder method to set the initial backoff between retries.
    pub fn with_initial_backoff_ms(mut self, initial_backoff_ms: u64) -> Self {
        self.initial_backoff_ms = initial_backoff_ms;
        self
    }

    /// Provider name of the wrapped driver.
    pub fn provider_name(&self) -> &'static str {
        self.driver.provider_name()
    }

    /// Send an arbitration query, retrying transient failures with backoff.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the deadline elapses on every attempt,
    /// the driver keeps failing, or the provider returns an empty response.
    /// Callers treat any error here as "no arbitration available" and fall
    /// back to heuristics.
    #[tracing::instrument(skip_all, fields(provider = self.driver.provider_name(), model = self.driver.model_name()))]
    pub async fn ask(&self, req: CompletionRequest) -> Result<String, ProviderError> {
        use tokio_retry2::{Retry, RetryError, strategy::ExponentialBackoff, strategy::jitter};

        let retry_strategy = ExponentialBackoff::from_millis(self.initial_backoff_ms)
            .factor(2)
            .max_delay(Duration::from_secs(30))
            .map(jitter)
            .take(self.max_retries);

        let timeout = self.timeout;
        let response = Retry::spawn(retry_strategy, || async {
            match self.attempt(&req, timeout).await {
                Ok(resp) => Ok(resp),
                Err(e) => {
                    if e.kind.is_retryable() {
                        warn!(error = %e, "Arbitration call failed, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    } else {
                        warn!(error = %e, "Permanent arbitration failure");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await?;

        Ok(response.content)
    }

    async fn attempt(
        &self,
        req: &CompletionRequest,
        deadline: Duration,
    ) -> Result<CompletionResponse, ProviderError> {
        let response = tokio::time::timeout(deadline, self.driver.complete(req))
            .await
            .map_err(|_| ProviderError::new(ProviderErrorKind::Timeout(deadline.as_millis() as u64)))?
            .map_err(|e| ProviderError::new(ProviderErrorKind::Failed(e.to_string())))?;

        if response.content.trim().is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::EmptyResponse));
        }
        Ok(response)
    }
}
