use std::time::Duration;

use async_trait::async_trait;
use tokio::{sync::Mutex, time::Instant};

use crate::{
    llm::{LLMError, LLM},
    schemas::{Message, WithUsage},
};

/// Bounded exponential backoff for transient provider failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Delay after the `attempt`-th failure (1-based):
    /// `base_delay * multiplier^(attempt - 1)`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.max(0.0).min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    /// Like [`RetryPolicy::delay_for`], but a wait requested by the provider
    /// takes precedence. Both are capped at `max_delay`.
    pub fn delay_after(&self, attempt: u32, error: &LLMError) -> Duration {
        match error.retry_after() {
            Some(retry_after) => retry_after.min(self.max_delay),
            None => self.delay_for(attempt),
        }
    }
}

/// Wraps an [`LLM`] so transient failures are retried under a [`RetryPolicy`].
///
/// Fatal errors are returned as soon as they occur. When every attempt fails
/// transiently the last error is wrapped in [`LLMError::RetriesExhausted`].
pub struct RetryingLLM<L> {
    inner: L,
    policy: RetryPolicy,
    min_request_interval: Option<Duration>,
    last_request: Mutex<Option<Instant>>,
}

impl<L: LLM> RetryingLLM<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            policy: RetryPolicy::default(),
            min_request_interval: None,
            last_request: Mutex::new(None),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Spaces consecutive requests made through this wrapper by at least `interval`.
    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = Some(interval);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    async fn wait_for_turn(&self) {
        let Some(interval) = self.min_request_interval else {
            return;
        };

        let mut last_request = self.last_request.lock().await;
        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < interval {
                let wait = interval - elapsed;
                log::debug!("waiting {:.1}s before next model request", wait.as_secs_f64());
                tokio::time::sleep(wait).await;
            }
        }
        *last_request = Some(Instant::now());
    }
}

#[async_trait]
impl<L: LLM> LLM for RetryingLLM<L> {
    async fn generate(&self, messages: &[Message]) -> Result<WithUsage<String>, LLMError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            self.wait_for_turn().await;

            match self.inner.generate(messages).await {
                Ok(output) => return Ok(output),
                Err(error) if !error.is_transient() => return Err(error),
                Err(error) => {
                    if attempt < max_attempts {
                        let delay = self.policy.delay_after(attempt, &error);
                        log::warn!(
                            "model request failed ({error}), retry {attempt}/{} in {:.1}s",
                            max_attempts - 1,
                            delay.as_secs_f64()
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        log::warn!("model request failed ({error}), no retries left");
                    }
                    last_error = Some(error);
                }
            }
        }

        Err(LLMError::RetriesExhausted {
            attempts: max_attempts,
            last: Box::new(
                last_error.unwrap_or_else(|| LLMError::OtherError("no attempt was made".into())),
            ),
        })
    }
}
