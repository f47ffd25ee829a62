//! Retries with exponential backoff.
//!
//! [`RetryingClient`] wraps any [`SecureSbomApi`] implementation and retries
//! operations that fail with a temporary error (5xx, 429, connection-level
//! failures). Permanent errors are returned immediately. Waits between
//! attempts grow geometrically up to a cap and are interrupted by the
//! caller's [`Context`].

use crate::api::SecureSbomApi;
use crate::context::Context;
use crate::error::{Result, SecureSbomError};
use crate::types::{GeneratedKey, KeyList, SignResult, VerifyResult};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff policy for [`RetryingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first. 0 or 1 disables retries.
    pub max_attempts: u32,
    /// Wait after the first failed attempt.
    pub initial_wait: Duration,
    /// Upper bound on any single wait.
    pub max_wait: Duration,
    /// Growth factor between consecutive waits.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A policy that performs exactly one attempt.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Default backoff with a given number of attempts.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Whether more than one attempt is allowed.
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    /// Wait after failed attempt number `attempt` (1-based):
    /// `min(initial_wait * multiplier^(attempt-1), max_wait)`.
    pub fn wait_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.multiplier.max(1.0).powi(exponent);
        let secs = self.initial_wait.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_wait.as_secs_f64() {
            return self.max_wait;
        }
        Duration::from_secs_f64(secs).min(self.max_wait)
    }
}

/// Decorator adding retries to any [`SecureSbomApi`] implementation.
///
/// The decorator keeps the wrapped client's interface. With
/// `max_attempts <= 1` it forwards every call untouched.
///
/// # Example
///
/// ```rust,no_run
/// use securesbom::{Config, Context, RetryConfig, RetryingClient, SecureSbomApi};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let base = Config::builder().from_env().build_client()?;
///     let client = RetryingClient::new(base, RetryConfig::default());
///
///     let keys = client.list_keys(&Context::background()).await?;
///     println!("{} keys", keys.keys.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RetryingClient<C> {
    inner: C,
    config: RetryConfig,
}

/// Wrap `inner` in a [`RetryingClient`].
pub fn with_retrying_client<C: SecureSbomApi>(inner: C, config: RetryConfig) -> RetryingClient<C> {
    RetryingClient::new(inner, config)
}

impl<C: SecureSbomApi> RetryingClient<C> {
    /// Wrap `inner` with the given policy.
    pub fn new(inner: C, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The retry policy.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Consume the decorator and return the wrapped client.
    pub fn into_inner(self) -> C {
        self.inner
    }

    async fn execute<T, F, Fut>(&self, ctx: &Context, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.config.is_enabled() {
            return call().await;
        }

        let max_attempts = self.config.max_attempts;
        let mut attempt = 1;
        loop {
            if let Some(err) = ctx.err() {
                return Err(err);
            }

            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_temporary() {
                debug!(operation, attempt, error = %err, "permanent failure, not retrying");
                return Err(err);
            }

            if attempt >= max_attempts {
                warn!(operation, attempts = attempt, error = %err, "giving up");
                return Err(SecureSbomError::RetriesExhausted {
                    attempts: attempt,
                    source: Box::new(err),
                });
            }

            let wait = self.config.wait_for(attempt);
            warn!(
                operation,
                attempt,
                max_attempts,
                delay_ms = wait.as_millis() as u64,
                error = %err,
                "temporary failure, retrying"
            );
            ctx.sleep(wait).await?;
            attempt += 1;
        }
    }
}

#[async_trait]
impl<C: SecureSbomApi> SecureSbomApi for RetryingClient<C> {
    async fn health_check(&self, ctx: &Context) -> Result<()> {
        self.execute(ctx, "health_check", || self.inner.health_check(ctx))
            .await
    }

    async fn list_keys(&self, ctx: &Context) -> Result<KeyList> {
        self.execute(ctx, "list_keys", || self.inner.list_keys(ctx))
            .await
    }

    async fn generate_key(&self, ctx: &Context) -> Result<GeneratedKey> {
        self.execute(ctx, "generate_key", || self.inner.generate_key(ctx))
            .await
    }

    async fn get_public_key(&self, ctx: &Context, key_id: &str) -> Result<String> {
        self.execute(ctx, "get_public_key", || {
            self.inner.get_public_key(ctx, key_id)
        })
        .await
    }

    async fn sign_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<SignResult> {
        self.execute(ctx, "sign_sbom", || self.inner.sign_sbom(ctx, key_id, sbom))
            .await
    }

    async fn verify_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult> {
        self.execute(ctx, "verify_sbom", || {
            self.inner.verify_sbom(ctx, key_id, sbom)
        })
        .await
    }

    async fn verify_spdx_sbom(
        &self,
        ctx: &Context,
        key_id: &str,
        signature: &str,
        sbom: &serde_json::Value,
    ) -> Result<VerifyResult> {
        self.execute(ctx, "verify_spdx_sbom", || {
            self.inner.verify_spdx_sbom(ctx, key_id, signature, sbom)
        })
        .await
    }
}
