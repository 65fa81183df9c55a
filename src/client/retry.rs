//! Rebuild-and-retry wrapper for remote service clients.
//!
//! A [`RetryingClient`] owns a client handle produced by a [`Connector`].
//! Every operation routed through [`RetryingClient::call`] is retried after a
//! transient failure, and the handle is rebuilt before each new attempt.
//! Failures that are not transient go straight back to the caller.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::RetryConfig;

/// Something that can (re)build a connection handle to a remote service.
///
/// `connect` is called once when the wrapper is constructed and again after
/// every transient failure, so it must be repeatable.
pub trait Connector {
    /// The handle operations run against. Cloned into each attempt.
    type Client: Clone;
    type Error;

    fn connect(&self) -> Result<Self::Client, Self::Error>;
}

/// Classifies a failure as retriable or terminal.
pub trait Transient {
    /// `true` for broken connections and other I/O-level failures.
    fn is_transient(&self) -> bool;

    /// Short name of the failure class, used in retry warnings.
    fn failure_class(&self) -> &'static str;
}

impl Transient for std::io::Error {
    fn is_transient(&self) -> bool {
        true
    }

    fn failure_class(&self) -> &'static str {
        match self.kind() {
            std::io::ErrorKind::BrokenPipe => "BrokenPipe",
            std::io::ErrorKind::ConnectionReset => "ConnectionReset",
            std::io::ErrorKind::ConnectionAborted => "ConnectionAborted",
            std::io::ErrorKind::TimedOut => "TimedOut",
            _ => "IoError",
        }
    }
}

/// Attempt cap and fixed delay, fixed when the wrapper is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first. Zero behaves like one.
    pub max_attempts: u32,
    /// Wait before rebuilding the client and retrying.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.delay())
    }
}

/// Client handle plus the capability to rebuild it.
pub struct RetryingClient<C: Connector> {
    connector: C,
    client: C::Client,
    policy: RetryPolicy,
}

impl<C: Connector> RetryingClient<C> {
    /// Builds the initial client. A failing first build is returned as-is,
    /// without any retry.
    pub fn new(connector: C, policy: RetryPolicy) -> Result<Self, C::Error> {
        let client = connector.connect()?;
        Ok(Self {
            connector,
            client,
            policy,
        })
    }

    /// The current handle. Replaced wholesale after each transient failure.
    pub fn client(&self) -> &C::Client {
        &self.client
    }

    /// Runs `op` against the current handle.
    ///
    /// On a transient failure, with attempts left: warn, sleep for the policy
    /// delay, rebuild the handle and run `op` again. The last transient
    /// failure is returned unchanged once attempts run out. Anything else is
    /// returned immediately. A failed rebuild ends the call with that error.
    pub async fn call<T, E, F, Fut>(&mut self, mut op: F) -> Result<T, E>
    where
        F: FnMut(C::Client) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + From<C::Error>,
    {
        let mut remaining = self.policy.max_attempts.max(1);

        loop {
            let err = match op(self.client.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(err);
            }

            remaining -= 1;
            if remaining == 0 {
                return Err(err);
            }

            warn!(
                error_class = err.failure_class(),
                delay_ms = self.policy.delay.as_millis() as u64,
                remaining_attempts = remaining,
                "Caught {}. Retrying in {:?}...",
                err.failure_class(),
                self.policy.delay
            );

            tokio::time::sleep(self.policy.delay).await;
            self.client = self.connector.connect()?;
        }
    }
}
