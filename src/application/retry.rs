//! Bounded retry around a fallible remote call.
//!
//! The backoff is linear: attempt `n` (1-based) waits `base_delay * n` before
//! running again. Waiting goes through a [`Sleeper`] so tests can observe the
//! delays without real time passing.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::ports::{RepositoryError, RepositoryResult};

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested delays and returns immediately.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(test)]
impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(duration);
        }
    }
}

type Hook<'a> = Box<dyn FnMut() + Send + 'a>;

/// Callbacks and retry budget for one [`Retrier::call_service`] invocation.
pub struct ServiceCall<'a, T> {
    on_start: Hook<'a>,
    on_success: Box<dyn FnOnce(T) + Send + 'a>,
    on_error: Box<dyn FnOnce(String, bool) + Send + 'a>,
    on_completed: Box<dyn FnOnce() + Send + 'a>,
    retry_count: u32,
}

impl<'a, T> ServiceCall<'a, T> {
    pub fn new(on_success: impl FnOnce(T) + Send + 'a) -> Self {
        Self {
            on_start: Box::new(|| {}),
            on_success: Box::new(on_success),
            on_error: Box::new(|_, _| {}),
            on_completed: Box::new(|| {}),
            retry_count: 0,
        }
    }

    /// Runs before every attempt, retries included.
    pub fn on_start(mut self, hook: impl FnMut() + Send + 'a) -> Self {
        self.on_start = Box::new(hook);
        self
    }

    /// Receives the final error message and whether a retry may be offered.
    pub fn on_error(mut self, hook: impl FnOnce(String, bool) + Send + 'a) -> Self {
        self.on_error = Box::new(hook);
        self
    }

    pub fn on_completed(mut self, hook: impl FnOnce() + Send + 'a) -> Self {
        self.on_completed = Box::new(hook);
        self
    }

    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

#[derive(Clone, Copy)]
pub struct Retrier<'s> {
    sleeper: &'s dyn Sleeper,
    base_delay: Duration,
}

impl<'s> Retrier<'s> {
    pub fn new(sleeper: &'s dyn Sleeper, base_delay: Duration) -> Self {
        Self {
            sleeper,
            base_delay,
        }
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Run `operation` up to `retry_count + 1` times, reporting through hooks.
    pub async fn call_service<T, F, Fut>(&self, operation: F, call: ServiceCall<'_, T>)
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = RepositoryResult<T>> + Send,
        T: Send,
    {
        let ServiceCall {
            mut on_start,
            on_success,
            on_error,
            on_completed,
            retry_count,
        } = call;

        match self.attempt(operation, retry_count, &mut on_start).await {
            Ok(value) => on_success(value),
            Err(error) => on_error(error.message().to_string(), error.can_retry()),
        }
        on_completed();
    }

    /// Like [`Retrier::call_service`] but hands back the final outcome.
    pub async fn call_service_await<T, F, Fut>(
        &self,
        operation: F,
        retry_count: u32,
        mut on_start: impl FnMut() + Send,
    ) -> RepositoryResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = RepositoryResult<T>> + Send,
        T: Send,
    {
        self.attempt(operation, retry_count, &mut on_start).await
    }

    async fn attempt<T, F, Fut>(
        &self,
        mut operation: F,
        retry_count: u32,
        on_start: &mut (dyn FnMut() + Send + '_),
    ) -> RepositoryResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = RepositoryResult<T>> + Send,
        T: Send,
    {
        let mut attempts = 0;
        loop {
            on_start();
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if attempts < retry_count => {
                    attempts += 1;
                    let delay = self.backoff(attempts);
                    tracing::warn!(
                        attempt = attempts,
                        of = retry_count,
                        ?delay,
                        "Call failed, retrying: {}",
                        error
                    );
                    self.sleeper.sleep(delay).await;
                }
                Err(error) => return Err(last_error(error, attempts)),
            }
        }
    }
}

fn last_error(error: RepositoryError, attempts: u32) -> RepositoryError {
    tracing::debug!(attempts, "Giving up: {}", error);
    error
}
