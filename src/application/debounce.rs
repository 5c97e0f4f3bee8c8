use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debounced {
    /// Query is empty; the caller should show the unfiltered list.
    Cleared,
    /// Query is shorter than the minimum; nothing was dispatched.
    TooShort,
    /// Dispatch will run after the quiet period unless superseded.
    Scheduled,
}

/// Last-write-wins delay for text queries. Each submission cancels whatever
/// the previous one scheduled, so at most one dispatch is ever pending.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    min_chars: usize,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration, min_chars: usize) -> Self {
        Self {
            quiet_period,
            min_chars,
            pending: Mutex::new(None),
        }
    }

    pub fn submit<F, Fut>(&self, query: &str, dispatch: F) -> Debounced
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let query = query.trim();
        if query.is_empty() {
            return Debounced::Cleared;
        }
        if query.chars().count() < self.min_chars {
            return Debounced::TooShort;
        }

        let quiet_period = self.quiet_period;
        let query = query.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            dispatch(query).await;
        });

        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(handle);
        }
        Debounced::Scheduled
    }

    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
