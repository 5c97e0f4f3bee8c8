use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::AbortHandle;

use super::retry::{Retrier, ServiceCall, Sleeper, DEFAULT_BASE_DELAY};
use super::ui_event::{UiEvent, UiEventSlot};
use crate::ports::RepositoryResult;

/// Tasks launched on behalf of one screen. Dropping the scope aborts every
/// task still running, which is how a screen's work dies with the screen.
#[derive(Debug, Default)]
pub struct TaskScope {
    handles: Mutex<Vec<AbortHandle>>,
}

impl TaskScope {
    pub fn launch<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future).abort_handle();
        if let Ok(mut handles) = self.handles.lock() {
            handles.retain(|h| !h.is_finished());
            handles.push(handle);
        }
    }

    pub fn cancel_all(&self) {
        if let Ok(mut handles) = self.handles.lock() {
            for handle in handles.drain(..) {
                handle.abort();
            }
        }
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Shared plumbing for screen view-models: the one-shot event slot, retry
/// helpers and the task scope.
pub struct ViewModelCore {
    events: UiEventSlot,
    sleeper: Arc<dyn Sleeper>,
    base_delay: Duration,
    scope: TaskScope,
}

impl ViewModelCore {
    pub fn new(sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            events: UiEventSlot::new(),
            sleeper,
            base_delay: DEFAULT_BASE_DELAY,
            scope: TaskScope::default(),
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn events(&self) -> &UiEventSlot {
        &self.events
    }

    pub fn scope(&self) -> &TaskScope {
        &self.scope
    }

    fn retrier(&self) -> Retrier<'_> {
        Retrier::new(self.sleeper.as_ref(), self.base_delay)
    }

    pub async fn call_service<T, F, Fut>(&self, operation: F, call: ServiceCall<'_, T>)
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = RepositoryResult<T>> + Send,
        T: Send,
    {
        self.retrier().call_service(operation, call).await
    }

    /// Returns the value, or posts an error dialog and returns `None`.
    pub async fn call_service_await<T, F, Fut>(
        &self,
        operation: F,
        retry_count: u32,
        on_start: impl FnMut() + Send,
        on_completed: impl FnOnce() + Send,
    ) -> Option<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = RepositoryResult<T>> + Send,
        T: Send,
    {
        let result = self
            .retrier()
            .call_service_await(operation, retry_count, on_start)
            .await;
        on_completed();

        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.show_error_dialog(error.message(), error.can_retry());
                None
            }
        }
    }

    pub fn show_snackbar(&self, message: impl Into<String>) {
        self.events.post(UiEvent::snackbar(message));
    }

    pub fn show_error_message(&self, message: impl Into<String>, can_retry: bool) {
        self.events.post(UiEvent::error_message(message, can_retry));
    }

    pub fn show_warning_message(&self, message: impl Into<String>) {
        self.events.post(UiEvent::warning_message(message));
    }

    pub fn show_error_dialog(&self, message: impl Into<String>, can_retry: bool) {
        self.events.post(UiEvent::error_dialog(message, can_retry));
    }

    pub fn show_success_dialog(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        pop_back_stack: bool,
    ) {
        self.events
            .post(UiEvent::success_dialog(title, message, pop_back_stack));
    }

    /// Called by the UI once the pending event has been shown.
    pub fn clear_ui_event(&self) -> Option<UiEvent> {
        self.events.consume()
    }
}
