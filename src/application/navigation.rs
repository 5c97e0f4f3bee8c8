use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::retry::Sleeper;
use super::view_model::TaskScope;
use crate::domain::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Splash,
    Home,
    TaskList,
    AddTask,
    EditTask(TaskId),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Splash => write!(f, "splash"),
            Route::Home => write!(f, "home"),
            Route::TaskList => write!(f, "task_list"),
            Route::AddTask => write!(f, "add_task"),
            Route::EditTask(id) => write!(f, "edit_task/{id}"),
        }
    }
}

/// Back stack of routes. The root is never popped.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self { stack: vec![start] }
    }

    pub fn current(&self) -> Route {
        self.stack.last().copied().unwrap_or(Route::Home)
    }

    pub fn push(&mut self, route: Route) {
        tracing::debug!(%route, "Navigate");
        self.stack.push(route);
    }

    /// Swap the whole stack for `route`, as the splash does on completion.
    pub fn replace_all(&mut self, route: Route) {
        tracing::debug!(%route, "Navigate (clear stack)");
        self.stack.clear();
        self.stack.push(route);
    }

    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }
}

/// Waits out the splash delay, then publishes [`Route::Home`].
pub struct SplashViewModel {
    sleeper: Arc<dyn Sleeper>,
    delay: Duration,
    next: watch::Sender<Option<Route>>,
    scope: TaskScope,
}

impl SplashViewModel {
    pub fn new(sleeper: Arc<dyn Sleeper>, delay: Duration) -> Self {
        let (next, _) = watch::channel(None);
        Self {
            sleeper,
            delay,
            next,
            scope: TaskScope::default(),
        }
    }

    pub fn start(self: &Arc<Self>) {
        let vm = Arc::clone(self);
        self.scope.launch(async move {
            let route = vm.next_route().await;
            vm.next.send_replace(Some(route));
        });
    }

    pub async fn next_route(&self) -> Route {
        self.sleeper.sleep(self.delay).await;
        Route::Home
    }

    /// `Some` once the splash is done.
    pub fn destination(&self) -> Option<Route> {
        *self.next.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Route>> {
        self.next.subscribe()
    }

    pub fn close(&self) {
        self.scope.cancel_all();
    }
}
