use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use super::debounce::{Debounced, Debouncer};
use super::retry::{ServiceCall, Sleeper};
use super::use_cases::TaskUseCases;
use super::view_model::ViewModelCore;
use crate::domain::{parse_date, sort_by_due_date, Task, TaskId};
use crate::ports::AppConfig;

pub const INVALID_DATE: &str = "Invalid date format";
pub const TASK_DELETED: &str = "Task deleted";
pub const ALL_TASKS_DELETED: &str = "All tasks deleted";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskListUiState {
    pub is_loading: bool,
    pub tasks: Vec<Task>,
    pub search_query: String,
    pub filter_date: String,
    pub error: Option<String>,
}

/// User actions on the list screen. A failed action is remembered so the
/// error dialog's retry can re-issue it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskListAction {
    Load,
    SearchByTitle(String),
    SearchByDueDate(String),
    Delete(TaskId),
    DeleteAll,
}

pub struct TaskListViewModel {
    use_cases: TaskUseCases,
    core: ViewModelCore,
    state: watch::Sender<TaskListUiState>,
    debouncer: Debouncer,
    retry_count: u32,
    last_failed: Mutex<Option<TaskListAction>>,
}

impl TaskListViewModel {
    pub fn new(use_cases: TaskUseCases, sleeper: Arc<dyn Sleeper>, config: &AppConfig) -> Self {
        let (state, _) = watch::channel(TaskListUiState::default());
        Self {
            use_cases,
            core: ViewModelCore::new(sleeper),
            state,
            debouncer: Debouncer::new(
                Duration::from_millis(config.search_debounce_ms),
                config.min_search_chars,
            ),
            retry_count: config.retry_count,
            last_failed: Mutex::new(None),
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.core = self.core.with_base_delay(base_delay);
        self
    }

    pub fn state(&self) -> TaskListUiState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskListUiState> {
        self.state.subscribe()
    }

    pub fn core(&self) -> &ViewModelCore {
        &self.core
    }

    /// Run `action` in the background on this screen's task scope.
    pub fn dispatch(self: &Arc<Self>, action: TaskListAction) {
        let vm = Arc::clone(self);
        self.core.scope().launch(async move { vm.run(action).await });
    }

    pub async fn run(&self, action: TaskListAction) {
        tracing::debug!(?action, "Task list action");
        match action {
            TaskListAction::Load => self.load_tasks().await,
            TaskListAction::SearchByTitle(title) => self.search_tasks_by_title(&title).await,
            TaskListAction::SearchByDueDate(date) => self.search_tasks_by_due_date(&date).await,
            TaskListAction::Delete(id) => self.delete_task(id).await,
            TaskListAction::DeleteAll => self.delete_all_tasks().await,
        }
    }

    pub async fn load_tasks(&self) {
        let get_all = &self.use_cases.get_all;
        self.core
            .call_service(
                || get_all.execute(),
                ServiceCall::new(|tasks| self.show_tasks(tasks))
                    .on_start(|| self.start_loading())
                    .on_error(|message, can_retry| {
                        self.fail(TaskListAction::Load, message, can_retry)
                    })
                    .on_completed(|| self.stop_loading())
                    .retry_count(self.retry_count),
            )
            .await;
    }

    pub async fn search_tasks_by_title(&self, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return self.load_tasks().await;
        }

        let search = &self.use_cases.search_by_title;
        self.core
            .call_service(
                || search.execute(title),
                ServiceCall::new(|tasks| self.show_tasks(tasks))
                    .on_start(|| self.start_loading())
                    .on_error(|message, can_retry| {
                        self.fail(TaskListAction::SearchByTitle(title.to_string()), message, can_retry)
                    })
                    .on_completed(|| self.stop_loading())
                    .retry_count(self.retry_count),
            )
            .await;
    }

    pub async fn search_tasks_by_due_date(&self, date_text: &str) {
        let date_text = date_text.trim();
        self.state
            .send_modify(|s| s.filter_date = date_text.to_string());
        if date_text.is_empty() {
            return self.load_tasks().await;
        }

        let due_date = match parse_date(date_text) {
            Ok(date) => date,
            Err(_) => {
                self.state.send_modify(|s| s.error = Some(INVALID_DATE.to_string()));
                self.core.show_warning_message(INVALID_DATE);
                return;
            }
        };

        let search = &self.use_cases.search_by_due_date;
        self.core
            .call_service(
                || search.execute(due_date),
                ServiceCall::new(|tasks| self.show_tasks(tasks))
                    .on_start(|| self.start_loading())
                    .on_error(|message, can_retry| {
                        self.fail(
                            TaskListAction::SearchByDueDate(date_text.to_string()),
                            message,
                            can_retry,
                        )
                    })
                    .on_completed(|| self.stop_loading())
                    .retry_count(self.retry_count),
            )
            .await;
    }

    /// Record the query and schedule a title search once typing pauses.
    pub fn on_search_query_changed(self: &Arc<Self>, query: &str) {
        self.state.send_modify(|s| s.search_query = query.to_string());

        // Only the timer is debounced; the search itself runs in the scope.
        let vm = Arc::clone(self);
        let decision = self.debouncer.submit(query, move |title| {
            vm.dispatch(TaskListAction::SearchByTitle(title));
            std::future::ready(())
        });
        if decision == Debounced::Cleared {
            self.dispatch(TaskListAction::Load);
        }
    }

    pub fn clear_filter(self: &Arc<Self>) {
        self.debouncer.cancel();
        self.state.send_modify(|s| {
            s.search_query.clear();
            s.filter_date.clear();
            s.error = None;
        });
        self.dispatch(TaskListAction::Load);
    }

    pub async fn delete_task(&self, id: TaskId) {
        let delete = &self.use_cases.delete;
        let mut deleted = false;
        self.core
            .call_service(
                || delete.execute(id),
                ServiceCall::new(|()| deleted = true)
                    .on_start(|| self.start_loading())
                    .on_error(|message, can_retry| {
                        self.fail(TaskListAction::Delete(id), message, can_retry)
                    })
                    .on_completed(|| self.stop_loading())
                    .retry_count(self.retry_count),
            )
            .await;

        if deleted {
            tracing::info!(%id, "Task deleted");
            self.core.show_snackbar(TASK_DELETED);
            self.load_tasks().await;
        }
    }

    pub async fn delete_all_tasks(&self) {
        let delete_all = &self.use_cases.delete_all;
        self.core
            .call_service(
                || delete_all.execute(),
                ServiceCall::new(|()| {
                    self.state.send_modify(|s| {
                        s.tasks.clear();
                        s.error = None;
                    });
                    self.core.show_snackbar(ALL_TASKS_DELETED);
                })
                .on_start(|| self.start_loading())
                .on_error(|message, can_retry| {
                    self.fail(TaskListAction::DeleteAll, message, can_retry)
                })
                .on_completed(|| self.stop_loading())
                .retry_count(self.retry_count),
            )
            .await;
    }

    /// Re-issue the most recent failed action. Returns false if none is pending.
    pub fn retry_last(self: &Arc<Self>) -> bool {
        let action = self.last_failed.lock().ok().and_then(|mut last| last.take());
        match action {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Abort everything this screen has in flight.
    pub fn close(&self) {
        self.debouncer.cancel();
        self.core.scope().cancel_all();
    }

    fn show_tasks(&self, mut tasks: Vec<Task>) {
        sort_by_due_date(&mut tasks);
        self.state.send_modify(|s| {
            s.tasks = tasks;
            s.error = None;
        });
    }

    fn start_loading(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    fn stop_loading(&self) {
        self.state.send_modify(|s| s.is_loading = false);
    }

    fn fail(&self, action: TaskListAction, message: String, can_retry: bool) {
        tracing::warn!(?action, "Task list action failed: {}", message);
        if let Ok(mut last) = self.last_failed.lock() {
            *last = Some(action);
        }
        self.state.send_modify(|s| s.error = Some(message.clone()));
        self.core.show_error_dialog(message, can_retry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::retry::RecordingSleeper;
    use crate::application::ui_event::UiEvent;
    use crate::domain::TaskDraft;
    use crate::ports::{MockTaskRepository, RepositoryError, RepositoryResult, TaskRepository};
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    fn task(id: i64, due: &str) -> Task {
        Task {
            id: Some(TaskId(id)),
            title: format!("task {id}"),
            description: None,
            due_date: parse_date(due).unwrap(),
            completed: false,
        }
    }

    fn view_model(repo: MockTaskRepository) -> Arc<TaskListViewModel> {
        let config = AppConfig {
            retry_count: 0,
            ..AppConfig::default()
        };
        Arc::new(TaskListViewModel::new(
            TaskUseCases::new(Arc::new(repo)),
            Arc::new(RecordingSleeper::default()),
            &config,
        ))
    }

    #[tokio::test]
    async fn load_sorts_by_due_date() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_all_tasks()
            .times(1)
            .returning(|| Ok(vec![task(1, "2030-03-01"), task(2, "2030-01-01")]));

        let vm = view_model(repo);
        vm.run(TaskListAction::Load).await;

        let state = vm.state();
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
        let ids: Vec<_> = state.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![Some(TaskId(2)), Some(TaskId(1))]);
    }

    #[tokio::test]
    async fn load_failure_sets_error_and_dialog() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_all_tasks()
            .times(1)
            .returning(|| Err(RepositoryError::from_status(500)));

        let vm = view_model(repo);
        vm.load_tasks().await;

        assert_eq!(vm.state().error.as_deref(), Some("Server error"));
        assert_eq!(
            vm.core().clear_ui_event(),
            Some(UiEvent::error_dialog("Server error", true))
        );
    }

    #[tokio::test]
    async fn retry_last_reissues_failed_action() {
        let mut repo = MockTaskRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_delete_all_tasks()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(RepositoryError::no_internet()));
        repo.expect_delete_all_tasks()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        let vm = view_model(repo);
        vm.delete_all_tasks().await;
        assert!(vm.retry_last());
        assert!(!vm.retry_last());

        let mut rx = vm.subscribe();
        rx.wait_for(|s| s.error.is_none() && !s.is_loading)
            .await
            .unwrap();
        tokio::task::yield_now().await;
        assert_eq!(vm.core().clear_ui_event(), Some(UiEvent::snackbar(ALL_TASKS_DELETED)));
    }

    #[tokio::test]
    async fn delete_reloads_and_posts_snackbar() {
        let mut repo = MockTaskRepository::new();
        repo.expect_delete_task()
            .with(eq(TaskId(2)))
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_get_all_tasks()
            .times(1)
            .returning(|| Ok(vec![task(1, "2030-01-01")]));

        let vm = view_model(repo);
        vm.run(TaskListAction::Delete(TaskId(2))).await;

        assert_eq!(vm.state().tasks.len(), 1);
        assert_eq!(vm.core().clear_ui_event(), Some(UiEvent::snackbar(TASK_DELETED)));
    }

    #[tokio::test]
    async fn delete_failure_keeps_list() {
        let mut repo = MockTaskRepository::new();
        repo.expect_delete_task()
            .times(1)
            .returning(|_| Err(RepositoryError::from_status(404)));
        repo.expect_get_all_tasks().never();

        let vm = view_model(repo);
        vm.delete_task(TaskId(5)).await;
        assert_eq!(vm.state().error.as_deref(), Some("Not found"));
    }

    #[tokio::test]
    async fn bad_due_date_never_reaches_repository() {
        let mut repo = MockTaskRepository::new();
        repo.expect_search_tasks_by_due_date().never();

        let vm = view_model(repo);
        vm.search_tasks_by_due_date("15/01/2030").await;

        let state = vm.state();
        assert_eq!(state.error.as_deref(), Some(INVALID_DATE));
        assert_eq!(state.filter_date, "15/01/2030");
    }

    #[tokio::test]
    async fn due_date_search_passes_parsed_date() {
        let mut repo = MockTaskRepository::new();
        repo.expect_search_tasks_by_due_date()
            .with(eq(parse_date("2030-01-15").unwrap()))
            .times(1)
            .returning(|_| Ok(vec![task(3, "2030-01-15")]));

        let vm = view_model(repo);
        vm.run(TaskListAction::SearchByDueDate("2030-01-15".into())).await;
        assert_eq!(vm.state().tasks.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_is_debounced() {
        let mut repo = MockTaskRepository::new();
        repo.expect_search_tasks_by_title()
            .withf(|title| title == "milk")
            .times(1)
            .returning(|_| Ok(vec![task(1, "2030-01-01")]));

        let vm = view_model(repo);
        vm.on_search_query_changed("mi");
        vm.on_search_query_changed("mil");
        vm.on_search_query_changed("milk");
        assert_eq!(vm.state().search_query, "milk");

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(vm.state().tasks.len(), 1);
    }

    struct SlowSearch {
        latency: Duration,
    }

    #[async_trait::async_trait]
    impl TaskRepository for SlowSearch {
        async fn get_all_tasks(&self) -> RepositoryResult<Vec<Task>> {
            Ok(Vec::new())
        }
        async fn create_task(&self, _: &TaskDraft) -> RepositoryResult<Task> {
            Err(RepositoryError::Unknown("unused".to_string()))
        }
        async fn update_task(&self, _: TaskId, _: &TaskDraft) -> RepositoryResult<Task> {
            Err(RepositoryError::Unknown("unused".to_string()))
        }
        async fn delete_task(&self, _: TaskId) -> RepositoryResult<()> {
            Ok(())
        }
        async fn delete_all_tasks(&self) -> RepositoryResult<()> {
            Ok(())
        }
        async fn search_tasks_by_title(&self, _: &str) -> RepositoryResult<Vec<Task>> {
            tokio::time::sleep(self.latency).await;
            Ok(vec![task(1, "2030-01-01")])
        }
        async fn search_tasks_by_due_date(&self, _: NaiveDate) -> RepositoryResult<Vec<Task>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shortening_query_mid_search_does_not_strand_loading() {
        let vm = Arc::new(TaskListViewModel::new(
            TaskUseCases::new(Arc::new(SlowSearch {
                latency: Duration::from_secs(5),
            })),
            Arc::new(RecordingSleeper::default()),
            &AppConfig::default(),
        ));

        vm.on_search_query_changed("abc");
        tokio::time::sleep(Duration::from_millis(450)).await;
        assert!(vm.state().is_loading);

        vm.on_search_query_changed("ab");
        tokio::time::sleep(Duration::from_secs(60)).await;

        let state = vm.state();
        assert!(!state.is_loading);
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.search_query, "ab");
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_dispatches_nothing() {
        let mut repo = MockTaskRepository::new();
        repo.expect_search_tasks_by_title().never();
        repo.expect_get_all_tasks().never();

        let vm = view_model(repo);
        vm.on_search_query_changed("ab");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(vm.state().tasks.is_empty());
    }

    #[tokio::test]
    async fn empty_query_loads_everything() {
        let mut repo = MockTaskRepository::new();
        repo.expect_search_tasks_by_title().never();
        repo.expect_get_all_tasks()
            .times(1)
            .returning(|| Ok(vec![task(1, "2030-01-01"), task(2, "2030-01-02")]));

        let vm = view_model(repo);
        vm.on_search_query_changed("");

        let mut rx = vm.subscribe();
        rx.wait_for(|s| s.tasks.len() == 2).await.unwrap();
    }
}
