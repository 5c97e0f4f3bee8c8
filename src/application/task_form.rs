use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::retry::{ServiceCall, Sleeper};
use super::task_list::INVALID_DATE;
use super::use_cases::TaskUseCases;
use super::view_model::ViewModelCore;
use crate::domain::{format_date, parse_date, Task, TaskDraft, TaskForm, TaskId};
use crate::ports::AppConfig;

pub const TASK_NOT_FOUND: &str = "Task not found";
pub const SUCCESS_TITLE: &str = "Success";
pub const TASK_CREATED: &str = "Task created successfully.";
pub const TASK_UPDATED: &str = "Task updated successfully.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskFormUiState {
    pub is_loading: bool,
    pub is_success: bool,
    /// The task being edited, once loaded.
    pub task: Option<Task>,
    pub editing: Option<TaskId>,
    pub form: TaskForm,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Load(TaskId),
    Submit,
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Add/edit screen. The same view-model serves both; `editing` decides
/// whether a submit creates or updates.
pub struct TaskFormViewModel {
    use_cases: TaskUseCases,
    core: ViewModelCore,
    state: watch::Sender<TaskFormUiState>,
    retry_count: u32,
    today: fn() -> NaiveDate,
}

impl TaskFormViewModel {
    pub fn new(use_cases: TaskUseCases, sleeper: Arc<dyn Sleeper>, config: &AppConfig) -> Self {
        let (state, _) = watch::channel(TaskFormUiState::default());
        Self {
            use_cases,
            core: ViewModelCore::new(sleeper),
            state,
            retry_count: config.retry_count,
            today: local_today,
        }
    }

    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.core = self.core.with_base_delay(base_delay);
        self
    }

    pub fn state(&self) -> TaskFormUiState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskFormUiState> {
        self.state.subscribe()
    }

    pub fn core(&self) -> &ViewModelCore {
        &self.core
    }

    pub fn dispatch(self: &Arc<Self>, action: FormAction) {
        let vm = Arc::clone(self);
        self.core.scope().launch(async move { vm.run(action).await });
    }

    pub async fn run(&self, action: FormAction) {
        tracing::debug!(?action, "Task form action");
        match action {
            FormAction::Load(id) => self.load_task(id).await,
            FormAction::Submit => self.submit().await,
        }
    }

    pub fn validate_title(&self, title: &str) {
        let today = (self.today)();
        self.state.send_modify(|s| s.form = s.form.with_title(title, today));
    }

    pub fn validate_description(&self, description: &str) {
        let today = (self.today)();
        self.state
            .send_modify(|s| s.form = s.form.with_description(description, today));
    }

    pub fn validate_due_date(&self, due_date: &str) {
        let today = (self.today)();
        self.state
            .send_modify(|s| s.form = s.form.with_due_date(due_date, today));
    }

    /// Fetch the task list and prefill the form from the entry matching `id`.
    pub async fn load_task(&self, id: TaskId) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
            s.editing = Some(id);
        });

        let get_all = &self.use_cases.get_all;
        let result = self
            .core
            .call_service_await(|| get_all.execute(), self.retry_count, || {}, || {})
            .await;

        let today = (self.today)();
        self.state.send_modify(|s| {
            s.is_loading = false;
            let Some(tasks) = result else {
                s.error = Some("Failed to load task".to_string());
                return;
            };
            match tasks.into_iter().find(|t| t.id == Some(id)) {
                Some(task) => {
                    s.form = TaskForm::prefilled(
                        &task.title,
                        task.description.as_deref().unwrap_or_default(),
                        &format_date(task.due_date),
                        today,
                    );
                    s.task = Some(task);
                    s.error = None;
                }
                None => s.error = Some(TASK_NOT_FOUND.to_string()),
            }
        });
    }

    pub async fn create_task(&self, title: &str, description: &str, due_date: &str) {
        let Some(draft) = self.draft(title, description, due_date) else {
            return;
        };
        let create = &self.use_cases.create;
        self.core
            .call_service(
                || create.execute(&draft),
                ServiceCall::new(|task| self.succeed(task))
                    .on_start(|| self.start_loading())
                    .on_error(|message, can_retry| self.fail(message, can_retry))
                    .on_completed(|| self.stop_loading())
                    .retry_count(self.retry_count),
            )
            .await;
    }

    pub async fn update_task(&self, id: TaskId, title: &str, description: &str, due_date: &str) {
        let Some(draft) = self.draft(title, description, due_date) else {
            return;
        };
        let update = &self.use_cases.update;
        self.core
            .call_service(
                || update.execute(id, &draft),
                ServiceCall::new(|task| self.succeed(task))
                    .on_start(|| self.start_loading())
                    .on_error(|message, can_retry| self.fail(message, can_retry))
                    .on_completed(|| self.stop_loading())
                    .retry_count(self.retry_count),
            )
            .await;
    }

    /// Create or update from the current form, then announce the outcome.
    pub async fn submit(&self) {
        let snapshot = self.state();
        let form = &snapshot.form;
        if !form.is_form_valid {
            self.validate_title(&form.title);
            self.validate_description(&form.description);
            self.validate_due_date(&form.due_date);
            if !self.state().form.is_form_valid {
                return;
            }
        }

        let message = match snapshot.editing {
            Some(id) => {
                self.update_task(id, &form.title, &form.description, &form.due_date)
                    .await;
                TASK_UPDATED
            }
            None => {
                self.create_task(&form.title, &form.description, &form.due_date)
                    .await;
                TASK_CREATED
            }
        };

        if self.state().is_success {
            self.core.show_success_dialog(SUCCESS_TITLE, message, true);
        }
    }

    pub fn close(&self) {
        self.core.scope().cancel_all();
    }

    fn draft(&self, title: &str, description: &str, due_date: &str) -> Option<TaskDraft> {
        match parse_date(due_date) {
            Ok(date) => Some(TaskDraft::new(title, Some(description.to_string()), date)),
            Err(_) => {
                self.state.send_modify(|s| {
                    s.is_success = false;
                    s.error = Some(INVALID_DATE.to_string());
                });
                None
            }
        }
    }

    fn succeed(&self, task: Task) {
        tracing::info!(id = ?task.id, "Task saved");
        self.state.send_modify(|s| {
            s.is_success = true;
            s.task = Some(task);
            s.error = None;
        });
    }

    fn start_loading(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.is_success = false;
            s.error = None;
        });
    }

    fn stop_loading(&self) {
        self.state.send_modify(|s| s.is_loading = false);
    }

    fn fail(&self, message: String, can_retry: bool) {
        tracing::warn!("Saving task failed: {}", message);
        self.state.send_modify(|s| s.error = Some(message.clone()));
        self.core.show_error_dialog(message, can_retry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::retry::RecordingSleeper;
    use crate::application::ui_event::UiEvent;
    use crate::domain::validation::{DUE_DATE_IN_PAST, TITLE_REQUIRED};
    use crate::ports::{MockTaskRepository, RepositoryError};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 10).unwrap()
    }

    fn task(id: i64) -> Task {
        Task {
            id: Some(TaskId(id)),
            title: "Pay rent".to_string(),
            description: Some("before noon".to_string()),
            due_date: parse_date("2030-01-15").unwrap(),
            completed: false,
        }
    }

    fn view_model(repo: MockTaskRepository) -> TaskFormViewModel {
        let config = AppConfig {
            retry_count: 0,
            ..AppConfig::default()
        };
        TaskFormViewModel::new(
            TaskUseCases::new(Arc::new(repo)),
            Arc::new(RecordingSleeper::default()),
            &config,
        )
        .with_clock(today)
    }

    fn fill(vm: &TaskFormViewModel, title: &str, description: &str, due: &str) {
        vm.validate_title(title);
        vm.validate_description(description);
        vm.validate_due_date(due);
    }

    #[test]
    fn field_edits_recompute_validity() {
        let vm = view_model(MockTaskRepository::new());
        vm.validate_title("");
        assert_eq!(vm.state().form.title_error.as_deref(), Some(TITLE_REQUIRED));

        fill(&vm, "Pay rent", "", "2030-01-09");
        let form = vm.state().form;
        assert_eq!(form.due_date_error.as_deref(), Some(DUE_DATE_IN_PAST));
        assert!(!form.is_form_valid);

        vm.validate_due_date("2030-01-10");
        assert!(vm.state().form.is_form_valid);
    }

    #[tokio::test]
    async fn load_prefills_form() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_all_tasks()
            .times(1)
            .returning(|| Ok(vec![task(1), task(2)]));

        let vm = view_model(repo);
        vm.run(FormAction::Load(TaskId(2))).await;

        let state = vm.state();
        assert_eq!(state.editing, Some(TaskId(2)));
        assert_eq!(state.task, Some(task(2)));
        assert_eq!(state.form.title, "Pay rent");
        assert_eq!(state.form.description, "before noon");
        assert_eq!(state.form.due_date, "2030-01-15");
        assert!(state.form.is_form_valid);
        assert_eq!(state.form.title_error, None);
    }

    #[tokio::test]
    async fn load_reports_missing_task() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_all_tasks().returning(|| Ok(vec![task(1)]));

        let vm = view_model(repo);
        vm.load_task(TaskId(99)).await;
        assert_eq!(vm.state().error.as_deref(), Some(TASK_NOT_FOUND));
        assert!(!vm.state().is_loading);
    }

    #[tokio::test]
    async fn create_sends_absent_description_for_empty_text() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create_task()
            .withf(|draft| draft.description.is_none() && draft.title == "Pay rent")
            .times(1)
            .returning(|_| Ok(task(7)));

        let vm = view_model(repo);
        vm.create_task("Pay rent", "", "2030-01-15").await;

        let state = vm.state();
        assert!(state.is_success);
        assert_eq!(state.task.and_then(|t| t.id), Some(TaskId(7)));
    }

    #[tokio::test]
    async fn create_rejects_unparsable_date() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create_task().never();

        let vm = view_model(repo);
        vm.create_task("Pay rent", "", "tomorrow").await;
        assert_eq!(vm.state().error.as_deref(), Some(INVALID_DATE));
        assert!(!vm.state().is_success);
    }

    #[tokio::test]
    async fn submit_updates_when_editing() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_all_tasks().returning(|| Ok(vec![task(3)]));
        repo.expect_update_task()
            .withf(|id, draft| *id == TaskId(3) && draft.title == "Pay rent twice")
            .times(1)
            .returning(|_, _| Ok(task(3)));

        let vm = view_model(repo);
        vm.load_task(TaskId(3)).await;
        vm.validate_title("Pay rent twice");
        vm.run(FormAction::Submit).await;

        assert!(vm.state().is_success);
        assert_eq!(
            vm.core().clear_ui_event(),
            Some(UiEvent::success_dialog(SUCCESS_TITLE, TASK_UPDATED, true))
        );
    }

    #[tokio::test]
    async fn invalid_form_never_submits() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create_task().never();

        let vm = view_model(repo);
        fill(&vm, "", "", "2030-01-15");
        vm.submit().await;

        assert_eq!(vm.state().form.title_error.as_deref(), Some(TITLE_REQUIRED));
        assert_eq!(vm.core().clear_ui_event(), None);
    }

    #[tokio::test]
    async fn failed_create_posts_error_dialog() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create_task()
            .times(1)
            .returning(|_| Err(RepositoryError::from_status(401)));

        let vm = view_model(repo);
        fill(&vm, "Pay rent", "", "2030-01-15");
        vm.submit().await;

        let state = vm.state();
        assert!(!state.is_success);
        assert_eq!(state.error.as_deref(), Some("Unauthorized access"));
        assert_eq!(
            vm.core().clear_ui_event(),
            Some(UiEvent::error_dialog("Unauthorized access", false))
        );
    }
}
