use color_eyre::Result;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use std::sync::Arc;
use std::time::Duration;

use super::{
    event::{AppEvent, EventHandler},
    widgets::{FormField, SearchBar, SearchMode, TaskFormView},
};
use crate::application::task_form::local_today;
use crate::application::{
    FormAction, Navigator, Route, Sleeper, SnackbarKind, SplashViewModel, TaskFormViewModel,
    TaskListAction, TaskListViewModel, TaskUseCases, UiEvent,
};
use crate::domain::{Task, TaskId};
use crate::ports::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFocus {
    Search,
    Tasks,
}

/// Which screen raised a dialog, so its retry goes back to the right place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    List,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Dialog {
    Error {
        message: String,
        can_retry: bool,
        action_label: String,
        origin: Origin,
    },
    Success {
        title: String,
        message: String,
        pop_back_stack: bool,
    },
    ConfirmDelete(TaskId, String),
    ConfirmDeleteAll,
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    style: Style,
}

struct FormScreen {
    vm: Arc<TaskFormViewModel>,
    focused: FormField,
    last_action: FormAction,
}

pub struct App {
    use_cases: TaskUseCases,
    config: AppConfig,
    sleeper: Arc<dyn Sleeper>,
    navigator: Navigator,

    // Screens
    splash: Option<Arc<SplashViewModel>>,
    list: Arc<TaskListViewModel>,
    form: Option<FormScreen>,

    // List screen UI
    search_bar: SearchBar,
    focus: ListFocus,
    table_state: TableState,

    // Overlays
    status: Option<StatusMessage>,
    dialog: Option<Dialog>,
    show_help: bool,
}

impl App {
    pub fn new(use_cases: TaskUseCases, config: AppConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        let list = Arc::new(TaskListViewModel::new(
            use_cases.clone(),
            sleeper.clone(),
            &config,
        ));
        let splash = Arc::new(SplashViewModel::new(
            sleeper.clone(),
            Duration::from_millis(config.splash_delay_ms),
        ));

        Self {
            use_cases,
            config,
            sleeper,
            navigator: Navigator::new(Route::Splash),
            splash: Some(splash),
            list,
            form: None,
            search_bar: SearchBar::new(),
            focus: ListFocus::Tasks,
            table_state: TableState::default(),
            status: None,
            dialog: None,
            show_help: false,
        }
    }

    pub fn initialize(&mut self) {
        if let Some(splash) = &self.splash {
            splash.start();
        }
    }

    pub fn route(&self) -> Route {
        self.navigator.current()
    }

    /// Abort everything the screens still have in flight.
    pub fn shutdown(&mut self) {
        if let Some(form) = self.form.take() {
            form.vm.close();
        }
        if let Some(splash) = self.splash.take() {
            splash.close();
        }
        self.list.close();
    }

    /// Pull in work finished by background tasks since the last frame.
    pub fn on_tick(&mut self) {
        if let Some(route) = self.splash.as_ref().and_then(|s| s.destination()) {
            tracing::info!(%route, "Splash finished");
            self.splash = None;
            self.navigator.replace_all(route);
            self.list.dispatch(TaskListAction::Load);
        }

        if let Some(event) = self.list.core().clear_ui_event() {
            self.show_event(event, Origin::List);
        }
        let form_event = self
            .form
            .as_ref()
            .and_then(|form| form.vm.core().clear_ui_event());
        if let Some(event) = form_event {
            self.show_event(event, Origin::Form);
        }

        let len = self.list.state().tasks.len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            None => self.table_state.select(Some(0)),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    fn show_event(&mut self, event: UiEvent, origin: Origin) {
        match event {
            UiEvent::ShowSnackbar { message, kind, .. } => {
                let style = match kind {
                    SnackbarKind::Default => Style::default().fg(Color::Green),
                    SnackbarKind::Error => Style::default().fg(Color::Red),
                    SnackbarKind::Warning => Style::default().fg(Color::Yellow),
                };
                self.status = Some(StatusMessage { text: message, style });
            }
            UiEvent::ShowErrorMessage { message, .. } => {
                self.status = Some(StatusMessage {
                    text: message,
                    style: Style::default().fg(Color::Red),
                });
            }
            UiEvent::ShowWarningMessage { message, .. } => {
                self.status = Some(StatusMessage {
                    text: message,
                    style: Style::default().fg(Color::Yellow),
                });
            }
            UiEvent::ShowErrorDialog {
                message,
                can_retry,
                action_label,
            } => {
                self.dialog = Some(Dialog::Error {
                    message,
                    can_retry,
                    action_label,
                    origin,
                });
            }
            UiEvent::ShowSuccessDialog {
                title,
                message,
                pop_back_stack,
            } => {
                self.dialog = Some(Dialog::Success {
                    title,
                    message,
                    pop_back_stack,
                });
            }
        }
    }

    /// Returns true when the app should exit.
    pub fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        match event {
            AppEvent::Quit => return Ok(true),
            AppEvent::Tick => return Ok(false),
            _ => {}
        }

        if self.dialog.is_some() {
            self.handle_dialog_key(event);
            return Ok(false);
        }

        if self.show_help {
            self.show_help = false;
            return Ok(false);
        }

        match self.navigator.current() {
            Route::Splash => Ok(matches!(event, AppEvent::Character('q') | AppEvent::Escape)),
            Route::Home | Route::TaskList => Ok(self.handle_list_key(event)),
            Route::AddTask | Route::EditTask(_) => {
                self.handle_form_key(event);
                Ok(false)
            }
        }
    }

    fn handle_dialog_key(&mut self, event: AppEvent) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };

        match dialog {
            Dialog::Error {
                can_retry, origin, ..
            } => match event {
                AppEvent::Enter | AppEvent::Character('r') if can_retry => self.retry(origin),
                AppEvent::Enter | AppEvent::Escape | AppEvent::Character('q') => {}
                _ => self.dialog = Some(dialog),
            },
            Dialog::Success { pop_back_stack, .. } => match event {
                AppEvent::Enter | AppEvent::Escape => {
                    if pop_back_stack {
                        self.close_form();
                        self.list.dispatch(TaskListAction::Load);
                    }
                }
                _ => self.dialog = Some(dialog),
            },
            Dialog::ConfirmDelete(id, _) => match event {
                AppEvent::Character('y') | AppEvent::Enter => {
                    self.list.dispatch(TaskListAction::Delete(id))
                }
                AppEvent::Character('n') | AppEvent::Escape => {}
                _ => self.dialog = Some(dialog),
            },
            Dialog::ConfirmDeleteAll => match event {
                AppEvent::Character('y') => self.list.dispatch(TaskListAction::DeleteAll),
                AppEvent::Character('n') | AppEvent::Escape => {}
                _ => self.dialog = Some(dialog),
            },
        }
    }

    fn retry(&mut self, origin: Origin) {
        match origin {
            Origin::List => {
                self.list.retry_last();
            }
            Origin::Form => {
                if let Some(form) = &self.form {
                    form.vm.dispatch(form.last_action);
                }
            }
        }
    }

    fn handle_list_key(&mut self, event: AppEvent) -> bool {
        if self.focus == ListFocus::Search {
            self.handle_search_key(event);
            return false;
        }

        match event {
            AppEvent::Character('q') => return true,
            AppEvent::Character('j') | AppEvent::Down => self.next_task(),
            AppEvent::Character('k') | AppEvent::Up => self.previous_task(),
            AppEvent::Character('a') => self.open_form(None),
            AppEvent::Character('e') | AppEvent::Enter => {
                if let Some(id) = self.selected_task().and_then(|t| t.id) {
                    self.open_form(Some(id));
                }
            }
            AppEvent::Character('d') => {
                if let Some(task) = self.selected_task() {
                    if let Some(id) = task.id {
                        self.dialog = Some(Dialog::ConfirmDelete(id, task.title));
                    }
                }
            }
            AppEvent::Character('D') => {
                if !self.list.state().tasks.is_empty() {
                    self.dialog = Some(Dialog::ConfirmDeleteAll);
                }
            }
            AppEvent::Character('r') => self.list.dispatch(TaskListAction::Load),
            AppEvent::Character('/') => self.focus_search(SearchMode::Title),
            AppEvent::Character('f') => self.focus_search(SearchMode::DueDate),
            AppEvent::Character('c') => {
                self.search_bar.clear();
                self.list.clear_filter();
            }
            AppEvent::Character('?') => self.show_help = true,
            AppEvent::Tab => self.focus_search(self.search_bar.mode()),
            AppEvent::Escape => self.status = None,
            _ => {}
        }
        false
    }

    fn handle_search_key(&mut self, event: AppEvent) {
        match event {
            AppEvent::Character(c) => {
                self.search_bar.insert_char(c);
                self.on_search_edit();
            }
            AppEvent::Backspace => {
                self.search_bar.delete_char();
                self.on_search_edit();
            }
            AppEvent::Enter => {
                if self.search_bar.mode() == SearchMode::DueDate {
                    let date = self.search_bar.query().to_string();
                    self.list.dispatch(TaskListAction::SearchByDueDate(date));
                }
                self.focus_tasks();
            }
            AppEvent::Tab | AppEvent::Down => self.focus_tasks(),
            AppEvent::Escape => {
                self.search_bar.clear();
                self.focus_tasks();
                self.list.clear_filter();
            }
            _ => {}
        }
    }

    fn on_search_edit(&self) {
        if self.search_bar.mode() == SearchMode::Title {
            self.list.on_search_query_changed(self.search_bar.query());
        }
    }

    fn focus_search(&mut self, mode: SearchMode) {
        self.search_bar.focus(mode);
        self.focus = ListFocus::Search;
    }

    fn focus_tasks(&mut self) {
        self.search_bar.blur();
        self.focus = ListFocus::Tasks;
    }

    fn handle_form_key(&mut self, event: AppEvent) {
        if event == AppEvent::Escape {
            self.close_form();
            return;
        }

        let Some(form) = self.form.as_mut() else {
            self.navigator.pop();
            return;
        };

        match event {
            AppEvent::Tab | AppEvent::Down => form.focused = form.focused.next(),
            AppEvent::BackTab | AppEvent::Up => form.focused = form.focused.previous(),
            AppEvent::Character(c) => {
                let mut value = form.focused.value(&form.vm.state().form).to_string();
                value.push(c);
                edit_field(&form.vm, form.focused, &value);
            }
            AppEvent::Backspace => {
                let mut value = form.focused.value(&form.vm.state().form).to_string();
                value.pop();
                edit_field(&form.vm, form.focused, &value);
            }
            AppEvent::Enter => {
                form.last_action = FormAction::Submit;
                form.vm.dispatch(FormAction::Submit);
            }
            _ => {}
        }
    }

    fn open_form(&mut self, editing: Option<TaskId>) {
        let vm = Arc::new(TaskFormViewModel::new(
            self.use_cases.clone(),
            self.sleeper.clone(),
            &self.config,
        ));

        let last_action = match editing {
            Some(id) => {
                self.navigator.push(Route::EditTask(id));
                vm.dispatch(FormAction::Load(id));
                FormAction::Load(id)
            }
            None => {
                self.navigator.push(Route::AddTask);
                FormAction::Submit
            }
        };

        self.status = None;
        self.form = Some(FormScreen {
            vm,
            focused: FormField::default(),
            last_action,
        });
    }

    fn close_form(&mut self) {
        if let Some(form) = self.form.take() {
            form.vm.close();
        }
        self.navigator.pop();
    }

    fn selected_task(&self) -> Option<Task> {
        let index = self.table_state.selected()?;
        self.list.state().tasks.get(index).cloned()
    }

    fn next_task(&mut self) {
        let len = self.list.state().tasks.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn previous_task(&mut self) {
        let len = self.list.state().tasks.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Screen
                Constraint::Length(1), // Status line
            ])
            .split(frame.area());

        match self.navigator.current() {
            Route::Splash => self.render_splash(frame, chunks[0]),
            Route::Home | Route::TaskList => self.render_task_list(frame, chunks[0]),
            Route::AddTask | Route::EditTask(_) => self.render_form(frame, chunks[0]),
        }
        self.render_status_bar(frame, chunks[1]);

        if self.show_help {
            self.render_help(frame);
        }
        if let Some(dialog) = &self.dialog {
            Self::render_dialog(frame, dialog);
        }
    }

    fn render_splash(&self, frame: &mut Frame, area: Rect) {
        let text = vec![
            Line::styled("taskpad", Style::default().fg(Color::Green).bold()),
            Line::from(""),
            Line::styled("Loading...", Style::default().fg(Color::DarkGray)),
        ];
        let popup = Self::centered_rect(40, 30, area);
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center),
            popup,
        );
    }

    fn render_task_list(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar
                Constraint::Min(0),    // Tasks
            ])
            .split(area);

        self.search_bar.render(frame, chunks[0]);

        let state = self.list.state();
        let mut title = format!("Tasks ({})", state.tasks.len());
        if !state.filter_date.is_empty() {
            title.push_str(&format!(" due {}", state.filter_date));
        } else if !state.search_query.is_empty() {
            title.push_str(&format!(" matching \"{}\"", state.search_query));
        }

        let border_style = if self.focus == ListFocus::Tasks {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        if state.is_loading && state.tasks.is_empty() {
            let paragraph = Paragraph::new("Loading tasks...")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, chunks[1]);
            return;
        }

        if state.tasks.is_empty() {
            let message = match &state.error {
                Some(error) => error.as_str(),
                None if state.search_query.is_empty() && state.filter_date.is_empty() => {
                    "No tasks yet. Press a to add one."
                }
                None => "No tasks match your search",
            };
            let color = if state.error.is_some() {
                Color::Red
            } else {
                Color::Gray
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .style(Style::default().fg(color));
            frame.render_widget(paragraph, chunks[1]);
            return;
        }

        let today = local_today();
        let rows: Vec<Row> = state
            .tasks
            .iter()
            .map(|task| {
                let due_style = if task.is_overdue_on(today) {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let description = task.description.clone().unwrap_or_default();

                Row::new(vec![
                    Cell::from(task.title.clone()),
                    Cell::from(description).style(Style::default().fg(Color::Gray)),
                    Cell::from(task.status_display()),
                    Cell::from(task.due_date_display(today)).style(due_style),
                ])
            })
            .collect();

        let header = Row::new(vec!["Title", "Description", "Status", "Due"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(35),
                Constraint::Percentage(40),
                Constraint::Length(9),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

        frame.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let Some(form) = &self.form else {
            return;
        };
        let state = form.vm.state();
        let heading = if state.editing.is_some() {
            "Edit Task"
        } else {
            "Add Task"
        };

        if state.editing.is_some() && state.task.is_none() {
            let text = state.error.as_deref().unwrap_or("Loading task...");
            let paragraph = Paragraph::new(text).block(
                Block::default()
                    .title(heading)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            );
            frame.render_widget(paragraph, area);
            return;
        }

        TaskFormView {
            heading,
            form: &state.form,
            focused: form.focused,
            is_loading: state.is_loading,
            error: state.error.as_deref(),
        }
        .render(frame, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(status) = &self.status {
            frame.render_widget(
                Paragraph::new(status.text.as_str()).style(status.style),
                area,
            );
            return;
        }

        let help_text = match (self.navigator.current(), self.focus) {
            (Route::Splash, _) => "q: quit",
            (Route::AddTask | Route::EditTask(_), _) => {
                "Tab/Shift+Tab: switch field | Enter: save | Esc: cancel"
            }
            (_, ListFocus::Search) => "Enter: apply | Esc: clear | Tab: back to tasks",
            (_, ListFocus::Tasks) => {
                "j/k: navigate | a: add | e: edit | d: delete | /: search | f: due date | ?: help | q: quit"
            }
        };
        frame.render_widget(
            Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }

    fn render_help(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, popup_area);

        let help_text = [
            "Task list:",
            "  j/k or ↑/↓     - Move selection",
            "  a              - Add a task",
            "  e or Enter     - Edit selected task",
            "  d              - Delete selected task",
            "  D              - Delete all tasks",
            "  r              - Reload",
            "",
            "Search:",
            "  /              - Search by title (3+ characters)",
            "  f              - Filter by due date (yyyy-MM-dd)",
            "  c              - Clear search and filter",
            "  Esc            - Clear and leave search",
            "",
            "Form:",
            "  Tab/Shift+Tab  - Next/previous field",
            "  Enter          - Save",
            "  Esc            - Cancel",
            "",
            "General:",
            "  ?              - Show this help",
            "  q              - Quit",
            "  Ctrl+C         - Force quit",
            "",
            "Press any key to close this help",
        ]
        .join("\n");

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().title("Help").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
    }

    fn render_dialog(frame: &mut Frame, dialog: &Dialog) {
        let popup_area = Self::centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, popup_area);

        let (title, body, hint, color) = match dialog {
            Dialog::Error {
                message,
                can_retry,
                action_label,
                ..
            } => {
                let hint = if *can_retry {
                    format!("Enter/r: {action_label} | Esc: dismiss")
                } else {
                    "Enter/Esc: dismiss".to_string()
                };
                ("Error".to_string(), message.clone(), hint, Color::Red)
            }
            Dialog::Success { title, message, .. } => (
                title.clone(),
                message.clone(),
                "Enter: OK".to_string(),
                Color::Green,
            ),
            Dialog::ConfirmDelete(_, task_title) => (
                "Delete task".to_string(),
                format!("Delete \"{task_title}\"?"),
                "y: delete | n/Esc: cancel".to_string(),
                Color::Yellow,
            ),
            Dialog::ConfirmDeleteAll => (
                "Delete all tasks".to_string(),
                "This removes every task on the server.".to_string(),
                "y: delete all | n/Esc: cancel".to_string(),
                Color::Yellow,
            ),
        };

        let text = vec![
            Line::from(body),
            Line::from(""),
            Line::styled(hint, Style::default().fg(Color::DarkGray)),
        ];
        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(color)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

fn edit_field(vm: &TaskFormViewModel, field: FormField, value: &str) {
    match field {
        FormField::Title => vm.validate_title(value),
        FormField::Description => vm.validate_description(value),
        FormField::DueDate => vm.validate_due_date(value),
    }
}

pub async fn run_tui(mut app: App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.initialize();
    let mut event_handler = EventHandler::default();

    let outcome = async {
        loop {
            terminal.draw(|frame| app.render(frame))?;

            let event = event_handler.next_event().await?;
            if app.handle_event(event)? || event_handler.should_quit() {
                break;
            }
            app.on_tick();
        }
        Ok::<(), color_eyre::Report>(())
    }
    .await;
    app.shutdown();

    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::retry::RecordingSleeper;
    use crate::domain::parse_date;
    use crate::ports::MockTaskRepository;
    use ratatui::backend::TestBackend;

    fn app(repo: MockTaskRepository) -> App {
        let config = AppConfig {
            retry_count: 0,
            splash_delay_ms: 0,
            ..AppConfig::default()
        };
        App::new(
            TaskUseCases::new(Arc::new(repo)),
            config,
            Arc::new(RecordingSleeper::default()),
        )
    }

    async fn settle(app: &mut App) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
            app.on_tick();
        }
    }

    fn sample() -> Task {
        Task {
            id: Some(TaskId(1)),
            title: "Water plants".to_string(),
            description: None,
            due_date: parse_date("2099-06-01").unwrap(),
            completed: false,
        }
    }

    #[tokio::test]
    async fn splash_leads_to_loaded_list() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_all_tasks().returning(|| Ok(vec![sample()]));

        let mut app = app(repo);
        assert_eq!(app.route(), Route::Splash);
        app.initialize();
        settle(&mut app).await;

        assert_eq!(app.route(), Route::Home);
        assert_eq!(app.selected_task(), Some(sample()));
    }

    #[tokio::test]
    async fn add_and_cancel_form() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_all_tasks().returning(|| Ok(vec![]));

        let mut app = app(repo);
        app.initialize();
        settle(&mut app).await;

        app.handle_event(AppEvent::Character('a')).unwrap();
        assert_eq!(app.route(), Route::AddTask);
        app.handle_event(AppEvent::Character('x')).unwrap();
        assert_eq!(
            app.form.as_ref().map(|f| f.vm.state().form.title),
            Some("x".to_string())
        );

        app.handle_event(AppEvent::Escape).unwrap();
        assert_eq!(app.route(), Route::Home);
        assert!(app.form.is_none());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_all_tasks().returning(|| Ok(vec![sample()]));
        repo.expect_delete_task().never();

        let mut app = app(repo);
        app.initialize();
        settle(&mut app).await;

        app.handle_event(AppEvent::Character('d')).unwrap();
        assert_eq!(
            app.dialog,
            Some(Dialog::ConfirmDelete(TaskId(1), "Water plants".to_string()))
        );
        app.handle_event(AppEvent::Escape).unwrap();
        assert_eq!(app.dialog, None);
    }

    #[tokio::test]
    async fn renders_each_screen() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_all_tasks().returning(|| Ok(vec![sample()]));

        let mut app = app(repo);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        app.initialize();
        settle(&mut app).await;
        terminal.draw(|frame| app.render(frame)).unwrap();

        app.handle_event(AppEvent::Character('?')).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        app.handle_event(AppEvent::Character('x')).unwrap();

        app.handle_event(AppEvent::Character('a')).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        assert!(!app.show_help);
    }
}
