pub mod debounce;
pub mod error;
pub mod navigation;
pub mod retry;
pub mod task_form;
pub mod task_list;
pub mod ui_event;
pub mod use_cases;
pub mod view_model;

pub use debounce::{Debounced, Debouncer};
pub use error::*;
pub use navigation::{Navigator, Route, SplashViewModel};
pub use retry::{Retrier, ServiceCall, Sleeper, TokioSleeper, DEFAULT_BASE_DELAY};
pub use task_form::{FormAction, TaskFormUiState, TaskFormViewModel};
pub use task_list::{TaskListAction, TaskListUiState, TaskListViewModel};
pub use ui_event::*;
pub use use_cases::*;
pub use view_model::{TaskScope, ViewModelCore};
