pub mod search_bar;
pub mod task_form;

pub use search_bar::{SearchBar, SearchMode};
pub use task_form::{FormField, TaskFormView};
