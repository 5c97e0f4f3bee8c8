pub mod config_store;
pub mod error;
pub mod task_repository;

pub use config_store::*;
pub use error::*;
pub use task_repository::*;
