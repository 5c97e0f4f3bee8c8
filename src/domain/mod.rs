pub mod error;
pub mod task;
pub mod validation;

pub use error::*;
pub use task::*;
pub use validation::*;
