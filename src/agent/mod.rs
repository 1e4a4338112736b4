#[allow(clippy::module_inception)]
mod agent;
pub use agent::*;

mod builder;
pub use builder::*;

mod execution_context;
pub use execution_context::*;

mod options;
pub use options::*;

mod outcome;
pub use outcome::*;

mod error;
pub use error::*;

mod prompt;
pub use prompt::*;
