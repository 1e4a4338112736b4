mod tool;
pub use tool::*;

mod tool_result;
pub use tool_result::*;

mod describe_parameters;
pub use describe_parameters::*;

pub(crate) mod sql;
pub use sql::*;

mod toolbox;
pub use toolbox::*;

mod error;
pub use error::*;
