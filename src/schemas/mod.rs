mod message_type;
pub use message_type::*;

mod message;
pub use message::*;

mod builder_error;
pub use builder_error::*;

mod tool_call;
pub use tool_call::*;

mod step;
pub use step::*;

mod transcript;
pub use transcript::*;

mod token_usage;
pub use token_usage::*;

mod with_usage;
pub use with_usage::*;
