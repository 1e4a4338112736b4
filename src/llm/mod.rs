#[allow(clippy::module_inception)]
mod llm;
pub use llm::*;

mod error;
pub use error::*;

mod retry;
pub use retry::*;

pub mod openai;
pub use openai::*;

#[cfg(test)]
pub(crate) mod test_support;
