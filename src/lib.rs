pub mod agent;
pub mod llm;
pub mod output_parser;
pub mod schemas;
pub mod tools;

pub(crate) mod utils;
