use thiserror::Error;

use crate::schemas::UnknownToolName;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OutputParseError {
    #[error("empty response from model")]
    EmptyResponse,

    #[error("FINAL ANSWER is empty")]
    EmptyFinalAnswer,

    #[error("ACTION is missing a tool name. Use format: ACTION: tool_name{{\"param\": \"value\"}}")]
    MissingToolName,

    #[error("could not parse action arguments: {0}. Use format: ACTION: tool_name{{\"param\": \"value\"}}")]
    InvalidArguments(String),

    #[error(transparent)]
    UnknownTool(#[from] UnknownToolName),
}
