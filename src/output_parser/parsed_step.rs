use crate::schemas::ToolCall;

use super::OutputParseError;

/// What a single model completion turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStep {
    Final {
        thought: String,
        answer: String,
    },
    Action {
        thought: String,
        call: ToolCall,
    },
    /// The completion could not be read as either of the above. `raw` is kept
    /// so the loop can replay it to the model together with the error.
    ParseError {
        thought: String,
        raw: String,
        error: OutputParseError,
    },
}

impl ParsedStep {
    pub fn thought(&self) -> &str {
        match self {
            ParsedStep::Final { thought, .. }
            | ParsedStep::Action { thought, .. }
            | ParsedStep::ParseError { thought, .. } => thought,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ParsedStep::Final { .. })
    }
}
