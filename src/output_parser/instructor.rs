use super::ParsedStep;

/// Teaches the model an output format and reads completions written in it.
pub trait Instructor: Send + Sync {
    /// Format instructions appended to the system prompt. `tools` is the
    /// rendered tool list, one tool per line.
    fn create_suffix(&self, tools: &str) -> String;

    fn parse(&self, output: &str) -> ParsedStep;
}
