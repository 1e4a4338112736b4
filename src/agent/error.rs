use thiserror::Error;

/// Misuse of the agent API. Failures during a run never surface here; they
/// end up in the transcript or in a [`super::QueryOutcome`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AgentError {
    #[error("max_steps must be at least 1")]
    ZeroMaxSteps,

    #[error("query is empty")]
    EmptyQuery,
}
