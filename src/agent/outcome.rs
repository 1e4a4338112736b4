use std::fmt::{self, Display};

use uuid::Uuid;

use crate::schemas::{TokenUsage, Transcript};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    MaxStepsExceeded,
    /// The model could not be reached, or kept failing after retries.
    ModelUnavailable(String),
}

impl Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::MaxStepsExceeded => f.write_str("max steps exceeded"),
            AbortReason::ModelUnavailable(detail) => write!(f, "model unavailable: {detail}"),
        }
    }
}

/// How a run ended. Built exactly once, when the loop stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Answered(String),
    Aborted(AbortReason),
}

impl QueryOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, QueryOutcome::Answered(_))
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            QueryOutcome::Answered(answer) => Some(answer),
            QueryOutcome::Aborted(_) => None,
        }
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match self {
            QueryOutcome::Aborted(reason) => Some(reason),
            QueryOutcome::Answered(_) => None,
        }
    }
}

impl Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Answered(answer) => f.write_str(answer),
            QueryOutcome::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// Everything a caller gets back from one run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub run_id: Uuid,
    pub outcome: QueryOutcome,
    pub transcript: Transcript,
    /// Token usage summed over every model call of the run.
    pub usage: Option<TokenUsage>,
}
