use std::fmt::{self, Display};

use crate::tools::ToolResult;

use super::{Message, ToolCall};

/// Model output that looked like an action but could not become a [`ToolCall`].
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidAction {
    /// The completion text as the model wrote it.
    pub raw: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Call(ToolCall),
    Invalid(InvalidAction),
}

/// A step either acts or concludes. Both, or neither, cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    Action {
        action: StepAction,
        observation: ToolResult,
    },
    Final {
        answer: String,
    },
}

/// One loop iteration: the model's reasoning plus what came of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub thought: String,
    pub kind: StepKind,
}

impl Step {
    pub fn new_action(
        thought: impl Into<String>,
        call: ToolCall,
        observation: ToolResult,
    ) -> Self {
        Self {
            thought: thought.into(),
            kind: StepKind::Action {
                action: StepAction::Call(call),
                observation,
            },
        }
    }

    pub fn new_invalid(
        thought: impl Into<String>,
        invalid: InvalidAction,
        observation: ToolResult,
    ) -> Self {
        Self {
            thought: thought.into(),
            kind: StepKind::Action {
                action: StepAction::Invalid(invalid),
                observation,
            },
        }
    }

    pub fn new_final(thought: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            kind: StepKind::Final {
                answer: answer.into(),
            },
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self.kind, StepKind::Final { .. })
    }

    pub fn action(&self) -> Option<&StepAction> {
        match &self.kind {
            StepKind::Action { action, .. } => Some(action),
            StepKind::Final { .. } => None,
        }
    }

    /// The tool call of this step, if the model produced a valid one.
    pub fn tool_call(&self) -> Option<&ToolCall> {
        match &self.kind {
            StepKind::Action {
                action: StepAction::Call(call),
                ..
            } => Some(call),
            _ => None,
        }
    }

    pub fn observation(&self) -> Option<&ToolResult> {
        match &self.kind {
            StepKind::Action { observation, .. } => Some(observation),
            StepKind::Final { .. } => None,
        }
    }

    pub fn final_answer(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Final { answer } => Some(answer),
            StepKind::Action { .. } => None,
        }
    }

    /// Replays the step as the assistant turn and, for actions, the observation turn.
    pub fn to_messages(&self) -> Vec<Message> {
        match &self.kind {
            StepKind::Action {
                action: StepAction::Invalid(invalid),
                observation,
            } => vec![
                Message::new_ai_message(invalid.raw.trim()),
                Message::new_human_message(format!("OBSERVATION: {}", observation.text)),
            ],
            StepKind::Action {
                action: StepAction::Call(call),
                observation,
            } => vec![
                Message::new_ai_message(self.with_thought(format!("ACTION: {call}"))),
                Message::new_human_message(format!("OBSERVATION: {}", observation.text)),
            ],
            StepKind::Final { answer } => {
                vec![Message::new_ai_message(
                    self.with_thought(format!("FINAL ANSWER: {answer}")),
                )]
            }
        }
    }

    fn with_thought(&self, line: String) -> String {
        if self.thought.is_empty() {
            line
        } else {
            format!("THOUGHT: {}\n{line}", self.thought)
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.thought.is_empty() {
            writeln!(f, "THOUGHT: {}", self.thought)?;
        }
        match &self.kind {
            StepKind::Action {
                action,
                observation,
            } => {
                match action {
                    StepAction::Call(call) => writeln!(f, "ACTION: {call}")?,
                    StepAction::Invalid(invalid) => {
                        writeln!(f, "ACTION (invalid): {}", invalid.reason)?
                    }
                }
                write!(f, "OBSERVATION: {}", observation.text)
            }
            StepKind::Final { answer } => write!(f, "FINAL ANSWER: {answer}"),
        }
    }
}
