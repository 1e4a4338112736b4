use uuid::Uuid;

use crate::{
    output_parser::ParsedStep,
    schemas::{InvalidAction, Step, TokenUsage, Transcript},
    tools::ToolResult,
};

use super::{AbortReason, QueryOutcome, RunOutput, SqlAgent};

/// Where a run stands. A run starts at `Running(0)`; `Answered` and `Aborted`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Number of completed steps.
    Running(usize),
    Answered,
    Aborted,
}

/// Owns all mutable state of a single [`SqlAgent`] run.
///
/// * `transcript` - one step per iteration, replayed into every prompt
/// * `state` - position in the loop, see [`LoopState`]
/// * `total_usage` - token usage summed over the run's model calls
pub struct ExecutionContext<'agent> {
    agent: &'agent SqlAgent,
    run_id: Uuid,
    query: String,
    max_steps: usize,
    state: LoopState,
    transcript: Transcript,
    total_usage: Option<TokenUsage>,
}

impl<'agent> ExecutionContext<'agent> {
    pub fn new(agent: &'agent SqlAgent, query: impl Into<String>, max_steps: usize) -> Self {
        Self {
            agent,
            run_id: Uuid::new_v4(),
            query: query.into(),
            max_steps,
            state: LoopState::Running(0),
            transcript: Transcript::new(),
            total_usage: None,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Runs the loop until an answer, a model failure or the step ceiling.
    pub async fn start(mut self) -> RunOutput {
        log::info!("[{}] new query: {}", self.run_id, self.query);

        let outcome = loop {
            let LoopState::Running(completed) = self.state else {
                // Terminal states always leave the loop through `break`.
                break QueryOutcome::Aborted(AbortReason::MaxStepsExceeded);
            };

            if completed >= self.max_steps {
                log::warn!(
                    "[{}] no final answer after {} step(s), aborting",
                    self.run_id,
                    completed
                );
                break self.abort(AbortReason::MaxStepsExceeded);
            }

            if let Some(outcome) = self.next_step(completed).await {
                break outcome;
            }
        };

        log::info!("[{}] finished: {}", self.run_id, outcome);

        RunOutput {
            run_id: self.run_id,
            outcome,
            transcript: self.transcript,
            usage: self.total_usage,
        }
    }

    /// One iteration. Returns the outcome when the run is over.
    async fn next_step(&mut self, completed: usize) -> Option<QueryOutcome> {
        let step_number = completed + 1;
        let messages = self.agent.build_messages(&self.query, &self.transcript);
        log::debug!(
            "[{}] step {step_number}: prompting model with {} message(s)",
            self.run_id,
            messages.len()
        );

        let completion = match self.agent.llm.generate(&messages).await {
            Ok(completion) => completion,
            Err(e) => {
                log::warn!("[{}] model unavailable: {e}", self.run_id);
                return Some(self.abort(AbortReason::ModelUnavailable(e.to_string())));
            }
        };
        self.total_usage = TokenUsage::merge_options([&self.total_usage, &completion.usage]);
        log::debug!("[{}] model output:\n{}", self.run_id, completion.content);

        match self.agent.instructor.parse(&completion.content) {
            ParsedStep::Final { thought, answer } => {
                log::info!("[{}] step {step_number}: FINAL ANSWER: {answer}", self.run_id);
                self.transcript.push(Step::new_final(thought, answer.clone()));
                self.state = LoopState::Answered;
                Some(QueryOutcome::Answered(answer))
            }
            ParsedStep::Action { thought, call } => {
                log::info!("[{}] step {step_number}: ACTION: {call}", self.run_id);
                let observation = self.agent.toolbox.execute(&call).await;
                self.log_observation(&observation);
                self.transcript
                    .push(Step::new_action(thought, call, observation));
                self.state = LoopState::Running(step_number);
                None
            }
            ParsedStep::ParseError {
                thought,
                raw,
                error,
            } => {
                log::warn!(
                    "[{}] step {step_number}: invalid action: {error}",
                    self.run_id
                );
                let reason = error.to_string();
                let observation = ToolResult::error(reason.clone());
                self.transcript.push(Step::new_invalid(
                    thought,
                    InvalidAction { raw, reason },
                    observation,
                ));
                self.state = LoopState::Running(step_number);
                None
            }
        }
    }

    fn abort(&mut self, reason: AbortReason) -> QueryOutcome {
        self.state = LoopState::Aborted;
        QueryOutcome::Aborted(reason)
    }

    fn log_observation(&self, observation: &ToolResult) {
        if observation.is_error {
            log::warn!("[{}] OBSERVATION (error): {observation}", self.run_id);
        } else {
            log::debug!("[{}] OBSERVATION: {observation}", self.run_id);
        }
    }
}
