use std::time::Duration;

use crate::tools::{DEFAULT_QUERY_TIMEOUT, DEFAULT_ROW_LIMIT};

pub const DEFAULT_MAX_STEPS: usize = 10;

pub struct AgentOptions {
    /// Iterations allowed before a run is aborted.
    pub max_steps: usize,
    /// `LIMIT` appended to queries that have none.
    pub row_limit: usize,
    pub query_timeout: Duration,
    /// Replaces the opening of the system prompt. Tool list and output format
    /// are always appended.
    pub system_prompt: Option<String>,
}

impl AgentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_row_limit(mut self, row_limit: usize) -> Self {
        self.row_limit = row_limit;
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn with_system_prompt<S: Into<String>>(mut self, system_prompt: S) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            row_limit: DEFAULT_ROW_LIMIT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            system_prompt: None,
        }
    }
}
