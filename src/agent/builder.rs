use std::sync::Arc;

use crate::{
    llm::LLM,
    output_parser::{Instructor, ReActParser},
    schemas::BuilderError,
    tools::{SqlDatabase, SqlToolbox},
};

use super::{AgentOptions, SqlAgent, DEFAULT_SYSTEM_PROMPT};

#[derive(Default)]
pub struct SqlAgentBuilder {
    llm: Option<Arc<dyn LLM>>,
    database: Option<SqlDatabase>,
    instructor: Option<Box<dyn Instructor>>,
    options: AgentOptions,
}

impl SqlAgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn llm<L: LLM + 'static>(mut self, llm: L) -> Self {
        self.llm = Some(Arc::new(llm));
        self
    }

    /// Uses a model client that is also shared with other agents.
    pub fn shared_llm(mut self, llm: Arc<dyn LLM>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn database(mut self, database: SqlDatabase) -> Self {
        self.database = Some(database);
        self
    }

    /// Output format taught to the model. Defaults to [`ReActParser`].
    pub fn instructor<I: Instructor + 'static>(mut self, instructor: I) -> Self {
        self.instructor = Some(Box::new(instructor));
        self
    }

    pub fn options(mut self, options: AgentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<SqlAgent, BuilderError> {
        let llm = self.llm.ok_or(BuilderError::MissingField("llm"))?;
        let database = self.database.ok_or(BuilderError::MissingField("database"))?;
        if self.options.max_steps == 0 {
            return Err(BuilderError::Other("max_steps must be at least 1".into()));
        }

        let instructor = self
            .instructor
            .unwrap_or_else(|| Box::new(ReActParser::new()));
        let toolbox = SqlToolbox::new(database)
            .with_row_limit(self.options.row_limit)
            .with_query_timeout(self.options.query_timeout);

        let system_prompt = format!(
            "{}{}",
            self.options
                .system_prompt
                .as_deref()
                .unwrap_or(DEFAULT_SYSTEM_PROMPT),
            instructor.create_suffix(&toolbox.describe())
        );

        Ok(SqlAgent {
            llm,
            toolbox,
            instructor,
            options: self.options,
            system_prompt,
        })
    }
}
