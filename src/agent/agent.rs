use std::sync::Arc;

use crate::{
    llm::LLM,
    output_parser::Instructor,
    schemas::{Message, Transcript},
    tools::SqlToolbox,
};

use super::{AgentError, AgentOptions, ExecutionContext, RunOutput, SqlAgentBuilder};

/// Answers natural-language questions about a read-only SQLite database by
/// letting a model alternate between reasoning and tool calls.
///
/// The agent holds no per-run state: every call to [`SqlAgent::run`] gets its
/// own [`ExecutionContext`], so one agent can serve concurrent runs.
pub struct SqlAgent {
    pub(crate) llm: Arc<dyn LLM>,
    pub(crate) toolbox: SqlToolbox,
    pub(crate) instructor: Box<dyn Instructor>,
    pub(crate) options: AgentOptions,
    pub(crate) system_prompt: String,
}

impl SqlAgent {
    pub fn builder() -> SqlAgentBuilder {
        SqlAgentBuilder::new()
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub async fn run(&self, query: &str) -> Result<RunOutput, AgentError> {
        self.run_with_max_steps(query, self.options.max_steps).await
    }

    /// Like [`SqlAgent::run`] with a step ceiling for this run only.
    pub async fn run_with_max_steps(
        &self,
        query: &str,
        max_steps: usize,
    ) -> Result<RunOutput, AgentError> {
        if max_steps == 0 {
            return Err(AgentError::ZeroMaxSteps);
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::EmptyQuery);
        }

        Ok(ExecutionContext::new(self, query, max_steps).start().await)
    }

    /// System prompt, the question, then every step so far replayed in order.
    pub(crate) fn build_messages(&self, query: &str, transcript: &Transcript) -> Vec<Message> {
        let mut messages = vec![
            Message::new_system_message(self.system_prompt.as_str()),
            Message::new_human_message(query),
        ];
        messages.extend(transcript.to_messages());
        messages
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::{
        agent::{AbortReason, AgentOptions, QueryOutcome},
        llm::{test_support::ScriptedLLM, LLMError, RetryPolicy, RetryingLLM},
        schemas::{BuilderError, IntoWithUsage, MessageType, StepAction, TokenUsage, WithUsage},
        tools::sql::test_support::fixture_database,
    };

    use super::*;

    fn agent(llm: impl LLM + 'static, database: crate::tools::SqlDatabase) -> SqlAgent {
        SqlAgent::builder()
            .llm(llm)
            .database(database)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_answers_customer_count() {
        let (_dir, db) = fixture_database().await;
        let llm = Arc::new(ScriptedLLM::replies([
            "THOUGHT: I need to find tables first\nACTION: list_tables{}",
            "THOUGHT: Found customers, let me check its schema\nACTION: describe_table{\"table_name\": \"customers\"}",
            "THOUGHT: Now I can count the rows\nACTION: query_database{\"query\": \"SELECT COUNT(*) FROM customers\"}",
            "THOUGHT: The count is 5\nFINAL ANSWER: There are 5 customers in the database.",
        ]));
        let agent = SqlAgent::builder()
            .shared_llm(llm.clone())
            .database(db)
            .build()
            .unwrap();

        let output = agent
            .run("How many customers are in the database?")
            .await
            .unwrap();

        assert_eq!(
            output.outcome,
            QueryOutcome::Answered("There are 5 customers in the database.".into())
        );
        let steps = output.transcript.steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(
            steps[0].observation().unwrap().text,
            "Available tables: customers, orders"
        );
        assert!(steps[1]
            .observation()
            .unwrap()
            .text
            .contains("Row count: 5"));
        let count = steps[2].observation().unwrap();
        assert!(!count.is_error);
        assert!(count.text.contains("1. (5)"), "{}", count.text);
        assert!(steps[3].is_final());

        assert_eq!(llm.calls(), 4);
        assert_eq!(output.usage, Some(TokenUsage::new(40, 20)));

        let prompts = llm.prompts();
        assert_eq!(prompts[0].len(), 2);
        assert_eq!(prompts[0][0].message_type, MessageType::System);
        assert_eq!(
            prompts[0][1].content,
            "How many customers are in the database?"
        );
        assert_eq!(prompts[3].len(), 8);
        assert_eq!(
            prompts[1][3].content,
            "OBSERVATION: Available tables: customers, orders"
        );
    }

    #[tokio::test]
    async fn test_missing_table_does_not_stop_the_loop() {
        let (_dir, db) = fixture_database().await;
        let llm = ScriptedLLM::replies([
            "THOUGHT: Check the ghosts table\nACTION: describe_table{\"table_name\": \"ghosts\"}",
            "THOUGHT: No such table, list what exists\nACTION: list_tables{}",
            "FINAL ANSWER: There is no ghosts table.",
        ]);
        let agent = agent(llm, db);

        let output = agent.run("How many ghosts are there?").await.unwrap();

        let steps = output.transcript.steps();
        assert_eq!(steps.len(), 3);
        let observation = steps[0].observation().unwrap();
        assert!(observation.is_error);
        assert!(observation.text.contains("no such table"));
        assert!(output.outcome.is_answered());
    }

    #[tokio::test]
    async fn test_drop_is_rejected() {
        let (_dir, db) = fixture_database().await;
        let llm = ScriptedLLM::replies([
            "THOUGHT: Remove it\nACTION: query_database{\"query\": \"DROP TABLE customers\"}",
            "FINAL ANSWER: I cannot modify the database.",
        ]);
        let agent = agent(llm, db.clone());

        let output = agent.run("Delete the customers table").await.unwrap();

        let observation = output.transcript.steps()[0].observation().unwrap();
        assert!(observation.is_error);
        assert_eq!(
            observation.text,
            "Only SELECT statements are allowed (read-only mode); got DROP"
        );
        assert_eq!(db.row_count("customers").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_max_steps_exceeded() {
        let (_dir, db) = fixture_database().await;
        let llm = Arc::new(ScriptedLLM::repeating(
            "THOUGHT: Look again\nACTION: list_tables{}",
        ));
        let agent = SqlAgent::builder()
            .shared_llm(llm.clone())
            .database(db)
            .build()
            .unwrap();

        let output = agent.run("Loop forever").await.unwrap();

        assert_eq!(
            output.outcome,
            QueryOutcome::Aborted(AbortReason::MaxStepsExceeded)
        );
        assert_eq!(output.transcript.len(), 10);
        assert_eq!(llm.calls(), 10);

        let output = agent.run_with_max_steps("Loop forever", 3).await.unwrap();
        assert_eq!(output.transcript.len(), 3);
        assert_eq!(
            output.outcome.abort_reason().unwrap().to_string(),
            "max steps exceeded"
        );
    }

    #[tokio::test]
    async fn test_model_failure_aborts() {
        let (_dir, db) = fixture_database().await;
        let llm = ScriptedLLM::new([Err(LLMError::Unauthorized {
            status: 401,
            message: "Incorrect API key provided".into(),
        })]);
        let agent = agent(llm, db);

        let output = agent.run("How many customers?").await.unwrap();

        let Some(AbortReason::ModelUnavailable(detail)) = output.outcome.abort_reason() else {
            panic!("unexpected outcome: {:?}", output.outcome);
        };
        assert!(detail.contains("Incorrect API key provided"));
        assert!(output.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_after_retries() {
        let (_dir, db) = fixture_database().await;
        let llm = RetryingLLM::new(ScriptedLLM::new([
            Ok("ACTION: list_tables{}".to_string()),
            Err(LLMError::RateLimited { retry_after: None }),
            Err(LLMError::RateLimited { retry_after: None }),
        ]))
        .with_policy(
            RetryPolicy::default()
                .with_max_attempts(2)
                .with_base_delay(std::time::Duration::from_millis(1)),
        );
        let agent = agent(llm, db);

        let output = agent.run("How many customers?").await.unwrap();

        assert_eq!(output.transcript.len(), 1);
        assert!(output
            .outcome
            .to_string()
            .starts_with("aborted: model unavailable: gave up after 2 attempt(s)"));
    }

    #[tokio::test]
    async fn test_invalid_action_is_recorded() {
        let (_dir, db) = fixture_database().await;
        let llm = Arc::new(ScriptedLLM::replies([
            "THOUGHT: Drop it\nACTION: drop_table{\"table_name\": \"customers\"}",
            "THOUGHT: Count instead\nACTION: query_database SELECT COUNT(*) FROM customers",
            "There are 5 customers.",
        ]));
        let agent = SqlAgent::builder()
            .shared_llm(llm.clone())
            .database(db)
            .build()
            .unwrap();

        let output = agent.run("How many customers?").await.unwrap();

        let steps = output.transcript.steps();
        assert_eq!(steps.len(), 3);
        let StepAction::Invalid(invalid) = steps[0].action().unwrap() else {
            panic!("expected an invalid action");
        };
        assert!(invalid.reason.contains("Unknown tool 'drop_table'"));
        assert!(steps[0].observation().unwrap().is_error);
        assert!(steps[1].observation().unwrap().text.starts_with("could not parse action arguments"));
        assert_eq!(
            output.outcome,
            QueryOutcome::Answered("There are 5 customers.".into())
        );

        let second_prompt = &llm.prompts()[1];
        assert_eq!(
            second_prompt[2].content,
            "THOUGHT: Drop it\nACTION: drop_table{\"table_name\": \"customers\"}"
        );
        assert!(second_prompt[3]
            .content
            .starts_with("OBSERVATION: Unknown tool 'drop_table'"));
    }

    /// Answers each question with a count query, then echoes the question back.
    struct EchoLLM;

    #[async_trait]
    impl LLM for EchoLLM {
        async fn generate(&self, messages: &[Message]) -> Result<WithUsage<String>, LLMError> {
            tokio::task::yield_now().await;
            let reply = if messages.len() == 2 {
                "ACTION: query_database{\"query\": \"SELECT COUNT(*) FROM customers\"}".to_string()
            } else {
                format!("FINAL ANSWER: {}", messages[1].content)
            };
            Ok(reply.with_usage(None))
        }
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let (_dir, db) = fixture_database().await;
        let agent = agent(EchoLLM, db);

        let (first, second) = tokio::join!(agent.run("first"), agent.run("second"));
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_ne!(first.run_id, second.run_id);
        assert_eq!(first.outcome, QueryOutcome::Answered("first".into()));
        assert_eq!(second.outcome, QueryOutcome::Answered("second".into()));
        assert_eq!(first.transcript.len(), 2);
        assert_eq!(second.transcript.len(), 2);
        assert_eq!(first.usage, None);
    }

    #[tokio::test]
    async fn test_setup_errors() {
        let (_dir, db) = fixture_database().await;
        let agent = agent(ScriptedLLM::repeating("FINAL ANSWER: 5"), db.clone());

        assert_eq!(
            agent.run_with_max_steps("How many?", 0).await.unwrap_err(),
            AgentError::ZeroMaxSteps
        );
        assert_eq!(agent.run("   ").await.unwrap_err(), AgentError::EmptyQuery);

        assert!(matches!(
            SqlAgent::builder().database(db.clone()).build(),
            Err(BuilderError::MissingField("llm"))
        ));
        assert!(matches!(
            SqlAgent::builder().llm(EchoLLM).build(),
            Err(BuilderError::MissingField("database"))
        ));
        assert!(matches!(
            SqlAgent::builder()
                .llm(EchoLLM)
                .database(db)
                .options(AgentOptions::default().with_max_steps(0))
                .build(),
            Err(BuilderError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_system_prompt() {
        let (_dir, db) = fixture_database().await;
        let agent = agent(EchoLLM, db.clone());
        let prompt = agent.system_prompt();
        assert!(prompt.starts_with("You are a SQL database agent."));
        assert!(prompt.contains(
            "AVAILABLE TOOLS:\n- list_tables(no parameters): Lists all tables in the database"
        ));
        assert!(prompt.contains("FINAL ANSWER: [concise answer to the user's question]"));

        let agent = SqlAgent::builder()
            .llm(EchoLLM)
            .database(db)
            .options(
                AgentOptions::default()
                    .with_system_prompt("You answer questions about a shop.")
                    .with_row_limit(20),
            )
            .build()
            .unwrap();
        assert!(agent
            .system_prompt()
            .starts_with("You answer questions about a shop.\n\nAVAILABLE TOOLS:"));
        assert!(agent.system_prompt().contains("max 20 rows"));
    }
}
