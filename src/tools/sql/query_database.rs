use std::time::Duration;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    schemas::ToolName,
    tools::{Tool, ToolError},
};

use super::{SelectStatement, SqlDatabase};

pub const DEFAULT_ROW_LIMIT: usize = 100;
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize, JsonSchema, Debug)]
#[serde(deny_unknown_fields)]
pub struct QueryDatabaseInput {
    /// SQL SELECT query to execute
    pub query: String,
}

pub struct QueryDatabase {
    database: SqlDatabase,
    row_limit: usize,
    timeout: Duration,
}

impl QueryDatabase {
    pub fn new(database: SqlDatabase) -> Self {
        Self {
            database,
            row_limit: DEFAULT_ROW_LIMIT,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_row_limit(mut self, row_limit: usize) -> Self {
        self.row_limit = row_limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates `query` and returns the exact SQL that would be executed.
    pub fn prepare(&self, query: &str) -> Result<String, ToolError> {
        let statement = SelectStatement::parse(query)?;
        Ok(statement.with_row_limit(self.row_limit))
    }
}

#[async_trait]
impl Tool for QueryDatabase {
    type Input = QueryDatabaseInput;

    fn name(&self) -> ToolName {
        ToolName::QueryDatabase
    }

    fn description(&self) -> String {
        format!(
            "Executes a SELECT query (read-only, max {} rows)",
            self.row_limit
        )
    }

    async fn run(&self, input: QueryDatabaseInput) -> Result<String, ToolError> {
        let sql = self.prepare(&input.query)?;
        log::debug!("Executing SQL: {sql}");

        let rows = tokio::time::timeout(self.timeout, self.database.fetch(&sql))
            .await
            .map_err(|_| ToolError::Timeout(self.timeout))?
            .map_err(ToolError::Sql)?;

        Ok(rows.render())
    }
}
