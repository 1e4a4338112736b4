use std::time::Duration;

use crate::schemas::{ToolCall, ToolName};

use super::{DescribeTable, ListTables, QueryDatabase, SqlDatabase, Tool, ToolResult};

/// The fixed set of database tools, dispatched by [`ToolName`].
pub struct SqlToolbox {
    list_tables: ListTables,
    describe_table: DescribeTable,
    query_database: QueryDatabase,
}

impl SqlToolbox {
    pub fn new(database: SqlDatabase) -> Self {
        Self {
            list_tables: ListTables::new(database.clone()),
            describe_table: DescribeTable::new(database.clone()),
            query_database: QueryDatabase::new(database),
        }
    }

    pub fn with_row_limit(mut self, row_limit: usize) -> Self {
        self.query_database = self.query_database.with_row_limit(row_limit);
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_database = self.query_database.with_timeout(timeout);
        self
    }

    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let arguments = call.arguments.clone();
        match call.name {
            ToolName::ListTables => self.list_tables.call(arguments).await,
            ToolName::DescribeTable => self.describe_table.call(arguments).await,
            ToolName::QueryDatabase => self.query_database.call(arguments).await,
        }
    }

    /// One line per tool, for the system prompt.
    pub fn describe(&self) -> String {
        [
            self.list_tables.to_plain_description(),
            self.describe_table.to_plain_description(),
            self.query_database.to_plain_description(),
        ]
        .join("\n")
    }
}
