use std::time::Duration;

use thiserror::Error;

use crate::schemas::ToolName;

use super::StatementError;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: ToolName,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Rejected(#[from] StatementError),

    #[error("no such table: {0}")]
    NoSuchTable(String),

    /// Engine-level failure of a model-written query (bad column, syntax, ...).
    #[error("SQL Error: {0}. Check your query syntax.")]
    Sql(sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
}
