use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    schemas::ToolName,
    tools::{Tool, ToolError},
};

use super::SqlDatabase;

#[derive(Deserialize, JsonSchema, Debug, Default)]
#[serde(deny_unknown_fields)]
#[schemars(description = "list_tables takes no arguments")]
pub struct ListTablesInput {}

pub struct ListTables {
    database: SqlDatabase,
}

impl ListTables {
    pub fn new(database: SqlDatabase) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Tool for ListTables {
    type Input = ListTablesInput;

    fn name(&self) -> ToolName {
        ToolName::ListTables
    }

    fn description(&self) -> String {
        "Lists all tables in the database".into()
    }

    async fn run(&self, _input: ListTablesInput) -> Result<String, ToolError> {
        let tables = self.database.table_names().await?;
        if tables.is_empty() {
            return Ok("No tables found".into());
        }
        Ok(format!("Available tables: {}", tables.join(", ")))
    }
}
