use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    schemas::ToolName,
    tools::{Tool, ToolError},
};

use super::SqlDatabase;

#[derive(Deserialize, JsonSchema, Debug)]
#[serde(deny_unknown_fields)]
pub struct DescribeTableInput {
    /// Name of the table to describe
    pub table_name: String,
}

pub struct DescribeTable {
    database: SqlDatabase,
}

impl DescribeTable {
    pub fn new(database: SqlDatabase) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Tool for DescribeTable {
    type Input = DescribeTableInput;

    fn name(&self) -> ToolName {
        ToolName::DescribeTable
    }

    fn description(&self) -> String {
        "Describes the schema of a table (columns, types, row count)".into()
    }

    async fn run(&self, input: DescribeTableInput) -> Result<String, ToolError> {
        let requested = input.table_name.trim();
        let Some(table_name) = self.database.resolve_table(requested).await? else {
            return Err(ToolError::NoSuchTable(requested.to_string()));
        };

        let columns = self.database.columns(&table_name).await?;
        let row_count = self.database.row_count(&table_name).await?;

        let mut description = format!("Table: {table_name}\nColumns:\n");
        for column in columns {
            description.push_str(&format!(
                "  - {} ({})\n",
                column.name, column.declared_type
            ));
        }
        description.push_str(&format!("Row count: {row_count}"));
        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::{json, Map, Value};

    use crate::tools::sql::test_support::fixture_database;

    use super::*;

    fn arguments(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_describe_table() {
        let (_dir, db) = fixture_database().await;
        let tool = DescribeTable::new(db);

        let result = tool
            .call(arguments(json!({ "table_name": "customers" })))
            .await;

        assert!(!result.is_error);
        assert_eq!(
            result.text,
            indoc! {"
                Table: customers
                Columns:
                  - id (INTEGER)
                  - name (TEXT)
                  - email (TEXT)
                Row count: 5"}
        );
    }

    #[tokio::test]
    async fn test_describe_table_name_is_case_insensitive() {
        let (_dir, db) = fixture_database().await;
        let tool = DescribeTable::new(db);

        let exact = tool
            .call(arguments(json!({ "table_name": "customers" })))
            .await;
        let mixed = tool
            .call(arguments(json!({ "table_name": "Customers" })))
            .await;

        assert!(!mixed.is_error, "{}", mixed.text);
        assert_eq!(mixed, exact);
    }

    #[tokio::test]
    async fn test_describe_table_is_idempotent() {
        let (_dir, db) = fixture_database().await;
        let tool = DescribeTable::new(db);

        let first = tool.call(arguments(json!({ "table_name": "orders" }))).await;
        let second = tool.call(arguments(json!({ "table_name": "orders" }))).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_describe_missing_table() {
        let (_dir, db) = fixture_database().await;
        let result = DescribeTable::new(db)
            .call(arguments(json!({ "table_name": "ghosts" })))
            .await;

        assert!(result.is_error);
        assert_eq!(result.text, "no such table: ghosts");
    }

    #[tokio::test]
    async fn test_describe_table_rejects_injection() {
        let (_dir, db) = fixture_database().await;
        let result = DescribeTable::new(db)
            .call(arguments(json!({ "table_name": "customers; DROP TABLE customers" })))
            .await;

        assert!(result.is_error);
        assert!(result.text.starts_with("no such table"));
    }

    #[tokio::test]
    async fn test_describe_table_argument_validation() {
        let (_dir, db) = fixture_database().await;
        let tool = DescribeTable::new(db);

        let missing = tool.call(Map::new()).await;
        assert!(missing.is_error);
        assert!(missing.text.contains("missing field `table_name`"), "{}", missing.text);

        let unknown = tool
            .call(arguments(json!({ "table_name": "customers", "schema": "main" })))
            .await;
        assert!(unknown.is_error);
        assert!(unknown.text.contains("unknown field `schema`"), "{}", unknown.text);

        let wrong_type = tool.call(arguments(json!({ "table_name": 3 }))).await;
        assert!(wrong_type.is_error);
    }
}
