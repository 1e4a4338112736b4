use async_trait::async_trait;
use schemars::{schema::RootSchema, schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::schemas::ToolName;

use super::{describe_parameters, ToolError, ToolResult};

#[async_trait]
pub trait Tool: Send + Sync {
    /// Typed arguments. Deriving with `#[serde(deny_unknown_fields)]` makes
    /// unknown and missing parameters a validation failure.
    type Input: DeserializeOwned + JsonSchema + Send;

    /// Returns the name of the tool.
    fn name(&self) -> ToolName;

    /// Provides a description of what the tool does and when to use it.
    fn description(&self) -> String;

    /// JSON schema for the tool input parameters.
    fn parameters(&self) -> RootSchema {
        schema_for!(Self::Input)
    }

    /// Executes the core functionality of the tool.
    async fn run(&self, input: Self::Input) -> Result<String, ToolError>;

    fn parse_input(&self, input: Map<String, Value>) -> Result<Self::Input, ToolError> {
        serde_json::from_value(Value::Object(input)).map_err(|source| {
            ToolError::InvalidArguments {
                tool: self.name(),
                source,
            }
        })
    }

    /// Parses the raw arguments and runs the tool. Never fails: errors are
    /// folded into an error [`ToolResult`].
    async fn call(&self, input: Map<String, Value>) -> ToolResult {
        let result = match self.parse_input(input) {
            Ok(input) => self.run(input).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            log::warn!("Tool {} failed: {e}", self.name());
        }
        result.into()
    }

    /// One prompt line, e.g. `- describe_table(table_name): Describes ...`.
    fn to_plain_description(&self) -> String {
        let parameters = describe_parameters(&self.parameters());
        let parameters = if parameters.is_empty() {
            "no parameters".to_string()
        } else {
            parameters.join(", ")
        };
        format!("- {}({parameters}): {}", self.name(), self.description())
    }
}
