use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde_json::{Map, Value};

use crate::utils::helper::normalize_tool_name;

/// The fixed set of operations the agent may invoke against the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListTables,
    DescribeTable,
    QueryDatabase,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [
        ToolName::ListTables,
        ToolName::DescribeTable,
        ToolName::QueryDatabase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ListTables => "list_tables",
            ToolName::DescribeTable => "describe_table",
            ToolName::QueryDatabase => "query_database",
        }
    }
}

impl Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToolName(pub String);

impl Display for UnknownToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let available = ToolName::ALL
            .iter()
            .map(ToolName::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Unknown tool '{}'. Available tools: {available}", self.0)
    }
}

impl std::error::Error for UnknownToolName {}

impl FromStr for ToolName {
    type Err = UnknownToolName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_tool_name(s).as_str() {
            "list_tables" => Ok(ToolName::ListTables),
            "describe_table" => Ok(ToolName::DescribeTable),
            "query_database" => Ok(ToolName::QueryDatabase),
            _ => Err(UnknownToolName(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: ToolName,
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: ToolName, arguments: Map<String, Value>) -> Self {
        Self { name, arguments }
    }

    pub fn without_arguments(name: ToolName) -> Self {
        Self::new(name, Map::new())
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments
            .insert(key.into(), Value::String(value.into()));
        self
    }
}

/// Renders the call the way the model is asked to write it:
/// `describe_table{"table_name":"customers"}`.
impl Display for ToolCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, Value::Object(self.arguments.clone()))
    }
}
