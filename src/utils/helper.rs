/// Lowercases a tool name and folds spaces and dashes into underscores, so
/// `Describe Table` and `describe-table` both resolve to `describe_table`.
pub fn normalize_tool_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}
