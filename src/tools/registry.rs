//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering plugin functions and routing tool calls to
//! their handlers. The registry is shared with the invoker; the controller
//! never touches it.

use std::collections::HashMap;

use crate::core::config::Config;
use crate::core::{Result, ToolCall, ToolDefinition, ToolResult};
use crate::tools::leave::LeaveDesk;
use crate::tools::search::WebSearch;
use crate::tools::sql::ElectionDb;

/// Registry of available tools
pub struct ToolRegistry {
    /// Tool definitions indexed by name
    definitions: HashMap<String, ToolDefinition>,
    /// Leave-desk plugin
    leave: Option<LeaveDesk>,
    /// Election database plugin
    database: Option<ElectionDb>,
    /// Web search plugin
    search: Option<WebSearch>,
}

impl ToolRegistry {
    /// Create an empty registry (agents behave as plain chat)
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            leave: None,
            database: None,
            search: None,
        }
    }

    /// Create a registry with the demo plugins registered
    pub fn with_demo_plugins(config: &Config) -> Result<Self> {
        let mut registry = Self::new();

        registry.leave = Some(LeaveDesk::new());
        registry.register_leave_tools();

        registry.database = Some(ElectionDb::open(&config.database.path)?);
        registry.register_database_tools();

        registry.search = Some(WebSearch::new(&config.search, Config::search_key()));
        registry.register_search_tools();

        Ok(registry)
    }

    fn register_leave_tools(&mut self) {
        self.register(ToolDefinition::function(
            "get_current_user",
            "Retrieve current user infos.",
            serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        ));

        self.register(ToolDefinition::function(
            "request_leave",
            "Request leave for current user.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "Current user id"
                    },
                    "full_name": {
                        "type": "string",
                        "description": "User full name"
                    },
                    "email": {
                        "type": "string",
                        "description": "User email"
                    },
                    "manager_email": {
                        "type": "string",
                        "description": "User manager email"
                    },
                    "start_date": {
                        "type": "string",
                        "description": "Leave start date"
                    },
                    "end_date": {
                        "type": "string",
                        "description": "Leave end date"
                    }
                },
                "required": ["user_id", "full_name", "email", "manager_email", "start_date", "end_date"]
            }),
        ));
    }

    fn register_database_tools(&mut self) {
        self.register(ToolDefinition::function(
            "list_tables",
            "Obtain the table names in the election database, which contains \
             candidates, polling stations and results. Always run this before \
             running other queries instead of assuming the user mentioned the \
             correct name.",
            serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        ));

        self.register(ToolDefinition::function(
            "describe_table",
            "Obtain the column names and types for a table in the election database.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "table": {
                        "type": "string",
                        "description": "The table to describe"
                    }
                },
                "required": ["table"]
            }),
        ));

        self.register(ToolDefinition::function(
            "run_query",
            "Run a SQL query against the election database.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The SQL query to run"
                    }
                },
                "required": ["query"]
            }),
        ));
    }

    fn register_search_tools(&mut self) {
        self.register(ToolDefinition::function(
            "web_search",
            "Perform a web search.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    }
                },
                "required": ["query"]
            }),
        ));
    }

    /// Register a tool definition
    pub fn register(&mut self, definition: ToolDefinition) {
        self.definitions
            .insert(definition.function.name.clone(), definition);
    }

    /// All registered tool definitions
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.values().cloned().collect()
    }

    /// Whether any tools are registered
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Execute a tool call
    ///
    /// Unknown tools and bad arguments are reported as failed results, not
    /// errors: the model reads the failure text and can correct itself.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        match call.name.as_str() {
            "get_current_user" => match &self.leave {
                Some(desk) => Ok(ToolResult::success(&call.name, desk.current_user())),
                None => Ok(Self::not_registered(&call.name)),
            },
            "request_leave" => match &self.leave {
                Some(desk) => {
                    let args: Vec<Option<String>> = [
                        "user_id",
                        "full_name",
                        "email",
                        "manager_email",
                        "start_date",
                        "end_date",
                    ]
                    .iter()
                    .map(|key| call.get_string(key))
                    .collect();

                    if args.iter().any(|a| a.is_none()) {
                        return Ok(ToolResult::failure(
                            &call.name,
                            "Missing required arguments for request_leave",
                        ));
                    }
                    let args: Vec<String> = args.into_iter().flatten().collect();

                    Ok(ToolResult::success(
                        &call.name,
                        desk.request_leave(
                            &args[0], &args[1], &args[2], &args[3], &args[4], &args[5],
                        ),
                    ))
                }
                None => Ok(Self::not_registered(&call.name)),
            },
            "list_tables" => match &self.database {
                Some(db) => Ok(Self::from_output(&call.name, db.list_tables())),
                None => Ok(Self::not_registered(&call.name)),
            },
            "describe_table" => match &self.database {
                Some(db) => match call.get_string("table") {
                    Some(table) => Ok(Self::from_output(&call.name, db.describe_table(&table))),
                    None => Ok(ToolResult::failure(&call.name, "Missing 'table' argument")),
                },
                None => Ok(Self::not_registered(&call.name)),
            },
            "run_query" => match &self.database {
                Some(db) => match call.get_string("query") {
                    Some(query) => Ok(Self::from_output(&call.name, db.run_query(&query))),
                    None => Ok(ToolResult::failure(&call.name, "Missing 'query' argument")),
                },
                None => Ok(Self::not_registered(&call.name)),
            },
            "web_search" => match &self.search {
                Some(search) => match call.get_string("query") {
                    Some(query) => Ok(Self::from_output(&call.name, search.search(&query).await)),
                    None => Ok(ToolResult::failure(&call.name, "Missing 'query' argument")),
                },
                None => Ok(Self::not_registered(&call.name)),
            },
            _ => Ok(ToolResult::failure(
                &call.name,
                format!("Unknown tool: {}", call.name),
            )),
        }
    }

    fn from_output(name: &str, output: Result<String>) -> ToolResult {
        match output {
            Ok(text) => ToolResult::success(name, text),
            Err(e) => ToolResult::failure(name, e.to_string()),
        }
    }

    fn not_registered(name: &str) -> ToolResult {
        ToolResult::failure(name, format!("Tool '{}' is not registered", name))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_registry() -> ToolRegistry {
        ToolRegistry::with_demo_plugins(&Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_demo_registry_exposes_all_plugins() {
        let registry = demo_registry();
        let names: Vec<String> = registry
            .definitions()
            .into_iter()
            .map(|d| d.function.name)
            .collect();

        for expected in [
            "get_current_user",
            "request_leave",
            "list_tables",
            "describe_table",
            "run_query",
            "web_search",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }

    #[tokio::test]
    async fn test_get_current_user_dispatch() {
        let registry = demo_registry();
        let result = registry
            .execute(&ToolCall::new("get_current_user", serde_json::json!({})))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("John Doe"));
    }

    #[tokio::test]
    async fn test_request_leave_requires_arguments() {
        let registry = demo_registry();
        let result = registry
            .execute(&ToolCall::new("request_leave", serde_json::json!({})))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("Missing"));
    }

    #[tokio::test]
    async fn test_sql_dispatch() {
        let registry = demo_registry();
        let result = registry
            .execute(&ToolCall::new("list_tables", serde_json::json!({})))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("candidates"));
    }

    #[tokio::test]
    async fn test_bad_query_is_a_failed_result() {
        let registry = demo_registry();
        let result = registry
            .execute(&ToolCall::new(
                "run_query",
                serde_json::json!({ "query": "SELECT * FROM nope" }),
            ))
            .await
            .unwrap();

        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_failed_result() {
        let registry = ToolRegistry::new();
        let result = registry
            .execute(&ToolCall::new("launch_rockets", serde_json::json!({})))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("Unknown tool"));
    }
}
