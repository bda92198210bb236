use std::future::ready;

use quickstart_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};

/// Input of [`UpdateTodoTool`]. Fields left out are not changed.
#[derive(Deserialize, JsonSchema)]
pub struct UpdateTodoParameters {
    #[schemars(description = "id of the todo")]
    id: String,
    #[schemars(description = "content of the todo")]
    #[serde(default)]
    content: Option<String>,
    #[schemars(description = "start time in unix timestamp")]
    #[serde(default)]
    started_at: Option<i64>,
    #[schemars(description = "deadline of the todo in unix timestamp")]
    #[serde(default)]
    deadline: Option<i64>,
    #[schemars(description = "done status")]
    #[serde(default)]
    done: Option<bool>,
}

/// A tool for updating a todo item.
pub struct UpdateTodoTool {
    parameter_schema: Value,
}

impl UpdateTodoTool {
    /// Creates a new update todo tool.
    #[inline]
    pub fn new() -> Self {
        UpdateTodoTool {
            parameter_schema: schema_for!(UpdateTodoParameters).to_value(),
        }
    }
}

impl Default for UpdateTodoTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for UpdateTodoTool {
    type Input = UpdateTodoParameters;

    fn name(&self) -> &str {
        "update_todo"
    }

    fn description(&self) -> &str {
        "Update a todo item, eg: content,deadline..."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: UpdateTodoParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        if input.id.trim().is_empty() {
            return ready(Err(
                ToolError::invalid_input().with_reason("`id` is empty")
            ));
        }
        info!(
            content = input.content.as_deref(),
            started_at = input.started_at,
            deadline = input.deadline,
            done = input.done,
            "update todo {}",
            input.id
        );
        ready(Ok(json!({ "msg": "update todo success" }).to_string()))
    }
}
