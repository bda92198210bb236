use std::future::ready;

use quickstart_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};

/// Input of [`AddTodoTool`].
#[derive(Deserialize, JsonSchema)]
pub struct AddTodoParameters {
    #[schemars(description = "The content of the todo item")]
    content: String,
    #[schemars(
        description = "The started time of the todo item, in unix timestamp"
    )]
    #[serde(default)]
    started_at: Option<i64>,
    #[schemars(
        description = "The deadline of the todo item, in unix timestamp"
    )]
    #[serde(default)]
    deadline: Option<i64>,
}

/// A tool for adding a todo item.
///
/// There is no storage behind it yet, the item is only logged.
pub struct AddTodoTool {
    parameter_schema: Value,
}

impl AddTodoTool {
    /// Creates a new add todo tool.
    #[inline]
    pub fn new() -> Self {
        AddTodoTool {
            parameter_schema: schema_for!(AddTodoParameters).to_value(),
        }
    }
}

impl Default for AddTodoTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for AddTodoTool {
    type Input = AddTodoParameters;

    fn name(&self) -> &str {
        "add_todo"
    }

    fn description(&self) -> &str {
        "Add a todo item"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: AddTodoParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        if input.content.trim().is_empty() {
            return ready(Err(
                ToolError::invalid_input().with_reason("`content` is empty")
            ));
        }
        info!(
            started_at = input.started_at,
            deadline = input.deadline,
            "add todo: {}",
            input.content
        );
        ready(Ok(json!({ "msg": "add todo success" }).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use quickstart_core::tool::ErrorKind as ToolErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_add_todo() {
        let tool = AddTodoTool::new();
        let output = tool
            .execute(AddTodoParameters {
                content: "Learn the chain API".to_owned(),
                started_at: None,
                deadline: Some(1717488000),
            })
            .await
            .unwrap();
        let output: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(output, json!({ "msg": "add todo success" }));
    }

    #[tokio::test]
    async fn test_empty_content() {
        let input: AddTodoParameters =
            serde_json::from_value(json!({ "content": "  " })).unwrap();
        let err = AddTodoTool::new().execute(input).await.unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::InvalidInput);
    }

    #[test]
    fn test_schema() {
        let schema = AddTodoTool::new().parameter_schema().clone();
        assert_eq!(schema["required"], json!(["content"]));
        assert_eq!(schema["properties"]["content"]["type"], "string");
        assert_eq!(
            schema["properties"]["deadline"]["description"],
            "The deadline of the todo item, in unix timestamp"
        );
    }
}
