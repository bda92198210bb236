use std::future::ready;

use quickstart_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};

/// Input of [`ListTodoTool`].
#[derive(Deserialize, JsonSchema)]
pub struct ListTodoParameters {
    #[schemars(description = "filter todo items if finished")]
    #[serde(default)]
    finished: Option<bool>,
}

/// A tool for listing todo items.
///
/// Answers from a fixed sample list.
pub struct ListTodoTool {
    parameter_schema: Value,
}

impl ListTodoTool {
    /// Creates a new list todo tool.
    #[inline]
    pub fn new() -> Self {
        ListTodoTool {
            parameter_schema: schema_for!(ListTodoParameters).to_value(),
        }
    }
}

impl Default for ListTodoTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ListTodoTool {
    type Input = ListTodoParameters;

    fn name(&self) -> &str {
        "list_todo"
    }

    fn description(&self) -> &str {
        "List all todo items"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: ListTodoParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        info!(finished = input.finished, "list todo");
        let todos: Vec<Value> = sample_todos()
            .into_iter()
            .filter(|todo| match input.finished {
                Some(finished) => todo["done"] == finished,
                None => true,
            })
            .collect();
        ready(Ok(json!({ "todos": todos }).to_string()))
    }
}

fn sample_todos() -> Vec<Value> {
    vec![json!({
        "id": "1",
        "content": "Finish the chain framework demo slides before 2024-12-10",
        "started_at": 1717401600,
        "deadline": 1717488000,
        "done": false,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_todo() {
        let output = ListTodoTool::new()
            .execute(ListTodoParameters { finished: None })
            .await
            .unwrap();
        let output: Value = serde_json::from_str(&output).unwrap();
        let todos = output["todos"].as_array().unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0]["id"], "1");
        assert_eq!(todos[0]["done"], false);
    }

    #[tokio::test]
    async fn test_finished_filter() {
        let tool = ListTodoTool::new();
        let output = tool
            .execute(ListTodoParameters {
                finished: Some(true),
            })
            .await
            .unwrap();
        let output: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(output, json!({ "todos": [] }));

        let output = tool
            .execute(ListTodoParameters {
                finished: Some(false),
            })
            .await
            .unwrap();
        let output: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(output["todos"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_arguments() {
        let input: ListTodoParameters =
            serde_json::from_value(json!({})).unwrap();
        assert!(input.finished.is_none());
    }
}
