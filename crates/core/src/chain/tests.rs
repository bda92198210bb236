use std::future::ready;

use quickstart_model::{ErrorKind, ToolCallRequest, ToolCallResult};
use quickstart_test_model::{PresetEvent, PresetResponse, TestModelProvider};
use serde::Deserialize;
use serde_json::{Value, json};

use super::*;
use crate::tool::{Tool, ToolResult};

#[derive(Deserialize)]
struct AddInput {
    a: i64,
    b: i64,
}

struct AddTool {
    schema: Value,
}

impl AddTool {
    fn new() -> Self {
        Self {
            schema: json!({
                "type": "object",
                "properties": {
                    "a": { "type": "integer" },
                    "b": { "type": "integer" }
                },
                "required": ["a", "b"]
            }),
        }
    }
}

impl Tool for AddTool {
    type Input = AddInput;

    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Adds two integers"
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok((input.a + input.b).to_string()))
    }
}

fn add_call(id: &str, a: i64, b: i64) -> PresetEvent {
    PresetEvent::ToolCall(ToolCallRequest {
        id: id.to_owned(),
        name: "add".to_owned(),
        arguments: json!({ "a": a, "b": b }),
    })
}

fn scripted_provider(events: Vec<PresetEvent>) -> TestModelProvider {
    let mut provider = TestModelProvider::default();
    provider.add_user_input_step();
    provider.add_assistant_response_step(PresetResponse::with_events(events));
    provider
}

fn user(text: &str) -> Vec<ModelMessage> {
    vec![ModelMessage::User(text.to_owned())]
}

#[tokio::test]
async fn test_invoke() {
    let provider = scripted_provider(vec![
        PresetEvent::MessageDelta("Adding.".to_owned()),
        add_call("call_1", 1, 2),
        add_call("call_2", 40, 2),
    ]);
    let chain = Chain::new()
        .append_chat_model("model", provider)
        .append_tools_node("tools", ToolsNode::new().with_tool(AddTool::new()))
        .compile()
        .unwrap();
    assert_eq!(chain.tools().len(), 1);
    assert_eq!(chain.tools()[0].name, "add");

    let output = chain.invoke(user("What are 1+2 and 40+2?")).await.unwrap();
    assert_eq!(
        output,
        vec![
            ModelMessage::Tool(ToolCallResult {
                id: "call_1".to_owned(),
                name: "add".to_owned(),
                content: "3".to_owned(),
            }),
            ModelMessage::Tool(ToolCallResult {
                id: "call_2".to_owned(),
                name: "add".to_owned(),
                content: "42".to_owned(),
            }),
        ]
    );
}

#[tokio::test]
async fn test_invoke_without_tool_calls() {
    let provider =
        scripted_provider(vec![PresetEvent::MessageDelta("Hi!".to_owned())]);
    let chain = Chain::new()
        .append_chat_model("model", provider)
        .append_tools_node("tools", ToolsNode::new().with_tool(AddTool::new()))
        .compile()
        .unwrap();

    let output = chain.invoke(user("Hello")).await.unwrap();
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_model_error() {
    // No assistant step for this conversation length.
    let chain = Chain::new()
        .append_chat_model("model", TestModelProvider::default())
        .append_tools_node("tools", ToolsNode::new())
        .compile()
        .unwrap();

    let err = chain.invoke(user("Hello")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Model {
            kind: ErrorKind::RateLimitExceeded,
            ..
        }
    ));
}

#[tokio::test]
async fn test_unregistered_tool() {
    let provider = scripted_provider(vec![add_call("call_1", 1, 1)]);
    let chain = Chain::new()
        .append_chat_model("model", provider)
        .append_tools_node("tools", ToolsNode::new())
        .compile()
        .unwrap();

    let err = chain.invoke(user("1+1?")).await.unwrap_err();
    assert!(matches!(err, Error::ToolNotFound(name) if name == "add"));
}

#[test]
fn test_compile_errors() {
    let err = Chain::new().compile().err().unwrap();
    assert!(matches!(err, Error::MissingNode(CHAT_MODEL)));

    let err = Chain::new()
        .append_chat_model("model", TestModelProvider::default())
        .compile()
        .err()
        .unwrap();
    assert!(matches!(err, Error::MissingNode(TOOLS)));

    let err = Chain::new()
        .append_tools_node("tools", ToolsNode::new())
        .append_chat_model("model", TestModelProvider::default())
        .compile()
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidNodeOrder { node, .. } if node == "tools"));

    let err = Chain::new()
        .append_chat_model("model", TestModelProvider::default())
        .append_chat_model("other", TestModelProvider::default())
        .compile()
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidNodeOrder { node, .. } if node == "other"));

    let err = Chain::new()
        .append_chat_model("model", TestModelProvider::default())
        .append_tools_node("tools", ToolsNode::new())
        .append_tools_node("more_tools", ToolsNode::new())
        .compile()
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidNodeOrder { node, .. } if node == "more_tools"));

    let err = Chain::new()
        .append_chat_model("node", TestModelProvider::default())
        .append_tools_node("node", ToolsNode::new())
        .compile()
        .err()
        .unwrap();
    assert!(matches!(err, Error::DuplicateNode(name) if name == "node"));
}
