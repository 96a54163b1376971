use serde::{Deserialize, Serialize};

/// Unified stream event for one run, produced by the SSE parser.
///
/// The wire protocol tags frames with an `event:` name rather than a `type`
/// field inside the payload, so the parser maps names to variants and only
/// the payload bodies are deserialized.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A new assistant text segment began.
    TextCreated,
    /// An incremental fragment of the current text segment.
    TextDelta { value: String },
    /// The current text segment finished; `value` is the full text.
    TextCompleted { value: String },
    /// The run is paused until tool outputs are submitted.
    RunRequiresAction {
        run_id: String,
        tool_calls: Vec<ToolCallRequest>,
    },
    /// The run finished with no further action required.
    RunCompleted { run_id: String },
    /// The run terminated abnormally (failed, cancelled, expired).
    RunFailed {
        run_id: String,
        message: Option<String>,
    },
}

/// One function call requested by the remote run. Consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// Raw JSON-string arguments, parsed by the registry on invocation.
    pub arguments: String,
}

/// One entry of a submit-tool-outputs batch. Serializes to either
/// `{"tool_call_id": .., "output": ..}` or `{"tool_call_id": .., "error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    #[serde(flatten)]
    pub payload: ToolOutputPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutputPayload {
    Output(String),
    Error(String),
}

// Wire payloads below follow the remote collaborator's object shapes; only
// the fields the router consumes are modeled.

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeltaObject {
    pub delta: MessageDelta,
}

impl MessageDeltaObject {
    /// Concatenated text of all text-typed delta parts, in index order as
    /// delivered.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.delta.content {
            if let MessageDeltaContent::Text { text } = part {
                if let Some(value) = &text.value {
                    out.push_str(value);
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDelta {
    #[serde(default)]
    pub content: Vec<MessageDeltaContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageDeltaContent {
    Text { text: TextValue },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageObject {
    pub id: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl MessageObject {
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.content {
            if let MessageContent::Text { text } = part {
                if let Some(value) = &text.value {
                    out.push_str(value);
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextValue },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl RunObject {
    /// Tool calls of a `submit_tool_outputs` required action, in the order
    /// the remote side delivered them.
    pub fn tool_calls(&self) -> Vec<ToolCallRequest> {
        let Some(action) = &self.required_action else {
            return Vec::new();
        };
        if action.action_type != "submit_tool_outputs" {
            return Vec::new();
        }

        action
            .submit_tool_outputs
            .tool_calls
            .iter()
            .map(|call| ToolCallRequest {
                id: call.id.clone(),
                name: call.function.name.clone(),
                arguments: call.function.arguments.clone(),
            })
            .collect()
    }

    pub fn error_message(&self) -> Option<String> {
        self.last_error.as_ref().and_then(|e| e.message.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequiredAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitToolOutputs {
    #[serde(default)]
    pub tool_calls: Vec<RawToolCall>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawToolCall {
    pub id: String,
    pub function: RawFunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_output_serializes_output_and_error_keys() {
        let ok = ToolOutput {
            tool_call_id: "call_1".to_string(),
            payload: ToolOutputPayload::Output("6000".to_string()),
        };
        let failed = ToolOutput {
            tool_call_id: "call_2".to_string(),
            payload: ToolOutputPayload::Error("bad revenue".to_string()),
        };

        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"tool_call_id": "call_1", "output": "6000"})
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"tool_call_id": "call_2", "error": "bad revenue"})
        );
    }

    #[test]
    fn test_run_object_extracts_tool_calls_in_order() {
        let run: RunObject = serde_json::from_value(json!({
            "id": "run_1",
            "thread_id": "thread_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [
                        {"id": "call_a", "type": "function",
                         "function": {"name": "calculate_tax", "arguments": "{\"revenue\":\"50000\"}"}},
                        {"id": "call_b", "type": "function",
                         "function": {"name": "calculate_tax", "arguments": "{\"revenue\":\"abc\"}"}}
                    ]
                }
            }
        }))
        .expect("run object should parse");

        let calls = run.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[1].id, "call_b");
        assert_eq!(calls[0].name, "calculate_tax");
        assert_eq!(calls[0].arguments, "{\"revenue\":\"50000\"}");
    }

    #[test]
    fn test_message_delta_concatenates_text_parts() {
        let delta: MessageDeltaObject = serde_json::from_value(json!({
            "id": "msg_1",
            "delta": {
                "content": [
                    {"index": 0, "type": "text", "text": {"value": "Tax ", "annotations": []}},
                    {"index": 0, "type": "text", "text": {"value": "is 2000"}}
                ]
            }
        }))
        .expect("delta object should parse");

        assert_eq!(delta.text(), "Tax is 2000");
    }

    #[test]
    fn test_unknown_content_parts_are_tolerated() {
        let message: MessageObject = serde_json::from_value(json!({
            "id": "msg_1",
            "content": [
                {"type": "image_file", "image_file": {"file_id": "file_1"}},
                {"type": "text", "text": {"value": "hello", "annotations": []}}
            ]
        }))
        .expect("message with unknown parts should parse");

        assert_eq!(message.text(), "hello");
    }
}
