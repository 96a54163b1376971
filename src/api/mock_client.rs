use crate::api::client::{ByteStream, MockStreamProducer};
use crate::types::ToolOutput;
use anyhow::Result;
use bytes::Bytes;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted assistant API: each call to `next_stream` pops one pre-framed
/// SSE stream; submitted tool-output batches are recorded for assertion.
pub struct MockAssistantApi {
    streams: Mutex<VecDeque<Vec<String>>>,
    submitted: Mutex<Vec<(String, Vec<ToolOutput>)>>,
}

impl MockAssistantApi {
    pub fn new(streams: Vec<Vec<String>>) -> Arc<Self> {
        Arc::new(Self {
            streams: Mutex::new(streams.into()),
            submitted: Mutex::new(Vec::new()),
        })
    }

    pub fn submitted_batches(&self) -> Vec<(String, Vec<ToolOutput>)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl MockStreamProducer for MockAssistantApi {
    fn next_stream(&self) -> Result<ByteStream> {
        let mut streams = self.streams.lock().unwrap();
        let frames = streams
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("MockAssistantApi: no more streams scripted"))?;

        let chunks: Vec<Result<Bytes>> = frames
            .into_iter()
            .map(|frame| Ok(Bytes::from(frame)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }

    fn record_tool_outputs(&self, run_id: &str, outputs: &[ToolOutput]) {
        self.submitted
            .lock()
            .unwrap()
            .push((run_id.to_string(), outputs.to_vec()));
    }
}

/// Frame one SSE event. Chunk boundaries are the caller's concern; a frame
/// may be split across chunks to exercise parser buffering.
pub fn sse_frame(event: &str, data: &str) -> String {
    format!("event: {event}\ndata: {data}\n\n")
}

pub fn message_created_frame() -> String {
    sse_frame(
        "thread.message.created",
        r#"{"id":"msg_1","role":"assistant","content":[]}"#,
    )
}

pub fn message_delta_frame(text: &str) -> String {
    let data = serde_json::json!({
        "id": "msg_1",
        "delta": {
            "content": [
                {"index": 0, "type": "text", "text": {"value": text}}
            ]
        }
    });
    sse_frame("thread.message.delta", &data.to_string())
}

pub fn message_completed_frame(text: &str) -> String {
    let data = serde_json::json!({
        "id": "msg_1",
        "role": "assistant",
        "content": [
            {"type": "text", "text": {"value": text, "annotations": []}}
        ]
    });
    sse_frame("thread.message.completed", &data.to_string())
}

pub fn requires_action_frame(run_id: &str, calls: &[(&str, &str, &str)]) -> String {
    let tool_calls: Vec<serde_json::Value> = calls
        .iter()
        .map(|(id, name, arguments)| {
            serde_json::json!({
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": arguments}
            })
        })
        .collect();
    let data = serde_json::json!({
        "id": run_id,
        "thread_id": "thread_mock",
        "status": "requires_action",
        "required_action": {
            "type": "submit_tool_outputs",
            "submit_tool_outputs": {"tool_calls": tool_calls}
        }
    });
    sse_frame("thread.run.requires_action", &data.to_string())
}

pub fn run_completed_frame(run_id: &str) -> String {
    let data = serde_json::json!({
        "id": run_id,
        "thread_id": "thread_mock",
        "status": "completed"
    });
    sse_frame("thread.run.completed", &data.to_string())
}

pub fn run_failed_frame(run_id: &str, message: &str) -> String {
    let data = serde_json::json!({
        "id": run_id,
        "thread_id": "thread_mock",
        "status": "failed",
        "last_error": {"code": "server_error", "message": message}
    });
    sse_frame("thread.run.failed", &data.to_string())
}

pub fn done_frame() -> String {
    "event: done\ndata: [DONE]\n\n".to_string()
}
