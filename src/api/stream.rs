use super::logging::emit_sse_parse_error;
use crate::types::{MessageDeltaObject, MessageObject, RunObject, StreamEvent};
use anyhow::Result;

/// Incremental SSE parser for one run stream. Buffers partial frames across
/// chunk boundaries and maps named events to the unified `StreamEvent` type.
#[derive(Default)]
pub struct StreamParser {
    buffer: String,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let mut events = Vec::new();
        let mut start = 0;

        while let Some(end) = self.buffer[start..].find("\n\n") {
            let frame_end = start + end + 2;
            let frame = &self.buffer[start..frame_end];

            let mut event_name = None;
            let mut data = None;

            for line in frame.lines() {
                if let Some(rest) = line.strip_prefix("event: ") {
                    event_name = Some(rest.trim().to_string());
                } else if let Some(rest) = line.strip_prefix("data: ") {
                    data = Some(rest.trim().to_string());
                }
            }

            if let (Some(name), Some(json_data)) = (event_name, data) {
                if json_data != "[DONE]" {
                    if let Some(event) = map_event(&name, &json_data) {
                        events.push(event);
                    }
                }
            }

            start = frame_end;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }

        Ok(events)
    }

    pub fn flush(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

/// Map one named frame to a `StreamEvent`. Lifecycle events the router does
/// not consume (queued, in-progress, step events, ...) yield `None`.
fn map_event(name: &str, json_data: &str) -> Option<StreamEvent> {
    match name {
        "thread.message.created" => Some(StreamEvent::TextCreated),
        "thread.message.delta" => {
            let delta = parse_payload::<MessageDeltaObject>(name, json_data)?;
            Some(StreamEvent::TextDelta {
                value: delta.text(),
            })
        }
        "thread.message.completed" => {
            let message = parse_payload::<MessageObject>(name, json_data)?;
            Some(StreamEvent::TextCompleted {
                value: message.text(),
            })
        }
        "thread.run.requires_action" => {
            let run = parse_payload::<RunObject>(name, json_data)?;
            let tool_calls = run.tool_calls();
            if tool_calls.is_empty() {
                return None;
            }
            Some(StreamEvent::RunRequiresAction {
                run_id: run.id,
                tool_calls,
            })
        }
        "thread.run.completed" => {
            let run = parse_payload::<RunObject>(name, json_data)?;
            Some(StreamEvent::RunCompleted { run_id: run.id })
        }
        "thread.run.failed" | "thread.run.cancelled" | "thread.run.expired" => {
            let run = parse_payload::<RunObject>(name, json_data)?;
            let message = run.error_message();
            Some(StreamEvent::RunFailed {
                run_id: run.id,
                message,
            })
        }
        _ => None,
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(name: &str, json_data: &str) -> Option<T> {
    match serde_json::from_str::<T>(json_data) {
        Ok(value) => Some(value),
        Err(error) => {
            emit_sse_parse_error(Some(name), json_data, &error);
            None
        }
    }
}
