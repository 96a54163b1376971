mod api;

pub use api::{
    MessageDeltaObject, MessageObject, RunObject, StreamEvent, ToolCallRequest,
    ToolOutput, ToolOutputPayload,
};
