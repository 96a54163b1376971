use super::router::{EventRouter, RouterAction, RouterPhase};
use crate::api::{AssistantClient, ByteStream, StreamParser};
use crate::state::{Role, TranscriptStore, Turn};
use crate::tools::ToolRegistry;
use crate::ui::Frontend;
use anyhow::{bail, Result};
use futures::StreamExt;
use std::collections::VecDeque;

/// One conversation against one remote thread. The thread is created on the
/// first turn and reused for the session's whole lifetime.
pub struct ChatSession {
    client: AssistantClient,
    registry: ToolRegistry,
    transcript: TranscriptStore,
    thread_id: Option<String>,
}

impl ChatSession {
    pub fn new(client: AssistantClient, registry: ToolRegistry) -> Self {
        Self {
            client,
            registry,
            transcript: TranscriptStore::new(),
            thread_id: None,
        }
    }

    pub fn history(&self) -> Vec<Turn> {
        self.transcript.history()
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Run one user turn to completion: post the message, open the run
    /// stream, and drive the router until the run completes. Nested
    /// tool-output streams are fully drained before this returns.
    pub async fn send<F: Frontend>(&mut self, user_text: String, frontend: &mut F) -> Result<String> {
        self.transcript
            .append_turn(Role::User, user_text.clone());

        let thread_id = match &self.thread_id {
            Some(id) => id.clone(),
            None => {
                let id = self.client.create_thread().await?;
                self.thread_id = Some(id.clone());
                id
            }
        };
        self.client.create_message(&thread_id, &user_text).await?;

        let tools = self.registry.describe();
        let first_stream = self.client.create_run_stream(&thread_id, &tools).await?;

        let client = &self.client;
        let registry = &self.registry;
        let mut router = EventRouter::new(&mut self.transcript, registry, frontend);

        // Nested resumption streams go through an explicit queue rather
        // than call-stack recursion, so the drain depth stays bounded.
        let mut pending: VecDeque<ByteStream> = VecDeque::new();
        pending.push_back(first_stream);

        while let Some(mut stream) = pending.pop_front() {
            let mut parser = StreamParser::new();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                for event in parser.process(&chunk)? {
                    match router.route(event)? {
                        RouterAction::Continue | RouterAction::Finished => {}
                        RouterAction::SubmitOutputs { run_id, outputs } => {
                            let nested = client
                                .submit_tool_outputs_stream(&thread_id, &run_id, &outputs)
                                .await?;
                            pending.push_back(nested);
                            router.nested_stream_opened();
                        }
                    }
                }
            }
        }

        if router.phase() != RouterPhase::Done {
            bail!("stream ended before the run completed");
        }
        drop(router);

        Ok(self.transcript.last_assistant_text().unwrap_or_default())
    }
}
