use crate::state::{SlotId, TranscriptStore};
use crate::tools::ToolRegistry;
use crate::types::{StreamEvent, ToolCallRequest, ToolOutput, ToolOutputPayload};
use crate::ui::{Frontend, PlaceholderId, PlaceholderStatus};
use anyhow::{bail, Result};

/// State of the router across one run (and its nested resumption runs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterPhase {
    Idle,
    StreamingText,
    AwaitingToolOutputs,
    Done,
}

/// What the caller must do after routing one event.
#[derive(Debug, PartialEq, Eq)]
pub enum RouterAction {
    Continue,
    /// Submit the batch atomically and enqueue the nested stream.
    SubmitOutputs {
        run_id: String,
        outputs: Vec<ToolOutput>,
    },
    Finished,
}

/// Routes stream events for one run: text events mutate the transcript and
/// the live render placeholder, requires-action events dispatch to the tool
/// registry. Owns the open slot for the duration of the run.
pub struct EventRouter<'a, F: Frontend> {
    transcript: &'a mut TranscriptStore,
    registry: &'a ToolRegistry,
    frontend: &'a mut F,
    phase: RouterPhase,
    current: Option<(SlotId, PlaceholderId)>,
}

impl<'a, F: Frontend> EventRouter<'a, F> {
    pub fn new(
        transcript: &'a mut TranscriptStore,
        registry: &'a ToolRegistry,
        frontend: &'a mut F,
    ) -> Self {
        Self {
            transcript,
            registry,
            frontend,
            phase: RouterPhase::Idle,
            current: None,
        }
    }

    pub fn phase(&self) -> RouterPhase {
        self.phase
    }

    /// The nested stream for a submitted batch is open; text events follow.
    pub fn nested_stream_opened(&mut self) {
        if self.phase == RouterPhase::AwaitingToolOutputs {
            self.phase = RouterPhase::StreamingText;
        }
    }

    pub fn route(&mut self, event: StreamEvent) -> Result<RouterAction> {
        match event {
            StreamEvent::TextCreated => {
                // A segment may start without a prior close; supersession
                // handles that idempotently.
                self.open_segment()?;
                Ok(RouterAction::Continue)
            }
            StreamEvent::TextDelta { value } => {
                if value.is_empty() {
                    return Ok(RouterAction::Continue);
                }
                if self.current.is_none() {
                    self.open_segment()?;
                }
                let (slot, placeholder) = self.current.expect("segment just opened");
                self.transcript.write(slot, &value)?;
                // The collaborator has no append primitive; re-show the
                // whole accumulated segment on every fragment.
                let full = self
                    .transcript
                    .slot_text(slot)
                    .unwrap_or_default()
                    .to_string();
                self.frontend.update(placeholder, &full);
                Ok(RouterAction::Continue)
            }
            StreamEvent::TextCompleted { value } => {
                if self.current.is_none() {
                    self.open_segment()?;
                }
                let (slot, _) = self.current.expect("segment just opened");
                // Resumption streams may deliver only the completed event;
                // fall back to its full text when nothing was accumulated.
                if self.transcript.slot_text(slot).is_some_and(str::is_empty) && !value.is_empty() {
                    self.transcript.write(slot, &value)?;
                }
                self.close_segment()?;
                Ok(RouterAction::Continue)
            }
            StreamEvent::RunRequiresAction { run_id, tool_calls } => {
                self.close_segment()?;
                self.phase = RouterPhase::AwaitingToolOutputs;
                let outputs = self.collect_outputs(&tool_calls);
                Ok(RouterAction::SubmitOutputs { run_id, outputs })
            }
            StreamEvent::RunCompleted { .. } => {
                self.close_segment()?;
                self.phase = RouterPhase::Done;
                Ok(RouterAction::Finished)
            }
            StreamEvent::RunFailed { run_id, message } => {
                if let Some((_, placeholder)) = self.current.take() {
                    self.frontend
                        .mark_status(placeholder, PlaceholderStatus::Error, true);
                }
                bail!(
                    "run {run_id} failed: {}",
                    message.unwrap_or_else(|| "no error detail from remote".to_string())
                );
            }
        }
    }

    /// One output per call, input order preserved. A failing call is
    /// reported as a per-call error output and never aborts the batch.
    fn collect_outputs(&self, tool_calls: &[ToolCallRequest]) -> Vec<ToolOutput> {
        tool_calls
            .iter()
            .map(|call| {
                let payload = match self.registry.invoke(&call.name, &call.arguments) {
                    Ok(output) => ToolOutputPayload::Output(output),
                    Err(error) => ToolOutputPayload::Error(error.to_string()),
                };
                ToolOutput {
                    tool_call_id: call.id.clone(),
                    payload,
                }
            })
            .collect()
    }

    fn open_segment(&mut self) -> Result<()> {
        self.close_segment()?;
        let slot = self.transcript.open_slot();
        let placeholder = self.frontend.create_placeholder();
        self.current = Some((slot, placeholder));
        self.phase = RouterPhase::StreamingText;
        Ok(())
    }

    fn close_segment(&mut self) -> Result<()> {
        if let Some((slot, placeholder)) = self.current.take() {
            self.transcript.close(slot)?;
            self.frontend
                .mark_status(placeholder, PlaceholderStatus::Complete, true);
        }
        Ok(())
    }
}
