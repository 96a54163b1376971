use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Immutable once appended; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Identity of a render slot for the duration of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Open,
    Complete,
}

/// A write landed on a slot that is no longer the open one. This is a router
/// invariant violation and is fatal to the run, not silently swallowed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("stale render slot {slot}: open slot is {open:?}")]
pub struct StaleSlotError {
    pub slot: usize,
    pub open: Option<usize>,
}

#[derive(Debug)]
struct RenderSlot {
    text: String,
    status: SlotStatus,
}

/// Ordered log of turns plus the at-most-one open incremental render slot.
///
/// Invariant: the number of slots with status `Open` is 0 or 1. Opening a
/// new slot supersedes (closes) the previous one first.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    turns: Vec<Turn>,
    slots: Vec<RenderSlot>,
    open: Option<usize>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_turn(&mut self, role: Role, text: String) {
        self.turns.push(Turn { role, text });
    }

    /// Turns in arrival order. Snapshot, not a live view.
    pub fn history(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn last_assistant_text(&self) -> Option<String> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == Role::Assistant)
            .map(|turn| turn.text.clone())
    }

    /// Open a fresh slot, closing any previously open one first.
    pub fn open_slot(&mut self) -> SlotId {
        self.close_open_slot();
        let index = self.slots.len();
        self.slots.push(RenderSlot {
            text: String::new(),
            status: SlotStatus::Open,
        });
        self.open = Some(index);
        SlotId(index)
    }

    /// Append `fragment` to the currently open slot. Writing to any other
    /// slot is an error.
    pub fn write(&mut self, slot: SlotId, fragment: &str) -> Result<(), StaleSlotError> {
        if self.open != Some(slot.0) {
            return Err(StaleSlotError {
                slot: slot.0,
                open: self.open,
            });
        }
        self.slots[slot.0].text.push_str(fragment);
        Ok(())
    }

    /// Full accumulated text of a slot, open or complete.
    pub fn slot_text(&self, slot: SlotId) -> Option<&str> {
        self.slots.get(slot.0).map(|s| s.text.as_str())
    }

    pub fn slot_status(&self, slot: SlotId) -> Option<SlotStatus> {
        self.slots.get(slot.0).map(|s| s.status)
    }

    pub fn open_slot_id(&self) -> Option<SlotId> {
        self.open.map(SlotId)
    }

    /// Mark `slot` complete and record its accumulated text as an assistant
    /// turn. Closing a slot that never received text records no turn.
    /// Returns the accumulated text.
    pub fn close(&mut self, slot: SlotId) -> Result<String, StaleSlotError> {
        if self.open != Some(slot.0) {
            return Err(StaleSlotError {
                slot: slot.0,
                open: self.open,
            });
        }
        Ok(self.complete_slot(slot.0))
    }

    fn close_open_slot(&mut self) {
        if let Some(index) = self.open {
            self.complete_slot(index);
        }
    }

    fn complete_slot(&mut self, index: usize) -> String {
        self.open = None;
        let slot = &mut self.slots[index];
        slot.status = SlotStatus::Complete;
        let text = slot.text.clone();
        if !text.is_empty() {
            self.append_turn(Role::Assistant, text.clone());
        }
        text
    }
}
