mod transcript;

pub use transcript::{Role, SlotId, SlotStatus, StaleSlotError, TranscriptStore, Turn};
