mod chat;
mod router;


pub use chat::ChatSession;
pub use router::{EventRouter, RouterAction, RouterPhase};
