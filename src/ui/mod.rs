mod frontend;
pub mod input_metrics;
mod render;
mod terminal;
mod tui;

pub use frontend::{Frontend, PlaceholderId, PlaceholderStatus};
pub use tui::TuiFrontend;
