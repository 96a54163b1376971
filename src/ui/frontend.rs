/// Boundary to the rendering collaborator. The session core drives these
/// calls and owns no rendering logic itself.
///
/// The collaborator has no append primitive: `update` always receives the
/// full accumulated content of the placeholder, not a delta.
pub trait Frontend {
    /// Open a live display region for one in-progress assistant segment.
    fn create_placeholder(&mut self) -> PlaceholderId;

    /// Re-show the full content of a placeholder.
    fn update(&mut self, placeholder: PlaceholderId, content: &str);

    /// Transition a placeholder's display state. `expanded` controls whether
    /// a completed region stays fully visible.
    fn mark_status(&mut self, placeholder: PlaceholderId, status: PlaceholderStatus, expanded: bool);

    /// Block until the user submits a line, or `None` when the user quits.
    fn read_next_submitted_input(&mut self) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStatus {
    Streaming,
    Complete,
    Error,
}
