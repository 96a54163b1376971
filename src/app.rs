use crate::api::AssistantClient;
use crate::config::Config;
use crate::session::ChatSession;
use crate::tools::ToolRegistry;
use crate::ui::Frontend;
use crate::ui::TuiFrontend;
use anyhow::Result;

/// Top-level application: one chat session driven by the terminal frontend.
pub struct App {
    session: ChatSession,
    frontend: TuiFrontend,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let client = AssistantClient::new(config);
        let session = ChatSession::new(client, ToolRegistry::new());
        let frontend = TuiFrontend::new()?;
        Ok(Self { session, frontend })
    }

    /// Blocks on the input editor, runs each submitted message as one turn,
    /// and loops until the user quits (Esc, Ctrl-C, or Ctrl-D).
    pub async fn run(&mut self) -> Result<()> {
        self.frontend
            .set_status("ready - Enter sends, Alt+Enter inserts a newline, Esc quits");

        while let Some(input) = self.frontend.read_next_submitted_input() {
            self.frontend.set_status("streaming...");

            match self.session.send(input, &mut self.frontend).await {
                Ok(_) => {
                    let status = match self.session.thread_id() {
                        Some(thread_id) => format!("ready - thread {thread_id}"),
                        None => "ready".to_string(),
                    };
                    self.frontend.set_status(status);
                }
                Err(error) => {
                    // A failed turn leaves the session usable; show the
                    // error in the transcript and keep accepting input.
                    self.frontend.push_error(format!("{error:#}"));
                    self.frontend.set_status("ready - last turn failed");
                }
            }
        }

        Ok(())
    }
}
