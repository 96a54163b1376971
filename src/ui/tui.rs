use super::frontend::{Frontend, PlaceholderId, PlaceholderStatus};
use super::input_metrics::clamp_to_char_boundary_left;
use super::render::{
    input_visual_rows, render_history, render_input, render_status_line, render_title,
    split_chat_layout, TranscriptKind, TranscriptLine,
};
use super::terminal::{self, TerminalType};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(250);
const MAX_INPUT_ROWS: u16 = 5;

/// Terminal implementation of the rendering collaborator: a scrolling
/// transcript pane, a wrapping input editor, and a status line.
pub struct TuiFrontend {
    terminal: TerminalType,
    entries: Vec<TranscriptLine>,
    /// Placeholder id -> index into `entries`.
    placeholders: Vec<usize>,
    input: String,
    cursor_byte: usize,
    status: String,
}

impl TuiFrontend {
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: terminal::setup()?,
            entries: Vec::new(),
            placeholders: Vec::new(),
            input: String::new(),
            cursor_byte: 0,
            status: String::new(),
        })
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.draw();
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.entries.push(TranscriptLine {
            kind: TranscriptKind::Error,
            content: message.into(),
        });
        self.draw();
    }

    fn draw(&mut self) {
        let Self {
            terminal,
            entries,
            input,
            cursor_byte,
            status,
            ..
        } = self;

        let _ = terminal.draw(|frame| {
            let area = frame.area();
            let input_width = area.width.saturating_sub(2).max(1) as usize;
            let input_rows = (input_visual_rows(input, input_width) as u16).min(MAX_INPUT_ROWS);
            let layout = split_chat_layout(area, input_rows);

            render_title(frame, layout.title);
            render_history(frame, layout.history, entries);
            render_input(frame, layout.input, input, *cursor_byte);
            render_status_line(frame, layout.status, status);
        });
    }

    fn insert_char(&mut self, ch: char) {
        self.input.insert(self.cursor_byte, ch);
        self.cursor_byte += ch.len_utf8();
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor_byte == 0 {
            return;
        }
        let previous = clamp_to_char_boundary_left(&self.input, self.cursor_byte - 1);
        self.input.drain(previous..self.cursor_byte);
        self.cursor_byte = previous;
    }

    fn move_cursor_left(&mut self) {
        if self.cursor_byte > 0 {
            self.cursor_byte = clamp_to_char_boundary_left(&self.input, self.cursor_byte - 1);
        }
    }

    fn move_cursor_right(&mut self) {
        if self.cursor_byte < self.input.len() {
            let mut next = self.cursor_byte + 1;
            while next < self.input.len() && !self.input.is_char_boundary(next) {
                next += 1;
            }
            self.cursor_byte = next;
        }
    }

    fn take_submitted_input(&mut self) -> Option<String> {
        let submitted = self.input.trim().to_string();
        if submitted.is_empty() {
            return None;
        }
        self.input.clear();
        self.cursor_byte = 0;
        self.entries.push(TranscriptLine {
            kind: TranscriptKind::User,
            content: submitted.clone(),
        });
        Some(submitted)
    }
}

impl Frontend for TuiFrontend {
    fn create_placeholder(&mut self) -> PlaceholderId {
        let entry_index = self.entries.len();
        self.entries.push(TranscriptLine {
            kind: TranscriptKind::Assistant {
                streaming: true,
                collapsed: false,
            },
            content: String::new(),
        });
        let id = PlaceholderId(self.placeholders.len());
        self.placeholders.push(entry_index);
        self.draw();
        id
    }

    fn update(&mut self, placeholder: PlaceholderId, content: &str) {
        if let Some(&entry_index) = self.placeholders.get(placeholder.0) {
            self.entries[entry_index].content = content.to_string();
            self.draw();
        }
    }

    fn mark_status(
        &mut self,
        placeholder: PlaceholderId,
        status: PlaceholderStatus,
        expanded: bool,
    ) {
        let Some(&entry_index) = self.placeholders.get(placeholder.0) else {
            return;
        };
        let entry = &mut self.entries[entry_index];
        entry.kind = match status {
            PlaceholderStatus::Streaming => TranscriptKind::Assistant {
                streaming: true,
                collapsed: false,
            },
            PlaceholderStatus::Complete => TranscriptKind::Assistant {
                streaming: false,
                collapsed: !expanded,
            },
            PlaceholderStatus::Error => TranscriptKind::Error,
        };
        self.draw();
    }

    fn read_next_submitted_input(&mut self) -> Option<String> {
        loop {
            self.draw();

            match event::poll(INPUT_POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(_) => return None,
            }
            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Esc => return None,
                KeyCode::Char('c') | KeyCode::Char('d')
                    if key.modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    return None;
                }
                KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                    self.insert_char('\n');
                }
                KeyCode::Enter => {
                    if let Some(submitted) = self.take_submitted_input() {
                        self.draw();
                        return Some(submitted);
                    }
                }
                KeyCode::Backspace => self.delete_char_before_cursor(),
                KeyCode::Left => self.move_cursor_left(),
                KeyCode::Right => self.move_cursor_right(),
                KeyCode::Home => self.cursor_byte = 0,
                KeyCode::End => self.cursor_byte = self.input.len(),
                KeyCode::Char(ch) => self.insert_char(ch),
                _ => {}
            }
        }
    }
}

impl Drop for TuiFrontend {
    fn drop(&mut self) {
        let _ = terminal::restore();
    }
}
