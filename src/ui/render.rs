use super::input_metrics::{
    char_display_width, cursor_row_col, truncate_to_display_width, wrap_input_lines,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChatLayout {
    pub title: Rect,
    pub history: Rect,
    pub input: Rect,
    pub status: Rect,
}

pub fn split_chat_layout(area: Rect, input_rows: u16) -> ChatLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(input_rows.max(1)),
            Constraint::Length(1),
        ])
        .split(area);

    ChatLayout {
        title: chunks[0],
        history: chunks[1],
        input: chunks[2],
        status: chunks[3],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptKind {
    User,
    Assistant { streaming: bool, collapsed: bool },
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub kind: TranscriptKind,
    pub content: String,
}

pub fn input_visual_rows(input: &str, width: usize) -> usize {
    wrap_input_lines(input, width).len().max(1)
}

pub fn render_title(frame: &mut Frame<'_>, area: Rect) {
    if area.height == 0 {
        return;
    }
    frame.render_widget(
        Paragraph::new("taxchat").style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        area,
    );
}

pub fn render_history(frame: &mut Frame<'_>, area: Rect, entries: &[TranscriptLine]) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let lines = history_lines(entries);
    let visual_rows: usize = lines
        .iter()
        .map(|line| wrapped_rows(&line_content(line), area.width as usize))
        .sum();
    let scroll = visual_rows.saturating_sub(area.height as usize);

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

pub fn render_input(frame: &mut Frame<'_>, area: Rect, input: &str, cursor_byte: usize) {
    if area.height == 0 || area.width <= 2 {
        return;
    }

    let input_width = area.width.saturating_sub(2).max(1) as usize;
    let lines = wrap_input_lines(input, input_width);
    let (cursor_row, cursor_col) = cursor_row_col(input, cursor_byte, input_width);
    let visible_rows = area.height as usize;
    let window_start = cursor_row.saturating_add(1).saturating_sub(visible_rows);

    let mut rendered = Vec::with_capacity(visible_rows);
    for offset in 0..visible_rows {
        let row_index = window_start + offset;
        let prefix = if row_index == 0 { "> " } else { "  " };
        let line = lines.get(row_index).cloned().unwrap_or_default();
        rendered.push(Line::from(format!("{prefix}{line}")));
    }

    frame.render_widget(
        Paragraph::new(rendered)
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: false }),
        area,
    );

    let cursor_y = area
        .y
        .saturating_add(cursor_row.saturating_sub(window_start) as u16);
    let cursor_x = area
        .x
        .saturating_add(2 + cursor_col as u16)
        .min(area.x.saturating_add(area.width.saturating_sub(1)));
    frame.set_cursor_position((cursor_x, cursor_y));
}

pub fn render_status_line(frame: &mut Frame<'_>, area: Rect, status: &str) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let text = truncate_line(status, area.width as usize);
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn history_lines(entries: &[TranscriptLine]) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        match &entry.kind {
            TranscriptKind::User => {
                lines.push(Line::from(vec![
                    Span::styled("you ", Style::default().fg(Color::Cyan)),
                    Span::raw(entry.content.clone()),
                ]));
            }
            TranscriptKind::Assistant {
                streaming,
                collapsed,
            } => {
                let content = if *collapsed {
                    collapse_to_first_line(&entry.content)
                } else {
                    entry.content.clone()
                };
                let mut spans = vec![Span::raw(content)];
                if *streaming {
                    spans.push(Span::styled("▌", Style::default().fg(Color::DarkGray)));
                }
                lines.push(Line::from(spans));
            }
            TranscriptKind::Error => {
                lines.push(Line::styled(
                    format!("[error] {}", entry.content),
                    Style::default().fg(Color::Red),
                ));
            }
        }
        lines.push(Line::raw(""));
    }
    lines
}

fn collapse_to_first_line(content: &str) -> String {
    match content.split_once('\n') {
        Some((first, _)) => format!("{first} …"),
        None => content.to_string(),
    }
}

fn line_content(line: &Line<'_>) -> String {
    line.spans
        .iter()
        .map(|span| span.content.as_ref())
        .collect()
}

fn wrapped_rows(content: &str, width: usize) -> usize {
    wrap_input_lines(content, width.max(1)).len().max(1)
}

fn truncate_line(input: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::new();
    let mut used = 0usize;
    let mut truncated = false;

    for ch in input.chars() {
        let ch_width = char_display_width(ch);
        if used + ch_width > width {
            truncated = true;
            break;
        }
        out.push(ch);
        used += ch_width;
    }

    if truncated && width >= 4 {
        out = truncate_to_display_width(&out, width - 3);
        out.push_str("...");
    }
    out
}
