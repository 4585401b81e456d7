//! Command line overlay for quick actions.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Interactive state backing the command line overlay.
#[derive(Debug, Default, Clone)]
pub struct CommandLineState {
    visible: bool,
    input: String,
}

impl CommandLineState {
    /// Reveal the command line with an empty input buffer.
    pub fn open(&mut self) {
        self.visible = true;
        self.input.clear();
    }

    /// Hide the command line.
    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Whether the command line is currently displayed.
    pub fn is_open(&self) -> bool {
        self.visible
    }

    /// Access the current input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Consume the current input, leaving the buffer empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    /// Append a character to the buffer.
    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    /// Remove the most recently appended character if present.
    pub fn pop_char(&mut self) {
        self.input.pop();
    }
}

/// Visual component that renders the command line overlay.
#[derive(Debug, Default)]
pub struct CommandLine;

impl CommandLine {
    /// Draw the command line if it is visible.
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &CommandLineState) {
        if !state.is_open() {
            return;
        }

        let width = area.width.saturating_sub(10).min(70);
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + area.height.saturating_sub(4),
            width,
            height: 3,
        };

        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title("Command")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(block.clone(), popup);

        let inner = block.inner(popup);
        let prompt = Paragraph::new(format!(":{}", state.input()))
            .style(Style::default().fg(Color::White));
        frame.render_widget(prompt, inner);
    }
}
