//! Count summary component.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::domain::model::{CountReport, FolderCount};

/// Displays the aggregated results of the most recent count run.
#[derive(Debug, Default)]
pub struct Summary {
    latest: Option<CountReport>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored report with fresh data from a count run.
    pub fn update(&mut self, report: CountReport) {
        self.latest = Some(report);
    }

    /// Clear the rendered state.
    pub fn clear(&mut self) {
        self.latest = None;
    }

    /// Render the summary inside the provided area.
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default().title("Step Count").borders(Borders::ALL);
        frame.render_widget(block.clone(), area);

        let inner = block.inner(area);
        match &self.latest {
            Some(report) => self.render_report(frame, inner, report),
            None => {
                let placeholder = Paragraph::new("No count yet · check folders and press r")
                    .wrap(Wrap { trim: true })
                    .style(Style::default().fg(Color::DarkGray));
                frame.render_widget(placeholder, inner);
            }
        }
    }

    fn render_report(&self, frame: &mut Frame<'_>, area: Rect, report: &CountReport) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(header_lines(report)).wrap(Wrap { trim: true });
        frame.render_widget(header, layout[0]);

        let items = build_folder_list(&report.folders);
        if items.is_empty() {
            let empty = Paragraph::new("No folders were checked").wrap(Wrap { trim: true });
            frame.render_widget(empty, layout[1]);
        } else {
            let list = List::new(items).block(Block::default());
            frame.render_widget(list, layout[1]);
        }
    }
}

fn header_lines(report: &CountReport) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled("Total", Style::default().fg(Color::Gray)),
            Span::raw(": "),
            Span::styled(
                format!("{} steps", report.total_steps),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled("Folders", Style::default().fg(Color::Gray)),
            Span::raw(": "),
            Span::raw(format!("{}", report.folders.len())),
        ]),
        Line::from(vec![
            Span::styled("Files", Style::default().fg(Color::Gray)),
            Span::raw(": "),
            Span::raw(format!("{}", report.total_files())),
        ]),
    ]
}

fn build_folder_list(folders: &[FolderCount]) -> Vec<ListItem<'static>> {
    folders
        .iter()
        .map(|folder| {
            let label = format!("{} – {} steps", folder.display_path, folder.steps);
            let detail = format!(" ({} files)", folder.files);
            ListItem::new(Line::from(vec![
                Span::raw(label),
                Span::styled(detail, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect()
}
