//! Application loop for the TUI.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::app::count::StepCounter;
use crate::app::report::{ReportFormat, ReportOptions, Reporter};
use crate::app::scan::{Scanner, ScannerConfig};
use crate::app::selection::Selector;
use crate::domain::model::CountReport;
use crate::infra::config::Config;
use crate::ui::components::command_line::{CommandLine, CommandLineState};
use crate::ui::components::dir_tree::{DirTree, DirTreeState, ROOT_KEY};
use crate::ui::components::summary::Summary;

const TICK_RATE: Duration = Duration::from_millis(120);

/// Primary entry point for running the interactive TUI.
pub struct UiApp {
    config: Config,
    scanner: Scanner,
    tree: DirTreeState,
    dir_tree: DirTree,
    selector: Selector,
    counter: StepCounter,
    reporter: Reporter,
    report_format: ReportFormat,
    summary_component: Summary,
    last_report: Option<CountReport>,
    command_state: CommandLineState,
    command_component: CommandLine,
    checked_display: HashSet<String>,
    display_lookup: HashMap<PathBuf, String>,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl Default for UiApp {
    fn default() -> Self {
        Self {
            config: Config::default(),
            scanner: Scanner::new(),
            tree: DirTreeState::default(),
            dir_tree: DirTree,
            selector: Selector::new(),
            counter: StepCounter::new(),
            reporter: Reporter::new().expect("reporter available"),
            report_format: ReportFormat::Markdown,
            summary_component: Summary::new(),
            last_report: None,
            command_state: CommandLineState::default(),
            command_component: CommandLine,
            checked_display: HashSet::new(),
            display_lookup: HashMap::new(),
            status: None,
            should_quit: false,
        }
    }
}

impl UiApp {
    /// Launch the terminal UI rooted at `root` (working directory when
    /// `None`) and enter the event loop. Once the UI exits, the last count
    /// report (if any) is printed to stdout in plain format.
    pub fn run(&mut self, root: Option<PathBuf>) -> Result<()> {
        self.bootstrap(root)?;

        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        disable_raw_mode().ok();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        if let Some(report) = &self.last_report {
            let options = ReportOptions {
                format: ReportFormat::Plain,
                output_path: None,
                copy_to_clipboard: false,
            };
            match self.reporter.render(report, &options) {
                Ok(rendered) => println!("{rendered}"),
                Err(err) => tracing::warn!(error = %err, "failed to render final report"),
            }
        }

        event_loop_result
    }

    fn bootstrap(&mut self, root: Option<PathBuf>) -> Result<()> {
        self.config = Config::load()?;
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().context("unable to determine working directory")?,
        };

        let scanner_cfg = ScannerConfig::from_root(root, self.config.clone());
        let scan = self
            .scanner
            .scan(&scanner_cfg)
            .context("failed to scan directory tree")?;

        self.display_lookup = scan
            .folders
            .iter()
            .map(|meta| (meta.path.clone(), meta.display_path.clone()))
            .collect();
        self.display_lookup
            .insert(scan.root.clone(), ROOT_KEY.to_string());

        self.tree = DirTreeState::from_scan(&scan);

        self.counter = StepCounter::from_config(&self.config);
        self.report_format = ReportOptions::from_config(&self.config).format;
        Ok(())
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;
            self.tick();

            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE)? {
                let ev = event::read()?;
                self.handle_event(ev)?;
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(size);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(30)])
            .split(layout[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(main_chunks[1]);

        let has_focus = !self.command_state.is_open();
        self.dir_tree.render(
            frame,
            main_chunks[0],
            &self.tree,
            has_focus,
            &self.checked_display,
        );

        self.summary_component.render(frame, right_chunks[0]);
        self.render_hints(frame, right_chunks[1]);
        self.render_status(frame, layout[1]);
        self.command_component
            .render(frame, size, &self.command_state);
    }

    fn render_hints(&self, frame: &mut Frame<'_>, area: Rect) {
        let keys = &self.config.keybindings;
        let accent = Style::default().fg(Color::Cyan);
        let hints = Paragraph::new(Line::from(vec![
            Span::styled(format!("{}/{}", keys.down, keys.up), accent),
            Span::raw(" move · "),
            Span::styled(keys.toggle.clone(), accent),
            Span::raw(" check · "),
            Span::styled(keys.run.clone(), accent),
            Span::raw(" count · "),
            Span::styled("/", accent),
            Span::raw(" filter · "),
            Span::styled(":", accent),
            Span::raw(" commands · "),
            Span::styled("q", accent),
            Span::raw(" quit"),
        ]))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(hints, area);
    }

    fn render_status(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let message = self.status.as_ref().map(|status| {
            let style = match status.level {
                StatusLevel::Info => Style::default().fg(Color::Gray),
                StatusLevel::Success => Style::default().fg(Color::Green),
                StatusLevel::Error => Style::default().fg(Color::Red),
            };
            Line::styled(status.text.clone(), style)
        });

        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let line = message.unwrap_or_else(|| {
            Line::styled(
                "Ready · press : for commands",
                Style::default().fg(Color::DarkGray),
            )
        });
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key_event(key)?,
            Event::Resize(..) => {}
            Event::Mouse(_) => {}
            Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.command_state.is_open() {
            return self.handle_command_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Ok(());
                }
                KeyCode::Char('r') => {
                    self.run_count();
                    return Ok(());
                }
                _ => {}
            }
        }

        self.handle_tree_key(key)
    }

    fn handle_tree_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.tree.is_filter_active() {
            return self.handle_filter_input(key);
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('/') => {
                self.tree.begin_filter();
            }
            KeyCode::Char(':') => {
                self.command_state.open();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.tree.select_next();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.tree.select_previous();
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.tree.collapse_or_parent();
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.tree.expand_or_descend();
            }
            KeyCode::Enter => {
                self.tree.toggle_expansion();
            }
            KeyCode::Char(' ') => {
                self.toggle_current_check();
            }
            KeyCode::Char('r') => {
                self.run_count();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_command_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.command_state.close();
            }
            KeyCode::Enter => {
                let command = self.command_state.take_input();
                self.command_state.close();
                if let Err(err) = self.execute_command(command.trim()) {
                    self.set_status(StatusLevel::Error, err.to_string());
                }
            }
            KeyCode::Backspace => {
                self.command_state.pop_char();
            }
            KeyCode::Char(ch) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.command_state.push_char(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_filter_input(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.tree.end_filter();
            }
            KeyCode::Enter => {
                self.tree.end_filter();
            }
            KeyCode::Backspace => {
                self.tree.pop_filter_char();
            }
            KeyCode::Char(ch) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.tree.push_filter_char(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn toggle_current_check(&mut self) {
        let Some(metadata) = self.tree.selected_folder() else {
            return;
        };
        let display = metadata.display_path.clone();
        let now_checked = self.selector.toggle(metadata.path.clone());
        if now_checked {
            self.set_status(StatusLevel::Success, format!("Checked {display}"));
        } else {
            self.set_status(StatusLevel::Info, format!("Unchecked {display}"));
        }
        self.rebuild_checked_display();
    }

    /// Count every checked folder independently, in order. Overlapping
    /// selections are counted as-is, so a checked folder inside another
    /// checked folder contributes twice to the total.
    fn run_count(&mut self) {
        if self.selector.is_empty() {
            self.set_status(StatusLevel::Error, "No folders checked");
            return;
        }

        let paths = self.selector.checked_paths();
        let mut report = self.counter.count_folders(&paths);
        for folder in &mut report.folders {
            if let Some(display) = self.display_lookup.get(&folder.path) {
                folder.display_path = display.clone();
            }
            tracing::info!(
                folder = %folder.display_path,
                steps = folder.steps,
                files = folder.files,
                "folder counted"
            );
        }
        tracing::info!(total = report.total_steps, "count finished");

        self.summary_component.update(report.clone());
        self.set_status(
            StatusLevel::Success,
            format!(
                "{} steps across {} folders",
                report.total_steps,
                report.folders.len()
            ),
        );
        self.last_report = Some(report);
    }

    fn execute_command(&mut self, command: &str) -> Result<()> {
        if command.is_empty() {
            return Ok(());
        }

        let mut parts = command.split_whitespace();
        let verb = parts.next().unwrap_or("");
        let rest = command[verb.len()..].trim();

        match verb {
            "filter" => {
                self.tree.set_filter(rest);
                self.set_status(StatusLevel::Success, "Filter applied");
            }
            "clear" => {
                if rest == "filter" || rest.is_empty() {
                    self.tree.clear_filter();
                    self.set_status(StatusLevel::Info, "Filter cleared");
                }
            }
            "count" => {
                self.run_count();
            }
            "uncheck" => {
                self.selector.clear();
                self.rebuild_checked_display();
                self.set_status(StatusLevel::Info, "All folders unchecked");
            }
            "format" => {
                if rest.is_empty() {
                    return Err(anyhow!("format command requires markdown or plain"));
                }
                self.report_format = rest
                    .parse()
                    .map_err(|err| anyhow!("{err}"))?;
                self.set_status(
                    StatusLevel::Success,
                    format!("Report format set to {}", self.report_format.as_str()),
                );
            }
            "report" => {
                if rest.is_empty() {
                    self.write_report(None)?;
                } else {
                    self.write_report(Some(PathBuf::from(rest)))?;
                }
            }
            "copy" => {
                self.copy_report()?;
            }
            "help" => {
                self.set_status(
                    StatusLevel::Info,
                    "Commands: filter <pat>, clear, count, uncheck, format <fmt>, report [path], copy",
                );
            }
            other => {
                return Err(anyhow!("unknown command '{other}'"));
            }
        }
        Ok(())
    }

    fn write_report(&mut self, target: Option<PathBuf>) -> Result<()> {
        let Some(report) = self.last_report.clone() else {
            self.set_status(StatusLevel::Error, "No count to report · run a count first");
            return Ok(());
        };

        let path = match target {
            Some(path) => path,
            None => {
                let timestamp = OffsetDateTime::now_utc().format(format_description!(
                    "[year][month][day]-[hour][minute][second]"
                ))?;
                PathBuf::from(".stepcount/reports").join(format!(
                    "steps-{timestamp}.{}",
                    self.report_format.extension()
                ))
            }
        };

        let options = ReportOptions {
            format: self.report_format,
            output_path: Some(path.clone()),
            copy_to_clipboard: false,
        };
        self.reporter.publish(&report, &options)?;

        self.set_status(
            StatusLevel::Success,
            format!("Report written to {}", path.display()),
        );
        Ok(())
    }

    fn copy_report(&mut self) -> Result<()> {
        let Some(report) = self.last_report.clone() else {
            self.set_status(StatusLevel::Error, "No count to copy · run a count first");
            return Ok(());
        };

        let options = ReportOptions {
            format: self.report_format,
            output_path: None,
            copy_to_clipboard: true,
        };
        self.reporter.publish(&report, &options)?;
        self.set_status(StatusLevel::Success, "Report copied to clipboard");
        Ok(())
    }

    fn rebuild_checked_display(&mut self) {
        self.checked_display.clear();
        for path in self.selector.checked_paths() {
            let display = self
                .display_lookup
                .get(&path)
                .cloned()
                .unwrap_or_else(|| path.display().to_string());
            self.checked_display.insert(display);
        }
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + Duration::from_secs(4),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusLevel {
    Info,
    Success,
    Error,
}
