//! Checkbox tree component and state management.

use std::collections::{HashMap, HashSet};

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use crate::app::scan::{FolderMetadata, ScanResult};

/// Display key of the synthetic root entry.
pub const ROOT_KEY: &str = ".";

/// Maintains the navigable state of the directory tree.
#[derive(Debug, Default, Clone)]
pub struct DirTreeState {
    entries: Vec<TreeEntry>,
    visible: Vec<usize>,
    selected: usize,
    expanded: HashSet<String>,
    filter: String,
    filter_active: bool,
    root_label: String,
}

impl DirTreeState {
    /// Construct state from a scan result. The scanned root becomes a
    /// selectable entry of its own at the top of the tree.
    pub fn from_scan(result: &ScanResult) -> Self {
        let mut state = Self {
            entries: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            expanded: HashSet::new(),
            filter: String::new(),
            filter_active: false,
            root_label: result
                .root
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| result.root.display().to_string()),
        };
        state.rebuild_entries(result);
        state
    }

    fn rebuild_entries(&mut self, result: &ScanResult) {
        let mut entries = Vec::with_capacity(result.folders.len() + 1);
        let mut index_map: HashMap<String, usize> = HashMap::new();

        entries.push(TreeEntry {
            metadata: FolderMetadata {
                path: result.root.clone(),
                display_path: ROOT_KEY.to_string(),
            },
            name: self.root_label.clone(),
            depth: 0,
            parent: None,
            has_children: false,
        });
        index_map.insert(ROOT_KEY.to_string(), 0);

        for meta in &result.folders {
            let key = meta.display_path.clone();
            let depth = meta.display_path.matches('/').count() + 1;
            let name = display_name(&meta.display_path);
            let parent = parent_key(&meta.display_path)
                .and_then(|p| index_map.get(&p).copied())
                .or(Some(0));

            let entry = TreeEntry {
                metadata: meta.clone(),
                name,
                depth,
                parent,
                has_children: false,
            };
            let idx = entries.len();
            entries.push(entry);
            index_map.insert(key, idx);

            if let Some(parent_idx) = parent
                && let Some(parent_entry) = entries.get_mut(parent_idx)
            {
                parent_entry.has_children = true;
            }
        }

        // Root and first level start expanded for discoverability.
        self.expanded.clear();
        self.expanded.insert(ROOT_KEY.to_string());
        for entry in &entries {
            if entry.depth == 1 {
                self.expanded.insert(entry.metadata.display_path.clone());
            }
        }

        self.entries = entries;
        self.visible.clear();
        self.selected = 0;
        self.refresh_visible();
    }

    /// Read-only access to the cursored folder's metadata.
    pub fn selected_folder(&self) -> Option<&FolderMetadata> {
        self.visible
            .get(self.selected)
            .and_then(|idx| self.entries.get(*idx))
            .map(|entry| &entry.metadata)
    }

    /// Advance the cursor to the next visible entry.
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    /// Move the cursor to the previous visible entry.
    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Expand the cursored directory, or descend into its first child when
    /// already expanded.
    pub fn expand_or_descend(&mut self) {
        if let Some(index) = self.selected_entry_index() {
            let key = self.entries[index].metadata.display_path.clone();
            if !self.expanded.insert(key) {
                if let Some(first_child) = self.visible.iter().position(|idx| {
                    self.entries.get(*idx).and_then(|item| item.parent) == Some(index)
                }) {
                    self.selected = first_child;
                }
            } else {
                self.refresh_visible();
            }
        }
    }

    /// Collapse the cursored directory or move the cursor to its parent.
    pub fn collapse_or_parent(&mut self) {
        if let Some(index) = self.selected_entry_index() {
            let key = self.entries[index].metadata.display_path.clone();
            let parent = self.entries[index].parent;
            if self.expanded.remove(&key) {
                self.refresh_visible();
            } else if let Some(parent_idx) = parent
                && let Some(pos) = self.visible.iter().position(|idx| *idx == parent_idx)
            {
                self.selected = pos;
            }
        }
    }

    /// Toggle the expansion state of the cursored directory.
    pub fn toggle_expansion(&mut self) {
        if let Some(index) = self.selected_entry_index() {
            let key = self.entries[index].metadata.display_path.clone();
            if !self.expanded.remove(&key) {
                self.expanded.insert(key);
            }
            self.refresh_visible();
        }
    }

    /// Activate incremental filter editing.
    pub fn begin_filter(&mut self) {
        self.filter_active = true;
    }

    /// Deactivate the filter editing mode.
    pub fn end_filter(&mut self) {
        self.filter_active = false;
    }

    /// Whether filter mode is currently active.
    pub fn is_filter_active(&self) -> bool {
        self.filter_active
    }

    /// Append a character to the filter string and refresh visibility.
    pub fn push_filter_char(&mut self, ch: char) {
        self.filter.push(ch);
        self.refresh_visible();
    }

    /// Remove the most recent filter character.
    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.refresh_visible();
    }

    /// Clear the active filter.
    pub fn clear_filter(&mut self) {
        if !self.filter.is_empty() {
            self.filter.clear();
            self.refresh_visible();
        }
    }

    /// Replace the filter contents.
    pub fn set_filter<S: Into<String>>(&mut self, pattern: S) {
        self.filter = pattern.into();
        self.refresh_visible();
    }

    /// Retrieve the active filter string.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    fn refresh_visible(&mut self) {
        self.visible.clear();
        if self.entries.is_empty() {
            return;
        }

        let lower_filter = self.filter.to_ascii_lowercase();
        let mut matches = vec![lower_filter.is_empty(); self.entries.len()];

        if !lower_filter.is_empty() {
            matches[0] = true;
            for (idx, entry) in self.entries.iter().enumerate().skip(1) {
                if entry
                    .metadata
                    .display_path
                    .to_ascii_lowercase()
                    .contains(&lower_filter)
                {
                    matches[idx] = true;
                    let mut parent = entry.parent;
                    while let Some(p) = parent {
                        matches[p] = true;
                        parent = self.entries[p].parent;
                    }
                }
            }
        }

        for (idx, entry) in self.entries.iter().enumerate() {
            if !matches[idx] {
                continue;
            }
            if self.ancestors_expanded(idx, &matches) {
                self.visible.push(idx);
            }

            if !self.filter.is_empty() {
                self.expanded.insert(entry.metadata.display_path.clone());
            }
        }

        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    fn ancestors_expanded(&self, mut idx: usize, matches: &[bool]) -> bool {
        while let Some(parent_idx) = self.entries[idx].parent {
            if !self.is_expanded(parent_idx, matches) {
                return false;
            }
            idx = parent_idx;
        }
        true
    }

    fn is_expanded(&self, idx: usize, matches: &[bool]) -> bool {
        let key = &self.entries[idx].metadata.display_path;
        if !self.filter.is_empty() && matches[idx] {
            true
        } else {
            self.expanded.contains(key)
        }
    }

    fn selected_entry_index(&self) -> Option<usize> {
        self.visible.get(self.selected).copied()
    }

    /// Iterate over entries that should be displayed in the UI.
    fn iter_visible(&self) -> impl Iterator<Item = (usize, usize, &TreeEntry)> {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(display_idx, entry_idx)| {
                self.entries
                    .get(*entry_idx)
                    .map(|entry| (display_idx, *entry_idx, entry))
            })
    }

    /// Index of the currently cursored item within the visible list.
    pub fn selected_index(&self) -> Option<usize> {
        if self.visible.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    /// Number of items currently visible in the tree.
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Whether a display path is currently expanded.
    pub fn is_path_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    /// Expose the root label for rendering.
    pub fn root_label(&self) -> &str {
        &self.root_label
    }
}

#[derive(Debug, Clone)]
struct TreeEntry {
    metadata: FolderMetadata,
    name: String,
    depth: usize,
    parent: Option<usize>,
    has_children: bool,
}

/// Ratatui component responsible for rendering the checkbox tree.
#[derive(Debug, Default)]
pub struct DirTree;

impl DirTree {
    /// Render the tree to the provided frame. `checked` holds the display
    /// paths currently checked for counting.
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        state: &DirTreeState,
        has_focus: bool,
        checked: &HashSet<String>,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Folders · {}", state.root_label()));
        frame.render_widget(block.clone(), area);

        let inner = block.inner(area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        let filter_text = if state.filter().is_empty() {
            "⌕ filter (press /)".to_string()
        } else {
            format!("⌕ {}", state.filter())
        };

        let mut filter_style = Style::default().fg(Color::Gray);
        if state.is_filter_active() {
            filter_style = filter_style.add_modifier(Modifier::BOLD).fg(Color::Cyan);
        }

        let filter_line = Paragraph::new(filter_text).style(filter_style);
        frame.render_widget(filter_line, layout[0]);

        if state.visible_len() == 0 {
            let placeholder = Paragraph::new("No folders match filter").style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(placeholder, layout[1]);
            return;
        }

        let mut items = Vec::with_capacity(state.visible_len());
        for (display_idx, _index, entry) in state.iter_visible() {
            let mut spans = Vec::new();
            spans.push(Span::raw("  ".repeat(entry.depth)));

            let symbol = if state.is_path_expanded(&entry.metadata.display_path) {
                "▾"
            } else if entry.has_children {
                "▸"
            } else {
                "·"
            };
            spans.push(Span::styled(
                format!("{} ", symbol),
                Style::default().fg(Color::Yellow),
            ));

            let is_checked = checked.contains(&entry.metadata.display_path);
            if is_checked {
                spans.push(Span::styled("✓ ", Style::default().fg(Color::Green)));
            } else {
                spans.push(Span::raw("  "));
            }

            let mut name_style = Style::default();
            if is_checked {
                name_style = name_style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(entry.name.clone(), name_style));

            let line = Line::from(spans);
            let mut item = ListItem::new(line);
            if display_idx % 2 == 1 {
                item = item.style(Style::default().bg(Color::Rgb(24, 24, 24)));
            }
            items.push(item);
        }

        let mut list_state = ratatui::widgets::ListState::default();
        if let Some(selected) = state.selected_index() {
            list_state.select(Some(selected));
        }

        let highlight_style = if has_focus {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD)
        };

        let list = List::new(items)
            .block(Block::default())
            .highlight_style(highlight_style)
            .highlight_symbol("▸ ");

        frame.render_stateful_widget(list, layout[1], &mut list_state);
    }
}

fn display_name(display_path: &str) -> String {
    std::path::Path::new(display_path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| display_path.to_string())
}

fn parent_key(display_path: &str) -> Option<String> {
    std::path::Path::new(display_path)
        .parent()
        .and_then(|parent| {
            if parent.as_os_str().is_empty() {
                None
            } else {
                Some(parent.to_string_lossy().to_string())
            }
        })
}
