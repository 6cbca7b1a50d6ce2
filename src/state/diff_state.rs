use std::collections::HashSet;

use crate::document::{DiffBuilder, DiffDocument};
use crate::git::types::FileDelta;

use super::comment_state::RangeComment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffViewMode {
    Split,
    Unified,
}

impl DiffViewMode {
    pub fn toggled(self) -> Self {
        match self {
            DiffViewMode::Split => DiffViewMode::Unified,
            DiffViewMode::Unified => DiffViewMode::Split,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiffViewMode::Split => "split",
            DiffViewMode::Unified => "unified",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub ignore_whitespace: bool,
    pub view_mode: DiffViewMode,
}

impl DiffOptions {
    pub fn new(ignore_whitespace: bool, unified: bool) -> Self {
        Self {
            ignore_whitespace,
            view_mode: if unified {
                DiffViewMode::Unified
            } else {
                DiffViewMode::Split
            },
        }
    }
}

pub struct DiffState {
    pub options: DiffOptions,
    pub deltas: Vec<FileDelta>,
    pub selected_file: Option<usize>,
    /// Visual line offset from the top of the diff viewport.
    pub scroll_offset: usize,
    pub viewport_height: usize,
    /// Visual lines the current document occupies, set by the renderer.
    pub content_height: usize,
    pub loading: bool,
    /// Number of context lines to show around each change.
    pub display_context: usize,
    /// Gaps the user has opened.
    pub expanded_gaps: HashSet<usize>,
    pub tab_size: usize,
    /// Rendered tree of the selected file.
    pub document: Option<DiffDocument>,
    /// Bumped on every rebuild; identifies the rendering a selection
    /// was made over.
    pub document_generation: u64,
}

impl DiffState {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            options,
            deltas: Vec::new(),
            selected_file: None,
            scroll_offset: 0,
            viewport_height: 20,
            content_height: 0,
            loading: false,
            display_context: 3,
            expanded_gaps: HashSet::new(),
            tab_size: 4,
            document: None,
            document_generation: 0,
        }
    }

    pub fn selected_delta(&self) -> Option<&FileDelta> {
        self.selected_file.and_then(|i| self.deltas.get(i))
    }

    /// Path of the selected file as comments are keyed.
    pub fn selected_path(&self) -> Option<String> {
        self.selected_delta()
            .map(|d| d.path.to_string_lossy().into_owned())
    }

    /// Replace the file list, keeping the selected path when it survives.
    pub fn set_deltas(&mut self, deltas: Vec<FileDelta>) {
        let previous = self.selected_delta().map(|d| d.path.clone());
        self.deltas = deltas;
        self.selected_file = previous
            .and_then(|p| self.deltas.iter().position(|d| d.path == p))
            .or(if self.deltas.is_empty() { None } else { Some(0) });
    }

    /// Move the file selection by `step`, wrapping around. Returns whether
    /// the selection changed.
    pub fn select_relative(&mut self, step: isize) -> bool {
        let count = self.deltas.len();
        if count == 0 {
            return false;
        }
        let current = self.selected_file.unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(count as isize) as usize;
        if Some(next) == self.selected_file {
            return false;
        }
        self.selected_file = Some(next);
        self.scroll_offset = 0;
        self.expanded_gaps.clear();
        true
    }

    /// Render the selected file into a fresh document.
    pub fn rebuild_document(&mut self, comments: &[RangeComment]) {
        self.document = self.selected_delta().map(|delta| {
            DiffBuilder::new(delta, self.options.view_mode)
                .display_context(self.display_context)
                .expanded_gaps(&self.expanded_gaps)
                .comments(comments)
                .tab_size(self.tab_size)
                .build()
        });
        self.document_generation += 1;
        log::debug!(
            "rebuilt document {} ({} nodes)",
            self.document_generation,
            self.document.as_ref().map_or(0, DiffDocument::node_count)
        );
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.content_height.saturating_sub(self.viewport_height);
        let next = (self.scroll_offset as isize + delta).clamp(0, max as isize);
        self.scroll_offset = next as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::types::fixtures::{addition, context, delta};

    fn named(path: &str) -> FileDelta {
        let mut d = delta(vec![context(1, 1, "a"), addition(2, "b")]);
        d.path = path.into();
        d
    }

    #[test]
    fn test_set_deltas_keeps_selected_path() {
        let mut state = DiffState::new(DiffOptions::new(false, false));
        state.set_deltas(vec![named("a.rs"), named("b.rs")]);
        assert_eq!(state.selected_path(), Some("a.rs".to_string()));
        state.select_relative(1);
        state.set_deltas(vec![named("0.rs"), named("a.rs"), named("b.rs")]);
        assert_eq!(state.selected_path(), Some("b.rs".to_string()));
        state.set_deltas(vec![named("c.rs")]);
        assert_eq!(state.selected_path(), Some("c.rs".to_string()));
        state.set_deltas(Vec::new());
        assert_eq!(state.selected_file, None);
    }

    #[test]
    fn test_select_relative_wraps() {
        let mut state = DiffState::new(DiffOptions::new(false, false));
        state.set_deltas(vec![named("a.rs"), named("b.rs")]);
        state.expanded_gaps.insert(0);
        assert!(state.select_relative(-1));
        assert_eq!(state.selected_path(), Some("b.rs".to_string()));
        assert!(state.expanded_gaps.is_empty());
        assert!(state.select_relative(1));
        assert_eq!(state.selected_path(), Some("a.rs".to_string()));
    }

    #[test]
    fn test_rebuild_bumps_generation() {
        let mut state = DiffState::new(DiffOptions::new(false, true));
        state.rebuild_document(&[]);
        assert!(state.document.is_none());
        assert_eq!(state.document_generation, 1);

        state.set_deltas(vec![named("a.rs")]);
        state.rebuild_document(&[]);
        assert!(state.document.is_some());
        assert_eq!(state.document_generation, 2);
    }

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut state = DiffState::new(DiffOptions::new(false, false));
        state.viewport_height = 10;
        state.content_height = 25;
        state.scroll_by(100);
        assert_eq!(state.scroll_offset, 15);
        state.scroll_by(-4);
        assert_eq!(state.scroll_offset, 11);
        state.scroll_by(-100);
        assert_eq!(state.scroll_offset, 0);
    }
}
