use std::cmp::Ordering;
use std::time::{Duration, Instant};

use crate::document::{DiffDocument, NodeId, NodeKind};
use crate::selection::host::{HostEndpoint, HostRange, HostSelection};
use crate::selection::normalizer::find_line_text_ancestor;
use crate::selection::{RawEndpoint, RawSelection};

/// Clicks closer together than this on the same cell count as one gesture.
const MULTI_CLICK: Duration = Duration::from_millis(500);

/// The mouse selection over the rendered document, in document points.
///
/// `anchor` is where the gesture started and `focus` where it currently
/// ends; either may come first in document order.
#[derive(Debug, Default)]
pub struct SelectionState {
    pub anchor: Option<RawEndpoint>,
    pub focus: Option<RawEndpoint>,
    pub dragging: bool,
    /// Both edges of the cell the drag started on.
    anchor_cell: Option<(RawEndpoint, RawEndpoint)>,
    last_click: Option<(Instant, u16, u16)>,
    click_count: u8,
}

impl SelectionState {
    /// Count a mouse press: 1 for a single click, 2 and 3 for double and
    /// triple clicks on the same cell.
    pub fn register_click(&mut self, x: u16, y: u16, now: Instant) -> u8 {
        let repeated = self.last_click.is_some_and(|(at, lx, ly)| {
            lx == x && ly == y && now.saturating_duration_since(at) <= MULTI_CLICK
        });
        self.click_count = if repeated { self.click_count % 3 + 1 } else { 1 };
        self.last_click = Some((now, x, y));
        self.click_count
    }

    pub fn clear(&mut self) {
        self.anchor = None;
        self.focus = None;
        self.dragging = false;
        self.anchor_cell = None;
    }

    /// Whether anything is selected. A caret left by a plain click is not.
    pub fn has_selection(&self) -> bool {
        match (self.anchor, self.focus) {
            (Some(anchor), Some(focus)) => !RawSelection::new(anchor, focus).is_collapsed(),
            _ => false,
        }
    }

    /// Start a drag at the point `at`.
    pub fn begin(&mut self, at: RawEndpoint) {
        self.press(at, at);
    }

    /// Start a drag on a cell spanning `start..end`. The selection stays
    /// collapsed at `start` until the pointer reaches another cell.
    pub fn press(&mut self, start: RawEndpoint, end: RawEndpoint) {
        self.anchor = Some(start);
        self.focus = Some(start);
        self.anchor_cell = Some((start, end));
        self.dragging = true;
    }

    /// Extend the drag to a cell spanning `start..end`. Both the pressed
    /// cell and this one end up inside the selection, whichever comes first.
    pub fn extend(&mut self, doc: &DiffDocument, start: RawEndpoint, end: RawEndpoint) {
        let Some((cell_start, cell_end)) = self.anchor_cell else {
            self.press(start, end);
            return;
        };
        if start == cell_start {
            self.anchor = Some(cell_start);
            self.focus = Some(cell_start);
            return;
        }
        let before = doc.compare_points((start.node, start.offset), (cell_start.node, cell_start.offset))
            == Ordering::Less;
        if before {
            self.anchor = Some(cell_end);
            self.focus = Some(start);
        } else {
            self.anchor = Some(cell_start);
            self.focus = Some(end);
        }
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    /// Double click. Inside text this selects the word under `at`; past
    /// the end of a line it selects the line break, from the end of the
    /// line to the start of the next one.
    pub fn select_word(&mut self, doc: &DiffDocument, at: RawEndpoint) {
        self.dragging = false;
        self.anchor_cell = None;
        if let Some(text) = doc.text(at.node) {
            let chars: Vec<char> = text.chars().collect();
            if at.offset < chars.len() {
                let (start, end) = word_bounds(&chars, at.offset);
                self.anchor = Some(RawEndpoint::new(at.node, start));
                self.focus = Some(RawEndpoint::new(at.node, end));
                return;
            }
        }
        let container = find_line_text_ancestor(doc, at.node);
        if !matches!(doc.kind(container), Some(NodeKind::LineText)) {
            self.begin(at);
            self.dragging = false;
            return;
        }
        let line_end = RawEndpoint::new(container, doc.children(container).len());
        self.anchor = Some(line_end);
        self.focus = Some(
            next_line_text(doc, container)
                .map(|next| RawEndpoint::new(next, 0))
                .unwrap_or(line_end),
        );
    }

    /// Triple click: the whole line, ending where the next line starts
    /// (or in the empty cell beside a last line).
    pub fn select_line(&mut self, doc: &DiffDocument, at: RawEndpoint) {
        self.dragging = false;
        self.anchor_cell = None;
        let container = find_line_text_ancestor(doc, at.node);
        if !matches!(doc.kind(container), Some(NodeKind::LineText)) {
            self.begin(at);
            self.dragging = false;
            return;
        }
        let end = next_line_text(doc, container)
            .or_else(|| opposite_blank(doc, container))
            .map(|node| RawEndpoint::new(node, 0))
            .unwrap_or(RawEndpoint::new(container, doc.children(container).len()));
        self.anchor = Some(RawEndpoint::new(container, 0));
        self.focus = Some(end);
    }

    /// Selection endpoints in document order.
    pub fn ordered(&self, doc: &DiffDocument) -> Option<(RawEndpoint, RawEndpoint)> {
        let (a, f) = (self.anchor?, self.focus?);
        match doc.compare_points((a.node, a.offset), (f.node, f.offset)) {
            Ordering::Greater => Some((f, a)),
            _ => Some((a, f)),
        }
    }

    /// The selection as the terminal reports it: one span, character
    /// offsets.
    pub fn to_host(&self, doc: &DiffDocument) -> HostSelection {
        match self.ordered(doc) {
            Some((start, end)) => HostSelection::Single(HostRange::new(
                HostEndpoint::chars(start.node, start.offset),
                HostEndpoint::chars(end.node, end.offset),
            )),
            None => HostSelection::Empty,
        }
    }

    /// Whether the character at `offset` of text leaf `node` is selected.
    pub fn covers(&self, doc: &DiffDocument, node: NodeId, offset: usize) -> bool {
        let Some((start, end)) = self.ordered(doc) else {
            return false;
        };
        doc.compare_points((start.node, start.offset), (node, offset)) != Ordering::Greater
            && doc.compare_points((node, offset + 1), (end.node, end.offset)) != Ordering::Greater
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Bounds of the word containing `chars[at]`; a non-word character is a
/// word by itself.
fn word_bounds(chars: &[char], at: usize) -> (usize, usize) {
    if !is_word_char(chars[at]) {
        return (at, at + 1);
    }
    let start = chars[..at]
        .iter()
        .rposition(|&c| !is_word_char(c))
        .map_or(0, |i| i + 1);
    let end = chars[at..]
        .iter()
        .position(|&c| !is_word_char(c))
        .map_or(chars.len(), |i| at + i);
    (start, end)
}

/// Line text of the line after the one `container` renders, same side.
fn next_line_text(doc: &DiffDocument, container: NodeId) -> Option<NodeId> {
    let line_el = doc.enclosing_line_element(container)?;
    let side = doc.side_of(line_el)?;
    let line = doc.line_number_of(line_el)?;
    let next = doc.line_element(side, line + 1)?;
    doc.line_text_container(next)
}

/// Empty cell of the other side in `container`'s row.
fn opposite_blank(doc: &DiffDocument, container: NodeId) -> Option<NodeId> {
    let side = doc.side_of(doc.enclosing_line_element(container)?)?;
    let row = doc.row_of(container)?;
    doc.children(row).iter().copied().find(|&c| {
        matches!(doc.kind(c), Some(NodeKind::Blank { side: s }) if *s == side.other())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::{diff_table, leaf, leaf_with, text_of};
    use crate::document::{DiffBuilder, Side};
    use crate::git::types::fixtures::{context, deletion, delta};
    use crate::selection::resolver::SelectionResolver;
    use crate::state::DiffViewMode;

    fn label(state: &SelectionState, doc: &DiffDocument) -> Option<String> {
        let raw = state.to_host(doc).into_raw(doc);
        SelectionResolver::new(doc)
            .resolve(&raw)
            .comment_range()
            .map(|(side, r)| format!("{} {}", side.label(), r.label()))
    }

    #[test]
    fn test_click_counting() {
        let mut state = SelectionState::default();
        let t0 = Instant::now();
        assert_eq!(state.register_click(3, 4, t0), 1);
        assert_eq!(state.register_click(3, 4, t0 + Duration::from_millis(100)), 2);
        assert_eq!(state.register_click(3, 4, t0 + Duration::from_millis(200)), 3);
        assert_eq!(state.register_click(3, 4, t0 + Duration::from_millis(300)), 1);
        assert_eq!(state.register_click(9, 4, t0 + Duration::from_millis(350)), 1);
        assert_eq!(state.register_click(9, 4, t0 + Duration::from_secs(2)), 1);
    }

    #[test]
    fn test_word_bounds() {
        let chars: Vec<char> = "let foo_bar = 1;".chars().collect();
        assert_eq!(word_bounds(&chars, 6), (4, 11));
        assert_eq!(word_bounds(&chars, 0), (0, 3));
        assert_eq!(word_bounds(&chars, 3), (3, 4));
        assert_eq!(word_bounds(&chars, 14), (14, 15));
    }

    #[test]
    fn test_backward_drag_orders_endpoints() {
        let doc = diff_table();
        let t = leaf(&doc, Side::Right, 119, 0);
        let mut state = SelectionState::default();
        state.begin(RawEndpoint::new(t, 20));
        state.extend(&doc, RawEndpoint::new(t, 10), RawEndpoint::new(t, 11));
        assert_eq!(label(&state, &doc).as_deref(), Some("right 119:10-119:20"));

        state.extend(&doc, RawEndpoint::new(t, 24), RawEndpoint::new(t, 25));
        assert_eq!(label(&state, &doc).as_deref(), Some("right 119:20-119:25"));
        assert!(state.covers(&doc, t, 20));
        assert!(state.covers(&doc, t, 24));
        assert!(!state.covers(&doc, t, 25));
    }

    #[test]
    fn test_double_click_selects_word() {
        let doc = diff_table();
        let quid = leaf_with(&doc, Side::Left, 140, "quid");
        let mut state = SelectionState::default();
        state.select_word(&doc, RawEndpoint::new(quid, 1));
        assert_eq!(label(&state, &doc).as_deref(), Some("left 140:59-140:63"));
    }

    #[test]
    fn test_double_click_past_line_end_selects_line_break() {
        let doc = diff_table();
        let container = text_of(&doc, Side::Right, 119);
        let mut state = SelectionState::default();
        state.select_word(&doc, RawEndpoint::new(container, doc.children(container).len()));
        assert_eq!(label(&state, &doc).as_deref(), Some("right 119:63-120:0"));
    }

    #[test]
    fn test_triple_click_selects_line() {
        let doc = diff_table();
        let t = leaf(&doc, Side::Right, 119, 0);
        let mut state = SelectionState::default();
        state.select_line(&doc, RawEndpoint::new(t, 5));
        assert_eq!(label(&state, &doc).as_deref(), Some("right 119:0-119:63"));
    }

    #[test]
    fn test_triple_click_on_last_line_ends_in_blank() {
        let delta = delta(vec![context(1, 1, "fn main() {}"), deletion(2, "gone")]);
        let doc = DiffBuilder::new(&delta, DiffViewMode::Split).build();
        let t = text_of(&doc, Side::Left, 2);
        let mut state = SelectionState::default();
        state.select_line(&doc, RawEndpoint::new(t, 0));
        let (_, end) = state.ordered(&doc).unwrap();
        assert!(matches!(doc.kind(end.node), Some(NodeKind::Blank { side: Side::Right })));
        assert_eq!(label(&state, &doc).as_deref(), Some("left 2:0-2:4"));
    }

    #[test]
    fn test_empty_selection() {
        let doc = diff_table();
        let mut state = SelectionState::default();
        assert_eq!(state.to_host(&doc), HostSelection::Empty);
        let t = leaf(&doc, Side::Left, 1, 0);
        state.begin(RawEndpoint::new(t, 0));
        assert!(!state.has_selection());
        state.extend(&doc, RawEndpoint::new(t, 2), RawEndpoint::new(t, 3));
        assert!(state.has_selection());
        state.clear();
        assert!(!state.has_selection());
    }

    #[test]
    fn test_release_on_pressed_cell_stays_collapsed() {
        let doc = diff_table();
        let t = leaf(&doc, Side::Right, 119, 0);
        let mut state = SelectionState::default();
        state.press(RawEndpoint::new(t, 4), RawEndpoint::new(t, 5));
        state.extend(&doc, RawEndpoint::new(t, 7), RawEndpoint::new(t, 8));
        state.extend(&doc, RawEndpoint::new(t, 4), RawEndpoint::new(t, 5));
        assert!(!state.has_selection());
        assert!(state.to_host(&doc).into_raw(&doc)[0].is_collapsed());
        assert_eq!(label(&state, &doc), None);
    }

    #[test]
    fn test_drag_direction_does_not_change_range() {
        let doc = diff_table();
        let t = leaf(&doc, Side::Right, 119, 0);
        let cell = |i: usize| (RawEndpoint::new(t, i), RawEndpoint::new(t, i + 1));

        let mut forward = SelectionState::default();
        let (s, e) = cell(4);
        forward.press(s, e);
        let (s, e) = cell(8);
        forward.extend(&doc, s, e);

        let mut backward = SelectionState::default();
        let (s, e) = cell(8);
        backward.press(s, e);
        let (s, e) = cell(4);
        backward.extend(&doc, s, e);

        assert_eq!(label(&forward, &doc).as_deref(), Some("right 119:4-119:9"));
        assert_eq!(label(&forward, &doc), label(&backward, &doc));
    }
}
