use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::document::{DiffDocument, LineRuns, NodeId, NodeKind, SectionKind, Side};
use crate::state::{AppState, DiffViewMode, SelectionState};
use crate::theme::Theme;

use super::screen_map::{HitTarget, ScreenMap};

/// Line number plus one space of padding.
const GUTTER_WIDTH: u16 = 6;
const THREAD_PREFIX: &str = "\u{258c} ";

pub struct DiffView;

impl DiffView {
    /// Draw the selected file and return where its nodes landed.
    pub fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) -> ScreenMap {
        let theme = &state.theme;
        let view_label = state.diff.options.view_mode.label();
        let title = match state.diff.selected_delta() {
            Some(delta) => format!(" {} [{view_label}] ", delta.path_label()),
            None => format!(" Diff [{view_label}] "),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let message = if state.diff.loading && state.diff.deltas.is_empty() {
            Some(" Loading...")
        } else if state.diff.deltas.is_empty() {
            Some(" No changes detected")
        } else if state.diff.selected_delta().is_some_and(|d| d.binary) {
            Some(" Binary file not shown")
        } else {
            None
        };
        let document = state.diff.document.as_ref().filter(|_| message.is_none());
        let Some(doc) = document else {
            let paragraph = Paragraph::new(message.unwrap_or(" Select a file to view diff"))
                .style(Style::default().fg(theme.text_muted));
            frame.render_widget(paragraph, inner);
            return ScreenMap::new(inner);
        };

        DocumentPainter {
            doc,
            theme,
            mode: state.diff.options.view_mode,
            selection: &state.selection,
            scroll: state.diff.scroll_offset,
        }
        .paint(frame.buffer_mut(), inner)
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    x: u16,
    width: u16,
}

impl Slot {
    fn end(self) -> u16 {
        self.x + self.width
    }

    fn line(self, y: u16) -> Rect {
        Rect::new(self.x, y, self.width, 1)
    }
}

/// Per-fragment decoration collected from the nodes between a text leaf
/// and its line text.
struct Decoration {
    style: Style,
    tab_width: Option<usize>,
}

/// Draws a [`DiffDocument`] cell by cell, recording a [`ScreenMap`].
///
/// Every row becomes one visual line plus one per comment thread in its
/// tallest cell. Row children are laid out left to right over fixed slots:
/// gutter, content, gutter, content in split mode; two gutters and one
/// content column in unified mode.
struct DocumentPainter<'a> {
    doc: &'a DiffDocument,
    theme: &'a Theme,
    mode: DiffViewMode,
    selection: &'a SelectionState,
    scroll: usize,
}

impl DocumentPainter<'_> {
    fn paint(&self, buf: &mut Buffer, area: Rect) -> ScreenMap {
        let mut map = ScreenMap::new(area);
        let slots = self.slots(area);
        let mut visual = 0;
        for &section in self.doc.children(self.doc.root()) {
            let Some(&NodeKind::Section(kind)) = self.doc.kind(section) else {
                continue;
            };
            for &row in self.doc.children(section) {
                visual += self.paint_row(buf, area, &slots, &mut map, kind, row, visual);
            }
        }
        map.set_total_height(visual);
        map
    }

    fn slots(&self, area: Rect) -> Vec<Slot> {
        match self.mode {
            DiffViewMode::Split => {
                let half = area.width / 2;
                let rest = area.width - half;
                let lg = GUTTER_WIDTH.min(half);
                let rg = GUTTER_WIDTH.min(rest);
                vec![
                    Slot { x: area.x, width: lg },
                    Slot { x: area.x + lg, width: half - lg },
                    Slot { x: area.x + half, width: rg },
                    Slot { x: area.x + half + rg, width: rest - rg },
                ]
            }
            DiffViewMode::Unified => {
                let g = GUTTER_WIDTH.min(area.width / 2);
                vec![
                    Slot { x: area.x, width: g },
                    Slot { x: area.x + g, width: g },
                    Slot { x: area.x + 2 * g, width: area.width - 2 * g },
                ]
            }
        }
    }

    /// Screen row of visual line `visual`, when it is in the viewport.
    fn screen_y(&self, area: Rect, visual: usize) -> Option<u16> {
        let rel = visual.checked_sub(self.scroll)?;
        (rel < area.height as usize).then(|| area.y + rel as u16)
    }

    fn threads(&self, cell: NodeId) -> Vec<NodeId> {
        self.doc
            .children(cell)
            .iter()
            .copied()
            .filter(|&c| matches!(self.doc.kind(c), Some(NodeKind::CommentThread { .. })))
            .collect()
    }

    fn row_bg(&self, kind: SectionKind, side: Side) -> Option<Color> {
        match (kind, side) {
            (SectionKind::Delta, Side::Left) => Some(self.theme.diff_del_bg),
            (SectionKind::Delta, Side::Right) => Some(self.theme.diff_add_bg),
            _ => None,
        }
    }

    fn base_style(&self, kind: SectionKind, side: Side) -> Style {
        let style = Style::default().fg(self.theme.text);
        match self.row_bg(kind, side) {
            Some(bg) => style.bg(bg),
            None => style,
        }
    }

    /// Returns the number of visual lines the row takes.
    #[allow(clippy::too_many_arguments)]
    fn paint_row(
        &self,
        buf: &mut Buffer,
        area: Rect,
        slots: &[Slot],
        map: &mut ScreenMap,
        kind: SectionKind,
        row: NodeId,
        visual: usize,
    ) -> usize {
        let cells = self.doc.children(row);
        if let Some(&control) = cells
            .first()
            .filter(|&&c| matches!(self.doc.kind(c), Some(NodeKind::ContextControl { .. })))
        {
            if let Some(y) = self.screen_y(area, visual) {
                self.paint_control(buf, area, map, control, y);
            }
            return 1;
        }

        let height = 1 + cells.iter().map(|&c| self.threads(c).len()).max().unwrap_or(0);
        for (&cell, &slot) in cells.iter().zip(slots) {
            for i in 0..height {
                let Some(y) = self.screen_y(area, visual + i) else {
                    continue;
                };
                match self.doc.kind(cell) {
                    Some(&NodeKind::Content { side }) if i == 0 => {
                        self.paint_line(buf, map, kind, side, cell, slot, y)
                    }
                    Some(&NodeKind::Content { side }) => match self.threads(cell).get(i - 1) {
                        Some(&thread) => self.paint_thread(buf, map, thread, slot, y),
                        None => {
                            buf.set_style(slot.line(y), self.base_style(kind, side));
                            map.push(slot.x, y, slot.width, HitTarget::Node(cell));
                        }
                    },
                    Some(&NodeKind::LineNumber { side, line }) => {
                        let style = self.base_style(kind, side).fg(self.theme.gutter_fg);
                        buf.set_style(slot.line(y), style);
                        if let (Some(n), 0) = (line, i) {
                            let label = format!("{n:>w$} ", w = slot.width.saturating_sub(1) as usize);
                            buf.set_stringn(slot.x, y, label, slot.width as usize, style);
                        }
                        map.push(slot.x, y, slot.width, HitTarget::Node(cell));
                    }
                    _ => {
                        buf.set_style(slot.line(y), Style::default().bg(self.theme.surface));
                        map.push(slot.x, y, slot.width, HitTarget::Node(cell));
                    }
                }
            }
        }
        height
    }

    fn paint_control(
        &self,
        buf: &mut Buffer,
        area: Rect,
        map: &mut ScreenMap,
        control: NodeId,
        y: u16,
    ) {
        let style = Style::default()
            .fg(self.theme.collapsed_fg)
            .bg(self.theme.collapsed_bg);
        let line = Rect::new(area.x, y, area.width, 1);
        buf.set_style(line, style);
        let label = self.doc.text_content(control);
        let x = area.x + area.width.saturating_sub(label.width() as u16) / 2;
        buf.set_stringn(x, y, &label, (area.x + area.width - x) as usize, style);
        map.push(area.x, y, area.width, HitTarget::Node(control));
    }

    fn decoration(&self, container: NodeId, leaf: NodeId, side: Side) -> Decoration {
        let mut style = Style::default();
        let mut tab_width = None;
        // Innermost first, so outer range markers win over emphasis.
        for node in self.doc.ancestors(leaf).take_while(|&a| a != container) {
            match self.doc.kind(node) {
                Some(NodeKind::Highlight) => {
                    style = style.bg(match side {
                        Side::Left => self.theme.emphasis_del_bg,
                        Side::Right => self.theme.emphasis_add_bg,
                    });
                }
                Some(NodeKind::RangeMarker { hovered, .. }) => {
                    let bg = if *hovered {
                        self.theme.range_marker_hover_bg
                    } else {
                        self.theme.range_marker_bg
                    };
                    style = style.bg(bg).add_modifier(Modifier::UNDERLINED);
                }
                Some(NodeKind::TabIndicator { width }) => {
                    tab_width = Some(*width);
                    style = style.fg(self.theme.text_muted);
                }
                _ => {}
            }
        }
        Decoration { style, tab_width }
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_line(
        &self,
        buf: &mut Buffer,
        map: &mut ScreenMap,
        kind: SectionKind,
        side: Side,
        cell: NodeId,
        slot: Slot,
        y: u16,
    ) {
        let base = self.base_style(kind, side);
        buf.set_style(slot.line(y), base);
        let container = self
            .doc
            .children(cell)
            .iter()
            .copied()
            .find(|&c| matches!(self.doc.kind(c), Some(NodeKind::LineText)));
        let Some(container) = container else {
            map.push(slot.x, y, slot.width, HitTarget::Node(cell));
            return;
        };
        let line = self
            .doc
            .enclosing_line_element(cell)
            .and_then(|el| self.doc.line_number_of(el));
        if let Some(line) = line {
            map.begin_line(side, line, y, slot.end().saturating_sub(1));
        }

        let built;
        let runs = match self.doc.line_runs(container) {
            Some(runs) => runs,
            None => {
                built = LineRuns::build(self.doc, container);
                &built
            }
        };

        let mut x = slot.x;
        let mut clipped = false;
        'runs: for run in runs.runs() {
            let Some(content) = self.doc.text(run.node) else {
                continue;
            };
            let decoration = self.decoration(container, run.node, side);
            for (offset, c) in content.chars().enumerate() {
                let width = match decoration.tab_width {
                    Some(w) => w as u16,
                    None => c.width().unwrap_or(0) as u16,
                };
                if x + width > slot.end() {
                    clipped = true;
                    break 'runs;
                }
                if let Some(line) = line {
                    map.push_column(side, line, x);
                }
                let mut style = base.patch(decoration.style);
                if self.selection.covers(self.doc, run.node, offset) {
                    style = style.bg(self.theme.selection_bg);
                }
                if decoration.tab_width.is_some() {
                    let glyph = format!("{:<w$}", "\u{2192}", w = width as usize);
                    buf.set_stringn(x, y, glyph, width as usize, style);
                } else if width > 0 {
                    buf.set_stringn(x, y, c.to_string(), width as usize, style);
                }
                map.push(x, y, width, HitTarget::Char { node: run.node, offset });
                x += width;
            }
        }

        if let Some(line) = line {
            map.end_line(side, line, x, clipped);
        }
        if x < slot.end() {
            map.push(x, y, slot.end() - x, HitTarget::LineEnd { line_text: container });
        }
    }

    fn paint_thread(
        &self,
        buf: &mut Buffer,
        map: &mut ScreenMap,
        thread: NodeId,
        slot: Slot,
        y: u16,
    ) {
        let style = Style::default()
            .fg(self.theme.thread_fg)
            .bg(self.theme.thread_bg);
        buf.set_style(slot.line(y), style);
        let prefix = (THREAD_PREFIX.width() as u16).min(slot.width);
        buf.set_stringn(slot.x, y, THREAD_PREFIX, prefix as usize, style);
        map.push(slot.x, y, prefix, HitTarget::Node(thread));

        let mut x = slot.x + prefix;
        let leaves = (thread..=self.doc.last_descendant(thread))
            .filter(|&n| matches!(self.doc.kind(n), Some(NodeKind::Text(_))));
        'leaves: for leaf in leaves {
            let Some(content) = self.doc.text(leaf) else {
                continue;
            };
            for (offset, c) in content.chars().enumerate() {
                let width = c.width().unwrap_or(0) as u16;
                if x + width > slot.end() {
                    break 'leaves;
                }
                let mut style = style;
                if self.selection.covers(self.doc, leaf, offset) {
                    style = style.bg(self.theme.selection_bg);
                }
                if width > 0 {
                    buf.set_stringn(x, y, c.to_string(), width as usize, style);
                }
                map.push(x, y, width, HitTarget::Char { node: leaf, offset });
                x += width;
            }
        }
        if x < slot.end() {
            map.push(x, y, slot.end() - x, HitTarget::Node(thread));
        }
    }
}
