use std::collections::HashMap;

use ratatui::layout::Rect;

use crate::document::{DiffDocument, NodeId, Side};
use crate::selection::orchestrator::SelectionSurface;
use crate::selection::RawEndpoint;

/// What a screen cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A character of a text leaf. Wide characters and tabs cover
    /// several cells with the same target.
    Char { node: NodeId, offset: usize },
    /// Empty space right of a line's last character.
    LineEnd { line_text: NodeId },
    /// Any other node: gutter, blank cell, context control, thread margin.
    Node(NodeId),
}

impl HitTarget {
    /// Document points just before and just after the cell.
    pub fn endpoints(self, doc: &DiffDocument) -> (RawEndpoint, RawEndpoint) {
        match self {
            HitTarget::Char { node, offset } => {
                (RawEndpoint::new(node, offset), RawEndpoint::new(node, offset + 1))
            }
            HitTarget::LineEnd { line_text } => {
                let end = RawEndpoint::new(line_text, doc.children(line_text).len());
                (end, end)
            }
            HitTarget::Node(node) => (RawEndpoint::new(node, 0), RawEndpoint::new(node, 0)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HitSpan {
    x: u16,
    y: u16,
    width: u16,
    target: HitTarget,
}

/// Screen columns of one drawn line.
#[derive(Debug, Clone, Default)]
struct LineCells {
    y: u16,
    /// `columns[i]` is the x of character `i`.
    columns: Vec<u16>,
    /// First cell after the drawn text.
    end_x: u16,
    /// Last cell of the content slot.
    last_x: u16,
    /// Some characters did not fit.
    clipped: bool,
}

/// Where each part of the document landed on screen in the last frame.
#[derive(Debug, Clone, Default)]
pub struct ScreenMap {
    area: Rect,
    spans: Vec<HitSpan>,
    lines: HashMap<(Side, u32), LineCells>,
    /// Visual lines the whole document needs, on screen or not.
    total_height: usize,
}

impl ScreenMap {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            ..Default::default()
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn total_height(&self) -> usize {
        self.total_height
    }

    pub(super) fn set_total_height(&mut self, height: usize) {
        self.total_height = height;
    }

    pub(super) fn push(&mut self, x: u16, y: u16, width: u16, target: HitTarget) {
        if width > 0 {
            self.spans.push(HitSpan { x, y, width, target });
        }
    }

    pub(super) fn begin_line(&mut self, side: Side, line: u32, y: u16, last_x: u16) {
        self.lines.insert(
            (side, line),
            LineCells {
                y,
                last_x,
                ..Default::default()
            },
        );
    }

    pub(super) fn push_column(&mut self, side: Side, line: u32, x: u16) {
        if let Some(cells) = self.lines.get_mut(&(side, line)) {
            cells.columns.push(x);
        }
    }

    pub(super) fn end_line(&mut self, side: Side, line: u32, end_x: u16, clipped: bool) {
        if let Some(cells) = self.lines.get_mut(&(side, line)) {
            cells.end_x = end_x.min(cells.last_x);
            cells.clipped = clipped;
        }
    }

    /// Target of the cell at `(x, y)`.
    pub fn hit(&self, x: u16, y: u16) -> Option<HitTarget> {
        self.spans
            .iter()
            .find(|s| s.y == y && x >= s.x && x < s.x.saturating_add(s.width))
            .map(|s| s.target)
    }

    /// Screen cell of `(side, line, column)`. Columns cut off at the right
    /// edge map to the last cell of the line.
    pub fn locate(&self, side: Side, line: u32, column: usize) -> Option<(u16, u16)> {
        let cells = self.lines.get(&(side, line))?;
        let x = match cells.columns.get(column) {
            Some(&x) => x,
            None if cells.clipped => cells.last_x,
            None => cells.end_x,
        };
        Some((x, cells.y))
    }
}

/// The document as drawn in one frame, for the selection orchestrator.
pub struct RenderedDiff<'a> {
    pub generation: u64,
    pub doc: &'a DiffDocument,
    pub map: &'a ScreenMap,
}

impl SelectionSurface for RenderedDiff<'_> {
    fn id(&self) -> u64 {
        self.generation
    }

    fn document(&self) -> &DiffDocument {
        self.doc
    }

    fn locate(&self, side: Side, line: u32, column: usize) -> Option<(u16, u16)> {
        self.map.locate(side, line, column)
    }
}
