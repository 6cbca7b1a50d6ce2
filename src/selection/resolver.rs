use crate::document::{DiffDocument, NodeId, NodeKind};

use super::normalizer::{line_length, offset_within};
use super::{NormalizedPosition, NormalizedRange, RawEndpoint, RawSelection};

/// Collapse a multi-span selection into one span: the first span's start to
/// the last span's end.
pub fn merge(selections: &[RawSelection]) -> Option<RawSelection> {
    let first = selections.first()?;
    let last = selections.last()?;
    Some(RawSelection::new(first.start, last.end))
}

/// Maps raw selections over one rendered document to side/line/column.
pub struct SelectionResolver<'a> {
    doc: &'a DiffDocument,
}

impl<'a> SelectionResolver<'a> {
    pub fn new(doc: &'a DiffDocument) -> Self {
        Self { doc }
    }

    pub fn resolve(&self, selections: &[RawSelection]) -> NormalizedRange {
        let Some(selection) = merge(selections) else {
            return NormalizedRange::default();
        };
        let mut range = NormalizedRange {
            start: self.resolve_endpoint(selection.start),
            end: self.resolve_endpoint(selection.end),
        };
        self.fix_triple_click(&mut range, &selection);
        log::debug!(
            "resolved {:?} -> {:?}",
            selection,
            range.comment_range().map(|(side, r)| (side, r.label()))
        );
        range
    }

    /// Side, line and column of one endpoint, or `None` when it is outside
    /// any addressable line.
    pub fn resolve_endpoint(&self, raw: RawEndpoint) -> Option<NormalizedPosition> {
        let doc = self.doc;
        doc.get(raw.node)?;
        let line_el = doc.enclosing_line_element(raw.node)?;
        let side = doc.side_of(line_el)?;
        let line = doc.line_number_of(line_el)?;
        let cell = doc.content_cell_of(line_el)?;
        let text = doc.line_text_container(line_el)?;

        let position = |node, column| {
            Some(NormalizedPosition {
                node,
                side,
                line,
                column,
            })
        };

        if !doc.contains(cell, raw.node) {
            return position(text, 0);
        }
        if raw.node == cell {
            // Child 0 is the line text; anything after it is past the code.
            let column = if raw.offset == 0 {
                0
            } else {
                line_length(doc, text)
            };
            return position(text, column);
        }
        if self.in_thread(cell, raw.node) {
            return position(text, line_length(doc, text));
        }
        position(raw.node, offset_within(doc, text, raw.node, raw.offset))
    }

    fn in_thread(&self, cell: NodeId, node: NodeId) -> bool {
        self.doc
            .ancestors(node)
            .take_while(|&a| a != cell)
            .any(|a| matches!(self.doc.kind(a), Some(NodeKind::CommentThread { .. })))
    }

    /// A triple-click selects a line by ending at the start of the next line,
    /// or in the blank opposite cell when there is no next line on that
    /// side. Pull the end back to the end of the start line.
    ///
    /// A start already at the end of its line is left alone: that shape is
    /// the double-click boundary gesture.
    fn fix_triple_click(&self, range: &mut NormalizedRange, raw: &RawSelection) {
        let Some(start) = range.start else {
            return;
        };
        let triple = match range.end {
            Some(end) => end.side == start.side && end.line == start.line + 1 && end.column == 0,
            None => raw.end.offset == 0 && self.is_opposite_blank(raw.end.node, &start),
        };
        if !triple {
            return;
        }
        let Some(text) = self
            .doc
            .line_element(start.side, start.line)
            .and_then(|el| self.doc.line_text_container(el))
        else {
            return;
        };
        let len = line_length(self.doc, text);
        if start.column >= len {
            return;
        }
        range.end = Some(NormalizedPosition {
            node: text,
            side: start.side,
            line: start.line,
            column: len,
        });
    }

    fn is_opposite_blank(&self, node: NodeId, start: &NormalizedPosition) -> bool {
        let opposite = start.side.other();
        let blank = match self.doc.kind(node) {
            Some(NodeKind::Blank { side }) => *side == opposite,
            Some(NodeKind::LineNumber { side, line: None }) => *side == opposite,
            _ => false,
        };
        blank
            && self
                .doc
                .line_element(start.side, start.line)
                .and_then(|el| self.doc.row_of(el))
                == self.doc.row_of(node)
    }
}
