use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::runs::LineRuns;

/// Index of a node inside a [`DiffDocument`] arena.
///
/// Nodes are appended in tree order, so ids follow a pre-order walk.
pub type NodeId = usize;

/// Which version of a line a position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Base version ("before").
    Left,
    /// Revision version ("after").
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Lines common to both sides.
    Both,
    /// Removed and/or added lines.
    Delta,
    /// A collapsed run of common lines.
    ContextControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Table,
    Section(SectionKind),
    Row,
    /// Gutter cell of one side. This is the "line element" of a rendered line;
    /// `line` is `None` when the side has no line in this row.
    LineNumber { side: Side, line: Option<u32> },
    /// Cell holding a line's text and any comment threads.
    Content { side: Side },
    /// Empty counterpart cell when only one side has a line.
    Blank { side: Side },
    /// Logical text container of a line.
    LineText,
    /// Intraline edit emphasis.
    Highlight,
    /// Marks text covered by an existing range comment.
    RangeMarker { range_id: String, hovered: bool },
    /// Placeholder wrapping a tab character, rendered `width` cells wide.
    TabIndicator { width: usize },
    Text(String),
    CommentThread { thread_id: String },
    ContextControl { gap_id: usize, hidden: usize },
}

impl NodeKind {
    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text(_))
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// The rendered diff as an arena tree.
///
/// Mirrors a diff table: table, sections, rows, gutter/content/blank cells,
/// line text, decorations and text leaves. The selection subsystem only reads
/// it, apart from the hover flag on range markers.
#[derive(Debug, Clone)]
pub struct DiffDocument {
    nodes: Vec<Node>,
    runs: HashMap<NodeId, LineRuns>,
    lines: HashMap<(Side, u32), NodeId>,
}

impl Default for DiffDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffDocument {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Table,
                parent: None,
                children: Vec::new(),
            }],
            runs: HashMap::new(),
            lines: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append a child under `parent` and return its id.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|n| &n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(s) => Some(s),
            _ => None,
        }
    }

    /// `node` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.get(node).map(|_| node),
        }
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Concatenated text of every leaf under `node`.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(NodeKind::Text(s)) = self.kind(id) {
                out.push_str(s);
            }
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Last node of `node`'s subtree in tree order.
    pub fn last_descendant(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(&last) = self.children(current).last() {
            current = last;
        }
        current
    }

    /// The row a node sits in, if any.
    pub fn row_of(&self, node: NodeId) -> Option<NodeId> {
        self.ancestors(node)
            .find(|&a| matches!(self.kind(a), Some(NodeKind::Row)))
    }

    pub fn line_runs(&self, line_text: NodeId) -> Option<&LineRuns> {
        self.runs.get(&line_text)
    }

    /// Register `line_el` as the gutter of `(side, line)`.
    pub fn index_line(&mut self, side: Side, line: u32, line_el: NodeId) {
        self.lines.insert((side, line), line_el);
    }

    /// Line element rendered for `(side, line)`, if that line is visible.
    pub fn line_element(&self, side: Side, line: u32) -> Option<NodeId> {
        self.lines.get(&(side, line)).copied()
    }

    /// Flatten every line-text container into its text runs.
    pub fn finalize(&mut self) {
        let containers: Vec<NodeId> = (0..self.nodes.len())
            .filter(|&id| matches!(self.nodes[id].kind, NodeKind::LineText))
            .collect();
        for id in containers {
            let runs = LineRuns::build(self, id);
            self.runs.insert(id, runs);
        }
    }

    /// Toggle the hover flag on every range marker of `range_id`.
    /// Returns how many markers changed.
    pub fn set_range_hover(&mut self, range_id: &str, hovered: bool) -> usize {
        let mut changed = 0;
        for node in &mut self.nodes {
            if let NodeKind::RangeMarker {
                range_id: id,
                hovered: flag,
            } = &mut node.kind
            {
                if id == range_id && *flag != hovered {
                    *flag = hovered;
                    changed += 1;
                }
            }
        }
        changed
    }

    // ── Line lookups used by the selection resolver ────────────────

    /// Nearest rendered-line element for `node`.
    ///
    /// A gutter cell is its own line element; a content cell maps to the
    /// gutter of the same side in its row. Stops at section boundaries.
    pub fn enclosing_line_element(&self, node: NodeId) -> Option<NodeId> {
        for id in self.ancestors(node) {
            match self.kind(id)? {
                NodeKind::LineNumber { .. } => return Some(id),
                NodeKind::Content { side } => {
                    let row = self.parent(id)?;
                    return self.children(row).iter().copied().find(|&c| {
                        matches!(
                            self.kind(c),
                            Some(NodeKind::LineNumber { side: s, line: Some(_) }) if s == side
                        )
                    });
                }
                NodeKind::Section(_) | NodeKind::Table => return None,
                _ => {}
            }
        }
        None
    }

    pub fn side_of(&self, line_el: NodeId) -> Option<Side> {
        match self.kind(line_el)? {
            NodeKind::LineNumber { side, .. } => Some(*side),
            _ => None,
        }
    }

    pub fn line_number_of(&self, line_el: NodeId) -> Option<u32> {
        match self.kind(line_el)? {
            NodeKind::LineNumber { line, .. } => *line,
            _ => None,
        }
    }

    /// Content cell paired with a line element.
    pub fn content_cell_of(&self, line_el: NodeId) -> Option<NodeId> {
        let side = self.side_of(line_el)?;
        let row = self.parent(line_el)?;
        self.children(row)
            .iter()
            .copied()
            .find(|&c| matches!(self.kind(c), Some(NodeKind::Content { side: s }) if *s == side))
    }

    /// Logical text container of the line a line element renders.
    pub fn line_text_container(&self, line_el: NodeId) -> Option<NodeId> {
        let cell = self.content_cell_of(line_el)?;
        self.children(cell)
            .iter()
            .copied()
            .find(|&c| matches!(self.kind(c), Some(NodeKind::LineText)))
    }

    // ── Ordering ───────────────────────────────────────────────────

    /// Comparable key for a `(node, offset)` point in tree order.
    fn point_key(&self, node: NodeId, offset: usize) -> (NodeId, usize) {
        match self.kind(node) {
            Some(NodeKind::Text(_)) | None => (node, offset),
            Some(_) => match self.children(node).get(offset) {
                Some(&child) => (child, 0),
                None => (self.last_descendant(node), usize::MAX),
            },
        }
    }

    /// Order two `(node, offset)` points as they appear in the document.
    pub fn compare_points(&self, a: (NodeId, usize), b: (NodeId, usize)) -> Ordering {
        self.point_key(a.0, a.1).cmp(&self.point_key(b.0, b.1))
    }
}

pub struct Ancestors<'a> {
    doc: &'a DiffDocument,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}
