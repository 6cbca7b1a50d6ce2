use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::display_map::{build_display_map, DisplayRowInfo, RowKind};
use crate::git::types::{DiffLine, FileDelta};
use crate::intraline::hunk_intraline;
use crate::state::comment_state::RangeComment;
use crate::state::DiffViewMode;

use super::node::{DiffDocument, NodeId, NodeKind, SectionKind, Side};

/// Renders a file delta into a [`DiffDocument`].
///
/// Line text is split into fragments at every decoration boundary: intraline
/// emphasis, range markers of existing comments and tab placeholders. Comment
/// threads are appended to the content cell of the line their range ends on.
pub struct DiffBuilder<'a> {
    delta: &'a FileDelta,
    mode: DiffViewMode,
    display_context: usize,
    expanded_gaps: HashSet<usize>,
    comments: &'a [RangeComment],
    tab_size: usize,
}

impl<'a> DiffBuilder<'a> {
    pub fn new(delta: &'a FileDelta, mode: DiffViewMode) -> Self {
        Self {
            delta,
            mode,
            display_context: 3,
            expanded_gaps: HashSet::new(),
            comments: &[],
            tab_size: 4,
        }
    }

    pub fn display_context(mut self, lines: usize) -> Self {
        self.display_context = lines;
        self
    }

    pub fn expanded_gaps(mut self, gaps: &HashSet<usize>) -> Self {
        self.expanded_gaps = gaps.clone();
        self
    }

    pub fn comments(mut self, comments: &'a [RangeComment]) -> Self {
        self.comments = comments;
        self
    }

    pub fn tab_size(mut self, width: usize) -> Self {
        self.tab_size = width.max(1);
        self
    }

    pub fn build(&self) -> DiffDocument {
        let rows = build_display_map(
            self.delta,
            self.mode,
            self.display_context,
            &self.expanded_gaps,
        );
        let intraline: Vec<HashMap<usize, Vec<Range<usize>>>> = self
            .delta
            .hunks
            .iter()
            .map(|h| hunk_intraline(&h.lines))
            .collect();

        let mut doc = DiffDocument::new();
        let mut current: Option<(SectionKind, NodeId)> = None;

        for row in &rows {
            let kind = match row.kind {
                RowKind::Context => SectionKind::Both,
                RowKind::Delta => SectionKind::Delta,
                RowKind::Gap { .. } => SectionKind::ContextControl,
            };
            let section = match current {
                Some((k, id)) if k == kind && kind != SectionKind::ContextControl => id,
                _ => {
                    let id = doc.append(doc.root(), NodeKind::Section(kind));
                    current = Some((kind, id));
                    id
                }
            };
            let tr = doc.append(section, NodeKind::Row);

            if let RowKind::Gap {
                gap_id,
                hidden_count,
            } = row.kind
            {
                let control = doc.append(
                    tr,
                    NodeKind::ContextControl {
                        gap_id,
                        hidden: hidden_count,
                    },
                );
                doc.append(
                    control,
                    NodeKind::Text(format!("\u{22ef} {hidden_count} common lines \u{22ef}")),
                );
                continue;
            }

            let emphasis = &intraline[row.hunk_index];
            match self.mode {
                DiffViewMode::Split => self.split_row(&mut doc, tr, row, emphasis),
                DiffViewMode::Unified => self.unified_row(&mut doc, tr, row, emphasis),
            }
        }

        doc.finalize();
        doc
    }

    fn hunk_line(&self, row: &DisplayRowInfo, index: Option<usize>) -> Option<(usize, &DiffLine)> {
        let index = index?;
        let line = self.delta.hunks.get(row.hunk_index)?.lines.get(index)?;
        Some((index, line))
    }

    fn split_row(
        &self,
        doc: &mut DiffDocument,
        tr: NodeId,
        row: &DisplayRowInfo,
        emphasis: &HashMap<usize, Vec<Range<usize>>>,
    ) {
        for side in [Side::Left, Side::Right] {
            let index = match side {
                Side::Left => row.left,
                Side::Right => row.right,
            };
            let numbered = self.hunk_line(row, index).and_then(|(idx, line)| {
                let lineno = match side {
                    Side::Left => line.old_lineno,
                    Side::Right => line.new_lineno,
                }?;
                Some((idx, line, lineno))
            });

            match numbered {
                Some((idx, line, lineno)) => {
                    let gutter = doc.append(
                        tr,
                        NodeKind::LineNumber {
                            side,
                            line: Some(lineno),
                        },
                    );
                    let hl = emphasis.get(&idx).map(Vec::as_slice).unwrap_or(&[]);
                    self.content_cell(doc, tr, side, lineno, line.text(), hl);
                    doc.index_line(side, lineno, gutter);
                }
                None => {
                    doc.append(tr, NodeKind::LineNumber { side, line: None });
                    doc.append(tr, NodeKind::Blank { side });
                }
            }
        }
    }

    fn unified_row(
        &self,
        doc: &mut DiffDocument,
        tr: NodeId,
        row: &DisplayRowInfo,
        emphasis: &HashMap<usize, Vec<Range<usize>>>,
    ) {
        let left = self.hunk_line(row, row.left);
        let right = self.hunk_line(row, row.right);
        let old = left.and_then(|(_, l)| l.old_lineno);
        let new = right.and_then(|(_, l)| l.new_lineno);

        let left_gutter = doc.append(
            tr,
            NodeKind::LineNumber {
                side: Side::Left,
                line: old,
            },
        );
        let right_gutter = doc.append(
            tr,
            NodeKind::LineNumber {
                side: Side::Right,
                line: new,
            },
        );

        // Common lines are addressed on the right, as in the split view's
        // revision column.
        let target = match (right, new, left, old) {
            (Some((idx, line)), Some(n), _, _) => Some((Side::Right, idx, line, n, right_gutter)),
            (_, _, Some((idx, line)), Some(n)) => Some((Side::Left, idx, line, n, left_gutter)),
            _ => None,
        };
        let Some((side, idx, line, lineno, gutter)) = target else {
            return;
        };
        let hl = emphasis.get(&idx).map(Vec::as_slice).unwrap_or(&[]);
        self.content_cell(doc, tr, side, lineno, line.text(), hl);
        doc.index_line(side, lineno, gutter);
    }

    fn content_cell(
        &self,
        doc: &mut DiffDocument,
        tr: NodeId,
        side: Side,
        lineno: u32,
        text: &str,
        emphasis: &[Range<usize>],
    ) {
        let cell = doc.append(tr, NodeKind::Content { side });
        let container = doc.append(cell, NodeKind::LineText);
        self.fragments(doc, container, side, lineno, text, emphasis);

        for comment in self
            .comments
            .iter()
            .filter(|c| c.thread_line_is(side, lineno))
        {
            let thread = doc.append(
                cell,
                NodeKind::CommentThread {
                    thread_id: comment.id.clone(),
                },
            );
            doc.append(thread, NodeKind::Text(comment.message.clone()));
        }
    }

    /// Split `text` at every decoration boundary and nest each fragment in
    /// its markers, emphasis and tab placeholder, outermost first.
    fn fragments(
        &self,
        doc: &mut DiffDocument,
        container: NodeId,
        side: Side,
        lineno: u32,
        text: &str,
        emphasis: &[Range<usize>],
    ) {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        let markers: Vec<(&str, usize, usize)> = self
            .comments
            .iter()
            .filter(|c| c.side == side)
            .filter_map(|c| {
                c.range
                    .span_on_line(lineno, len)
                    .map(|(s, e)| (c.id.as_str(), s, e))
            })
            .collect();

        let mut bounds = vec![0, len];
        for r in emphasis {
            bounds.push(r.start.min(len));
            bounds.push(r.end.min(len));
        }
        for (_, s, e) in &markers {
            bounds.push(*s);
            bounds.push(*e);
        }
        for (i, c) in chars.iter().enumerate() {
            if *c == '\t' {
                bounds.push(i);
                bounds.push(i + 1);
            }
        }
        bounds.sort_unstable();
        bounds.dedup();

        for w in bounds.windows(2) {
            let (a, b) = (w[0], w[1]);
            let mut parent = container;
            for (id, s, e) in &markers {
                if *s <= a && b <= *e {
                    parent = doc.append(
                        parent,
                        NodeKind::RangeMarker {
                            range_id: id.to_string(),
                            hovered: false,
                        },
                    );
                }
            }
            if emphasis.iter().any(|r| r.start <= a && b <= r.end) {
                parent = doc.append(parent, NodeKind::Highlight);
            }
            let segment: String = chars[a..b].iter().collect();
            if segment == "\t" {
                parent = doc.append(
                    parent,
                    NodeKind::TabIndicator {
                        width: self.tab_size,
                    },
                );
            }
            doc.append(parent, NodeKind::Text(segment));
        }
    }
}
