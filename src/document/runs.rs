use super::node::{DiffDocument, NodeId, NodeKind};

/// A text leaf of a line, with its character span in the line's logical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun {
    pub node: NodeId,
    pub start: usize,
    pub len: usize,
}

impl TextRun {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A line's text flattened once at render time.
///
/// Holds the leaves in order plus the character span of every node in the
/// line-text subtree, so offset lookups are a scan over a flat list no matter
/// how deeply decorations nest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRuns {
    runs: Vec<TextRun>,
    spans: Vec<(NodeId, usize, usize)>,
    total: usize,
}

enum Visit {
    Enter(NodeId),
    Exit(usize),
}

impl LineRuns {
    /// Walk `container` in order with an explicit stack and record spans.
    pub fn build(doc: &DiffDocument, container: NodeId) -> Self {
        let mut out = LineRuns::default();
        let mut stack = vec![Visit::Enter(container)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id) => {
                    let children = doc.children(id);
                    if children.is_empty() {
                        let len = match doc.kind(id) {
                            Some(NodeKind::Text(s)) => char_len(s),
                            _ => 0,
                        };
                        out.spans.push((id, out.total, out.total + len));
                        if doc.kind(id).is_some_and(NodeKind::is_text) {
                            out.runs.push(TextRun {
                                node: id,
                                start: out.total,
                                len,
                            });
                        }
                        out.total += len;
                    } else {
                        out.spans.push((id, out.total, out.total));
                        stack.push(Visit::Exit(out.spans.len() - 1));
                        stack.extend(children.iter().rev().map(|&c| Visit::Enter(c)));
                    }
                }
                Visit::Exit(idx) => {
                    out.spans[idx].2 = out.total;
                }
            }
        }

        out
    }

    /// Character length of the line's logical text.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// `[start, end)` character span covered by `node`.
    pub fn span_of(&self, node: NodeId) -> Option<(usize, usize)> {
        self.spans
            .iter()
            .find(|(id, _, _)| *id == node)
            .map(|&(_, start, end)| (start, end))
    }
}

/// Character count of `s`; an astral character counts once.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::SectionKind;

    #[test]
    fn test_nested_spans() {
        let mut doc = DiffDocument::new();
        let section = doc.append(doc.root(), NodeKind::Section(SectionKind::Both));
        let text = doc.append(section, NodeKind::LineText);
        let a = doc.append(text, NodeKind::Text("ab".to_string()));
        let hl = doc.append(text, NodeKind::Highlight);
        let tab = doc.append(hl, NodeKind::TabIndicator { width: 4 });
        let tab_text = doc.append(tab, NodeKind::Text("\t".to_string()));
        let c = doc.append(text, NodeKind::Text("cde".to_string()));

        let runs = LineRuns::build(&doc, text);
        assert_eq!(runs.len(), 6);
        assert_eq!(runs.span_of(a), Some((0, 2)));
        assert_eq!(runs.span_of(hl), Some((2, 3)));
        assert_eq!(runs.span_of(tab), Some((2, 3)));
        assert_eq!(runs.span_of(tab_text), Some((2, 3)));
        assert_eq!(runs.span_of(c), Some((3, 6)));
        assert_eq!(runs.span_of(text), Some((0, 6)));
        let leaves: Vec<NodeId> = runs.runs().iter().map(|r| r.node).collect();
        assert_eq!(leaves, vec![a, tab_text, c]);
    }

    #[test]
    fn test_astral_character_counts_once() {
        let mut doc = DiffDocument::new();
        let text = doc.append(doc.root(), NodeKind::LineText);
        doc.append(text, NodeKind::Text("na💢ti ".to_string()));
        let runs = LineRuns::build(&doc, text);
        assert_eq!(runs.len(), 6);
    }

    #[test]
    fn test_empty_line() {
        let mut doc = DiffDocument::new();
        let text = doc.append(doc.root(), NodeKind::LineText);
        let runs = LineRuns::build(&doc, text);
        assert!(runs.is_empty());
        assert_eq!(runs.span_of(text), Some((0, 0)));
    }
}
