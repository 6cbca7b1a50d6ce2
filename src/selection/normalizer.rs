use crate::document::{DiffDocument, LineRuns, NodeId, NodeKind};

/// Nearest line-text container enclosing `node`, or `node` itself when it is
/// not inside one.
pub fn find_line_text_ancestor(doc: &DiffDocument, node: NodeId) -> NodeId {
    doc.ancestors(node)
        .find(|&a| matches!(doc.kind(a), Some(NodeKind::LineText)))
        .unwrap_or(node)
}

fn with_runs<T>(doc: &DiffDocument, container: NodeId, f: impl FnOnce(&LineRuns) -> T) -> T {
    match doc.line_runs(container) {
        Some(runs) => f(runs),
        None => f(&LineRuns::build(doc, container)),
    }
}

/// Character length of the text under `container`.
pub fn line_length(doc: &DiffDocument, container: NodeId) -> usize {
    with_runs(doc, container, LineRuns::len)
}

/// Column of the point `(target, offset)` within `container`'s text.
///
/// For a text leaf `offset` counts characters into it and is clamped to the
/// leaf. For any other node it is a child index: the point sits before that
/// child, or after the node's last character when the index is past the end.
pub fn offset_within(doc: &DiffDocument, container: NodeId, target: NodeId, offset: usize) -> usize {
    with_runs(doc, container, |runs| {
        let Some((start, end)) = runs.span_of(target) else {
            return runs.len();
        };
        match doc.kind(target) {
            Some(NodeKind::Text(_)) => (start + offset).min(end),
            _ => doc
                .children(target)
                .get(offset)
                .and_then(|&child| runs.span_of(child))
                .map_or(end, |(child_start, _)| child_start),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::{diff_table, last_leaf, leaf, leaf_with, tabs, text_of};
    use crate::document::Side;

    #[test]
    fn test_offset_of_last_fragment() {
        let doc = diff_table();
        let container = text_of(&doc, Side::Left, 140);
        let epicurum = leaf_with(&doc, Side::Left, 140, "Epicurum");
        assert_eq!(offset_within(&doc, container, epicurum, 0), 75);

        let container = text_of(&doc, Side::Right, 146);
        assert_eq!(offset_within(&doc, container, last_leaf(&doc, Side::Right, 146), 0), 0);
    }

    #[test]
    fn test_line_lengths() {
        let doc = diff_table();
        assert_eq!(line_length(&doc, text_of(&doc, Side::Left, 140)), 83);
        assert_eq!(line_length(&doc, text_of(&doc, Side::Right, 120)), 48);
        assert_eq!(line_length(&doc, text_of(&doc, Side::Left, 165)), 0);
    }

    #[test]
    fn test_offset_inside_nested_text() {
        let doc = diff_table();
        let container = text_of(&doc, Side::Left, 140);
        let quid = leaf_with(&doc, Side::Left, 140, "quid");
        assert_eq!(offset_within(&doc, container, quid, 2), 61);
        // Clamped to the leaf.
        assert_eq!(offset_within(&doc, container, quid, 99), 63);
    }

    #[test]
    fn test_element_offset_is_child_index() {
        let doc = diff_table();
        let container = text_of(&doc, Side::Left, 140);
        let first_tab = tabs(&doc, Side::Left, 140)[0];
        let hl = doc.parent(first_tab).unwrap();
        assert_eq!(offset_within(&doc, container, first_tab, 0), 51);
        assert_eq!(offset_within(&doc, container, hl, 0), 51);
        assert_eq!(offset_within(&doc, container, hl, 1), 52);
        assert_eq!(offset_within(&doc, container, container, 0), 0);
        assert_eq!(offset_within(&doc, container, container, 99), 83);
    }

    #[test]
    fn test_empty_tab_placeholder_has_no_width() {
        let doc = diff_table();
        let container = text_of(&doc, Side::Left, 141);
        let empty = tabs(&doc, Side::Left, 141)[1];
        // "nam et" + tab + "complectitur"
        assert_eq!(offset_within(&doc, container, empty, 0), 19);
    }

    #[test]
    fn test_node_outside_container_is_end() {
        let doc = diff_table();
        let container = text_of(&doc, Side::Left, 140);
        let other = leaf(&doc, Side::Right, 120, 0);
        assert_eq!(offset_within(&doc, container, other, 0), 83);
        assert_eq!(find_line_text_ancestor(&doc, doc.root()), doc.root());
        assert_eq!(find_line_text_ancestor(&doc, other), text_of(&doc, Side::Right, 120));
    }
}
