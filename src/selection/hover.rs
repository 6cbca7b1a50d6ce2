use crate::document::{DiffDocument, NodeId, NodeKind};

/// Thread id of the comment thread `node` sits in, if any.
pub fn thread_at(doc: &DiffDocument, node: NodeId) -> Option<&str> {
    doc.ancestors(node).find_map(|a| match doc.kind(a) {
        Some(NodeKind::CommentThread { thread_id }) => Some(thread_id.as_str()),
        _ => None,
    })
}

/// Pointer entered or left a comment thread: flip the hover flag on every
/// range marker of that thread. Returns how many markers changed.
pub fn thread_hover(doc: &mut DiffDocument, thread_id: &str, entered: bool) -> usize {
    let changed = doc.set_range_hover(thread_id, entered);
    if changed > 0 {
        log::trace!("thread {thread_id} hover={entered} ({changed} markers)");
    }
    changed
}
