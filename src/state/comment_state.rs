use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::selection::{CommentRange, Side};

/// A review comment anchored to a side and a character range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeComment {
    /// Thread id; range markers in the rendered diff carry the same id.
    pub id: String,
    pub path: String,
    pub side: Side,
    pub range: CommentRange,
    pub message: String,
    pub created_at: String,
}

impl RangeComment {
    /// Whether this comment's thread is rendered under `(side, line)`.
    /// Threads sit on the last line of their range.
    pub fn thread_line_is(&self, side: Side, line: u32) -> bool {
        self.side == side && self.range.end_line == line
    }
}

/// In-memory comments for the session, keyed by file path.
#[derive(Debug, Default)]
pub struct CommentState {
    comments: BTreeMap<String, Vec<RangeComment>>,
    next_id: u64,
}

impl CommentState {
    /// Record a comment and return its thread id.
    pub fn add(&mut self, path: &str, side: Side, range: CommentRange, message: String) -> String {
        self.next_id += 1;
        let id = format!("c{}", self.next_id);
        self.comments
            .entry(path.to_string())
            .or_default()
            .push(RangeComment {
                id: id.clone(),
                path: path.to_string(),
                side,
                range,
                message,
                created_at: chrono::Utc::now().to_rfc3339(),
            });
        id
    }

    pub fn for_file(&self, path: &str) -> &[RangeComment] {
        self.comments.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, id: &str) -> Option<&RangeComment> {
        self.comments.values().flatten().find(|c| c.id == id)
    }

    /// Remove a comment by thread id. Returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let mut removed = false;
        self.comments.retain(|_, list| {
            let before = list.len();
            list.retain(|c| c.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    pub fn count(&self) -> usize {
        self.comments.values().map(|v| v.len()).sum()
    }

    /// All comments sorted by file, side and start position.
    pub fn all_sorted(&self) -> Vec<&RangeComment> {
        let mut result: Vec<&RangeComment> = self.comments.values().flatten().collect();
        result.sort_by(|a, b| {
            (&a.path, a.side, a.range.start_line, a.range.start_character).cmp(&(
                &b.path,
                b.side,
                b.range.start_line,
                b.range.start_character,
            ))
        });
        result
    }

    /// Serialize every comment for hand-off to the persistence layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.all_sorted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start_line: u32, end_line: u32) -> CommentRange {
        CommentRange {
            start_line,
            start_character: 0,
            end_line,
            end_character: 4,
        }
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut state = CommentState::default();
        let a = state.add("a.rs", Side::Left, range(1, 2), "one".to_string());
        let b = state.add("a.rs", Side::Right, range(3, 3), "two".to_string());
        assert_eq!(a, "c1");
        assert_eq!(b, "c2");
        assert_eq!(state.for_file("a.rs").len(), 2);
        assert!(state.for_file("b.rs").is_empty());
        assert_eq!(state.get("c2").map(|c| c.side), Some(Side::Right));
    }

    #[test]
    fn test_remove_drops_empty_files() {
        let mut state = CommentState::default();
        let id = state.add("a.rs", Side::Left, range(1, 1), "x".to_string());
        assert!(state.remove(&id));
        assert!(!state.remove(&id));
        assert_eq!(state.count(), 0);
        assert!(state.all_sorted().is_empty());
    }

    #[test]
    fn test_sorted_by_file_then_position() {
        let mut state = CommentState::default();
        state.add("b.rs", Side::Left, range(1, 1), "b".to_string());
        state.add("a.rs", Side::Right, range(9, 9), "a9".to_string());
        state.add("a.rs", Side::Right, range(2, 3), "a2".to_string());
        let order: Vec<&str> = state
            .all_sorted()
            .iter()
            .map(|c| c.message.as_str())
            .collect();
        assert_eq!(order, vec!["a2", "a9", "b"]);
    }

    #[test]
    fn test_json_uses_wire_field_names() {
        let mut state = CommentState::default();
        state.add("a.rs", Side::Right, range(5, 5), "hi".to_string());
        let json = state.to_json().unwrap();
        assert!(json.contains("\"side\": \"right\""));
        assert!(json.contains("\"start_line\": 5"));
    }

    #[test]
    fn test_thread_line_is_end_line() {
        let mut state = CommentState::default();
        state.add("a.rs", Side::Left, range(2, 4), "x".to_string());
        let c = &state.for_file("a.rs")[0];
        assert!(c.thread_line_is(Side::Left, 4));
        assert!(!c.thread_line_is(Side::Left, 2));
        assert!(!c.thread_line_is(Side::Right, 4));
    }
}
