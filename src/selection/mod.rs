//! Turning text selections over the rendered diff into comment ranges.
//!
//! [`normalizer`] computes character offsets inside a line's logical text,
//! [`resolver`] maps raw endpoints to side/line/column and validates the
//! result, and [`orchestrator`] debounces selection changes and decides
//! between showing the comment affordance and creating a comment directly.

pub mod host;
pub mod hover;
pub mod normalizer;
pub mod orchestrator;
pub mod resolver;

use serde::{Deserialize, Serialize};

use crate::document::NodeId;
pub use crate::document::Side;

/// A `(node, offset)` pair as reported by the host.
///
/// For a text leaf `offset` counts characters; for any other node it is a
/// child index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEndpoint {
    pub node: NodeId,
    pub offset: usize,
}

impl RawEndpoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSelection {
    pub start: RawEndpoint,
    pub end: RawEndpoint,
}

impl RawSelection {
    pub fn new(start: RawEndpoint, end: RawEndpoint) -> Self {
        Self { start, end }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedPosition {
    pub node: NodeId,
    pub side: Side,
    pub line: u32,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizedRange {
    pub start: Option<NormalizedPosition>,
    pub end: Option<NormalizedPosition>,
}

impl NormalizedRange {
    /// Both ends present, on one side, and spanning at least one character
    /// forward.
    pub fn is_valid(&self) -> bool {
        let (Some(start), Some(end)) = (&self.start, &self.end) else {
            return false;
        };
        if start.side != end.side {
            return false;
        }
        match end.line.cmp(&start.line) {
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => end.column > start.column,
            std::cmp::Ordering::Greater => true,
        }
    }

    /// The side and comment range, when the range is valid.
    pub fn comment_range(&self) -> Option<(Side, CommentRange)> {
        if !self.is_valid() {
            return None;
        }
        let (start, end) = (self.start?, self.end?);
        Some((
            start.side,
            CommentRange {
                start_line: start.line,
                start_character: start.column,
                end_line: end.line,
                end_character: end.column,
            },
        ))
    }
}

/// Line/character span a comment is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentRange {
    pub start_line: u32,
    pub start_character: usize,
    pub end_line: u32,
    pub end_character: usize,
}

impl CommentRange {
    /// Empty range at `(line, character)`, used for boundary comments.
    pub fn zero_width(line: u32, character: usize) -> Self {
        Self {
            start_line: line,
            start_character: character,
            end_line: line,
            end_character: character,
        }
    }

    pub fn is_zero_width(&self) -> bool {
        self.start_line == self.end_line && self.start_character == self.end_character
    }

    pub fn covers_line(&self, line: u32) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Character span this range covers on `line`; `None` when it covers
    /// no characters there. `line_len` closes ranges that run past the line.
    pub fn span_on_line(&self, line: u32, line_len: usize) -> Option<(usize, usize)> {
        if !self.covers_line(line) {
            return None;
        }
        let start = if line == self.start_line {
            self.start_character.min(line_len)
        } else {
            0
        };
        let end = if line == self.end_line {
            self.end_character.min(line_len)
        } else {
            line_len
        };
        (end > start).then_some((start, end))
    }

    pub fn label(&self) -> String {
        format!(
            "{}:{}-{}:{}",
            self.start_line, self.start_character, self.end_line, self.end_character
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(side: Side, line: u32, column: usize) -> Option<NormalizedPosition> {
        Some(NormalizedPosition {
            node: 0,
            side,
            line,
            column,
        })
    }

    #[test]
    fn test_validity_rules() {
        let valid = NormalizedRange {
            start: pos(Side::Left, 3, 4),
            end: pos(Side::Left, 3, 5),
        };
        assert!(valid.is_valid());

        let same_point = NormalizedRange {
            start: pos(Side::Left, 3, 4),
            end: pos(Side::Left, 3, 4),
        };
        assert!(!same_point.is_valid());

        let cross_side = NormalizedRange {
            start: pos(Side::Left, 3, 4),
            end: pos(Side::Right, 4, 0),
        };
        assert!(!cross_side.is_valid());

        let backwards = NormalizedRange {
            start: pos(Side::Right, 5, 0),
            end: pos(Side::Right, 4, 9),
        };
        assert!(!backwards.is_valid());

        let missing_end = NormalizedRange {
            start: pos(Side::Right, 5, 0),
            end: None,
        };
        assert!(!missing_end.is_valid());
    }

    #[test]
    fn test_comment_range_from_valid_range() {
        let range = NormalizedRange {
            start: pos(Side::Right, 119, 10),
            end: pos(Side::Right, 120, 36),
        };
        let (side, cr) = range.comment_range().unwrap();
        assert_eq!(side, Side::Right);
        assert_eq!(cr.label(), "119:10-120:36");
    }

    #[test]
    fn test_span_on_line() {
        let cr = CommentRange {
            start_line: 2,
            start_character: 4,
            end_line: 4,
            end_character: 3,
        };
        assert_eq!(cr.span_on_line(1, 10), None);
        assert_eq!(cr.span_on_line(2, 10), Some((4, 10)));
        assert_eq!(cr.span_on_line(3, 10), Some((0, 10)));
        assert_eq!(cr.span_on_line(4, 10), Some((0, 3)));
        assert_eq!(CommentRange::zero_width(2, 4).span_on_line(2, 10), None);
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let json = serde_json::to_value(CommentRange::zero_width(5, 40)).unwrap();
        assert_eq!(json["start_line"], 5);
        assert_eq!(json["end_character"], 40);
    }
}
