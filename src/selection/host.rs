//! Host selection shapes and their conversion to [`RawSelection`]s.

use crate::document::{DiffDocument, NodeId};

use super::{RawEndpoint, RawSelection};

/// Unit a host reports text offsets in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetUnit {
    /// Unicode scalar values.
    #[default]
    Chars,
    /// UTF-16 code units; a surrogate pair counts twice.
    Utf16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostEndpoint {
    pub node: NodeId,
    pub offset: usize,
    pub unit: OffsetUnit,
}

impl HostEndpoint {
    pub fn chars(node: NodeId, offset: usize) -> Self {
        Self {
            node,
            offset,
            unit: OffsetUnit::Chars,
        }
    }

    pub fn utf16(node: NodeId, offset: usize) -> Self {
        Self {
            node,
            offset,
            unit: OffsetUnit::Utf16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostRange {
    pub start: HostEndpoint,
    pub end: HostEndpoint,
}

impl HostRange {
    pub fn new(start: HostEndpoint, end: HostEndpoint) -> Self {
        Self { start, end }
    }
}

/// A selection as the host reports it: nothing, one span, or several
/// disjoint spans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HostSelection {
    #[default]
    Empty,
    Single(HostRange),
    Multi(Vec<HostRange>),
}

impl HostSelection {
    /// Convert to canonical selections, with every text offset in characters.
    pub fn into_raw(self, doc: &DiffDocument) -> Vec<RawSelection> {
        let ranges = match self {
            HostSelection::Empty => Vec::new(),
            HostSelection::Single(r) => vec![r],
            HostSelection::Multi(rs) => rs,
        };
        ranges
            .into_iter()
            .map(|r| RawSelection::new(to_raw(doc, r.start), to_raw(doc, r.end)))
            .collect()
    }
}

fn to_raw(doc: &DiffDocument, ep: HostEndpoint) -> RawEndpoint {
    match (ep.unit, doc.text(ep.node)) {
        (OffsetUnit::Utf16, Some(text)) => RawEndpoint::new(ep.node, utf16_to_chars(text, ep.offset)),
        // Element offsets are child indices in every unit.
        _ => RawEndpoint::new(ep.node, ep.offset),
    }
}

/// Characters of `text` covered by its first `units` UTF-16 code units.
/// An offset splitting a surrogate pair counts the whole character.
pub fn utf16_to_chars(text: &str, units: usize) -> usize {
    let mut seen = 0;
    let mut chars = 0;
    for c in text.chars() {
        if seen >= units {
            break;
        }
        seen += c.len_utf16();
        chars += 1;
    }
    chars
}
