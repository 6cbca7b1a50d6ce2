//! A hand-built diff table shared by the selection tests.
//!
//! Rows, in order:
//!
//! | section        | left                         | right                  |
//! |----------------|------------------------------|------------------------|
//! | both           | 1                            | 1                      |
//! | delta          | 2                            | 2                      |
//! | both           | 138                          | 119                    |
//! | delta          | 140 (decorated, one thread)  | 120 (decorated)        |
//! | both           | 141                          | 130                    |
//! | contextControl | gap of 21 lines              |                        |
//! | delta          | blank                        | 146                    |
//! | both           | 165 (empty)                  | 147                    |

use super::node::{DiffDocument, NodeId, NodeKind, SectionKind, Side};

pub(crate) enum Frag {
    Text(&'static str),
    /// Highlight wrapping a text leaf.
    Hl(&'static str),
    /// Highlight wrapping a tab placeholder.
    HlTab,
    Tab,
    /// Tab placeholder with no text leaf.
    EmptyTab,
    /// Range marker of an existing comment wrapping a text leaf.
    Marker(&'static str, &'static str),
}

use Frag::*;

pub(crate) const LINE_119: &str = "[14] Nam cum ad me in Cumanum salutandi causa uterque venisset,";
pub(crate) const THREAD_ID: &str = "c314";

pub(crate) fn line_140_left() -> Vec<Frag> {
    vec![
        Text("na💢ti "),
        Marker(THREAD_ID, "te, inquit"),
        Text(", sumus "),
        Hl("aliquando"),
        Text(" otiosum, "),
        Hl("certe"),
        Text(" a "),
        HlTab,
        Text("udiam, "),
        Hl("quid"),
        Text(" sit, "),
        Tab,
        Text("quod "),
        Hl("Epicurum"),
    ]
}

pub(crate) fn line_120_right() -> Vec<Frag> {
    vec![
        Text("nacti , "),
        Hl(","),
        Text(" sumus "),
        HlTab,
        Text(" otiosum,  "),
        Tab,
        Text(" audiam,  sit, quod"),
    ]
}

struct Cell {
    side: Side,
    line: Option<u32>,
    frags: Vec<Frag>,
    thread: Option<(&'static str, &'static str)>,
}

fn cell(side: Side, line: u32, frags: Vec<Frag>) -> Cell {
    Cell {
        side,
        line: Some(line),
        frags,
        thread: None,
    }
}

fn blank(side: Side) -> Cell {
    Cell {
        side,
        line: None,
        frags: Vec::new(),
        thread: None,
    }
}

fn push_cell(doc: &mut DiffDocument, row: NodeId, c: Cell) {
    let Some(line) = c.line else {
        doc.append(
            row,
            NodeKind::LineNumber {
                side: c.side,
                line: None,
            },
        );
        doc.append(row, NodeKind::Blank { side: c.side });
        return;
    };
    let gutter = doc.append(
        row,
        NodeKind::LineNumber {
            side: c.side,
            line: Some(line),
        },
    );
    let content = doc.append(row, NodeKind::Content { side: c.side });
    let text = doc.append(content, NodeKind::LineText);
    for frag in c.frags {
        push_frag(doc, text, frag);
    }
    if let Some((id, message)) = c.thread {
        let thread = doc.append(
            content,
            NodeKind::CommentThread {
                thread_id: id.to_string(),
            },
        );
        doc.append(thread, NodeKind::Text(message.to_string()));
    }
    doc.index_line(c.side, line, gutter);
}

fn push_frag(doc: &mut DiffDocument, parent: NodeId, frag: Frag) {
    let tab = |doc: &mut DiffDocument, parent| {
        let t = doc.append(parent, NodeKind::TabIndicator { width: 8 });
        doc.append(t, NodeKind::Text("\t".to_string()));
    };
    match frag {
        Text(s) => {
            doc.append(parent, NodeKind::Text(s.to_string()));
        }
        Hl(s) => {
            let hl = doc.append(parent, NodeKind::Highlight);
            doc.append(hl, NodeKind::Text(s.to_string()));
        }
        HlTab => {
            let hl = doc.append(parent, NodeKind::Highlight);
            tab(doc, hl);
        }
        Tab => tab(doc, parent),
        EmptyTab => {
            doc.append(parent, NodeKind::TabIndicator { width: 8 });
        }
        Marker(id, s) => {
            let m = doc.append(
                parent,
                NodeKind::RangeMarker {
                    range_id: id.to_string(),
                    hovered: false,
                },
            );
            doc.append(m, NodeKind::Text(s.to_string()));
        }
    }
}

fn section(doc: &mut DiffDocument, kind: SectionKind, left: Cell, right: Cell) {
    let s = doc.append(doc.root(), NodeKind::Section(kind));
    let row = doc.append(s, NodeKind::Row);
    push_cell(doc, row, left);
    push_cell(doc, row, right);
}

pub(crate) fn diff_table() -> DiffDocument {
    let mut doc = DiffDocument::new();

    section(
        &mut doc,
        SectionKind::Both,
        cell(
            Side::Left,
            1,
            vec![Text("[1] Nam cum ad me in Cumanum salutandi causa uterque venisset,")],
        ),
        cell(
            Side::Right,
            1,
            vec![Text("[1] Nam cum ad me in Cumanum salutandi causa uterque")],
        ),
    );
    section(
        &mut doc,
        SectionKind::Delta,
        cell(Side::Left, 2, vec![Text("na💢ti "), Hl("te, inquit"), Text(", sumus")]),
        cell(Side::Right, 2, vec![Text("nacti , "), Hl(","), Text(" sumus")]),
    );
    section(
        &mut doc,
        SectionKind::Both,
        cell(Side::Left, 138, vec![Text(LINE_119)]),
        cell(Side::Right, 119, vec![Text(LINE_119)]),
    );

    let mut left_140 = cell(Side::Left, 140, line_140_left());
    left_140.thread = Some((THREAD_ID, "[Yet another random diff thread content here]"));
    section(
        &mut doc,
        SectionKind::Delta,
        left_140,
        cell(Side::Right, 120, line_120_right()),
    );

    section(
        &mut doc,
        SectionKind::Both,
        cell(
            Side::Left,
            141,
            vec![
                Text("nam et"),
                HlTab,
                Text("complectitur"),
                EmptyTab,
                Text("verbis, quod vult, et dicit plane, quod intellegam;"),
            ],
        ),
        cell(
            Side::Right,
            130,
            vec![Text(
                "nam et complectitur verbis, quod vult, et dicit plane, quodintellegam;",
            )],
        ),
    );

    let s = doc.append(doc.root(), NodeKind::Section(SectionKind::ContextControl));
    let row = doc.append(s, NodeKind::Row);
    let control = doc.append(
        row,
        NodeKind::ContextControl {
            gap_id: 0,
            hidden: 21,
        },
    );
    doc.append(control, NodeKind::Text("Show 21 common lines".to_string()));

    section(
        &mut doc,
        SectionKind::Delta,
        blank(Side::Left),
        cell(
            Side::Right,
            146,
            vec![Text(
                "[17] Quid igitur est? inquit; audire enim cupio, quid non probes. Principio, inquam,",
            )],
        ),
    );
    section(
        &mut doc,
        SectionKind::Both,
        cell(Side::Left, 165, Vec::new()),
        cell(
            Side::Right,
            147,
            vec![
                Text("in physicis, "),
                HlTab,
                Text("quibus maxime gloriatur, primum totus est alienus. Democritea dicit"),
            ],
        ),
    );

    doc.finalize();
    doc
}

// ── Queries ────────────────────────────────────────────────────────

pub(crate) fn text_of(doc: &DiffDocument, side: Side, line: u32) -> NodeId {
    doc.line_element(side, line)
        .and_then(|el| doc.line_text_container(el))
        .unwrap_or_else(|| panic!("no line text for {side:?} {line}"))
}

pub(crate) fn content_of(doc: &DiffDocument, side: Side, line: u32) -> NodeId {
    doc.line_element(side, line)
        .and_then(|el| doc.content_cell_of(el))
        .unwrap_or_else(|| panic!("no content cell for {side:?} {line}"))
}

/// The `i`-th text leaf of a line.
pub(crate) fn leaf(doc: &DiffDocument, side: Side, line: u32, i: usize) -> NodeId {
    let container = text_of(doc, side, line);
    doc.line_runs(container).expect("runs").runs()[i].node
}

pub(crate) fn last_leaf(doc: &DiffDocument, side: Side, line: u32) -> NodeId {
    let container = text_of(doc, side, line);
    doc.line_runs(container)
        .and_then(|r| r.runs().last())
        .expect("a text leaf")
        .node
}

/// Text leaf of a line whose content is exactly `text`.
pub(crate) fn leaf_with(doc: &DiffDocument, side: Side, line: u32, text: &str) -> NodeId {
    let container = text_of(doc, side, line);
    doc.line_runs(container)
        .expect("runs")
        .runs()
        .iter()
        .map(|r| r.node)
        .find(|&n| doc.text(n) == Some(text))
        .unwrap_or_else(|| panic!("no leaf {text:?}"))
}

/// Tab placeholders of a line in order.
pub(crate) fn tabs(doc: &DiffDocument, side: Side, line: u32) -> Vec<NodeId> {
    let container = text_of(doc, side, line);
    (container..=doc.last_descendant(container))
        .filter(|&n| matches!(doc.kind(n), Some(NodeKind::TabIndicator { .. })))
        .collect()
}

pub(crate) fn thread_of(doc: &DiffDocument, side: Side, line: u32) -> NodeId {
    let cell = content_of(doc, side, line);
    doc.children(cell)
        .iter()
        .copied()
        .find(|&c| matches!(doc.kind(c), Some(NodeKind::CommentThread { .. })))
        .expect("a comment thread")
}

pub(crate) fn context_control(doc: &DiffDocument) -> NodeId {
    (0..doc.node_count())
        .find(|&n| matches!(doc.kind(n), Some(NodeKind::ContextControl { .. })))
        .expect("a context control")
}
