use std::collections::HashSet;

use crate::git::types::{DiffLine, DiffLineOrigin, FileDelta};
use crate::state::DiffViewMode;

/// A filtered item from a hunk: either a visible line or a collapsed gap.
pub enum FilteredItem<'a> {
    Line {
        line: &'a DiffLine,
        hunk_line_index: usize,
    },
    CollapsedIndicator {
        hidden_count: usize,
        gap_id: usize,
    },
}

/// Filter a hunk's lines, collapsing context runs that exceed the display window.
///
/// Gap ids are assigned to every collapsible run whether or not it is currently
/// expanded, so they stay stable while gaps are opened one by one.
///
/// Returns `(filtered_items, next_gap_id_offset)`.
pub fn filter_hunk_lines<'a>(
    lines: &'a [DiffLine],
    display_context: usize,
    expanded_gaps: &HashSet<usize>,
    gap_id_offset: usize,
) -> (Vec<FilteredItem<'a>>, usize) {
    let mut items = Vec::new();
    let mut gap_id = gap_id_offset;
    let mut i = 0;

    while i < lines.len() {
        if lines[i].origin != DiffLineOrigin::Context {
            items.push(FilteredItem::Line {
                line: &lines[i],
                hunk_line_index: i,
            });
            i += 1;
            continue;
        }

        // Collect the full run of consecutive context lines
        let run_start = i;
        while i < lines.len() && lines[i].origin == DiffLineOrigin::Context {
            i += 1;
        }
        let run_end = i;
        let total = run_end - run_start;

        let show_top = if run_start > 0 { display_context } else { 0 };
        let show_bottom = if run_end < lines.len() {
            display_context
        } else {
            0
        };

        if show_top + show_bottom >= total {
            push_lines(&mut items, lines, run_start, run_end);
            continue;
        }

        let this_gap = gap_id;
        gap_id += 1;

        if expanded_gaps.contains(&this_gap) {
            push_lines(&mut items, lines, run_start, run_end);
            continue;
        }

        push_lines(&mut items, lines, run_start, run_start + show_top);
        items.push(FilteredItem::CollapsedIndicator {
            hidden_count: total - show_top - show_bottom,
            gap_id: this_gap,
        });
        push_lines(&mut items, lines, run_end - show_bottom, run_end);
    }

    (items, gap_id)
}

fn push_lines<'a>(items: &mut Vec<FilteredItem<'a>>, lines: &'a [DiffLine], from: usize, to: usize) {
    for (idx, line) in lines[from..to].iter().enumerate() {
        items.push(FilteredItem::Line {
            line,
            hunk_line_index: from + idx,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A line common to both sides.
    Context,
    /// A removed and/or added line.
    Delta,
    /// A collapsed run of context lines.
    Gap { gap_id: usize, hidden_count: usize },
}

/// What a single display row renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRowInfo {
    /// Index of the hunk this row belongs to.
    pub hunk_index: usize,
    /// Hunk line shown on the left (old) side.
    pub left: Option<usize>,
    /// Hunk line shown on the right (new) side.
    pub right: Option<usize>,
    pub kind: RowKind,
}

impl DisplayRowInfo {
    fn gap(hunk_index: usize, gap_id: usize, hidden_count: usize) -> Self {
        Self {
            hunk_index,
            left: None,
            right: None,
            kind: RowKind::Gap {
                gap_id,
                hidden_count,
            },
        }
    }
}

/// Build a display map for the split view. Runs of deletions are paired
/// row-by-row with the additions that follow them.
pub fn build_split_display_map(
    delta: &FileDelta,
    display_context: usize,
    expanded_gaps: &HashSet<usize>,
) -> Vec<DisplayRowInfo> {
    let mut rows = Vec::new();
    let mut gap_id_offset = 0;

    for (hunk_idx, hunk) in delta.hunks.iter().enumerate() {
        let (items, next_offset) =
            filter_hunk_lines(&hunk.lines, display_context, expanded_gaps, gap_id_offset);
        gap_id_offset = next_offset;

        let mut i = 0;
        while i < items.len() {
            match &items[i] {
                FilteredItem::CollapsedIndicator {
                    hidden_count,
                    gap_id,
                } => {
                    rows.push(DisplayRowInfo::gap(hunk_idx, *gap_id, *hidden_count));
                    i += 1;
                }
                FilteredItem::Line {
                    line,
                    hunk_line_index,
                } => match line.origin {
                    DiffLineOrigin::Context => {
                        rows.push(DisplayRowInfo {
                            hunk_index: hunk_idx,
                            left: Some(*hunk_line_index),
                            right: Some(*hunk_line_index),
                            kind: RowKind::Context,
                        });
                        i += 1;
                    }
                    DiffLineOrigin::Deletion | DiffLineOrigin::Addition => {
                        let dels = take_run(&items, &mut i, DiffLineOrigin::Deletion);
                        let adds = take_run(&items, &mut i, DiffLineOrigin::Addition);
                        let max = dels.len().max(adds.len());
                        for j in 0..max {
                            rows.push(DisplayRowInfo {
                                hunk_index: hunk_idx,
                                left: dels.get(j).copied(),
                                right: adds.get(j).copied(),
                                kind: RowKind::Delta,
                            });
                        }
                    }
                },
            }
        }
    }

    rows
}

/// Consume consecutive lines of `origin` starting at `*i`, returning their hunk indices.
fn take_run(items: &[FilteredItem<'_>], i: &mut usize, origin: DiffLineOrigin) -> Vec<usize> {
    let mut run = Vec::new();
    while let Some(FilteredItem::Line {
        line,
        hunk_line_index,
    }) = items.get(*i)
    {
        if line.origin != origin {
            break;
        }
        run.push(*hunk_line_index);
        *i += 1;
    }
    run
}

/// Build a display map for the unified view.
pub fn build_unified_display_map(
    delta: &FileDelta,
    display_context: usize,
    expanded_gaps: &HashSet<usize>,
) -> Vec<DisplayRowInfo> {
    let mut rows = Vec::new();
    let mut gap_id_offset = 0;

    for (hunk_idx, hunk) in delta.hunks.iter().enumerate() {
        let (items, next_offset) =
            filter_hunk_lines(&hunk.lines, display_context, expanded_gaps, gap_id_offset);
        gap_id_offset = next_offset;

        for item in &items {
            let row = match item {
                FilteredItem::CollapsedIndicator {
                    hidden_count,
                    gap_id,
                } => DisplayRowInfo::gap(hunk_idx, *gap_id, *hidden_count),
                FilteredItem::Line {
                    line,
                    hunk_line_index,
                } => {
                    let idx = Some(*hunk_line_index);
                    let (left, right, kind) = match line.origin {
                        DiffLineOrigin::Context => (idx, idx, RowKind::Context),
                        DiffLineOrigin::Deletion => (idx, None, RowKind::Delta),
                        DiffLineOrigin::Addition => (None, idx, RowKind::Delta),
                    };
                    DisplayRowInfo {
                        hunk_index: hunk_idx,
                        left,
                        right,
                        kind,
                    }
                }
            };
            rows.push(row);
        }
    }

    rows
}

/// Build the appropriate display map based on the current view mode.
pub fn build_display_map(
    delta: &FileDelta,
    mode: DiffViewMode,
    display_context: usize,
    expanded_gaps: &HashSet<usize>,
) -> Vec<DisplayRowInfo> {
    match mode {
        DiffViewMode::Split => build_split_display_map(delta, display_context, expanded_gaps),
        DiffViewMode::Unified => build_unified_display_map(delta, display_context, expanded_gaps),
    }
}
