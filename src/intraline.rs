use std::collections::HashMap;
use std::ops::Range;

use similar::{Algorithm, DiffTag, TextDiff};

use crate::git::types::{DiffLine, DiffLineOrigin};

/// Below this similarity, a paired line is treated as rewritten and gets no
/// intraline emphasis.
const MIN_SIMILARITY: f32 = 0.4;

/// Character ranges that changed between a removed line and the added line it
/// is paired with. Returns `(old_ranges, new_ranges)`.
pub fn intraline_regions(old: &str, new: &str) -> (Vec<Range<usize>>, Vec<Range<usize>>) {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_chars(old, new);

    if diff.ratio() < MIN_SIMILARITY {
        return (Vec::new(), Vec::new());
    }

    let mut old_ranges: Vec<Range<usize>> = Vec::new();
    let mut new_ranges: Vec<Range<usize>> = Vec::new();
    for op in diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {}
            DiffTag::Delete => push_merged(&mut old_ranges, old_range),
            DiffTag::Insert => push_merged(&mut new_ranges, new_range),
            DiffTag::Replace => {
                push_merged(&mut old_ranges, old_range);
                push_merged(&mut new_ranges, new_range);
            }
        }
    }
    (old_ranges, new_ranges)
}

fn push_merged(ranges: &mut Vec<Range<usize>>, range: Range<usize>) {
    if range.is_empty() {
        return;
    }
    match ranges.last_mut() {
        Some(last) if last.end >= range.start => last.end = last.end.max(range.end),
        _ => ranges.push(range),
    }
}

/// Intraline ranges for every paired deletion/addition in a hunk, keyed by
/// hunk line index. Pairing matches the split view: the n-th line of a
/// deletion run pairs with the n-th line of the addition run after it.
pub fn hunk_intraline(lines: &[DiffLine]) -> HashMap<usize, Vec<Range<usize>>> {
    let mut out = HashMap::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].origin != DiffLineOrigin::Deletion {
            i += 1;
            continue;
        }
        let del_start = i;
        while i < lines.len() && lines[i].origin == DiffLineOrigin::Deletion {
            i += 1;
        }
        let add_start = i;
        while i < lines.len() && lines[i].origin == DiffLineOrigin::Addition {
            i += 1;
        }
        let pairs = (add_start - del_start).min(i - add_start);
        for j in 0..pairs {
            let (old_idx, new_idx) = (del_start + j, add_start + j);
            let (old_ranges, new_ranges) =
                intraline_regions(lines[old_idx].text(), lines[new_idx].text());
            if !old_ranges.is_empty() {
                out.insert(old_idx, old_ranges);
            }
            if !new_ranges.is_empty() {
                out.insert(new_idx, new_ranges);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::types::fixtures::{addition, context, deletion};

    #[test]
    fn test_single_word_change() {
        let (old, new) = intraline_regions("let count = 10;", "let count = 20;");
        assert_eq!(old, vec![12..13]);
        assert_eq!(new, vec![12..13]);
    }

    #[test]
    fn test_insertion_only_marks_new_side() {
        let (old, new) = intraline_regions("foo(a)", "foo(a, b)");
        assert!(old.is_empty());
        assert_eq!(new, vec![5..8]);
    }

    #[test]
    fn test_unrelated_lines_get_no_emphasis() {
        let (old, new) = intraline_regions("abcdefgh", "12345678");
        assert!(old.is_empty());
        assert!(new.is_empty());
    }

    #[test]
    fn test_char_ranges_count_astral_once() {
        let (_, new) = intraline_regions("a💢b", "a💢c");
        assert_eq!(new, vec![2..3]);
    }

    #[test]
    fn test_hunk_pairs_runs() {
        let lines = vec![
            context(1, 1, "fn main() {"),
            deletion(2, "    let x = 1;"),
            addition(2, "    let x = 2;"),
            addition(3, "    let y = 3;"),
            context(3, 4, "}"),
        ];
        let map = hunk_intraline(&lines);
        assert_eq!(map.get(&1), Some(&vec![12..13]));
        assert_eq!(map.get(&2), Some(&vec![12..13]));
        assert!(!map.contains_key(&3));
    }
}
