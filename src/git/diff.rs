use anyhow::{Context, Result};
use git2::{Delta, Diff, DiffOptions, Patch, Repository};

use super::repository::base_tree;
use super::types::*;
use crate::state::diff_state::DiffOptions as AppDiffOptions;

/// Enough context lines to cover any file.
const FULL_CONTEXT: u32 = 1_000_000;

pub struct DiffEngine;

impl DiffEngine {
    /// Diff `target` against the working tree, index included.
    ///
    /// Each file comes back as one hunk with the whole file as context;
    /// folding long context runs is left to the display map so gaps can be
    /// expanded without asking git again.
    pub fn compute_diff(
        repo: &Repository,
        target: &ComparisonTarget,
        options: &AppDiffOptions,
    ) -> Result<Vec<FileDelta>> {
        let mut diff_opts = DiffOptions::new();
        diff_opts
            .ignore_whitespace(options.ignore_whitespace)
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .show_untracked_content(true)
            .context_lines(FULL_CONTEXT);

        let base = base_tree(repo, target)?;

        let diff = repo
            .diff_tree_to_workdir_with_index(base.as_ref(), Some(&mut diff_opts))
            .context("Failed to diff against the working tree")?;
        Self::collect_deltas(&diff)
    }

    fn collect_deltas(diff: &Diff<'_>) -> Result<Vec<FileDelta>> {
        let mut deltas = Vec::with_capacity(diff.deltas().len());
        for (idx, delta) in diff.deltas().enumerate() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .unwrap_or_else(|| std::path::Path::new("<unknown>"))
                .to_path_buf();
            let old_path = match delta.status() {
                Delta::Renamed => delta.old_file().path().map(|p| p.to_path_buf()),
                _ => None,
            };
            let status = match delta.status() {
                Delta::Added => FileStatus::Added,
                Delta::Deleted => FileStatus::Deleted,
                Delta::Renamed => FileStatus::Renamed,
                Delta::Untracked => FileStatus::Untracked,
                _ => FileStatus::Modified,
            };

            let mut file = FileDelta {
                path,
                old_path,
                status,
                hunks: Vec::new(),
                additions: 0,
                deletions: 0,
                binary: delta.flags().is_binary(),
            };
            if !file.binary {
                if let Some(patch) = Patch::from_diff(diff, idx)? {
                    Self::collect_hunks(&patch, &mut file)?;
                }
            }
            deltas.push(file);
        }
        Ok(deltas)
    }

    fn collect_hunks(patch: &Patch<'_>, file: &mut FileDelta) -> Result<()> {
        for h in 0..patch.num_hunks() {
            let (hunk, line_count) = patch.hunk(h)?;
            let header = String::from_utf8_lossy(hunk.header()).trim_end().to_string();
            let mut lines = Vec::with_capacity(line_count);
            for l in 0..line_count {
                let line = patch.line_in_hunk(h, l)?;
                let origin = match line.origin() {
                    '+' => DiffLineOrigin::Addition,
                    '-' => DiffLineOrigin::Deletion,
                    ' ' => DiffLineOrigin::Context,
                    // "\ No newline at end of file" markers
                    _ => continue,
                };
                match origin {
                    DiffLineOrigin::Addition => file.additions += 1,
                    DiffLineOrigin::Deletion => file.deletions += 1,
                    DiffLineOrigin::Context => {}
                }
                lines.push(DiffLine {
                    origin,
                    old_lineno: line.old_lineno(),
                    new_lineno: line.new_lineno(),
                    content: String::from_utf8_lossy(line.content()).into_owned(),
                });
            }
            file.hunks.push(Hunk { header, lines });
        }
        Ok(())
    }
}
