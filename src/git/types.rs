use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Untracked,
}

impl FileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Added => "A",
            FileStatus::Deleted => "D",
            FileStatus::Modified => "M",
            FileStatus::Renamed => "R",
            FileStatus::Untracked => "?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineOrigin {
    Context,
    Addition,
    Deletion,
}

#[derive(Debug, Clone)]
pub struct DiffLine {
    pub origin: DiffLineOrigin,
    pub old_lineno: Option<u32>,
    pub new_lineno: Option<u32>,
    pub content: String,
}

impl DiffLine {
    /// Line content without its trailing newline.
    pub fn text(&self) -> &str {
        self.content
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(&self.content)
    }
}

#[derive(Debug, Clone)]
pub struct Hunk {
    pub header: String,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone)]
pub struct FileDelta {
    pub path: PathBuf,
    pub old_path: Option<PathBuf>,
    pub status: FileStatus,
    pub hunks: Vec<Hunk>,
    pub additions: usize,
    pub deletions: usize,
    pub binary: bool,
}

impl FileDelta {
    pub fn path_label(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

#[derive(Debug, Clone)]
pub enum ComparisonTarget {
    HeadVsWorkdir,
    Branch(String),
    Commit(git2::Oid),
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_strips_newline() {
        let line = DiffLine {
            origin: DiffLineOrigin::Context,
            old_lineno: Some(1),
            new_lineno: Some(1),
            content: "fn main() {}\r\n".to_string(),
        };
        assert_eq!(line.text(), "fn main() {}");
    }
}
