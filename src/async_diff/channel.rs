use crate::git::types::{ComparisonTarget, FileDelta};
use crate::state::diff_state::DiffOptions;

/// A diff the worker should compute. Results echo `generation` so the app
/// can drop answers to requests it has since superseded.
#[derive(Debug, Clone)]
pub struct DiffRequest {
    pub generation: u64,
    pub target: ComparisonTarget,
    pub options: DiffOptions,
}

#[derive(Debug)]
pub struct DiffResult {
    pub generation: u64,
    pub outcome: Result<Vec<FileDelta>, String>,
}
