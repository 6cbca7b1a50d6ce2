use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::git::types::FileDelta;
use crate::git::{DiffEngine, RepoCache};

use super::channel::{DiffRequest, DiffResult};

/// Runs git diffs off the UI loop, one blocking task per request.
pub struct DiffWorker {
    request_tx: mpsc::UnboundedSender<DiffRequest>,
    result_rx: mpsc::UnboundedReceiver<DiffResult>,
}

impl DiffWorker {
    pub fn new(repo_path: PathBuf) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<DiffRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<DiffResult>();

        tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                let path = repo_path.clone();
                let tx = result_tx.clone();
                tokio::task::spawn_blocking(move || {
                    let started = Instant::now();
                    let outcome = compute(&path, &request).map_err(|e| format!("{e:#}"));
                    match &outcome {
                        Ok(deltas) => log::debug!(
                            "diff {} finished: {} files in {:?}",
                            request.generation,
                            deltas.len(),
                            started.elapsed()
                        ),
                        Err(e) => log::warn!("diff {} failed: {e}", request.generation),
                    }
                    let _ = tx.send(DiffResult {
                        generation: request.generation,
                        outcome,
                    });
                });
            }
        });

        Self {
            request_tx,
            result_rx,
        }
    }

    pub fn request(&self, req: DiffRequest) {
        let _ = self.request_tx.send(req);
    }

    pub fn try_recv(&mut self) -> Option<DiffResult> {
        self.result_rx.try_recv().ok()
    }
}

fn compute(path: &Path, request: &DiffRequest) -> Result<Vec<FileDelta>> {
    let repo = RepoCache::open(path)?;
    DiffEngine::compute_diff(repo.repo(), &request.target, &request.options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::types::ComparisonTarget;
    use crate::state::DiffOptions;
    use std::time::Duration;

    async fn next_result(worker: &mut DiffWorker) -> DiffResult {
        for _ in 0..200 {
            if let Some(result) = worker.try_recv() {
                return result;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no diff result");
    }

    #[tokio::test]
    async fn test_error_is_reported_with_generation() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut worker = DiffWorker::new(dir.path().join("missing"));
        worker.request(DiffRequest {
            generation: 7,
            target: ComparisonTarget::HeadVsWorkdir,
            options: DiffOptions::new(false, false),
        });
        let result = next_result(&mut worker).await;
        assert_eq!(result.generation, 7);
        assert!(result.outcome.is_err());
    }

    #[tokio::test]
    async fn test_empty_repository_has_no_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let mut worker = DiffWorker::new(dir.path().to_path_buf());
        worker.request(DiffRequest {
            generation: 1,
            target: ComparisonTarget::HeadVsWorkdir,
            options: DiffOptions::new(false, false),
        });
        let result = next_result(&mut worker).await;
        assert_eq!(result.outcome.map(|d| d.len()), Ok(0));
    }
}
