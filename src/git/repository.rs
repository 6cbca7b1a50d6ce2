use anyhow::{Context, Result};
use git2::{Repository, Tree};
use std::path::{Path, PathBuf};

use super::types::ComparisonTarget;

/// An opened working-tree repository.
pub struct RepoCache {
    repo: Repository,
    workdir: PathBuf,
}

impl RepoCache {
    /// Find the repository containing `path`, searching parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("No git repository at or above {}", path.display()))?;
        let Some(workdir) = repo.workdir().map(Path::to_path_buf) else {
            anyhow::bail!("{} is a bare repository", repo.path().display());
        };
        Ok(Self { repo, workdir })
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Fail early when `target` does not name a tree in this repository.
    pub fn check_target(&self, target: &ComparisonTarget) -> Result<()> {
        base_tree(&self.repo, target).map(|_| ())
    }
}

/// Tree the working tree is compared against. `None` for an unborn HEAD,
/// where every file counts as added.
pub fn base_tree<'r>(repo: &'r Repository, target: &ComparisonTarget) -> Result<Option<Tree<'r>>> {
    let tree = match target {
        ComparisonTarget::HeadVsWorkdir => match repo.head() {
            Ok(head) => head.peel_to_tree()?,
            Err(_) => return Ok(None),
        },
        ComparisonTarget::Branch(name) => repo
            .revparse_single(name)
            .with_context(|| format!("Could not resolve: {name}"))?
            .peel_to_tree()
            .with_context(|| format!("{name} does not point to a commit"))?,
        ComparisonTarget::Commit(oid) => repo
            .find_commit(*oid)
            .with_context(|| format!("No commit {oid}"))?
            .tree()?,
    };
    Ok(Some(tree))
}
