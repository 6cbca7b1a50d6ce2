pub mod diff;
pub mod repository;
pub mod types;

pub use diff::DiffEngine;
pub use repository::RepoCache;
