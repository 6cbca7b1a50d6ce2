mod builder;
#[cfg(test)]
pub(crate) mod fixtures;
mod node;
mod runs;

pub use builder::DiffBuilder;
pub use node::{DiffDocument, Node, NodeId, NodeKind, SectionKind, Side};
pub use runs::{char_len, LineRuns, TextRun};
