pub mod app_state;
pub mod comment_state;
pub mod diff_state;
pub mod selection_state;

pub use app_state::{AppState, CommentPrompt};
pub use comment_state::{CommentState, RangeComment};
pub use diff_state::{DiffOptions, DiffState, DiffViewMode};
pub use selection_state::SelectionState;
