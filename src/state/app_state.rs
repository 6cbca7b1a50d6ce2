use crate::selection::orchestrator::Affordance;
use crate::selection::{CommentRange, Side};
use crate::theme::Theme;

use super::{CommentState, DiffOptions, DiffState, SelectionState};

/// An open "write a comment" prompt for a confirmed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPrompt {
    pub path: String,
    pub side: Side,
    pub range: CommentRange,
    pub text: String,
}

pub struct AppState {
    pub diff: DiffState,
    pub selection: SelectionState,
    pub comments: CommentState,
    /// Affordance currently on screen, mirrored from the orchestrator.
    pub affordance: Option<Affordance>,
    pub comment_prompt: Option<CommentPrompt>,
    /// Thread whose range markers are shown hovered.
    pub hovered_thread: Option<String>,
    pub theme: Theme,
    pub should_quit: bool,
    pub status_message: Option<(String, bool)>, // (message, is_error)
    pub target_label: String,
}

impl AppState {
    pub fn new(diff_options: DiffOptions, theme: Theme) -> Self {
        Self {
            diff: DiffState::new(diff_options),
            selection: SelectionState::default(),
            comments: CommentState::default(),
            affordance: None,
            comment_prompt: None,
            hovered_thread: None,
            theme,
            should_quit: false,
            status_message: None,
            target_label: String::new(),
        }
    }
}
