pub mod action_box;
pub mod comment_prompt;
pub mod context_bar;
pub mod diff_view;
pub mod screen_map;
pub mod status_bar;

use ratatui::{layout::Rect, Frame};

use crate::state::AppState;

/// Trait for renderable TUI components.
pub trait Component {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState);
}
