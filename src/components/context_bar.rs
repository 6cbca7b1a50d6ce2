use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::state::AppState;

use super::Component;

pub struct ContextBar;

impl Component for ContextBar {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let theme = &state.theme;
        let muted = Style::default().fg(theme.text_muted);
        let ws_label = if state.diff.options.ignore_whitespace {
            "[ws:off]"
        } else {
            "[ws:on]"
        };

        let file_label = match state.diff.selected_file {
            Some(i) => format!("file {}/{}", i + 1, state.diff.deltas.len()),
            None => "no files".to_string(),
        };
        let comment_count = state.comments.count();
        let comments_label = match comment_count {
            1 => "1 comment".to_string(),
            n => format!("{n} comments"),
        };

        let line = Line::from(vec![
            Span::styled(
                " diffsel ",
                Style::default().fg(theme.affordance_fg).bg(theme.accent),
            ),
            Span::raw("  "),
            Span::styled(
                &state.target_label,
                Style::default()
                    .fg(theme.success)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" \u{2192} ", muted),
            Span::styled(
                "working tree",
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(file_label, muted),
            Span::raw("  "),
            Span::styled(format!("[{}]", state.diff.options.view_mode.label()), muted),
            Span::raw(" "),
            Span::styled(ws_label, muted),
            Span::raw("  "),
            Span::styled(
                comments_label,
                Style::default().fg(if comment_count > 0 {
                    theme.thread_fg
                } else {
                    theme.text_muted
                }),
            ),
        ]);

        let bar = Paragraph::new(line).style(Style::default().bg(theme.surface));
        frame.render_widget(bar, area);
    }
}
