use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::state::AppState;

use super::Component;

/// Bottom line: the last status message, or key hints for the current mode.
pub struct StatusBar;

impl Component for StatusBar {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let theme = &state.theme;

        if let Some((message, is_error)) = &state.status_message {
            let color = if *is_error { theme.error } else { theme.success };
            let line = Line::from(Span::styled(format!(" {message}"), Style::default().fg(color)));
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let hints: &[(&str, &str)] = if state.comment_prompt.is_some() {
            &[("Enter", "save"), ("Esc", "cancel")]
        } else if state.affordance.is_some() {
            &[("c", "comment"), ("Esc", "clear"), ("q", "quit")]
        } else {
            &[
                ("drag", "select"),
                ("j/k", "scroll"),
                ("n/p", "file"),
                ("Tab", "layout"),
                ("w", "whitespace"),
                ("e", "expand"),
                ("q", "quit"),
            ]
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, label) in hints {
            spans.push(Span::styled(
                format!(" [{key}]"),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!("{label} "),
                Style::default().fg(theme.text_muted),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
