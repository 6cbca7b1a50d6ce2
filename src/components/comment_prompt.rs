use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::state::AppState;

use super::Component;

/// Modal for writing the message of a confirmed range comment.
pub struct CommentPrompt;

impl Component for CommentPrompt {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(prompt) = &state.comment_prompt else {
            return;
        };
        let theme = &state.theme;
        let width = 64.min(area.width.saturating_sub(4));
        let height = 10.min(area.height.saturating_sub(4));
        let dialog = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, dialog);

        let title = format!(
            " Comment on {} {} ",
            prompt.side.label(),
            prompt.range.label()
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // file
                Constraint::Min(2),    // message
                Constraint::Length(1), // hints
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", prompt.path),
                Style::default().fg(theme.text_muted),
            )),
            rows[0],
        );

        let text_width = (rows[1].width as usize).saturating_sub(2);
        let mut lines = wrap_input(&prompt.text, text_width);
        if let Some(last) = lines.last_mut() {
            last.push('\u{2588}');
        }
        let visible = rows[1].height as usize;
        let skip = lines.len().saturating_sub(visible);
        let body: Vec<Line> = lines
            .into_iter()
            .skip(skip)
            .map(|l| Line::from(Span::styled(format!(" {l}"), Style::default().fg(theme.text))))
            .collect();
        frame.render_widget(Paragraph::new(body), rows[1]);

        let key = Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD);
        let hints = Line::from(vec![
            Span::styled(" [Enter]", key),
            Span::styled("save  ", Style::default().fg(theme.text_muted)),
            Span::styled("[Esc]", key),
            Span::styled("cancel", Style::default().fg(theme.text_muted)),
        ]);
        frame.render_widget(Paragraph::new(hints), rows[2]);
    }
}

/// Hard-wrap `text` into lines of at most `width` cells, keeping one cell
/// free at the end for the cursor.
fn wrap_input(text: &str, width: usize) -> Vec<String> {
    let limit = width.saturating_sub(1).max(1);
    let mut lines = vec![String::new()];
    let mut used = 0;
    for c in text.chars() {
        if c == '\n' {
            lines.push(String::new());
            used = 0;
            continue;
        }
        let w = c.width().unwrap_or(0);
        if used + w > limit {
            lines.push(String::new());
            used = 0;
        }
        if let Some(line) = lines.last_mut() {
            line.push(c);
        }
        used += w;
    }
    lines
}
