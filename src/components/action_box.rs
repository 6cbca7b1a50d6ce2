use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::selection::orchestrator::{Affordance, Placement};
use crate::state::AppState;

use super::Component;

/// The floating "comment on this range" control.
pub struct ActionBox;

impl Component for ActionBox {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(affordance) = &state.affordance else {
            return;
        };
        let theme = &state.theme;
        let label = affordance_label(affordance);
        let rect = action_box_area(affordance, area);
        if rect.width == 0 {
            return;
        }

        let style = Style::default()
            .fg(theme.affordance_fg)
            .bg(theme.affordance_bg);
        let line = Line::from(vec![
            Span::styled(" [c] ", style.add_modifier(Modifier::BOLD)),
            Span::styled(&label[5..], style),
        ]);
        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(line).style(style), rect);
    }
}

fn affordance_label(affordance: &Affordance) -> String {
    format!(
        " [c] Comment {} {} ",
        affordance.side.label(),
        affordance.range.label()
    )
}

/// Screen area the box for `affordance` takes inside `bounds`.
pub fn action_box_area(affordance: &Affordance, bounds: Rect) -> Rect {
    affordance_rect(affordance, affordance_label(affordance).width() as u16, bounds)
}

/// One-line box next to the anchor cell: on the line above for
/// [`Placement::Above`], below otherwise, flipped when that line is outside
/// `bounds`, and shifted left to fit.
fn affordance_rect(affordance: &Affordance, width: u16, bounds: Rect) -> Rect {
    let (ax, ay) = affordance.anchor;
    let top = bounds.y;
    let bottom = bounds.y + bounds.height;
    let above = ay.checked_sub(1).filter(|&y| y >= top);
    let below = Some(ay + 1).filter(|&y| y < bottom);
    let y = match affordance.placement {
        Placement::Above => above.or(below),
        Placement::Below => below.or(above),
    };
    let Some(y) = y else {
        return Rect::default();
    };
    let width = width.min(bounds.width);
    let x = ax.clamp(bounds.x, (bounds.x + bounds.width).saturating_sub(width));
    Rect::new(x, y, width, 1)
}
