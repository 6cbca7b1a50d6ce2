use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::action::Action;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventReader {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let event_tx = tx.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            while let Some(event) = reader.next().await {
                let event = match event {
                    Ok(CrosstermEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                        Event::Key(key)
                    }
                    Ok(CrosstermEvent::Mouse(mouse)) => Event::Mouse(mouse),
                    Ok(CrosstermEvent::Resize(_, _)) => Event::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        log::error!("terminal event stream failed: {e}");
                        break;
                    }
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        let tick_tx = tx;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                interval.tick().await;
                if tick_tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Non-blocking: returns a pending event if one is available, or None.
    pub fn try_next(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

/// All context needed to map a key event to an action.
pub struct KeyContext {
    pub comment_prompt_open: bool,
    pub affordance_shown: bool,
    pub has_selection: bool,
}

/// Map a key event to an action based on current app context.
pub fn map_key_to_action(key: KeyEvent, ctx: &KeyContext) -> Option<Action> {
    // Priority 0: Ctrl-C / Ctrl-D always quit, even inside the prompt
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') => return Some(Action::Quit),
            _ => {}
        }
    }

    // Priority 1: comment prompt captures typing
    if ctx.comment_prompt_open {
        return match key.code {
            KeyCode::Esc => Some(Action::CancelComment),
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(Action::CommentNewline)
            }
            KeyCode::Enter => Some(Action::SubmitComment),
            KeyCode::Backspace => Some(Action::CommentBackspace),
            KeyCode::Char(c) => Some(Action::CommentChar(c)),
            _ => None,
        };
    }

    // Priority 2: the affordance is waiting for confirmation
    if ctx.affordance_shown {
        match key.code {
            KeyCode::Char('c') | KeyCode::Enter => return Some(Action::ConfirmAffordance),
            _ => {}
        }
    }

    // Priority 3: diff view bindings
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc if ctx.has_selection || ctx.affordance_shown => Some(Action::ClearSelection),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::PageUp => Some(Action::ScrollPageUp),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(Action::ScrollPageDown),
        KeyCode::Char('g') => Some(Action::ScrollToTop),
        KeyCode::Char('G') => Some(Action::ScrollToBottom),
        KeyCode::Char('n') => Some(Action::NextFile),
        KeyCode::Char('p') => Some(Action::PrevFile),
        KeyCode::Tab => Some(Action::ToggleViewMode),
        KeyCode::Char('w') => Some(Action::ToggleWhitespace),
        KeyCode::Char('e') => Some(Action::ExpandAllGaps),
        KeyCode::Char('R') => Some(Action::RefreshDiff),
        _ => None,
    }
}

/// Map a mouse event to an action. Only the left button selects.
pub fn map_mouse_to_action(mouse: MouseEvent) -> Option<Action> {
    let (x, y) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Action::MouseDown { x, y }),
        MouseEventKind::Drag(MouseButton::Left) => Some(Action::MouseDrag { x, y }),
        MouseEventKind::Up(MouseButton::Left) => Some(Action::MouseUp { x, y }),
        MouseEventKind::Moved => Some(Action::MouseMove { x, y }),
        MouseEventKind::ScrollUp => Some(Action::ScrollUp),
        MouseEventKind::ScrollDown => Some(Action::ScrollDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctx(prompt: bool, affordance: bool) -> KeyContext {
        KeyContext {
            comment_prompt_open: prompt,
            affordance_shown: affordance,
            has_selection: affordance,
        }
    }

    #[test]
    fn test_prompt_captures_keys() {
        let c = ctx(true, false);
        assert_eq!(map_key_to_action(key(KeyCode::Char('q')), &c), Some(Action::CommentChar('q')));
        assert_eq!(map_key_to_action(key(KeyCode::Enter), &c), Some(Action::SubmitComment));
        assert_eq!(
            map_key_to_action(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT), &c),
            Some(Action::CommentNewline)
        );
        assert_eq!(map_key_to_action(key(KeyCode::Esc), &c), Some(Action::CancelComment));
        assert_eq!(
            map_key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &c),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_confirm_only_with_affordance() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('c')), &ctx(false, true)),
            Some(Action::ConfirmAffordance)
        );
        assert_eq!(map_key_to_action(key(KeyCode::Char('c')), &ctx(false, false)), None);
        assert_eq!(
            map_key_to_action(key(KeyCode::Esc), &ctx(false, true)),
            Some(Action::ClearSelection)
        );
        assert_eq!(map_key_to_action(key(KeyCode::Esc), &ctx(false, false)), None);
    }

    #[test]
    fn test_view_bindings() {
        let c = ctx(false, false);
        assert_eq!(map_key_to_action(key(KeyCode::Char('q')), &c), Some(Action::Quit));
        assert_eq!(map_key_to_action(key(KeyCode::Tab), &c), Some(Action::ToggleViewMode));
        assert_eq!(map_key_to_action(key(KeyCode::Char('n')), &c), Some(Action::NextFile));
        assert_eq!(map_key_to_action(key(KeyCode::Char('e')), &c), Some(Action::ExpandAllGaps));
    }

    #[test]
    fn test_mouse_mapping() {
        let event = |kind| MouseEvent {
            kind,
            column: 4,
            row: 7,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            map_mouse_to_action(event(MouseEventKind::Down(MouseButton::Left))),
            Some(Action::MouseDown { x: 4, y: 7 })
        );
        assert_eq!(
            map_mouse_to_action(event(MouseEventKind::Up(MouseButton::Left))),
            Some(Action::MouseUp { x: 4, y: 7 })
        );
        assert_eq!(map_mouse_to_action(event(MouseEventKind::Down(MouseButton::Right))), None);
        assert_eq!(map_mouse_to_action(event(MouseEventKind::ScrollDown)), Some(Action::ScrollDown));
    }
}
