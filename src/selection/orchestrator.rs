use std::time::{Duration, Instant};

use crate::document::DiffDocument;

use super::normalizer::line_length;
use super::resolver::SelectionResolver;
use super::{CommentRange, NormalizedPosition, RawSelection, Side};

/// Quiet period before a selection change is resolved.
pub const DEBOUNCE: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    /// A debounce deadline is running.
    PendingAffordance,
    /// A resolved range is on screen, waiting for confirmation.
    ShowingAffordance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
}

/// The "comment here" control for a resolved range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    pub side: Side,
    pub range: CommentRange,
    pub placement: Placement,
    /// Screen cell `(x, y)` the control is anchored to.
    pub anchor: (u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    ShowAffordance(Affordance),
    RemoveAffordance,
    CreateRangeComment { side: Side, range: CommentRange },
}

/// The rendered view the orchestrator is attached to.
pub trait SelectionSurface {
    /// Identifies one rendering of one document.
    fn id(&self) -> u64;
    fn document(&self) -> &DiffDocument;
    /// Screen cell of `(side, line, column)`, or `None` when it is not
    /// on screen.
    fn locate(&self, side: Side, line: u32, column: usize) -> Option<(u16, u16)>;
}

#[derive(Debug)]
struct Pending {
    selections: Vec<RawSelection>,
    pointer_release: bool,
    deadline: Instant,
}

/// Debounces selection changes and turns each quiet period into at most one
/// resolution: show the affordance, request a comment directly, or clear.
#[derive(Debug)]
pub struct SelectionOrchestrator {
    debounce: Duration,
    surface: Option<u64>,
    pending: Option<Pending>,
    shown: Option<Affordance>,
    resolutions: usize,
}

impl Default for SelectionOrchestrator {
    fn default() -> Self {
        Self::new(DEBOUNCE)
    }
}

impl SelectionOrchestrator {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            surface: None,
            pending: None,
            shown: None,
            resolutions: 0,
        }
    }

    pub fn attach<S: SelectionSurface + ?Sized>(&mut self, surface: &S) {
        if self.surface.is_some() {
            self.detach();
        }
        self.surface = Some(surface.id());
    }

    /// Unbind from the surface, dropping any pending or shown state.
    /// Safe to call when already detached.
    pub fn detach(&mut self) -> Option<SelectionEvent> {
        self.surface = None;
        self.pending = None;
        self.remove_affordance()
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn state(&self) -> OrchestratorState {
        if self.pending.is_some() {
            OrchestratorState::PendingAffordance
        } else if self.shown.is_some() {
            OrchestratorState::ShowingAffordance
        } else {
            OrchestratorState::Idle
        }
    }

    pub fn affordance(&self) -> Option<&Affordance> {
        self.shown.as_ref()
    }

    /// How many debounce firings have run the resolver.
    pub fn resolution_count(&self) -> usize {
        self.resolutions
    }

    /// When the pending resolution is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Record a selection change and restart the debounce deadline. A
    /// pointer release anywhere in the burst marks the whole burst.
    pub fn notify_selection_changed(
        &mut self,
        selections: Vec<RawSelection>,
        is_pointer_release: bool,
        now: Instant,
    ) {
        if self.surface.is_none() {
            log::trace!("selection change while detached");
            return;
        }
        let pointer_release =
            is_pointer_release || self.pending.as_ref().is_some_and(|p| p.pointer_release);
        self.pending = Some(Pending {
            selections,
            pointer_release,
            deadline: now + self.debounce,
        });
    }

    /// Run the pending resolution if its deadline has passed.
    pub fn poll<S: SelectionSurface + ?Sized>(
        &mut self,
        now: Instant,
        surface: &S,
    ) -> Option<SelectionEvent> {
        if !self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            return None;
        }
        let pending = self.pending.take()?;
        if self.surface != Some(surface.id()) {
            log::warn!("dropping selection for a surface that is no longer attached");
            return self.remove_affordance();
        }
        self.resolutions += 1;

        let doc = surface.document();
        let range = SelectionResolver::new(doc).resolve(&pending.selections);
        let Some((side, comment_range)) = range.comment_range() else {
            return self.remove_affordance();
        };

        if pending.pointer_release {
            if let (Some(start), Some(end)) = (range.start, range.end) {
                if is_line_boundary(doc, &start, &end) {
                    self.shown = None;
                    let range = CommentRange::zero_width(start.line, start.column);
                    log::debug!("line-end release, creating comment at {}", range.label());
                    return Some(SelectionEvent::CreateRangeComment { side, range });
                }
            }
        }

        // Content above the first line is cropped.
        let placement = if comment_range.start_line > 1 {
            Placement::Above
        } else {
            Placement::Below
        };
        let anchor = match placement {
            Placement::Above => surface.locate(
                side,
                comment_range.start_line,
                comment_range.start_character,
            ),
            Placement::Below => {
                surface.locate(side, comment_range.end_line, comment_range.end_character)
            }
        };
        let Some(anchor) = anchor else {
            log::warn!(
                "cannot position affordance for {} {}",
                side.label(),
                comment_range.label()
            );
            return self.remove_affordance();
        };

        let affordance = Affordance {
            side,
            range: comment_range,
            placement,
            anchor,
        };
        self.shown = Some(affordance.clone());
        Some(SelectionEvent::ShowAffordance(affordance))
    }

    /// Request a comment for the range on screen. The captured range is
    /// used as-is.
    pub fn confirm(&mut self) -> Option<SelectionEvent> {
        let affordance = self.shown.take()?;
        self.pending = None;
        Some(SelectionEvent::CreateRangeComment {
            side: affordance.side,
            range: affordance.range,
        })
    }

    /// Selection cleared by the user.
    pub fn dismiss(&mut self) -> Option<SelectionEvent> {
        self.pending = None;
        self.remove_affordance()
    }

    /// `Some(RemoveAffordance)` only when one was shown.
    pub fn remove_affordance(&mut self) -> Option<SelectionEvent> {
        self.shown.take().map(|_| SelectionEvent::RemoveAffordance)
    }
}

/// End of line N to start of line N+1 with nothing in between.
fn is_line_boundary(doc: &DiffDocument, start: &NormalizedPosition, end: &NormalizedPosition) -> bool {
    if start.side != end.side || end.line != start.line + 1 || end.column != 0 {
        return false;
    }
    doc.line_element(start.side, start.line)
        .and_then(|el| doc.line_text_container(el))
        .is_some_and(|text| start.column == line_length(doc, text))
}
