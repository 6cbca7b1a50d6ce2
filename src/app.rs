use anyhow::Result;
use ratatui::layout::{Constraint, Direction, Layout, Position};
use ratatui::Frame;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::action::Action;
use crate::async_diff::{DiffRequest, DiffWorker};
use crate::components::action_box::{action_box_area, ActionBox};
use crate::components::comment_prompt::CommentPrompt as CommentDialog;
use crate::components::context_bar::ContextBar;
use crate::components::diff_view::DiffView;
use crate::components::screen_map::{HitTarget, RenderedDiff, ScreenMap};
use crate::components::status_bar::StatusBar;
use crate::components::Component;
use crate::config::DiffselConfig;
use crate::document::{NodeId, NodeKind};
use crate::event::{map_key_to_action, map_mouse_to_action, Event, EventReader, KeyContext};
use crate::git::types::ComparisonTarget;
use crate::selection::hover::{thread_at, thread_hover};
use crate::selection::orchestrator::{SelectionEvent, SelectionOrchestrator, DEBOUNCE};
use crate::state::{AppState, CommentPrompt, CommentState, DiffOptions};
use crate::tui::Tui;

/// ~3 seconds at the 50ms tick rate.
const STATUS_TICKS: u32 = 60;

pub struct App {
    state: AppState,
    worker: DiffWorker,
    target: ComparisonTarget,
    generation: u64,
    orchestrator: SelectionOrchestrator,
    /// Where the last frame put every part of the document.
    screen: ScreenMap,
    status_clear_countdown: u32,
}

impl App {
    pub fn new(
        diff_options: DiffOptions,
        target: ComparisonTarget,
        repo_path: PathBuf,
        config: DiffselConfig,
    ) -> Self {
        let mut state = AppState::new(diff_options, config.theme);
        state.target_label = match &target {
            ComparisonTarget::HeadVsWorkdir => "HEAD".to_string(),
            ComparisonTarget::Branch(name) => name.clone(),
            ComparisonTarget::Commit(oid) => format!("{:.7}", oid),
        };
        if let Some(ctx) = config.context_lines {
            state.diff.display_context = ctx;
        }
        if let Some(width) = config.tab_size {
            state.diff.tab_size = width;
        }
        let debounce = config
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEBOUNCE);

        Self {
            state,
            worker: DiffWorker::new(repo_path),
            target,
            generation: 0,
            orchestrator: SelectionOrchestrator::new(debounce),
            screen: ScreenMap::default(),
            status_clear_countdown: 0,
        }
    }

    /// Comments written during the session.
    pub fn comments(&self) -> &CommentState {
        &self.state.comments
    }

    pub async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        self.request_diff();

        let mut events = EventReader::new(Duration::from_millis(50));

        loop {
            self.poll_diff_results();

            terminal.draw(|frame| self.draw(frame))?;

            // A resolution changes what is on screen; draw it before waiting.
            if self.poll_selection() {
                continue;
            }

            // Wake up for the next input event or when a pending selection
            // is due, whichever comes first.
            let first = match self.orchestrator.next_deadline() {
                Some(deadline) => {
                    let deadline = tokio::time::Instant::from_std(deadline);
                    tokio::select! {
                        ev = events.next() => ev,
                        _ = tokio::time::sleep_until(deadline) => None,
                    }
                }
                None => events.next().await,
            };
            let mut pending = Vec::new();
            if let Some(ev) = first {
                pending.push(ev);
            }
            while let Some(ev) = events.try_next() {
                pending.push(ev);
            }

            // Coalesce: collapse consecutive scroll actions into net movement
            let mut scroll_delta: isize = 0;
            let mut actions: Vec<Action> = Vec::new();

            for event in pending {
                let ctx = KeyContext {
                    comment_prompt_open: self.state.comment_prompt.is_some(),
                    affordance_shown: self.state.affordance.is_some(),
                    has_selection: self.state.selection.has_selection(),
                };
                let action = match event {
                    Event::Key(key) => map_key_to_action(key, &ctx),
                    Event::Mouse(mouse) => map_mouse_to_action(mouse),
                    Event::Resize => Some(Action::Resize),
                    Event::Tick => Some(Action::Tick),
                };
                match action {
                    Some(Action::ScrollUp) => scroll_delta -= 1,
                    Some(Action::ScrollDown) => scroll_delta += 1,
                    Some(other) => actions.push(other),
                    None => {}
                }
            }

            if scroll_delta != 0 {
                self.scroll(scroll_delta);
            }
            for action in actions {
                self.update(action);
            }

            if self.state.should_quit {
                break;
            }
        }

        self.orchestrator.detach();
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let full = frame.area();
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(full);

        ContextBar.render(frame, outer[0], &self.state);
        let map = DiffView.render(frame, outer[1], &self.state);
        StatusBar.render(frame, outer[2], &self.state);
        ActionBox.render(frame, map.area(), &self.state);
        CommentDialog.render(frame, full, &self.state);

        self.state.diff.viewport_height = map.area().height as usize;
        self.state.diff.content_height = map.total_height();
        self.screen = map;
    }

    fn request_diff(&mut self) {
        self.generation += 1;
        self.state.diff.loading = true;
        self.worker.request(DiffRequest {
            generation: self.generation,
            target: self.target.clone(),
            options: self.state.diff.options.clone(),
        });
    }

    fn poll_diff_results(&mut self) {
        while let Some(result) = self.worker.try_recv() {
            if result.generation < self.generation {
                continue;
            }
            self.state.diff.loading = false;
            match result.outcome {
                Ok(deltas) => {
                    log::info!("diff against {}: {} files", self.state.target_label, deltas.len());
                    self.state.diff.set_deltas(deltas);
                }
                Err(e) => {
                    self.state.diff.set_deltas(Vec::new());
                    self.set_status(format!("Diff failed: {e}"), true);
                }
            }
            self.rebuild_document();
        }
    }

    /// Re-render the selected file. The old rendering's selection and
    /// affordance go away with it.
    fn rebuild_document(&mut self) {
        if let Some(event) = self.orchestrator.detach() {
            self.apply_selection_event(event);
        }
        self.state.selection.clear();
        self.state.hovered_thread = None;

        let path = self.state.diff.selected_path();
        let comments = path
            .as_deref()
            .map(|p| self.state.comments.for_file(p))
            .unwrap_or(&[]);
        self.state.diff.rebuild_document(comments);

        if let Some(doc) = self.state.diff.document.as_ref() {
            self.orchestrator.attach(&RenderedDiff {
                generation: self.state.diff.document_generation,
                doc,
                map: &self.screen,
            });
        }
    }

    /// Hand the current selection to the orchestrator.
    fn notify_selection(&mut self, pointer_release: bool) {
        let Some(doc) = self.state.diff.document.as_ref() else {
            return;
        };
        let selections = self.state.selection.to_host(doc).into_raw(doc);
        self.orchestrator
            .notify_selection_changed(selections, pointer_release, Instant::now());
    }

    /// Run a due resolution against the last frame. Returns whether
    /// anything changed.
    fn poll_selection(&mut self) -> bool {
        let event = {
            let Some(doc) = self.state.diff.document.as_ref() else {
                return false;
            };
            let surface = RenderedDiff {
                generation: self.state.diff.document_generation,
                doc,
                map: &self.screen,
            };
            self.orchestrator.poll(Instant::now(), &surface)
        };
        match event {
            Some(event) => {
                self.apply_selection_event(event);
                true
            }
            None => false,
        }
    }

    fn apply_selection_event(&mut self, event: SelectionEvent) {
        match event {
            SelectionEvent::ShowAffordance(affordance) => {
                self.state.affordance = Some(affordance);
            }
            SelectionEvent::RemoveAffordance => {
                self.state.affordance = None;
            }
            SelectionEvent::CreateRangeComment { side, range } => {
                self.state.affordance = None;
                self.state.selection.clear();
                let Some(path) = self.state.diff.selected_path() else {
                    return;
                };
                log::info!("comment requested on {path} {} {}", side.label(), range.label());
                self.state.comment_prompt = Some(CommentPrompt {
                    path,
                    side,
                    range,
                    text: String::new(),
                });
            }
        }
    }

    fn update(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.state.should_quit = true;
            }
            Action::Tick => {
                if self.status_clear_countdown > 0 {
                    self.status_clear_countdown -= 1;
                    if self.status_clear_countdown == 0 {
                        self.state.status_message = None;
                    }
                }
            }
            Action::Resize => self.refresh_affordance(),

            Action::NextFile => {
                if self.state.diff.select_relative(1) {
                    self.rebuild_document();
                }
            }
            Action::PrevFile => {
                if self.state.diff.select_relative(-1) {
                    self.rebuild_document();
                }
            }
            Action::RefreshDiff => {
                self.request_diff();
                self.set_status("Refreshing diff".to_string(), false);
            }

            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::ScrollPageUp => self.scroll(-(self.state.diff.viewport_height as isize)),
            Action::ScrollPageDown => self.scroll(self.state.diff.viewport_height as isize),
            Action::ScrollToTop => self.scroll(isize::MIN / 2),
            Action::ScrollToBottom => self.scroll(isize::MAX / 2),
            Action::ToggleViewMode => {
                let options = &mut self.state.diff.options;
                options.view_mode = options.view_mode.toggled();
                self.state.diff.scroll_offset = 0;
                self.rebuild_document();
            }
            Action::ToggleWhitespace => {
                let options = &mut self.state.diff.options;
                options.ignore_whitespace = !options.ignore_whitespace;
                self.request_diff();
            }
            Action::ExpandAllGaps => {
                let Some(doc) = self.state.diff.document.as_ref() else {
                    return;
                };
                let gaps: Vec<usize> = (0..doc.node_count())
                    .filter_map(|id| match doc.kind(id) {
                        Some(NodeKind::ContextControl { gap_id, .. }) => Some(*gap_id),
                        _ => None,
                    })
                    .collect();
                if !gaps.is_empty() {
                    self.state.diff.expanded_gaps.extend(gaps);
                    self.rebuild_document();
                }
            }

            Action::MouseDown { x, y } => self.mouse_down(x, y),
            Action::MouseDrag { x, y } => self.mouse_drag(x, y),
            Action::MouseUp { x, y } => self.mouse_up(x, y),
            Action::MouseMove { x, y } => self.mouse_move(x, y),

            Action::ConfirmAffordance => {
                if let Some(event) = self.orchestrator.confirm() {
                    self.apply_selection_event(event);
                }
            }
            Action::ClearSelection => {
                self.state.selection.clear();
                if let Some(event) = self.orchestrator.dismiss() {
                    self.apply_selection_event(event);
                }
            }
            Action::CommentChar(c) => {
                if let Some(prompt) = self.state.comment_prompt.as_mut() {
                    prompt.text.push(c);
                }
            }
            Action::CommentNewline => {
                if let Some(prompt) = self.state.comment_prompt.as_mut() {
                    prompt.text.push('\n');
                }
            }
            Action::CommentBackspace => {
                if let Some(prompt) = self.state.comment_prompt.as_mut() {
                    prompt.text.pop();
                }
            }
            Action::SubmitComment => self.submit_comment(),
            Action::CancelComment => {
                self.state.comment_prompt = None;
            }
        }
    }

    fn scroll(&mut self, delta: isize) {
        self.state.diff.scroll_by(delta);
        self.refresh_affordance();
    }

    /// The affordance is anchored to screen cells; re-resolve after the
    /// document moved under it.
    fn refresh_affordance(&mut self) {
        if self.state.affordance.is_some() {
            self.notify_selection(false);
        }
    }

    fn hit(&self, x: u16, y: u16) -> Option<HitTarget> {
        if self.state.comment_prompt.is_some() {
            return None;
        }
        self.screen.hit(x, y)
    }

    fn mouse_down(&mut self, x: u16, y: u16) {
        if self.state.comment_prompt.is_some() {
            return;
        }
        if let Some(affordance) = &self.state.affordance {
            if action_box_area(affordance, self.screen.area()).contains(Position::new(x, y)) {
                self.update(Action::ConfirmAffordance);
                return;
            }
        }
        let Some(target) = self.hit(x, y) else {
            self.update(Action::ClearSelection);
            return;
        };
        let Some(doc) = self.state.diff.document.as_ref() else {
            return;
        };

        if let HitTarget::Node(node) = target {
            let gap = doc.ancestors(node).find_map(|a| match doc.kind(a) {
                Some(NodeKind::ContextControl { gap_id, .. }) => Some(*gap_id),
                _ => None,
            });
            if let Some(gap_id) = gap {
                log::debug!("expanding gap {gap_id}");
                self.state.diff.expanded_gaps.insert(gap_id);
                self.rebuild_document();
                return;
            }
        }

        let (start, end) = target.endpoints(doc);
        let selection = &mut self.state.selection;
        match selection.register_click(x, y, Instant::now()) {
            1 => selection.press(start, end),
            2 => selection.select_word(doc, start),
            _ => selection.select_line(doc, start),
        }
        self.notify_selection(false);
    }

    fn mouse_drag(&mut self, x: u16, y: u16) {
        if !self.state.selection.dragging {
            return;
        }
        let Some(target) = self.hit(x, y) else {
            return;
        };
        let Some(doc) = self.state.diff.document.as_ref() else {
            return;
        };
        let (start, end) = target.endpoints(doc);
        self.state.selection.extend(doc, start, end);
        self.notify_selection(false);
    }

    fn mouse_up(&mut self, x: u16, y: u16) {
        if self.state.selection.dragging {
            self.mouse_drag(x, y);
            self.state.selection.release();
        }
        if self.state.selection.has_selection() {
            self.notify_selection(true);
        }
    }

    /// Track which comment thread the pointer is over and light up its
    /// range markers.
    fn mouse_move(&mut self, x: u16, y: u16) {
        let node: Option<NodeId> = self.hit(x, y).map(|target| match target {
            HitTarget::Char { node, .. } => node,
            HitTarget::LineEnd { line_text } => line_text,
            HitTarget::Node(node) => node,
        });
        let Some(doc) = self.state.diff.document.as_mut() else {
            return;
        };
        let thread = node.and_then(|n| thread_at(doc, n).map(str::to_string));
        if thread == self.state.hovered_thread {
            return;
        }
        if let Some(old) = self.state.hovered_thread.take() {
            thread_hover(doc, &old, false);
        }
        if let Some(new) = &thread {
            thread_hover(doc, new, true);
        }
        self.state.hovered_thread = thread;
    }

    fn submit_comment(&mut self) {
        let Some(prompt) = self.state.comment_prompt.take() else {
            return;
        };
        let message = prompt.text.trim().to_string();
        if message.is_empty() {
            self.set_status("Comment is empty".to_string(), true);
            self.state.comment_prompt = Some(prompt);
            return;
        }
        let id = self
            .state
            .comments
            .add(&prompt.path, prompt.side, prompt.range, message);
        log::info!("added comment {id} on {}", prompt.path);
        self.set_status(
            format!(
                "Comment added on {} {} {}",
                prompt.path,
                prompt.side.label(),
                prompt.range.label()
            ),
            false,
        );
        self.rebuild_document();
    }

    fn set_status(&mut self, msg: String, is_error: bool) {
        self.state.status_message = Some((msg, is_error));
        self.status_clear_countdown = STATUS_TICKS;
    }
}

pub fn parse_target(target: Option<&str>) -> ComparisonTarget {
    match target {
        None => ComparisonTarget::HeadVsWorkdir,
        Some(s) => {
            if s.len() >= 7 && s.chars().all(|c| c.is_ascii_hexdigit()) {
                if let Ok(oid) = git2::Oid::from_str(s) {
                    return ComparisonTarget::Commit(oid);
                }
            }
            ComparisonTarget::Branch(s.to_string())
        }
    }
}
