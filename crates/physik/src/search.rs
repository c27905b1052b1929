//! Debounced search controller.
//!
//! Input events arm a timer; only the last input within the quiet period is
//! evaluated. An evaluation filters the [`SectionIndex`], applies visibility
//! and highlights through a [`SearchView`], toggles the "no results"
//! indicator, and mirrors the query into the page URL.

use crate::index::{normalize_query, SectionIndex};

pub type TimerId = i32;

/// One-shot timer capability (`setTimeout` / `clearTimeout`).
///
/// `token` must be handed back to [`SearchController::on_timer`] when the
/// timer fires. `None` means the timer could not be armed.
pub trait Timers {
    fn set_timeout(&mut self, delay_ms: u32, token: u64) -> Option<TimerId>;
    fn clear_timeout(&mut self, id: TimerId);
}

/// Page effects of a search evaluation.
pub trait SearchView {
    fn set_section_visible(&mut self, index: usize, visible: bool);
    fn apply_highlights(&mut self, index: usize, query: &str);
    fn clear_highlights(&mut self, index: usize);
    fn show_no_results(&mut self);
    fn hide_no_results(&mut self);
    /// Replace (never push) the query parameter; `None` removes it.
    fn replace_query_param(&mut self, query: Option<&str>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    PendingEvaluation { timer: TimerId, token: u64 },
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub query: String,
    pub matched: usize,
    pub total: usize,
}

pub struct SearchController {
    index: SectionIndex,
    debounce_ms: u32,
    state: SearchState,
    /// Latest raw input value.
    input: String,
    /// Normalized query currently applied to the page.
    query: String,
    next_token: u64,
}

impl SearchController {
    pub fn new(index: SectionIndex, debounce_ms: u32) -> Self {
        Self {
            index,
            debounce_ms,
            state: SearchState::Idle,
            input: String::new(),
            query: String::new(),
            next_token: 0,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn index(&self) -> &SectionIndex {
        &self.index
    }

    /// Record an input event and (re)arm the debounce timer.
    ///
    /// Returns false if no timer could be armed. The controller is then
    /// `Idle` and the caller should [`evaluate`](Self::evaluate) `raw` itself.
    pub fn on_input(&mut self, raw: &str, timers: &mut dyn Timers) -> bool {
        self.cancel_pending(timers);
        self.next_token += 1;
        let token = self.next_token;
        match timers.set_timeout(self.debounce_ms, token) {
            Some(timer) => {
                self.input = raw.to_string();
                self.state = SearchState::PendingEvaluation { timer, token };
                true
            }
            None => {
                log::warn!("search: could not arm debounce timer, evaluating now");
                self.input.clear();
                false
            }
        }
    }

    /// Debounce timer fired. Stale tokens (from a superseded timer that fired
    /// anyway) are ignored.
    pub fn on_timer(&mut self, token: u64, view: &mut dyn SearchView) -> Option<Evaluation> {
        match self.state {
            SearchState::PendingEvaluation { token: t, .. } if t == token => {
                self.state = SearchState::Idle;
                let raw = std::mem::take(&mut self.input);
                Some(self.evaluate(&raw, view))
            }
            _ => {
                log::debug!("search: dropping stale timer token {token}");
                None
            }
        }
    }

    /// Evaluate `raw` immediately, bypassing the debounce.
    pub fn evaluate(&mut self, raw: &str, view: &mut dyn SearchView) -> Evaluation {
        let query = normalize_query(raw);
        if query.is_empty() {
            self.apply_reset(view);
            return Evaluation {
                query,
                matched: self.index.len(),
                total: self.index.len(),
            };
        }

        let results = self.index.filter(&query);
        let mut matched = 0;
        for r in &results {
            self.index.set_visible(r.index, r.matched);
            view.set_section_visible(r.index, r.matched);
            if r.matched {
                matched += 1;
                view.apply_highlights(r.index, &query);
            } else {
                view.clear_highlights(r.index);
            }
        }

        if matched == 0 {
            view.show_no_results();
        } else {
            view.hide_no_results();
        }
        view.replace_query_param(Some(&query));
        log::debug!("search: {query:?} matched {matched}/{}", results.len());

        self.query = query.clone();
        Evaluation {
            query,
            matched,
            total: results.len(),
        }
    }

    /// Explicit reset: cancel any pending evaluation and show everything.
    pub fn reset(&mut self, timers: &mut dyn Timers, view: &mut dyn SearchView) {
        self.cancel_pending(timers);
        self.input.clear();
        self.apply_reset(view);
    }

    fn apply_reset(&mut self, view: &mut dyn SearchView) {
        for i in 0..self.index.len() {
            self.index.set_visible(i, true);
            view.set_section_visible(i, true);
            view.clear_highlights(i);
        }
        view.hide_no_results();
        view.replace_query_param(None);
        self.query.clear();
    }

    fn cancel_pending(&mut self, timers: &mut dyn Timers) {
        if let SearchState::PendingEvaluation { timer, .. } = self.state {
            timers.clear_timeout(timer);
        }
        self.state = SearchState::Idle;
    }
}

/// Lifecycle of the singleton "no results" panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Absent,
    Visible,
    /// Exit transition running; removal happens when `generation` completes.
    Leaving { generation: u64 },
}

/// What the view must do to show the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowAction {
    /// No element exists yet: create and animate in.
    Create,
    /// Element is mid-exit: stop the exit and animate back in.
    Revive,
    /// Already showing.
    Keep,
}

#[derive(Debug, Clone)]
pub struct NoResultsIndicator {
    state: IndicatorState,
    generation: u64,
}

impl Default for NoResultsIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl NoResultsIndicator {
    pub fn new() -> Self {
        Self {
            state: IndicatorState::Absent,
            generation: 0,
        }
    }

    pub fn state(&self) -> IndicatorState {
        self.state
    }

    pub fn show(&mut self) -> ShowAction {
        let action = match self.state {
            IndicatorState::Absent => ShowAction::Create,
            IndicatorState::Leaving { .. } => ShowAction::Revive,
            IndicatorState::Visible => ShowAction::Keep,
        };
        self.state = IndicatorState::Visible;
        action
    }

    /// Start the exit transition. Returns the generation to report back via
    /// [`exit_complete`](Self::exit_complete), or `None` if nothing is shown.
    pub fn hide(&mut self) -> Option<u64> {
        match self.state {
            IndicatorState::Visible => {
                self.generation += 1;
                self.state = IndicatorState::Leaving {
                    generation: self.generation,
                };
                Some(self.generation)
            }
            _ => None,
        }
    }

    /// An exit transition finished. Returns true if the element should now be
    /// removed; false if it was revived in the meantime.
    pub fn exit_complete(&mut self, generation: u64) -> bool {
        match self.state {
            IndicatorState::Leaving { generation: g } if g == generation => {
                self.state = IndicatorState::Absent;
                true
            }
            _ => false,
        }
    }
}

/// Timers driven by an explicit millisecond clock, for headless use.
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: u64,
    next_id: TimerId,
    armed: Vec<(TimerId, u64, u64)>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn armed(&self) -> usize {
        self.armed.len()
    }

    /// Move the clock to `to` and return `(due_at, token)` for every timer
    /// that fired, in firing order.
    pub fn advance_to(&mut self, to: u64) -> Vec<(u64, u64)> {
        self.now = self.now.max(to);
        let now = self.now;
        let mut fired: Vec<(u64, u64)> = self
            .armed
            .iter()
            .filter(|(_, due, _)| *due <= now)
            .map(|&(_, due, token)| (due, token))
            .collect();
        self.armed.retain(|(_, due, _)| *due > now);
        fired.sort_unstable();
        fired
    }
}

impl Timers for ManualTimers {
    fn set_timeout(&mut self, delay_ms: u32, token: u64) -> Option<TimerId> {
        self.next_id += 1;
        self.armed
            .push((self.next_id, self.now + u64::from(delay_ms), token));
        Some(self.next_id)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.armed.retain(|(i, _, _)| *i != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Section;

    #[derive(Default)]
    struct RecordingView {
        visible: Vec<bool>,
        highlighted: Vec<Option<String>>,
        no_results: bool,
        param: Option<String>,
        param_writes: usize,
    }

    impl RecordingView {
        fn new(n: usize) -> Self {
            Self {
                visible: vec![true; n],
                highlighted: vec![None; n],
                ..Default::default()
            }
        }
    }

    impl SearchView for RecordingView {
        fn set_section_visible(&mut self, index: usize, visible: bool) {
            self.visible[index] = visible;
        }
        fn apply_highlights(&mut self, index: usize, query: &str) {
            self.highlighted[index] = Some(query.to_string());
        }
        fn clear_highlights(&mut self, index: usize) {
            self.highlighted[index] = None;
        }
        fn show_no_results(&mut self) {
            self.no_results = true;
        }
        fn hide_no_results(&mut self) {
            self.no_results = false;
        }
        fn replace_query_param(&mut self, query: Option<&str>) {
            self.param = query.map(str::to_string);
            self.param_writes += 1;
        }
    }

    fn controller() -> SearchController {
        let index = [
            Section::new("schwingungen", "Schwingungen und Pendel"),
            Section::new("wellen", "Wellen und Interferenz"),
            Section::new("quanten", "Quantenmechanik: Welle-Teilchen"),
        ]
        .into_iter()
        .collect();
        SearchController::new(index, 300)
    }

    #[test]
    fn debounce_coalesces_to_last_input() {
        let mut c = controller();
        let mut timers = ManualTimers::new();
        let mut view = RecordingView::new(3);

        c.on_input("W", &mut timers);
        timers.advance_to(100);
        c.on_input("We", &mut timers);
        timers.advance_to(200);
        c.on_input(" WELLE ", &mut timers);
        assert_eq!(timers.armed(), 1);

        assert!(timers.advance_to(499).is_empty());
        let fired = timers.advance_to(500);
        assert_eq!(fired.len(), 1);
        let (due, token) = fired[0];
        assert_eq!(due, 500);

        let eval = c.on_timer(token, &mut view).unwrap();
        assert_eq!(eval.query, "welle");
        assert_eq!(eval.matched, 2);
        assert_eq!(c.state(), SearchState::Idle);
        assert_eq!(view.param_writes, 1);
        assert_eq!(view.param.as_deref(), Some("welle"));
    }

    #[test]
    fn stale_token_is_ignored() {
        let mut c = controller();
        let mut timers = ManualTimers::new();
        let mut view = RecordingView::new(3);
        c.on_input("welle", &mut timers);
        let SearchState::PendingEvaluation { token: first, .. } = c.state() else {
            panic!("expected pending");
        };
        c.on_input("quanten", &mut timers);
        assert!(c.on_timer(first, &mut view).is_none());
        assert_eq!(view.param_writes, 0);
    }

    #[test]
    fn visibility_and_highlights_follow_filter() {
        let mut c = controller();
        let mut view = RecordingView::new(3);
        let eval = c.evaluate("Pendel", &mut view);
        assert_eq!(eval.matched, 1);
        assert_eq!(view.visible, vec![true, false, false]);
        assert_eq!(view.highlighted, vec![Some("pendel".into()), None, None]);
        assert!(!view.no_results);
        assert_eq!(c.index().visible_count(), 1);
    }

    #[test]
    fn zero_matches_shows_indicator() {
        let mut c = controller();
        let mut view = RecordingView::new(3);
        let eval = c.evaluate("relativität", &mut view);
        assert_eq!(eval.matched, 0);
        assert!(view.no_results);
        assert_eq!(view.visible, vec![false, false, false]);
        assert_eq!(view.param.as_deref(), Some("relativität"));
    }

    #[test]
    fn empty_query_equals_explicit_reset() {
        let mut a = controller();
        let mut b = controller();
        let mut timers = ManualTimers::new();
        let mut va = RecordingView::new(3);
        let mut vb = RecordingView::new(3);
        a.evaluate("nichts", &mut va);
        b.evaluate("nichts", &mut vb);

        a.evaluate("   ", &mut va);
        b.reset(&mut timers, &mut vb);

        assert_eq!(va.visible, vb.visible);
        assert_eq!(va.highlighted, vb.highlighted);
        assert_eq!(va.no_results, vb.no_results);
        assert_eq!(va.param, vb.param);
        assert!(va.visible.iter().all(|v| *v));
        assert!(va.param.is_none());
        assert_eq!(a.query(), "");
    }

    #[test]
    fn reset_cancels_pending_timer() {
        let mut c = controller();
        let mut timers = ManualTimers::new();
        let mut view = RecordingView::new(3);
        c.on_input("welle", &mut timers);
        c.reset(&mut timers, &mut view);
        assert_eq!(timers.armed(), 0);
        assert_eq!(c.state(), SearchState::Idle);
    }

    /// A clock that refuses every timer.
    struct DeadTimers;

    impl Timers for DeadTimers {
        fn set_timeout(&mut self, _delay_ms: u32, _token: u64) -> Option<TimerId> {
            None
        }
        fn clear_timeout(&mut self, _id: TimerId) {}
    }

    #[test]
    fn unarmed_timer_leaves_controller_idle() {
        let mut c = controller();
        let mut timers = ManualTimers::new();
        let mut view = RecordingView::new(3);
        assert!(c.on_input("welle", &mut timers));
        assert!(matches!(c.state(), SearchState::PendingEvaluation { .. }));

        assert!(!c.on_input("quanten", &mut DeadTimers));
        assert_eq!(c.state(), SearchState::Idle);
        // The superseded "welle" timer can no longer evaluate.
        for (_, token) in timers.advance_to(1_000) {
            assert!(c.on_timer(token, &mut view).is_none());
        }
        assert_eq!(view.param_writes, 0);

        let eval = c.evaluate("quanten", &mut view);
        assert_eq!(eval.matched, 1);
        assert_eq!(view.param.as_deref(), Some("quanten"));
    }

    #[test]
    fn indicator_is_singleton() {
        let mut ind = NoResultsIndicator::new();
        assert_eq!(ind.show(), ShowAction::Create);
        assert_eq!(ind.show(), ShowAction::Keep);
        let g = ind.hide().unwrap();
        assert_eq!(ind.hide(), None);
        assert_eq!(ind.show(), ShowAction::Revive);
        // The old exit finishing must not remove the revived panel.
        assert!(!ind.exit_complete(g));
        assert_eq!(ind.state(), IndicatorState::Visible);
        let g2 = ind.hide().unwrap();
        assert!(ind.exit_complete(g2));
        assert_eq!(ind.state(), IndicatorState::Absent);
        assert_eq!(ind.show(), ShowAction::Create);
    }
}
