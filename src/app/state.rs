use std::collections::HashSet;
use std::time::{Duration, Instant};

use strum::Display;

use crate::carousel::{Carousel, CarouselMode, Teleport, WindowSlot};
use crate::config::{AppConfig, CarouselOptions, ViewerOptions};
use crate::content::{facets, Facets, Letter};
use crate::filter::{next_facet, visible_indices, FilterState};
use crate::gate;
use crate::viewer::{AssetResolver, LetterViewer};

const GATE_INPUT_LIMIT: usize = 120;
const SEARCH_INPUT_LIMIT: usize = 80;
pub const WRONG_PASSPHRASE: &str = "You forgot?!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum View {
    Gate,
    Desk,
    Letter,
}

#[derive(Debug, Clone, Default)]
pub struct GateState {
    pub input: String,
    pub error: Option<String>,
    pub attempts: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub active: bool,
}

/// Letters on the desk: the full set, the filtered view of it, and the
/// carousel over that view.
#[derive(Debug, Clone)]
pub struct DeskState {
    letters: Vec<Letter>,
    facets: Facets,
    filter: FilterState,
    visible: Vec<usize>,
    carousel: Carousel,
    mode: CarouselMode,
    settle: Duration,
    pub search: SearchState,
}

impl DeskState {
    pub fn new(letters: Vec<Letter>, options: &CarouselOptions) -> Self {
        let facets = facets(&letters);
        let filter = FilterState::default();
        let visible = visible_indices(&letters, &filter);
        let carousel = Carousel::new(visible.len(), options.mode, options.settle_duration());
        Self {
            letters,
            facets,
            filter,
            visible,
            carousel,
            mode: options.mode,
            settle: options.settle_duration(),
            search: SearchState::default(),
        }
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn visible_letters(&self) -> impl Iterator<Item = &Letter> + '_ {
        self.visible.iter().map(|&idx| &self.letters[idx])
    }

    pub fn visible_letter(&self, position: usize) -> Option<&Letter> {
        self.visible
            .get(position)
            .and_then(|&idx| self.letters.get(idx))
    }

    pub fn active_position(&self) -> Option<usize> {
        self.carousel.active()
    }

    pub fn active_letter(&self) -> Option<&Letter> {
        self.active_position()
            .and_then(|position| self.visible_letter(position))
    }

    pub fn window(&self, range: usize) -> Vec<(WindowSlot, &Letter)> {
        self.carousel
            .window(range)
            .into_iter()
            .filter_map(|slot| self.visible_letter(slot.index).map(|letter| (slot, letter)))
            .collect()
    }

    pub fn next(&mut self) {
        self.carousel.next();
    }

    pub fn previous(&mut self) {
        self.carousel.previous();
    }

    pub fn select(&mut self, position: usize) {
        self.carousel.select(position);
    }

    pub fn settle(&mut self, now: Instant) -> Option<Teleport> {
        self.carousel.settle(now)
    }

    pub fn set_theme_filter(&mut self, theme: &str) {
        if self.filter.theme != theme {
            self.filter.theme = theme.to_string();
            self.refilter();
        }
    }

    pub fn set_occasion_filter(&mut self, occasion: &str) {
        if self.filter.occasion != occasion {
            self.filter.occasion = occasion.to_string();
            self.refilter();
        }
    }

    pub fn set_query(&mut self, query: &str) {
        if self.filter.query != query {
            self.filter.query = query.to_string();
            self.refilter();
        }
    }

    pub fn clear_filters(&mut self) {
        if !self.filter.is_empty() || !self.filter.query.is_empty() {
            self.filter.clear();
            self.refilter();
        }
    }

    pub fn cycle_theme_filter(&mut self) -> &str {
        let next = next_facet(&self.filter.theme, &self.facets.themes);
        self.set_theme_filter(&next);
        &self.filter.theme
    }

    pub fn cycle_occasion_filter(&mut self) -> &str {
        let next = next_facet(&self.filter.occasion, &self.facets.occasions);
        self.set_occasion_filter(&next);
        &self.filter.occasion
    }

    pub fn begin_search(&mut self) {
        self.search.active = true;
    }

    pub fn finish_search(&mut self) {
        self.search.active = false;
    }

    pub fn cancel_search(&mut self) {
        self.search.active = false;
        self.set_query("");
    }

    pub fn push_search_char(&mut self, ch: char) {
        if self.filter.query.chars().count() >= SEARCH_INPUT_LIMIT {
            return;
        }
        let mut query = self.filter.query.clone();
        query.push(ch);
        self.set_query(&query);
    }

    pub fn pop_search_char(&mut self) {
        let mut query = self.filter.query.clone();
        if query.pop().is_some() {
            self.set_query(&query);
        }
    }

    fn refilter(&mut self) {
        self.visible = visible_indices(&self.letters, &self.filter);
        self.carousel = Carousel::new(self.visible.len(), self.mode, self.settle);
        tracing::debug!(
            visible = self.visible.len(),
            chips = ?self.filter.chips(),
            "desk filter changed"
        );
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub gate: GateState,
    pub desk: DeskState,
    pub window_range: usize,
    pub status_message: Option<String>,
    viewer: Option<LetterViewer>,
    read: HashSet<String>,
    passphrase: String,
    viewer_options: ViewerOptions,
    assets: AssetResolver,
}

impl AppState {
    pub fn new(letters: Vec<Letter>, config: &AppConfig) -> Self {
        Self {
            view: View::Gate,
            gate: GateState::default(),
            desk: DeskState::new(letters, &config.carousel),
            window_range: config.carousel.window_range,
            status_message: None,
            viewer: None,
            read: HashSet::new(),
            passphrase: config.passphrase.clone(),
            viewer_options: config.viewer.clone(),
            assets: AssetResolver::new(config.content.asset_root.clone()),
        }
    }

    pub fn viewer(&self) -> Option<&LetterViewer> {
        self.viewer.as_ref()
    }

    pub fn viewer_mut(&mut self) -> Option<&mut LetterViewer> {
        self.viewer.as_mut()
    }

    pub fn is_read(&self, letter_id: &str) -> bool {
        self.read.contains(letter_id)
    }

    pub fn read_count(&self) -> usize {
        self.read.len()
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn push_gate_char(&mut self, ch: char) {
        if self.gate.input.chars().count() < GATE_INPUT_LIMIT {
            self.gate.input.push(ch);
        }
    }

    pub fn pop_gate_char(&mut self) {
        self.gate.input.pop();
    }

    /// Checks the gate input. A match moves to the desk; a miss leaves the
    /// gate up with an error and no limit on retries.
    pub fn submit_passphrase(&mut self) -> bool {
        if self.view != View::Gate {
            return false;
        }
        self.gate.attempts += 1;
        if gate::matches(&self.gate.input, &self.passphrase) {
            tracing::info!(attempts = self.gate.attempts, "gate unlocked");
            self.gate = GateState::default();
            self.view = View::Desk;
            true
        } else {
            self.gate.error = Some(WRONG_PASSPHRASE.to_string());
            self.gate.input.clear();
            false
        }
    }

    /// Opens the active letter. Does nothing when the desk is empty.
    pub fn open_selected(&mut self, now: Instant) -> bool {
        if self.view != View::Desk {
            return false;
        }
        let Some(letter) = self.desk.active_letter() else {
            self.set_status_message(Some("No letter to open"));
            return false;
        };
        let viewer = LetterViewer::open(letter, &self.viewer_options, &self.assets, now);
        self.read.insert(letter.id.clone());
        self.viewer = Some(viewer);
        self.desk.finish_search();
        self.view = View::Letter;
        true
    }

    pub fn back(&mut self) {
        if self.view == View::Letter {
            self.viewer = None;
            self.view = View::Desk;
        }
    }

    pub fn lock(&mut self) {
        if self.view == View::Gate {
            return;
        }
        self.viewer = None;
        self.gate = GateState::default();
        self.desk.finish_search();
        self.view = View::Gate;
    }

    pub fn on_tick(&mut self, now: Instant) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.tick(now);
        }
        self.desk.settle(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{parse_letter, ContentFormat};
    use assert_matches::assert_matches;

    fn letters() -> Vec<Letter> {
        let raw = |date: &str, theme: &str, occasion: &str| {
            format!("---\ndate: {date}\ntheme: {theme}\noccasion: {occasion}\n---\nbody")
        };
        vec![
            parse_letter("d", &raw("2024-04-01", "Rain", "Anniversary"), ContentFormat::Plain).unwrap(),
            parse_letter("c", &raw("2024-03-01", "Stars", "Anniversary"), ContentFormat::Plain).unwrap(),
            parse_letter("b", &raw("2024-02-01", "Rain", "Late Night"), ContentFormat::Plain).unwrap(),
            parse_letter("a", &raw("2024-01-01", "Coffee", "Late Night"), ContentFormat::Plain).unwrap(),
        ]
    }

    fn unlocked() -> AppState {
        let mut state = AppState::new(letters(), &AppConfig::default());
        for ch in "Wow you're hot".chars() {
            state.push_gate_char(ch);
        }
        assert!(state.submit_passphrase());
        state
    }

    #[test]
    fn wrong_passphrase_stays_on_gate_with_error() {
        let mut state = AppState::new(letters(), &AppConfig::default());
        for ch in "wow you are hot".chars() {
            state.push_gate_char(ch);
        }
        assert!(!state.submit_passphrase());
        assert_eq!(state.view, View::Gate);
        assert_eq!(state.gate.error.as_deref(), Some(WRONG_PASSPHRASE));
        assert!(state.gate.input.is_empty());

        for ch in "WOWYOUREHOT".chars() {
            state.push_gate_char(ch);
        }
        assert!(state.submit_passphrase());
        assert_eq!(state.view, View::Desk);
        assert_eq!(state.gate.error, None);
    }

    #[test]
    fn filter_changes_reset_selection() {
        let mut state = unlocked();
        state.desk.next();
        state.desk.next();
        assert_eq!(state.desk.active_position(), Some(2));

        state.desk.set_theme_filter("Rain");
        assert_eq!(state.desk.active_position(), Some(0));
        assert_eq!(state.desk.visible_len(), 2);
        state.desk.next();
        assert_eq!(state.desk.active_letter().map(|l| l.id.as_str()), Some("b"));

        state.desk.set_occasion_filter("Late Night");
        assert_eq!(state.desk.active_position(), Some(0));
        assert_eq!(state.desk.active_letter().map(|l| l.id.as_str()), Some("b"));

        state.desk.clear_filters();
        assert_eq!(state.desk.visible_len(), 4);
        assert_eq!(state.desk.active_position(), Some(0));
    }

    #[test]
    fn empty_filter_result_cannot_be_opened() {
        let mut state = unlocked();
        state.desk.set_theme_filter("Rain");
        state.desk.set_occasion_filter("Nothing");
        assert!(state.desk.is_empty());
        assert_eq!(state.desk.active_position(), None);
        state.desk.next();
        assert!(!state.open_selected(Instant::now()));
        assert_eq!(state.view, View::Desk);
        assert!(state.status_message.is_some());
    }

    #[test]
    fn open_back_and_lock_cycle() {
        let mut state = unlocked();
        state.desk.previous();
        assert!(state.open_selected(Instant::now()));
        assert_eq!(state.view, View::Letter);
        assert_matches!(state.viewer(), Some(viewer) if viewer.letter_id() == "a");
        assert!(state.is_read("a"));

        state.back();
        assert_eq!(state.view, View::Desk);
        assert!(state.viewer().is_none());
        assert!(state.is_read("a"));
        assert_eq!(state.desk.active_position(), Some(3));

        state.open_selected(Instant::now());
        state.lock();
        assert_eq!(state.view, View::Gate);
        assert!(state.viewer().is_none());
        assert!(!state.open_selected(Instant::now()));
    }

    #[test]
    fn theme_cycle_walks_facets_then_wildcard() {
        let mut state = unlocked();
        assert_eq!(state.desk.cycle_theme_filter(), "Rain");
        assert_eq!(state.desk.cycle_theme_filter(), "Stars");
        assert_eq!(state.desk.cycle_theme_filter(), "Coffee");
        assert_eq!(state.desk.cycle_theme_filter(), "");
        assert_eq!(state.desk.visible_len(), 4);
    }

    #[test]
    fn search_typing_narrows_and_cancel_restores() {
        let mut state = unlocked();
        state.desk.begin_search();
        for ch in "zzz".chars() {
            state.desk.push_search_char(ch);
        }
        assert!(state.desk.is_empty());
        state.desk.pop_search_char();
        assert_eq!(state.desk.filter().query, "zz");
        state.desk.cancel_search();
        assert!(!state.desk.search.active);
        assert_eq!(state.desk.visible_len(), 4);
    }

    #[test]
    fn window_pairs_slots_with_letters() {
        let state = unlocked();
        let ids: Vec<_> = state
            .desk
            .window(1)
            .into_iter()
            .map(|(slot, letter)| (slot.offset, letter.id.clone()))
            .collect();
        assert_eq!(
            ids,
            vec![(-1, "a".to_string()), (0, "d".to_string()), (1, "c".to_string())]
        );
    }
}
