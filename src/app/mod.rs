use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::AppConfig;
use crate::content::Letter;
use crate::ui;

mod actions;
pub mod state;

pub use actions::{action_for_key, Action};
pub use state::{AppState, DeskState, GateState, View};

const IDLE_TICK: Duration = Duration::from_millis(250);
const MIN_FRAME: Duration = Duration::from_millis(16);

pub struct App {
    pub config: Arc<AppConfig>,
    state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: Arc<AppConfig>, letters: Vec<Letter>) -> Self {
        let state = AppState::new(letters, &config);
        tracing::info!(
            letters = state.desk.letters().len(),
            mode = %state.desk.carousel().mode(),
            "letter desk ready"
        );
        Self {
            config,
            state,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let palette = self.config.palette();
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| ui::draw_app(frame, &self.state, &palette))
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let tick_rate = self.tick_rate();
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                if let Event::Key(key) = event::read().context("reading terminal event")? {
                    self.handle_key(key, Instant::now());
                }
            }

            if last_tick.elapsed() >= tick_rate {
                self.state.on_tick(Instant::now());
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    /// Ticks fast while something is animating, slow otherwise.
    fn tick_rate(&self) -> Duration {
        let revealing = self.state.viewer().is_some_and(|v| v.is_revealing());
        let settling = self
            .state
            .desk
            .carousel()
            .track()
            .is_some_and(|t| t.has_pending_teleport());
        if revealing {
            self.config.viewer.typewriter_interval.clamp(MIN_FRAME, IDLE_TICK)
        } else if settling {
            MIN_FRAME
        } else {
            IDLE_TICK
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.handle_text_entry(key) {
            return;
        }
        if let Some(action) = action_for_key(self.state.view, key) {
            self.handle_action(action, now);
        }
    }

    /// Gate input and the search prompt swallow printable keys.
    fn handle_text_entry(&mut self, key: KeyEvent) -> bool {
        let printable = |ch: char| {
            !key.modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
                && !ch.is_control()
        };
        match self.state.view {
            View::Gate => match key.code {
                KeyCode::Backspace => {
                    self.state.pop_gate_char();
                    true
                }
                KeyCode::Char(ch) if printable(ch) => {
                    self.state.push_gate_char(ch);
                    true
                }
                _ => false,
            },
            View::Desk if self.state.desk.search.active => match key.code {
                KeyCode::Esc => {
                    self.state.desk.cancel_search();
                    self.state.set_status_message(Some("Search cleared"));
                    true
                }
                KeyCode::Enter => {
                    self.state.desk.finish_search();
                    self.state.clear_status_message();
                    true
                }
                KeyCode::Backspace => {
                    self.state.desk.pop_search_char();
                    true
                }
                KeyCode::Char(ch) if printable(ch) => {
                    self.state.desk.push_search_char(ch);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn handle_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::SubmitPassphrase => {
                if self.state.submit_passphrase() {
                    self.state.clear_status_message();
                } else {
                    tracing::debug!(attempts = self.state.gate.attempts, "passphrase rejected");
                }
            }
            Action::Next => self.state.desk.next(),
            Action::Previous => self.state.desk.previous(),
            Action::Select(position) => {
                if position < self.state.desk.visible_len() {
                    self.state.desk.select(position);
                }
            }
            Action::Open => {
                if self.state.open_selected(now) {
                    self.state.clear_status_message();
                }
            }
            Action::Back => self.state.back(),
            Action::Replay => {
                if let Some(viewer) = self.state.viewer_mut() {
                    viewer.replay(now);
                }
            }
            Action::Skip => {
                if let Some(viewer) = self.state.viewer_mut() {
                    viewer.skip();
                }
            }
            Action::CycleTheme => {
                let theme = self.state.desk.cycle_theme_filter().to_string();
                self.announce_filter("Theme", &theme);
            }
            Action::CycleOccasion => {
                let occasion = self.state.desk.cycle_occasion_filter().to_string();
                self.announce_filter("Occasion", &occasion);
            }
            Action::ClearFilters => {
                self.state.desk.clear_filters();
                self.state.set_status_message(Some("Filters cleared"));
            }
            Action::StartSearch => {
                self.state.desk.begin_search();
                self.state
                    .set_status_message(Some("Type to search, Enter to keep, Esc to clear"));
            }
            Action::Lock => {
                self.state.lock();
                self.state.clear_status_message();
            }
        }
    }

    fn announce_filter(&mut self, label: &str, value: &str) {
        let shown = if value.is_empty() { "all" } else { value };
        let count = self.state.desk.visible_len();
        self.state
            .set_status_message(Some(format!("{label}: {shown} ({count} letters)")));
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("restoring screen state")?;
    Ok(())
}
