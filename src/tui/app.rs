use crate::api::{Movie, MovieSource};
use crate::config::AppConfig;
use crate::debounce::DebounceGate;
use crate::logging;
use crate::session::SearchSession;
use crate::tui::list::CardListState;
use crate::tui::search::SearchInput;
use crate::tui::ui;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Short-lived message shown in the status bar
pub struct Toast {
    pub message: String,
    pub is_error: bool,
    expires_at: Instant,
}

impl Toast {
    const LIFETIME: Duration = Duration::from_secs(2);

    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
            expires_at: Instant::now() + Self::LIFETIME,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
            expires_at: Instant::now() + Self::LIFETIME,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub struct App {
    // Input side
    pub search: SearchInput,
    pub gate: DebounceGate,

    // Fetch side
    pub session: SearchSession,

    // Results view
    pub list: CardListState,
    pub toast: Option<Toast>,
    pub started_at: Instant,

    clipboard: Option<arboard::Clipboard>,

    // Quit flag
    pub should_quit: bool,
}

impl App {
    /// Build the app and issue the initial (empty) query right away
    pub fn new(config: &AppConfig, source: Arc<dyn MovieSource>) -> crate::Result<Self> {
        let mut app = Self {
            search: SearchInput::default(),
            gate: DebounceGate::new(config.quiet_interval),
            session: SearchSession::new(source),
            list: CardListState::default(),
            toast: None,
            started_at: Instant::now(),
            clipboard: None,
            should_quit: false,
        };

        log::info!(
            target: logging::INPUT_TARGET,
            "search debounce {}ms",
            app.gate.quiet_interval().as_millis()
        );
        let initial = app.gate.committed().to_string();
        app.session.commit(&initial)?;
        Ok(app)
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> crate::Result<()> {
        let tick_rate = Duration::from_millis(50);

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            let timeout = self.poll_timeout(tick_rate);
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            self.tick(Instant::now())?;

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Wait no longer than the tick, and wake up for a due debounce commit
    fn poll_timeout(&self, tick_rate: Duration) -> Duration {
        match self.gate.next_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(tick_rate),
            None => tick_rate,
        }
    }

    /// Advance timers and apply settled fetches
    pub fn tick(&mut self, now: Instant) -> crate::Result<()> {
        if let Some(query) = self.gate.poll(now) {
            self.commit(&query)?;
        }

        if self.session.poll() {
            self.list.reset(self.session.display().movies().len());
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
        Ok(())
    }

    fn commit(&mut self, query: &str) -> crate::Result<()> {
        logging::log_commit(query);
        self.session.commit(query)?;
        self.list.reset(0);
        Ok(())
    }

    /// Commit the pending text now instead of waiting out the quiet interval
    fn flush_search(&mut self) {
        if let Some(query) = self.gate.flush() {
            if let Err(e) = self.commit(&query) {
                log::error!("{}", e);
                self.toast = Some(Toast::error("Search worker stopped"));
            }
        }
    }

    fn text_changed(&mut self) {
        self.gate.update(&self.search.query, Instant::now());
    }

    pub fn movies(&self) -> &[Movie] {
        self.session.display().movies()
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.list.selected.and_then(|i| self.movies().get(i))
    }

    fn open_selected(&mut self) {
        let Some(movie) = self.selected_movie() else {
            return;
        };
        let url = movie.page_url();
        let title = movie.display_title().to_string();
        self.toast = Some(match open::that(&url) {
            Ok(()) => Toast::info(format!("Opened {}", title)),
            Err(e) => {
                log::warn!("failed to open {}: {}", url, e);
                Toast::error("Could not open browser")
            }
        });
    }

    fn copy_selected(&mut self) {
        let Some(title) = self.selected_movie().map(|m| m.display_title().to_string()) else {
            return;
        };
        if self.clipboard.is_none() {
            self.clipboard = arboard::Clipboard::new().ok();
        }
        let copied = self
            .clipboard
            .as_mut()
            .map(|cb| cb.set_text(title.clone()).is_ok())
            .unwrap_or(false);
        self.toast = Some(if copied {
            Toast::info(format!("Copied \"{}\"", title))
        } else {
            Toast::error("Clipboard unavailable")
        });
    }

    // --- Key handling ---

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Esc => {
                if self.search.focused && self.search.clear() {
                    self.text_changed();
                } else if self.search.focused {
                    self.should_quit = true;
                } else {
                    self.search.focused = true;
                }
                return;
            }
            _ => {}
        }

        if self.search.focused {
            self.handle_search_key(key);
        } else {
            self.handle_list_key(key);
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.flush_search();
                self.search.focused = false;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.search.focused = false;
            }
            _ => {
                if self.search.handle_key(key.code, key.modifiers) {
                    self.text_changed();
                }
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let total = self.movies().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_next(total),
            KeyCode::PageUp => self.list.page_up(),
            KeyCode::PageDown => self.list.page_down(total),
            KeyCode::Home => self.list.select_first(total),
            KeyCode::End => self.list.select_last(total),

            KeyCode::Tab | KeyCode::Char('/') => {
                self.search.focused = true;
            }

            KeyCode::Enter | KeyCode::Char('o') => self.open_selected(),
            KeyCode::Char('y') => self.copy_selected(),

            // Any other printable char focuses search and types it
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.focused = true;
                self.search.push_char(c);
                self.text_changed();
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoint, SearchPayload};
    use crate::state::DisplayState;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Answers immediately with one movie titled after the query
    struct EchoSource {
        seen: Mutex<Vec<Endpoint>>,
    }

    impl MovieSource for EchoSource {
        fn fetch(&self, endpoint: &Endpoint) -> crate::Result<SearchPayload> {
            self.seen.lock().push(endpoint.clone());
            let title = match endpoint {
                Endpoint::Discover => "popular".to_string(),
                Endpoint::Search(q) => q.clone(),
            };
            Ok(serde_json::from_value(json!({
                "results": [{ "id": 1, "title": title }, { "id": 2, "title": "other" }]
            }))?)
        }
    }

    fn app() -> (App, Arc<EchoSource>) {
        let source = Arc::new(EchoSource {
            seen: Mutex::new(Vec::new()),
        });
        let app = App::new(&AppConfig::default(), source.clone()).unwrap();
        (app, source)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.session.is_loading() {
            assert!(Instant::now() < deadline, "fetch never settled");
            app.tick(Instant::now()).unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn startup_loads_popular_listing_without_waiting() {
        let (mut app, source) = app();
        assert!(app.session.is_loading());
        settle(&mut app);
        assert_eq!(source.seen.lock().as_slice(), &[Endpoint::Discover]);
        assert_eq!(app.movies()[0].title.as_deref(), Some("popular"));
    }

    #[test]
    fn typing_commits_after_quiet_interval() {
        let (mut app, source) = app();
        settle(&mut app);

        for c in "heat".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.search.query, "heat");
        assert!(app.gate.is_pending());

        // Not yet quiet long enough
        app.tick(Instant::now()).unwrap();
        assert_eq!(app.session.query(), "");

        app.tick(Instant::now() + Duration::from_millis(600)).unwrap();
        assert_eq!(app.session.query(), "heat");
        assert!(app.session.is_loading());
        settle(&mut app);

        assert_eq!(
            source.seen.lock().last(),
            Some(&Endpoint::Search("heat".to_string()))
        );
        assert_eq!(app.list.selected, Some(0));
    }

    #[test]
    fn enter_flushes_and_focuses_results() {
        let (mut app, _source) = app();
        settle(&mut app);

        press(&mut app, KeyCode::Char('u'));
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Enter);
        assert!(!app.search.focused);
        assert_eq!(app.session.query(), "up");
        settle(&mut app);

        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_movie().map(|m| m.id), Some(2));
    }

    #[test]
    fn escape_clears_then_quits() {
        let (mut app, _source) = app();
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Esc);
        assert!(app.search.query.is_empty());
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn typing_in_list_returns_to_search() {
        let (mut app, _source) = app();
        settle(&mut app);
        press(&mut app, KeyCode::Tab);
        assert!(!app.search.focused);

        press(&mut app, KeyCode::Char('z'));
        assert!(app.search.focused);
        assert_eq!(app.search.query, "z");
        assert!(app.gate.is_pending());
    }

    #[test]
    fn results_state_is_loaded_after_settle() {
        let (mut app, _source) = app();
        settle(&mut app);
        assert!(matches!(app.session.display(), DisplayState::Loaded(m) if m.len() == 2));
    }
}
