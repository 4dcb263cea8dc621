use crate::animations::VictoryScreen;
use crate::leaderboard::LeaderboardManager;
use crate::settings::{Settings, MAX_NAME_LEN};
use crate::stats::StatsManager;
use crate::storage::Storage;
use crate::theme::Theme;
use casefile_core::{
    daily_case, today, Case, CaseError, Catalog, Cell, Difficulty, HintOutcome, RevealedFact,
    Session, SolveRecord,
};
use crossterm::event::{KeyCode, KeyEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    MainMenu,
    CaseSelect,
    /// Narrative brief of the open case
    Story,
    /// Grid, clues and timer
    Puzzle,
    Victory,
    Leaderboard,
    Settings,
    Daily,
}

/// Entries of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Cases,
    Daily,
    Leaderboard,
    Settings,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::Cases,
        MenuItem::Daily,
        MenuItem::Leaderboard,
        MenuItem::Settings,
        MenuItem::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Cases => "Case Files",
            MenuItem::Daily => "Daily Challenge",
            MenuItem::Leaderboard => "Leaderboard",
            MenuItem::Settings => "Settings",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Entries of the settings screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    Theme,
    Sound,
    Notifications,
    PlayerName,
}

impl SettingsItem {
    pub const ALL: [SettingsItem; 4] = [
        SettingsItem::Theme,
        SettingsItem::Sound,
        SettingsItem::Notifications,
        SettingsItem::PlayerName,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsItem::Theme => "Theme",
            SettingsItem::Sound => "Sound",
            SettingsItem::Notifications => "Daily reminder",
            SettingsItem::PlayerName => "Detective name",
        }
    }
}

/// Which leaderboard table is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardView {
    /// Individual solves
    Scores,
    /// Per-player totals
    Players,
}

/// Outcome shown on the victory screen
#[derive(Debug, Clone)]
pub struct Victory {
    pub record: SolveRecord,
    pub score: u64,
    pub stars: u8,
    pub new_best: bool,
    pub rank: Option<usize>,
    /// The solved case's answer, one subject per line
    pub assignments: Vec<(String, Vec<String>)>,
}

/// Leaderboard filters in display order, "All" first
pub fn leaderboard_filters() -> Vec<Option<Difficulty>> {
    std::iter::once(None)
        .chain(Difficulty::all().iter().copied().map(Some))
        .collect()
}

/// Everything the app needs from start-up
pub struct AppConfig {
    pub catalog: Catalog,
    pub storage: Storage,
    pub settings: Settings,
    pub unlock_premium: bool,
}

/// The main application state
pub struct App {
    pub catalog: Catalog,
    pub storage: Storage,
    pub settings: Settings,
    pub theme: Theme,
    pub stats: StatsManager,
    pub leaderboard: LeaderboardManager,
    /// Current screen state
    pub screen_state: ScreenState,
    pub menu_selection: usize,
    pub case_selection: usize,
    pub settings_selection: usize,
    /// Player name being typed on the settings screen
    pub editing_name: Option<String>,
    pub leaderboard_filter: Option<Difficulty>,
    pub leaderboard_view: LeaderboardView,
    /// Active puzzle session, if a case is open
    pub session: Option<Session>,
    /// Selected grid cell
    pub cursor: Cell,
    /// Most recent hint
    pub last_hint: Option<RevealedFact>,
    /// Asking whether to abandon the open case
    pub confirm_leave: bool,
    pub victory: Option<Victory>,
    pub victory_screen: VictoryScreen,
    /// Message to display
    pub message: Option<String>,
    message_timer: u32,
    /// Premium cases playable for this run
    pub unlock_premium: bool,
    /// Day number the daily challenge is computed for
    pub daily_day: u64,
    /// Screen to return to after a case
    return_to: ScreenState,
    bell: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let stats = StatsManager::load(config.storage.clone());
        let leaderboard = LeaderboardManager::for_storage(&config.storage);
        info!(
            cases = config.catalog.len(),
            leaderboard = leaderboard.backend_name(),
            persistent = config.storage.is_persistent(),
            "app started"
        );

        Self {
            theme: Theme::from_name(config.settings.theme),
            catalog: config.catalog,
            storage: config.storage,
            settings: config.settings,
            stats,
            leaderboard,
            screen_state: ScreenState::MainMenu,
            menu_selection: 0,
            case_selection: 0,
            settings_selection: 0,
            editing_name: None,
            leaderboard_filter: None,
            leaderboard_view: LeaderboardView::Scores,
            session: None,
            cursor: Cell::new(0, 0),
            last_hint: None,
            confirm_leave: false,
            victory: None,
            victory_screen: VictoryScreen::new(),
            message: None,
            message_timer: 0,
            unlock_premium: config.unlock_premium,
            daily_day: today(),
            return_to: ScreenState::MainMenu,
            bell: false,
        }
    }

    /// Get the tick rate based on current screen
    pub fn get_tick_rate(&self) -> Duration {
        match self.screen_state {
            ScreenState::Victory => Duration::from_millis(33), // 30 FPS for animations
            _ => Duration::from_millis(100),
        }
    }

    /// Update animations and timers (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        if self.screen_state == ScreenState::Victory {
            self.victory_screen.update();
        }
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 30; // ~3 seconds at 100ms poll
    }

    fn ring_bell(&mut self) {
        if self.settings.sound {
            self.bell = true;
        }
    }

    /// Whether a bell is pending; clears it
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Premium cases need `--unlock-premium`
    pub fn is_locked(&self, case: &Case) -> bool {
        case.is_premium() && !self.unlock_premium
    }

    /// Today's featured case
    pub fn daily_case(&self) -> Option<Arc<Case>> {
        daily_case(&self.catalog, self.daily_day)
    }

    pub fn daily_solved(&self) -> bool {
        self.stats.daily_solved_on(self.daily_day)
    }

    /// Open a case by id and show its story
    pub fn open_case(&mut self, case_id: &str) -> Result<(), CaseError> {
        let case = self.catalog.find(case_id)?;
        if self.is_locked(&case) {
            self.show_message("Premium case: start with --unlock-premium to investigate");
            return Ok(());
        }
        self.start_session(case, false);
        Ok(())
    }

    /// Open today's daily challenge; the daily case is playable even if premium
    pub fn open_daily(&mut self) {
        match self.daily_case() {
            Some(case) => self.start_session(case, true),
            None => self.show_message("No cases available"),
        }
    }

    fn start_session(&mut self, case: Arc<Case>, daily: bool) {
        if let Some(position) = self.catalog.position(case.id()) {
            self.case_selection = position;
        }
        let mut session = Session::open(case);
        session.set_daily(daily);
        self.session = Some(session);
        self.cursor = Cell::new(0, 0);
        self.last_hint = None;
        self.confirm_leave = false;
        self.victory = None;
        self.return_to = if daily {
            ScreenState::Daily
        } else {
            ScreenState::CaseSelect
        };
        self.screen_state = ScreenState::Story;
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen_state {
            ScreenState::MainMenu => self.handle_menu_key(key),
            ScreenState::CaseSelect => self.handle_case_select_key(key),
            ScreenState::Story => self.handle_story_key(key),
            ScreenState::Puzzle => self.handle_puzzle_key(key),
            ScreenState::Victory => self.handle_victory_key(key),
            ScreenState::Leaderboard => self.handle_leaderboard_key(key),
            ScreenState::Settings => self.handle_settings_key(key),
            ScreenState::Daily => self.handle_daily_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> AppAction {
        let count = MenuItem::ALL.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_selection = (self.menu_selection + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_selection = (self.menu_selection + 1) % count;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                return self.select_menu_item(MenuItem::ALL[self.menu_selection]);
            }
            KeyCode::Char('c') => return self.select_menu_item(MenuItem::Cases),
            KeyCode::Char('d') => return self.select_menu_item(MenuItem::Daily),
            KeyCode::Char('l') => return self.select_menu_item(MenuItem::Leaderboard),
            KeyCode::Char('s') => return self.select_menu_item(MenuItem::Settings),
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            _ => {}
        }
        AppAction::Continue
    }

    fn select_menu_item(&mut self, item: MenuItem) -> AppAction {
        match item {
            MenuItem::Cases => self.screen_state = ScreenState::CaseSelect,
            MenuItem::Daily => self.screen_state = ScreenState::Daily,
            MenuItem::Leaderboard => self.screen_state = ScreenState::Leaderboard,
            MenuItem::Settings => self.screen_state = ScreenState::Settings,
            MenuItem::Quit => return AppAction::Quit,
        }
        AppAction::Continue
    }

    fn handle_case_select_key(&mut self, key: KeyEvent) -> AppAction {
        let count = self.catalog.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.case_selection = (self.case_selection + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.case_selection = (self.case_selection + 1) % count;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(case) = self.catalog.cases().get(self.case_selection).cloned() {
                    if let Err(e) = self.open_case(case.id()) {
                        warn!(error = %e, "failed to open case");
                        self.show_message(&e.to_string());
                    }
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.screen_state = ScreenState::MainMenu,
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_daily_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.open_daily(),
            KeyCode::Esc | KeyCode::Char('q') => self.screen_state = ScreenState::MainMenu,
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_story_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('b') => {
                let begun = self.session.as_mut().map(|session| session.begin());
                match begun {
                    Some(Ok(())) => self.screen_state = ScreenState::Puzzle,
                    Some(Err(e)) => self.show_message(&e.to_string()),
                    None => self.screen_state = self.return_to,
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                // Nothing was played yet, so nothing is recorded
                self.session = None;
                self.screen_state = self.return_to;
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_puzzle_key(&mut self, key: KeyEvent) -> AppAction {
        if self.confirm_leave {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.abandon_case(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_leave = false;
                }
                _ => {}
            }
            return AppAction::Continue;
        }

        let Some(session) = self.session.as_mut() else {
            self.screen_state = self.return_to;
            return AppAction::Continue;
        };
        let (rows, cols) = session.grid().dimensions();

        if session.is_paused() {
            match key.code {
                KeyCode::Char('p') => {
                    if let Err(e) = session.toggle_pause() {
                        self.show_message(&e.to_string());
                    }
                }
                KeyCode::Esc | KeyCode::Char('q') => self.request_leave(),
                _ => {}
            }
            return AppAction::Continue;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor.subject = self.cursor.subject.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor.subject + 1 < rows {
                    self.cursor.subject += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.cursor.item = self.cursor.item.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.cursor.item + 1 < cols {
                    self.cursor.item += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Err(e) = session.toggle_at(self.cursor) {
                    self.show_message(&e.to_string());
                }
            }
            KeyCode::Char('c') => self.check_solution(),
            KeyCode::Char('x') => match session.clear_grid() {
                Ok(()) => self.show_message("Grid cleared"),
                Err(e) => self.show_message(&e.to_string()),
            },
            KeyCode::Char('?') | KeyCode::Char('i') => self.use_hint(),
            KeyCode::Char('p') => {
                if let Err(e) = session.toggle_pause() {
                    self.show_message(&e.to_string());
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.request_leave(),
            _ => {}
        }
        AppAction::Continue
    }

    fn check_solution(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.check() {
            Ok(true) => self.finish_case(),
            Ok(false) => self.show_message("Not quite. Keep investigating, detective."),
            Err(e) => self.show_message(&e.to_string()),
        }
    }

    fn use_hint(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.hint() {
            Ok(HintOutcome::Revealed(fact)) => {
                let remaining = session.hints_remaining();
                if let Some(cell) = session.grid().locate(&fact.subject, &fact.item) {
                    self.cursor = cell;
                }
                self.show_message(&format!("Revealed: {} ({} left)", fact, remaining));
                self.last_hint = Some(fact);
                self.ring_bell();
            }
            Ok(HintOutcome::Refused { max_hints, .. }) => {
                self.show_message(&format!("No hints left ({} used)", max_hints));
            }
            Err(e) => self.show_message(&e.to_string()),
        }
    }

    /// Record a solved session and switch to the victory screen
    fn finish_case(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(record) = session.solve_record() else {
            return;
        };
        let assignments: Vec<(String, Vec<String>)> = session
            .case()
            .assignments()
            .into_iter()
            .map(|(subject, items)| {
                (
                    subject.to_string(),
                    items.into_iter().map(str::to_string).collect(),
                )
            })
            .collect();

        let previous_best = self.stats.best_for(&record.case_id).and_then(|r| r.score);
        self.stats.record_solve(&record);
        if let Err(e) = self.leaderboard.submit(&self.settings.player_name, &record) {
            warn!(error = %e, "failed to submit score");
        }

        let score = record.score();
        self.victory = Some(Victory {
            score,
            stars: record.stars(),
            new_best: previous_best.map_or(true, |best| score > best),
            rank: self.leaderboard.player_rank(&self.settings.player_name),
            record,
            assignments,
        });
        self.victory_screen.reset();
        self.ring_bell();
        self.screen_state = ScreenState::Victory;
    }

    fn request_leave(&mut self) {
        match &self.session {
            Some(session) if session.has_progress() => self.confirm_leave = true,
            _ => self.abandon_case(),
        }
    }

    /// Abandon the open case, recording it if play had begun
    fn abandon_case(&mut self) {
        if let Some(mut session) = self.session.take() {
            let started = session.phase() == casefile_core::Phase::InProgress;
            if session.abandon().is_ok() && started {
                self.stats.record_abandon(&session);
            }
        }
        self.confirm_leave = false;
        self.last_hint = None;
        self.screen_state = self.return_to;
    }

    fn handle_victory_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Enter | KeyCode::Char('m') | KeyCode::Esc => {
                self.session = None;
                self.screen_state = ScreenState::MainMenu;
            }
            KeyCode::Char('n') => {
                self.session = None;
                if !self.catalog.is_empty() {
                    self.case_selection = (self.case_selection + 1) % self.catalog.len();
                }
                self.screen_state = ScreenState::CaseSelect;
            }
            KeyCode::Char('l') => {
                self.session = None;
                self.screen_state = ScreenState::Leaderboard;
            }
            KeyCode::Char('q') => return AppAction::Quit,
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_leaderboard_key(&mut self, key: KeyEvent) -> AppAction {
        let filters = leaderboard_filters();
        let current = filters
            .iter()
            .position(|f| *f == self.leaderboard_filter)
            .unwrap_or(0);

        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.leaderboard_filter = filters[(current + filters.len() - 1) % filters.len()];
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.leaderboard_filter = filters[(current + 1) % filters.len()];
            }
            KeyCode::Tab => {
                self.leaderboard_view = match self.leaderboard_view {
                    LeaderboardView::Scores => LeaderboardView::Players,
                    LeaderboardView::Players => LeaderboardView::Scores,
                };
            }
            KeyCode::Esc | KeyCode::Char('q') => self.screen_state = ScreenState::MainMenu,
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> AppAction {
        if let Some(name) = self.editing_name.as_mut() {
            match key.code {
                KeyCode::Char(c) if !c.is_control() => {
                    if name.chars().count() < MAX_NAME_LEN {
                        name.push(c);
                    }
                }
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Enter => {
                    let name = name.clone();
                    self.editing_name = None;
                    self.settings.set_player_name(&name);
                    self.save_settings();
                }
                KeyCode::Esc => self.editing_name = None,
                _ => {}
            }
            return AppAction::Continue;
        }

        let count = SettingsItem::ALL.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings_selection = (self.settings_selection + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.settings_selection = (self.settings_selection + 1) % count;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.change_setting(SettingsItem::ALL[self.settings_selection]);
            }
            KeyCode::Esc | KeyCode::Char('q') => self.screen_state = ScreenState::MainMenu,
            _ => {}
        }
        AppAction::Continue
    }

    fn change_setting(&mut self, item: SettingsItem) {
        match item {
            SettingsItem::Theme => {
                self.settings.theme = self.settings.theme.next();
                self.theme = Theme::from_name(self.settings.theme);
            }
            SettingsItem::Sound => self.settings.sound = !self.settings.sound,
            SettingsItem::Notifications => {
                self.settings.notifications = !self.settings.notifications;
            }
            SettingsItem::PlayerName => {
                self.editing_name = Some(self.settings.player_name.clone());
                return;
            }
        }
        self.save_settings();
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(&self.storage) {
            warn!(error = %e, "failed to save settings");
            self.show_message("Could not save settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ThemeName;
    use crate::stats::CaseResult;
    use casefile_core::{Mark, Phase};
    use crossterm::event::KeyModifiers;

    fn app() -> App {
        App::new(AppConfig {
            catalog: Catalog::builtin().unwrap(),
            storage: Storage::in_memory(),
            settings: Settings::default(),
            unlock_premium: false,
        })
    }

    fn press(app: &mut App, code: KeyCode) -> AppAction {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn solve_open_case(app: &mut App) {
        let session = app.session.as_mut().unwrap();
        let case = session.case().clone();
        for (subject, item, value) in case.solution().iter() {
            while session.grid().get(subject, item) != Some(Mark::from(value)) {
                session.toggle(subject, item).unwrap();
            }
        }
    }

    #[test]
    fn test_menu_navigation() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen_state, ScreenState::Daily);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen_state, ScreenState::MainMenu);
        assert!(matches!(press(&mut app, KeyCode::Char('q')), AppAction::Quit));
    }

    #[test]
    fn test_play_case_to_victory() {
        let mut app = app();
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen_state, ScreenState::Story);
        assert_eq!(app.session.as_ref().unwrap().case().id(), "diamond-heist");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen_state, ScreenState::Puzzle);

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.screen_state, ScreenState::Puzzle);
        assert!(app.message.is_some());

        solve_open_case(&mut app);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.screen_state, ScreenState::Victory);

        let victory = app.victory.as_ref().unwrap();
        assert_eq!(victory.stars, 3);
        assert!(victory.new_best);
        assert_eq!(victory.rank, Some(1));
        assert!(app.stats.is_completed("diamond-heist"));
        assert_eq!(app.leaderboard.top(None, 10).unwrap().len(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen_state, ScreenState::MainMenu);
        assert!(app.session.is_none());
    }

    #[test]
    fn test_cursor_toggle_and_hints() {
        let mut app = app();
        app.open_case("diamond-heist").unwrap();
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        let grid = app.session.as_ref().unwrap().grid();
        assert_eq!(grid.mark_at(Cell::new(1, 1)), Some(Mark::True));

        for _ in 0..4 {
            press(&mut app, KeyCode::Char('?'));
        }
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.hints_used(), 3);
        assert!(app.last_hint.is_some());
        assert!(app.message.as_deref().unwrap().starts_with("No hints left"));
    }

    #[test]
    fn test_premium_locked_unless_unlocked() {
        let mut app = app();
        app.open_case("art-forgery").unwrap();
        assert!(app.session.is_none());
        assert!(app.message.is_some());

        app.unlock_premium = true;
        app.open_case("art-forgery").unwrap();
        assert_eq!(app.screen_state, ScreenState::Story);
    }

    #[test]
    fn test_open_unknown_case() {
        let mut app = app();
        assert!(matches!(
            app.open_case("no-such-case"),
            Err(CaseError::CaseNotFound(_))
        ));
    }

    #[test]
    fn test_leave_with_progress_asks_first() {
        let mut app = app();
        app.open_case("bank-robbery").unwrap();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Esc);
        assert!(app.confirm_leave);
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.confirm_leave);
        assert_eq!(app.session.as_ref().unwrap().phase(), Phase::InProgress);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('y'));
        assert!(app.session.is_none());
        assert_eq!(app.screen_state, ScreenState::CaseSelect);
        assert_eq!(app.stats.history[0].result, CaseResult::Abandoned);
    }

    #[test]
    fn test_leave_story_records_nothing() {
        let mut app = app();
        app.open_case("diamond-heist").unwrap();
        press(&mut app, KeyCode::Esc);
        assert!(app.session.is_none());
        assert!(app.stats.history.is_empty());
    }

    #[test]
    fn test_daily_sets_bonus_flag() {
        let mut app = app();
        app.daily_day = 3;
        app.open_daily();
        let session = app.session.as_ref().unwrap();
        assert!(session.is_daily());
        assert_eq!(session.case().id(), "art-forgery");

        press(&mut app, KeyCode::Enter);
        solve_open_case(&mut app);
        press(&mut app, KeyCode::Char('c'));
        let victory = app.victory.as_ref().unwrap();
        assert!(victory.record.daily);
        assert!(victory.score >= 1000 + 500);
    }

    #[test]
    fn test_pause_blocks_grid() {
        let mut app = app();
        app.open_case("diamond-heist").unwrap();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        assert!(app.session.as_ref().unwrap().is_paused());
        assert_eq!(app.session.as_ref().unwrap().grid().marked_count(), 0);
        press(&mut app, KeyCode::Char('p'));
        assert!(!app.session.as_ref().unwrap().is_paused());
    }

    #[test]
    fn test_pause_key_outside_play_reports() {
        let mut app = app();
        app.open_case("diamond-heist").unwrap();
        app.screen_state = ScreenState::Puzzle;
        press(&mut app, KeyCode::Char('p'));
        assert!(!app.session.as_ref().unwrap().is_paused());
        assert!(app.message.as_deref().unwrap().contains("pause"));
    }

    #[test]
    fn test_clear_grid_key() {
        let mut app = app();
        app.open_case("diamond-heist").unwrap();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.session.as_ref().unwrap().grid().marked_count(), 2);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.session.as_ref().unwrap().grid().marked_count(), 0);
        assert_eq!(app.message.as_deref(), Some("Grid cleared"));
    }

    #[test]
    fn test_victory_carries_solution() {
        let mut app = app();
        app.open_case("diamond-heist").unwrap();
        press(&mut app, KeyCode::Enter);
        solve_open_case(&mut app);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.screen_state, ScreenState::Victory);

        let victory = app.victory.as_ref().unwrap();
        let case = app.catalog.find("diamond-heist").unwrap();
        assert_eq!(victory.assignments.len(), case.subjects().len());
        for ((subject, items), (expected_subject, expected_items)) in
            victory.assignments.iter().zip(case.assignments())
        {
            assert_eq!(subject, expected_subject);
            assert_eq!(items, &expected_items);
            assert_eq!(items.len(), case.attribute_categories().len());
        }
    }

    #[test]
    fn test_settings_changes() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.settings.theme, ThemeName::Light);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(!app.settings.sound);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(app.editing_name.is_some());
        for _ in 0.."Detective".len() {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "Poirot".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.settings.player_name, "Poirot");
        assert!(app.editing_name.is_none());
    }

    #[test]
    fn test_leaderboard_filters_cycle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.leaderboard_filter, Some(Difficulty::Easy));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.leaderboard_filter, Some(Difficulty::Hard));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.leaderboard_view, LeaderboardView::Players);
    }
}
