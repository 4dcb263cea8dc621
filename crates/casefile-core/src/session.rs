use crate::case::Case;
use crate::checker;
use crate::error::{CaseError, Result};
use crate::grid::{Cell, GridState, Mark};
use crate::hint::{HintOutcome, HintProvider};
use crate::progress::SolveRecord;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Lifecycle of a puzzle session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    NotStarted,
    StoryShown,
    InProgress,
    Solved,
    Abandoned,
}

impl Phase {
    /// Solved and Abandoned accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Solved | Phase::Abandoned)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::NotStarted => write!(f, "not started"),
            Phase::StoryShown => write!(f, "showing the story"),
            Phase::InProgress => write!(f, "in progress"),
            Phase::Solved => write!(f, "solved"),
            Phase::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// One attempt at a case: grid, hint counter, clock and phase.
///
/// Sessions live only in memory and are dropped when the player leaves the
/// puzzle.
#[derive(Debug)]
pub struct Session {
    case: Arc<Case>,
    grid: GridState,
    hints_used: u32,
    phase: Phase,
    /// Start of the current running stretch, `None` while not ticking
    started_at: Option<Instant>,
    /// Time accumulated before the current stretch
    elapsed: Duration,
    paused: bool,
    checks: u32,
    daily: bool,
    hints: HintProvider,
}

impl Session {
    /// A fresh session in `NotStarted`
    pub fn new(case: Arc<Case>) -> Self {
        Self::with_hint_provider(case, HintProvider::new())
    }

    /// A fresh session whose hints come from the given provider
    pub fn with_hint_provider(case: Arc<Case>, hints: HintProvider) -> Self {
        let grid = GridState::initialize(&case);
        Self {
            case,
            grid,
            hints_used: 0,
            phase: Phase::NotStarted,
            started_at: None,
            elapsed: Duration::ZERO,
            paused: false,
            checks: 0,
            daily: false,
            hints,
        }
    }

    /// Open a case: a fresh session already showing its story
    pub fn open(case: Arc<Case>) -> Self {
        let mut session = Self::new(case);
        session.phase = Phase::StoryShown;
        info!(case = session.case.id(), "case opened");
        session
    }

    fn require(&self, expected: Phase, action: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(CaseError::InvalidState {
                action,
                phase: self.phase,
            })
        }
    }

    /// NotStarted -> StoryShown
    pub fn show_story(&mut self) -> Result<()> {
        self.require(Phase::NotStarted, "show the story")?;
        self.phase = Phase::StoryShown;
        Ok(())
    }

    /// StoryShown -> InProgress; starts the clock
    pub fn begin(&mut self) -> Result<()> {
        self.require(Phase::StoryShown, "begin the investigation")?;
        self.phase = Phase::InProgress;
        self.started_at = Some(Instant::now());
        info!(case = self.case.id(), "investigation started");
        Ok(())
    }

    pub fn case(&self) -> &Arc<Case> {
        &self.case
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn hints_remaining(&self) -> u32 {
        self.case.max_hints().saturating_sub(self.hints_used)
    }

    pub fn can_hint(&self) -> bool {
        self.phase == Phase::InProgress && !self.paused && self.hints_remaining() > 0
    }

    /// Number of checks made so far
    pub fn checks(&self) -> u32 {
        self.checks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True once the session has reached a terminal phase
    pub fn is_completed(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_solved(&self) -> bool {
        self.phase == Phase::Solved
    }

    pub fn is_daily(&self) -> bool {
        self.daily
    }

    /// Mark this session as the daily challenge
    pub fn set_daily(&mut self, daily: bool) {
        self.daily = daily;
    }

    /// Whether the player has done anything worth confirming before leaving
    pub fn has_progress(&self) -> bool {
        self.phase == Phase::InProgress && (self.grid.marked_count() > 0 || self.hints_used > 0)
    }

    fn require_playable(&self, action: &'static str) -> Result<()> {
        self.require(Phase::InProgress, action)?;
        if self.paused {
            return Err(CaseError::InvalidState {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Cycle one cell by label
    pub fn toggle(&mut self, subject: &str, item: &str) -> Result<Mark> {
        self.require_playable("mark the grid")?;
        self.grid.toggle(subject, item)
    }

    /// Cycle one cell by index
    pub fn toggle_at(&mut self, cell: Cell) -> Result<Mark> {
        self.require_playable("mark the grid")?;
        self.grid.toggle_at(cell)
    }

    /// Wipe every mark; hints already spent stay spent
    pub fn clear_grid(&mut self) -> Result<()> {
        self.require_playable("clear the grid")?;
        self.grid.reset();
        debug!(case = self.case.id(), "grid cleared");
        Ok(())
    }

    /// Compare the grid to the solution; a match moves the session to Solved
    pub fn check(&mut self) -> Result<bool> {
        self.require_playable("check the solution")?;
        self.checks += 1;
        let solved = checker::check(&self.grid, self.case.solution());
        if solved {
            self.stop_clock();
            self.phase = Phase::Solved;
            info!(
                case = self.case.id(),
                elapsed = %self.elapsed_string(),
                hints = self.hints_used,
                checks = self.checks,
                "case solved"
            );
        } else {
            debug!(case = self.case.id(), checks = self.checks, "incorrect solution");
        }
        Ok(solved)
    }

    /// Ask for a hint; a spent budget yields `HintOutcome::Refused`
    pub fn hint(&mut self) -> Result<HintOutcome> {
        self.require_playable("use a hint")?;
        self.hints
            .give_hint(&self.case, &mut self.grid, &mut self.hints_used)
    }

    /// Any non-terminal phase may be abandoned
    pub fn abandon(&mut self) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(CaseError::InvalidState {
                action: "abandon the case",
                phase: self.phase,
            });
        }
        self.stop_clock();
        self.phase = Phase::Abandoned;
        info!(case = self.case.id(), "case abandoned");
        Ok(())
    }

    /// Pause or resume the clock while in progress
    pub fn toggle_pause(&mut self) -> Result<bool> {
        self.require(Phase::InProgress, "pause")?;
        if self.paused {
            self.started_at = Some(Instant::now());
        } else {
            self.stop_clock();
        }
        self.paused = !self.paused;
        Ok(self.paused)
    }

    fn stop_clock(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.elapsed += started.elapsed();
        }
    }

    /// Time spent investigating, excluding pauses
    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started) => self.elapsed + started.elapsed(),
            None => self.elapsed,
        }
    }

    /// Format the elapsed time as MM:SS
    pub fn elapsed_string(&self) -> String {
        let secs = self.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Time left before the advisory limit; zero once exceeded
    pub fn time_remaining(&self) -> Option<Duration> {
        self.case
            .time_limit()
            .map(|limit| limit.saturating_sub(self.elapsed()))
    }

    pub fn is_overtime(&self) -> bool {
        self.case
            .time_limit()
            .is_some_and(|limit| self.elapsed() > limit)
    }

    /// Summary for scoring, available once solved
    pub fn solve_record(&self) -> Option<SolveRecord> {
        if !self.is_solved() {
            return None;
        }
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Some(SolveRecord {
            case_id: self.case.id().to_string(),
            title: self.case.title().to_string(),
            difficulty: self.case.difficulty(),
            time_secs: self.elapsed().as_secs(),
            hints_used: self.hints_used,
            max_hints: self.case.max_hints(),
            time_limit_secs: self.case.time_limit().map(|d| d.as_secs()),
            daily: self.daily,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn diamond_session() -> Session {
        let case = Catalog::builtin().unwrap().find("diamond-heist").unwrap();
        Session::with_hint_provider(case, HintProvider::with_seed(42))
    }

    fn fill_solution(session: &mut Session) {
        let case = session.case().clone();
        for (subject, item, value) in case.solution().iter() {
            let target = Mark::from(value);
            while session.grid().get(subject, item) != Some(target) {
                session.toggle(subject, item).unwrap();
            }
        }
    }

    #[test]
    fn test_lifecycle_to_solved() {
        let mut session = diamond_session();
        assert_eq!(session.phase(), Phase::NotStarted);
        session.show_story().unwrap();
        assert_eq!(session.phase(), Phase::StoryShown);
        session.begin().unwrap();
        assert_eq!(session.phase(), Phase::InProgress);

        assert!(!session.check().unwrap());
        assert_eq!(session.phase(), Phase::InProgress);

        fill_solution(&mut session);
        assert!(session.check().unwrap());
        assert_eq!(session.phase(), Phase::Solved);
        assert!(session.is_completed());
        assert!(session.is_solved());
        assert_eq!(session.checks(), 2);

        let record = session.solve_record().unwrap();
        assert_eq!(record.case_id, "diamond-heist");
        assert_eq!(record.hints_used, 0);
        assert_eq!(record.time_limit_secs, Some(900));
    }

    #[test]
    fn test_actions_rejected_outside_progress() {
        let mut session = diamond_session();
        assert!(matches!(
            session.toggle("Alice", "Gallery"),
            Err(CaseError::InvalidState {
                phase: Phase::NotStarted,
                ..
            })
        ));
        assert!(session.begin().is_err());
        assert!(session.check().is_err());
        assert!(session.hint().is_err());
        assert!(session.solve_record().is_none());
    }

    #[test]
    fn test_open_shows_story() {
        let case = Catalog::builtin().unwrap().find("bank-robbery").unwrap();
        let mut session = Session::open(case);
        assert_eq!(session.phase(), Phase::StoryShown);
        assert!(session.show_story().is_err());
        session.begin().unwrap();
    }

    #[test]
    fn test_abandon_from_any_open_phase() {
        let mut session = diamond_session();
        session.abandon().unwrap();
        assert_eq!(session.phase(), Phase::Abandoned);
        assert!(session.is_completed());
        assert!(!session.is_solved());
        assert!(session.abandon().is_err());

        let mut session = diamond_session();
        session.show_story().unwrap();
        session.begin().unwrap();
        session.toggle("Alice", "Gallery").unwrap();
        assert!(session.has_progress());
        session.abandon().unwrap();
        assert!(session.toggle("Alice", "Gallery").is_err());
    }

    #[test]
    fn test_hint_budget() {
        let mut session = diamond_session();
        session.show_story().unwrap();
        session.begin().unwrap();
        for _ in 0..3 {
            assert!(!session.hint().unwrap().is_refused());
        }
        assert_eq!(session.hints_remaining(), 0);
        assert!(!session.can_hint());
        assert!(session.hint().unwrap().is_refused());
        assert_eq!(session.hints_used(), 3);
    }

    #[test]
    fn test_pause_blocks_play() {
        let mut session = diamond_session();
        session.show_story().unwrap();
        session.begin().unwrap();
        assert!(session.toggle_pause().unwrap());
        assert!(session.toggle("Alice", "Gallery").is_err());
        let frozen = session.elapsed();
        assert_eq!(session.elapsed(), frozen);
        assert!(!session.toggle_pause().unwrap());
        session.toggle("Alice", "Gallery").unwrap();
    }

    #[test]
    fn test_clear_grid_keeps_hints() {
        let mut session = diamond_session();
        assert!(session.clear_grid().is_err());
        session.show_story().unwrap();
        session.begin().unwrap();
        session.toggle("Alice", "Gallery").unwrap();
        session.hint().unwrap();
        session.clear_grid().unwrap();
        assert_eq!(session.grid().marked_count(), 0);
        assert_eq!(session.hints_used(), 1);
        assert!(session.has_progress());
    }

    #[test]
    fn test_time_limit_is_advisory() {
        let mut session = diamond_session();
        session.show_story().unwrap();
        session.begin().unwrap();
        assert!(!session.is_overtime());
        let remaining = session.time_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(900));
        assert_eq!(session.elapsed_string().len(), 5);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::InProgress.to_string(), "in progress");
        let err = CaseError::InvalidState {
            action: "check the solution",
            phase: Phase::Solved,
        };
        assert_eq!(err.to_string(), "cannot check the solution while the session is solved");
    }
}
