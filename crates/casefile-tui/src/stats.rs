use crate::storage::{Storage, StorageResult};
use casefile_core::{Difficulty, PlayerProgress, Session, SolveRecord};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

pub const PROGRESS_FILE: &str = "progress.json";

/// History is capped to the most recent entries
pub const MAX_HISTORY: usize = 1000;

const SECS_PER_DAY: u64 = 86_400;

/// How a case attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseResult {
    Solved,
    Abandoned,
}

/// Record of a single finished attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: u64,
    pub case_id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub result: CaseResult,
    pub time_secs: u64,
    pub hints_used: u32,
    /// Only solved attempts score
    pub score: Option<u64>,
    pub stars: Option<u8>,
    #[serde(default)]
    pub daily: bool,
    /// Unix timestamp when the attempt ended
    pub timestamp: u64,
}

impl CaseRecord {
    pub fn day(&self) -> u64 {
        self.timestamp / SECS_PER_DAY
    }
}

/// Player progress plus the attempt history, persisted as one file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsManager {
    pub progress: PlayerProgress,
    /// All attempts (most recent first)
    pub history: Vec<CaseRecord>,
    pub abandoned: u64,
    next_id: u64,
    #[serde(skip)]
    storage: Storage,
}

impl StatsManager {
    /// Load stats from storage
    pub fn load(storage: Storage) -> Self {
        let mut stats: Self = storage.load(PROGRESS_FILE);
        stats.storage = storage;
        stats
    }

    /// Save stats to storage
    pub fn save(&self) -> StorageResult<()> {
        self.storage.save(PROGRESS_FILE, self)
    }

    fn save_or_warn(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "failed to save progress");
        }
    }

    fn push(&mut self, record: CaseRecord) -> &CaseRecord {
        self.history.insert(0, record);
        self.history.truncate(MAX_HISTORY);
        self.next_id += 1;
        self.save_or_warn();
        &self.history[0]
    }

    /// Fold a solved session into progress and history
    pub fn record_solve(&mut self, solve: &SolveRecord) -> &CaseRecord {
        self.progress.record(solve);
        info!(
            case = %solve.case_id,
            score = solve.score(),
            stars = solve.stars(),
            "solve recorded"
        );
        let record = CaseRecord {
            id: self.next_id + 1,
            case_id: solve.case_id.clone(),
            title: solve.title.clone(),
            difficulty: solve.difficulty,
            result: CaseResult::Solved,
            time_secs: solve.time_secs,
            hints_used: solve.hints_used,
            score: Some(solve.score()),
            stars: Some(solve.stars()),
            daily: solve.daily,
            timestamp: solve.timestamp,
        };
        self.push(record)
    }

    /// Remember an attempt the player walked away from
    pub fn record_abandon(&mut self, session: &Session) -> &CaseRecord {
        self.abandoned += 1;
        let case = session.case();
        let record = CaseRecord {
            id: self.next_id + 1,
            case_id: case.id().to_string(),
            title: case.title().to_string(),
            difficulty: case.difficulty(),
            result: CaseResult::Abandoned,
            time_secs: session.elapsed().as_secs(),
            hints_used: session.hints_used(),
            score: None,
            stars: None,
            daily: session.is_daily(),
            timestamp: now(),
        };
        self.push(record)
    }

    /// Get recent attempts
    pub fn recent(&self, limit: usize) -> &[CaseRecord] {
        let end = limit.min(self.history.len());
        &self.history[..end]
    }

    /// Highest scoring solve of a case
    pub fn best_for(&self, case_id: &str) -> Option<&CaseRecord> {
        self.history
            .iter()
            .filter(|r| r.case_id == case_id && r.result == CaseResult::Solved)
            .max_by_key(|r| r.score.unwrap_or(0))
    }

    pub fn is_completed(&self, case_id: &str) -> bool {
        self.progress.has_completed(case_id)
    }

    /// Whether the daily challenge was solved on the given day
    pub fn daily_solved_on(&self, day: u64) -> bool {
        self.history
            .iter()
            .any(|r| r.daily && r.result == CaseResult::Solved && r.day() == day)
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Format seconds as MM:SS or HH:MM:SS
pub fn format_time(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}
