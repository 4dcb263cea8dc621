//! Leaderboard backend abstraction
//!
//! Supports different backends based on the storage environment:
//! - Local: file-based storage in the data directory
//! - Test: in-memory mock

use crate::storage::{Storage, StorageError};
use casefile_core::{Difficulty, SolveRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::warn;

pub const LEADERBOARD_FILE: &str = "leaderboard.json";

/// Entries kept per backend
pub const MAX_ENTRIES: usize = 1000;

/// One solved case on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub case_id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub score: u64,
    pub time_secs: u64,
    pub hints_used: u32,
    pub stars: u8,
    #[serde(default)]
    pub daily: bool,
    pub timestamp: u64,
    /// Position in the returned listing
    #[serde(default)]
    pub rank: Option<usize>,
}

impl LeaderboardEntry {
    pub fn from_solve(player_name: &str, solve: &SolveRecord) -> Self {
        Self {
            player_name: player_name.to_string(),
            case_id: solve.case_id.clone(),
            title: solve.title.clone(),
            difficulty: solve.difficulty,
            score: solve.score(),
            time_secs: solve.time_secs,
            hints_used: solve.hints_used,
            stars: solve.stars(),
            daily: solve.daily,
            timestamp: solve.timestamp,
            rank: None,
        }
    }

    /// Higher score first, then the faster solve
    fn outranks(&self, other: &Self) -> bool {
        (self.score, std::cmp::Reverse(self.time_secs))
            > (other.score, std::cmp::Reverse(other.time_secs))
    }
}

/// A player's totals across the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub rank: usize,
    pub player_name: String,
    pub total_score: u64,
    /// Distinct cases solved
    pub cases_solved: usize,
}

/// Result type for leaderboard operations
pub type LeaderboardResult<T> = Result<T, LeaderboardError>;

/// Errors that can occur during leaderboard operations
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),
}

/// Trait for leaderboard backends
pub trait LeaderboardBackend: Send + Sync {
    /// Submit a solved case to the leaderboard
    fn submit_score(&self, entry: LeaderboardEntry) -> LeaderboardResult<()>;

    /// Get top scores, optionally filtered by difficulty
    fn get_leaderboard(
        &self,
        difficulty: Option<Difficulty>,
        limit: usize,
        offset: usize,
    ) -> LeaderboardResult<Vec<LeaderboardEntry>>;

    /// Every entry in rank order
    fn all_entries(&self) -> LeaderboardResult<Vec<LeaderboardEntry>>;

    /// Check if backend is available
    fn is_available(&self) -> bool;

    /// Get backend name for display
    fn backend_name(&self) -> &'static str;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn insert_ranked(entries: &mut Vec<LeaderboardEntry>, entry: LeaderboardEntry) {
    let pos = entries
        .iter()
        .position(|e| entry.outranks(e))
        .unwrap_or(entries.len());
    entries.insert(pos, entry);
    entries.truncate(MAX_ENTRIES);
}

fn page(
    entries: &[LeaderboardEntry],
    difficulty: Option<Difficulty>,
    limit: usize,
    offset: usize,
) -> Vec<LeaderboardEntry> {
    entries
        .iter()
        .filter(|e| difficulty.map_or(true, |d| e.difficulty == d))
        .skip(offset)
        .take(limit)
        .cloned()
        .enumerate()
        .map(|(i, mut e)| {
            e.rank = Some(offset + i + 1);
            e
        })
        .collect()
}

// ==================== Local File Backend ====================

/// File-based leaderboard in the data directory
pub struct LocalLeaderboard {
    storage: Storage,
    path: PathBuf,
    cache: Mutex<Option<LocalLeaderboardData>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LocalLeaderboardData {
    entries: Vec<LeaderboardEntry>,
}

impl LocalLeaderboard {
    pub fn new(storage: Storage) -> Self {
        let path = storage
            .path(LEADERBOARD_FILE)
            .unwrap_or_else(|| PathBuf::from(LEADERBOARD_FILE));
        Self {
            storage,
            path,
            cache: Mutex::new(None),
        }
    }

    fn load(&self) -> LocalLeaderboardData {
        let mut cache = lock(&self.cache);
        if let Some(ref data) = *cache {
            return data.clone();
        }

        let data: LocalLeaderboardData = self.storage.load(LEADERBOARD_FILE);
        *cache = Some(data.clone());
        data
    }

    fn save(&self, data: &LocalLeaderboardData) -> LeaderboardResult<()> {
        self.storage.save(LEADERBOARD_FILE, data)?;
        *lock(&self.cache) = Some(data.clone());
        Ok(())
    }
}

impl std::fmt::Debug for LocalLeaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalLeaderboard")
            .field("path", &self.path)
            .finish()
    }
}

impl LeaderboardBackend for LocalLeaderboard {
    fn submit_score(&self, entry: LeaderboardEntry) -> LeaderboardResult<()> {
        let mut data = self.load();
        insert_ranked(&mut data.entries, entry);
        self.save(&data)
    }

    fn get_leaderboard(
        &self,
        difficulty: Option<Difficulty>,
        limit: usize,
        offset: usize,
    ) -> LeaderboardResult<Vec<LeaderboardEntry>> {
        Ok(page(&self.load().entries, difficulty, limit, offset))
    }

    fn all_entries(&self) -> LeaderboardResult<Vec<LeaderboardEntry>> {
        Ok(self.load().entries)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "Local"
    }
}

// ==================== Mock Backend for Testing ====================

/// In-memory mock leaderboard for testing
pub struct MockLeaderboard {
    data: Mutex<Vec<LeaderboardEntry>>,
    available: Mutex<bool>,
}

impl MockLeaderboard {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(Vec::new()),
            available: Mutex::new(true),
        }
    }

    /// Set whether the backend should report as available
    #[cfg(test)]
    pub fn set_available(&self, available: bool) {
        *lock(&self.available) = available;
    }

    /// Get entry count
    #[cfg(test)]
    pub fn count(&self) -> usize {
        lock(&self.data).len()
    }

    fn check_available(&self) -> LeaderboardResult<()> {
        if *lock(&self.available) {
            Ok(())
        } else {
            Err(LeaderboardError::Unavailable("mock offline".into()))
        }
    }
}

impl Default for MockLeaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardBackend for MockLeaderboard {
    fn submit_score(&self, entry: LeaderboardEntry) -> LeaderboardResult<()> {
        self.check_available()?;
        insert_ranked(&mut lock(&self.data), entry);
        Ok(())
    }

    fn get_leaderboard(
        &self,
        difficulty: Option<Difficulty>,
        limit: usize,
        offset: usize,
    ) -> LeaderboardResult<Vec<LeaderboardEntry>> {
        self.check_available()?;
        Ok(page(&lock(&self.data), difficulty, limit, offset))
    }

    fn all_entries(&self) -> LeaderboardResult<Vec<LeaderboardEntry>> {
        self.check_available()?;
        Ok(lock(&self.data).clone())
    }

    fn is_available(&self) -> bool {
        *lock(&self.available)
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

// ==================== Backend Factory ====================

/// File backend for persistent storage, in-memory otherwise
pub fn create_backend(storage: &Storage) -> Arc<dyn LeaderboardBackend> {
    if storage.is_persistent() {
        Arc::new(LocalLeaderboard::new(storage.clone()))
    } else {
        Arc::new(MockLeaderboard::new())
    }
}

// ==================== Leaderboard Manager ====================

/// High-level leaderboard access with a short-lived listing cache
pub struct LeaderboardManager {
    backend: Arc<dyn LeaderboardBackend>,
    cache: Mutex<LeaderboardCache>,
}

impl std::fmt::Debug for LeaderboardManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderboardManager")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

#[derive(Debug)]
struct LeaderboardCache {
    /// Listing, the limit it was fetched with, and when
    entries: HashMap<Option<Difficulty>, (Vec<LeaderboardEntry>, usize, Instant)>,
    ttl: Duration,
}

impl LeaderboardCache {
    fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    fn get(&self, difficulty: Option<Difficulty>, limit: usize) -> Option<&Vec<LeaderboardEntry>> {
        self.entries
            .get(&difficulty)
            .filter(|(_, fetched, stored)| *fetched >= limit && stored.elapsed() < self.ttl)
            .map(|(entries, _, _)| entries)
    }

    fn set(&mut self, difficulty: Option<Difficulty>, limit: usize, entries: Vec<LeaderboardEntry>) {
        self.entries
            .insert(difficulty, (entries, limit, Instant::now()));
    }

    fn invalidate(&mut self) {
        self.entries.clear();
    }
}

impl LeaderboardManager {
    pub fn new(backend: Arc<dyn LeaderboardBackend>) -> Self {
        Self {
            backend,
            cache: Mutex::new(LeaderboardCache::new(Duration::from_secs(60))),
        }
    }

    pub fn for_storage(storage: &Storage) -> Self {
        Self::new(create_backend(storage))
    }

    /// Submit a solve under a player's name
    pub fn submit(&self, player_name: &str, solve: &SolveRecord) -> LeaderboardResult<()> {
        let result = self
            .backend
            .submit_score(LeaderboardEntry::from_solve(player_name, solve));
        lock(&self.cache).invalidate();
        result
    }

    /// Top entries, optionally for one difficulty
    pub fn top(
        &self,
        difficulty: Option<Difficulty>,
        limit: usize,
    ) -> LeaderboardResult<Vec<LeaderboardEntry>> {
        {
            let cache = lock(&self.cache);
            if let Some(cached) = cache.get(difficulty, limit) {
                return Ok(cached.iter().take(limit).cloned().collect());
            }
        }

        let entries = self.backend.get_leaderboard(difficulty, limit, 0)?;
        lock(&self.cache).set(difficulty, limit, entries.clone());
        Ok(entries)
    }

    /// Per-player totals: the best score for each distinct case, summed
    pub fn standings(&self) -> LeaderboardResult<Vec<Standing>> {
        let mut best: HashMap<(String, String), u64> = HashMap::new();
        for entry in self.backend.all_entries()? {
            let slot = best
                .entry((entry.player_name, entry.case_id))
                .or_insert(0);
            *slot = (*slot).max(entry.score);
        }

        let mut totals: HashMap<String, (u64, usize)> = HashMap::new();
        for ((player, _), score) in best {
            let total = totals.entry(player).or_insert((0, 0));
            total.0 += score;
            total.1 += 1;
        }

        let mut standings: Vec<Standing> = totals
            .into_iter()
            .map(|(player_name, (total_score, cases_solved))| Standing {
                rank: 0,
                player_name,
                total_score,
                cases_solved,
            })
            .collect();
        standings.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then_with(|| b.cases_solved.cmp(&a.cases_solved))
                .then_with(|| a.player_name.cmp(&b.player_name))
        });
        for (i, standing) in standings.iter_mut().enumerate() {
            standing.rank = i + 1;
        }
        Ok(standings)
    }

    /// A player's position in the standings
    pub fn player_rank(&self, player_name: &str) -> Option<usize> {
        match self.standings() {
            Ok(standings) => standings
                .iter()
                .find(|s| s.player_name == player_name)
                .map(|s| s.rank),
            Err(e) => {
                warn!(error = %e, "failed to read standings");
                None
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }
}
