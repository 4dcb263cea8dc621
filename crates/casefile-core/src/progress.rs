//! Scoring of solved sessions and the player's accumulated progress.

use crate::case::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Bonus for solving the daily challenge
pub const DAILY_BONUS: u64 = 500;
/// Deducted per hint used
pub const HINT_PENALTY: u64 = 100;
/// Awarded for solving instantly; scales down to zero at the time limit
pub const MAX_TIME_BONUS: u64 = 250;
/// Floor for any solved case
pub const MIN_SCORE: u64 = 100;

/// Summary of one solved session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRecord {
    pub case_id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub time_secs: u64,
    pub hints_used: u32,
    pub max_hints: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u64>,
    #[serde(default)]
    pub daily: bool,
    /// Unix timestamp of the solve
    pub timestamp: u64,
}

impl SolveRecord {
    /// Whether the solve finished within the (advisory) time limit
    pub fn within_time_limit(&self) -> bool {
        self.time_limit_secs
            .map_or(true, |limit| self.time_secs <= limit)
    }

    fn time_bonus(&self) -> u64 {
        match self.time_limit_secs {
            Some(limit) if limit > 0 && self.time_secs < limit => {
                MAX_TIME_BONUS * (limit - self.time_secs) / limit
            }
            _ => 0,
        }
    }

    /// Points for this solve
    pub fn score(&self) -> u64 {
        let daily = if self.daily { DAILY_BONUS } else { 0 };
        let earned = self.difficulty.base_score() + self.time_bonus() + daily;
        let penalty = u64::from(self.hints_used) * HINT_PENALTY;
        earned.saturating_sub(penalty).max(MIN_SCORE)
    }

    /// Star rating from 1 to 3
    pub fn stars(&self) -> u8 {
        let mut stars = 3u8;
        if self.hints_used > 0 {
            stars -= 1;
        }
        if !self.within_time_limit() {
            stars -= 1;
        }
        stars.max(1)
    }
}

/// Totals across every solved case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerProgress {
    pub cases_completed: BTreeSet<String>,
    pub total_score: u64,
    pub hints_used_total: u64,
    /// Mean solve time in seconds
    pub average_time: f64,
    pub solves: u64,
}

impl PlayerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a solve into the totals
    pub fn record(&mut self, record: &SolveRecord) {
        self.cases_completed.insert(record.case_id.clone());
        self.total_score += record.score();
        self.hints_used_total += u64::from(record.hints_used);
        self.solves += 1;
        self.average_time += (record.time_secs as f64 - self.average_time) / self.solves as f64;
    }

    pub fn has_completed(&self, case_id: &str) -> bool {
        self.cases_completed.contains(case_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(difficulty: Difficulty, time_secs: u64, hints_used: u32) -> SolveRecord {
        SolveRecord {
            case_id: "diamond-heist".into(),
            title: "The Diamond Heist".into(),
            difficulty,
            time_secs,
            hints_used,
            max_hints: 3,
            time_limit_secs: Some(900),
            daily: false,
            timestamp: 0,
        }
    }

    #[test]
    fn test_score_time_bonus() {
        assert_eq!(record(Difficulty::Easy, 450, 0).score(), 625);
        assert_eq!(record(Difficulty::Easy, 0, 0).score(), 750);
        assert_eq!(record(Difficulty::Easy, 900, 0).score(), 500);
    }

    #[test]
    fn test_score_hint_penalty() {
        assert_eq!(record(Difficulty::Easy, 450, 1).score(), 525);
        assert_eq!(record(Difficulty::Hard, 900, 2).score(), 800);
    }

    #[test]
    fn test_score_overtime_and_floor() {
        assert_eq!(record(Difficulty::Easy, 1200, 0).score(), 500);
        assert_eq!(record(Difficulty::Easy, 1200, 5).score(), MIN_SCORE);
    }

    #[test]
    fn test_score_without_limit_and_daily() {
        let mut r = record(Difficulty::Medium, 3000, 0);
        r.time_limit_secs = None;
        assert_eq!(r.score(), 750);
        r.daily = true;
        assert_eq!(r.score(), 1250);
    }

    #[test]
    fn test_stars() {
        assert_eq!(record(Difficulty::Easy, 100, 0).stars(), 3);
        assert_eq!(record(Difficulty::Easy, 900, 0).stars(), 3);
        assert_eq!(record(Difficulty::Easy, 100, 1).stars(), 2);
        assert_eq!(record(Difficulty::Easy, 901, 0).stars(), 2);
        assert_eq!(record(Difficulty::Easy, 901, 3).stars(), 1);
    }

    #[test]
    fn test_progress_running_mean() {
        let mut progress = PlayerProgress::new();
        progress.record(&record(Difficulty::Easy, 100, 1));
        progress.record(&record(Difficulty::Easy, 300, 0));

        let mut other = record(Difficulty::Hard, 200, 2);
        other.case_id = "art-forgery".into();
        progress.record(&other);

        assert_eq!(progress.solves, 3);
        assert_eq!(progress.cases_completed.len(), 2);
        assert!(progress.has_completed("art-forgery"));
        assert_eq!(progress.hints_used_total, 3);
        assert!((progress.average_time - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_json_uses_camel_case() {
        let mut progress = PlayerProgress::new();
        progress.record(&record(Difficulty::Easy, 450, 0));
        let value = serde_json::to_value(&progress).unwrap();
        assert_eq!(value["casesCompleted"][0], "diamond-heist");
        assert_eq!(value["totalScore"], 625);
        assert_eq!(value["hintsUsedTotal"], 0);
    }
}
