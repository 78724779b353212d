//! Remote leaderboard boundary
//!
//! The game never talks to a score backend directly. Game over queues a
//! [`ScoreSubmission`]; the host hands it to a [`Leaderboard`] outside the
//! frame loop and feeds the [`SubmitOutcome`] back into the session.
//! Backend failures are logged and turned into safe defaults.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Username length bounds after sanitization
pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 12;

/// Default number of rows in a leaderboard table
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    /// Username empty or shorter than the minimum after sanitization
    InvalidUsername,
    /// Backend unreachable or failing
    Unavailable(String),
    /// Backend refused the record
    Rejected(String),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::InvalidUsername => write!(
                f,
                "Username must be {}-{} characters",
                USERNAME_MIN, USERNAME_MAX
            ),
            LeaderboardError::Unavailable(reason) => {
                write!(f, "Leaderboard unavailable: {}", reason)
            }
            LeaderboardError::Rejected(reason) => write!(f, "Score rejected: {}", reason),
        }
    }
}

impl std::error::Error for LeaderboardError {}

/// Normalize a username: trim, keep the first 12 characters, drop anything
/// outside `[A-Za-z0-9_]`, uppercase.
pub fn sanitize_username(raw: &str) -> Result<String, LeaderboardError> {
    let clean: String = raw
        .trim()
        .chars()
        .take(USERNAME_MAX)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if clean.len() < USERNAME_MIN {
        return Err(LeaderboardError::InvalidUsername);
    }
    Ok(clean)
}

/// One stored score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub username: String,
    pub score: u64,
    pub level: u32,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

/// A finished run waiting to be sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    /// Session run that produced the score
    pub generation: u64,
    pub username: String,
    pub score: u64,
    pub level: u32,
    pub timestamp_ms: f64,
}

/// Result of a submission as seen by the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub success: bool,
    pub rank: Option<usize>,
    pub is_personal_best: Option<bool>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl SubmitOutcome {
    pub fn ranked(rank: usize, is_personal_best: bool) -> Self {
        let message = if is_personal_best {
            "New personal best!"
        } else {
            "Score recorded"
        };
        Self {
            success: true,
            rank: Some(rank),
            is_personal_best: Some(is_personal_best),
            error: None,
            message: Some(message.to_string()),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            rank: None,
            is_personal_best: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

/// Best score of one player and its global rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBest {
    pub best: ScoreRecord,
    pub rank: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardStats {
    pub total_games: usize,
    pub total_players: usize,
    pub highest_score: u64,
    /// Rounded to the nearest point
    pub average_score: u64,
}

/// Storage backend for scores
pub trait ScoreService {
    fn insert(&mut self, record: ScoreRecord) -> Result<(), LeaderboardError>;

    /// Highest scores first
    fn top(&self, limit: usize) -> Result<Vec<ScoreRecord>, LeaderboardError>;

    fn best_for(&self, username: &str) -> Result<Option<ScoreRecord>, LeaderboardError>;

    /// Number of records with a strictly higher score
    fn count_above(&self, score: u64) -> Result<usize, LeaderboardError>;

    fn all(&self) -> Result<Vec<ScoreRecord>, LeaderboardError>;
}

/// Append-only in-process backend
#[derive(Debug, Clone)]
pub struct InMemoryLeaderboard {
    records: Vec<ScoreRecord>,
    available: bool,
}

impl Default for InMemoryLeaderboard {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            available: true,
        }
    }
}

impl InMemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage; every call fails while unavailable
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check(&self) -> Result<(), LeaderboardError> {
        if self.available {
            Ok(())
        } else {
            Err(LeaderboardError::Unavailable("service offline".to_string()))
        }
    }
}

impl ScoreService for InMemoryLeaderboard {
    fn insert(&mut self, record: ScoreRecord) -> Result<(), LeaderboardError> {
        self.check()?;
        self.records.push(record);
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        self.check()?;
        let mut sorted = self.records.clone();
        // Stable: equal scores keep insertion order
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted.truncate(limit);
        Ok(sorted)
    }

    fn best_for(&self, username: &str) -> Result<Option<ScoreRecord>, LeaderboardError> {
        self.check()?;
        Ok(self
            .records
            .iter()
            .filter(|r| r.username == username)
            .fold(None, |best: Option<&ScoreRecord>, r| match best {
                Some(b) if b.score >= r.score => Some(b),
                _ => Some(r),
            })
            .cloned())
    }

    fn count_above(&self, score: u64) -> Result<usize, LeaderboardError> {
        self.check()?;
        Ok(self.records.iter().filter(|r| r.score > score).count())
    }

    fn all(&self) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        self.check()?;
        Ok(self.records.clone())
    }
}

/// Game-facing adapter over a [`ScoreService`]
#[derive(Debug, Clone)]
pub struct Leaderboard<S> {
    service: S,
}

impl<S: ScoreService> Leaderboard<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    /// Record a score and report its rank. Never fails; problems come back
    /// as an unsuccessful outcome.
    pub fn submit_score(
        &mut self,
        username: &str,
        score: u64,
        level: u32,
        timestamp_ms: u64,
    ) -> SubmitOutcome {
        let username = match sanitize_username(username) {
            Ok(name) => name,
            Err(e) => return SubmitOutcome::failed(e.to_string()),
        };
        match self.try_submit(username, score, level, timestamp_ms) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Error submitting score: {}", e);
                SubmitOutcome::failed("Failed to submit score")
            }
        }
    }

    /// Send a queued submission from the session
    pub fn submit(&mut self, submission: &ScoreSubmission) -> SubmitOutcome {
        self.submit_score(
            &submission.username,
            submission.score,
            submission.level,
            submission.timestamp_ms.max(0.0) as u64,
        )
    }

    fn try_submit(
        &mut self,
        username: String,
        score: u64,
        level: u32,
        timestamp_ms: u64,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        if level == 0 {
            return Err(LeaderboardError::Rejected("level must be at least 1".to_string()));
        }
        let previous = self.service.best_for(&username)?;
        self.service.insert(ScoreRecord {
            username: username.clone(),
            score,
            level,
            timestamp_ms,
        })?;
        let rank = self.service.count_above(score)? + 1;
        let is_personal_best = previous.is_none_or(|best| score > best.score);
        log::info!(
            "{} scored {} (rank {}{})",
            username,
            score,
            rank,
            if is_personal_best { ", personal best" } else { "" }
        );
        Ok(SubmitOutcome::ranked(rank, is_personal_best))
    }

    /// Top scores, or an empty table if the backend fails
    pub fn fetch_leaderboard(&self, limit: usize) -> Vec<ScoreRecord> {
        self.service.top(limit).unwrap_or_else(|e| {
            log::warn!("Error fetching leaderboard: {}", e);
            Vec::new()
        })
    }

    /// A player's best score and its rank, if they have one
    pub fn fetch_user_best(&self, username: &str) -> Option<UserBest> {
        let username = sanitize_username(username).ok()?;
        let lookup = || -> Result<Option<UserBest>, LeaderboardError> {
            let Some(best) = self.service.best_for(&username)? else {
                return Ok(None);
            };
            let rank = self.service.count_above(best.score)? + 1;
            Ok(Some(UserBest { best, rank }))
        };
        lookup().unwrap_or_else(|e| {
            log::warn!("Error fetching user score: {}", e);
            None
        })
    }

    /// Aggregate numbers over every recorded game
    pub fn fetch_stats(&self) -> Option<LeaderboardStats> {
        let records = match self.service.all() {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Error fetching stats: {}", e);
                return None;
            }
        };
        if records.is_empty() {
            return Some(LeaderboardStats::default());
        }
        let players: HashSet<&str> = records.iter().map(|r| r.username.as_str()).collect();
        let total: u64 = records.iter().map(|r| r.score).sum();
        Some(LeaderboardStats {
            total_games: records.len(),
            total_players: players.len(),
            highest_score: records.iter().map(|r| r.score).max().unwrap_or(0),
            average_score: (total as f64 / records.len() as f64).round() as u64,
        })
    }

    pub fn check_health(&self) -> bool {
        self.service.top(1).is_ok()
    }
}
