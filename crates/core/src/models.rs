//! Canonical record model shared by the Steam and Notion adapters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single achievement within a game's achievement set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub api_name: String,
    pub achieved: bool,
    /// Only meaningful while `achieved` is true; Steam sends 0 otherwise.
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Source-side game record, normalized from the Steam payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub appid: String,
    /// Possibly empty until the achievements endpoint supplies `gameName`.
    pub name: String,
    pub playtime_forever: u32,
    pub playtime_windows_forever: u32,
    pub playtime_mac_forever: u32,
    pub playtime_linux_forever: u32,
    pub playtime_2weeks: u32,
    /// Truncated to minute precision so re-fetches compare stably.
    pub last_played: DateTime<Utc>,
    /// Order preserved for display; irrelevant to reconciliation.
    pub achievements: Vec<Achievement>,
    pub icon_url: String,
    pub cover_url: String,
}

impl Game {
    pub fn completed_count(&self) -> u32 {
        self.achievements.iter().filter(|a| a.achieved).count() as u32
    }

    pub fn total_count(&self) -> u32 {
        self.achievements.len() as u32
    }

    /// Vacuously true for games without achievements.
    pub fn is_perfect(&self) -> bool {
        self.achievements.iter().all(|a| a.achieved)
    }

    pub fn status_text(&self) -> String {
        let completed = self.completed_count();
        let total = self.total_count();
        if total == 0 {
            return format!("{}: No Achievements", self.name);
        }
        format!(
            "{}: {}/{} ({:.2}%)",
            self.name,
            completed,
            total,
            completed as f64 / total as f64 * 100.0
        )
    }

    /// A game only earns a new destination row once it has a name and at
    /// least one real unlock. An existing row may still be updated.
    pub fn is_valid(&self) -> bool {
        self.completed_count() > 0 && !self.name.is_empty()
    }
}

/// Destination-side record, mirroring the Notion page for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Store-assigned page id; the update boundary is keyed by it.
    pub row_id: String,
    /// Same identity space as `Game::appid`; the reconciliation key.
    pub game_id: String,
    pub name: String,
    pub last_played: DateTime<Utc>,
    pub completed_count: u32,
    pub total_count: u32,
    pub is_perfect: bool,
    /// Sticky: raised once when a perfect game's achievement catalog grows,
    /// never lowered by the reconciler.
    pub was_perfect: bool,
    pub playtime_minutes: u32,
    pub icon_url: String,
    pub cover_url: String,
    /// Store-assigned, read-only.
    pub last_edited_at: DateTime<Utc>,
}
