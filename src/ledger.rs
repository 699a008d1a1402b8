//! Cumulative win-streak records.

use schema::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub current: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub player: PlayerId,
    pub record: StreakRecord,
}

/// The on-disk shape of the ledger: two ordered `(identity, value)` lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub win_streaks: Vec<(String, u32)>,
    #[serde(default)]
    pub max_win_streaks: Vec<(String, u32)>,
}

/// Streak records in first-win order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreakLedger {
    order: Vec<PlayerId>,
    records: HashMap<PlayerId, StreakRecord>,
}

impl StreakLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The player's record, zeroed if they have never won.
    pub fn record(&self, player: &PlayerId) -> StreakRecord {
        self.records.get(player).copied().unwrap_or_default()
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.records.contains_key(player)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Count a win, creating the record on a first win.
    pub fn record_win(&mut self, player: &PlayerId) -> StreakRecord {
        let record = self.entry(player);
        record.current = record.current.saturating_add(1);
        if record.current > record.max {
            record.max = record.current;
        }
        *record
    }

    /// Reset the current streak. Players without a record are left without one.
    pub fn record_loss(&mut self, player: &PlayerId) -> StreakRecord {
        match self.records.get_mut(player) {
            Some(record) => {
                record.current = 0;
                *record
            }
            None => StreakRecord::default(),
        }
    }

    /// Top `limit` records by max streak, then current streak. Ties keep
    /// first-win order.
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .iter()
            .map(|(player, record)| LeaderboardEntry {
                player: player.clone(),
                record,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.record
                .max
                .cmp(&a.record.max)
                .then(b.record.current.cmp(&a.record.current))
        });
        entries.truncate(limit);
        entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, StreakRecord)> + '_ {
        self.order
            .iter()
            .map(move |player| (player, self.record(player)))
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            win_streaks: self
                .iter()
                .map(|(player, record)| (player.to_string(), record.current))
                .collect(),
            max_win_streaks: self
                .iter()
                .map(|(player, record)| (player.to_string(), record.max))
                .collect(),
        }
    }

    /// Rebuild a ledger from a snapshot. Order follows the max-streak list,
    /// then any players that only appear in the current-streak list. A max
    /// below the current streak is raised to match.
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Self {
        let mut ledger = Self::new();
        for (name, max) in &snapshot.max_win_streaks {
            ledger.entry(&PlayerId::new(name)).max = *max;
        }
        for (name, current) in &snapshot.win_streaks {
            let player = PlayerId::new(name);
            let record = ledger.entry(&player);
            record.current = *current;
            if record.max < record.current {
                debug!(player = %player, current = record.current, max = record.max, "raising stored max streak");
                record.max = record.current;
            }
        }
        ledger
    }

    fn entry(&mut self, player: &PlayerId) -> &mut StreakRecord {
        if !self.records.contains_key(player) {
            self.order.push(player.clone());
        }
        self.records.entry(player.clone()).or_default()
    }
}
