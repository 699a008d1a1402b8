//! The boundary to whatever actually runs battles.
//!
//! The tower never simulates a battle. It hands two rosters to a host and
//! later hears back who won.

use crate::teams::Team;
use schema::PlayerId;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct BattleSide {
    pub player: PlayerId,
    pub team: Team,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattleRequest {
    pub sides: [BattleSide; 2],
    pub format: String,
    pub title: String,
    pub rated: bool,
}

impl BattleRequest {
    pub fn participants(&self) -> Vec<PlayerId> {
        self.sides.iter().map(|side| side.player.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleHandle {
    pub battle_id: String,
    pub title: String,
}

pub trait BattleHost {
    /// Create a battle room. `None` means the host refused.
    fn create_battle(&mut self, request: BattleRequest) -> Option<BattleHandle>;
}

/// An in-process host that just remembers the battles it was asked to run.
/// Results are reported back by whoever drives it.
#[derive(Debug)]
pub struct LocalBattleHost {
    online: bool,
    next_id: u64,
    battles: BTreeMap<String, BattleRequest>,
}

impl Default for LocalBattleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBattleHost {
    pub fn new() -> Self {
        Self {
            online: true,
            next_id: 1,
            battles: BTreeMap::new(),
        }
    }

    /// An offline host refuses every request.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn battle(&self, battle_id: &str) -> Option<&BattleRequest> {
        self.battles.get(battle_id)
    }

    pub fn battles(&self) -> impl Iterator<Item = (&String, &BattleRequest)> {
        self.battles.iter()
    }

    /// Forget a battle once its result has been reported.
    pub fn finish(&mut self, battle_id: &str) -> Option<BattleRequest> {
        self.battles.remove(battle_id)
    }
}

impl BattleHost for LocalBattleHost {
    fn create_battle(&mut self, request: BattleRequest) -> Option<BattleHandle> {
        if !self.online {
            return None;
        }
        let battle_id = format!("battletower-{}", self.next_id);
        self.next_id += 1;
        let handle = BattleHandle {
            battle_id: battle_id.clone(),
            title: request.title.clone(),
        };
        debug!(battle = %battle_id, title = %request.title, "local host created battle");
        self.battles.insert(battle_id, request);
        Some(handle)
    }
}
