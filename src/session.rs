//! Per-player run tracking.
//!
//! Each player moves through `Idle -> TeamReady -> InBattle -> Idle`. The
//! in-battle state is the only guard against concurrent runs. The tracker also
//! caches the team of a run in progress; the cache outlives individual battles
//! and is dropped only when the run ends.

use crate::errors::SessionError;
use crate::teams::Team;
use schema::{PlayerId, RosterEntity};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    TeamReady,
    InBattle {
        battle_id: String,
    },
}

/// The transient part of a run. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRun {
    pub team: Team,
}

#[derive(Debug, Default)]
pub struct SessionTracker {
    states: HashMap<PlayerId, RunState>,
    runs: HashMap<PlayerId, PlayerRun>,
}

static IDLE: RunState = RunState::Idle;

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, player: &PlayerId) -> &RunState {
        self.states.get(player).unwrap_or(&IDLE)
    }

    pub fn is_in_battle(&self, player: &PlayerId) -> bool {
        matches!(self.state(player), RunState::InBattle { .. })
    }

    pub fn team(&self, player: &PlayerId) -> Option<&[RosterEntity]> {
        self.runs.get(player).map(|run| run.team.as_slice())
    }

    /// Idle|TeamReady -> TeamReady, caching the resolved team.
    pub fn ready_team(&mut self, player: &PlayerId, team: Team) -> Result<(), SessionError> {
        if self.is_in_battle(player) {
            return Err(SessionError::AlreadyInBattle(player.clone()));
        }
        self.runs.insert(player.clone(), PlayerRun { team });
        self.states.insert(player.clone(), RunState::TeamReady);
        Ok(())
    }

    /// TeamReady -> InBattle. Call only once the host has created the battle.
    pub fn enter_battle(&mut self, player: &PlayerId, battle_id: &str) -> Result<(), SessionError> {
        match self.state(player) {
            RunState::TeamReady => {
                self.states.insert(
                    player.clone(),
                    RunState::InBattle {
                        battle_id: battle_id.to_string(),
                    },
                );
                Ok(())
            }
            RunState::InBattle { .. } => Err(SessionError::AlreadyInBattle(player.clone())),
            RunState::Idle => Err(SessionError::NotReady(player.clone())),
        }
    }

    /// InBattle(battle_id) -> Idle. The cached team is left alone.
    pub fn leave_battle(&mut self, player: &PlayerId, battle_id: &str) -> Result<(), SessionError> {
        let in_this_battle = matches!(
            self.state(player),
            RunState::InBattle { battle_id: current } if current == battle_id
        );
        if !in_this_battle {
            return Err(SessionError::NotInBattle {
                player: player.clone(),
                battle_id: battle_id.to_string(),
            });
        }
        self.states.remove(player);
        Ok(())
    }

    /// Drop the cached team of a finished run.
    pub fn clear_run(&mut self, player: &PlayerId) -> Option<PlayerRun> {
        if matches!(self.state(player), RunState::TeamReady) {
            self.states.remove(player);
        }
        self.runs.remove(player)
    }

    /// The player currently in `battle_id`, if any.
    pub fn player_in_battle(&self, battle_id: &str) -> Option<&PlayerId> {
        self.states.iter().find_map(|(player, state)| match state {
            RunState::InBattle { battle_id: current } if current == battle_id => Some(player),
            _ => None,
        })
    }

    pub fn active_battles(&self) -> usize {
        self.states
            .values()
            .filter(|state| matches!(state, RunState::InBattle { .. }))
            .count()
    }
}
