//! The Battle Tower service.
//!
//! One `BattleTower` owns every piece of tower state: pools, the streak
//! ledger, the per-player session tracker, and the ledger store. It is built
//! once at startup and driven one command or battle event at a time.

use crate::config::TowerConfig;
use crate::errors::{TowerError, TowerResult};
use crate::host::{BattleHandle, BattleHost, BattleRequest, BattleSide};
use crate::ledger::{LeaderboardEntry, StreakLedger, StreakRecord};
use crate::persistence::LedgerStore;
use crate::pools::PoolRegistry;
use crate::progression::{GrowthPolicy, TeamOrigin};
use crate::session::{RunState, SessionTracker};
use crate::teams::Team;
use rand::Rng;
use schema::{PlayerId, RentalTeam, RosterEntity};
use tracing::{debug, info, warn};

/// A battle the tower just handed to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct StartedRun {
    pub handle: BattleHandle,
    pub team: Team,
    pub opponent: Team,
    pub origin: TeamOrigin,
    pub streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    Won,
    Lost,
}

/// What a finished battle did to the player's run.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleOutcome {
    pub battle_id: String,
    pub player: PlayerId,
    pub result: RunResult,
    pub record: StreakRecord,
    /// Team size the player's next battle calls for.
    pub next_team_size: usize,
}

#[derive(Debug)]
pub struct BattleTower {
    config: TowerConfig,
    policy: GrowthPolicy,
    bot_id: PlayerId,
    pools: PoolRegistry,
    ledger: StreakLedger,
    sessions: SessionTracker,
    store: LedgerStore,
}

impl BattleTower {
    /// Load pools and the ledger from the locations named by `config`.
    pub fn open(config: TowerConfig) -> Self {
        let pools = PoolRegistry::load(config.rental_teams_path(), config.bot_teams_path());
        let store = LedgerStore::new(config.ledger_path());
        Self::new(config, pools, store)
    }

    /// Assemble a tower from already-built parts. The ledger is read from `store`.
    pub fn new(config: TowerConfig, pools: PoolRegistry, store: LedgerStore) -> Self {
        let ledger = store.load();
        Self {
            policy: GrowthPolicy::new(config.max_team_size, config.growth_interval),
            bot_id: PlayerId::new(&config.bot_id),
            config,
            pools,
            ledger,
            sessions: SessionTracker::new(),
            store,
        }
    }

    pub fn config(&self) -> &TowerConfig {
        &self.config
    }

    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    pub fn bot_id(&self) -> &PlayerId {
        &self.bot_id
    }

    /// Start (or continue) a run for `player` with a fresh random source.
    pub fn start_run<H: BattleHost + ?Sized>(
        &mut self,
        player: &PlayerId,
        host: &mut H,
    ) -> TowerResult<StartedRun> {
        self.start_run_with_rng(player, host, &mut rand::rng())
    }

    /// Start (or continue) a run for `player`.
    ///
    /// The in-battle guard is set only after both teams are resolved and the
    /// host has created the battle. Any earlier failure leaves the player out
    /// of battle; a team resolved before the failure stays cached.
    pub fn start_run_with_rng<H: BattleHost + ?Sized, R: Rng + ?Sized>(
        &mut self,
        player: &PlayerId,
        host: &mut H,
        rng: &mut R,
    ) -> TowerResult<StartedRun> {
        if self.sessions.is_in_battle(player) {
            return Err(TowerError::AlreadyActive(player.clone()));
        }

        let streak = self.ledger.record(player).current;
        let pools = self.pools.snapshot();

        let resolution = self.policy.resolve_team(
            self.sessions.team(player),
            streak,
            pools.rental.aggregate(),
            rng,
        )?;
        if resolution.origin == TeamOrigin::Exhausted {
            warn!(player = %player, streak, size = resolution.team.len(), "no new species left to grow team");
        }
        self.sessions.ready_team(player, resolution.team.clone())?;

        let opponent = self
            .policy
            .opponent_team(streak, pools.opponent.aggregate(), rng)?;

        let request = BattleRequest {
            sides: [
                BattleSide {
                    player: player.clone(),
                    team: resolution.team.clone(),
                },
                BattleSide {
                    player: self.bot_id.clone(),
                    team: opponent.clone(),
                },
            ],
            format: self.config.format.clone(),
            title: format!("Battle Tower: {} vs. {}", player, self.bot_id),
            rated: false,
        };
        let handle = host
            .create_battle(request)
            .ok_or(TowerError::BattleCreationFailed)?;
        self.sessions.enter_battle(player, &handle.battle_id)?;

        info!(
            player = %player,
            battle = %handle.battle_id,
            streak,
            team_size = resolution.team.len(),
            opponent_size = opponent.len(),
            origin = ?resolution.origin,
            "battle tower match started"
        );
        Ok(StartedRun {
            handle,
            team: resolution.team,
            opponent,
            origin: resolution.origin,
            streak,
        })
    }

    /// React to the host reporting that `battle_id` ended.
    ///
    /// Signals for battles the tower is not tracking are ignored. A win for
    /// the tracked player extends their streak and ends the run of every
    /// other human participant; anything else (loss, draw, abnormal end) ends
    /// the tracked player's run. The ledger is saved before returning.
    pub fn on_battle_end(
        &mut self,
        battle_id: &str,
        winner: Option<&PlayerId>,
        participants: &[PlayerId],
    ) -> Option<BattleOutcome> {
        let Some(player) = self.sessions.player_in_battle(battle_id).cloned() else {
            debug!(battle = %battle_id, "ignoring end of untracked battle");
            return None;
        };
        if !participants.is_empty() && !participants.contains(&player) {
            warn!(battle = %battle_id, player = %player, "battle end does not name the tracked player, ignoring");
            return None;
        }

        let bot_id = self.bot_id.clone();
        let (result, record) = if winner == Some(&player) {
            let record = self.ledger.record_win(&player);
            for other in participants.iter().filter(|p| **p != player && **p != bot_id) {
                self.ledger.record_loss(other);
                self.sessions.clear_run(other);
            }
            (RunResult::Won, record)
        } else {
            self.sessions.clear_run(&player);
            (RunResult::Lost, self.ledger.record_loss(&player))
        };

        if let Err(err) = self.sessions.leave_battle(&player, battle_id) {
            warn!(battle = %battle_id, error = %err, "battle guard already released");
        }
        self.save();

        info!(
            player = %player,
            battle = %battle_id,
            result = ?result,
            current = record.current,
            max = record.max,
            "battle tower match resolved"
        );
        Some(BattleOutcome {
            battle_id: battle_id.to_string(),
            player,
            result,
            record,
            next_team_size: self.policy.required_size(record.current),
        })
    }

    /// Persist the ledger. Failures are logged; memory stays authoritative.
    pub fn save(&self) -> bool {
        self.store.save(&self.ledger)
    }

    /// Re-read the definition sources and swap the pools in one step.
    pub fn reload_pools(&self) {
        self.pools.reload();
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    pub fn run_state(&self, player: &PlayerId) -> &RunState {
        self.sessions.state(player)
    }

    pub fn current_team(&self, player: &PlayerId) -> Option<&[RosterEntity]> {
        self.sessions.team(player)
    }

    /// The team cached for the player's run, if they have one.
    pub fn active_team(&self, player: &PlayerId) -> TowerResult<&[RosterEntity]> {
        self.current_team(player)
            .ok_or_else(|| TowerError::NoActiveTeam(player.clone()))
    }

    /// Looks up a rental team by id; `team_id` is normalized first.
    pub fn rental_team(&self, team_id: &str) -> TowerResult<RentalTeam> {
        self.pools
            .snapshot()
            .rental
            .team(team_id)
            .cloned()
            .ok_or_else(|| TowerError::UnknownTeam(team_id.to_string()))
    }

    pub fn rental_teams(&self) -> Vec<RentalTeam> {
        self.pools.snapshot().rental.teams().to_vec()
    }

    pub fn streak(&self, player: &PlayerId) -> StreakRecord {
        self.ledger.record(player)
    }

    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.ledger.leaderboard(limit)
    }

    pub fn ledger(&self) -> &StreakLedger {
        &self.ledger
    }
}
