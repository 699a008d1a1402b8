// In: src/lib.rs

//! Battle Tower Progression Engine
//!
//! Tracks single-player ladder runs: builds and grows each player's team from
//! a rental pool, scales an opponent team to the player's win streak, and
//! settles streaks when the external battle host reports a result. Cumulative
//! streaks are persisted; teams and run state live only as long as the process.

// --- MODULE DECLARATIONS ---
pub mod config;
pub mod errors;
pub mod host;
pub mod ledger;
pub mod logging;
pub mod persistence;
pub mod pools;
pub mod progression;
pub mod session;
pub mod teams;
pub mod tower;
pub mod tower_interface;

#[cfg(test)]
mod tests;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{to_id, PlayerId, RentalTeam, RosterEntity, StatName, StatSpread};

// --- From this crate's modules (`src/`) ---

// The tower service and its results.
pub use tower::{BattleOutcome, BattleTower, RunResult, StartedRun};

// Building blocks, usable on their own.
pub use config::TowerConfig;
pub use host::{BattleHandle, BattleHost, BattleRequest, BattleSide, LocalBattleHost};
pub use ledger::{LeaderboardEntry, LedgerSnapshot, StreakLedger, StreakRecord};
pub use persistence::LedgerStore;
pub use pools::{load_pool, load_pools, Pool, PoolKind, PoolRegistry, PoolSnapshot};
pub use progression::{required_team_size, GrowthPolicy, TeamOrigin, TeamResolution};
pub use session::{PlayerRun, RunState, SessionTracker};
pub use teams::{generate_team, grow_team, Team};

// Crate-specific error and result types.
pub use errors::{
    ConfigError, PersistenceError, PersistenceResult, PoolLoadError, PoolLoadResult,
    SessionError, TowerError, TowerResult,
};
