use crate::pools::PoolKind;
use schema::PlayerId;
use std::path::PathBuf;
use thiserror::Error;

/// Rejections surfaced to whoever asked the tower to do something.
#[derive(Debug, Error)]
pub enum TowerError {
    /// The pool needed for sampling has no members
    #[error("The {0} Pokémon pool is unavailable right now. Try again later or contact a staff member.")]
    PoolUnavailable(PoolKind),
    /// The player already has an unresolved tower battle
    #[error("{0} is already in a Battle Tower battle.")]
    AlreadyActive(PlayerId),
    /// The battle host refused to create the room
    #[error("Failed to create the battle room.")]
    BattleCreationFailed,
    /// Every species in the rental pool is already on the team
    #[error("No new Pokémon are available to add to the team.")]
    GrowthExhausted,
    #[error("Team '{0}' not found.")]
    UnknownTeam(String),
    #[error("{0} does not have an active Battle Tower team.")]
    NoActiveTeam(PlayerId),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Illegal transitions of the per-player run state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0} is already in battle")]
    AlreadyInBattle(PlayerId),
    #[error("{0} has no resolved team to battle with")]
    NotReady(PlayerId),
    #[error("{player} is not in battle {battle_id}")]
    NotInBattle { player: PlayerId, battle_id: String },
}

/// Failures reading a team definition source.
#[derive(Debug, Error)]
pub enum PoolLoadError {
    #[error("definition source not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed definition source {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("unsupported definition source format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Failures reading or writing the streak ledger store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("ledger store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger store is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reading the tower configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Type alias for Results using TowerError
pub type TowerResult<T> = Result<T, TowerError>;

/// Type alias for Results using PoolLoadError
pub type PoolLoadResult<T> = Result<T, PoolLoadError>;

/// Type alias for Results using PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;
