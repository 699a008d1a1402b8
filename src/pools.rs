//! Rental and opponent pools.
//!
//! Each pool is built from a definition source: a list of named teams whose
//! members are flattened into the aggregate the team generator samples from.
//! The registry hands out immutable snapshots and swaps them whole on reload.

use crate::errors::{PoolLoadError, PoolLoadResult};
use schema::{to_id, RentalTeam, RosterEntity};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Rental,
    Opponent,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::Rental => write!(f, "rental"),
            PoolKind::Opponent => write!(f, "opponent"),
        }
    }
}

/// Named teams of one kind plus their flattened membership.
#[derive(Debug, Clone)]
pub struct Pool {
    kind: PoolKind,
    teams: Vec<RentalTeam>,
    members: Vec<RosterEntity>,
}

impl Pool {
    pub fn empty(kind: PoolKind) -> Self {
        Self {
            kind,
            teams: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Build a pool from teams in source order. A repeated team id replaces the
    /// earlier team in place, but both contribute members to the aggregate.
    pub fn from_teams(kind: PoolKind, teams: Vec<RentalTeam>) -> Self {
        let mut pool = Self::empty(kind);
        for team in teams {
            pool.members.extend(team.pokemons.iter().cloned());
            let id = team.normalized_id();
            match pool.teams.iter_mut().find(|t| t.normalized_id() == id) {
                Some(existing) => *existing = team,
                None => pool.teams.push(team),
            }
        }
        pool
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// The flattened membership used for sampling.
    pub fn aggregate(&self) -> &[RosterEntity] {
        &self.members
    }

    pub fn teams(&self) -> &[RentalTeam] {
        &self.teams
    }

    /// Look up a team by id; the query is normalized the same way team ids are.
    pub fn team(&self, id: &str) -> Option<&RentalTeam> {
        let id = to_id(id);
        self.teams.iter().find(|team| team.normalized_id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Read one definition source. `.json` and `.ron` are supported.
pub fn load_pool(kind: PoolKind, path: &Path) -> PoolLoadResult<Pool> {
    if !path.exists() {
        return Err(PoolLoadError::Missing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| PoolLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let malformed = |reason: String| PoolLoadError::Malformed {
        path: path.to_path_buf(),
        reason,
    };
    let teams: Vec<RentalTeam> = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| malformed(e.to_string()))?,
        Some("ron") => ron::from_str(&content).map_err(|e| malformed(e.to_string()))?,
        _ => return Err(PoolLoadError::UnsupportedFormat(path.to_path_buf())),
    };

    for team in &teams {
        if team.pokemons.is_empty() {
            return Err(malformed(format!("team '{}' has no members", team.id)));
        }
        if let Some(entity) = team.pokemons.iter().find(|p| p.moves.is_empty()) {
            return Err(malformed(format!(
                "{} in team '{}' has no moves",
                entity.species, team.id
            )));
        }
    }

    Ok(Pool::from_teams(kind, teams))
}

/// Load both pools. A source that fails to load leaves its pool empty.
pub fn load_pools(rental_source: &Path, opponent_source: &Path) -> (Pool, Pool) {
    (
        load_pool_or_empty(PoolKind::Rental, rental_source),
        load_pool_or_empty(PoolKind::Opponent, opponent_source),
    )
}

fn load_pool_or_empty(kind: PoolKind, path: &Path) -> Pool {
    match load_pool(kind, path) {
        Ok(pool) => {
            info!(
                pool = %kind,
                teams = pool.teams().len(),
                members = pool.aggregate().len(),
                "loaded pool"
            );
            pool
        }
        Err(err) => {
            warn!(pool = %kind, error = %err, "pool unavailable, continuing with an empty pool");
            Pool::empty(kind)
        }
    }
}

/// Both pools as one immutable view.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub rental: Pool,
    pub opponent: Pool,
}

impl PoolSnapshot {
    pub fn empty() -> Self {
        Self {
            rental: Pool::empty(PoolKind::Rental),
            opponent: Pool::empty(PoolKind::Opponent),
        }
    }

    pub fn pool(&self, kind: PoolKind) -> &Pool {
        match kind {
            PoolKind::Rental => &self.rental,
            PoolKind::Opponent => &self.opponent,
        }
    }
}

/// Holds the current pool snapshot and the sources it was read from.
#[derive(Debug)]
pub struct PoolRegistry {
    rental_source: PathBuf,
    opponent_source: PathBuf,
    current: RwLock<Arc<PoolSnapshot>>,
}

impl PoolRegistry {
    pub fn load(rental_source: PathBuf, opponent_source: PathBuf) -> Self {
        let (rental, opponent) = load_pools(&rental_source, &opponent_source);
        Self {
            rental_source,
            opponent_source,
            current: RwLock::new(Arc::new(PoolSnapshot { rental, opponent })),
        }
    }

    /// A registry with no backing sources; `reload` empties it.
    pub fn from_snapshot(snapshot: PoolSnapshot) -> Self {
        Self {
            rental_source: PathBuf::new(),
            opponent_source: PathBuf::new(),
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current view. Holders keep it alive across a concurrent reload.
    pub fn snapshot(&self) -> Arc<PoolSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Re-read both sources and swap in the result.
    pub fn reload(&self) {
        let (rental, opponent) = load_pools(&self.rental_source, &self.opponent_source);
        self.replace(PoolSnapshot { rental, opponent });
    }

    pub fn replace(&self, snapshot: PoolSnapshot) {
        let snapshot = Arc::new(snapshot);
        match self.current.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}
