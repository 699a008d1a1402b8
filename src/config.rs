//! Tower configuration.
//!
//! Defaults match the layout the tower has always used on disk. An optional
//! RON file can override any field, and a couple of environment variables can
//! override the file.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "BATTLE_TOWER_DATA_DIR";
pub const BOT_ID_ENV: &str = "BATTLE_TOWER_BOT_ID";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    pub data_dir: PathBuf,
    pub rental_teams_file: String,
    pub bot_teams_file: String,
    pub ledger_file: String,
    pub bot_id: String,
    pub format: String,
    pub leaderboard_size: usize,
    pub max_team_size: usize,
    pub growth_interval: u32,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            rental_teams_file: "rentalteams.json".to_string(),
            bot_teams_file: "botteams.json".to_string(),
            ledger_file: "battletower.json".to_string(),
            bot_id: "towerbot".to_string(),
            format: "gen9battletower".to_string(),
            leaderboard_size: 10,
            max_team_size: 6,
            growth_interval: 5,
        }
    }
}

impl TowerConfig {
    /// Load a config from a RON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `BATTLE_TOWER_DATA_DIR` and `BATTLE_TOWER_BOT_ID` if set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by the env variable names.
    /// Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(bot_id) = lookup(BOT_ID_ENV) {
            self.bot_id = bot_id;
        }
        self
    }

    /// Builds a config rooted at `data_dir` with every other field defaulted.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn rental_teams_path(&self) -> PathBuf {
        self.data_dir.join(&self.rental_teams_file)
    }

    pub fn bot_teams_path(&self) -> PathBuf {
        self.data_dir.join(&self.bot_teams_file)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TowerConfig::load(&dir.path().join("tower.ron")).unwrap();
        assert_eq!(config, TowerConfig::default());
        assert_eq!(config.max_team_size, 6);
        assert_eq!(config.growth_interval, 5);
    }

    #[test]
    fn test_partial_ron_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tower.ron");
        fs::write(&path, r#"(bot_id: "frontierbrain", leaderboard_size: 3)"#).unwrap();

        let config = TowerConfig::load(&path).unwrap();
        assert_eq!(config.bot_id, "frontierbrain");
        assert_eq!(config.leaderboard_size, 3);
        assert_eq!(config.format, "gen9battletower");
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tower.ron");
        fs::write(&path, "(bot_id: ").unwrap();
        assert!(matches!(
            TowerConfig::load(&path),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn test_overrides_replace_data_dir_and_bot_id() {
        let vars: HashMap<&str, &str> = [(DATA_DIR_ENV, "/srv/tower"), (BOT_ID_ENV, "frontierbrain")]
            .into_iter()
            .collect();
        let config = TowerConfig::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/srv/tower"));
        assert_eq!(config.bot_id, "frontierbrain");
        assert_eq!(config.ledger_path(), PathBuf::from("/srv/tower/battletower.json"));
    }

    #[test]
    fn test_blank_or_missing_overrides_keep_file_values() {
        let base = TowerConfig {
            bot_id: "frontierbrain".to_string(),
            ..TowerConfig::in_dir("/srv/tower")
        };
        let config = base
            .clone()
            .with_overrides(|key| (key == BOT_ID_ENV).then(|| "   ".to_string()));
        assert_eq!(config, base);
    }

    #[test]
    fn test_env_overrides_read_process_environment() {
        // The only test that touches the process environment.
        std::env::set_var(BOT_ID_ENV, "envbot");
        let config = TowerConfig::default().with_env_overrides();
        std::env::remove_var(BOT_ID_ENV);
        assert_eq!(config.bot_id, "envbot");
    }

    #[test]
    fn test_paths_are_rooted_in_data_dir() {
        let config = TowerConfig::in_dir("/srv/tower");
        assert_eq!(
            config.ledger_path(),
            PathBuf::from("/srv/tower/battletower.json")
        );
        assert_eq!(
            config.rental_teams_path(),
            PathBuf::from("/srv/tower/rentalteams.json")
        );
    }
}
