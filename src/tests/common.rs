use crate::config::TowerConfig;
use crate::persistence::LedgerStore;
use crate::pools::{Pool, PoolKind, PoolRegistry, PoolSnapshot};
use crate::tower::BattleTower;
use schema::{RentalTeam, RosterEntity, StatName};
use tempfile::TempDir;

/// A minimal valid roster entity for `species`.
pub fn entity(species: &str) -> RosterEntity {
    RosterEntity {
        species: species.to_string(),
        ability: "Pressure".to_string(),
        item: None,
        moves: vec!["Tackle".to_string()],
        evs: [(StatName::Hp, 252), (StatName::Def, 4)].into_iter().collect(),
        ivs: None,
        nature: None,
        tera_type: None,
        gender: None,
        shiny: false,
    }
}

pub fn species_pool(species: &[&str]) -> Vec<RosterEntity> {
    species.iter().map(|name| entity(name)).collect()
}

pub fn team(id: &str, species: &[&str]) -> RentalTeam {
    RentalTeam {
        id: id.to_string(),
        name: id.to_string(),
        pokemons: species_pool(species),
    }
}

pub fn named_team(id: &str, name: &str, species: &[&str]) -> RentalTeam {
    RentalTeam {
        name: name.to_string(),
        ..team(id, species)
    }
}

pub fn default_rental_teams() -> Vec<RentalTeam> {
    vec![
        named_team(
            "kanto",
            "Kanto Classics",
            &["Pikachu", "Snorlax", "Lapras", "Gengar", "Dragonite", "Alakazam"],
        ),
        named_team(
            "johto",
            "Johto Picks",
            &["Typhlosion", "Feraligatr", "Meganium", "Tyranitar"],
        ),
    ]
}

pub fn default_opponent_teams() -> Vec<RentalTeam> {
    vec![named_team(
        "frontier",
        "Frontier Brains",
        &["Metagross", "Salamence", "Garchomp", "Milotic", "Blissey", "Scizor", "Heracross"],
    )]
}

/// A tower over in-memory pools with its ledger in a temp directory.
pub struct TowerFixture {
    pub dir: TempDir,
    pub tower: BattleTower,
}

impl TowerFixture {
    pub fn new() -> Self {
        Self::with_teams(default_rental_teams(), default_opponent_teams())
    }

    pub fn with_teams(rental: Vec<RentalTeam>, opponent: Vec<RentalTeam>) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let tower = build_tower(&dir, rental, opponent);
        Self { dir, tower }
    }

    /// A second tower over the same ledger file, as after a restart.
    pub fn restart(&self) -> BattleTower {
        build_tower(&self.dir, default_rental_teams(), default_opponent_teams())
    }
}

fn build_tower(dir: &TempDir, rental: Vec<RentalTeam>, opponent: Vec<RentalTeam>) -> BattleTower {
    let config = TowerConfig::in_dir(dir.path());
    let pools = PoolRegistry::from_snapshot(PoolSnapshot {
        rental: Pool::from_teams(PoolKind::Rental, rental),
        opponent: Pool::from_teams(PoolKind::Opponent, opponent),
    });
    let store = LedgerStore::new(config.ledger_path());
    BattleTower::new(config, pools, store)
}
