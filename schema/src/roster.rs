use crate::identity::to_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// Stat keys used by effort value and individual value spreads.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatName {
    Hp,
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
}

impl TryFrom<String> for StatName {
    type Error = String;

    /// Definition sources spell stat keys freely ("HP", "SpA", "spe").
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse::<StatName>()
            .map_err(|_| format!("unknown stat name `{}`", value))
    }
}

/// Per-stat values. The battle host validates totals, not this crate.
pub type StatSpread = BTreeMap<StatName, u16>;

/// One rentable creature as described by a team definition source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntity {
    pub species: String,
    pub ability: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    pub moves: Vec<String>,
    #[serde(default)]
    pub evs: StatSpread,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ivs: Option<StatSpread>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tera_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub shiny: bool,
}

impl RosterEntity {
    /// Normalized species id used for duplicate checks within a team.
    pub fn species_id(&self) -> String {
        to_id(&self.species)
    }

    pub fn is_same_species(&self, other: &RosterEntity) -> bool {
        self.species_id() == other.species_id()
    }
}

impl fmt::Display for RosterEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.gender {
            Some(gender) => writeln!(f, "{} ({})", self.species, gender)?,
            None => writeln!(f, "{}", self.species)?,
        }
        writeln!(f, "Item: {}", self.item.as_deref().unwrap_or("No Item"))?;
        writeln!(f, "Ability: {}", self.ability)?;
        writeln!(f, "Tera Type: {}", self.tera_type.as_deref().unwrap_or("Normal"))?;
        writeln!(f, "Moves:")?;
        for move_name in &self.moves {
            writeln!(f, "  - {}", move_name)?;
        }
        let evs: Vec<String> = self
            .evs
            .iter()
            .map(|(stat, value)| format!("{} {}", value, stat))
            .collect();
        writeln!(f, "EVs: {}", evs.join(" / "))?;
        write!(f, "Nature: {}", self.nature.as_deref().unwrap_or("Serious"))
    }
}

/// A named team from a definition source. Its members feed the sampling pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalTeam {
    pub id: String,
    pub name: String,
    #[serde(alias = "pokemon")]
    pub pokemons: Vec<RosterEntity>,
}

impl RentalTeam {
    pub fn normalized_id(&self) -> String {
        to_id(&self.id)
    }
}
