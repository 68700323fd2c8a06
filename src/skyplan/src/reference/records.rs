//! Reference record types and their load-time validation

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of skill names every perk list declares
pub const SKILL_COUNT: usize = 20;

/// Health, magicka, stamina
pub const ATTRIBUTE_COUNT: usize = 3;

/// The six reference tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Races,
    StandingStones,
    Blessings,
    PerkLists,
    GameMechanics,
    Presets,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Races => "races",
            Table::StandingStones => "standing stones",
            Table::Blessings => "blessings",
            Table::PerkLists => "perk lists",
            Table::GameMechanics => "game mechanics",
            Table::Presets => "presets",
        }
    }

    /// Document path used unless overridden in [`super::ReferencePaths`]
    pub fn default_path(&self) -> &'static str {
        match self {
            Table::Races => "races.json",
            Table::StandingStones => "standingStones.json",
            Table::Blessings => "blessings.json",
            Table::PerkLists => "perkLists.json",
            Table::GameMechanics => "gameMechanics.json",
            Table::Presets => "presets.json",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated entry of one reference table
pub trait Record: DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;

    /// Key under which the record array is wrapped, for tables that are not bare arrays
    const ENVELOPE: Option<&'static str> = None;

    fn name(&self) -> &str;

    /// Structural checks serde cannot express. The message names the violated invariant.
    fn validate(&self) -> Result<(), String> {
        require_name(self.name())
    }
}

fn require_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    Ok(())
}

fn require_len<T>(field: &str, values: &[T], expected: usize) -> Result<(), String> {
    if values.len() != expected {
        return Err(format!(
            "{} must have exactly {} entries, got {}",
            field,
            expected,
            values.len()
        ));
    }
    Ok(())
}

// ============================================================================
// Races
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub name: String,
    pub edid: String,
    #[serde(default)]
    pub description: String,
    /// Starting health, magicka, stamina
    pub starting_attributes: Vec<u32>,
    /// Starting level of every skill, in perk-list skill order
    pub starting_skills: Vec<u8>,
}

impl Race {
    pub fn starting_health(&self) -> u32 {
        self.starting_attributes.first().copied().unwrap_or(0)
    }

    pub fn starting_magicka(&self) -> u32 {
        self.starting_attributes.get(1).copied().unwrap_or(0)
    }

    pub fn starting_stamina(&self) -> u32 {
        self.starting_attributes.get(2).copied().unwrap_or(0)
    }
}

impl Record for Race {
    const TABLE: Table = Table::Races;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        require_name(&self.name)?;
        require_len("startingAttributes", &self.starting_attributes, ATTRIBUTE_COUNT)?;
        require_len("startingSkills", &self.starting_skills, SKILL_COUNT)
    }
}

// ============================================================================
// Standing stones and blessings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingStone {
    pub name: String,
    pub edid: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Record for StandingStone {
    const TABLE: Table = Table::StandingStones;

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blessing {
    pub name: String,
    pub edid: String,
    #[serde(default)]
    pub shrine: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Record for Blessing {
    const TABLE: Table = Table::Blessings;

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Perk lists
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perk {
    pub name: String,
    pub edid: String,
    /// Index into the owning list's `skill_names`
    pub skill: usize,
    /// Skill level required to take the first rank
    #[serde(default)]
    pub skill_req: u32,
    #[serde(default = "default_ranks")]
    pub ranks: u8,
    #[serde(default)]
    pub description: String,
}

fn default_ranks() -> u8 {
    1
}

/// A ruleset's skills and perks. Perk order is the build code's bit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkList {
    pub name: String,
    pub id: u8,
    pub skill_names: Vec<String>,
    pub perks: Vec<Perk>,
}

impl PerkList {
    /// Position and record of a perk by name
    pub fn perk(&self, name: &str) -> Option<(usize, &Perk)> {
        self.perks.iter().enumerate().find(|(_, p)| p.name == name)
    }

    /// Position and record of a perk by name, preferring the one under `skill`
    pub fn perk_under(&self, name: &str, skill: &str) -> Option<(usize, &Perk)> {
        self.skill_index(skill)
            .and_then(|index| {
                self.perks
                    .iter()
                    .enumerate()
                    .find(|(_, p)| p.name == name && p.skill == index)
            })
            .or_else(|| self.perk(name))
    }

    pub fn skill_index(&self, skill: &str) -> Option<usize> {
        self.skill_names.iter().position(|s| s == skill)
    }

    /// Skill name a perk belongs to
    pub fn skill_of(&self, perk: &Perk) -> Option<&str> {
        self.skill_names.get(perk.skill).map(String::as_str)
    }
}

impl Record for PerkList {
    const TABLE: Table = Table::PerkLists;
    const ENVELOPE: Option<&'static str> = Some("perkLists");

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        require_name(&self.name)?;
        require_len("skillNames", &self.skill_names, SKILL_COUNT)?;
        for perk in &self.perks {
            if perk.name.trim().is_empty() {
                return Err("perk name must not be empty".to_string());
            }
            if perk.skill >= self.skill_names.len() {
                return Err(format!(
                    "perk {:?} has skill index {} but only {} skills are declared",
                    perk.name,
                    perk.skill,
                    self.skill_names.len()
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Game mechanics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leveling {
    /// Points added to the chosen attribute per level-up
    pub hms_per_level: u32,
    /// Carry weight gained per stamina increase
    #[serde(default)]
    pub carry_weight_per_stamina: u32,
}

/// Parameters of the derived-attribute formulas; arrays are parallel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAttributes {
    pub attribute: Vec<String>,
    pub weight_health: Vec<f64>,
    pub weight_magicka: Vec<f64>,
    pub weight_stamina: Vec<f64>,
    pub prefactor: Vec<f64>,
    pub threshold: Vec<f64>,
}

impl DerivedAttributes {
    fn validate(&self) -> Result<(), String> {
        let expected = self.attribute.len();
        require_len("derivedAttributes.weightHealth", &self.weight_health, expected)?;
        require_len("derivedAttributes.weightMagicka", &self.weight_magicka, expected)?;
        require_len("derivedAttributes.weightStamina", &self.weight_stamina, expected)?;
        require_len("derivedAttributes.prefactor", &self.prefactor, expected)?;
        require_len("derivedAttributes.threshold", &self.threshold, expected)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMechanics {
    pub name: String,
    pub id: u8,
    #[serde(default)]
    pub description: String,
    pub leveling: Leveling,
    pub derived_attributes: DerivedAttributes,
}

impl Record for GameMechanics {
    const TABLE: Table = Table::GameMechanics;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        require_name(&self.name)?;
        self.derived_attributes.validate()
    }
}

// ============================================================================
// Presets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    pub id: u8,
    /// Id of the perk list this preset is built on
    pub perk_list: u8,
    pub game_mechanics: u8,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Record for Preset {
    const TABLE: Table = Table::Presets;

    fn name(&self) -> &str {
        &self.name
    }
}
