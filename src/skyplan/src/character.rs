//! Character build records
//!
//! [`RawCharacter`] mirrors the build code field-for-field (numeric ids, EDIDs,
//! one flat perk list). [`BuildState`] is the name-oriented form used by the
//! rest of the application, with perks grouped under their skill.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Display value for a race, standing stone or blessing index with no table entry
pub const UNKNOWN: &str = "Unknown";

/// Synthetic skill entry that version 2 codes carry for the character level
pub const LEVEL_PSEUDO_SKILL: &str = "Level";

/// One-time +1 attribute bonus from the Oghma Infinium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OghmaChoice {
    #[default]
    None,
    Health,
    Magicka,
    Stamina,
}

impl OghmaChoice {
    /// All choices in wire order (index = encoded value)
    pub const ALL: [OghmaChoice; 4] = [
        OghmaChoice::None,
        OghmaChoice::Health,
        OghmaChoice::Magicka,
        OghmaChoice::Stamina,
    ];

    /// Interpret an encoded index; anything out of range is `None`
    pub fn from_index(index: u8) -> Self {
        Self::ALL
            .get(index as usize)
            .copied()
            .unwrap_or(OghmaChoice::None)
    }

    /// Encoded index of this choice
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            OghmaChoice::None => "None",
            OghmaChoice::Health => "Health",
            OghmaChoice::Magicka => "Magicka",
            OghmaChoice::Stamina => "Stamina",
        }
    }
}

impl fmt::Display for OghmaChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Health / Magicka / Stamina level-up increases, one byte each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hms {
    pub health: u8,
    pub magicka: u8,
    pub stamina: u8,
}

/// A skill name paired with its level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLevel {
    pub skill: String,
    pub level: u8,
}

impl SkillLevel {
    pub fn new(skill: impl Into<String>, level: u8) -> Self {
        Self {
            skill: skill.into(),
            level,
        }
    }
}

/// A perk present in the build, tagged with its skill index in the perk list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakenPerk {
    pub name: String,
    pub skill: usize,
}

/// Build as stored in the build code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCharacter {
    pub version: u8,
    pub perk_list_id: u8,
    pub game_mechanics_id: u8,
    pub level: u8,
    pub hms_increases: Hms,
    /// Skill levels in perk-list order, plus [`LEVEL_PSEUDO_SKILL`] for version 2
    pub skill_levels: Vec<SkillLevel>,
    pub oghma_choice: OghmaChoice,
    /// Race EDID, or [`UNKNOWN`]
    pub race: String,
    /// Standing stone EDID, or [`UNKNOWN`]
    pub standing_stone: String,
    /// Blessing EDID, or [`UNKNOWN`]
    pub blessing: String,
    /// Perks in perk-list order
    pub perks_taken: Vec<TakenPerk>,
}

impl RawCharacter {
    /// Level recorded for a skill, if the character carries one
    pub fn skill_level(&self, skill: &str) -> Option<u8> {
        self.skill_levels
            .iter()
            .find(|s| s.skill == skill)
            .map(|s| s.level)
    }

    /// Whether the perk with this name under this skill index was taken
    pub fn has_perk(&self, name: &str, skill: usize) -> bool {
        self.perks_taken
            .iter()
            .any(|p| p.name == name && p.skill == skill)
    }
}

/// Attribute totals as shown to the user (Oghma bonus included)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeAssignments {
    pub health: u16,
    pub magicka: u16,
    pub stamina: u16,
    pub level: u8,
}

impl Default for AttributeAssignments {
    fn default() -> Self {
        Self {
            health: 0,
            magicka: 0,
            stamina: 0,
            level: 1,
        }
    }
}

/// Which attribute received the Oghma bonus (at most one field is 1)
///
/// A build without `oghmaBonus` encodes with no Oghma choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OghmaBonus {
    pub health: u8,
    pub magicka: u8,
    pub stamina: u8,
}

impl OghmaBonus {
    pub fn from_choice(choice: OghmaChoice) -> Self {
        let mut bonus = Self::default();
        match choice {
            OghmaChoice::None => {}
            OghmaChoice::Health => bonus.health = 1,
            OghmaChoice::Magicka => bonus.magicka = 1,
            OghmaChoice::Stamina => bonus.stamina = 1,
        }
        bonus
    }

    /// First non-zero attribute in health, magicka, stamina order
    pub fn choice(&self) -> OghmaChoice {
        if self.health != 0 {
            OghmaChoice::Health
        } else if self.magicka != 0 {
            OghmaChoice::Magicka
        } else if self.stamina != 0 {
            OghmaChoice::Stamina
        } else {
            OghmaChoice::None
        }
    }
}

/// Perks grouped by skill name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerkSelection {
    pub selected: BTreeMap<String, Vec<String>>,
}

/// Build as presented by the application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildState {
    pub race: Option<String>,
    pub standing_stone: Option<String>,
    pub blessing: Option<String>,
    pub attribute_assignments: AttributeAssignments,
    pub oghma_bonus: OghmaBonus,
    pub skill_levels: Option<BTreeMap<String, u8>>,
    pub perks: Option<PerkSelection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oghma_from_index() {
        assert_eq!(OghmaChoice::from_index(0), OghmaChoice::None);
        assert_eq!(OghmaChoice::from_index(1), OghmaChoice::Health);
        assert_eq!(OghmaChoice::from_index(2), OghmaChoice::Magicka);
        assert_eq!(OghmaChoice::from_index(3), OghmaChoice::Stamina);
        assert_eq!(OghmaChoice::from_index(4), OghmaChoice::None);
        assert_eq!(OghmaChoice::from_index(16), OghmaChoice::None);
    }

    #[test]
    fn test_oghma_bonus_priority() {
        let bonus = OghmaBonus {
            health: 0,
            magicka: 1,
            stamina: 1,
        };
        assert_eq!(bonus.choice(), OghmaChoice::Magicka);
        assert_eq!(OghmaBonus::default().choice(), OghmaChoice::None);
        assert_eq!(
            OghmaBonus::from_choice(OghmaChoice::Stamina).choice(),
            OghmaChoice::Stamina
        );
    }

    #[test]
    fn test_build_state_defaults_from_empty_json() {
        let build: BuildState = serde_json::from_str("{}").unwrap();
        assert_eq!(build.race, None);
        assert_eq!(build.attribute_assignments.level, 1);
        assert_eq!(build.attribute_assignments.health, 0);
        assert!(build.perks.is_none());
    }

    #[test]
    fn test_build_state_camel_case() {
        let json = r#"{
            "standingStone": "The Lord Stone",
            "attributeAssignments": { "health": 12, "level": 20 },
            "skillLevels": { "Smithing": 40 },
            "perks": { "selected": { "Smithing": ["Craftsmanship"] } }
        }"#;
        let build: BuildState = serde_json::from_str(json).unwrap();
        assert_eq!(build.standing_stone.as_deref(), Some("The Lord Stone"));
        assert_eq!(build.attribute_assignments.health, 12);
        assert_eq!(build.attribute_assignments.magicka, 0);
        assert_eq!(build.attribute_assignments.level, 20);
        assert_eq!(build.skill_levels.unwrap()["Smithing"], 40);
        assert_eq!(build.perks.unwrap().selected["Smithing"], vec!["Craftsmanship"]);
    }

    #[test]
    fn test_raw_character_lookups() {
        let raw = RawCharacter {
            version: 2,
            perk_list_id: 0,
            game_mechanics_id: 0,
            level: 10,
            hms_increases: Hms::default(),
            skill_levels: vec![SkillLevel::new("Smithing", 30)],
            oghma_choice: OghmaChoice::None,
            race: UNKNOWN.to_string(),
            standing_stone: UNKNOWN.to_string(),
            blessing: UNKNOWN.to_string(),
            perks_taken: vec![TakenPerk {
                name: "Craftsmanship".to_string(),
                skill: 0,
            }],
        };
        assert_eq!(raw.skill_level("Smithing"), Some(30));
        assert_eq!(raw.skill_level("Block"), None);
        assert!(raw.has_perk("Craftsmanship", 0));
        assert!(!raw.has_perk("Craftsmanship", 1));
        assert!(!raw.has_perk("Conditioning", 0));
    }
}
