//! Conversion between [`RawCharacter`] and [`BuildState`]
//!
//! Nothing here fails on partially resolvable builds. Unresolved races, perks
//! and skills are reported as [`Warning`]s next to the converted value.

use crate::character::{
    AttributeAssignments, BuildState, Hms, OghmaBonus, OghmaChoice, PerkSelection, RawCharacter,
    SkillLevel, TakenPerk, LEVEL_PSEUDO_SKILL, UNKNOWN,
};
use crate::codec::layout::{ENCODED_VERSION, SKILL_BYTES};
use crate::mapper::{EdidTable, IdentifierMapper};
use crate::reference::{PerkList, ReferenceData};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// Default standing stone and blessing when a build leaves them unset
pub const NONE_SELECTION: &str = "None";

/// Hard failures of [`to_raw_character`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("Unknown perk list: {0}")]
    UnknownPerkList(String),

    #[error("Unknown game mechanics: {0}")]
    UnknownGameMechanics(String),
}

/// Table a race / standing stone / blessing reference points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    Race,
    StandingStone,
    Blessing,
}

impl ReferenceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReferenceKind::Race => "race",
            ReferenceKind::StandingStone => "standing stone",
            ReferenceKind::Blessing => "blessing",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-fatal conditions met while converting a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Warning {
    /// Race, standing stone or blessing with no table entry
    #[serde(rename_all = "camelCase")]
    UnresolvedReference { kind: ReferenceKind, value: String },

    /// The Oghma bonus was folded into an attribute total
    #[serde(rename_all = "camelCase")]
    OghmaBonusApplied { attribute: OghmaChoice },

    /// A perk's skill index is not in the perk list
    #[serde(rename_all = "camelCase")]
    UnresolvedPerkSkill { perk: String, skill: usize },

    /// A perk grouped under a skill other than its own
    #[serde(rename_all = "camelCase")]
    PerkSkillMismatch {
        perk: String,
        grouped_under: String,
        declared: String,
    },

    /// A selected perk that the perk list does not contain
    #[serde(rename_all = "camelCase")]
    UnknownPerk { perk: String, skill: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvedReference { kind, value } => {
                write!(f, "unresolved {}: {}", kind, value)
            }
            Warning::OghmaBonusApplied { attribute } => {
                write!(f, "Oghma Infinium bonus applied to {}", attribute)
            }
            Warning::UnresolvedPerkSkill { perk, skill } => {
                write!(f, "perk {} has unknown skill index {}", perk, skill)
            }
            Warning::PerkSkillMismatch {
                perk,
                grouped_under,
                declared,
            } => write!(
                f,
                "perk {} listed under {} but belongs to {}",
                perk, grouped_under, declared
            ),
            Warning::UnknownPerk { perk, skill } => {
                write!(f, "unknown perk {} under {} (dropped)", perk, skill)
            }
        }
    }
}

/// A converted value and the warnings collected on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Transformed<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Transformed<U> {
        Transformed {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Name-oriented view of a decoded character
pub fn to_build_state(
    raw: &RawCharacter,
    perk_list: &PerkList,
    mapper: &IdentifierMapper,
) -> Transformed<BuildState> {
    let mut warnings = Vec::new();

    let race = resolve_name(mapper.races(), &raw.race, ReferenceKind::Race, &mut warnings);
    let standing_stone = resolve_name(
        mapper.standing_stones(),
        &raw.standing_stone,
        ReferenceKind::StandingStone,
        &mut warnings,
    );
    let blessing = resolve_name(
        mapper.blessings(),
        &raw.blessing,
        ReferenceKind::Blessing,
        &mut warnings,
    );

    let oghma_bonus = OghmaBonus::from_choice(raw.oghma_choice);
    if raw.oghma_choice != OghmaChoice::None {
        warnings.push(Warning::OghmaBonusApplied {
            attribute: raw.oghma_choice,
        });
    }
    let attribute_assignments = AttributeAssignments {
        health: u16::from(raw.hms_increases.health) + u16::from(oghma_bonus.health),
        magicka: u16::from(raw.hms_increases.magicka) + u16::from(oghma_bonus.magicka),
        stamina: u16::from(raw.hms_increases.stamina) + u16::from(oghma_bonus.stamina),
        level: raw.level,
    };

    let skill_levels: BTreeMap<String, u8> = raw
        .skill_levels
        .iter()
        .filter(|s| s.skill != LEVEL_PSEUDO_SKILL)
        .map(|s| (s.skill.clone(), s.level))
        .collect();

    let mut selected: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for perk in &raw.perks_taken {
        match perk_list.skill_names.get(perk.skill) {
            Some(skill) => selected
                .entry(skill.clone())
                .or_default()
                .push(perk.name.clone()),
            None => {
                warn!(perk = %perk.name, skill = perk.skill, "perk skill not in perk list");
                warnings.push(Warning::UnresolvedPerkSkill {
                    perk: perk.name.clone(),
                    skill: perk.skill,
                });
            }
        }
    }

    debug!(warnings = warnings.len(), "converted raw character to build state");
    Transformed {
        value: BuildState {
            race,
            standing_stone,
            blessing,
            attribute_assignments,
            oghma_bonus,
            skill_levels: Some(skill_levels),
            perks: Some(PerkSelection { selected }),
        },
        warnings,
    }
}

/// Codec-level record for a build under the named perk list and mechanics
pub fn to_raw_character(
    build: &BuildState,
    perk_list_name: &str,
    game_mechanics_name: &str,
    data: &ReferenceData,
    mapper: &IdentifierMapper,
) -> Result<Transformed<RawCharacter>, TransformError> {
    let perk_list = mapper
        .perk_lists()
        .lookup(perk_list_name)
        .and_then(|id| data.perk_list_by_id(id))
        .ok_or_else(|| TransformError::UnknownPerkList(perk_list_name.to_string()))?;
    let game_mechanics_id = mapper
        .game_mechanics()
        .lookup(game_mechanics_name)
        .ok_or_else(|| TransformError::UnknownGameMechanics(game_mechanics_name.to_string()))?;

    let mut warnings = Vec::new();

    let race = match &build.race {
        Some(name) => mapper.races().edid_of(name).to_string(),
        None => UNKNOWN.to_string(),
    };
    let standing_stone = mapper
        .standing_stones()
        .edid_of(build.standing_stone.as_deref().unwrap_or(NONE_SELECTION))
        .to_string();
    let blessing = mapper
        .blessings()
        .edid_of(build.blessing.as_deref().unwrap_or(NONE_SELECTION))
        .to_string();

    let assignments = &build.attribute_assignments;
    let bonus = &build.oghma_bonus;
    let oghma_choice = bonus.choice();
    let bonus = OghmaBonus::from_choice(oghma_choice);
    let hms_increases = Hms {
        health: increase_byte(assignments.health, bonus.health),
        magicka: increase_byte(assignments.magicka, bonus.magicka),
        stamina: increase_byte(assignments.stamina, bonus.stamina),
    };

    let mut skill_levels: Vec<SkillLevel> = perk_list
        .skill_names
        .iter()
        .take(SKILL_BYTES)
        .map(|skill| {
            let level = build
                .skill_levels
                .as_ref()
                .and_then(|levels| levels.get(skill))
                .copied()
                .unwrap_or(0);
            SkillLevel::new(skill.as_str(), level)
        })
        .collect();
    skill_levels.push(SkillLevel::new(LEVEL_PSEUDO_SKILL, assignments.level));

    let perks_taken = flatten_perks(build.perks.as_ref(), perk_list, &mut warnings);

    debug!(
        perk_list = %perk_list.name,
        perks = perks_taken.len(),
        warnings = warnings.len(),
        "converted build state to raw character"
    );
    Ok(Transformed {
        value: RawCharacter {
            version: ENCODED_VERSION,
            perk_list_id: perk_list.id,
            game_mechanics_id,
            level: assignments.level,
            hms_increases,
            skill_levels,
            oghma_choice,
            race,
            standing_stone,
            blessing,
            perks_taken,
        },
        warnings,
    })
}

fn resolve_name(
    table: &EdidTable,
    edid: &str,
    kind: ReferenceKind,
    warnings: &mut Vec<Warning>,
) -> Option<String> {
    if edid == UNKNOWN {
        warnings.push(Warning::UnresolvedReference {
            kind,
            value: edid.to_string(),
        });
        return None;
    }
    match table.name_of(edid) {
        Some(name) => Some(name.to_string()),
        None => {
            // keep the EDID so it maps back to itself on encode
            warnings.push(Warning::UnresolvedReference {
                kind,
                value: edid.to_string(),
            });
            Some(edid.to_string())
        }
    }
}

fn increase_byte(total: u16, bonus: u8) -> u8 {
    let increases = total.saturating_sub(u16::from(bonus));
    u8::try_from(increases).unwrap_or_else(|_| {
        warn!(increases, "attribute increases exceed one byte, clamping");
        u8::MAX
    })
}

/// Selected perks in perk-list order, each once
fn flatten_perks(
    selection: Option<&PerkSelection>,
    perk_list: &PerkList,
    warnings: &mut Vec<Warning>,
) -> Vec<TakenPerk> {
    let Some(selection) = selection else {
        return Vec::new();
    };

    let mut positions = BTreeSet::new();
    for (skill, perks) in &selection.selected {
        for name in perks {
            let Some((position, perk)) = perk_list.perk_under(name, skill) else {
                warnings.push(Warning::UnknownPerk {
                    perk: name.clone(),
                    skill: skill.clone(),
                });
                continue;
            };
            let declared = perk_list.skill_of(perk).unwrap_or(UNKNOWN);
            if declared != skill {
                warnings.push(Warning::PerkSkillMismatch {
                    perk: name.clone(),
                    grouped_under: skill.clone(),
                    declared: declared.to_string(),
                });
            }
            positions.insert(position);
        }
    }

    positions
        .into_iter()
        .map(|i| {
            let perk = &perk_list.perks[i];
            TakenPerk {
                name: perk.name.clone(),
                skill: perk.skill,
            }
        })
        .collect()
}
