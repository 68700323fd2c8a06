//! Import and export of planner URLs against one loaded ruleset

use crate::character::{BuildState, RawCharacter};
use crate::codec::{BuildCodec, CodecError};
use crate::mapper::IdentifierMapper;
use crate::reference::{DocumentSource, ReferenceData, ReferenceError, ReferenceRepository};
use crate::transform::{to_build_state, to_raw_character, Warning};
use serde::Serialize;
use tracing::info;

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://planner.example/";

/// A build read from a planner URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Imported {
    pub build: BuildState,
    pub character: RawCharacter,
    pub perk_list: String,
    pub game_mechanics: String,
    pub preset: Option<String>,
    pub warnings: Vec<Warning>,
}

/// A planner URL produced from a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exported {
    pub url: String,
    pub warnings: Vec<Warning>,
}

/// Owns loaded reference data and converts between URLs and [`BuildState`]
#[derive(Debug, Clone)]
pub struct BuildPlanner {
    data: ReferenceData,
    mapper: IdentifierMapper,
    base_url: String,
}

impl BuildPlanner {
    pub fn new(data: ReferenceData) -> Self {
        Self::with_base_url(data, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(data: ReferenceData, base_url: impl Into<String>) -> Self {
        let mapper = IdentifierMapper::new(&data);
        Self {
            data,
            mapper,
            base_url: base_url.into(),
        }
    }

    /// Load every table from the repository, then build a planner over them
    pub fn from_repository<S: DocumentSource + Sync>(
        repository: &ReferenceRepository<S>,
    ) -> Result<Self, ReferenceError> {
        let data = repository.load_all()?;
        info!(
            perk_lists = data.perk_lists.len(),
            presets = data.presets.len(),
            "reference data ready"
        );
        Ok(Self::new(data))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    pub fn mapper(&self) -> &IdentifierMapper {
        &self.mapper
    }

    pub fn codec(&self) -> BuildCodec<'_> {
        BuildCodec::new(&self.data, &self.mapper, &self.base_url)
    }

    /// Decode a planner URL into a [`BuildState`]
    pub fn import_url(&self, url: &str) -> Result<Imported, CodecError> {
        let decoded = self.codec().decode(url)?;
        let character = decoded.character;

        let perk_list = self
            .data
            .perk_list_by_id(character.perk_list_id)
            .ok_or_else(|| CodecError::UnknownPerkList(format!("id {}", character.perk_list_id)))?;
        let game_mechanics = self
            .data
            .game_mechanics_by_id(character.game_mechanics_id)
            .ok_or_else(|| {
                CodecError::UnknownGameMechanics(format!("id {}", character.game_mechanics_id))
            })?;

        let transformed = to_build_state(&character, perk_list, &self.mapper);
        info!(
            perk_list = %perk_list.name,
            warnings = transformed.warnings.len(),
            "imported build"
        );
        Ok(Imported {
            build: transformed.value,
            perk_list: perk_list.name.clone(),
            game_mechanics: game_mechanics.name.clone(),
            preset: decoded.preset_name,
            warnings: transformed.warnings,
            character,
        })
    }

    /// Encode a [`BuildState`] as a planner URL
    pub fn export_url(
        &self,
        build: &BuildState,
        perk_list_name: &str,
        game_mechanics_name: &str,
    ) -> Result<Exported, CodecError> {
        let transformed = to_raw_character(
            build,
            perk_list_name,
            game_mechanics_name,
            &self.data,
            &self.mapper,
        )?;
        let url = self
            .codec()
            .encode(&transformed.value, perk_list_name, game_mechanics_name)?;
        info!(
            perk_list = perk_list_name,
            warnings = transformed.warnings.len(),
            "exported build"
        );
        Ok(Exported {
            url,
            warnings: transformed.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{AttributeAssignments, OghmaBonus, PerkSelection};
    use crate::reference::demo;
    use std::collections::BTreeMap;

    fn planner() -> BuildPlanner {
        BuildPlanner::new(demo::data())
    }

    fn build() -> BuildState {
        let mut selected = BTreeMap::new();
        selected.insert(
            "Smithing".to_string(),
            vec!["Craftsmanship".to_string(), "Advanced Blacksmithing".to_string()],
        );
        selected.insert("Sneak".to_string(), vec!["Stealth".to_string()]);
        selected.insert("Lycanthropy".to_string(), vec!["Bestial Strength".to_string()]);

        let mut skills = BTreeMap::new();
        skills.insert("Smithing".to_string(), 45);
        skills.insert("Sneak".to_string(), 30);

        BuildState {
            race: Some("Breton".to_string()),
            standing_stone: Some("The Thief Stone".to_string()),
            blessing: Some("Blessing of Arkay".to_string()),
            attribute_assignments: AttributeAssignments {
                health: 12,
                magicka: 8,
                stamina: 5,
                level: 26,
            },
            oghma_bonus: OghmaBonus {
                health: 0,
                magicka: 1,
                stamina: 0,
            },
            skill_levels: Some(skills),
            perks: Some(PerkSelection { selected }),
        }
    }

    #[test]
    fn test_export_then_import() {
        let planner = planner();
        let exported = planner
            .export_url(&build(), "LoreRim v3.0.4", "LoreRim")
            .unwrap();
        assert!(exported.warnings.is_empty());
        assert!(exported.url.starts_with(DEFAULT_BASE_URL));

        let imported = planner.import_url(&exported.url).unwrap();
        assert_eq!(imported.perk_list, "LoreRim v3.0.4");
        assert_eq!(imported.game_mechanics, "LoreRim");
        assert_eq!(imported.preset.as_deref(), Some("LoreRim v3.0.4"));

        let expected = build();
        let got = imported.build;
        assert_eq!(got.race, expected.race);
        assert_eq!(got.standing_stone, expected.standing_stone);
        assert_eq!(got.blessing, expected.blessing);
        assert_eq!(got.attribute_assignments, expected.attribute_assignments);
        assert_eq!(got.oghma_bonus, expected.oghma_bonus);
        assert_eq!(got.perks, expected.perks);

        let skills = got.skill_levels.unwrap();
        assert_eq!(skills.get("Smithing"), Some(&45));
        assert_eq!(skills.get("Sneak"), Some(&30));
        assert_eq!(skills.get("Block"), Some(&0));

        assert_eq!(
            imported.warnings,
            vec![Warning::OghmaBonusApplied {
                attribute: crate::character::OghmaChoice::Magicka,
            }]
        );
    }

    #[test]
    fn test_import_export_is_stable() {
        let planner = planner();
        let first = planner
            .export_url(&build(), "LoreRim v3.0.4", "LoreRim")
            .unwrap();
        let imported = planner.import_url(&first.url).unwrap();
        let second = planner
            .export_url(&imported.build, &imported.perk_list, &imported.game_mechanics)
            .unwrap();
        assert_eq!(first.url, second.url);
    }

    #[test]
    fn test_empty_build_uses_first_race() {
        let planner = planner();
        let exported = planner
            .export_url(&BuildState::default(), "Vanilla", "Vanilla")
            .unwrap();
        assert!(exported.url.ends_with("&p=0"));

        let imported = planner.import_url(&exported.url).unwrap();
        assert_eq!(imported.build.race.as_deref(), Some("Altmer"));
        assert_eq!(imported.build.standing_stone.as_deref(), Some("None"));
        assert_eq!(imported.build.attribute_assignments.level, 1);
        assert!(imported.warnings.is_empty());
    }

    #[test]
    fn test_errors_pass_through() {
        let planner = planner();
        assert_eq!(
            planner.import_url("https://planner.example/"),
            Err(CodecError::NoBuildCode)
        );
        let err = planner
            .export_url(&build(), "Not A List", "LoreRim")
            .unwrap_err();
        assert_eq!(err, CodecError::UnknownPerkList("Not A List".to_string()));
    }

    #[test]
    fn test_base_url() {
        let mut planner = BuildPlanner::with_base_url(demo::data(), "http://localhost:8080/plan");
        let url = planner
            .export_url(&BuildState::default(), "Vanilla", "Vanilla")
            .unwrap()
            .url;
        assert!(url.starts_with("http://localhost:8080/plan?b="));

        planner.set_base_url("https://other.example/?lang=en");
        let url = planner
            .export_url(&BuildState::default(), "Vanilla", "Vanilla")
            .unwrap()
            .url;
        assert!(url.starts_with("https://other.example/?lang=en&b="));
        assert!(planner.import_url(&url).is_ok());
    }

    #[test]
    fn test_from_repository() {
        let repository = ReferenceRepository::new(demo::source());
        let planner = BuildPlanner::from_repository(&repository).unwrap();
        assert_eq!(planner.data().races.len(), 5);
        assert_eq!(planner.mapper().perk_lists().id_of("LoreRim v3.0.4"), 1);
    }

    #[test]
    fn test_imported_serializes_camel_case() {
        let planner = planner();
        let url = planner
            .export_url(&build(), "LoreRim v3.0.4", "LoreRim")
            .unwrap()
            .url;
        let json = serde_json::to_value(planner.import_url(&url).unwrap()).unwrap();
        assert_eq!(json["perkList"], "LoreRim v3.0.4");
        assert_eq!(json["build"]["attributeAssignments"]["magicka"], 8);
        assert_eq!(json["warnings"][0]["type"], "oghmaBonusApplied");
    }
}
