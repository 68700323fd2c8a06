//! Identifier lookups between display names and build-code identifiers
//!
//! Three kinds of table, each with its own miss policy:
//!
//! - [`EdidTable`]: name ↔ EDID. An unknown name passes through unchanged as
//!   its own EDID; an unknown EDID resolves to `None`.
//! - [`NumericIds`]: name ↔ declared integer id. An unknown name maps to `0`
//!   (the planner's "default" id, which is also a valid id); an unknown id
//!   resolves to `None`.
//! - [`PositionalTable`]: array index ↔ record, for races, standing stones and
//!   blessings.
//!
//! Each policy is kept as observed in existing planner links; they are not
//! interchangeable.

mod slug;

pub use slug::{slugify, static_display_name, SlugKind};

use crate::reference::ReferenceData;
use std::collections::HashMap;

/// Bidirectional name ↔ EDID table
#[derive(Debug, Clone, Default)]
pub struct EdidTable {
    by_name: HashMap<String, String>,
    by_edid: HashMap<String, String>,
}

impl EdidTable {
    /// Build from `(name, edid)` pairs. The first occurrence of a name or EDID wins.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut table = Self::default();
        for (name, edid) in pairs {
            table
                .by_name
                .entry(name.to_string())
                .or_insert_with(|| edid.to_string());
            table
                .by_edid
                .entry(edid.to_string())
                .or_insert_with(|| name.to_string());
        }
        table
    }

    /// EDID for a name; unknown names are returned unchanged
    pub fn edid_of<'a>(&'a self, name: &'a str) -> &'a str {
        self.by_name.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Name for an EDID, if known
    pub fn name_of(&self, edid: &str) -> Option<&str> {
        self.by_edid.get(edid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Bidirectional name ↔ small integer table
#[derive(Debug, Clone, Default)]
pub struct NumericIds {
    by_name: HashMap<String, u8>,
    by_id: HashMap<u8, String>,
}

impl NumericIds {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u8)>) -> Self {
        let mut table = Self::default();
        for (name, id) in pairs {
            table.by_name.entry(name.to_string()).or_insert(id);
            table.by_id.entry(id).or_insert_with(|| name.to_string());
        }
        table
    }

    /// Id for a name, `0` when unknown. Zero is also a real id, so callers
    /// that must tell the two apart use [`NumericIds::lookup`].
    pub fn id_of(&self, name: &str) -> u8 {
        self.lookup(name).unwrap_or(0)
    }

    pub fn lookup(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: u8) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }
}

/// Records addressed by array position
#[derive(Debug, Clone, Default)]
pub struct PositionalTable {
    entries: Vec<(String, String)>,
    by_edid: HashMap<String, u8>,
    by_name: HashMap<String, u8>,
}

impl PositionalTable {
    /// Build from `(name, edid)` pairs in table order. Only the first 256
    /// entries are addressable by a single byte.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut table = Self::default();
        for (position, (name, edid)) in pairs.into_iter().enumerate() {
            if let Ok(index) = u8::try_from(position) {
                table.by_edid.entry(edid.to_string()).or_insert(index);
                table.by_name.entry(name.to_string()).or_insert(index);
            }
            table.entries.push((name.to_string(), edid.to_string()));
        }
        table
    }

    pub fn name_at(&self, index: u8) -> Option<&str> {
        self.entries.get(index as usize).map(|(name, _)| name.as_str())
    }

    pub fn edid_at(&self, index: u8) -> Option<&str> {
        self.entries.get(index as usize).map(|(_, edid)| edid.as_str())
    }

    /// Position of a record by EDID, falling back to its name
    pub fn index_of(&self, key: &str) -> Option<u8> {
        self.by_edid
            .get(key)
            .or_else(|| self.by_name.get(key))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All identifier tables derived from one set of reference data
#[derive(Debug, Clone)]
pub struct IdentifierMapper {
    races: EdidTable,
    standing_stones: EdidTable,
    blessings: EdidTable,
    perks: EdidTable,
    perk_lists: NumericIds,
    game_mechanics: NumericIds,
    presets: NumericIds,
    race_positions: PositionalTable,
    standing_stone_positions: PositionalTable,
    blessing_positions: PositionalTable,
    derived_slugs: HashMap<(SlugKind, String), String>,
}

impl IdentifierMapper {
    pub fn new(data: &ReferenceData) -> Self {
        let race_pairs = move || data.races.iter().map(|r| (r.name.as_str(), r.edid.as_str()));
        let stone_pairs = move || {
            data.standing_stones
                .iter()
                .map(|s| (s.name.as_str(), s.edid.as_str()))
        };
        let blessing_pairs = move || {
            data.blessings
                .iter()
                .map(|b| (b.name.as_str(), b.edid.as_str()))
        };

        let perks = EdidTable::from_pairs(
            data.perk_lists
                .iter()
                .flat_map(|list| list.perks.iter())
                .map(|p| (p.name.as_str(), p.edid.as_str())),
        );

        let mut derived_slugs = HashMap::new();
        let named = data
            .perk_lists
            .iter()
            .map(|p| (SlugKind::PerkList, p.name.as_str()))
            .chain(
                data.game_mechanics
                    .iter()
                    .map(|g| (SlugKind::GameMechanics, g.name.as_str())),
            )
            .chain(data.presets.iter().map(|p| (SlugKind::Preset, p.name.as_str())));
        for (kind, name) in named {
            derived_slugs
                .entry((kind, slugify(name)))
                .or_insert_with(|| name.to_string());
        }

        Self {
            races: EdidTable::from_pairs(race_pairs()),
            standing_stones: EdidTable::from_pairs(stone_pairs()),
            blessings: EdidTable::from_pairs(blessing_pairs()),
            perks,
            perk_lists: NumericIds::from_pairs(
                data.perk_lists.iter().map(|p| (p.name.as_str(), p.id)),
            ),
            game_mechanics: NumericIds::from_pairs(
                data.game_mechanics.iter().map(|g| (g.name.as_str(), g.id)),
            ),
            presets: NumericIds::from_pairs(data.presets.iter().map(|p| (p.name.as_str(), p.id))),
            race_positions: PositionalTable::from_pairs(race_pairs()),
            standing_stone_positions: PositionalTable::from_pairs(stone_pairs()),
            blessing_positions: PositionalTable::from_pairs(blessing_pairs()),
            derived_slugs,
        }
    }

    pub fn races(&self) -> &EdidTable {
        &self.races
    }

    pub fn standing_stones(&self) -> &EdidTable {
        &self.standing_stones
    }

    pub fn blessings(&self) -> &EdidTable {
        &self.blessings
    }

    pub fn perks(&self) -> &EdidTable {
        &self.perks
    }

    pub fn perk_lists(&self) -> &NumericIds {
        &self.perk_lists
    }

    pub fn game_mechanics(&self) -> &NumericIds {
        &self.game_mechanics
    }

    pub fn presets(&self) -> &NumericIds {
        &self.presets
    }

    pub fn race_positions(&self) -> &PositionalTable {
        &self.race_positions
    }

    pub fn standing_stone_positions(&self) -> &PositionalTable {
        &self.standing_stone_positions
    }

    pub fn blessing_positions(&self) -> &PositionalTable {
        &self.blessing_positions
    }

    /// Display name for a deep-link slug: built-in table first, then the
    /// slugs of the loaded records
    pub fn display_name_for_slug(&self, kind: SlugKind, slug: &str) -> Option<&str> {
        static_display_name(kind, slug).or_else(|| {
            self.derived_slugs
                .get(&(kind, slug.to_string()))
                .map(String::as_str)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::demo;

    fn mapper() -> IdentifierMapper {
        IdentifierMapper::new(&demo::data())
    }

    #[test]
    fn test_edid_pass_through() {
        let m = mapper();
        assert_eq!(m.races().edid_of("NotARace"), "NotARace");
        assert_eq!(m.races().name_of("NotAnEdid"), None);
    }

    #[test]
    fn test_edid_round_trip() {
        let data = demo::data();
        let m = IdentifierMapper::new(&data);
        for race in data.races.iter() {
            assert_eq!(m.races().edid_of(&race.name), race.edid);
            assert_eq!(m.races().name_of(&race.edid), Some(race.name.as_str()));
            let name = m.races().name_of(&race.edid).unwrap();
            assert_eq!(m.races().edid_of(name), race.edid);
        }
        for stone in data.standing_stones.iter() {
            let stones = m.standing_stones();
            assert_eq!(
                stones.name_of(stones.edid_of(&stone.name)),
                Some(stone.name.as_str())
            );
        }
        for blessing in data.blessings.iter() {
            let blessings = m.blessings();
            assert_eq!(
                blessings.name_of(blessings.edid_of(&blessing.name)),
                Some(blessing.name.as_str())
            );
        }
    }

    #[test]
    fn test_edid_case_sensitive() {
        let m = mapper();
        assert_eq!(m.races().edid_of("Nord"), "NordRace");
        assert_eq!(m.races().edid_of("nord"), "nord");
        assert_eq!(m.races().name_of("nordrace"), None);
    }

    #[test]
    fn test_perk_edids_span_all_lists() {
        let m = mapper();
        assert_eq!(m.perks().edid_of("Craftsmanship"), "REQ_Smithing_Craftsmanship");
        assert_eq!(m.perks().edid_of("Steel Smithing"), "SteelSmithing");
        assert_eq!(m.perks().name_of("REQ_Block_ShieldWall"), Some("Shield Wall"));
    }

    #[test]
    fn test_numeric_ids_zero_default() {
        let m = mapper();
        assert_eq!(m.perk_lists().id_of("LoreRim v3.0.4"), 1);
        assert_eq!(m.perk_lists().id_of("Requiem"), 0);
        assert_eq!(m.perk_lists().lookup("Requiem"), None);
        assert_eq!(m.perk_lists().lookup("Vanilla"), Some(0));
        assert_eq!(m.game_mechanics().name_of(1), Some("LoreRim"));
        assert_eq!(m.game_mechanics().name_of(42), None);
        assert_eq!(m.presets().id_of("LoreRim v3.0.4"), 1);
    }

    #[test]
    fn test_positional_lookup() {
        let m = mapper();
        assert_eq!(m.race_positions().name_at(3), Some("Nord"));
        assert_eq!(m.race_positions().edid_at(3), Some("NordRace"));
        assert_eq!(m.race_positions().edid_at(200), None);
        assert_eq!(m.race_positions().index_of("NordRace"), Some(3));
        assert_eq!(m.race_positions().index_of("Nord"), Some(3));
        assert_eq!(m.race_positions().index_of("Unknown"), None);
        assert_eq!(m.standing_stone_positions().index_of("DoomLordStone"), Some(4));
        assert_eq!(m.blessing_positions().name_at(0), Some("None"));
    }

    #[test]
    fn test_positional_table_caps_at_one_byte() {
        let names: Vec<String> = (0..300).map(|i| format!("Race{}", i)).collect();
        let table = PositionalTable::from_pairs(names.iter().map(|n| (n.as_str(), n.as_str())));
        assert_eq!(table.len(), 300);
        assert_eq!(table.index_of("Race255"), Some(255));
        assert_eq!(table.index_of("Race256"), None);
    }

    #[test]
    fn test_slug_lookup() {
        let m = mapper();
        assert_eq!(
            m.display_name_for_slug(SlugKind::PerkList, "lorerim-v3-0-4"),
            Some("LoreRim v3.0.4")
        );
        assert_eq!(
            m.display_name_for_slug(SlugKind::GameMechanics, "lorerim"),
            Some("LoreRim")
        );
        assert_eq!(m.display_name_for_slug(SlugKind::Preset, "requiem"), None);
    }

    #[test]
    fn test_slug_lookup_falls_back_to_loaded_names() {
        let mut data = demo::data();
        let mut presets = data.presets.to_vec();
        presets.push(crate::reference::Preset {
            name: "Battlemage Start".to_string(),
            id: 9,
            perk_list: 1,
            game_mechanics: 1,
            race: Some("Breton".to_string()),
            description: String::new(),
        });
        data.presets = presets.into();

        let m = IdentifierMapper::new(&data);
        assert_eq!(
            m.display_name_for_slug(SlugKind::Preset, "battlemage-start"),
            Some("Battlemage Start")
        );
        assert_eq!(m.display_name_for_slug(SlugKind::PerkList, "battlemage-start"), None);
    }
}
