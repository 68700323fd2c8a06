//! Reference data for Skyrim builds
//!
//! Six tables (races, standing stones, blessings, perk lists, game-mechanics
//! variants and presets) are fetched through a [`DocumentSource`], validated
//! once at the load boundary, and cached per repository instance.
//!
//! Array position is the build-code id for races, standing stones and blessings.
//! Perk lists, game mechanics and presets carry their own `id` field.

mod records;
mod source;

pub use records::{
    Blessing, DerivedAttributes, GameMechanics, Leveling, Perk, PerkList, Preset, Race, Record,
    StandingStone, Table, ATTRIBUTE_COUNT, SKILL_COUNT,
};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{DirectorySource, DocumentSource, FetchError, MemorySource};

use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Errors raised while loading a reference table
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Failed to fetch {table} from {path}: {source}")]
    Fetch {
        table: Table,
        path: String,
        source: FetchError,
    },

    #[error("Invalid JSON in {table} document: {source}")]
    Json {
        table: Table,
        source: serde_json::Error,
    },

    #[error("Unexpected shape for {table} document: {message}")]
    Schema { table: Table, message: String },

    #[error("Invalid {table} record {record:?}: {message}")]
    Validation {
        table: Table,
        record: String,
        message: String,
    },
}

/// Document path for each table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePaths {
    pub races: String,
    pub standing_stones: String,
    pub blessings: String,
    pub perk_lists: String,
    pub game_mechanics: String,
    pub presets: String,
}

impl Default for ReferencePaths {
    fn default() -> Self {
        Self {
            races: Table::Races.default_path().to_string(),
            standing_stones: Table::StandingStones.default_path().to_string(),
            blessings: Table::Blessings.default_path().to_string(),
            perk_lists: Table::PerkLists.default_path().to_string(),
            game_mechanics: Table::GameMechanics.default_path().to_string(),
            presets: Table::Presets.default_path().to_string(),
        }
    }
}

impl ReferencePaths {
    pub fn path(&self, table: Table) -> &str {
        match table {
            Table::Races => &self.races,
            Table::StandingStones => &self.standing_stones,
            Table::Blessings => &self.blessings,
            Table::PerkLists => &self.perk_lists,
            Table::GameMechanics => &self.game_mechanics,
            Table::Presets => &self.presets,
        }
    }
}

/// All six tables, loaded and validated
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub races: Arc<[Race]>,
    pub standing_stones: Arc<[StandingStone]>,
    pub blessings: Arc<[Blessing]>,
    pub perk_lists: Arc<[PerkList]>,
    pub game_mechanics: Arc<[GameMechanics]>,
    pub presets: Arc<[Preset]>,
}

impl ReferenceData {
    /// Assemble reference data from tables that were built or validated elsewhere
    pub fn from_tables(
        races: Vec<Race>,
        standing_stones: Vec<StandingStone>,
        blessings: Vec<Blessing>,
        perk_lists: Vec<PerkList>,
        game_mechanics: Vec<GameMechanics>,
        presets: Vec<Preset>,
    ) -> Self {
        Self {
            races: races.into(),
            standing_stones: standing_stones.into(),
            blessings: blessings.into(),
            perk_lists: perk_lists.into(),
            game_mechanics: game_mechanics.into(),
            presets: presets.into(),
        }
    }

    /// Perk list by its declared id
    pub fn perk_list_by_id(&self, id: u8) -> Option<&PerkList> {
        self.perk_lists.iter().find(|p| p.id == id)
    }

    pub fn perk_list_by_name(&self, name: &str) -> Option<&PerkList> {
        self.perk_lists.iter().find(|p| p.name == name)
    }

    /// Game mechanics by its declared id (not array position)
    pub fn game_mechanics_by_id(&self, id: u8) -> Option<&GameMechanics> {
        self.game_mechanics.iter().find(|g| g.id == id)
    }

    pub fn game_mechanics_by_name(&self, name: &str) -> Option<&GameMechanics> {
        self.game_mechanics.iter().find(|g| g.name == name)
    }

    /// Preset by array position, as carried in the `p` URL parameter
    pub fn preset_at(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    /// Array position of the first preset built on the given perk list
    pub fn preset_index_for_perk_list(&self, perk_list_id: u8) -> Option<usize> {
        self.presets.iter().position(|p| p.perk_list == perk_list_id)
    }
}

type Slot<T> = Mutex<Option<Arc<[T]>>>;

#[derive(Default)]
struct TableCache {
    races: Slot<Race>,
    standing_stones: Slot<StandingStone>,
    blessings: Slot<Blessing>,
    perk_lists: Slot<PerkList>,
    game_mechanics: Slot<GameMechanics>,
    presets: Slot<Preset>,
}

fn lock<T>(slot: &Slot<T>) -> MutexGuard<'_, Option<Arc<[T]>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loads reference tables from a source and caches each after its first
/// successful load. Independent instances have independent caches.
pub struct ReferenceRepository<S> {
    source: S,
    paths: ReferencePaths,
    cache: TableCache,
}

impl<S: DocumentSource> ReferenceRepository<S> {
    pub fn new(source: S) -> Self {
        Self::with_paths(source, ReferencePaths::default())
    }

    pub fn with_paths(source: S, paths: ReferencePaths) -> Self {
        Self {
            source,
            paths,
            cache: TableCache::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn paths(&self) -> &ReferencePaths {
        &self.paths
    }

    pub fn load_races(&self) -> Result<Arc<[Race]>, ReferenceError> {
        self.cached(&self.cache.races)
    }

    pub fn load_standing_stones(&self) -> Result<Arc<[StandingStone]>, ReferenceError> {
        self.cached(&self.cache.standing_stones)
    }

    pub fn load_blessings(&self) -> Result<Arc<[Blessing]>, ReferenceError> {
        self.cached(&self.cache.blessings)
    }

    pub fn load_perk_lists(&self) -> Result<Arc<[PerkList]>, ReferenceError> {
        self.cached(&self.cache.perk_lists)
    }

    pub fn load_game_mechanics(&self) -> Result<Arc<[GameMechanics]>, ReferenceError> {
        self.cached(&self.cache.game_mechanics)
    }

    pub fn load_presets(&self) -> Result<Arc<[Preset]>, ReferenceError> {
        self.cached(&self.cache.presets)
    }

    /// Drop every cached table; the next load fetches again
    pub fn clear_cache(&self) {
        *lock(&self.cache.races) = None;
        *lock(&self.cache.standing_stones) = None;
        *lock(&self.cache.blessings) = None;
        *lock(&self.cache.perk_lists) = None;
        *lock(&self.cache.game_mechanics) = None;
        *lock(&self.cache.presets) = None;
        debug!("reference cache cleared");
    }

    /// Load tables one after another (targets without threads)
    pub fn load_sequential(&self) -> Result<ReferenceData, ReferenceError> {
        Ok(ReferenceData {
            races: self.load_races()?,
            standing_stones: self.load_standing_stones()?,
            blessings: self.load_blessings()?,
            perk_lists: self.load_perk_lists()?,
            game_mechanics: self.load_game_mechanics()?,
            presets: self.load_presets()?,
        })
    }

    /// The slot's lock is held across the fetch so a table is fetched at most
    /// once even when callers race.
    fn cached<T: Record>(&self, slot: &Slot<T>) -> Result<Arc<[T]>, ReferenceError> {
        let mut guard = lock(slot);
        if let Some(table) = guard.as_ref() {
            debug!(table = %T::TABLE, "reference cache hit");
            return Ok(Arc::clone(table));
        }

        let path = self.paths.path(T::TABLE);
        let document = self
            .source
            .fetch(path)
            .map_err(|source| ReferenceError::Fetch {
                table: T::TABLE,
                path: path.to_string(),
                source,
            })?;
        let records: Arc<[T]> = parse_table::<T>(&document)?.into();
        info!(table = %T::TABLE, records = records.len(), "loaded reference table");

        *guard = Some(Arc::clone(&records));
        Ok(records)
    }
}

impl<S: DocumentSource + Sync> ReferenceRepository<S> {
    /// Load all six tables, fetching them in parallel
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_all(&self) -> Result<ReferenceData, ReferenceError> {
        std::thread::scope(|scope| {
            let races = scope.spawn(|| self.load_races());
            let standing_stones = scope.spawn(|| self.load_standing_stones());
            let blessings = scope.spawn(|| self.load_blessings());
            let perk_lists = scope.spawn(|| self.load_perk_lists());
            let game_mechanics = scope.spawn(|| self.load_game_mechanics());
            let presets = scope.spawn(|| self.load_presets());

            Ok(ReferenceData {
                races: join(races)?,
                standing_stones: join(standing_stones)?,
                blessings: join(blessings)?,
                perk_lists: join(perk_lists)?,
                game_mechanics: join(game_mechanics)?,
                presets: join(presets)?,
            })
        })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load_all(&self) -> Result<ReferenceData, ReferenceError> {
        self.load_sequential()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn join<T>(
    handle: std::thread::ScopedJoinHandle<'_, Result<T, ReferenceError>>,
) -> Result<T, ReferenceError> {
    handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}

/// Parse and validate one table document
pub fn parse_table<T: Record>(document: &str) -> Result<Vec<T>, ReferenceError> {
    let value: Value = serde_json::from_str(document).map_err(|source| ReferenceError::Json {
        table: T::TABLE,
        source,
    })?;

    let items = unwrap_envelope::<T>(value)?;
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let record_name = item
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let record: T = serde_json::from_value(item).map_err(|e| ReferenceError::Validation {
            table: T::TABLE,
            record: record_name.clone(),
            message: e.to_string(),
        })?;
        record
            .validate()
            .map_err(|message| ReferenceError::Validation {
                table: T::TABLE,
                record: record_name,
                message,
            })?;
        records.push(record);
    }
    Ok(records)
}

fn unwrap_envelope<T: Record>(value: Value) -> Result<Vec<Value>, ReferenceError> {
    let schema = |message: String| ReferenceError::Schema {
        table: T::TABLE,
        message,
    };

    let array = match T::ENVELOPE {
        None => value,
        Some(key) => match value {
            Value::Object(mut map) => map
                .remove(key)
                .ok_or_else(|| schema(format!("expected an object with a {:?} array", key)))?,
            _ => return Err(schema(format!("expected an object with a {:?} array", key))),
        },
    };

    match array {
        Value::Array(items) => Ok(items),
        other => Err(schema(format!("expected an array, got {}", json_kind(&other)))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Demo ruleset shipped in `share/data`
#[cfg(test)]
pub(crate) mod demo {
    use super::*;

    pub const RACES: &str = include_str!("../../../share/data/races.json");
    pub const STANDING_STONES: &str = include_str!("../../../share/data/standingStones.json");
    pub const BLESSINGS: &str = include_str!("../../../share/data/blessings.json");
    pub const PERK_LISTS: &str = include_str!("../../../share/data/perkLists.json");
    pub const GAME_MECHANICS: &str = include_str!("../../../share/data/gameMechanics.json");
    pub const PRESETS: &str = include_str!("../../../share/data/presets.json");

    pub fn source() -> MemorySource {
        MemorySource::new()
            .with("races.json", RACES)
            .with("standingStones.json", STANDING_STONES)
            .with("blessings.json", BLESSINGS)
            .with("perkLists.json", PERK_LISTS)
            .with("gameMechanics.json", GAME_MECHANICS)
            .with("presets.json", PRESETS)
    }

    pub fn data() -> ReferenceData {
        ReferenceRepository::new(source()).load_all().unwrap()
    }
}
