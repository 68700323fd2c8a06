//! # skyplan
//!
//! Skyrim build planner library - reference data and build-code conversion.
//!
//! This library provides functionality to:
//! - Load and validate the reference tables of a ruleset (races, standing
//!   stones, blessings, perk lists, game mechanics, presets)
//! - Decode a planner URL (`?b=<code>&p=<preset>`) into a build
//! - Encode a build back into a planner URL
//!
//! ## Example
//!
//! ```no_run
//! use skyplan::{BuildPlanner, DirectorySource, ReferenceRepository};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = ReferenceRepository::new(DirectorySource::new("share/data"));
//! let planner = BuildPlanner::from_repository(&repository)?;
//!
//! let imported = planner.import_url("https://planner.example/?b=AgEAAQAK&p=1")?;
//! for warning in &imported.warnings {
//!     println!("warning: {}", warning);
//! }
//!
//! let exported = planner.export_url(&imported.build, &imported.perk_list, &imported.game_mechanics)?;
//! println!("{}", exported.url);
//! # Ok(())
//! # }
//! ```

pub mod character;
pub mod codec;
pub mod mapper;
pub mod planner;
pub mod reference;
pub mod transform;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used items
#[doc(inline)]
pub use character::{
    AttributeAssignments, BuildState, Hms, OghmaBonus, OghmaChoice, PerkSelection, RawCharacter,
    SkillLevel, TakenPerk,
};
#[doc(inline)]
pub use codec::{BuildCode, BuildCodec, CodecError, Decoded, UrlParams};
#[doc(inline)]
pub use mapper::{IdentifierMapper, SlugKind};
#[doc(inline)]
pub use planner::{BuildPlanner, Exported, Imported, DEFAULT_BASE_URL};
#[doc(inline)]
pub use transform::{
    to_build_state, to_raw_character, ReferenceKind, TransformError, Transformed, Warning,
};

// Reference data
#[doc(inline)]
pub use reference::{
    DirectorySource, DocumentSource, FetchError, MemorySource, ReferenceData, ReferenceError,
    ReferencePaths, ReferenceRepository, Table,
};
#[cfg(feature = "http")]
#[doc(inline)]
pub use reference::HttpSource;
