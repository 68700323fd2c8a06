//! Build-code codec
//!
//! A build code is a short byte string, base64url-encoded into the `b` query
//! parameter of a planner URL. The fixed header is described in [`layout`];
//! everything after it is a perk bitset in perk-list order.
//!
//! Decoding needs the loaded reference tables to know skill and perk order,
//! so a [`BuildCodec`] borrows a [`ReferenceData`] and its [`IdentifierMapper`].

mod bitstream;
pub mod layout;

pub use layout::{BuildCode, FieldView};

use crate::character::{
    Hms, OghmaChoice, RawCharacter, SkillLevel, TakenPerk, LEVEL_PSEUDO_SKILL, UNKNOWN,
};
use crate::mapper::{IdentifierMapper, PositionalTable};
use crate::reference::{PerkList, ReferenceData};
use crate::transform::TransformError;
use bitstream::BitWriter;
use layout::*;
use tracing::{debug, warn};
use url::Url;

/// Errors that can occur while decoding or encoding a build code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("URL has no build code (missing `b` parameter)")]
    NoBuildCode,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed build code: {0}")]
    MalformedBuildCode(String),

    #[error("Unsupported build code version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown perk list: {0}")]
    UnknownPerkList(String),

    #[error("Unknown game mechanics: {0}")]
    UnknownGameMechanics(String),
}

impl From<TransformError> for CodecError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::UnknownPerkList(name) => CodecError::UnknownPerkList(name),
            TransformError::UnknownGameMechanics(name) => CodecError::UnknownGameMechanics(name),
        }
    }
}

/// Result of decoding a planner URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub character: RawCharacter,
    /// Preset named by the `p` parameter, when present and in range
    pub preset_name: Option<String>,
}

/// The `b` and `p` parameters of a planner URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParams {
    pub build_code: BuildCode,
    /// Raw `p` value, unparsed
    pub preset: Option<String>,
}

impl UrlParams {
    /// Read the parameters from an absolute URL or a bare query string
    pub fn parse(url: &str) -> Result<Self, CodecError> {
        let url = parse_url(url)?;

        let mut build_param = None;
        let mut preset_param = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "b" if build_param.is_none() => build_param = Some(value.into_owned()),
                "p" if preset_param.is_none() => preset_param = Some(value.into_owned()),
                _ => {}
            }
        }

        let code = build_param.ok_or(CodecError::NoBuildCode)?;
        Ok(Self {
            build_code: BuildCode::parse(&code)?,
            preset: preset_param,
        })
    }
}

/// Decodes and encodes build codes against one set of reference tables
#[derive(Debug, Clone, Copy)]
pub struct BuildCodec<'a> {
    data: &'a ReferenceData,
    mapper: &'a IdentifierMapper,
    base_url: &'a str,
}

impl<'a> BuildCodec<'a> {
    pub fn new(data: &'a ReferenceData, mapper: &'a IdentifierMapper, base_url: &'a str) -> Self {
        Self {
            data,
            mapper,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
    }

    /// Decode a planner URL into a [`RawCharacter`]
    ///
    /// Accepts absolute URLs and bare query strings such as `?b=...&p=1`.
    pub fn decode(&self, url: &str) -> Result<Decoded, CodecError> {
        let params = UrlParams::parse(url)?;
        let character = self.decode_code(&params.build_code)?;

        let preset_name = params
            .preset
            .and_then(|p| p.trim().parse::<usize>().ok())
            .and_then(|index| self.data.preset_at(index))
            .map(|preset| preset.name.clone());

        Ok(Decoded {
            character,
            preset_name,
        })
    }

    /// Decode raw build-code bytes
    pub fn decode_code(&self, code: &BuildCode) -> Result<RawCharacter, CodecError> {
        let version = code.version()?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let perk_list_id = code.byte(PERK_LIST)?;
        let game_mechanics_id = code.byte(GAME_MECHANICS)?;
        let perk_list = self
            .data
            .perk_list_by_id(perk_list_id)
            .ok_or_else(|| CodecError::UnknownPerkList(format!("id {}", perk_list_id)))?;
        if self.data.game_mechanics_by_id(game_mechanics_id).is_none() {
            return Err(CodecError::UnknownGameMechanics(format!(
                "id {}",
                game_mechanics_id
            )));
        }

        let level = code.byte(LEVEL)?;
        let hms_increases = Hms {
            health: code.byte(HEALTH)?,
            magicka: code.byte(MAGICKA)?,
            stamina: code.byte(STAMINA)?,
        };

        let mut skill_levels: Vec<SkillLevel> = perk_list
            .skill_names
            .iter()
            .zip(code.slice(SKILLS, SKILL_BYTES)?)
            .map(|(skill, &level)| SkillLevel::new(skill.as_str(), level))
            .collect();
        if version == 2 {
            skill_levels.push(SkillLevel::new(LEVEL_PSEUDO_SKILL, level));
        }

        let mut oghma = code.byte(OGHMA)?;
        if version == 2 {
            oghma >>= OGHMA_SHIFT_V2;
        }

        let race = resolve_position(self.mapper.race_positions(), code.byte(RACE)?, "race");
        let standing_stone = resolve_position(
            self.mapper.standing_stone_positions(),
            code.byte(STANDING_STONE)?,
            "standing stone",
        );
        let blessing = resolve_position(
            self.mapper.blessing_positions(),
            code.byte(BLESSING)?,
            "blessing",
        );

        let perks_taken = read_perks(code, perk_list);

        debug!(
            version,
            perk_list = %perk_list.name,
            perks = perks_taken.len(),
            "decoded build code"
        );

        Ok(RawCharacter {
            version,
            perk_list_id,
            game_mechanics_id,
            level,
            hms_increases,
            skill_levels,
            oghma_choice: OghmaChoice::from_index(oghma),
            race,
            standing_stone,
            blessing,
            perks_taken,
        })
    }

    /// Encode a character as a planner URL, always as version 2
    pub fn encode(
        &self,
        character: &RawCharacter,
        perk_list_name: &str,
        game_mechanics_name: &str,
    ) -> Result<String, CodecError> {
        let (code, perk_list) = self.encode_code(character, perk_list_name, game_mechanics_name)?;

        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        let mut url = format!("{}{}b={}", self.base_url, separator, code.to_code());
        if let Some(index) = self.data.preset_index_for_perk_list(perk_list.id) {
            url.push_str(&format!("&p={}", index));
        }
        Ok(url)
    }

    /// Encode a character to raw build-code bytes
    pub fn encode_bytes(
        &self,
        character: &RawCharacter,
        perk_list_name: &str,
        game_mechanics_name: &str,
    ) -> Result<BuildCode, CodecError> {
        self.encode_code(character, perk_list_name, game_mechanics_name)
            .map(|(code, _)| code)
    }

    fn encode_code(
        &self,
        character: &RawCharacter,
        perk_list_name: &str,
        game_mechanics_name: &str,
    ) -> Result<(BuildCode, &'a PerkList), CodecError> {
        let perk_list = self
            .mapper
            .perk_lists()
            .lookup(perk_list_name)
            .and_then(|id| self.data.perk_list_by_id(id))
            .ok_or_else(|| CodecError::UnknownPerkList(perk_list_name.to_string()))?;
        let game_mechanics_id = self
            .mapper
            .game_mechanics()
            .lookup(game_mechanics_name)
            .ok_or_else(|| CodecError::UnknownGameMechanics(game_mechanics_name.to_string()))?;

        let perk_bytes = perk_list.perks.len().div_ceil(8);
        let mut bytes = Vec::with_capacity(HEADER_LEN + perk_bytes);
        bytes.extend_from_slice(&[
            ENCODED_VERSION,
            perk_list.id,
            0,
            game_mechanics_id,
            0,
            character.level,
            character.hms_increases.health,
            character.hms_increases.magicka,
            character.hms_increases.stamina,
        ]);

        let mut skills = [0u8; SKILL_BYTES];
        for (slot, skill) in skills.iter_mut().zip(&perk_list.skill_names) {
            *slot = character.skill_level(skill).unwrap_or(0);
        }
        bytes.extend_from_slice(&skills);

        bytes.push(character.oghma_choice.index() << OGHMA_SHIFT_V2);
        bytes.push(position_of(self.mapper.race_positions(), &character.race));
        bytes.push(position_of(
            self.mapper.standing_stone_positions(),
            &character.standing_stone,
        ));
        bytes.push(position_of(
            self.mapper.blessing_positions(),
            &character.blessing,
        ));
        debug_assert_eq!(bytes.len(), HEADER_LEN);

        let mut perks = BitWriter::new();
        for perk in &perk_list.perks {
            perks.write_bit(character.has_perk(&perk.name, perk.skill));
        }
        bytes.extend(perks.finish());

        debug!(
            perk_list = %perk_list.name,
            len = bytes.len(),
            "encoded build code"
        );
        Ok((BuildCode::from_bytes(bytes), perk_list))
    }
}

fn parse_url(input: &str) -> Result<Url, CodecError> {
    let input = input.trim();
    match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse("http://localhost/")
                .map_err(|e| CodecError::InvalidUrl(e.to_string()))?;
            base.join(input)
                .map_err(|e| CodecError::InvalidUrl(format!("{}: {}", input, e)))
        }
        Err(e) => Err(CodecError::InvalidUrl(format!("{}: {}", input, e))),
    }
}

fn resolve_position(table: &PositionalTable, index: u8, kind: &str) -> String {
    match table.edid_at(index) {
        Some(edid) => edid.to_string(),
        None => {
            debug!(kind, index, "index out of range, using sentinel");
            UNKNOWN.to_string()
        }
    }
}

fn position_of(table: &PositionalTable, key: &str) -> u8 {
    table.index_of(key).unwrap_or(0)
}

/// Perks whose bit is set, in perk-list order; bits past the end read as unset
fn read_perks(code: &BuildCode, perk_list: &PerkList) -> Vec<TakenPerk> {
    let mut bits = code.perk_bits();
    if bits.remaining_bits() < perk_list.perks.len() {
        warn!(
            perks = perk_list.perks.len(),
            available = bits.remaining_bits(),
            "perk bitset shorter than perk list"
        );
    }

    perk_list
        .perks
        .iter()
        .filter(|_| bits.read_bit().unwrap_or(false))
        .map(|perk| TakenPerk {
            name: perk.name.clone(),
            skill: perk.skill,
        })
        .collect()
}
