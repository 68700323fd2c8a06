//! Byte layout of a build code
//!
//! ```text
//! offset  field
//! 0       version (1 or 2)
//! 1       perk list id
//! 2       race list (reserved, 0)
//! 3       game mechanics id
//! 4       blessing list (reserved, 0)
//! 5       level
//! 6..9    health, magicka, stamina increases
//! 9..27   18 skill levels, perk-list skill order
//! 27      oghma choice (high nibble in version 2)
//! 28      race index
//! 29      standing stone index
//! 30      blessing index
//! 31..    perk bitset, MSB first
//! ```

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use super::bitstream::BitReader;
use super::CodecError;

pub const VERSION: usize = 0;
pub const PERK_LIST: usize = 1;
pub const RACE_LIST: usize = 2;
pub const GAME_MECHANICS: usize = 3;
pub const BLESSING_LIST: usize = 4;
pub const LEVEL: usize = 5;
pub const HEALTH: usize = 6;
pub const MAGICKA: usize = 7;
pub const STAMINA: usize = 8;
pub const SKILLS: usize = 9;
pub const SKILL_BYTES: usize = 18;
pub const OGHMA: usize = 27;
pub const RACE: usize = 28;
pub const STANDING_STONE: usize = 29;
pub const BLESSING: usize = 30;
pub const PERKS: usize = 31;

/// Fixed-size part before the perk bitset
pub const HEADER_LEN: usize = PERKS;

/// Versions this codec reads
pub const SUPPORTED_VERSIONS: [u8; 2] = [1, 2];

/// Version this codec writes
pub const ENCODED_VERSION: u8 = 2;

/// Version 2 stores the oghma choice in the high nibble
pub const OGHMA_SHIFT_V2: u32 = 4;

/// Standard alphabet, padding optional, tolerant of non-canonical trailing bits
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Named header fields for dumps: (offset, length, name)
pub const FIELDS: &[(usize, usize, &str)] = &[
    (VERSION, 1, "version"),
    (PERK_LIST, 1, "perk list"),
    (RACE_LIST, 1, "race list (reserved)"),
    (GAME_MECHANICS, 1, "game mechanics"),
    (BLESSING_LIST, 1, "blessing list (reserved)"),
    (LEVEL, 1, "level"),
    (HEALTH, 1, "health increases"),
    (MAGICKA, 1, "magicka increases"),
    (STAMINA, 1, "stamina increases"),
    (SKILLS, SKILL_BYTES, "skill levels"),
    (OGHMA, 1, "oghma choice"),
    (RACE, 1, "race"),
    (STANDING_STONE, 1, "standing stone"),
    (BLESSING, 1, "blessing"),
];

/// One labelled slice of a build code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView<'a> {
    pub offset: usize,
    pub name: &'static str,
    /// Bytes present for the field; shorter than declared when truncated
    pub bytes: &'a [u8],
}

/// Raw bytes of a build code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCode {
    bytes: Vec<u8>,
}

impl BuildCode {
    /// Decode the text of a `b` parameter (URL-safe or standard base64)
    pub fn parse(code: &str) -> Result<Self, CodecError> {
        // Query decoders turn '+' into ' '
        let standard: String = code
            .trim()
            .chars()
            .map(|ch| match ch {
                '-' | ' ' => '+',
                '_' => '/',
                other => other,
            })
            .collect();

        let bytes = LENIENT_STANDARD
            .decode(standard.as_bytes())
            .map_err(|e| CodecError::MalformedBuildCode(format!("invalid base64: {}", e)))?;
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// URL-safe base64 without padding
    pub fn to_code(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte at a header offset
    pub fn byte(&self, offset: usize) -> Result<u8, CodecError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or_else(|| self.truncated(offset + 1))
    }

    /// `len` bytes starting at `offset`
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8], CodecError> {
        self.bytes
            .get(offset..offset + len)
            .ok_or_else(|| self.truncated(offset + len))
    }

    pub fn version(&self) -> Result<u8, CodecError> {
        self.byte(VERSION)
    }

    /// Bytes after the fixed header
    pub fn perk_bytes(&self) -> &[u8] {
        self.bytes.get(PERKS..).unwrap_or(&[])
    }

    pub(crate) fn perk_bits(&self) -> BitReader<'_> {
        BitReader::new(self.perk_bytes())
    }

    /// Display hex dump of raw bytes
    pub fn hex_dump(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Header fields followed by the perk bitset
    pub fn fields(&self) -> Vec<FieldView<'_>> {
        let mut views: Vec<FieldView<'_>> = FIELDS
            .iter()
            .map(|&(offset, len, name)| {
                let start = offset.min(self.bytes.len());
                let end = (offset + len).min(self.bytes.len());
                FieldView {
                    offset,
                    name,
                    bytes: &self.bytes[start..end],
                }
            })
            .collect();
        views.push(FieldView {
            offset: PERKS,
            name: "perk bitset",
            bytes: self.perk_bytes(),
        });
        views
    }

    fn truncated(&self, needed: usize) -> CodecError {
        CodecError::MalformedBuildCode(format!(
            "build code too short: expected at least {} bytes, got {}",
            needed,
            self.bytes.len()
        ))
    }
}
