//! MSB-first bit reader and writer for the perk bitset

/// Reads single bits from a byte slice, bit 7 of each byte first
pub(crate) struct BitReader<'a> {
    bytes: &'a [u8],
    bit_offset: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            bit_offset: 0,
        }
    }

    /// Read one bit; `None` once the stream is exhausted
    pub fn read_bit(&mut self) -> Option<bool> {
        let byte_idx = self.bit_offset / 8;
        let bit_idx = 7 - (self.bit_offset % 8); // MSB (bit 7) down to LSB (bit 0)

        let byte = *self.bytes.get(byte_idx)?;
        self.bit_offset += 1;
        Some((byte >> bit_idx) & 1 == 1)
    }

    /// Returns the number of bits remaining in the stream
    pub fn remaining_bits(&self) -> usize {
        let total_bits = self.bytes.len() * 8;
        total_bits.saturating_sub(self.bit_offset)
    }
}

/// Packs bits MSB-first; a trailing partial byte is zero-filled in its low bits
#[derive(Default)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    bit_offset: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bit_offset: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        let byte_idx = self.bit_offset / 8;
        let bit_idx = 7 - (self.bit_offset % 8); // MSB (bit 7) down to LSB (bit 0)

        // Extend bytes vector if needed
        if byte_idx >= self.bytes.len() {
            self.bytes.push(0);
        }

        if bit {
            self.bytes[byte_idx] |= 1 << bit_idx;
        }
        self.bit_offset += 1;
    }

    /// Get the final bytes (padded to byte boundary)
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_roundtrip() {
        let pattern = [
            true, false, true, false, true, true, true, true, true, true, true, true, true, false,
            true,
        ];
        let mut writer = BitWriter::new();
        for &bit in &pattern {
            writer.write_bit(bit);
        }
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 2);

        let mut reader = BitReader::new(&bytes);
        for &bit in &pattern {
            assert_eq!(reader.read_bit(), Some(bit));
        }
        assert_eq!(reader.read_bit(), Some(false)); // padding
        assert_eq!(reader.read_bit(), None);
    }

    #[test]
    fn test_msb_first() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        for _ in 0..7 {
            writer.write_bit(false);
        }
        writer.write_bit(true);
        assert_eq!(writer.finish(), vec![0b1000_0000, 0b1000_0000]);
    }

    #[test]
    fn test_zero_bits_still_allocate() {
        let mut writer = BitWriter::new();
        for _ in 0..9 {
            writer.write_bit(false);
        }
        assert_eq!(writer.finish(), vec![0, 0]);
        assert!(BitWriter::new().finish().is_empty());
    }

    #[test]
    fn test_remaining_bits() {
        let mut reader = BitReader::new(&[0xFF, 0xFF]);
        assert_eq!(reader.remaining_bits(), 16);
        for _ in 0..3 {
            reader.read_bit();
        }
        assert_eq!(reader.remaining_bits(), 13);
    }
}
