//! Most-significant-bit-first reader for bit-packed resource data.
//!
//! Fields never straddle a byte: asking for more bits than remain in the
//! current byte is an error even if later bytes exist.

use crate::error::BitsError;
use bitreader::BitReader;

pub struct BitsReader<'a> {
    reader: BitReader<'a>,
}

impl<'a> BitsReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitsReader {
            reader: BitReader::new(data),
        }
    }

    /// Bit offset of the next read
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    pub fn is_exhausted(&self) -> bool {
        self.reader.remaining() == 0
    }

    /// Read `width` bits (at most 8) as the low bits of a byte.
    pub fn read_bits(&mut self, width: u8) -> Result<u8, BitsError> {
        if width > 8 {
            return Err(BitsError::InvalidWidth { width });
        }
        let position = self.reader.position();
        if self.reader.remaining() == 0 {
            return Err(BitsError::EndOfInput { position });
        }
        let left_in_byte = 8 - (position % 8) as u8;
        if width > left_in_byte {
            return Err(BitsError::UnexpectedEnd { position, width });
        }
        Ok(self.reader.read_u8(width)?)
    }
}
