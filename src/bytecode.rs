//! Sequential reader over script bytecode.
//!
//! Every byte read through a [`ByteCursor`] is appended to the current
//! [`Frame`], so each decoded instruction can later be listed next to the
//! exact bytes it was decoded from. Operand-level readers (pointers, params,
//! strings) are layered on top in `operand` and `pointer`.

use crate::error::DecodeError;

/// The byte range consumed while decoding one instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Offset of the first byte within the script
    pub start: u16,
    /// Raw bytes in the order they were read
    pub bytes: Vec<u8>,
}

impl Frame {
    /// Offset just past the last byte of this frame
    pub fn end(&self) -> usize {
        self.start as usize + self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn contains(&self, address: u16) -> bool {
        let address = address as usize;
        address >= self.start as usize && address < self.end()
    }

    /// Hex dump split into chunks of at most `width` bytes, bytes separated
    /// by single spaces.
    pub fn hex_chunks(&self, width: usize) -> Vec<String> {
        self.bytes
            .chunks(width.max(1))
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|b| format!("{:02X}", b))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

/// Reader over an immutable bytecode buffer.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    frame: Frame,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor {
            data,
            pos: 0,
            frame: Frame::default(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// True once every byte has been consumed. Checked before starting an
    /// instruction, this is the clean end of a script.
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Start a new frame at the current position, dropping anything
    /// accumulated so far.
    pub fn begin_frame(&mut self) {
        self.frame = Frame {
            start: self.pos as u16,
            bytes: Vec::new(),
        };
    }

    /// Hand back the current frame and immediately begin the next one.
    pub fn end_frame(&mut self) -> Frame {
        let frame = std::mem::take(&mut self.frame);
        self.begin_frame();
        frame
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or(DecodeError::UnexpectedEnd { offset: self.pos })?;
        self.pos += 1;
        self.frame.bytes.push(b);
        Ok(b)
    }

    /// Little-endian 16-bit word
    pub fn read_word(&mut self) -> Result<u16, DecodeError> {
        let lo = self.read_byte()? as u16;
        let hi = self.read_byte()? as u16;
        Ok(lo | (hi << 8))
    }

    pub fn read_signed_word(&mut self) -> Result<i16, DecodeError> {
        Ok(self.read_word()? as i16)
    }

    /// Bytes up to, not including, `terminator`. The terminator itself is
    /// consumed.
    pub fn read_bytes_until(&mut self, terminator: u8) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        loop {
            let b = self.read_byte()?;
            if b == terminator {
                return Ok(out);
            }
            out.push(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn words_are_little_endian() {
        let data = [0x34, 0x12, 0xFE, 0xFF];
        let mut r = ByteCursor::new(&data);
        assert_eq!(r.read_word().unwrap(), 0x1234);
        assert_eq!(r.read_signed_word().unwrap(), -2);
        assert!(r.is_exhausted());
    }

    #[test]
    fn frames_track_consumed_bytes() {
        let data = [0x2C, 0x01, 0x2C, 0x02];
        let mut r = ByteCursor::new(&data);
        r.begin_frame();
        r.read_byte().unwrap();
        r.read_byte().unwrap();
        let first = r.end_frame();
        assert_eq!(first.start, 0);
        assert_eq!(first.bytes, vec![0x2C, 0x01]);
        assert_eq!(first.end(), 2);

        r.read_word().unwrap();
        let second = r.end_frame();
        assert_eq!(second.start, 2);
        assert_eq!(second.bytes, vec![0x2C, 0x02]);
        assert!(second.contains(3));
        assert!(!second.contains(4));
    }

    #[test]
    fn reading_past_the_end_is_unexpected_end() {
        let data = [0x01];
        let mut r = ByteCursor::new(&data);
        assert_eq!(
            r.read_word(),
            Err(DecodeError::UnexpectedEnd { offset: 1 })
        );
    }

    #[test]
    fn hex_chunks_wrap_at_width() {
        let frame = Frame {
            start: 0,
            bytes: (0u8..10).collect(),
        };
        assert_eq!(
            frame.hex_chunks(8),
            vec!["00 01 02 03 04 05 06 07".to_string(), "08 09".to_string()]
        );
    }

    #[test]
    fn read_until_terminator() {
        let data = [b'h', b'i', 0, 7];
        let mut r = ByteCursor::new(&data);
        assert_eq!(r.read_bytes_until(0).unwrap(), b"hi".to_vec());
        assert_eq!(r.peek_byte(), Some(7));
    }
}
