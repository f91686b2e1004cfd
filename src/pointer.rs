//! Variable references
//!
//! A variable operand is a 16-bit id whose high bits select one of five
//! addressing modes. Indirect ids carry a second word: either a constant
//! offset or, when its bit 13 is set, the number of a word variable whose
//! runtime value is added to the base.
//!
//! ```text
//!   000a aaaa aaaa aaaa   word variable, 13-bit address
//!   1aaa aaaa aaaa aaaa   bit variable, 15-bit address
//!   01x0 0000 0000 aaaa   local variable, 4-bit address
//!   xx1a aaaa aaaa aaaa   indirect word, followed by an offset word
//! ```

use crate::bytecode::ByteCursor;
use crate::error::{DecodeError, RunError};
use crate::symbol::{Namespace, SymbolTable};
use crate::vm::{ExecutionContext, MAX_LOCALS, MAX_WORDS};

const INDIRECT: u16 = 0x2000;

/// The addressing mode of a [`VarRef`], without its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Word,
    Bit,
    Local,
    Indirect,
    IndirectDeref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarRef {
    Word(u16),
    Bit(u16),
    Local(u8),
    /// Word at `base + offset`
    Indirect { base: u16, offset: u16 },
    /// Word at `base + value of word variable index`
    IndirectDeref { base: u16, index: u16 },
}

/// A resolved storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Word(u16),
    Bit(u16),
    Local(u8),
}

fn is_local(raw: u16) -> bool {
    matches!(raw & 0xFFF0, 0x4000 | 0x6000)
}

impl VarRef {
    /// True when `raw` is followed by an offset word in the bytecode.
    pub fn needs_offset(raw: u16) -> bool {
        raw & 0xE000 != 0 && raw & 0x8000 == 0 && !is_local(raw) && raw & INDIRECT != 0
    }

    /// Classify a raw id (and its offset word, for indirect ids). Tests run
    /// in priority order: word, bit, local, indirect.
    pub fn classify(raw: u16, offset: Option<u16>) -> Option<VarRef> {
        if raw & 0xE000 == 0 {
            Some(VarRef::Word(raw & 0x1FFF))
        } else if raw & 0x8000 != 0 {
            Some(VarRef::Bit(raw & 0x7FFF))
        } else if is_local(raw) {
            Some(VarRef::Local((raw & 0x000F) as u8))
        } else if raw & INDIRECT != 0 {
            let base = raw & 0x1FFF;
            match offset {
                Some(o) if o & INDIRECT == 0 => Some(VarRef::Indirect { base, offset: o }),
                Some(o) => Some(VarRef::IndirectDeref {
                    base,
                    index: o & 0x1FFF,
                }),
                None => None,
            }
        } else {
            None
        }
    }

    /// The raw id and optional offset word that decode back to this
    /// reference.
    pub fn encode(&self) -> (u16, Option<u16>) {
        match *self {
            VarRef::Word(a) => (a & 0x1FFF, None),
            VarRef::Bit(a) => (0x8000 | (a & 0x7FFF), None),
            VarRef::Local(a) => (0x4000 | (a as u16 & 0x000F), None),
            VarRef::Indirect { base, offset } => {
                (INDIRECT | (base & 0x1FFF), Some(offset & !INDIRECT))
            }
            VarRef::IndirectDeref { base, index } => {
                (INDIRECT | (base & 0x1FFF), Some(INDIRECT | (index & 0x1FFF)))
            }
        }
    }

    pub fn kind(&self) -> VarKind {
        match self {
            VarRef::Word(_) => VarKind::Word,
            VarRef::Bit(_) => VarKind::Bit,
            VarRef::Local(_) => VarKind::Local,
            VarRef::Indirect { .. } => VarKind::Indirect,
            VarRef::IndirectDeref { .. } => VarKind::IndirectDeref,
        }
    }

    /// Work out the concrete slot, reading the index variable for
    /// dereferenced addressing.
    pub fn resolve(&self, ctx: &dyn ExecutionContext) -> Result<Slot, RunError> {
        match *self {
            VarRef::Word(a) => Ok(Slot::Word(a)),
            VarRef::Bit(a) => Ok(Slot::Bit(a)),
            VarRef::Local(a) => Ok(Slot::Local(a)),
            VarRef::Indirect { base, offset } => word_slot(base as i32 + offset as i32),
            VarRef::IndirectDeref { base, index } => {
                let delta = ctx.read_word(index)?;
                word_slot(base as i32 + delta as i32)
            }
        }
    }

    pub fn read(&self, ctx: &dyn ExecutionContext) -> Result<i16, RunError> {
        self.resolve(ctx)?.read(ctx)
    }

    pub fn write(&self, ctx: &mut dyn ExecutionContext, value: i16) -> Result<(), RunError> {
        let slot = self.resolve(ctx)?;
        slot.write(ctx, value)
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        match *self {
            VarRef::Word(a) => st.name_of(Namespace::Var, a),
            VarRef::Bit(a) => st.name_of(Namespace::Bit, a),
            VarRef::Local(a) => st.name_of(Namespace::Local, a as u16),
            VarRef::Indirect { base, offset } => {
                format!("{}[{}]", st.name_of(Namespace::Var, base), offset)
            }
            VarRef::IndirectDeref { base, index } => format!(
                "{}[{}]",
                st.name_of(Namespace::Var, base),
                st.name_of(Namespace::Var, index)
            ),
        }
    }
}

fn word_slot(address: i32) -> Result<Slot, RunError> {
    if address < 0 || address >= MAX_WORDS as i32 {
        return Err(RunError::AddressOutOfRange { address });
    }
    Ok(Slot::Word(address as u16))
}

impl Slot {
    /// The slot `n` places further along the same storage class.
    pub fn offset(self, n: usize) -> Result<Slot, RunError> {
        match self {
            Slot::Word(a) => word_slot(a as i32 + n as i32),
            Slot::Bit(a) => {
                let address = a as i32 + n as i32;
                if address > 0x7FFF {
                    return Err(RunError::AddressOutOfRange { address });
                }
                Ok(Slot::Bit(address as u16))
            }
            Slot::Local(a) => {
                let address = a as i32 + n as i32;
                if address >= MAX_LOCALS as i32 {
                    return Err(RunError::AddressOutOfRange { address });
                }
                Ok(Slot::Local(address as u8))
            }
        }
    }

    pub fn read(self, ctx: &dyn ExecutionContext) -> Result<i16, RunError> {
        match self {
            Slot::Word(a) => ctx.read_word(a),
            Slot::Bit(a) => Ok(ctx.read_bit(a) as i16),
            Slot::Local(a) => Ok(ctx.read_local(a)),
        }
    }

    pub fn write(self, ctx: &mut dyn ExecutionContext, value: i16) -> Result<(), RunError> {
        match self {
            Slot::Word(a) => ctx.write_word(a, value),
            Slot::Bit(a) => {
                ctx.write_bit(a, value != 0);
                Ok(())
            }
            Slot::Local(a) => {
                ctx.write_local(a, value);
                Ok(())
            }
        }
    }
}

impl ByteCursor<'_> {
    /// Read a variable reference, including the offset word of indirect
    /// encodings.
    pub fn read_pointer(&mut self) -> Result<VarRef, DecodeError> {
        let offset = self.position();
        let raw = self.read_word()?;
        let extra = if VarRef::needs_offset(raw) {
            Some(self.read_word()?)
        } else {
            None
        };
        VarRef::classify(raw, extra).ok_or(DecodeError::InvalidPointerEncoding { raw, offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::{Engine, ExecContext};
    use test_log::test;

    fn pointer(bytes: &[u8]) -> Result<VarRef, DecodeError> {
        ByteCursor::new(bytes).read_pointer()
    }

    #[test]
    fn decodes_each_addressing_mode() {
        assert_eq!(pointer(&[0x55, 0x15]), Ok(VarRef::Word(0b1_0101_0101_0101)));
        assert_eq!(pointer(&[0x42, 0x0A]), Ok(VarRef::Word(0xA42)));
        assert_eq!(pointer(&[0xCD, 0xAB]), Ok(VarRef::Bit(0x2BCD)));
        assert_eq!(pointer(&[0x0A, 0x40]), Ok(VarRef::Local(0xA)));
        assert_eq!(pointer(&[0x0A, 0x60]), Ok(VarRef::Local(0xA)));
        assert_eq!(
            pointer(&[0x05, 0x20, 0x03, 0x00]),
            Ok(VarRef::Indirect { base: 5, offset: 3 })
        );
        assert_eq!(
            pointer(&[0x05, 0x20, 0x07, 0x20]),
            Ok(VarRef::IndirectDeref { base: 5, index: 7 })
        );
    }

    #[test]
    fn round_trip_preserves_kind_and_address() {
        for a in [0u16, 1, 0x0FFF, 0x1FFF] {
            let (raw, off) = VarRef::Word(a).encode();
            assert_eq!(VarRef::classify(raw, off), Some(VarRef::Word(a)));
        }
        for a in [0u16, 0x2BCD, 0x7FFF] {
            let (raw, off) = VarRef::Bit(a).encode();
            assert_eq!(VarRef::classify(raw, off), Some(VarRef::Bit(a)));
        }
        for a in 0u8..16 {
            let (raw, off) = VarRef::Local(a).encode();
            let decoded = VarRef::classify(raw, off).unwrap();
            assert_eq!(decoded.kind(), VarKind::Local);
            assert_eq!(decoded, VarRef::Local(a));
        }
        let deref = VarRef::IndirectDeref { base: 9, index: 4 };
        let (raw, off) = deref.encode();
        assert_eq!(VarRef::classify(raw, off), Some(deref));
    }

    #[test]
    fn unmatched_pattern_is_invalid() {
        // bit 14 set, bit 13 clear, not a local
        assert_eq!(
            pointer(&[0x10, 0x40]),
            Err(DecodeError::InvalidPointerEncoding {
                raw: 0x4010,
                offset: 0
            })
        );
    }

    #[test]
    fn truncated_indirect_is_unexpected_end() {
        assert_eq!(
            pointer(&[0x05, 0x20, 0x03]),
            Err(DecodeError::UnexpectedEnd { offset: 2 })
        );
    }

    #[test]
    fn dereferenced_write_uses_index_value() {
        let mut engine = Engine::new();
        let mut locals = [0i16; MAX_LOCALS];
        let mut ctx = ExecContext::new(&mut engine, &mut locals);
        VarRef::Word(7).write(&mut ctx, 3).unwrap();
        let target = VarRef::IndirectDeref { base: 100, index: 7 };
        target.write(&mut ctx, -9).unwrap();
        assert_eq!(VarRef::Word(103).read(&ctx), Ok(-9));
        assert_eq!(target.read(&ctx), Ok(-9));
    }

    #[test]
    fn bit_and_local_storage() {
        let mut engine = Engine::new();
        let mut locals = [0i16; MAX_LOCALS];
        {
            let mut ctx = ExecContext::new(&mut engine, &mut locals);
            VarRef::Bit(0x7FFF).write(&mut ctx, 12).unwrap();
            VarRef::Local(15).write(&mut ctx, 44).unwrap();
            assert_eq!(VarRef::Bit(0x7FFF).read(&ctx), Ok(1));
        }
        assert_eq!(locals[15], 44);
        assert!(engine.bit(0x7FFF));
    }

    #[test]
    fn indirect_past_word_array_is_an_error() {
        let mut engine = Engine::new();
        let mut locals = [0i16; MAX_LOCALS];
        let ctx = ExecContext::new(&mut engine, &mut locals);
        let r = VarRef::Indirect {
            base: 0x1FFF,
            offset: 1,
        };
        assert_eq!(
            r.read(&ctx),
            Err(RunError::AddressOutOfRange { address: 0x2000 })
        );
    }

    #[test]
    fn display_names_through_symbols() {
        let mut st = SymbolTable::new();
        assert_eq!(VarRef::Word(3).display(&mut st), "VAR_3");
        assert_eq!(VarRef::Bit(2).display(&mut st), "BIT_2");
        assert_eq!(VarRef::Local(1).display(&mut st), "LOCAL_1");
        assert_eq!(
            VarRef::Indirect { base: 4, offset: 2 }.display(&mut st),
            "VAR_4[2]"
        );
        assert_eq!(
            VarRef::IndirectDeref { base: 4, index: 8 }.display(&mut st),
            "VAR_4[VAR_8]"
        );
    }
}
