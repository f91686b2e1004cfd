//! Virtual machine state shared by every running script.
//!
//! The [`Engine`] owns global word and bit variables plus a small set of UI
//! properties. A thread never touches the engine directly: instructions run
//! against an [`ExecutionContext`], which an [`ExecContext`] provides by
//! pairing the engine with the running thread's locals.

use crate::config::RunOptions;
use crate::error::RunError;
use crate::random::ScummRand;
use crate::script::Script;
use crate::thread::Thread;
use bitvec::prelude::*;
use indexmap::IndexMap;
use log::debug;
use strum::{EnumIter, IntoStaticStr};

/// Number of global word variables
pub const MAX_WORDS: usize = 8192;

/// Number of global bit variables
pub const MAX_BITS: usize = 32768;

/// Number of local variables per thread
pub const MAX_LOCALS: usize = 16;

/// Engine properties scripts can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Property {
    #[strum(serialize = "ui.cursor.current")]
    CursorCurrent,
    #[strum(serialize = "ui.cursor.image")]
    CursorImage,
    #[strum(serialize = "ui.cursor.visible")]
    CursorVisible,
    /// Counter moved by the soft cursor on/off commands
    #[strum(serialize = "ui.cursor.state")]
    CursorState,
    #[strum(serialize = "ui.cursor.hotspot.x")]
    CursorHotspotX,
    #[strum(serialize = "ui.cursor.hotspot.y")]
    CursorHotspotY,
    #[strum(serialize = "ui.userput.enabled")]
    UserputEnabled,
    /// Counter moved by the soft userput on/off commands
    #[strum(serialize = "ui.userput.state")]
    UserputState,
    #[strum(serialize = "ui.charset.current")]
    CharsetCurrent,
}

impl Property {
    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// What the thread should do after an instruction ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Move on to the next instruction
    Continue,
    /// Continue at the instruction starting at this byte address
    Jump(u16),
    /// The script stopped itself
    Stop,
}

/// Storage and properties visible to an executing instruction.
pub trait ExecutionContext {
    fn property(&self, prop: Property) -> i32;
    fn set_property(&mut self, prop: Property, value: i32);
    fn read_word(&self, index: u16) -> Result<i16, RunError>;
    fn write_word(&mut self, index: u16, value: i16) -> Result<(), RunError>;
    fn read_bit(&self, index: u16) -> bool;
    fn write_bit(&mut self, index: u16, value: bool);
    fn read_local(&self, index: u8) -> i16;
    fn write_local(&mut self, index: u8, value: i16);
    /// Uniform random value in `0..=max`
    fn random(&mut self, max: u16) -> u16;
}

pub struct Engine {
    words: Vec<i16>,
    bits: BitVec<u8, Lsb0>,
    properties: IndexMap<Property, i32>,
    rand: ScummRand,
    options: RunOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine::with_options(RunOptions::default())
    }

    pub fn with_options(options: RunOptions) -> Self {
        Engine {
            words: vec![0; MAX_WORDS],
            bits: bitvec![u8, Lsb0; 0; MAX_BITS],
            properties: IndexMap::new(),
            rand: ScummRand::from_seed(options.random_seed),
            options,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn word(&self, index: u16) -> Option<i16> {
        self.words.get(index as usize).copied()
    }

    pub fn words(&self) -> &[i16] {
        &self.words
    }

    pub fn bit(&self, index: u16) -> bool {
        self.bits.get(index as usize).map(|b| *b).unwrap_or(false)
    }

    /// Unset properties read as zero.
    pub fn property(&self, prop: Property) -> i32 {
        self.properties.get(&prop).copied().unwrap_or(0)
    }

    /// Properties in the order they were first set.
    pub fn properties(&self) -> impl Iterator<Item = (Property, i32)> + '_ {
        self.properties.iter().map(|(p, v)| (*p, *v))
    }

    /// Run `script` on a fresh thread until it stops.
    pub fn run(&mut self, script: &Script) -> Result<(), RunError> {
        debug!("running script {}", script.id);
        let mut thread = Thread::new(script);
        thread.run(self)
    }
}

/// An engine paired with the locals of the thread currently executing.
pub struct ExecContext<'a> {
    engine: &'a mut Engine,
    locals: &'a mut [i16; MAX_LOCALS],
}

impl<'a> ExecContext<'a> {
    pub fn new(engine: &'a mut Engine, locals: &'a mut [i16; MAX_LOCALS]) -> Self {
        ExecContext { engine, locals }
    }
}

impl ExecutionContext for ExecContext<'_> {
    fn property(&self, prop: Property) -> i32 {
        self.engine.property(prop)
    }

    fn set_property(&mut self, prop: Property, value: i32) {
        debug!("property {} = {}", prop.key(), value);
        self.engine.properties.insert(prop, value);
    }

    fn read_word(&self, index: u16) -> Result<i16, RunError> {
        self.engine.word(index).ok_or(RunError::AddressOutOfRange {
            address: index as i32,
        })
    }

    fn write_word(&mut self, index: u16, value: i16) -> Result<(), RunError> {
        let slot = self
            .engine
            .words
            .get_mut(index as usize)
            .ok_or(RunError::AddressOutOfRange {
                address: index as i32,
            })?;
        *slot = value;
        Ok(())
    }

    fn read_bit(&self, index: u16) -> bool {
        self.engine.bit(index)
    }

    fn write_bit(&mut self, index: u16, value: bool) {
        if (index as usize) < MAX_BITS {
            self.engine.bits.set(index as usize, value);
        }
    }

    fn read_local(&self, index: u8) -> i16 {
        self.locals.get(index as usize).copied().unwrap_or(0)
    }

    fn write_local(&mut self, index: u8, value: i16) {
        if let Some(slot) = self.locals.get_mut(index as usize) {
            *slot = value;
        }
    }

    fn random(&mut self, max: u16) -> u16 {
        self.engine.rand.gen_inclusive(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Instruction, Op};
    use crate::opcodes_data::DataOp;
    use crate::operand::{Constant, Param};
    use crate::pointer::VarRef;
    use test_log::test;

    #[test]
    fn move_touches_only_its_destination() {
        let mut engine = Engine::new();
        let mut locals = [0i16; MAX_LOCALS];
        let inst = Instruction::from_op(Op::Data(DataOp::Move {
            dest: VarRef::Word(5),
            src: Param::Const(Constant::decimal(42)),
        }));
        {
            let mut ctx = ExecContext::new(&mut engine, &mut locals);
            assert_eq!(inst.execute(&mut ctx), Ok(ExecutionResult::Continue));
        }
        for (i, w) in engine.words().iter().enumerate() {
            let expected = if i == 5 { 42 } else { 0 };
            assert_eq!(*w, expected, "word {}", i);
        }
        assert!(locals.iter().all(|&l| l == 0));
    }

    #[test]
    fn unset_properties_read_zero() {
        let mut engine = Engine::new();
        assert_eq!(engine.property(Property::CursorVisible), 0);
        let mut locals = [0i16; MAX_LOCALS];
        let mut ctx = ExecContext::new(&mut engine, &mut locals);
        ctx.set_property(Property::UserputEnabled, 1);
        ctx.set_property(Property::CursorVisible, 1);
        drop(ctx);
        let keys: Vec<&str> = engine.properties().map(|(p, _)| p.key()).collect();
        assert_eq!(keys, vec!["ui.userput.enabled", "ui.cursor.visible"]);
    }

    #[test]
    fn out_of_range_word_is_an_error() {
        let mut engine = Engine::new();
        let mut locals = [0i16; MAX_LOCALS];
        let mut ctx = ExecContext::new(&mut engine, &mut locals);
        assert_eq!(
            ctx.write_word(MAX_WORDS as u16, 1),
            Err(RunError::AddressOutOfRange { address: 8192 })
        );
        assert!(ctx.read_word(8191).is_ok());
    }
}
