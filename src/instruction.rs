use crate::bytecode::{ByteCursor, Frame};
use crate::error::{DecodeError, RunError};
use crate::opcode_tables;
use crate::opcodes_actor::ActorOp;
use crate::opcodes_control::ControlOp;
use crate::opcodes_cursor::CursorOp;
use crate::opcodes_data::DataOp;
use crate::opcodes_object::ObjectOp;
use crate::opcodes_resource::ResourceOp;
use crate::opcodes_room::RoomOp;
use crate::opcodes_script::ScriptOp;
use crate::opcodes_sound::SoundOp;
use crate::opcodes_string::StringOp;
use crate::opcodes_system::SystemOp;
use crate::opcodes_verb::VerbOp;
use crate::symbol::SymbolTable;
use crate::vm::{ExecutionContext, ExecutionResult};
use log::trace;

/// A decoded operation, grouped by the area of the engine it drives.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Control(ControlOp),
    Data(DataOp),
    Cursor(CursorOp),
    Actor(ActorOp),
    Object(ObjectOp),
    Resource(ResourceOp),
    Room(RoomOp),
    Script(ScriptOp),
    Sound(SoundOp),
    String(StringOp),
    System(SystemOp),
    Verb(VerbOp),
}

impl Op {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Control(op) => op.mnemonic(),
            Op::Data(op) => op.mnemonic(),
            Op::Cursor(op) => op.mnemonic(),
            Op::Actor(op) => op.mnemonic(),
            Op::Object(op) => op.mnemonic(),
            Op::Resource(op) => op.mnemonic(),
            Op::Room(op) => op.mnemonic(),
            Op::Script(op) => op.mnemonic(),
            Op::Sound(op) => op.mnemonic(),
            Op::String(op) => op.mnemonic(),
            Op::System(op) => op.mnemonic(),
            Op::Verb(op) => op.mnemonic(),
        }
    }

    /// Disassembly text. Names are taken from, and added to, `st`.
    pub fn display(&self, st: &mut SymbolTable) -> String {
        match self {
            Op::Control(op) => op.display(st),
            Op::Data(op) => op.display(st),
            Op::Cursor(op) => op.display(st),
            Op::Actor(op) => op.display(st),
            Op::Object(op) => op.display(st),
            Op::Resource(op) => op.display(st),
            Op::Room(op) => op.display(st),
            Op::Script(op) => op.display(st),
            Op::Sound(op) => op.display(st),
            Op::String(op) => op.display(st),
            Op::System(op) => op.display(st),
            Op::Verb(op) => op.display(st),
        }
    }

    pub fn execute(&self, ctx: &mut dyn ExecutionContext) -> Result<ExecutionResult, RunError> {
        match self {
            Op::Control(op) => op.execute(ctx),
            Op::Data(op) => op.execute(ctx),
            Op::Cursor(op) => op.execute(ctx),
            Op::System(op) => op.execute(ctx),
            _ => Err(RunError::MissingExecuteBehavior {
                mnemonic: self.mnemonic(),
            }),
        }
    }
}

/// One decoded instruction and the bytes it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub frame: Frame,
    pub op: Op,
}

impl Instruction {
    /// Decode the instruction at the cursor position.
    pub fn decode(r: &mut ByteCursor) -> Result<Instruction, DecodeError> {
        r.begin_frame();
        let op = decode_op(r)?;
        let frame = r.end_frame();
        trace!(
            "{:04X}: {:02X?} {}",
            frame.start,
            frame.bytes,
            op.mnemonic()
        );
        Ok(Instruction { frame, op })
    }

    /// An instruction with no source bytes, for building code by hand.
    pub fn from_op(op: Op) -> Instruction {
        Instruction {
            frame: Frame::default(),
            op,
        }
    }

    pub fn address(&self) -> u16 {
        self.frame.start
    }

    pub fn mnemonic(&self) -> &'static str {
        self.op.mnemonic()
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        self.op.display(st)
    }

    pub fn execute(&self, ctx: &mut dyn ExecutionContext) -> Result<ExecutionResult, RunError> {
        self.op.execute(ctx)
    }
}

/// Read an opcode and decode the rest of its operation. Nested operations
/// (inside expressions) share the enclosing instruction's frame.
pub(crate) fn decode_op(r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let opcode = r.read_byte()?;
    let family =
        opcode_tables::lookup(opcode).ok_or(DecodeError::UnknownOpcode { opcode, offset })?;
    match family.decode {
        Some(decode) => decode(opcode, r),
        None => Err(DecodeError::UnimplementedOpcode {
            opcode,
            name: family.name,
            offset,
        }),
    }
}
