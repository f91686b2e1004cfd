/// Cursor and user-input commands (router opcode 0x2C)
///
/// These are the first instructions with engine side effects: each one
/// updates a UI property on the engine.
use crate::bytecode::ByteCursor;
use crate::error::{DecodeError, RunError};
use crate::instruction::Op;
use crate::operand::{display_call, NumberFormat, Param, ParamPos};
use crate::symbol::{Namespace, SymbolTable};
use crate::vm::{ExecutionContext, ExecutionResult, Property};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorOp {
    CursorShow,
    CursorHide,
    UserputOn,
    UserputOff,
    CursorSoftOn,
    CursorSoftOff,
    UserputSoftOn,
    UserputSoftOff,
    SetCursorImg { cursor: Param, image: Param },
    SetCursorHotspot { cursor: Param, x: Param, y: Param },
    InitCursor { cursor: Param },
    InitCharset { charset: Param },
}

impl CursorOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            CursorOp::CursorShow => "CursorShow",
            CursorOp::CursorHide => "CursorHide",
            CursorOp::UserputOn => "UserputOn",
            CursorOp::UserputOff => "UserputOff",
            CursorOp::CursorSoftOn => "CursorSoftOn",
            CursorOp::CursorSoftOff => "CursorSoftOff",
            CursorOp::UserputSoftOn => "UserputSoftOn",
            CursorOp::UserputSoftOff => "UserputSoftOff",
            CursorOp::SetCursorImg { .. } => "SetCursorImg",
            CursorOp::SetCursorHotspot { .. } => "SetCursorHotspot",
            CursorOp::InitCursor { .. } => "InitCursor",
            CursorOp::InitCharset { .. } => "InitCharset",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            CursorOp::SetCursorImg { cursor, image } => {
                display_call(mnemonic, &[cursor, image], st)
            }
            CursorOp::SetCursorHotspot { cursor, x, y } => {
                display_call(mnemonic, &[cursor, x, y], st)
            }
            CursorOp::InitCursor { cursor } => display_call(mnemonic, &[cursor], st),
            CursorOp::InitCharset { charset } => display_call(mnemonic, &[charset], st),
            _ => mnemonic.to_string(),
        }
    }

    pub fn execute(&self, ctx: &mut dyn ExecutionContext) -> Result<ExecutionResult, RunError> {
        match self {
            CursorOp::CursorShow => ctx.set_property(Property::CursorVisible, 1),
            CursorOp::CursorHide => ctx.set_property(Property::CursorVisible, 0),
            CursorOp::UserputOn => ctx.set_property(Property::UserputEnabled, 1),
            CursorOp::UserputOff => ctx.set_property(Property::UserputEnabled, 0),
            CursorOp::CursorSoftOn => step(ctx, Property::CursorState, 1),
            CursorOp::CursorSoftOff => step(ctx, Property::CursorState, -1),
            CursorOp::UserputSoftOn => step(ctx, Property::UserputState, 1),
            CursorOp::UserputSoftOff => step(ctx, Property::UserputState, -1),
            CursorOp::SetCursorImg { cursor, image } => {
                let cursor = cursor.evaluate(ctx)?;
                let image = image.evaluate(ctx)?;
                ctx.set_property(Property::CursorCurrent, cursor as i32);
                ctx.set_property(Property::CursorImage, image as i32);
            }
            CursorOp::SetCursorHotspot { cursor, x, y } => {
                let cursor = cursor.evaluate(ctx)?;
                let x = x.evaluate(ctx)?;
                let y = y.evaluate(ctx)?;
                ctx.set_property(Property::CursorCurrent, cursor as i32);
                ctx.set_property(Property::CursorHotspotX, x as i32);
                ctx.set_property(Property::CursorHotspotY, y as i32);
            }
            CursorOp::InitCursor { cursor } => {
                let cursor = cursor.evaluate(ctx)?;
                ctx.set_property(Property::CursorCurrent, cursor as i32);
            }
            CursorOp::InitCharset { charset } => {
                let charset = charset.evaluate(ctx)?;
                ctx.set_property(Property::CharsetCurrent, charset as i32);
            }
        }
        Ok(ExecutionResult::Continue)
    }
}

fn step(ctx: &mut dyn ExecutionContext, prop: Property, delta: i32) {
    let value = ctx.property(prop) + delta;
    ctx.set_property(prop, value);
}

/// Router: the sub-opcode's low five bits pick the command, its high bits
/// select operand kinds.
pub fn decode_cursor_command(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let sub = r.read_byte()?;
    let op = match sub & 0x1F {
        0x01 => CursorOp::CursorShow,
        0x02 => CursorOp::CursorHide,
        0x03 => CursorOp::UserputOn,
        0x04 => CursorOp::UserputOff,
        0x05 => CursorOp::CursorSoftOn,
        0x06 => CursorOp::CursorSoftOff,
        0x07 => CursorOp::UserputSoftOn,
        0x08 => CursorOp::UserputSoftOff,
        0x0A => CursorOp::SetCursorImg {
            cursor: r.read_byte_param(sub, ParamPos::First, NumberFormat::Decimal)?,
            image: r.read_byte_param(sub, ParamPos::Second, NumberFormat::Char)?,
        },
        0x0B => CursorOp::SetCursorHotspot {
            cursor: r.read_byte_param(sub, ParamPos::First, NumberFormat::Decimal)?,
            x: r.read_byte_param(sub, ParamPos::Second, NumberFormat::Decimal)?,
            y: r.read_byte_param(sub, ParamPos::Third, NumberFormat::Decimal)?,
        },
        0x0C => CursorOp::InitCursor {
            cursor: r.read_byte_param(sub, ParamPos::First, NumberFormat::Decimal)?,
        },
        0x0D => CursorOp::InitCharset {
            charset: r.read_byte_param(
                sub,
                ParamPos::First,
                NumberFormat::Resource(Namespace::Charset),
            )?,
        },
        _ => {
            return Err(DecodeError::UnknownSubOpcode {
                opcode,
                sub,
                offset,
            })
        }
    };
    Ok(Op::Cursor(op))
}
