/// Game-level system commands, saving and waiting
use crate::bytecode::ByteCursor;
use crate::error::{DecodeError, RunError};
use crate::instruction::Op;
use crate::operand::{display_call, display_result, NumberFormat, Param, ParamPos};
use crate::pointer::VarRef;
use crate::symbol::{Namespace, SymbolTable};
use crate::vm::{ExecutionContext, ExecutionResult};
use log::info;

/// One entry of a `SaveLoadVars` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveLoadItem {
    VarRange { first: VarRef, last: VarRef },
    StringRange { first: Param, last: Param },
    OpenFile(String),
    /// Ends the list
    Break,
    /// Ends the list
    CloseFile,
}

impl SaveLoadItem {
    fn display(&self, st: &mut SymbolTable) -> String {
        match self {
            SaveLoadItem::VarRange { first, last } => {
                format!("VarRange=({}, {})", first.display(st), last.display(st))
            }
            SaveLoadItem::StringRange { first, last } => {
                format!("StringRange=({}, {})", first.display(st), last.display(st))
            }
            SaveLoadItem::OpenFile(name) => format!("OpenFile={:?}", name),
            SaveLoadItem::Break => "Break".to_string(),
            SaveLoadItem::CloseFile => "CloseFile".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemOp {
    Restart,
    Pause,
    Quit,
    SaveLoadGame { dest: VarRef, slot: Param },
    SaveLoadVars { save: bool, items: Vec<SaveLoadItem> },
    WaitForActor { actor: Param },
    WaitForMessage,
    WaitForCamera,
    WaitForSentence,
    Debug { value: Param },
}

impl SystemOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            SystemOp::Restart => "Restart",
            SystemOp::Pause => "Pause",
            SystemOp::Quit => "Quit",
            SystemOp::SaveLoadGame { .. } => "SaveLoadGame",
            SystemOp::SaveLoadVars { .. } => "SaveLoadVars",
            SystemOp::WaitForActor { .. } => "WaitForActor",
            SystemOp::WaitForMessage => "WaitForMessage",
            SystemOp::WaitForCamera => "WaitForCamera",
            SystemOp::WaitForSentence => "WaitForSentence",
            SystemOp::Debug { .. } => "Debug",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            SystemOp::SaveLoadGame { dest, slot } => display_result(dest, mnemonic, &[slot], st),
            SystemOp::SaveLoadVars { save, items } => {
                let mut parts = vec![if *save { "Save" } else { "Load" }.to_string()];
                parts.extend(items.iter().map(|item| item.display(st)));
                format!("{} {}", mnemonic, parts.join(", "))
            }
            SystemOp::WaitForActor { actor } => display_call(mnemonic, &[actor], st),
            SystemOp::Debug { value } => display_call(mnemonic, &[value], st),
            _ => mnemonic.to_string(),
        }
    }

    pub fn execute(&self, ctx: &mut dyn ExecutionContext) -> Result<ExecutionResult, RunError> {
        match self {
            SystemOp::Debug { value } => {
                let value = value.evaluate(ctx)?;
                info!("debug: {}", value);
                Ok(ExecutionResult::Continue)
            }
            _ => Err(RunError::MissingExecuteBehavior {
                mnemonic: self.mnemonic(),
            }),
        }
    }
}

/// System router (0x98)
pub fn decode_system_ops(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let sub = r.read_byte()?;
    let op = match sub & 0x1F {
        0x01 => SystemOp::Restart,
        0x02 => SystemOp::Pause,
        0x03 => SystemOp::Quit,
        _ => {
            return Err(DecodeError::UnknownSubOpcode {
                opcode,
                sub,
                offset,
            })
        }
    };
    Ok(Op::System(op))
}

pub fn decode_save_load_game(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let slot = r.read_byte_param(opcode, ParamPos::First, NumberFormat::Decimal)?;
    Ok(Op::System(SystemOp::SaveLoadGame { dest, slot }))
}

/// Mode byte (1 saves), then items up to a zero byte, `Break` or
/// `CloseFile`.
pub fn decode_save_load_vars(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let save = r.read_byte()? == 1;
    let mut items = Vec::new();
    loop {
        let offset = r.position();
        let sub = r.read_byte()?;
        if sub == 0 {
            break;
        }
        let item = match sub & 0x1F {
            0x01 => SaveLoadItem::VarRange {
                first: r.read_pointer()?,
                last: r.read_pointer()?,
            },
            0x02 => SaveLoadItem::StringRange {
                first: r.read_byte_param(
                    sub,
                    ParamPos::First,
                    NumberFormat::Resource(Namespace::String),
                )?,
                last: r.read_byte_param(
                    sub,
                    ParamPos::Second,
                    NumberFormat::Resource(Namespace::String),
                )?,
            },
            0x03 => SaveLoadItem::OpenFile(r.read_string()?),
            0x04 => SaveLoadItem::Break,
            0x1F => SaveLoadItem::CloseFile,
            _ => {
                return Err(DecodeError::UnknownSubOpcode {
                    opcode,
                    sub,
                    offset,
                })
            }
        };
        let last = matches!(item, SaveLoadItem::Break | SaveLoadItem::CloseFile);
        items.push(item);
        if last {
            break;
        }
    }
    Ok(Op::System(SystemOp::SaveLoadVars { save, items }))
}

/// Wait router (0xAE)
pub fn decode_wait(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let sub = r.read_byte()?;
    let op = match sub & 0x1F {
        0x01 => SystemOp::WaitForActor {
            actor: r.read_byte_param(
                sub,
                ParamPos::First,
                NumberFormat::Resource(Namespace::Actor),
            )?,
        },
        0x02 => SystemOp::WaitForMessage,
        0x03 => SystemOp::WaitForCamera,
        0x04 => SystemOp::WaitForSentence,
        _ => {
            return Err(DecodeError::UnknownSubOpcode {
                opcode,
                sub,
                offset,
            })
        }
    };
    Ok(Op::System(op))
}

pub fn decode_debug(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::System(SystemOp::Debug {
        value: r.read_word_param(opcode, ParamPos::First, NumberFormat::Decimal)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn save_load_vars_stops_at_close_file() {
        let data = [
            0x01, 0x01, 0x01, 0x00, 0x0A, 0x00, 0x03, b'a', 0x00, 0x1F, 0x1A,
        ];
        let mut r = ByteCursor::new(&data);
        let op = decode_save_load_vars(0xA7, &mut r).unwrap();
        assert_eq!(r.position(), 10);
        let mut st = SymbolTable::new();
        assert_eq!(
            op.display(&mut st),
            "SaveLoadVars Save, VarRange=(VAR_1, VAR_10), OpenFile=\"a\", CloseFile"
        );
    }

    #[test]
    fn zero_byte_ends_save_load_list() {
        let data = [0x00, 0x02, 0x03, 0x04, 0x00];
        let mut r = ByteCursor::new(&data);
        let op = decode_save_load_vars(0xA7, &mut r).unwrap();
        assert!(r.is_exhausted());
        let mut st = SymbolTable::new();
        assert_eq!(
            op.display(&mut st),
            "SaveLoadVars Load, StringRange=(STRING_3, STRING_4)"
        );
    }

    #[test]
    fn wait_router() {
        let data = [0x01, 0x02];
        let mut r = ByteCursor::new(&data);
        let op = decode_wait(0xAE, &mut r).unwrap();
        assert_eq!(op.display(&mut SymbolTable::new()), "WaitForActor ACTOR_2");

        let data = [0x05];
        let mut r = ByteCursor::new(&data);
        assert!(decode_wait(0xAE, &mut r).is_err());
    }
}
