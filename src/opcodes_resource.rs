/// Resource management router (opcode 0x0C)
///
/// Sub-opcodes 1 to 16 load, nuke, lock or unlock a script, sound, costume
/// or room; the rest handle the heap and charsets.
use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Op;
use crate::operand::{display_call, NumberFormat, Param, ParamPos};
use crate::symbol::{Namespace, SymbolTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Load,
    Nuke,
    Lock,
    Unlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Script,
    Sound,
    Costume,
    Room,
}

impl ResourceKind {
    fn namespace(self) -> Namespace {
        match self {
            ResourceKind::Script => Namespace::Script,
            ResourceKind::Sound => Namespace::Sound,
            ResourceKind::Costume => Namespace::Costume,
            ResourceKind::Room => Namespace::Room,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOp {
    Resource {
        action: ResourceAction,
        kind: ResourceKind,
        id: Param,
    },
    ClearHeap,
    LoadCharset {
        charset: Param,
    },
    NukeCharset {
        charset: Param,
    },
}

impl ResourceOp {
    pub fn mnemonic(&self) -> &'static str {
        use ResourceAction::*;
        use ResourceKind::*;
        match self {
            ResourceOp::Resource { action, kind, .. } => match (action, kind) {
                (Load, Script) => "LoadScript",
                (Load, Sound) => "LoadSound",
                (Load, Costume) => "LoadCostume",
                (Load, Room) => "LoadRoom",
                (Nuke, Script) => "NukeScript",
                (Nuke, Sound) => "NukeSound",
                (Nuke, Costume) => "NukeCostume",
                (Nuke, Room) => "NukeRoom",
                (Lock, Script) => "LockScript",
                (Lock, Sound) => "LockSound",
                (Lock, Costume) => "LockCostume",
                (Lock, Room) => "LockRoom",
                (Unlock, Script) => "UnlockScript",
                (Unlock, Sound) => "UnlockSound",
                (Unlock, Costume) => "UnlockCostume",
                (Unlock, Room) => "UnlockRoom",
            },
            ResourceOp::ClearHeap => "ClearHeap",
            ResourceOp::LoadCharset { .. } => "LoadCharset",
            ResourceOp::NukeCharset { .. } => "NukeCharset",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            ResourceOp::Resource { id, .. } => display_call(mnemonic, &[id], st),
            ResourceOp::ClearHeap => mnemonic.to_string(),
            ResourceOp::LoadCharset { charset } | ResourceOp::NukeCharset { charset } => {
                display_call(mnemonic, &[charset], st)
            }
        }
    }
}

pub fn decode_resource_routine(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let sub = r.read_byte()?;
    let code = sub & 0x1F;
    let op = match code {
        0x01..=0x10 => {
            let action = match (code - 1) / 4 {
                0 => ResourceAction::Load,
                1 => ResourceAction::Nuke,
                2 => ResourceAction::Lock,
                _ => ResourceAction::Unlock,
            };
            let kind = match (code - 1) % 4 {
                0 => ResourceKind::Script,
                1 => ResourceKind::Sound,
                2 => ResourceKind::Costume,
                _ => ResourceKind::Room,
            };
            let id =
                r.read_byte_param(sub, ParamPos::First, NumberFormat::Resource(kind.namespace()))?;
            ResourceOp::Resource { action, kind, id }
        }
        0x11 => ResourceOp::ClearHeap,
        0x12 => ResourceOp::LoadCharset {
            charset: r.read_byte_param(
                sub,
                ParamPos::First,
                NumberFormat::Resource(Namespace::Charset),
            )?,
        },
        0x13 => ResourceOp::NukeCharset {
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
    Ok(Op::Resource(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn text(data: &[u8]) -> String {
        let mut r = ByteCursor::new(data);
        let op = decode_resource_routine(0x0C, &mut r).unwrap();
        assert!(r.is_exhausted());
        op.display(&mut SymbolTable::new())
    }

    #[test]
    fn sub_selects_action_and_kind() {
        assert_eq!(text(&[0x01, 0x05]), "LoadScript SCRIPT_5");
        assert_eq!(text(&[0x06, 0x02]), "NukeSound SOUND_2");
        assert_eq!(text(&[0x0B, 0x09]), "LockCostume COSTUME_9");
        assert_eq!(text(&[0x10, 0x01]), "UnlockRoom ROOM_1");
        assert_eq!(text(&[0x11]), "ClearHeap");
        assert_eq!(text(&[0x12, 0x02]), "LoadCharset CHARSET_0002");
    }

    #[test]
    fn sub_bit_selects_variable_id() {
        assert_eq!(text(&[0x82, 0x21, 0x00]), "LoadSound VAR_33");
    }
}
