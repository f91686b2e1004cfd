/// Rooms, camera, palette and walk boxes
use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Op;
use crate::operand::{display_call, Constant, NumberFormat, Param, ParamPos};
use crate::symbol::{Namespace, SymbolTable};

const ROOM: NumberFormat = NumberFormat::Resource(Namespace::Room);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomOp {
    LoadRoom {
        room: Param,
    },
    LoadRoomWithEgo {
        object: Param,
        room: Param,
        x: Constant,
        y: Constant,
    },
    PanCameraTo {
        x: Param,
    },
    SetCameraAt {
        x: Param,
    },
    Lights {
        level: Param,
        x: Constant,
        y: Constant,
    },
    PseudoRoom {
        room: Constant,
        aliases: Vec<Constant>,
    },
    /// Fade with the default effect unless one is given
    RoomFade {
        effect: Option<Param>,
    },
    RoomScroll {
        min: Param,
        max: Param,
    },
    SetScreen {
        top: Param,
        bottom: Param,
    },
    SetPalColor {
        r: Param,
        g: Param,
        b: Param,
        index: Param,
    },
    ShakeOn,
    ShakeOff,
    RoomIntensity {
        scale: Param,
        start: Param,
        end: Param,
    },
    ScreenEffect {
        effect: Param,
    },
    SetBoxFlags {
        walk_box: Param,
        value: Param,
    },
    SetBoxScale {
        walk_box: Param,
        value: Param,
    },
    SetBoxScaleInv {
        walk_box: Param,
        value: Param,
    },
    CreateBoxMatrix,
}

impl RoomOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            RoomOp::LoadRoom { .. } => "LoadRoom",
            RoomOp::LoadRoomWithEgo { .. } => "LoadRoomWithEgo",
            RoomOp::PanCameraTo { .. } => "PanCameraTo",
            RoomOp::SetCameraAt { .. } => "SetCameraAt",
            RoomOp::Lights { .. } => "Lights",
            RoomOp::PseudoRoom { .. } => "PseudoRoom",
            RoomOp::RoomFade { .. } => "RoomFade",
            RoomOp::RoomScroll { .. } => "RoomScroll",
            RoomOp::SetScreen { .. } => "SetScreen",
            RoomOp::SetPalColor { .. } => "SetPalColor",
            RoomOp::ShakeOn => "ShakeOn",
            RoomOp::ShakeOff => "ShakeOff",
            RoomOp::RoomIntensity { .. } => "RoomIntensity",
            RoomOp::ScreenEffect { .. } => "ScreenEffect",
            RoomOp::SetBoxFlags { .. } => "SetBoxFlags",
            RoomOp::SetBoxScale { .. } => "SetBoxScale",
            RoomOp::SetBoxScaleInv { .. } => "SetBoxScaleInv",
            RoomOp::CreateBoxMatrix => "CreateBoxMatrix",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            RoomOp::LoadRoom { room } => display_call(mnemonic, &[room], st),
            RoomOp::LoadRoomWithEgo { object, room, x, y } => format!(
                "{}, {}, {}",
                display_call(mnemonic, &[object, room], st),
                x.display(st),
                y.display(st)
            ),
            RoomOp::PanCameraTo { x } | RoomOp::SetCameraAt { x } => {
                display_call(mnemonic, &[x], st)
            }
            RoomOp::Lights { level, x, y } => format!(
                "{}, {}, {}",
                display_call(mnemonic, &[level], st),
                x.display(st),
                y.display(st)
            ),
            RoomOp::PseudoRoom { room, aliases } => {
                let aliases: Vec<String> = aliases.iter().map(|a| a.display(st)).collect();
                format!("{} {}, [{}]", mnemonic, room.display(st), aliases.join(", "))
            }
            RoomOp::RoomFade { effect } => match effect {
                Some(effect) => display_call(mnemonic, &[effect], st),
                None => mnemonic.to_string(),
            },
            RoomOp::RoomScroll { min, max } => display_call(mnemonic, &[min, max], st),
            RoomOp::SetScreen { top, bottom } => display_call(mnemonic, &[top, bottom], st),
            RoomOp::SetPalColor { r, g, b, index } => display_call(mnemonic, &[r, g, b, index], st),
            RoomOp::ShakeOn | RoomOp::ShakeOff | RoomOp::CreateBoxMatrix => mnemonic.to_string(),
            RoomOp::RoomIntensity { scale, start, end } => {
                display_call(mnemonic, &[scale, start, end], st)
            }
            RoomOp::ScreenEffect { effect } => display_call(mnemonic, &[effect], st),
            RoomOp::SetBoxFlags { walk_box, value }
            | RoomOp::SetBoxScale { walk_box, value }
            | RoomOp::SetBoxScaleInv { walk_box, value } => {
                display_call(mnemonic, &[walk_box, value], st)
            }
        }
    }
}

pub fn decode_load_room(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Room(RoomOp::LoadRoom {
        room: r.read_byte_param(opcode, ParamPos::First, ROOM)?,
    }))
}

pub fn decode_load_room_with_ego(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let object =
        r.read_word_param(opcode, ParamPos::First, NumberFormat::Resource(Namespace::Object))?;
    let room = r.read_byte_param(opcode, ParamPos::Second, ROOM)?;
    let x = r.read_word_constant(NumberFormat::Decimal)?;
    let y = r.read_word_constant(NumberFormat::Decimal)?;
    Ok(Op::Room(RoomOp::LoadRoomWithEgo { object, room, x, y }))
}

pub fn decode_pan_camera_to(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Room(RoomOp::PanCameraTo {
        x: r.read_word_param(opcode, ParamPos::First, NumberFormat::Decimal)?,
    }))
}

pub fn decode_set_camera_at(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Room(RoomOp::SetCameraAt {
        x: r.read_word_param(opcode, ParamPos::First, NumberFormat::Decimal)?,
    }))
}

pub fn decode_lights(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let level = r.read_byte_param(opcode, ParamPos::First, NumberFormat::Decimal)?;
    let x = r.read_byte_constant(NumberFormat::Decimal)?;
    let y = r.read_byte_constant(NumberFormat::Decimal)?;
    Ok(Op::Room(RoomOp::Lights { level, x, y }))
}

pub fn decode_pseudo_room(_opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let room = r.read_byte_constant(ROOM)?;
    let aliases = r.read_null_terminated_bytes(NumberFormat::Decimal)?;
    Ok(Op::Room(RoomOp::PseudoRoom { room, aliases }))
}

pub fn decode_room_fade(_opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let sub = r.read_byte()?;
    let effect = if sub & 0x1F == 3 {
        Some(r.read_word_param(sub, ParamPos::First, NumberFormat::Hex)?)
    } else {
        None
    };
    Ok(Op::Room(RoomOp::RoomFade { effect }))
}

/// Room router (0x33)
pub fn decode_room_ops(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let sub = r.read_byte()?;
    let p16 =
        |r: &mut ByteCursor, pos: ParamPos| r.read_word_param(sub, pos, NumberFormat::Decimal);
    let p8 = |r: &mut ByteCursor, pos: ParamPos| r.read_byte_param(sub, pos, NumberFormat::Decimal);
    let op = match sub & 0x1F {
        0x01 => RoomOp::RoomScroll {
            min: p16(r, ParamPos::First)?,
            max: p16(r, ParamPos::Second)?,
        },
        0x03 => RoomOp::SetScreen {
            top: p16(r, ParamPos::First)?,
            bottom: p16(r, ParamPos::Second)?,
        },
        0x04 => {
            let red = p16(r, ParamPos::First)?;
            let green = p16(r, ParamPos::Second)?;
            let blue = p16(r, ParamPos::Third)?;
            // colour index is selected by its own auxiliary byte
            let aux = r.read_byte()?;
            let index = r.read_byte_param(aux, ParamPos::First, NumberFormat::Decimal)?;
            RoomOp::SetPalColor {
                r: red,
                g: green,
                b: blue,
                index,
            }
        }
        0x05 => RoomOp::ShakeOn,
        0x06 => RoomOp::ShakeOff,
        0x08 => RoomOp::RoomIntensity {
            scale: p8(r, ParamPos::First)?,
            start: p8(r, ParamPos::Second)?,
            end: p8(r, ParamPos::Third)?,
        },
        0x0A => RoomOp::ScreenEffect {
            effect: r.read_word_param(sub, ParamPos::First, NumberFormat::Hex)?,
        },
        _ => {
            return Err(DecodeError::UnknownSubOpcode {
                opcode,
                sub,
                offset,
            })
        }
    };
    Ok(Op::Room(op))
}

/// Walk box router (0x30)
pub fn decode_box_ops(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let sub = r.read_byte()?;
    let p8 = |r: &mut ByteCursor, pos: ParamPos| r.read_byte_param(sub, pos, NumberFormat::Decimal);
    let op = match sub & 0x1F {
        0x01 => RoomOp::SetBoxFlags {
            walk_box: p8(r, ParamPos::First)?,
            value: p8(r, ParamPos::Second)?,
        },
        0x02 => RoomOp::SetBoxScale {
            walk_box: p8(r, ParamPos::First)?,
            value: p8(r, ParamPos::Second)?,
        },
        0x03 => RoomOp::SetBoxScaleInv {
            walk_box: p8(r, ParamPos::First)?,
            value: p8(r, ParamPos::Second)?,
        },
        0x04 => RoomOp::CreateBoxMatrix,
        _ => {
            return Err(DecodeError::UnknownSubOpcode {
                opcode,
                sub,
                offset,
            })
        }
    };
    Ok(Op::Room(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn text(
        decode: fn(u8, &mut ByteCursor) -> Result<Op, DecodeError>,
        opcode: u8,
        data: &[u8],
    ) -> String {
        let mut r = ByteCursor::new(data);
        let op = decode(opcode, &mut r).unwrap();
        assert!(r.is_exhausted(), "trailing bytes after {:?}", op);
        op.display(&mut SymbolTable::new())
    }

    #[test]
    fn room_fade_effect_is_optional() {
        assert_eq!(text(decode_room_fade, 0x5C, &[0x01]), "RoomFade");
        assert_eq!(text(decode_room_fade, 0x5C, &[0x03, 0x05, 0x02]), "RoomFade $0205");
    }

    #[test]
    fn pal_color_uses_aux_byte() {
        assert_eq!(
            text(
                decode_room_ops,
                0x33,
                &[0x04, 0x3F, 0x00, 0x20, 0x00, 0x10, 0x00, 0x80, 0x07, 0x00]
            ),
            "SetPalColor 63, 32, 16, VAR_7"
        );
    }

    #[test]
    fn pseudo_room_lists_aliases() {
        assert_eq!(
            text(decode_pseudo_room, 0xCC, &[0x05, 0x81, 0x82, 0x00]),
            "PseudoRoom ROOM_5, [129, 130]"
        );
    }

    #[test]
    fn box_commands() {
        assert_eq!(text(decode_box_ops, 0x30, &[0x01, 0x02, 0x80]), "SetBoxFlags 2, 128");
        assert_eq!(text(decode_box_ops, 0x30, &[0x04]), "CreateBoxMatrix");
        let mut r = ByteCursor::new(&[0x07]);
        assert!(matches!(
            decode_box_ops(0x30, &mut r),
            Err(DecodeError::UnknownSubOpcode { sub: 0x07, .. })
        ));
    }
}
