/// String resources and printing
///
/// `Print` and `PrintEgo` are compound: a list of sub-opcodes each setting
/// one text property, ended by `0xFF` or by the text itself.
use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Op;
use crate::operand::{display_call, display_result, Fields, Message, NumberFormat, Param, ParamPos};
use crate::pointer::VarRef;
use crate::symbol::{Namespace, SymbolTable};

const STRING: NumberFormat = NumberFormat::Resource(Namespace::String);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintProperties {
    pub pos: Option<(Param, Param)>,
    pub color: Option<Param>,
    pub clipped: Option<Param>,
    pub erase: Option<(Param, Param)>,
    pub center: bool,
    pub left: bool,
    pub overhead: bool,
    pub play_cd_track: Option<(Param, Param)>,
    pub text: Option<Message>,
}

impl PrintProperties {
    fn display_into(&self, f: &mut Fields) {
        f.group("Pos", self.pos.as_ref().map(|(x, y)| vec![x, y]));
        f.param("Color", self.color.as_ref());
        f.param("Clipped", self.clipped.as_ref());
        f.group("Erase", self.erase.as_ref().map(|(w, h)| vec![w, h]));
        f.flag("Center", self.center);
        f.flag("Left", self.left);
        f.flag("Overhead", self.overhead);
        f.group("PlayCdTrack", self.play_cd_track.as_ref().map(|(a, b)| vec![a, b]));
        f.message("Text", self.text.as_ref());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringOp {
    LoadString {
        string: Param,
        text: Message,
    },
    CopyString {
        dest: Param,
        src: Param,
    },
    SetStringChar {
        string: Param,
        index: Param,
        ch: Param,
    },
    GetStringChar {
        dest: VarRef,
        string: Param,
        index: Param,
    },
    NewString {
        string: Param,
        size: Param,
    },
    /// `actor` is absent for `PrintEgo`
    Print {
        actor: Option<Param>,
        props: Box<PrintProperties>,
    },
}

impl StringOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            StringOp::LoadString { .. } => "LoadString",
            StringOp::CopyString { .. } => "CopyString",
            StringOp::SetStringChar { .. } => "SetStringChar",
            StringOp::GetStringChar { .. } => "GetStringChar",
            StringOp::NewString { .. } => "NewString",
            StringOp::Print { actor: Some(_), .. } => "Print",
            StringOp::Print { actor: None, .. } => "PrintEgo",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            StringOp::LoadString { string, text } => {
                format!("{}, {}", display_call(mnemonic, &[string], st), text.display(st))
            }
            StringOp::CopyString { dest, src } => display_call(mnemonic, &[dest, src], st),
            StringOp::SetStringChar { string, index, ch } => {
                display_call(mnemonic, &[string, index, ch], st)
            }
            StringOp::GetStringChar {
                dest,
                string,
                index,
            } => display_result(dest, mnemonic, &[string, index], st),
            StringOp::NewString { string, size } => display_call(mnemonic, &[string, size], st),
            StringOp::Print { actor, props } => {
                let mut f = Fields::new(st);
                if let Some(actor) = actor {
                    let actor = actor.display(f.symbols());
                    f.push(actor);
                }
                props.display_into(&mut f);
                f.join(mnemonic)
            }
        }
    }
}

/// String router (0x27)
pub fn decode_string_ops(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let sub = r.read_byte()?;
    let op = match sub & 0x1F {
        0x01 => StringOp::LoadString {
            string: r.read_byte_param(sub, ParamPos::First, STRING)?,
            text: r.read_message()?,
        },
        0x02 => StringOp::CopyString {
            dest: r.read_byte_param(sub, ParamPos::First, STRING)?,
            src: r.read_byte_param(sub, ParamPos::Second, STRING)?,
        },
        0x03 => StringOp::SetStringChar {
            string: r.read_byte_param(sub, ParamPos::First, STRING)?,
            index: r.read_byte_param(sub, ParamPos::Second, NumberFormat::Decimal)?,
            ch: r.read_byte_param(sub, ParamPos::Third, NumberFormat::Char)?,
        },
        0x04 => StringOp::GetStringChar {
            dest: r.read_pointer()?,
            string: r.read_byte_param(sub, ParamPos::First, STRING)?,
            index: r.read_byte_param(sub, ParamPos::Second, NumberFormat::Decimal)?,
        },
        0x05 => StringOp::NewString {
            string: r.read_byte_param(sub, ParamPos::First, STRING)?,
            size: r.read_byte_param(sub, ParamPos::Second, NumberFormat::Decimal)?,
        },
        _ => {
            return Err(DecodeError::UnknownSubOpcode {
                opcode,
                sub,
                offset,
            })
        }
    };
    Ok(Op::String(op))
}

pub fn decode_print(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor =
        r.read_byte_param(opcode, ParamPos::First, NumberFormat::Resource(Namespace::Actor))?;
    let props = read_print_properties(opcode, r)?;
    Ok(Op::String(StringOp::Print {
        actor: Some(actor),
        props: Box::new(props),
    }))
}

pub fn decode_print_ego(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let props = read_print_properties(opcode, r)?;
    Ok(Op::String(StringOp::Print {
        actor: None,
        props: Box::new(props),
    }))
}

fn read_print_properties(opcode: u8, r: &mut ByteCursor) -> Result<PrintProperties, DecodeError> {
    let mut props = PrintProperties::default();
    loop {
        let offset = r.position();
        let sub = r.read_byte()?;
        if sub == 0xFF {
            break;
        }
        let p16 =
            |r: &mut ByteCursor, pos: ParamPos| r.read_word_param(sub, pos, NumberFormat::Decimal);
        match sub & 0x1F {
            0x00 => props.pos = Some((p16(r, ParamPos::First)?, p16(r, ParamPos::Second)?)),
            0x01 => {
                props.color = Some(r.read_byte_param(sub, ParamPos::First, NumberFormat::Decimal)?)
            }
            0x02 => props.clipped = Some(p16(r, ParamPos::First)?),
            0x03 => props.erase = Some((p16(r, ParamPos::First)?, p16(r, ParamPos::Second)?)),
            0x04 => props.center = true,
            0x06 => props.left = true,
            0x07 => props.overhead = true,
            0x08 => {
                props.play_cd_track = Some((p16(r, ParamPos::First)?, p16(r, ParamPos::Second)?))
            }
            0x0F => {
                props.text = Some(r.read_message()?);
                break;
            }
            _ => {
                return Err(DecodeError::UnknownSubOpcode {
                    opcode,
                    sub,
                    offset,
                })
            }
        }
    }
    Ok(props)
}
