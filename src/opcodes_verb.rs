/// Verbs and sentences
///
/// `VerbOps` is compound like `ActorOps`: a verb id followed by property
/// sub-opcodes up to `0xFF`.
use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Op;
use crate::operand::{display_call, display_result, Fields, Message, NumberFormat, Param, ParamPos};
use crate::pointer::VarRef;
use crate::symbol::{Namespace, SymbolTable};

const VERB: NumberFormat = NumberFormat::Resource(Namespace::Verb);
const OBJECT: NumberFormat = NumberFormat::Resource(Namespace::Object);

/// Verb id that stops the current sentence instead of starting one
const STOP_SENTENCE: i16 = 0xFE;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerbProperties {
    pub image: Option<Param>,
    pub name: Option<Message>,
    pub color: Option<Param>,
    pub hi_color: Option<Param>,
    pub at: Option<(Param, Param)>,
    pub on: bool,
    pub off: bool,
    pub delete: bool,
    pub new: bool,
    pub dim_color: Option<Param>,
    pub dim: bool,
    pub key: Option<Param>,
    pub center: bool,
    pub name_str: Option<Param>,
    pub assign_object: Option<(Param, Param)>,
    pub back_color: Option<Param>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbSlotAction {
    Save,
    Restore,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbOp {
    VerbOps {
        verb: Param,
        props: Box<VerbProperties>,
    },
    SaveRestoreVerbs {
        action: VerbSlotAction,
        start: Param,
        end: Param,
        slot: Param,
    },
    GetVerbEntrypoint {
        dest: VarRef,
        object: Param,
        verb: Param,
    },
    DoSentence {
        verb: Param,
        object_a: Param,
        object_b: Param,
    },
    StopSentence,
}

impl VerbOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            VerbOp::VerbOps { .. } => "VerbOps",
            VerbOp::SaveRestoreVerbs { action, .. } => match action {
                VerbSlotAction::Save => "SaveVerbs",
                VerbSlotAction::Restore => "RestoreVerbs",
                VerbSlotAction::Delete => "DeleteVerbs",
            },
            VerbOp::GetVerbEntrypoint { .. } => "GetVerbEntrypoint",
            VerbOp::DoSentence { .. } => "DoSentence",
            VerbOp::StopSentence => "StopSentence",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            VerbOp::VerbOps { verb, props } => {
                let mut f = Fields::new(st);
                let head = verb.display(f.symbols());
                f.push(head);
                f.param("Image", props.image.as_ref());
                f.message("Name", props.name.as_ref());
                f.param("Color", props.color.as_ref());
                f.param("HiColor", props.hi_color.as_ref());
                f.group("At", props.at.as_ref().map(|(x, y)| vec![x, y]));
                f.flag("On", props.on);
                f.flag("Off", props.off);
                f.flag("Delete", props.delete);
                f.flag("New", props.new);
                f.param("DimColor", props.dim_color.as_ref());
                f.flag("Dim", props.dim);
                f.param("Key", props.key.as_ref());
                f.flag("Center", props.center);
                f.param("NameStr", props.name_str.as_ref());
                f.group(
                    "AssignObject",
                    props.assign_object.as_ref().map(|(o, r)| vec![o, r]),
                );
                f.param("BackColor", props.back_color.as_ref());
                f.join(mnemonic)
            }
            VerbOp::SaveRestoreVerbs {
                start, end, slot, ..
            } => display_call(mnemonic, &[start, end, slot], st),
            VerbOp::GetVerbEntrypoint { dest, object, verb } => {
                display_result(dest, mnemonic, &[object, verb], st)
            }
            VerbOp::DoSentence {
                verb,
                object_a,
                object_b,
            } => display_call(mnemonic, &[verb, object_a, object_b], st),
            VerbOp::StopSentence => mnemonic.to_string(),
        }
    }
}

pub fn decode_verb_ops(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let verb = r.read_byte_param(opcode, ParamPos::First, VERB)?;
    let mut props = VerbProperties::default();
    loop {
        let offset = r.position();
        let sub = r.read_byte()?;
        if sub == 0xFF {
            break;
        }
        let p8 =
            |r: &mut ByteCursor| r.read_byte_param(sub, ParamPos::First, NumberFormat::Decimal);
        match sub & 0x1F {
            0x01 => props.image = Some(r.read_word_param(sub, ParamPos::First, OBJECT)?),
            0x02 => props.name = Some(r.read_message()?),
            0x03 => props.color = Some(p8(r)?),
            0x04 => props.hi_color = Some(p8(r)?),
            0x05 => {
                props.at = Some((
                    r.read_word_param(sub, ParamPos::First, NumberFormat::Decimal)?,
                    r.read_word_param(sub, ParamPos::Second, NumberFormat::Decimal)?,
                ))
            }
            0x06 => props.on = true,
            0x07 => props.off = true,
            0x08 => props.delete = true,
            0x09 => props.new = true,
            0x0A => props.dim_color = Some(p8(r)?),
            0x0B => props.dim = true,
            0x0C => props.key = Some(p8(r)?),
            0x0D => props.center = true,
            0x0E => {
                props.name_str = Some(r.read_word_param(
                    sub,
                    ParamPos::First,
                    NumberFormat::Resource(Namespace::String),
                )?)
            }
            0x0F => {
                props.assign_object = Some((
                    r.read_word_param(sub, ParamPos::First, OBJECT)?,
                    r.read_byte_param(
                        sub,
                        ParamPos::Second,
                        NumberFormat::Resource(Namespace::Room),
                    )?,
                ))
            }
            0x10 => props.back_color = Some(p8(r)?),
            _ => {
                return Err(DecodeError::UnknownSubOpcode {
                    opcode,
                    sub,
                    offset,
                })
            }
        }
    }
    Ok(Op::Verb(VerbOp::VerbOps {
        verb,
        props: Box::new(props),
    }))
}

/// Router (0xAB): the action is checked before any operand is read.
pub fn decode_save_restore_verbs(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let sub = r.read_byte()?;
    let action = match sub & 0x1F {
        0x01 => VerbSlotAction::Save,
        0x02 => VerbSlotAction::Restore,
        0x03 => VerbSlotAction::Delete,
        _ => {
            return Err(DecodeError::UnknownSubOpcode {
                opcode,
                sub,
                offset,
            })
        }
    };
    let start = r.read_byte_param(sub, ParamPos::First, VERB)?;
    let end = r.read_byte_param(sub, ParamPos::Second, VERB)?;
    let slot = r.read_byte_param(sub, ParamPos::Third, NumberFormat::Decimal)?;
    Ok(Op::Verb(VerbOp::SaveRestoreVerbs {
        action,
        start,
        end,
        slot,
    }))
}

pub fn decode_get_verb_entrypoint(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let object = r.read_word_param(opcode, ParamPos::First, OBJECT)?;
    let verb = r.read_word_param(opcode, ParamPos::Second, VERB)?;
    Ok(Op::Verb(VerbOp::GetVerbEntrypoint { dest, object, verb }))
}

pub fn decode_do_sentence(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let verb = r.read_byte_param(opcode, ParamPos::First, VERB)?;
    if matches!(verb.as_constant(), Some(c) if c.value == STOP_SENTENCE) {
        return Ok(Op::Verb(VerbOp::StopSentence));
    }
    let object_a = r.read_word_param(opcode, ParamPos::Second, OBJECT)?;
    let object_b = r.read_word_param(opcode, ParamPos::Third, OBJECT)?;
    Ok(Op::Verb(VerbOp::DoSentence {
        verb,
        object_a,
        object_b,
    }))
}
