/// Music and sound effects
use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Op;
use crate::operand::{display_call, display_result, NumberFormat, Param, ParamPos};
use crate::pointer::VarRef;
use crate::symbol::{Namespace, SymbolTable};

const SOUND: NumberFormat = NumberFormat::Resource(Namespace::Sound);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundOp {
    StartMusic { music: Param },
    StopMusic,
    StartSound { sound: Param },
    StopSound { sound: Param },
    IsSoundRunning { dest: VarRef, sound: Param },
}

impl SoundOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            SoundOp::StartMusic { .. } => "StartMusic",
            SoundOp::StopMusic => "StopMusic",
            SoundOp::StartSound { .. } => "StartSound",
            SoundOp::StopSound { .. } => "StopSound",
            SoundOp::IsSoundRunning { .. } => "IsSoundRunning",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            SoundOp::StartMusic { music } => display_call(mnemonic, &[music], st),
            SoundOp::StopMusic => mnemonic.to_string(),
            SoundOp::StartSound { sound } | SoundOp::StopSound { sound } => {
                display_call(mnemonic, &[sound], st)
            }
            SoundOp::IsSoundRunning { dest, sound } => display_result(dest, mnemonic, &[sound], st),
        }
    }
}

pub fn decode_start_music(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Sound(SoundOp::StartMusic {
        music: r.read_byte_param(
            opcode,
            ParamPos::First,
            NumberFormat::Resource(Namespace::Music),
        )?,
    }))
}

pub fn decode_stop_music(_opcode: u8, _r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Sound(SoundOp::StopMusic))
}

pub fn decode_start_sound(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Sound(SoundOp::StartSound {
        sound: r.read_byte_param(opcode, ParamPos::First, SOUND)?,
    }))
}

pub fn decode_stop_sound(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Sound(SoundOp::StopSound {
        sound: r.read_byte_param(opcode, ParamPos::First, SOUND)?,
    }))
}

pub fn decode_is_sound_running(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let sound = r.read_byte_param(opcode, ParamPos::First, SOUND)?;
    Ok(Op::Sound(SoundOp::IsSoundRunning { dest, sound }))
}
