/// Starting, chaining and stopping scripts
use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Op;
use crate::operand::{
    display_array, display_call, display_result, Fields, NumberFormat, Param, ParamPos,
};
use crate::pointer::VarRef;
use crate::symbol::{Namespace, SymbolTable};

const SCRIPT: NumberFormat = NumberFormat::Resource(Namespace::Script);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOp {
    StartScript {
        script: Param,
        args: Vec<Param>,
        recursive: bool,
        freeze_resistant: bool,
    },
    ChainScript {
        script: Param,
        args: Vec<Param>,
    },
    StopScript {
        script: Param,
    },
    StartObject {
        object: Param,
        verb: Param,
        args: Vec<Param>,
    },
    IsScriptRunning {
        dest: VarRef,
        script: Param,
    },
}

impl ScriptOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ScriptOp::StartScript { .. } => "StartScript",
            ScriptOp::ChainScript { .. } => "ChainScript",
            ScriptOp::StopScript { .. } => "StopScript",
            ScriptOp::StartObject { .. } => "StartObject",
            ScriptOp::IsScriptRunning { .. } => "IsScriptRunning",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            ScriptOp::StartScript {
                script,
                args,
                recursive,
                freeze_resistant,
            } => {
                let mut f = Fields::new(st);
                let script = script.display(f.symbols());
                f.push(script);
                let args = display_array(args, f.symbols());
                f.push(args);
                f.flag("Recursive", *recursive);
                f.flag("FreezeResistant", *freeze_resistant);
                f.join(mnemonic)
            }
            ScriptOp::ChainScript { script, args } => {
                format!("{}, {}", display_call(mnemonic, &[script], st), display_array(args, st))
            }
            ScriptOp::StopScript { script } => display_call(mnemonic, &[script], st),
            ScriptOp::StartObject { object, verb, args } => format!(
                "{}, {}",
                display_call(mnemonic, &[object, verb], st),
                display_array(args, st)
            ),
            ScriptOp::IsScriptRunning { dest, script } => {
                display_result(dest, mnemonic, &[script], st)
            }
        }
    }
}

/// Bit 6 of the opcode marks the script recursive, bit 5 freeze
/// resistant. Only bit 7 selects an operand kind.
pub fn decode_start_script(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let script = r.read_byte_param(opcode, ParamPos::First, SCRIPT)?;
    let args = r.read_var_params(NumberFormat::Decimal)?;
    Ok(Op::Script(ScriptOp::StartScript {
        script,
        args,
        recursive: opcode & 0x40 != 0,
        freeze_resistant: opcode & 0x20 != 0,
    }))
}

pub fn decode_chain_script(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let script = r.read_byte_param(opcode, ParamPos::First, SCRIPT)?;
    let args = r.read_var_params(NumberFormat::Decimal)?;
    Ok(Op::Script(ScriptOp::ChainScript { script, args }))
}

pub fn decode_stop_script(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Script(ScriptOp::StopScript {
        script: r.read_byte_param(opcode, ParamPos::First, SCRIPT)?,
    }))
}

pub fn decode_start_object(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let object =
        r.read_word_param(opcode, ParamPos::First, NumberFormat::Resource(Namespace::Object))?;
    let verb =
        r.read_byte_param(opcode, ParamPos::Second, NumberFormat::Resource(Namespace::Verb))?;
    let args = r.read_var_params(NumberFormat::Decimal)?;
    Ok(Op::Script(ScriptOp::StartObject { object, verb, args }))
}

pub fn decode_is_script_running(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let script = r.read_byte_param(opcode, ParamPos::First, SCRIPT)?;
    Ok(Op::Script(ScriptOp::IsScriptRunning { dest, script }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn start_script_flags_come_from_opcode() {
        let data = [0x0C, 0x01, 0x07, 0x00, 0xFF];
        let mut r = ByteCursor::new(&data);
        let op = decode_start_script(0x6A, &mut r).unwrap();
        let mut st = SymbolTable::new();
        assert_eq!(
            op.display(&mut st),
            "StartScript SCRIPT_12, [7], Recursive, FreezeResistant"
        );

        let data = [0x0C, 0xFF];
        let mut r = ByteCursor::new(&data);
        let op = decode_start_script(0x0A, &mut r).unwrap();
        assert_eq!(op.display(&mut st), "StartScript SCRIPT_12, []");
    }
}
