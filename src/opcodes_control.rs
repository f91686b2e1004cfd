/// Control flow: stopping, jumps, conditional branches, cutscenes and
/// overrides.
///
/// Every conditional branch ends in a relative jump that is taken when its
/// condition does NOT hold, so listings read `Unless (cond) Goto LABEL`.
use crate::bytecode::ByteCursor;
use crate::error::{DecodeError, RunError};
use crate::instruction::Op;
use crate::operand::{display_array, display_list, Constant, NumberFormat, Param, ParamPos};
use crate::pointer::VarRef;
use crate::symbol::{Namespace, SymbolTable};
use crate::vm::{ExecutionContext, ExecutionResult};
use log::debug;

/// Comparison branches. The bytecode compares its operand against the
/// variable, so `IsGreater` holds when the operand is greater than the
/// variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl Comparison {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Comparison::Equal => "IsEqual",
            Comparison::NotEqual => "IsNotEqual",
            Comparison::Greater => "IsGreater",
            Comparison::GreaterEqual => "IsGreaterEqual",
            Comparison::Less => "IsLess",
            Comparison::LessEqual => "IsLessEqual",
        }
    }

    pub fn holds(self, var: i16, operand: i16) -> bool {
        match self {
            Comparison::Equal => operand == var,
            Comparison::NotEqual => operand != var,
            Comparison::Greater => operand > var,
            Comparison::GreaterEqual => operand >= var,
            Comparison::Less => operand < var,
            Comparison::LessEqual => operand <= var,
        }
    }

    // The bytecode tests `operand OP var`; listings put the variable on the
    // left, so the ordering operators are mirrored here.
    fn symbol(self) -> &'static str {
        match self {
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
            Comparison::Greater => "<",
            Comparison::GreaterEqual => "<=",
            Comparison::Less => ">",
            Comparison::LessEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOp {
    StopObjectCode,
    BreakHere,
    Goto {
        target: Constant,
    },
    Compare {
        cmp: Comparison,
        var: VarRef,
        operand: Param,
        target: Constant,
    },
    /// `EqualZero`, or `NotEqualZero` when `nonzero` is set
    ZeroTest {
        nonzero: bool,
        var: VarRef,
        target: Constant,
    },
    IfClassOfIs {
        object: Param,
        classes: Vec<Param>,
        target: Constant,
    },
    IsActorInBox {
        actor: Param,
        walk_box: Param,
        target: Constant,
    },
    /// `IfState`, or `IfNotState` when `negate` is set
    IfState {
        negate: bool,
        object: Param,
        state: Param,
        target: Constant,
    },
    Cutscene {
        args: Vec<Param>,
    },
    EndCutscene,
    BeginOverride {
        target: Constant,
    },
    EndOverride,
    Delay {
        ticks: u32,
    },
    DelayVariable {
        var: VarRef,
    },
    FreezeScripts {
        flag: Param,
    },
}

impl ControlOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ControlOp::StopObjectCode => "StopObjectCode",
            ControlOp::BreakHere => "BreakHere",
            ControlOp::Goto { .. } => "Goto",
            ControlOp::Compare { cmp, .. } => cmp.mnemonic(),
            ControlOp::ZeroTest { nonzero: false, .. } => "EqualZero",
            ControlOp::ZeroTest { nonzero: true, .. } => "NotEqualZero",
            ControlOp::IfClassOfIs { .. } => "IfClassOfIs",
            ControlOp::IsActorInBox { .. } => "IsActorInBox",
            ControlOp::IfState { negate: false, .. } => "IfState",
            ControlOp::IfState { negate: true, .. } => "IfNotState",
            ControlOp::Cutscene { .. } => "Cutscene",
            ControlOp::EndCutscene => "EndCutscene",
            ControlOp::BeginOverride { .. } => "BeginOverride",
            ControlOp::EndOverride => "EndOverride",
            ControlOp::Delay { .. } => "Delay",
            ControlOp::DelayVariable { .. } => "DelayVariable",
            ControlOp::FreezeScripts { .. } => "FreezeScripts",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        match self {
            ControlOp::StopObjectCode
            | ControlOp::BreakHere
            | ControlOp::EndCutscene
            | ControlOp::EndOverride => self.mnemonic().to_string(),
            ControlOp::Goto { target } => format!("Goto {}", target.display(st)),
            ControlOp::Compare {
                cmp,
                var,
                operand,
                target,
            } => {
                let cond = format!("{} {} {}", var.display(st), cmp.symbol(), operand.display(st));
                unless(cond, target, st)
            }
            ControlOp::ZeroTest {
                nonzero,
                var,
                target,
            } => {
                let op = if *nonzero { "!=" } else { "==" };
                let cond = format!("{} {} 0", var.display(st), op);
                unless(cond, target, st)
            }
            ControlOp::IfClassOfIs {
                object,
                classes,
                target,
            } => {
                let cond =
                    format!("ClassOfIs({}, {})", object.display(st), display_array(classes, st));
                unless(cond, target, st)
            }
            ControlOp::IsActorInBox {
                actor,
                walk_box,
                target,
            } => {
                let cond = format!("ActorInBox({})", display_list(&[actor, walk_box], st));
                unless(cond, target, st)
            }
            ControlOp::IfState {
                negate,
                object,
                state,
                target,
            } => {
                let op = if *negate { "!=" } else { "==" };
                let cond = format!("State({}) {} {}", object.display(st), op, state.display(st));
                unless(cond, target, st)
            }
            ControlOp::Cutscene { args } => format!("Cutscene {}", display_array(args, st)),
            ControlOp::BeginOverride { target } => {
                format!("BeginOverride Goto {}", target.display(st))
            }
            ControlOp::Delay { ticks } => format!("Delay {}", ticks),
            ControlOp::DelayVariable { var } => format!("DelayVariable {}", var.display(st)),
            ControlOp::FreezeScripts { flag } => format!("FreezeScripts {}", flag.display(st)),
        }
    }

    pub fn execute(&self, ctx: &mut dyn ExecutionContext) -> Result<ExecutionResult, RunError> {
        match self {
            ControlOp::StopObjectCode => Ok(ExecutionResult::Stop),
            ControlOp::BreakHere => {
                // single thread: nothing to yield to
                debug!("break here");
                Ok(ExecutionResult::Continue)
            }
            ControlOp::Goto { target } => Ok(ExecutionResult::Jump(target.address())),
            ControlOp::Compare {
                cmp,
                var,
                operand,
                target,
            } => {
                let v = var.read(ctx)?;
                let o = operand.evaluate(ctx)?;
                Ok(branch(cmp.holds(v, o), target))
            }
            ControlOp::ZeroTest {
                nonzero,
                var,
                target,
            } => {
                let v = var.read(ctx)?;
                Ok(branch((v != 0) == *nonzero, target))
            }
            _ => Err(RunError::MissingExecuteBehavior {
                mnemonic: self.mnemonic(),
            }),
        }
    }
}

fn unless(cond: String, target: &Constant, st: &mut SymbolTable) -> String {
    format!("Unless ({}) Goto {}", cond, target.display(st))
}

fn branch(holds: bool, target: &Constant) -> ExecutionResult {
    if holds {
        ExecutionResult::Continue
    } else {
        ExecutionResult::Jump(target.address())
    }
}

pub fn decode_stop(_opcode: u8, _r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Control(ControlOp::StopObjectCode))
}

pub fn decode_break_here(_opcode: u8, _r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Control(ControlOp::BreakHere))
}

pub fn decode_goto(_opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Control(ControlOp::Goto {
        target: r.read_jump()?,
    }))
}

pub fn decode_compare(cmp: Comparison, opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let var = r.read_pointer()?;
    let operand = r.read_word_param(opcode, ParamPos::First, NumberFormat::Decimal)?;
    let target = r.read_jump()?;
    Ok(Op::Control(ControlOp::Compare {
        cmp,
        var,
        operand,
        target,
    }))
}

pub fn decode_zero_test(nonzero: bool, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let var = r.read_pointer()?;
    let target = r.read_jump()?;
    Ok(Op::Control(ControlOp::ZeroTest {
        nonzero,
        var,
        target,
    }))
}

pub fn decode_if_class_of_is(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let object =
        r.read_word_param(opcode, ParamPos::First, NumberFormat::Resource(Namespace::Object))?;
    let classes = r.read_var_params(NumberFormat::Resource(Namespace::Class))?;
    let target = r.read_jump()?;
    Ok(Op::Control(ControlOp::IfClassOfIs {
        object,
        classes,
        target,
    }))
}

pub fn decode_actor_in_box(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor =
        r.read_byte_param(opcode, ParamPos::First, NumberFormat::Resource(Namespace::Actor))?;
    let walk_box = r.read_byte_param(opcode, ParamPos::Second, NumberFormat::Decimal)?;
    let target = r.read_jump()?;
    Ok(Op::Control(ControlOp::IsActorInBox {
        actor,
        walk_box,
        target,
    }))
}

pub fn decode_if_state(negate: bool, opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let object =
        r.read_word_param(opcode, ParamPos::First, NumberFormat::Resource(Namespace::Object))?;
    let state = r.read_byte_param(opcode, ParamPos::Second, NumberFormat::Decimal)?;
    let target = r.read_jump()?;
    Ok(Op::Control(ControlOp::IfState {
        negate,
        object,
        state,
        target,
    }))
}

pub fn decode_cutscene(_opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Control(ControlOp::Cutscene {
        args: r.read_var_params(NumberFormat::Decimal)?,
    }))
}

pub fn decode_end_cutscene(_opcode: u8, _r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Control(ControlOp::EndCutscene))
}

/// Sub-opcode 0 ends an override; 1 begins one and must be followed by the
/// `Goto` that skips the overridable section.
pub fn decode_override(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let offset = r.position();
    let sub = r.read_byte()?;
    match sub & 0x1F {
        0x00 => Ok(Op::Control(ControlOp::EndOverride)),
        0x01 => {
            let offset = r.position();
            let jump = r.read_byte()?;
            if jump != 0x18 {
                return Err(DecodeError::UnknownSubOpcode {
                    opcode,
                    sub: jump,
                    offset,
                });
            }
            Ok(Op::Control(ControlOp::BeginOverride {
                target: r.read_jump()?,
            }))
        }
        _ => Err(DecodeError::UnknownSubOpcode {
            opcode,
            sub,
            offset,
        }),
    }
}

pub fn decode_delay(_opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let b0 = r.read_byte()? as u32;
    let b1 = r.read_byte()? as u32;
    let b2 = r.read_byte()? as u32;
    Ok(Op::Control(ControlOp::Delay {
        ticks: b0 | (b1 << 8) | (b2 << 16),
    }))
}

pub fn decode_delay_variable(_opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Control(ControlOp::DelayVariable {
        var: r.read_pointer()?,
    }))
}

pub fn decode_freeze_scripts(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Control(ControlOp::FreezeScripts {
        flag: r.read_byte_param(opcode, ParamPos::First, NumberFormat::Decimal)?,
    }))
}
