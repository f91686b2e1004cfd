/// Variable assignment and arithmetic
///
/// This module covers the instructions that compute values into variables:
/// - Plain moves and in-place arithmetic (add, subtract, multiply, divide,
///   and, or, increment, decrement)
/// - Range initialisation with `SetVarRange`
/// - Postfix `Expression`s, which may embed another result-producing
///   instruction whose result is read back from `VAR_RESULT`. The embedded
///   instruction cannot itself be an `Expression`.
/// - `GetRandomNumber`
///
/// Word arithmetic wraps at 16 bits.
use crate::bytecode::ByteCursor;
use crate::error::{DecodeError, RunError};
use crate::instruction::{decode_op, Op};
use crate::operand::{display_result, Constant, NumberFormat, Param, ParamPos};
use crate::pointer::VarRef;
use crate::symbol::SymbolTable;
use crate::vm::{ExecutionContext, ExecutionResult};
use log::debug;

/// Word variable that nested expression operations leave their result in
const VAR_RESULT: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    And,
    Or,
}

impl ArithOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "Add",
            ArithOp::Subtract => "Subtract",
            ArithOp::Multiply => "Multiply",
            ArithOp::Divide => "Divide",
            ArithOp::And => "And",
            ArithOp::Or => "Or",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+=",
            ArithOp::Subtract => "-=",
            ArithOp::Multiply => "*=",
            ArithOp::Divide => "/=",
            ArithOp::And => "&=",
            ArithOp::Or => "|=",
        }
    }

    pub fn apply(self, a: i16, b: i16) -> Result<i16, RunError> {
        match self {
            ArithOp::Add => Ok(a.wrapping_add(b)),
            ArithOp::Subtract => Ok(a.wrapping_sub(b)),
            ArithOp::Multiply => Ok(a.wrapping_mul(b)),
            ArithOp::Divide => {
                if b == 0 {
                    return Err(RunError::DivisionByZero {
                        mnemonic: self.mnemonic(),
                    });
                }
                Ok(a.wrapping_div(b))
            }
            ArithOp::And => Ok(a & b),
            ArithOp::Or => Ok(a | b),
        }
    }
}

/// Operators inside an `Expression`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ExprOperator {
    fn symbol(self) -> &'static str {
        match self {
            ExprOperator::Add => "+",
            ExprOperator::Subtract => "-",
            ExprOperator::Multiply => "*",
            ExprOperator::Divide => "/",
        }
    }

    fn apply(self, a: i16, b: i16) -> Result<i16, RunError> {
        match self {
            ExprOperator::Add => ArithOp::Add.apply(a, b),
            ExprOperator::Subtract => ArithOp::Subtract.apply(a, b),
            ExprOperator::Multiply => ArithOp::Multiply.apply(a, b),
            ExprOperator::Divide if b == 0 => Err(RunError::DivisionByZero {
                mnemonic: "Expression",
            }),
            ExprOperator::Divide => Ok(a.wrapping_div(b)),
        }
    }
}

/// One postfix item of an `Expression`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprItem {
    Value(Param),
    Operator(ExprOperator),
    /// Embedded operation; pushes `VAR_RESULT` after running
    Nested(Box<Op>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataOp {
    Move {
        dest: VarRef,
        src: Param,
    },
    Arith {
        op: ArithOp,
        dest: VarRef,
        src: Param,
    },
    Increment {
        dest: VarRef,
    },
    Decrement {
        dest: VarRef,
    },
    SetVarRange {
        dest: VarRef,
        values: Vec<Constant>,
    },
    Expression {
        dest: VarRef,
        items: Vec<ExprItem>,
    },
    GetRandomNumber {
        dest: VarRef,
        max: Param,
    },
}

impl DataOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            DataOp::Move { .. } => "Move",
            DataOp::Arith { op, .. } => op.mnemonic(),
            DataOp::Increment { .. } => "Increment",
            DataOp::Decrement { .. } => "Decrement",
            DataOp::SetVarRange { .. } => "SetVarRange",
            DataOp::Expression { .. } => "Expression",
            DataOp::GetRandomNumber { .. } => "GetRandomNumber",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        match self {
            DataOp::Move { dest, src } => format!("{} = {}", dest.display(st), src.display(st)),
            DataOp::Arith { op, dest, src } => {
                format!("{} {} {}", dest.display(st), op.symbol(), src.display(st))
            }
            DataOp::Increment { dest } => format!("{}++", dest.display(st)),
            DataOp::Decrement { dest } => format!("{}--", dest.display(st)),
            DataOp::SetVarRange { dest, values } => {
                let values: Vec<String> = values.iter().map(|v| v.display(st)).collect();
                format!("SetVarRange {}, [{}]", dest.display(st), values.join(", "))
            }
            DataOp::Expression { dest, items } => {
                format!("{} = {}", dest.display(st), display_expression(items, st))
            }
            DataOp::GetRandomNumber { dest, max } => {
                display_result(dest, "GetRandomNumber", &[max], st)
            }
        }
    }

    pub fn execute(&self, ctx: &mut dyn ExecutionContext) -> Result<ExecutionResult, RunError> {
        match self {
            DataOp::Move { dest, src } => {
                let value = src.evaluate(ctx)?;
                dest.write(ctx, value)?;
            }
            DataOp::Arith { op, dest, src } => {
                let b = src.evaluate(ctx)?;
                let a = dest.read(ctx)?;
                dest.write(ctx, op.apply(a, b)?)?;
            }
            DataOp::Increment { dest } => {
                let a = dest.read(ctx)?;
                dest.write(ctx, a.wrapping_add(1))?;
            }
            DataOp::Decrement { dest } => {
                let a = dest.read(ctx)?;
                dest.write(ctx, a.wrapping_sub(1))?;
            }
            DataOp::SetVarRange { dest, values } => {
                let first = dest.resolve(ctx)?;
                if let Some(last) = values.len().checked_sub(1) {
                    first.offset(last)?;
                }
                for (i, value) in values.iter().enumerate() {
                    first.offset(i)?.write(ctx, value.value)?;
                }
            }
            DataOp::Expression { dest, items } => {
                let value = evaluate_expression(items, ctx)?;
                dest.write(ctx, value)?;
            }
            DataOp::GetRandomNumber { dest, max } => {
                let max = max.evaluate(ctx)?.max(0) as u16;
                let value = ctx.random(max);
                debug!("random 0..={} -> {}", max, value);
                dest.write(ctx, value as i16)?;
            }
        }
        Ok(ExecutionResult::Continue)
    }
}

fn evaluate_expression(
    items: &[ExprItem],
    ctx: &mut dyn ExecutionContext,
) -> Result<i16, RunError> {
    let mut stack: Vec<i16> = Vec::new();
    for item in items {
        match item {
            ExprItem::Value(p) => stack.push(p.evaluate(ctx)?),
            ExprItem::Operator(op) => {
                let b = stack.pop().ok_or(RunError::ExpressionUnderflow)?;
                let a = stack.pop().ok_or(RunError::ExpressionUnderflow)?;
                stack.push(op.apply(a, b)?);
            }
            ExprItem::Nested(op) => {
                let result = op.execute(ctx)?;
                if result != ExecutionResult::Continue {
                    return Err(RunError::NestedControlFlow {
                        mnemonic: op.mnemonic(),
                    });
                }
                stack.push(ctx.read_word(VAR_RESULT)?);
            }
        }
    }
    stack.pop().ok_or(RunError::ExpressionUnderflow)
}

/// Infix rendering of a postfix item list. Malformed lists fall back to
/// showing the leftover items in order.
fn display_expression(items: &[ExprItem], st: &mut SymbolTable) -> String {
    // (text, needs parentheses when nested)
    let mut stack: Vec<(String, bool)> = Vec::new();
    for item in items {
        match item {
            ExprItem::Value(p) => stack.push((p.display(st), false)),
            ExprItem::Nested(op) => stack.push((format!("<{}>", op.display(st)), false)),
            ExprItem::Operator(op) => {
                if stack.len() < 2 {
                    stack.push((op.symbol().to_string(), false));
                    continue;
                }
                let (b, b_compound) = stack.pop().unwrap_or_default();
                let (a, a_compound) = stack.pop().unwrap_or_default();
                let wrap =
                    |s: String, compound: bool| if compound { format!("({})", s) } else { s };
                stack.push((
                    format!("{} {} {}", wrap(a, a_compound), op.symbol(), wrap(b, b_compound)),
                    true,
                ));
            }
        }
    }
    stack.into_iter().map(|(s, _)| s).collect::<Vec<_>>().join(" ")
}

pub fn decode_move(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let src = r.read_word_param(opcode, ParamPos::First, NumberFormat::Decimal)?;
    Ok(Op::Data(DataOp::Move { dest, src }))
}

pub fn decode_arith(op: ArithOp, opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let src = r.read_word_param(opcode, ParamPos::First, NumberFormat::Decimal)?;
    Ok(Op::Data(DataOp::Arith { op, dest, src }))
}

pub fn decode_increment(_opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Data(DataOp::Increment {
        dest: r.read_pointer()?,
    }))
}

pub fn decode_decrement(_opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Data(DataOp::Decrement {
        dest: r.read_pointer()?,
    }))
}

/// Bit 7 of the opcode selects word-sized values.
pub fn decode_set_var_range(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let count = r.read_byte()?;
    let mut values = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let value = if opcode & 0x80 != 0 {
            r.read_word_constant(NumberFormat::Decimal)?
        } else {
            r.read_byte_constant(NumberFormat::Decimal)?
        };
        values.push(value);
    }
    Ok(Op::Data(DataOp::SetVarRange { dest, values }))
}

pub fn decode_expression(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let mut items = Vec::new();
    loop {
        let offset = r.position();
        let sub = r.read_byte()?;
        if sub == 0xFF {
            break;
        }
        let item = match sub & 0x1F {
            0x01 => ExprItem::Value(r.read_word_param(
                sub,
                ParamPos::First,
                NumberFormat::Decimal,
            )?),
            0x02 => ExprItem::Operator(ExprOperator::Add),
            0x03 => ExprItem::Operator(ExprOperator::Subtract),
            0x04 => ExprItem::Operator(ExprOperator::Multiply),
            0x05 => ExprItem::Operator(ExprOperator::Divide),
            0x06 => {
                if r.peek_byte() == Some(opcode) {
                    return Err(DecodeError::NestedExpression {
                        offset: r.position(),
                    });
                }
                ExprItem::Nested(Box::new(decode_op(r)?))
            }
            _ => {
                return Err(DecodeError::UnknownSubOpcode {
                    opcode,
                    sub,
                    offset,
                })
            }
        };
        items.push(item);
    }
    Ok(Op::Data(DataOp::Expression { dest, items }))
}

pub fn decode_random(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let max = r.read_byte_param(opcode, ParamPos::First, NumberFormat::Decimal)?;
    Ok(Op::Data(DataOp::GetRandomNumber { dest, max }))
}
