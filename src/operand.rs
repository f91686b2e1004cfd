//! Operands: literal constants, variable-or-literal params and message
//! strings, plus the cursor readers that decode them.
//!
//! Whether a param is a variable is decided by a bit of the (sub-)opcode
//! byte that introduced it: bit 7 for the first param, bit 6 for the second,
//! bit 5 for the third. The same bit means different things under different
//! sub-opcodes, so readers always take the introducing byte.

use crate::bytecode::ByteCursor;
use crate::error::{DecodeError, RunError};
use crate::pointer::VarRef;
use crate::symbol::{Namespace, SymbolTable};
use crate::vm::ExecutionContext;

/// How a constant is rendered in a listing. Never affects its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Decimal,
    Hex,
    Char,
    /// Jump target, shown as a label
    Address,
    /// Resource or entity id, shown through its namespace
    Resource(Namespace),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant {
    pub value: i16,
    pub format: NumberFormat,
}

impl Constant {
    pub fn new(value: i16, format: NumberFormat) -> Self {
        Constant { value, format }
    }

    pub fn decimal(value: i16) -> Self {
        Constant::new(value, NumberFormat::Decimal)
    }

    /// The value read as an unsigned 16-bit address or id
    pub fn address(&self) -> u16 {
        self.value as u16
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        match self.format {
            NumberFormat::Decimal => self.value.to_string(),
            NumberFormat::Hex => format!("${:04X}", self.value as u16),
            NumberFormat::Char => {
                let b = self.value as u8;
                if b.is_ascii_graphic() {
                    format!("'{}'", b as char)
                } else {
                    format!("'\\{:02X}'", b)
                }
            }
            NumberFormat::Address => st.name_of(Namespace::Label, self.address()),
            NumberFormat::Resource(ns) => st.name_of(ns, self.address()),
        }
    }
}

/// Operand position within its (sub-)opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamPos {
    First = 0x80,
    Second = 0x40,
    Third = 0x20,
}

impl ParamPos {
    pub fn is_var(self, opcode: u8) -> bool {
        opcode & self as u8 != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Const(Constant),
    Var(VarRef),
}

impl Param {
    pub fn evaluate(&self, ctx: &dyn ExecutionContext) -> Result<i16, RunError> {
        match self {
            Param::Const(c) => Ok(c.value),
            Param::Var(v) => v.read(ctx),
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Param::Const(c) => Some(c),
            Param::Var(_) => None,
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        match self {
            Param::Const(c) => c.display(st),
            Param::Var(v) => v.display(st),
        }
    }
}

/// Comma separated rendering of several params.
pub fn display_list(params: &[&Param], st: &mut SymbolTable) -> String {
    params
        .iter()
        .map(|p| p.display(st))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Mnemonic a, b, c`, or the bare mnemonic when there are no operands.
pub fn display_call(mnemonic: &str, params: &[&Param], st: &mut SymbolTable) -> String {
    if params.is_empty() {
        mnemonic.to_string()
    } else {
        format!("{} {}", mnemonic, display_list(params, st))
    }
}

/// `DEST = Mnemonic(a, b)` for instructions that store a result.
pub fn display_result(
    dest: &VarRef,
    mnemonic: &str,
    params: &[&Param],
    st: &mut SymbolTable,
) -> String {
    let dest = dest.display(st);
    format!("{} = {}({})", dest, mnemonic, display_list(params, st))
}

/// `[a, b, c]` rendering of a variadic argument list.
pub fn display_array(params: &[Param], st: &mut SymbolTable) -> String {
    let refs: Vec<&Param> = params.iter().collect();
    format!("[{}]", display_list(&refs, st))
}

/// Builder for the `Head, Field=value, Flag` text of compound instructions.
pub struct Fields<'s> {
    st: &'s mut SymbolTable,
    items: Vec<String>,
}

impl<'s> Fields<'s> {
    pub fn new(st: &'s mut SymbolTable) -> Self {
        Fields {
            st,
            items: Vec::new(),
        }
    }

    pub fn symbols(&mut self) -> &mut SymbolTable {
        self.st
    }

    pub fn push(&mut self, item: String) {
        self.items.push(item);
    }

    pub fn param(&mut self, name: &str, p: Option<&Param>) {
        if let Some(p) = p {
            let text = p.display(self.st);
            self.items.push(format!("{}={}", name, text));
        }
    }

    pub fn group(&mut self, name: &str, ps: Option<Vec<&Param>>) {
        if let Some(ps) = ps {
            let text = display_list(&ps, self.st);
            self.items.push(format!("{}=({})", name, text));
        }
    }

    pub fn flag(&mut self, name: &str, set: bool) {
        if set {
            self.items.push(name.to_string());
        }
    }

    pub fn message(&mut self, name: &str, m: Option<&Message>) {
        if let Some(m) = m {
            let text = m.display(self.st);
            self.items.push(format!("{}={}", name, text));
        }
    }

    pub fn join(self, head: &str) -> String {
        if self.items.is_empty() {
            head.to_string()
        } else if head.is_empty() {
            self.items.join(", ")
        } else {
            format!("{} {}", head, self.items.join(", "))
        }
    }
}

/// One piece of an in-game message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    Text(Vec<u8>),
    /// `0xFF`/`0xFE` escape; codes other than 1, 2, 3 and 8 carry a word
    Escape { code: u8, arg: Option<u16> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub parts: Vec<MessagePart>,
}

impl Message {
    pub fn from_text(text: &str) -> Self {
        Message {
            parts: vec![MessagePart::Text(text.as_bytes().to_vec())],
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mut out = String::from("\"");
        for part in &self.parts {
            match part {
                MessagePart::Text(bytes) => {
                    for &b in bytes {
                        match b {
                            b'"' => out.push_str("\\\""),
                            b'\\' => out.push_str("\\\\"),
                            b' ' => out.push(' '),
                            _ if b.is_ascii_graphic() => out.push(b as char),
                            _ => out.push_str(&format!("\\x{:02X}", b)),
                        }
                    }
                }
                MessagePart::Escape { code, arg } => out.push_str(&escape_text(*code, *arg, st)),
            }
        }
        out.push('"');
        out
    }
}

fn escape_text(code: u8, arg: Option<u16>, st: &mut SymbolTable) -> String {
    let var = |st: &mut SymbolTable, raw: u16| match VarRef::classify(raw, None) {
        Some(v) => v.display(st),
        None => format!("${:04X}", raw),
    };
    match (code, arg) {
        (1, _) => "{newline}".to_string(),
        (2, _) => "{keep}".to_string(),
        (3, _) => "{wait}".to_string(),
        (4, Some(raw)) => format!("{{int:{}}}", var(st, raw)),
        (5, Some(raw)) => format!("{{verb:{}}}", var(st, raw)),
        (6, Some(raw)) => format!("{{name:{}}}", var(st, raw)),
        (7, Some(raw)) => format!("{{string:{}}}", var(st, raw)),
        (code, Some(raw)) => format!("{{esc {:02X}:${:04X}}}", code, raw),
        (code, None) => format!("{{esc {:02X}}}", code),
    }
}

impl ByteCursor<'_> {
    pub fn read_byte_constant(&mut self, format: NumberFormat) -> Result<Constant, DecodeError> {
        Ok(Constant::new(self.read_byte()? as i16, format))
    }

    pub fn read_word_constant(&mut self, format: NumberFormat) -> Result<Constant, DecodeError> {
        Ok(Constant::new(self.read_signed_word()?, format))
    }

    /// Byte-wide literal, or a variable when `opcode` has the bit for `pos`.
    pub fn read_byte_param(
        &mut self,
        opcode: u8,
        pos: ParamPos,
        format: NumberFormat,
    ) -> Result<Param, DecodeError> {
        if pos.is_var(opcode) {
            Ok(Param::Var(self.read_pointer()?))
        } else {
            Ok(Param::Const(self.read_byte_constant(format)?))
        }
    }

    /// Word-wide literal, or a variable when `opcode` has the bit for `pos`.
    pub fn read_word_param(
        &mut self,
        opcode: u8,
        pos: ParamPos,
        format: NumberFormat,
    ) -> Result<Param, DecodeError> {
        if pos.is_var(opcode) {
            Ok(Param::Var(self.read_pointer()?))
        } else {
            Ok(Param::Const(self.read_word_constant(format)?))
        }
    }

    /// Variadic argument list: (sub-opcode, word param) pairs ended by `0xFF`.
    pub fn read_var_params(&mut self, format: NumberFormat) -> Result<Vec<Param>, DecodeError> {
        let mut params = Vec::new();
        loop {
            let sub = self.read_byte()?;
            if sub == 0xFF {
                return Ok(params);
            }
            params.push(self.read_word_param(sub, ParamPos::First, format)?);
        }
    }

    /// Byte constants up to a zero byte.
    pub fn read_null_terminated_bytes(
        &mut self,
        format: NumberFormat,
    ) -> Result<Vec<Constant>, DecodeError> {
        Ok(self
            .read_bytes_until(0)?
            .into_iter()
            .map(|b| Constant::new(b as i16, format))
            .collect())
    }

    /// Relative jump. The target is measured from the end of the offset
    /// word, which is where the instruction ends.
    pub fn read_jump(&mut self) -> Result<Constant, DecodeError> {
        let delta = self.read_signed_word()?;
        let target = (self.position() as i32 + delta as i32) as u16;
        Ok(Constant::new(target as i16, NumberFormat::Address))
    }

    /// Plain zero-terminated string.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let bytes = self.read_bytes_until(0)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Zero-terminated message with embedded escape sequences.
    pub fn read_message(&mut self) -> Result<Message, DecodeError> {
        let mut parts = Vec::new();
        let mut text = Vec::new();
        loop {
            let b = self.read_byte()?;
            match b {
                0 => break,
                0xFE | 0xFF => {
                    if !text.is_empty() {
                        parts.push(MessagePart::Text(std::mem::take(&mut text)));
                    }
                    let code = self.read_byte()?;
                    let arg = match code {
                        1 | 2 | 3 | 8 => None,
                        _ => Some(self.read_word()?),
                    };
                    parts.push(MessagePart::Escape { code, arg });
                }
                _ => text.push(b),
            }
        }
        if !text.is_empty() {
            parts.push(MessagePart::Text(text));
        }
        Ok(Message { parts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn opcode_bits_select_param_kind() {
        // position 1 literal byte, position 2 variable
        let data = [0x07, 0x05, 0x00];
        let mut r = ByteCursor::new(&data);
        let a = r
            .read_byte_param(0x40, ParamPos::First, NumberFormat::Decimal)
            .unwrap();
        let b = r
            .read_word_param(0x40, ParamPos::Second, NumberFormat::Decimal)
            .unwrap();
        assert_eq!(a, Param::Const(Constant::decimal(7)));
        assert_eq!(b, Param::Var(VarRef::Word(5)));
    }

    #[test]
    fn var_params_follow_their_own_sub_bytes() {
        let data = [0x01, 0x10, 0x00, 0x81, 0x03, 0x00, 0xFF];
        let mut r = ByteCursor::new(&data);
        let params = r.read_var_params(NumberFormat::Decimal).unwrap();
        assert_eq!(
            params,
            vec![
                Param::Const(Constant::decimal(16)),
                Param::Var(VarRef::Word(3))
            ]
        );
        assert!(r.is_exhausted());
    }

    #[test]
    fn null_terminated_bytes() {
        let data = [0x81, 0x82, 0x00, 0x99];
        let mut r = ByteCursor::new(&data);
        let list = r.read_null_terminated_bytes(NumberFormat::Decimal).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].value, 0x82);
        assert_eq!(r.position(), 3);
    }

    #[test]
    fn jump_is_relative_to_end_of_field() {
        let data = [0x00, 0x18, 0x04, 0x00];
        let mut r = ByteCursor::new(&data);
        r.read_word().unwrap();
        assert_eq!(r.read_jump().unwrap().address(), 8);

        let data = [0xFC, 0xFF];
        let mut r = ByteCursor::new(&data);
        assert_eq!(r.read_jump().unwrap().address(), 0xFFFE);
    }

    #[test]
    fn constant_formats() {
        let mut st = SymbolTable::new();
        assert_eq!(Constant::decimal(-3).display(&mut st), "-3");
        assert_eq!(
            Constant::new(0x1F, NumberFormat::Hex).display(&mut st),
            "$001F"
        );
        assert_eq!(
            Constant::new(0x41, NumberFormat::Char).display(&mut st),
            "'A'"
        );
        assert_eq!(
            Constant::new(0x07, NumberFormat::Char).display(&mut st),
            "'\\07'"
        );
        assert_eq!(
            Constant::new(0x20, NumberFormat::Address).display(&mut st),
            "LABEL_0020"
        );
        assert_eq!(
            Constant::new(4, NumberFormat::Resource(Namespace::Room)).display(&mut st),
            "ROOM_4"
        );
    }

    #[test]
    fn messages_keep_escapes_apart_from_text() {
        let data = [b'H', b'i', 0xFF, 0x03, 0xFF, 0x04, 0x05, 0x00, b'!', 0x00];
        let mut r = ByteCursor::new(&data);
        let msg = r.read_message().unwrap();
        assert_eq!(msg.parts.len(), 4);
        assert_eq!(
            msg.parts[2],
            MessagePart::Escape {
                code: 4,
                arg: Some(5)
            }
        );
        let mut st = SymbolTable::new();
        assert_eq!(msg.display(&mut st), "\"Hi{wait}{int:VAR_5}!\"");
        assert!(r.is_exhausted());
    }
}
