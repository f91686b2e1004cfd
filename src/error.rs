use crate::symbol::Namespace;
use thiserror::Error;

/// Failures while turning bytecode into instructions. Any of these aborts
/// decoding of the whole script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of script at offset {offset:#06X}")]
    UnexpectedEnd { offset: usize },

    #[error("unknown opcode {opcode:#04X} at offset {offset:#06X}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("unknown sub-opcode {sub:#04X} for opcode {opcode:#04X} at offset {offset:#06X}")]
    UnknownSubOpcode { opcode: u8, sub: u8, offset: usize },

    #[error("invalid pointer encoding {raw:#06X} at offset {offset:#06X}")]
    InvalidPointerEncoding { raw: u16, offset: usize },

    #[error("opcode {opcode:#04X} ({name}) at offset {offset:#06X} is not supported yet")]
    UnimplementedOpcode {
        opcode: u8,
        name: &'static str,
        offset: usize,
    },

    #[error("expression nested inside an expression at offset {offset:#06X}")]
    NestedExpression { offset: usize },

    #[error("script of {len} bytes does not fit a 16-bit address space")]
    ScriptTooLarge { len: usize },
}

/// Problems found while producing a listing. They are reported next to the
/// listing text rather than replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("label {label} at {address:#06X} does not start an instruction")]
    BranchConsistency { label: String, address: u16 },
}

/// Fatal errors for a running thread.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("{mnemonic} has no execute behavior")]
    MissingExecuteBehavior { mnemonic: &'static str },

    #[error("ran off the end of the script at instruction {ip}")]
    RanOffEnd { ip: usize },

    #[error("jump target {address:#06X} does not start an instruction")]
    InvalidJumpTarget { address: u16 },

    #[error("variable address {address} is out of range")]
    AddressOutOfRange { address: i32 },

    #[error("division by zero in {mnemonic}")]
    DivisionByZero { mnemonic: &'static str },

    #[error("{mnemonic} inside an expression changed control flow")]
    NestedControlFlow { mnemonic: &'static str },

    #[error("expression stack underflow")]
    ExpressionUnderflow,

    #[error("instruction limit of {limit} reached")]
    InstructionLimit { limit: u64 },
}

/// Failures reading bit-packed data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitsError {
    #[error("cannot read {width} bits at once, at most 8")]
    InvalidWidth { width: u8 },

    #[error("no bits left at bit {position}")]
    EndOfInput { position: u64 },

    #[error("{width} bits at bit {position} run past the current byte")]
    UnexpectedEnd { position: u64, width: u8 },

    #[error("bit reader: {0}")]
    Reader(String),
}

impl From<bitreader::BitReaderError> for BitsError {
    fn from(e: bitreader::BitReaderError) -> Self {
        BitsError::Reader(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("cannot bind {name} to {value} in {namespace:?}: already bound differently")]
    Conflict {
        namespace: Namespace,
        name: String,
        value: u16,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown symbol namespace: {0}")]
    UnknownNamespace(String),

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}
