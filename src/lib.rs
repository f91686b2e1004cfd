#![crate_name = "scummtool"]

#[macro_use]
extern crate lazy_static;

pub mod bits;
pub mod bytecode;
pub mod config;
pub mod error;
pub mod instruction;
pub mod opcode_tables;
pub mod opcodes_actor;
pub mod opcodes_control;
pub mod opcodes_cursor;
pub mod opcodes_data;
pub mod opcodes_object;
pub mod opcodes_resource;
pub mod opcodes_room;
pub mod opcodes_script;
pub mod opcodes_sound;
pub mod opcodes_string;
pub mod opcodes_system;
pub mod opcodes_verb;
pub mod operand;
pub mod pointer;
pub mod random;
pub mod script;
pub mod symbol;
pub mod thread;
pub mod vm;

#[cfg(test)]
mod instruction_tests;

pub use bits::BitsReader;
pub use config::{Config, ListingOptions, RunOptions};
pub use error::{BitsError, ConfigError, DecodeError, ListingError, RunError, SymbolError};
pub use instruction::{Instruction, Op};
pub use script::{Listing, Script};
pub use symbol::{Namespace, SymbolTable};
pub use thread::Thread;
pub use vm::{Engine, ExecutionResult};

/// Decode the bytecode of script `id`.
pub fn decode(id: u16, buffer: &[u8]) -> Result<Script, DecodeError> {
    Script::decode(id, buffer.to_vec())
}
