//! Decoded scripts and their listings.

use crate::bytecode::{ByteCursor, Frame};
use crate::config::ListingOptions;
use crate::error::{DecodeError, ListingError};
use crate::instruction::Instruction;
use crate::symbol::{Namespace, SymbolTable};
use log::{debug, warn};
use std::fmt::Write;

/// Bytes shown per listing line
const BYTES_PER_LINE: usize = 8;
/// Width of the hex column: 8 bytes at 3 characters each
const HEX_WIDTH: usize = 24;
const LABEL_WIDTH: usize = 12;

/// A script's bytecode together with its decoded instructions. Instruction
/// `i` was decoded from `code[i].frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub id: u16,
    pub bytecode: Vec<u8>,
    pub code: Vec<Instruction>,
}

/// Listing text plus any consistency problems found while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub text: String,
    pub errors: Vec<ListingError>,
}

impl Listing {
    pub fn is_consistent(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Script {
    /// Decode a whole script. The first error aborts decoding; no partial
    /// script is returned.
    pub fn decode(id: u16, bytecode: Vec<u8>) -> Result<Script, DecodeError> {
        if bytecode.len() > u16::MAX as usize {
            return Err(DecodeError::ScriptTooLarge {
                len: bytecode.len(),
            });
        }
        let mut code = Vec::new();
        let mut r = ByteCursor::new(&bytecode);
        while !r.is_exhausted() {
            code.push(Instruction::decode(&mut r)?);
        }
        debug!(
            "script {}: decoded {} instructions from {} bytes",
            id,
            code.len(),
            bytecode.len()
        );
        Ok(Script { id, bytecode, code })
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.code.iter().map(|inst| &inst.frame)
    }

    /// Index of the instruction that starts at byte `address`.
    pub fn index_of(&self, address: u16) -> Option<usize> {
        self.code
            .binary_search_by_key(&address, |inst| inst.frame.start)
            .ok()
    }

    /// Every label in `st` that does not coincide with the start of an
    /// instruction.
    pub fn check_branch_consistency(&self, st: &SymbolTable) -> Vec<ListingError> {
        st.symbols_of(Namespace::Label)
            .into_iter()
            .filter(|(address, _)| self.index_of(*address).is_none())
            .map(|(address, name)| ListingError::BranchConsistency {
                label: name.to_string(),
                address,
            })
            .collect()
    }

    /// Disassembly of the whole script. Jump targets are named through `st`,
    /// which gains a label for each one.
    pub fn listing(&self, st: &mut SymbolTable, options: &ListingOptions) -> Listing {
        // render first so every jump target has a label before lines are laid out
        let texts: Vec<String> = self.code.iter().map(|inst| inst.display(st)).collect();

        let mut out = String::new();
        let _ = writeln!(out, "Script {}: {} bytes", self.id, self.bytecode.len());
        if options.show_symbols {
            out.push_str(&st.listing());
        }
        out.push_str("\nCode text:\n");

        for (inst, text) in self.code.iter().zip(&texts) {
            let address = inst.address();
            let label = match st.lookup_symbol(Namespace::Label, address, false) {
                Some(name) => format!("{:<width$}", format!("{}:", name), width = LABEL_WIDTH),
                None => " ".repeat(LABEL_WIDTH),
            };
            if !options.show_bytes {
                let _ = writeln!(out, "{:04X}:\t{}{}", address, label, text);
                continue;
            }
            let mut chunks = inst.frame.hex_chunks(BYTES_PER_LINE);
            if chunks.is_empty() {
                chunks.push(String::new());
            }
            for (i, chunk) in chunks.iter().enumerate() {
                let line_address = address as usize + i * BYTES_PER_LINE;
                if i == 0 {
                    let _ = writeln!(
                        out,
                        "{:04X}: {:<hex$}\t{}{}",
                        line_address,
                        chunk,
                        label,
                        text,
                        hex = HEX_WIDTH
                    );
                } else {
                    let _ = writeln!(out, "{:04X}: {}", line_address, chunk);
                }
            }
        }

        let errors = self.check_branch_consistency(st);
        for e in &errors {
            warn!("script {}: {}", self.id, e);
        }
        Listing { text: out, errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn frames_are_contiguous() {
        // Move VAR_5 = 42; VAR_5++; StopObjectCode
        let bytes = vec![0x1A, 0x05, 0x00, 0x2A, 0x00, 0x46, 0x05, 0x00, 0x00];
        let script = Script::decode(1, bytes).unwrap();
        assert_eq!(script.len(), 3);
        let frames: Vec<&Frame> = script.frames().collect();
        for pair in frames.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start as usize);
        }
        assert_eq!(frames[2].end(), 9);
        assert_eq!(script.index_of(5), Some(1));
        assert_eq!(script.index_of(6), None);
    }

    #[test]
    fn truncated_instruction_fails_whole_script() {
        let bytes = vec![0x00, 0x1A, 0x05];
        assert_eq!(
            Script::decode(1, bytes),
            Err(DecodeError::UnexpectedEnd { offset: 3 })
        );
    }

    #[test]
    fn empty_script_decodes_to_nothing() {
        let script = Script::decode(7, Vec::new()).unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn oversized_script_is_rejected() {
        let bytes = vec![0x80; 0x10000];
        assert_eq!(
            Script::decode(1, bytes),
            Err(DecodeError::ScriptTooLarge { len: 0x10000 })
        );
    }

    #[test]
    fn jump_into_an_instruction_is_inconsistent() {
        // Goto +1 lands on the second byte of the Move
        let bytes = vec![0x18, 0x01, 0x00, 0x1A, 0x05, 0x00, 0x2A, 0x00, 0x00];
        let script = Script::decode(2, bytes).unwrap();
        let mut st = SymbolTable::with_defaults();
        let listing = script.listing(&mut st, &ListingOptions::default());
        assert_eq!(
            listing.errors,
            vec![ListingError::BranchConsistency {
                label: "LABEL_0004".to_string(),
                address: 4
            }]
        );
        assert!(listing.text.contains("Goto LABEL_0004"));
    }

    #[test]
    fn listing_layout() {
        // Goto over the Move, then stop. VAR_5 has a built-in name.
        let bytes = vec![0x18, 0x05, 0x00, 0x1A, 0x05, 0x00, 0x2A, 0x00, 0x00];
        let script = Script::decode(3, bytes).unwrap();
        let mut st = SymbolTable::with_defaults();
        let options = ListingOptions {
            show_bytes: true,
            show_symbols: false,
        };
        let listing = script.listing(&mut st, &options);
        assert!(listing.is_consistent());
        let lines: Vec<&str> = listing.text.lines().collect();
        assert_eq!(lines[0], "Script 3: 9 bytes");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Code text:");
        assert_eq!(
            lines[3],
            "0000: 18 05 00                \tSTART:      Goto LABEL_0008"
        );
        assert_eq!(
            lines[4],
            "0003: 1A 05 00 2A 00          \t            VAR_OVERRIDE = 42"
        );
        assert_eq!(
            lines[5],
            "0008: 00                      \tLABEL_0008: StopObjectCode"
        );
    }

    #[test]
    fn long_frames_wrap_without_text() {
        // SetVarRange over six word values is 16 bytes long
        let mut bytes = vec![0xA6, 0x10, 0x00, 0x06];
        for v in 1..=6u8 {
            bytes.extend([v, 0x00]);
        }
        bytes.push(0x00);
        let script = Script::decode(4, bytes).unwrap();
        let mut st = SymbolTable::new();
        let options = ListingOptions {
            show_bytes: true,
            show_symbols: false,
        };
        let text = script.listing(&mut st, &options).text;
        let lines: Vec<&str> = text.lines().skip(3).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("SetVarRange VAR_16, [1, 2, 3, 4, 5, 6]"));
        assert_eq!(lines[1], "0008: 03 00 04 00 05 00 06 00");
    }

    #[test]
    fn listing_without_bytes() {
        let script = Script::decode(5, vec![0x80, 0x00]).unwrap();
        let mut st = SymbolTable::with_defaults();
        let options = ListingOptions {
            show_bytes: false,
            show_symbols: true,
        };
        let text = script.listing(&mut st, &options).text;
        assert!(text.contains("Labels:\n0000: \tSTART\n"));
        assert!(text.contains("0000:\tSTART:      BreakHere\n"));
        assert!(text.contains("0001:\t            StopObjectCode\n"));
    }
}
