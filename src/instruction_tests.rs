use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Instruction;
use crate::symbol::SymbolTable;
use test_log::test;

fn decode_one(bytes: &[u8]) -> Result<Instruction, DecodeError> {
    let mut r = ByteCursor::new(bytes);
    let inst = Instruction::decode(&mut r)?;
    assert!(
        r.is_exhausted(),
        "{:02X?} left {} bytes after {}",
        bytes,
        r.remaining(),
        inst.mnemonic()
    );
    Ok(inst)
}

fn text_of(bytes: &[u8]) -> String {
    let inst = decode_one(bytes).unwrap_or_else(|e| panic!("{:02X?}: {}", bytes, e));
    assert_eq!(inst.frame.bytes, bytes);
    let mut st = SymbolTable::new();
    inst.display(&mut st)
}

#[test]
fn test_disassembly_text() {
    let cases: &[(&[u8], &str)] = &[
        (&[0x2C, 0x01], "CursorShow"),
        (&[0x2C, 0x0A, 0x01, 0x41], "SetCursorImg 1, 'A'"),
        (&[0x2C, 0x0D, 0x01], "InitCharset CHARSET_0001"),
        (&[0x2C, 0x8A, 0x05, 0x00, 0x41], "SetCursorImg VAR_5, 'A'"),
        (&[0x00], "StopObjectCode"),
        (&[0xA0], "StopObjectCode"),
        (&[0x80], "BreakHere"),
        (&[0x18, 0x10, 0x00], "Goto LABEL_0013"),
        (
            &[0x48, 0x05, 0x00, 0x03, 0x00, 0x00, 0x00],
            "Unless (VAR_5 == 3) Goto LABEL_0007",
        ),
        (
            &[0xF8, 0x05, 0x00, 0x06, 0x00, 0x02, 0x00],
            "Unless (VAR_5 < VAR_6) Goto LABEL_0009",
        ),
        (
            &[0x28, 0x01, 0x80, 0xFE, 0xFF],
            "Unless (BIT_1 == 0) Goto LABEL_0003",
        ),
        (&[0x9A, 0x05, 0x00, 0x06, 0x00], "VAR_5 = VAR_6"),
        (&[0x5A, 0x02, 0x40, 0x0A, 0x00], "LOCAL_2 += 10"),
        (&[0x46, 0x05, 0x20, 0x03, 0x00], "VAR_5[3]++"),
        (
            &[0x4A, 0x0C, 0x01, 0x07, 0x00, 0xFF],
            "StartScript SCRIPT_12, [7], Recursive",
        ),
        (&[0x0C, 0x01, 0x05], "LoadScript SCRIPT_5"),
        (&[0x0C, 0x11], "ClearHeap"),
        (&[0x20], "StopMusic"),
        (&[0x1C, 0x03], "StartSound SOUND_3"),
        (&[0x7C, 0x01, 0x00, 0x04], "VAR_1 = IsSoundRunning(SOUND_4)"),
        (&[0x6B, 0x2A, 0x00], "Debug 42"),
        (&[0xAE, 0x02], "WaitForMessage"),
        // cursor router
        (&[0x2C, 0x02], "CursorHide"),
        (&[0x2C, 0x03], "UserputOn"),
        (&[0x2C, 0x04], "UserputOff"),
        (&[0x2C, 0x05], "CursorSoftOn"),
        (&[0x2C, 0x06], "CursorSoftOff"),
        (&[0x2C, 0x07], "UserputSoftOn"),
        (&[0x2C, 0x08], "UserputSoftOff"),
        (&[0x2C, 0x0B, 0x01, 0x02, 0x03], "SetCursorHotspot 1, 2, 3"),
        (
            &[0x2C, 0x2B, 0x01, 0x02, 0x05, 0x00],
            "SetCursorHotspot 1, 2, VAR_5",
        ),
        (&[0x2C, 0x0C, 0x01], "InitCursor 1"),
        // class, box and state branches
        (
            &[0x1D, 0x2A, 0x00, 0x01, 0x05, 0x00, 0xFF, 0x02, 0x00],
            "Unless (ClassOfIs(OBJECT_42, [CLASS_5])) Goto LABEL_000B",
        ),
        (
            &[0x1F, 0x03, 0x04, 0x00, 0x00],
            "Unless (ActorInBox(ACTOR_3, 4)) Goto LABEL_0005",
        ),
        (
            &[0x0F, 0x64, 0x00, 0x01, 0x01, 0x00],
            "Unless (State(OBJECT_100) == 1) Goto LABEL_0007",
        ),
        (
            &[0x2F, 0x64, 0x00, 0x01, 0x01, 0x00],
            "Unless (State(OBJECT_100) != 1) Goto LABEL_0007",
        ),
        (
            &[0x8F, 0x05, 0x00, 0x01, 0x00, 0x00],
            "Unless (State(VAR_5) == 1) Goto LABEL_0006",
        ),
        // cutscenes, delays and freezing
        (&[0x40, 0x01, 0x03, 0x00, 0xFF], "Cutscene [3]"),
        (&[0xC0], "EndCutscene"),
        (&[0x2E, 0x01, 0x02, 0x03], "Delay 197121"),
        (&[0x2B, 0x09, 0x00], "DelayVariable VAR_9"),
        (&[0x60, 0x01], "FreezeScripts 1"),
        (&[0xE0, 0x07, 0x00], "FreezeScripts VAR_7"),
        // each of bits 7, 6 and 5 selects a variable operand
        (&[0x01, 0x02, 0x0A, 0x00, 0x14, 0x00], "PutActor ACTOR_2, 10, 20"),
        (&[0x21, 0x02, 0x0A, 0x00, 0x06, 0x00], "PutActor ACTOR_2, 10, VAR_6"),
        (
            &[0xE1, 0x03, 0x00, 0x04, 0x00, 0x02, 0x40],
            "PutActor VAR_3, VAR_4, LOCAL_2",
        ),
        (&[0x1E, 0x01, 0x64, 0x00, 0x78, 0x00], "WalkActorTo ACTOR_1, 100, 120"),
        (&[0x5E, 0x01, 0x08, 0x00, 0x78, 0x00], "WalkActorTo ACTOR_1, VAR_8, 120"),
        // rooms, scripts and sentences
        (
            &[0x24, 0x2A, 0x00, 0x05, 0x10, 0x00, 0x20, 0x00],
            "LoadRoomWithEgo OBJECT_42, ROOM_5, 16, 32",
        ),
        (&[0x70, 0x0A, 0x00, 0x00], "Lights 10, 0, 0"),
        (&[0x42, 0x05, 0x01, 0x01, 0x00, 0xFF], "ChainScript SCRIPT_5, [1]"),
        (&[0x37, 0x2A, 0x00, 0x03, 0xFF], "StartObject OBJECT_42, VERB_3, []"),
        (
            &[0x19, 0x02, 0x2A, 0x00, 0x2B, 0x00],
            "DoSentence VERB_2, OBJECT_42, OBJECT_43",
        ),
        (&[0x19, 0xFE], "StopSentence"),
    ];
    for (bytes, expected) in cases {
        assert_eq!(text_of(bytes), *expected, "bytes {:02X?}", bytes);
    }
}

#[test]
fn test_unknown_opcode() {
    assert_eq!(
        decode_one(&[0x67]),
        Err(DecodeError::UnknownOpcode {
            opcode: 0x67,
            offset: 0
        })
    );
}

#[test]
fn test_recognized_but_unsupported_opcodes() {
    assert_eq!(
        decode_one(&[0x05, 0x01, 0x00]),
        Err(DecodeError::UnimplementedOpcode {
            opcode: 0x05,
            name: "DrawObject",
            offset: 0
        })
    );
    assert_eq!(
        decode_one(&[0x4C]),
        Err(DecodeError::UnimplementedOpcode {
            opcode: 0x4C,
            name: "SoundKludge",
            offset: 0
        })
    );
}

#[test]
fn test_unknown_sub_opcode_reports_sub_offset() {
    assert_eq!(
        decode_one(&[0x2C, 0x09]),
        Err(DecodeError::UnknownSubOpcode {
            opcode: 0x2C,
            sub: 0x09,
            offset: 1
        })
    );
}

#[test]
fn test_truncated_operand() {
    assert_eq!(
        decode_one(&[0x1A, 0x05]),
        Err(DecodeError::UnexpectedEnd { offset: 2 })
    );
}

#[test]
fn test_invalid_pointer() {
    assert_eq!(
        decode_one(&[0x1A, 0x00, 0x41, 0x01, 0x00]),
        Err(DecodeError::InvalidPointerEncoding {
            raw: 0x4100,
            offset: 1
        })
    );
}

#[test]
fn test_override_needs_goto() {
    assert_eq!(
        text_of(&[0x58, 0x01, 0x18, 0x04, 0x00]),
        "BeginOverride Goto LABEL_0009"
    );
    assert_eq!(text_of(&[0x58, 0x00]), "EndOverride");
    assert_eq!(
        decode_one(&[0x58, 0x01, 0x19, 0x00, 0x00]),
        Err(DecodeError::UnknownSubOpcode {
            opcode: 0x58,
            sub: 0x19,
            offset: 2
        })
    );
}

#[test]
fn test_aliases_keep_operand_bits() {
    // same family, first operand literal vs variable
    let literal = decode_one(&[0x1C, 0x03]).unwrap();
    let variable = decode_one(&[0x9C, 0x03, 0x00]).unwrap();
    assert_eq!(literal.mnemonic(), variable.mnemonic());
    let mut st = SymbolTable::new();
    assert_eq!(variable.display(&mut st), "StartSound VAR_3");
}
