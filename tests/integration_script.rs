//! End-to-end tests for scummtool: decode a script, list it with symbol
//! hints from a config file, then run it on a fresh engine.

use scummtool::vm::Property;
use scummtool::{decode, Config, DecodeError, Engine, RunOptions, SymbolTable};

/// Counts VAR_100 up to 5, doubles it into VAR_101 and sets up the UI.
const COUNTER_SCRIPT: &[u8] = &[
    0x2C, 0x01, // 0000 CursorShow
    0x2C, 0x03, // 0002 UserputOn
    0x1A, 0x64, 0x00, 0x00, 0x00, // 0004 VAR_100 = 0
    0x46, 0x64, 0x00, // 0009 VAR_100++
    0x48, 0x64, 0x00, 0x05, 0x00, 0xF6, 0xFF, // 000C Unless (VAR_100 == 5) Goto 0009
    0xAC, 0x65, 0x00, 0x81, 0x64, 0x00, 0x01, 0x02, 0x00, 0x04, 0xFF, // 0013 VAR_101 = VAR_100 * 2
    0x2C, 0x0D, 0x02, // 001E InitCharset 2
    0x00, // 0021 StopObjectCode
];

const HINTS: &str = r#"
[listing]
show_bytes = false
show_symbols = false

[symbols.var]
LOOP_COUNT = 100
DOUBLED = 101
"#;

#[test]
fn test_listing_uses_symbol_hints() {
    let script = decode(3, COUNTER_SCRIPT).unwrap();
    assert_eq!(script.len(), 8);

    let config = Config::from_toml_str(HINTS).unwrap();
    let mut st = SymbolTable::with_defaults();
    assert_eq!(config.apply_symbols(&mut st).unwrap(), 2);

    let listing = script.listing(&mut st, &config.listing);
    assert!(listing.is_consistent(), "{:?}", listing.errors);

    let code: Vec<&str> = listing
        .text
        .lines()
        .skip_while(|l| *l != "Code text:")
        .skip(1)
        .collect();
    assert_eq!(
        code,
        vec![
            "0000:\tSTART:      CursorShow",
            "0002:\t            UserputOn",
            "0004:\t            LOOP_COUNT = 0",
            "0009:\tLABEL_0009: LOOP_COUNT++",
            "000C:\t            Unless (LOOP_COUNT == 5) Goto LABEL_0009",
            "0013:\t            DOUBLED = LOOP_COUNT * 2",
            "001E:\t            InitCharset CHARSET_0002",
            "0021:\t            StopObjectCode",
        ]
    );
}

#[test]
fn test_run_counter_script() {
    let script = decode(3, COUNTER_SCRIPT).unwrap();
    let mut engine = Engine::new();
    engine.run(&script).unwrap();

    assert_eq!(engine.word(100), Some(5));
    assert_eq!(engine.word(101), Some(10));
    assert_eq!(engine.property(Property::CursorVisible), 1);
    assert_eq!(engine.property(Property::UserputEnabled), 1);
    assert_eq!(engine.property(Property::CharsetCurrent), 2);
}

#[test]
fn test_seeded_runs_repeat() {
    // VAR_5 = GetRandomNumber(100); StopObjectCode
    let script = decode(1, &[0x16, 0x05, 0x00, 0x64, 0x00]).unwrap();
    let options = RunOptions {
        max_instructions: Some(10),
        random_seed: Some(1234),
    };

    let mut first = Engine::with_options(options.clone());
    first.run(&script).unwrap();
    let mut second = Engine::with_options(options);
    second.run(&script).unwrap();

    let value = first.word(5).unwrap();
    assert!((0..=100).contains(&value));
    assert_eq!(second.word(5), Some(value));
}

#[test]
fn test_decode_error_aborts_script() {
    // valid instruction followed by an unknown opcode
    assert_eq!(
        decode(1, &[0x2C, 0x01, 0x67]).map(|s| s.len()),
        Err(DecodeError::UnknownOpcode {
            opcode: 0x67,
            offset: 2
        })
    );
}
