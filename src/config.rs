//! Tool configuration, read from TOML.
//!
//! ```toml
//! [listing]
//! show_bytes = true
//! show_symbols = false
//!
//! [run]
//! max_instructions = 100000
//! random_seed = 7
//!
//! [symbols.room]
//! DOCK = 1
//!
//! [symbols.var]
//! VAR_GUARD_MOOD = 100
//! ```

use crate::error::ConfigError;
use crate::symbol::{Namespace, SymbolTable};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Options controlling the listing format
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingOptions {
    /// Show the raw bytes of each instruction
    pub show_bytes: bool,
    /// Print the symbol table ahead of the code
    pub show_symbols: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        ListingOptions {
            show_bytes: true,
            show_symbols: true,
        }
    }
}

/// Options for running scripts on the VM
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Abort a thread after this many instructions
    pub max_instructions: Option<u64>,
    /// Seed for `GetRandomNumber`; unseeded runs are not reproducible
    pub random_seed: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listing: ListingOptions,
    pub run: RunOptions,
    /// Namespace name -> symbol name -> value
    pub symbols: BTreeMap<String, BTreeMap<String, u16>>,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        debug!("loading config from {}", path.display());
        let text = fs::read_to_string(path)?;
        Config::from_toml_str(&text)
    }

    /// Declare every symbol hint in `st`. A hint that conflicts with an
    /// existing binding is skipped with a warning.
    pub fn apply_symbols(&self, st: &mut SymbolTable) -> Result<usize, ConfigError> {
        let mut applied = 0;
        for (section, names) in &self.symbols {
            let ns: Namespace = section
                .parse()
                .map_err(|_| ConfigError::UnknownNamespace(section.clone()))?;
            for (name, value) in names {
                match st.declare(ns, name, *value) {
                    Ok(()) => applied += 1,
                    Err(e) => warn!("{}", e),
                }
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.listing.show_bytes);
        assert!(config.listing.show_symbols);
        assert_eq!(config.run.max_instructions, None);
    }

    #[test]
    fn sections_are_read() {
        let config = Config::from_toml_str(
            r#"
            [listing]
            show_bytes = false

            [run]
            max_instructions = 500
            random_seed = 3

            [symbols.room]
            DOCK = 1
            BAR = 2

            [symbols.Actor]
            GUYBRUSH = 1
            "#,
        )
        .unwrap();
        assert!(!config.listing.show_bytes);
        assert!(config.listing.show_symbols);
        assert_eq!(config.run.max_instructions, Some(500));
        assert_eq!(config.run.random_seed, Some(3));

        let mut st = SymbolTable::new();
        assert_eq!(config.apply_symbols(&mut st).unwrap(), 3);
        assert_eq!(st.name_of(Namespace::Room, 2), "BAR");
        assert_eq!(st.name_of(Namespace::Actor, 1), "GUYBRUSH");
    }

    #[test]
    fn unknown_namespace_is_rejected() {
        let config = Config::from_toml_str("[symbols.widgets]\nA = 1\n").unwrap();
        let mut st = SymbolTable::new();
        assert!(matches!(
            config.apply_symbols(&mut st),
            Err(ConfigError::UnknownNamespace(ns)) if ns == "widgets"
        ));
    }

    #[test]
    fn conflicting_hint_is_skipped() {
        let config = Config::from_toml_str("[symbols.var]\nMY_RESULT = 0\n").unwrap();
        let mut st = SymbolTable::with_defaults();
        assert_eq!(config.apply_symbols(&mut st).unwrap(), 0);
        assert_eq!(st.name_of(Namespace::Var, 0), "VAR_RESULT");
    }
}
