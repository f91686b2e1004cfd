//! Symbol table for disassembly
//!
//! Every addressable entity a script mentions (variables, labels, resources)
//! lives in one [`Namespace`]. Each namespace is a bidirectional name/value
//! map: a name is bound to at most one value and a value to at most one
//! name. Names are synthesized from a per-namespace template the first time
//! a value is looked up with `create` set, so repeated listings of the same
//! script stay stable.

use crate::error::SymbolError;
use bimap::BiMap;
use log::debug;
use std::collections::HashMap;
use std::fmt::Write;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Namespace {
    Var,
    Bit,
    Local,
    Label,
    String,
    Room,
    Script,
    Sound,
    Costume,
    Actor,
    Object,
    Class,
    Music,
    Verb,
    Charset,
}

impl Namespace {
    /// Prefix used when synthesizing names, e.g. `VAR` or `ROOM`
    pub fn prefix(self) -> &'static str {
        self.into()
    }

    /// Name given to `value` when nothing has been declared for it.
    pub fn synthesize(self, value: u16) -> String {
        match self {
            Namespace::Label => format!("LABEL_{:04X}", value),
            Namespace::Charset => format!("CHARSET_{:04}", value),
            _ => format!("{}_{}", self.prefix(), value),
        }
    }

    /// Heading used in symbol listings
    pub fn title(self) -> &'static str {
        match self {
            Namespace::Var => "Word variables",
            Namespace::Bit => "Bit variables",
            Namespace::Local => "Local variables",
            Namespace::Label => "Labels",
            Namespace::String => "Strings",
            Namespace::Room => "Rooms",
            Namespace::Script => "Scripts",
            Namespace::Sound => "Sounds",
            Namespace::Costume => "Costumes",
            Namespace::Actor => "Actors",
            Namespace::Object => "Objects",
            Namespace::Class => "Classes",
            Namespace::Music => "Music",
            Namespace::Verb => "Verbs",
            Namespace::Charset => "Charsets",
        }
    }
}

/// Engine variables with a fixed meaning in the v4 interpreter, indexed by
/// word variable number. Empty entries are unassigned.
const V4_VARIABLES: [&str; 55] = [
    "VAR_RESULT",
    "VAR_EGO",
    "VAR_CAMERA_POS_X",
    "VAR_HAVE_MSG",
    "VAR_ROOM",
    "VAR_OVERRIDE",
    "VAR_MACHINE_SPEED",
    "VAR_ME",
    "VAR_NUM_ACTOR",
    "VAR_CURRENT_LIGHTS",
    "VAR_CURRENTDRIVE",
    "VAR_TMR_1",
    "VAR_TMR_2",
    "VAR_TMR_3",
    "VAR_MUSIC_TIMER",
    "VAR_ACTOR_RANGE_MIN",
    "VAR_ACTOR_RANGE_MAX",
    "VAR_CAMERA_MIN_X",
    "VAR_CAMERA_MAX_X",
    "VAR_TIMER_NEXT",
    "VAR_VIRT_MOUSE_X",
    "VAR_VIRT_MOUSE_Y",
    "VAR_ROOM_RESOURCE",
    "VAR_LAST_SOUND",
    "VAR_CUTSCENEEXIT_KEY",
    "VAR_TALK_ACTOR",
    "VAR_CAMERA_FAST_X",
    "VAR_SCROLL_SCRIPT",
    "VAR_ENTRY_SCRIPT",
    "VAR_ENTRY_SCRIPT2",
    "VAR_EXIT_SCRIPT",
    "VAR_EXIT_SCRIPT2",
    "VAR_VERB_SCRIPT",
    "VAR_SENTENCE_SCRIPT",
    "VAR_INVENTORY_SCRIPT",
    "VAR_CUTSCENE_START_SCRIPT",
    "VAR_CUTSCENE_END_SCRIPT",
    "VAR_CHARINC",
    "VAR_WALKTO_OBJ",
    "VAR_DEBUGMODE",
    "VAR_HEAPSPACE",
    "",
    "VAR_RESTART_KEY",
    "VAR_PAUSE_KEY",
    "VAR_MOUSE_X",
    "VAR_MOUSE_Y",
    "VAR_TIMER",
    "VAR_TIMER_TOTAL",
    "VAR_SOUNDCARD",
    "VAR_VIDEOMODE",
    "VAR_MAINMENU_KEY",
    "VAR_FIXEDDISK",
    "VAR_CURSORSTATE",
    "VAR_USERPUT",
    "VAR_V5_TALK_STRING_Y",
];

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    tables: HashMap<Namespace, BiMap<String, u16>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// A table pre-populated with the `START` label and the v4 engine
    /// variable names.
    pub fn with_defaults() -> Self {
        let mut st = SymbolTable::new();
        st.insert(Namespace::Label, "START", 0);
        for (index, name) in V4_VARIABLES.iter().enumerate() {
            if !name.is_empty() {
                st.insert(Namespace::Var, name, index as u16);
            }
        }
        st
    }

    // Only used for built-in names, which never collide.
    fn insert(&mut self, ns: Namespace, name: &str, value: u16) {
        if let Err(e) = self.declare(ns, name, value) {
            debug!("skipping built-in symbol: {}", e);
        }
    }

    /// Bind `name` to `value` in `ns`. Re-declaring an identical pair is a
    /// no-op; binding either side to something else is a conflict.
    pub fn declare(&mut self, ns: Namespace, name: &str, value: u16) -> Result<(), SymbolError> {
        let table = self.tables.entry(ns).or_default();
        if table.get_by_left(name) == Some(&value) {
            return Ok(());
        }
        table
            .insert_no_overwrite(name.to_string(), value)
            .map_err(|(name, value)| SymbolError::Conflict {
                namespace: ns,
                name,
                value,
            })
    }

    /// Name bound to `value`. With `create` set a missing name is
    /// synthesized from the namespace template and declared.
    pub fn lookup_symbol(&mut self, ns: Namespace, value: u16, create: bool) -> Option<String> {
        if let Some(name) = self.tables.get(&ns).and_then(|t| t.get_by_right(&value)) {
            return Some(name.clone());
        }
        if !create {
            return None;
        }
        let name = ns.synthesize(value);
        let table = self.tables.entry(ns).or_default();
        if table.insert_no_overwrite(name.clone(), value).is_ok() {
            return Some(name);
        }
        // The template name is taken by another value. Existing bindings are
        // never replaced, so suffix until a free name turns up.
        let mut attempt = 0u32;
        loop {
            let unique = if attempt == 0 {
                format!("{}_{:04X}", name, value)
            } else {
                format!("{}_{:04X}_{}", name, value, attempt)
            };
            if table.insert_no_overwrite(unique.clone(), value).is_ok() {
                return Some(unique);
            }
            attempt += 1;
        }
    }

    /// Lookup that always yields a name, creating it when needed.
    pub fn name_of(&mut self, ns: Namespace, value: u16) -> String {
        self.lookup_symbol(ns, value, true)
            .unwrap_or_else(|| ns.synthesize(value))
    }

    pub fn lookup_value(&self, ns: Namespace, name: &str) -> Option<u16> {
        self.tables
            .get(&ns)
            .and_then(|t| t.get_by_left(name))
            .copied()
    }

    /// All symbols of a namespace ordered by value.
    pub fn symbols_of(&self, ns: Namespace) -> Vec<(u16, &str)> {
        let mut out: Vec<(u16, &str)> = self
            .tables
            .get(&ns)
            .map(|t| t.iter().map(|(name, value)| (*value, name.as_str())).collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    pub fn len(&self, ns: Namespace) -> usize {
        self.tables.get(&ns).map(|t| t.len()).unwrap_or(0)
    }

    /// Text listing of every non-empty namespace.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for ns in Namespace::iter() {
            let symbols = self.symbols_of(ns);
            if symbols.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{}:", ns.title());
            for (value, name) in symbols {
                let _ = writeln!(out, "{:04X}: \t{}", value, name);
            }
        }
        out
    }
}
