//! Parameter value files.
//!
//! A value file assigns user-unit values per module and memory:
//!
//! ```json
//! { "WDRC": { "0": { "AtkTC": 5 },
//!             "1": { "Gain[0]": 0.0, "Gain[1]": 1.0 } } }
//! ```
//!
//! Memory `"0"` is the persistent space; `"1"` through `"4"` are fitting
//! profiles. Entry names may carry an index suffix (`Gain[1]`), which is
//! stripped to find the definition and copied verbatim into the C
//! assignment.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{ConfigError, json_object, json_objects};
use crate::definition::MemorySpace;

/// Number of fitting profiles a device stores.
pub const MAX_PROFILES: u8 = 4;

/// A memory key of a value file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Memory {
    /// Memory `0`.
    Persist,
    /// Memory `1..=4`.
    Profile(u8),
}

impl Memory {
    /// Parse a memory key.
    ///
    /// ```rust
    /// use fwparam_config::Memory;
    ///
    /// assert_eq!(Memory::parse("0"), Some(Memory::Persist));
    /// assert_eq!(Memory::parse("3"), Some(Memory::Profile(3)));
    /// assert_eq!(Memory::parse("5"), None);
    /// ```
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().parse::<u8>().ok()? {
            0 => Some(Self::Persist),
            n if n <= MAX_PROFILES => Some(Self::Profile(n)),
            _ => None,
        }
    }

    /// Definition space the memory's parameters come from.
    pub const fn space(self) -> MemorySpace {
        match self {
            Self::Persist => MemorySpace::Persist,
            Self::Profile(_) => MemorySpace::Profile,
        }
    }
}

impl std::fmt::Display for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persist => f.write_str("0"),
            Self::Profile(n) => write!(f, "{n}"),
        }
    }
}

/// One assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueEntry {
    /// Name without index suffix, used to find the definition.
    pub base: String,
    /// Index suffix as written (`"[1]"`, `"[NUM_CH-1]"`), if any.
    pub index: Option<String>,
    /// User-unit value.
    pub value: f64,
}

impl ValueEntry {
    /// Parse an entry name into base name and index suffix.
    ///
    /// The suffix must be one or more non-empty `[...]` groups.
    pub fn split_name(name: &str) -> Result<(&str, Option<&str>), String> {
        let Some(open) = name.find('[') else {
            return Ok((name, None));
        };
        let (base, suffix) = name.split_at(open);
        if base.is_empty() {
            return Err(format!("entry '{name}' has no parameter name"));
        }

        let mut rest = suffix;
        while !rest.is_empty() {
            let inner = rest
                .strip_prefix('[')
                .and_then(|r| r.find(']').map(|close| (&r[..close], &r[close + 1..])));
            match inner {
                Some((index, tail)) if !index.trim().is_empty() && !index.contains('[') => {
                    rest = tail;
                }
                _ => return Err(format!("malformed index in '{name}'")),
            }
        }
        Ok((base, Some(suffix)))
    }

    /// Name as written in the value file.
    pub fn name(&self) -> String {
        match &self.index {
            Some(index) => format!("{}{index}", self.base),
            None => self.base.clone(),
        }
    }

    /// The index, if the suffix is a single literal `[n]`.
    pub fn numeric_index(&self) -> Option<u32> {
        self.index
            .as_deref()?
            .strip_prefix('[')?
            .strip_suffix(']')
            .filter(|inner| !inner.contains('['))?
            .trim()
            .parse()
            .ok()
    }
}

/// The assignments of one memory, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryBlock {
    /// Which memory.
    pub memory: Memory,
    /// Assignments in file order.
    pub entries: Vec<ValueEntry>,
}

/// The assignments of one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleValues {
    /// Module name.
    pub name: String,
    /// Memories in file order.
    pub blocks: Vec<MemoryBlock>,
}

impl ModuleValues {
    /// Assignments for `memory`, if present.
    pub fn block(&self, memory: Memory) -> Option<&MemoryBlock> {
        self.blocks.iter().find(|b| b.memory == memory)
    }

    /// Profiles with assignments, in file order.
    pub fn profiles(&self) -> impl Iterator<Item = u8> + '_ {
        self.blocks.iter().filter_map(|b| match b.memory {
            Memory::Profile(n) => Some(n),
            Memory::Persist => None,
        })
    }
}

/// A parsed value file.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFile {
    /// Where the file was read from.
    pub path: PathBuf,
    /// Modules in file order.
    pub modules: Vec<ModuleValues>,
}

impl ValueFile {
    /// Load a value file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let file = Self::from_json(&content, path)?;
        tracing::debug!(
            path = %path.display(),
            modules = file.modules.len(),
            "loaded value file"
        );
        Ok(file)
    }

    /// Parse value JSON. `origin` names the source in errors.
    pub fn from_json(json: &str, origin: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let origin = origin.as_ref();
        let raw = json_objects(json, origin)?;

        let mut modules = Vec::with_capacity(raw.len());
        for (module, raw_blocks) in raw {
            let raw_blocks = json_object(raw_blocks, origin)?;
            let mut blocks = Vec::with_capacity(raw_blocks.len());
            for (key, raw_entries) in raw_blocks {
                let memory = Memory::parse(&key).ok_or_else(|| ConfigError::InvalidMemory {
                    module: module.clone(),
                    memory: key.clone(),
                })?;
                let entries = json_object(raw_entries, origin)?
                    .iter()
                    .map(|(name, value)| parse_entry(&module, name, value))
                    .collect::<Result<Vec<_>, _>>()?;
                blocks.push(MemoryBlock { memory, entries });
            }
            modules.push(ModuleValues {
                name: module,
                blocks,
            });
        }

        Ok(Self {
            path: origin.to_path_buf(),
            modules,
        })
    }

    /// Look up a module by name.
    pub fn module(&self, name: &str) -> Option<&ModuleValues> {
        self.modules.iter().find(|m| m.name == name)
    }
}

fn parse_entry(module: &str, name: &str, value: &Value) -> Result<ValueEntry, ConfigError> {
    let (base, index) =
        ValueEntry::split_name(name).map_err(|reason| ConfigError::invalid_value(module, name, reason))?;
    let value = value.as_f64().ok_or_else(|| {
        ConfigError::invalid_value(module, name, format!("expected a number, got {value}"))
    })?;
    Ok(ValueEntry {
        base: base.to_string(),
        index: index.map(str::to_string),
        value,
    })
}
