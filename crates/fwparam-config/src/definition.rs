//! Parameter definition files (`<Module>_ParamDef.json`).
//!
//! A definition file maps module names to parameter spaces (`Persist`,
//! `Profile`), and each space maps parameter names to a descriptor record:
//!
//! ```json
//! { "WDRC": {
//!     "Persist": { "AtkTC": { "FractBits": 23, "UserMax": 1000, "UserMin": 0,
//!                             "List": "", "DSPConvert": "WdrcTC", "Elements": 1 } } } }
//! ```
//!
//! Records are resolved into [`ParamDescriptor`]s when the file is loaded, so
//! every malformed descriptor in a file is reported before anything is
//! converted. Key order is kept throughout: it is the C struct field order.

use std::path::{Path, PathBuf};

use fwparam_core::{
    FixedPointFormat, LegalEntry, LegalValues, MAX_FRACT_BITS, ParamDescriptor, SystemConstants,
    UnitConversion, UserRange,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{ConfigError, json_object, json_objects};
use crate::paths::def_file_name;

/// One of the two parameter memories of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemorySpace {
    /// Device-wide values, stored once.
    Persist,
    /// Per-program values, one copy per fitting profile.
    Profile,
}

impl MemorySpace {
    /// Both spaces, in declaration order.
    pub const ALL: [Self; 2] = [Self::Persist, Self::Profile];

    /// Parse a space name as written in definition files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Persist" => Some(Self::Persist),
            "Profile" => Some(Self::Profile),
            _ => None,
        }
    }

    /// Name as written in definition files and C code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Persist => "Persist",
            Self::Profile => "Profile",
        }
    }
}

impl std::fmt::Display for MemorySpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element count of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elements {
    /// A literal count; `1` is a scalar.
    Count(u32),
    /// A symbolic count (`"NUM_CH"`) or a literal bracket suffix (`"[4][2]"`).
    Symbol(String),
}

impl Default for Elements {
    fn default() -> Self {
        Self::Count(1)
    }
}

impl Elements {
    /// Returns `true` for a single-element parameter.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Count(1))
    }

    /// The literal count, if known.
    pub fn count(&self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(*n),
            Self::Symbol(_) => None,
        }
    }

    /// Array suffix for a C declarator: `""`, `"[4]"`, `"[NUM_CH]"` or the
    /// literal bracket text.
    ///
    /// ```rust
    /// use fwparam_config::Elements;
    ///
    /// assert_eq!(Elements::Count(1).declarator_suffix(), "");
    /// assert_eq!(Elements::Count(4).declarator_suffix(), "[4]");
    /// assert_eq!(Elements::Symbol("NUM_CH".into()).declarator_suffix(), "[NUM_CH]");
    /// assert_eq!(Elements::Symbol("[4][2]".into()).declarator_suffix(), "[4][2]");
    /// ```
    pub fn declarator_suffix(&self) -> String {
        match self {
            Self::Count(1) => String::new(),
            Self::Count(n) => format!("[{n}]"),
            Self::Symbol(s) if s.starts_with('[') => s.clone(),
            Self::Symbol(s) => format!("[{s}]"),
        }
    }
}

impl std::fmt::Display for Elements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Symbol(s) => f.write_str(s),
        }
    }
}

/// A resolved parameter definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    /// Field name in the C struct.
    pub name: String,
    /// Conversion descriptor.
    pub descriptor: ParamDescriptor,
    /// Element count.
    pub elements: Elements,
}

/// The parameters of one space, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpace {
    /// Which space this is.
    pub space: MemorySpace,
    /// Parameters in declaration order.
    pub params: Vec<ParamDef>,
}

impl ParamSpace {
    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// All parameter definitions of one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDefs {
    /// Module name, the prefix of its C types and globals.
    pub name: String,
    /// Spaces in declaration order.
    pub spaces: Vec<ParamSpace>,
}

impl ModuleDefs {
    /// Load the definitions of `module` from `<defs_dir>/<module>_ParamDef.json`.
    pub fn load(
        defs_dir: &Path,
        module: &str,
        constants: &SystemConstants,
    ) -> Result<Self, ConfigError> {
        let path = defs_dir.join(def_file_name(module));
        let file = DefFile::load(&path, constants)?;
        file.modules
            .into_iter()
            .find(|m| m.name == module)
            .ok_or_else(|| ConfigError::ModuleNotFound {
                module: module.to_string(),
                path,
            })
    }

    /// The parameters of `space`, if the module declares it.
    pub fn space(&self, space: MemorySpace) -> Option<&ParamSpace> {
        self.spaces.iter().find(|s| s.space == space)
    }

    /// Look up a parameter in `space`.
    pub fn param(&self, space: MemorySpace, name: &str) -> Option<&ParamDef> {
        self.space(space)?.get(name)
    }
}

/// A parsed definition file.
#[derive(Debug, Clone, PartialEq)]
pub struct DefFile {
    /// Where the file was read from.
    pub path: PathBuf,
    /// Modules in file order.
    pub modules: Vec<ModuleDefs>,
}

impl DefFile {
    /// Load and resolve a definition file.
    pub fn load(path: impl AsRef<Path>, constants: &SystemConstants) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let file = Self::from_json(&content, path, constants)?;
        tracing::debug!(
            path = %path.display(),
            modules = file.modules.len(),
            "loaded definition file"
        );
        Ok(file)
    }

    /// Resolve definition JSON. `origin` names the source in errors.
    pub fn from_json(
        json: &str,
        origin: impl AsRef<Path>,
        constants: &SystemConstants,
    ) -> Result<Self, ConfigError> {
        let origin = origin.as_ref();
        let raw = json_objects(json, origin)?;

        let mut modules = Vec::with_capacity(raw.len());
        for (module, raw_spaces) in raw {
            let raw_spaces = json_object(raw_spaces, origin)?;
            let mut spaces = Vec::with_capacity(raw_spaces.len());
            for (space_name, raw_params) in raw_spaces {
                let space =
                    MemorySpace::from_name(&space_name).ok_or_else(|| ConfigError::UnknownSpace {
                        module: module.clone(),
                        space: space_name.clone(),
                    })?;
                let params = json_object(raw_params, origin)?
                    .into_iter()
                    .map(|(name, raw)| {
                        let raw: RawParamDef = serde_json::from_value(raw)
                            .map_err(|e| ConfigError::json(origin, e))?;
                        resolve_param(&module, name, &raw, constants)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                spaces.push(ParamSpace { space, params });
            }
            modules.push(ModuleDefs {
                name: module,
                spaces,
            });
        }

        Ok(Self {
            path: origin.to_path_buf(),
            modules,
        })
    }

    /// Look up a module by name.
    pub fn module(&self, name: &str) -> Option<&ModuleDefs> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Load every definition file in `dir`, in file name order.
    pub fn load_dir(dir: &Path, constants: &SystemConstants) -> Result<Vec<Self>, ConfigError> {
        crate::paths::list_def_files(dir)?
            .iter()
            .map(|path| Self::load(path, constants))
            .collect()
    }
}

/// Descriptor record as written. Every key but `Elements` is required; a
/// JSON `null` counts as absent.
#[derive(Debug, Deserialize)]
struct RawParamDef {
    #[serde(rename = "FractBits")]
    fract_bits: Option<Value>,
    #[serde(rename = "UserMax")]
    user_max: Option<Value>,
    #[serde(rename = "UserMin")]
    user_min: Option<Value>,
    #[serde(rename = "List")]
    list: Option<Value>,
    #[serde(rename = "DSPConvert")]
    dsp_convert: Option<Value>,
    #[serde(rename = "Elements")]
    elements: Option<Value>,
}

fn resolve_param(
    module: &str,
    name: String,
    raw: &RawParamDef,
    constants: &SystemConstants,
) -> Result<ParamDef, ConfigError> {
    let field = |key: &'static str, value: &Option<Value>| {
        value
            .clone()
            .ok_or_else(|| ConfigError::missing_key(module, &name, key))
    };
    let fract_bits = field("FractBits", &raw.fract_bits)?;
    let user_max = field("UserMax", &raw.user_max)?;
    let user_min = field("UserMin", &raw.user_min)?;
    let list = field("List", &raw.list)?;
    let dsp_convert = field("DSPConvert", &raw.dsp_convert)?;

    let format = parse_fract_bits(module, &name, &fract_bits)?;
    let user_range = UserRange::from_bounds(
        parse_bound(module, &name, "UserMin", &user_min)?,
        parse_bound(module, &name, "UserMax", &user_max)?,
    )
    .map_err(|_| ConfigError::HalfSpecifiedRange {
        module: module.to_string(),
        param: name.clone(),
    })?;
    let legal = parse_list(module, &name, &list)?;
    let conversion = parse_conversion(module, &name, &dsp_convert, constants)?;
    let elements = parse_elements(module, &name, raw.elements.as_ref())?;

    if let Some(legal) = &legal {
        legal
            .validate(user_range)
            .map_err(|source| ConfigError::Descriptor {
                module: module.to_string(),
                param: name.clone(),
                source,
            })?;
    }

    Ok(ParamDef {
        descriptor: ParamDescriptor {
            format,
            user_range,
            legal,
            conversion,
        },
        elements,
        name,
    })
}

/// `""` (or whitespace) is the unspecified sentinel.
fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.trim().is_empty())
}

fn parse_fract_bits(
    module: &str,
    param: &str,
    value: &Value,
) -> Result<FixedPointFormat, ConfigError> {
    if is_blank(value) {
        return Ok(FixedPointFormat::INTEGER);
    }
    let bits = value.as_i64().ok_or_else(|| {
        ConfigError::invalid_field(module, param, "FractBits", format!("expected an integer or \"\", got {value}"))
    })?;
    u8::try_from(bits)
        .ok()
        .and_then(FixedPointFormat::new)
        .ok_or_else(|| {
            ConfigError::invalid_field(
                module,
                param,
                "FractBits",
                format!("{bits} outside 0..={MAX_FRACT_BITS}"),
            )
        })
}

fn parse_bound(
    module: &str,
    param: &str,
    key: &'static str,
    value: &Value,
) -> Result<Option<f64>, ConfigError> {
    if is_blank(value) {
        return Ok(None);
    }
    value.as_f64().map(Some).ok_or_else(|| {
        ConfigError::invalid_field(module, param, key, format!("expected a number or \"\", got {value}"))
    })
}

fn parse_list(
    module: &str,
    param: &str,
    value: &Value,
) -> Result<Option<LegalValues>, ConfigError> {
    let invalid = |reason: String| ConfigError::invalid_field(module, param, "List", reason);

    match value {
        v if is_blank(v) => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(|step| Some(LegalValues::Step(step)))
            .ok_or_else(|| invalid(format!("step {n} is not representable"))),
        Value::Array(items) if items.is_empty() => Err(invalid("list has no entries".to_string())),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => LegalEntry::parse(text).map_err(|e| invalid(e.to_string())),
                Value::Number(n) => n
                    .as_i64()
                    .map(LegalEntry::new)
                    .ok_or_else(|| invalid(format!("list value {n} is not an integer"))),
                other => Err(invalid(format!("unexpected list entry {other}"))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|entries| Some(LegalValues::List(entries))),
        other => Err(invalid(format!(
            "expected \"\", a step or an array of \"value=label\" entries, got {other}"
        ))),
    }
}

fn parse_conversion(
    module: &str,
    param: &str,
    value: &Value,
    constants: &SystemConstants,
) -> Result<UnitConversion, ConfigError> {
    let descriptor_err = |source| ConfigError::Descriptor {
        module: module.to_string(),
        param: param.to_string(),
        source,
    };
    match value {
        Value::String(selector) => {
            UnitConversion::from_selector(selector, constants).map_err(descriptor_err)
        }
        Value::Number(n) => {
            let factor = n.as_f64().unwrap_or(f64::NAN);
            UnitConversion::scale(factor).map_err(descriptor_err)
        }
        other => Err(ConfigError::invalid_field(
            module,
            param,
            "DSPConvert",
            format!("expected a number or a string, got {other}"),
        )),
    }
}

fn parse_elements(
    module: &str,
    param: &str,
    value: Option<&Value>,
) -> Result<Elements, ConfigError> {
    let invalid = |reason: String| ConfigError::invalid_field(module, param, "Elements", reason);

    let Some(value) = value else {
        return Ok(Elements::default());
    };
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|&n| n > 0)
            .map(Elements::Count)
            .ok_or_else(|| invalid(format!("{n} is not a positive count"))),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(invalid("empty element count".to_string()));
            }
            if let Ok(n) = text.parse::<u32>() {
                return if n > 0 {
                    Ok(Elements::Count(n))
                } else {
                    Err(invalid("0 is not a positive count".to_string()))
                };
            }
            if text.starts_with('[') && !text.ends_with(']') {
                return Err(invalid(format!("unbalanced brackets in '{text}'")));
            }
            Ok(Elements::Symbol(text.to_string()))
        }
        other => Err(invalid(format!("expected a count or a string, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwparam_core::ConvertError;

    const SYS: SystemConstants = SystemConstants::DEFAULT;

    fn load(json: &str) -> Result<DefFile, ConfigError> {
        DefFile::from_json(json, "test.json", &SYS)
    }

    fn single(def: &str) -> Result<ParamDef, ConfigError> {
        let json = format!(r#"{{"M": {{"Persist": {{"P": {def}}}}}}}"#);
        let mut file = load(&json)?;
        Ok(file.modules.remove(0).spaces.remove(0).params.remove(0))
    }

    const PLAIN: &str =
        r#"{"FractBits": 0, "UserMax": "", "UserMin": "", "List": "", "DSPConvert": ""}"#;

    #[test]
    fn plain_integer_definition() {
        let def = single(PLAIN).unwrap();
        assert_eq!(def.name, "P");
        assert_eq!(def.descriptor, ParamDescriptor::integer());
        assert_eq!(def.elements, Elements::Count(1));
    }

    #[test]
    fn full_definition_resolves() {
        let def = single(
            r#"{"FractBits": 23, "UserMax": 1000, "UserMin": 0, "List": "",
                "DSPConvert": "WdrcTC", "Elements": 1}"#,
        )
        .unwrap();
        assert_eq!(def.descriptor.format.fract_bits(), 23);
        assert_eq!(def.descriptor.user_range, Some(UserRange::new(0.0, 1000.0)));
        assert_eq!(def.descriptor.conversion, UnitConversion::WdrcTimeConstant);
    }

    #[test]
    fn blank_fract_bits_is_integer() {
        let def = single(
            r#"{"FractBits": "", "UserMax": "", "UserMin": "", "List": "", "DSPConvert": ""}"#,
        )
        .unwrap();
        assert!(def.descriptor.format.is_integer());
    }

    #[test]
    fn keeps_declaration_order() {
        let json = format!(
            r#"{{"M": {{"Profile": {{"Z": {PLAIN}, "A": {PLAIN}}}, "Persist": {{"Q": {PLAIN}}}}}}}"#
        );
        let file = load(&json).unwrap();
        let module = &file.modules[0];
        assert_eq!(module.spaces[0].space, MemorySpace::Profile);
        let names: Vec<_> = module.spaces[0].params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Z", "A"]);
        assert!(module.param(MemorySpace::Persist, "Q").is_some());
        assert!(module.param(MemorySpace::Persist, "Z").is_none());
    }

    #[test]
    fn repeated_param_keeps_last_definition() {
        let json = format!(
            r#"{{"M": {{"Persist": {{
                "A": {PLAIN},
                "B": {PLAIN},
                "A": {{"FractBits": 23, "UserMax": "", "UserMin": "", "List": "", "DSPConvert": ""}}
            }}}}}}"#
        );
        let file = load(&json).unwrap();
        let params = &file.modules[0].spaces[0].params;
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        let a = file.modules[0].param(MemorySpace::Persist, "A").unwrap();
        assert_eq!(a.descriptor.format.fract_bits(), 23);
    }

    #[test]
    fn non_object_space_is_rejected() {
        let err = load(r#"{"M": {"Persist": 5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }), "{err}");
        let err = load(r#"{"M": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }), "{err}");
    }

    #[test]
    fn missing_key_is_fatal() {
        let err = single(r#"{"FractBits": 0, "UserMax": "", "UserMin": "", "List": ""}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "DSPConvert", .. }));

        let err = single(r#"{"UserMax": "", "UserMin": "", "List": "", "DSPConvert": ""}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "FractBits", .. }));
    }

    #[test]
    fn half_specified_range_is_rejected() {
        let err = single(
            r#"{"FractBits": 0, "UserMax": 10, "UserMin": "", "List": "", "DSPConvert": ""}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::HalfSpecifiedRange { .. }));
    }

    #[test]
    fn fract_bits_out_of_range() {
        for bits in ["24", "-1", "1.5", "\"abc\""] {
            let def = format!(
                r#"{{"FractBits": {bits}, "UserMax": "", "UserMin": "", "List": "", "DSPConvert": ""}}"#
            );
            let err = single(&def).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidField { key: "FractBits", .. }),
                "{bits}: {err}"
            );
        }
    }

    #[test]
    fn unknown_space_is_rejected() {
        let err = load(&format!(r#"{{"M": {{"Scratch": {{"P": {PLAIN}}}}}}}"#)).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSpace { ref space, .. } if space == "Scratch"));
    }

    #[test]
    fn list_forms() {
        let def = single(
            r#"{"FractBits": 0, "UserMax": 20, "UserMin": 0, "List": 5, "DSPConvert": ""}"#,
        )
        .unwrap();
        assert_eq!(def.descriptor.legal, Some(LegalValues::Step(5.0)));

        let def = single(
            r#"{"FractBits": 0, "UserMax": "", "UserMin": "", "List": ["0=Off", "1=On", 4],
                "DSPConvert": ""}"#,
        )
        .unwrap();
        assert_eq!(
            def.descriptor.legal,
            Some(LegalValues::List(vec![
                LegalEntry::new(0).with_label("Off"),
                LegalEntry::new(1).with_label("On"),
                LegalEntry::new(4),
            ]))
        );
    }

    #[test]
    fn bad_list_entries_are_rejected() {
        for list in [r#"["Off=0"]"#, "[]", "[1.5]", "true"] {
            let def = format!(
                r#"{{"FractBits": 0, "UserMax": "", "UserMin": "", "List": {list}, "DSPConvert": ""}}"#
            );
            let err = single(&def).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidField { key: "List", .. }), "{list}: {err}");
        }
    }

    #[test]
    fn step_without_range_is_caught_at_load() {
        let err = single(
            r#"{"FractBits": 0, "UserMax": "", "UserMin": "", "List": 5, "DSPConvert": ""}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Descriptor {
                source: ConvertError::StepWithoutRange,
                ..
            }
        ));
    }

    #[test]
    fn large_step_grid_loads() {
        let def = single(
            r#"{"FractBits": 0, "UserMax": 1e12, "UserMin": 0, "List": 1, "DSPConvert": ""}"#,
        )
        .unwrap();
        let legal = def.descriptor.legal.as_ref().unwrap();
        assert!(legal.admits(123_456_789.0, def.descriptor.user_range).unwrap());
        assert!(!legal.admits(0.5, def.descriptor.user_range).unwrap());
    }

    #[test]
    fn conversion_forms() {
        let conv = |c: &str| {
            let def = format!(
                r#"{{"FractBits": 16, "UserMax": "", "UserMin": "", "List": "", "DSPConvert": {c}}}"#
            );
            single(&def).map(|d| d.descriptor.conversion)
        };
        assert_eq!(conv("0.5").unwrap(), UnitConversion::Scale(0.5));
        assert_eq!(conv(r#""Input_dB_SPL""#).unwrap(), UnitConversion::InputDbSpl);
        assert_eq!(conv(r#""(2**-3)""#).unwrap(), UnitConversion::Scale(0.125));
        assert!(matches!(conv(r#""NoSuchFormula""#), Err(ConfigError::Descriptor { .. })));
        assert!(matches!(conv("[1]"), Err(ConfigError::InvalidField { key: "DSPConvert", .. })));
    }

    #[test]
    fn element_forms() {
        let elements = |e: &str| {
            let def = format!(
                r#"{{"FractBits": 0, "UserMax": "", "UserMin": "", "List": "", "DSPConvert": "", "Elements": {e}}}"#
            );
            single(&def).map(|d| d.elements)
        };
        assert_eq!(elements("4").unwrap(), Elements::Count(4));
        assert_eq!(elements(r#""8""#).unwrap(), Elements::Count(8));
        assert_eq!(elements(r#""NUM_CH""#).unwrap(), Elements::Symbol("NUM_CH".into()));
        assert_eq!(elements(r#""[4][2]""#).unwrap(), Elements::Symbol("[4][2]".into()));
        assert!(elements("0").is_err());
        assert!(elements(r#""[4""#).is_err());
        assert!(elements("-2").is_err());
    }

    #[test]
    fn malformed_json_names_origin() {
        let err = load("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
        assert!(err.to_string().contains("test.json"));
    }
}
