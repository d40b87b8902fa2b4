//! Parameter initialization code (`FW_Param_Init.c`).
//!
//! [`InitGenerator`] is the batch driver: it walks a value file in order,
//! converts every assignment through the definitions of its module, and
//! renders one `FW_Param_Init()` function. Persistent values are always
//! emitted; of the profile memories only the selected one is.
//!
//! Generation is all-or-nothing. A value outside its legal set, an entry
//! without a definition, a bad index or a malformed descriptor aborts the
//! batch; nothing is returned for partial output. Range corrections are not
//! fatal: the value is clamped and reported in [`InitOutput::diagnostics`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fwparam_config::{
    ConfigError, Elements, Memory, ModuleDefs, ParamDef, ValueEntry, ValueFile, check_profile,
};
use fwparam_core::{Converter, IntegerRounding, Limits, RangeViolation, SystemConstants};

use crate::banner::banner;
use crate::error::CodegenError;
use crate::literal::c_literal;

/// A value that had to be clamped into its firmware range.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeDiagnostic {
    /// Module the parameter belongs to.
    pub module: String,
    /// Parameter as written in the value file.
    pub param: String,
    /// User value before conversion.
    pub user_value: f64,
    /// Direction of the correction.
    pub violation: RangeViolation,
    /// Limits the value was clamped to.
    pub limits: Limits,
}

impl std::fmt::Display for RangeDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let limit = match self.violation {
            RangeViolation::AboveMax => self.limits.max,
            RangeViolation::BelowMin => self.limits.min,
        };
        write!(
            f,
            "{}.{}: {} is {}, limited to {}",
            self.module, self.param, self.user_value, self.violation, limit
        )
    }
}

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct InitOutput {
    /// The generated C source.
    pub code: String,
    /// Number of assignments emitted.
    pub assignments: usize,
    /// Values that were clamped.
    pub diagnostics: Vec<RangeDiagnostic>,
}

/// Batch driver for init code generation.
///
/// # Example
///
/// ```rust
/// use fwparam_codegen::InitGenerator;
/// use fwparam_config::{DefFile, ValueFile};
/// use fwparam_core::SystemConstants;
///
/// let sys = SystemConstants::DEFAULT;
/// let defs = DefFile::from_json(
///     r#"{"SYS": {"Persist": {"GlobalA": {"FractBits": 0, "UserMax": "", "UserMin": "",
///                                          "List": "", "DSPConvert": ""}}}}"#,
///     "SYS_ParamDef.json",
///     &sys,
/// )
/// .unwrap();
/// let values = ValueFile::from_json(r#"{"SYS": {"0": {"GlobalA": 15}}}"#, "vals.json").unwrap();
///
/// let mut generator = InitGenerator::new(&sys);
/// for module in defs.modules {
///     generator.add_module(module);
/// }
/// let output = generator.generate(&values).unwrap();
/// assert!(output.code.contains("    SYS_Params.Persist.GlobalA = (15);\n"));
/// ```
#[derive(Debug)]
pub struct InitGenerator<'a> {
    constants: &'a SystemConstants,
    defs_dir: Option<PathBuf>,
    profile: u8,
    rounding: IntegerRounding,
    modules: HashMap<String, ModuleDefs>,
}

impl<'a> InitGenerator<'a> {
    /// Create a generator for profile 1 with truncating integer rounding.
    pub fn new(constants: &'a SystemConstants) -> Self {
        Self {
            constants,
            defs_dir: None,
            profile: 1,
            rounding: IntegerRounding::default(),
            modules: HashMap::new(),
        }
    }

    /// Load module definitions on demand from `<dir>/<Module>_ParamDef.json`.
    pub fn with_defs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.defs_dir = Some(dir.into());
        self
    }

    /// Select the profile to emit (`1..=4`).
    pub fn with_profile(mut self, profile: u8) -> Self {
        self.profile = profile;
        self
    }

    /// Set the integer rounding mode.
    pub fn with_rounding(mut self, rounding: IntegerRounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Provide a module's definitions directly.
    pub fn add_module(&mut self, module: ModuleDefs) {
        self.modules.insert(module.name.clone(), module);
    }

    /// Selected profile.
    pub fn profile(&self) -> u8 {
        self.profile
    }

    /// Generate the init function for `values`.
    pub fn generate(&mut self, values: &ValueFile) -> Result<InitOutput, CodegenError> {
        check_profile(self.profile)?;
        for module in &values.modules {
            self.ensure_module(&module.name)?;
        }

        let converter = Converter::new(self.constants).with_rounding(self.rounding);
        let source_name = file_name(&values.path);
        let created_from = format!("Created from input file: {source_name}");
        let uses_profile = format!("Uses Profile {}", self.profile);

        let mut code = banner("Parameter initialization code", &[&created_from, &uses_profile]);
        code.push_str("#include \"Common.h\"\n\nvoid FW_Param_Init()\n{\n");

        let mut assignments = 0;
        let mut diagnostics = Vec::new();

        for module in &values.modules {
            let defs = self
                .modules
                .get(&module.name)
                .ok_or_else(|| missing_module(&module.name))?;
            code.push_str(&format!("// {} Parameters\n", module.name));

            for block in &module.blocks {
                if let Memory::Profile(n) = block.memory
                    && n != self.profile
                {
                    tracing::debug!(module = %module.name, profile = n, "skipping unselected profile");
                    continue;
                }
                let space = block.memory.space();
                code.push('\n');

                for entry in &block.entries {
                    let param = entry.name();
                    let def = defs.param(space, &entry.base).ok_or_else(|| {
                        CodegenError::UnknownParam {
                            module: module.name.clone(),
                            space,
                            param: entry.base.clone(),
                        }
                    })?;
                    check_index(&module.name, def, entry)?;

                    let result = converter
                        .convert(entry.value, &def.descriptor, &param)
                        .map_err(|source| CodegenError::Convert {
                            module: module.name.clone(),
                            param: param.clone(),
                            source,
                        })?;
                    if let Some(violation) = result.range {
                        diagnostics.push(RangeDiagnostic {
                            module: module.name.clone(),
                            param: param.clone(),
                            user_value: entry.value,
                            violation,
                            limits: result.limits,
                        });
                    }

                    let literal = c_literal(result.value, def.descriptor.format).ok_or_else(|| {
                        CodegenError::InvalidValue {
                            module: module.name.clone(),
                            param: param.clone(),
                            value: entry.value,
                        }
                    })?;
                    code.push_str(&format!(
                        "    {}_Params.{space}.{param} = {literal};\n",
                        module.name
                    ));
                    assignments += 1;
                }
            }
            code.push('\n');
        }
        code.push_str("}\n");

        tracing::info!(
            modules = values.modules.len(),
            assignments,
            clamped = diagnostics.len(),
            profile = self.profile,
            "generated parameter init code"
        );
        Ok(InitOutput {
            code,
            assignments,
            diagnostics,
        })
    }

    fn ensure_module(&mut self, name: &str) -> Result<(), CodegenError> {
        if self.modules.contains_key(name) {
            return Ok(());
        }
        let Some(dir) = &self.defs_dir else {
            return Err(missing_module(name).into());
        };
        let module = ModuleDefs::load(dir, name, self.constants)?;
        self.modules.insert(name.to_string(), module);
        Ok(())
    }
}

fn missing_module(name: &str) -> ConfigError {
    ConfigError::ModuleNotFound {
        module: name.to_string(),
        path: PathBuf::from(fwparam_config::paths::def_file_name(name)),
    }
}

fn check_index(module: &str, def: &ParamDef, entry: &ValueEntry) -> Result<(), CodegenError> {
    match (&def.elements, &entry.index) {
        (elements, Some(_)) if elements.is_scalar() => Err(CodegenError::IndexOnScalar {
            module: module.to_string(),
            param: entry.name(),
        }),
        (elements, None) if !elements.is_scalar() => Err(CodegenError::MissingIndex {
            module: module.to_string(),
            param: entry.base.clone(),
        }),
        (Elements::Count(count), Some(_)) => match entry.numeric_index() {
            Some(index) if index >= *count => Err(CodegenError::IndexOutOfRange {
                module: module.to_string(),
                param: entry.name(),
                index,
                count: *count,
            }),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
