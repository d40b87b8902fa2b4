//! Project configuration (`fwparam.toml`).
//!
//! ```toml
//! defs_dir = "ParamDefs"
//! include_dir = "Shared/include"
//! init_output = "Fxp_C_Model/FW_Param_Init.c"
//! profile = 1
//! integer_rounding = "truncate"
//!
//! [constants]
//! baseband_sample_rate = 24000.0
//! fullscale_input_db_spl = 110.0
//! ```
//!
//! Every key is optional. Relative paths are resolved against the directory
//! of the file they were read from.

use std::path::{Path, PathBuf};

use fwparam_core::{IntegerRounding, SystemConstants};
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::values::MAX_PROFILES;

/// Default directory holding `*_ParamDef.json` files.
pub const DEFAULT_DEFS_DIR: &str = "ParamDefs";

/// Integer quantization, as spelled in the project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Toward zero.
    #[default]
    Truncate,
    /// To nearest, halves away from zero.
    Nearest,
}

impl From<RoundingMode> for IntegerRounding {
    fn from(mode: RoundingMode) -> Self {
        match mode {
            RoundingMode::Truncate => IntegerRounding::Truncate,
            RoundingMode::Nearest => IntegerRounding::Nearest,
        }
    }
}

/// Overrides for [`SystemConstants`]; unset fields keep the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstantOverrides {
    /// Baseband sample rate in Hz.
    pub baseband_sample_rate: Option<f64>,
    /// Baseband to subband decimation factor.
    pub subband_decimation: Option<u32>,
    /// WDRC channel count.
    pub wdrc_channels: Option<u32>,
    /// Subband to NR decimation factor.
    pub nr_decimation: Option<u32>,
    /// Minimum SNR of the NR gain table in dB.
    pub nr_gain_lut_min_snr: Option<f64>,
    /// Input full scale in dB SPL.
    pub fullscale_input_db_spl: Option<f64>,
    /// Output full scale in dB SPL.
    pub fullscale_output_db_spl: Option<f64>,
}

impl ConstantOverrides {
    /// Apply the overrides on top of `base`.
    ///
    /// Rates must be positive and finite, decimation factors non-zero.
    pub fn apply(&self, base: SystemConstants) -> Result<SystemConstants, ConfigError> {
        let mut sys = base;
        if let Some(rate) = self.baseband_sample_rate {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(ConfigError::InvalidConfig(format!(
                    "baseband_sample_rate must be positive, got {rate}"
                )));
            }
            sys.baseband_sample_rate = rate;
        }
        for (key, value, slot) in [
            ("subband_decimation", self.subband_decimation, &mut sys.subband_decimation),
            ("wdrc_channels", self.wdrc_channels, &mut sys.wdrc_channels),
            ("nr_decimation", self.nr_decimation, &mut sys.nr_decimation),
        ] {
            match value {
                Some(0) => {
                    return Err(ConfigError::InvalidConfig(format!("{key} must be non-zero")));
                }
                Some(n) => *slot = n,
                None => {}
            }
        }
        for (key, value, slot) in [
            ("nr_gain_lut_min_snr", self.nr_gain_lut_min_snr, &mut sys.nr_gain_lut_min_snr),
            ("fullscale_input_db_spl", self.fullscale_input_db_spl, &mut sys.fullscale_input_db_spl),
            ("fullscale_output_db_spl", self.fullscale_output_db_spl, &mut sys.fullscale_output_db_spl),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(ConfigError::InvalidConfig(format!("{key} must be finite")));
                }
                *slot = v;
            }
        }
        Ok(sys)
    }
}

/// Contents of `fwparam.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory of definition files.
    pub defs_dir: Option<PathBuf>,
    /// Output directory for struct headers.
    pub include_dir: Option<PathBuf>,
    /// Output file for the init function.
    pub init_output: Option<PathBuf>,
    /// Profile to emit (`1..=4`).
    pub profile: Option<u8>,
    /// Integer quantization.
    pub integer_rounding: RoundingMode,
    /// System constant overrides.
    pub constants: ConstantOverrides,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load a project file; relative paths resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let mut config = Self::from_toml(&content, path)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!(path = %path.display(), "loaded project config");
        Ok(config)
    }

    /// Parse project TOML. `origin` names the source in errors.
    pub fn from_toml(toml_str: &str, origin: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| ConfigError::toml(origin.as_ref(), e))?;
        if let Some(profile) = config.profile {
            check_profile(profile)?;
        }
        Ok(config)
    }

    /// Resolve `path` against the config file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Definition directory, defaulting to `ParamDefs`.
    pub fn defs_dir(&self) -> PathBuf {
        self.resolve(
            self.defs_dir
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_DEFS_DIR)),
        )
    }

    /// Header output directory, if configured.
    pub fn include_dir(&self) -> Option<PathBuf> {
        self.include_dir.as_deref().map(|p| self.resolve(p))
    }

    /// Init output file, if configured.
    pub fn init_output(&self) -> Option<PathBuf> {
        self.init_output.as_deref().map(|p| self.resolve(p))
    }

    /// Profile to emit, defaulting to 1.
    pub fn profile(&self) -> u8 {
        self.profile.unwrap_or(1)
    }

    /// Integer quantization for the converter.
    pub fn rounding(&self) -> IntegerRounding {
        self.integer_rounding.into()
    }

    /// Default constants with the overrides applied.
    pub fn system_constants(&self) -> Result<SystemConstants, ConfigError> {
        self.constants.apply(SystemConstants::DEFAULT)
    }
}

/// Check that `profile` names a stored profile.
pub fn check_profile(profile: u8) -> Result<(), ConfigError> {
    if (1..=MAX_PROFILES).contains(&profile) {
        Ok(())
    } else {
        Err(ConfigError::InvalidConfig(format!(
            "profile must be 1-{MAX_PROFILES}, got {profile}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ProjectConfig::from_toml("", "fwparam.toml").unwrap();
        assert_eq!(config.defs_dir(), PathBuf::from(DEFAULT_DEFS_DIR));
        assert_eq!(config.profile(), 1);
        assert_eq!(config.rounding(), IntegerRounding::Truncate);
        assert_eq!(config.system_constants().unwrap(), SystemConstants::DEFAULT);
        assert!(config.init_output().is_none());
    }

    #[test]
    fn parses_all_keys() {
        let config = ProjectConfig::from_toml(
            r#"
            defs_dir = "defs"
            include_dir = "inc"
            init_output = "out/FW_Param_Init.c"
            profile = 3
            integer_rounding = "nearest"

            [constants]
            baseband_sample_rate = 48000.0
            nr_decimation = 2
            fullscale_input_db_spl = 100.0
            "#,
            "fwparam.toml",
        )
        .unwrap();

        assert_eq!(config.profile(), 3);
        assert_eq!(config.rounding(), IntegerRounding::Nearest);
        let sys = config.system_constants().unwrap();
        assert_eq!(sys.baseband_sample_rate, 48000.0);
        assert_eq!(sys.nr_decimation, 2);
        assert_eq!(sys.fullscale_input_db_spl, 100.0);
        assert_eq!(sys.wdrc_channels, 8);
        assert_eq!(sys.nr_update_rate(), 3000.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ProjectConfig::from_toml("profile = 5", "f.toml"),
            Err(ConfigError::InvalidConfig(_))
        ));
        assert!(matches!(
            ProjectConfig::from_toml("integer_rounding = \"ceil\"", "f.toml"),
            Err(ConfigError::Toml { .. })
        ));
        assert!(matches!(
            ProjectConfig::from_toml("unknown_key = 1", "f.toml"),
            Err(ConfigError::Toml { .. })
        ));

        let config = ProjectConfig::from_toml("[constants]\nwdrc_channels = 0", "f.toml").unwrap();
        assert!(matches!(
            config.system_constants(),
            Err(ConfigError::InvalidConfig(_))
        ));
        let config =
            ProjectConfig::from_toml("[constants]\nbaseband_sample_rate = -1.0", "f.toml").unwrap();
        assert!(config.system_constants().is_err());
    }

    #[test]
    fn relative_paths_resolve_against_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fwparam.toml");
        std::fs::write(&path, "defs_dir = \"defs\"\ninit_output = \"/abs/init.c\"\n").unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.defs_dir(), temp.path().join("defs"));
        assert_eq!(config.init_output(), Some(PathBuf::from("/abs/init.c")));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ProjectConfig::load("/nonexistent/fwparam.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
