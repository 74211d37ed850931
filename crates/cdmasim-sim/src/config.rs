//! # Configuration System
//!
//! YAML configuration for the simulator front end:
//!
//! - Logging (level, format, filter)
//! - Default parameters of the two-user, single-user and sweep runs
//! - Report output directory and retention
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `CDMASIM_CONFIG` environment variable
//! 2. `./cdmasim.yaml` (current directory)
//! 3. `~/.config/cdmasim/config.yaml` (user config)
//! 4. `/etc/cdmasim/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! logging:
//!   level: debug
//!
//! cdma:
//!   width: 7
//!   poly1: [0, 1]
//!   poly2: [0, 1, 2, 3]
//!   noise_std: 2.0
//!   user_a: { seed1: 1, seed2: 85, data: "Hello" }
//!   user_b: { seed1: 3, seed2: 51, data: 64 }
//!
//! output:
//!   dir: "./reports"
//!   keep: 10
//! ```

use crate::cdma::CdmaParams;
use crate::channel::AwgnChannel;
use crate::link::LinkParams;
use crate::sweep::SweepParams;
use cdmasim_core::error_injection::ErrorInjector;
use cdmasim_core::observe::LogConfig;
use cdmasim_core::spreading::{GoldCodeGenerator, Lfsr};
use cdmasim_core::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "CDMASIM_CONFIG";

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("config not found: {0}")]
    NotFound(String),

    /// Failed to read or write configuration file
    #[error("failed to access config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse or render YAML
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A section holds parameters the simulator rejects
    #[error("invalid [{section}] config: {source}")]
    Invalid {
        section: &'static str,
        #[source]
        source: SimError,
    },

    /// Invalid configuration value outside the simulator parameters
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; reports go to `cdma/` and `link/` below it
    pub dir: PathBuf,
    /// Newest reports kept per kind
    pub keep: usize,
    /// Write reports at all
    pub save: bool,
}

impl OutputConfig {
    /// Check the settings used when saving a report.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keep == 0 {
            return Err(ConfigError::Validation("output.keep must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cdmasim_data"),
            keep: 5,
            save: true,
        }
    }
}

/// Where a loaded configuration came from.
///
/// Returned by [`SimConfig::load`] so the caller can report it once logging
/// is set up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOrigin {
    /// File that was read; `None` means built-in defaults
    pub file: Option<PathBuf>,
    /// `CDMASIM_CONFIG` was set but named no existing file
    pub missing_env: Option<PathBuf>,
}

/// Complete simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Configuration version
    pub version: String,
    /// Logging configuration
    pub logging: LogConfig,
    /// Two-user run defaults
    pub cdma: CdmaParams,
    /// Single-user run defaults
    pub link: LinkParams,
    /// Sweep defaults
    pub sweep: SweepParams,
    /// Report output
    pub output: OutputConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            logging: LogConfig::default(),
            cdma: CdmaParams::default(),
            link: LinkParams::default(),
            sweep: SweepParams::default(),
            output: OutputConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from the default search path.
    ///
    /// Returns the defaults when no file is found. A `CDMASIM_CONFIG` that
    /// names a missing file falls through to the search path and is
    /// recorded in the origin.
    pub fn load() -> Result<(Self, ConfigOrigin), ConfigError> {
        let mut origin = ConfigOrigin::default();
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::load_from(&path)?;
                origin.file = Some(path);
                return Ok((config, origin));
            }
            origin.missing_env = Some(path);
        }

        for path in Self::config_search_paths() {
            if path.exists() {
                let config = Self::load_from(&path)?;
                origin.file = Some(path);
                return Ok((config, origin));
            }
        }

        Ok((Self::default(), origin))
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get configuration search paths.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./cdmasim.yaml")];

        if let Some(dirs) = directories::ProjectDirs::from("", "", "cdmasim") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/cdmasim/config.yaml"));
        paths
    }

    /// Check every section without running anything.
    ///
    /// Each simulator also checks its own section when built, so this is
    /// only needed to vet a whole file up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |section| move |source| ConfigError::Invalid { section, source };

        validate_cdma(&self.cdma).map_err(invalid("cdma"))?;
        validate_link(&self.link).map_err(invalid("link"))?;
        for &level in &self.sweep.noise_levels {
            AwgnChannel::new(level).map_err(invalid("sweep"))?;
        }
        if self.sweep.trials == 0 {
            return Err(ConfigError::Validation("sweep.trials must be > 0".to_string()));
        }
        self.output.validate()
    }

    /// Generate example configuration YAML.
    pub fn example_yaml() -> String {
        serde_yaml::to_string(&Self::default()).unwrap_or_default()
    }
}

fn validate_seeds(width: u32, seed1: u64, seed2: u64) -> SimResult<()> {
    Lfsr::new(seed1, &[], width)?;
    Lfsr::new(seed2, &[], width)?;
    Ok(())
}

fn validate_cdma(p: &CdmaParams) -> SimResult<()> {
    GoldCodeGenerator::new(p.width, &p.poly1, &p.poly2)?;
    validate_seeds(p.width, p.user_a.seed1, p.user_a.seed2)?;
    validate_seeds(p.width, p.user_b.seed1, p.user_b.seed2)?;
    AwgnChannel::new(p.noise_std)?;
    Ok(())
}

fn validate_link(p: &LinkParams) -> SimResult<()> {
    GoldCodeGenerator::new(p.width, &p.poly1, &p.poly2)?;
    validate_seeds(p.width, p.seed1, p.seed2)?;
    ErrorInjector::new(p.error_rate, p.error_pattern)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdma::DataSource;
    use cdmasim_core::error_injection::ErrorPattern;
    use cdmasim_core::observe::{LogFormat, LogLevel};

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.output.keep, 5);
        assert_eq!(config.cdma.width, 10);
        assert!(config.link.decode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
logging:
  level: debug
  format: json

cdma:
  width: 7
  poly1: [0, 1]
  poly2: [0, 1, 2, 3]
  noise_std: 2.0
  user_a: { seed1: 1, seed2: 85, data: "Hello" }
  user_b: { seed1: 3, seed2: 51, data: 64 }

link:
  error_rate: 5.0
  error_pattern: burst

output:
  dir: "./reports"
  keep: 10
"#;

        let config = SimConfig::parse(yaml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.cdma.width, 7);
        assert_eq!(config.cdma.user_b.data, DataSource::Random(64));
        assert_eq!(config.link.error_pattern, ErrorPattern::Burst);
        assert_eq!(config.output.dir, PathBuf::from("./reports"));
        assert_eq!(config.output.keep, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config = SimConfig::parse("output:\n  keep: 3\n").unwrap();
        assert_eq!(config.output.keep, 3);
        // Defaults should be applied
        assert_eq!(config.output.dir, PathBuf::from("cdmasim_data"));
        assert_eq!(config.cdma, CdmaParams::default());
        assert_eq!(config.sweep, SweepParams::default());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            SimConfig::parse("cdma: [1, 2"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_example_round_trips() {
        let yaml = SimConfig::example_yaml();
        assert!(yaml.contains("noise_levels"));
        assert_eq!(SimConfig::parse(&yaml).unwrap(), SimConfig::default());
    }

    #[test]
    fn test_validation() {
        let mut config = SimConfig::default();
        config.cdma.user_b.seed2 = 1 << 10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { section: "cdma", source: SimError::InvalidSeed { .. } })
        ));

        let mut config = SimConfig::default();
        config.link.error_rate = -3.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { section: "link", .. })
        ));

        let mut config = SimConfig::default();
        config.sweep.noise_levels.push(f64::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { section: "sweep", .. })
        ));

        let mut config = SimConfig::default();
        config.output.keep = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_output_validate() {
        assert!(OutputConfig::default().validate().is_ok());
        let output = OutputConfig {
            keep: 0,
            ..Default::default()
        };
        assert!(matches!(output.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_reports_missing_env_file() {
        let missing = PathBuf::from("/nonexistent/cdmasim-test.yaml");
        std::env::set_var(CONFIG_ENV_VAR, &missing);
        let loaded = SimConfig::load();
        std::env::remove_var(CONFIG_ENV_VAR);

        let (_, origin) = loaded.unwrap();
        assert_eq!(origin.missing_env, Some(missing));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimConfig::load_from(Path::new("/nonexistent/cdmasim.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_search_paths() {
        let paths = SimConfig::config_search_paths();
        assert_eq!(paths[0], PathBuf::from("./cdmasim.yaml"));
        assert_eq!(
            paths.last(),
            Some(&PathBuf::from("/etc/cdmasim/config.yaml"))
        );
    }
}
