//! TOML-based run configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::model::{PeakHour, ScrubPolicy};

/// Top-level run configuration parsed from TOML.
///
/// Every table has defaults matching the `files` preset. Load from TOML
/// with [`RunConfig::from_toml_file`] or start from a preset with
/// [`RunConfig::from_preset`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Input file locations.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Output file location and number formatting.
    #[serde(default)]
    pub output: OutputConfig,
    /// Worker pool and computation settings.
    #[serde(default)]
    pub run: RunSettings,
    /// Parcel scrub rule.
    #[serde(default)]
    pub scrub: ScrubConfig,
    /// When present, a seeded synthetic dataset replaces the input files.
    #[serde(default)]
    pub synthetic: Option<SyntheticConfig>,
    /// Log filter defaults.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Paths of the four input CSV files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    /// Shared hourly supply allocation curve.
    pub supply_profile: PathBuf,
    /// Per-usetype hourly demand allocation curves, one column each.
    pub demand_profiles: PathBuf,
    /// Circuit group ids and declared parcel counts.
    pub circuit_groups: PathBuf,
    /// Parcel records.
    pub parcels: PathBuf,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            supply_profile: PathBuf::from("in/supply_profile.csv"),
            demand_profiles: PathBuf::from("in/demand_profile.csv"),
            circuit_groups: PathBuf::from("in/circuit_groups.csv"),
            parcels: PathBuf::from("in/parcels.csv"),
        }
    }
}

/// Output location and formatting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Base results path; `_annualNet` and `_hourlyNet` are appended to the stem.
    pub results: PathBuf,
    /// Decimal places written for every number.
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results: PathBuf::from("out/results.csv"),
            precision: 8,
        }
    }
}

/// Worker pool and computation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSettings {
    /// Worker threads; 0 detects from the machine.
    pub workers: usize,
    /// Expected length of every hourly profile.
    pub hours: usize,
    /// Peak hour reported per group: `"export"` or `"import"`.
    pub peak_hour: String,
    /// Log a progress line every N computed groups (0 disables).
    pub progress_every: usize,
    /// Number of ranked candidates in the printed summary.
    pub top_n: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            workers: 0,
            hours: 8760,
            peak_hour: "export".to_string(),
            progress_every: 100,
            top_n: 10,
        }
    }
}

impl RunSettings {
    /// Parsed peak hour mode; `None` when the string is not recognized.
    pub fn peak_hour(&self) -> Option<PeakHour> {
        PeakHour::parse(&self.peak_hour)
    }
}

/// Parcel scrub rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrubConfig {
    /// `"clamp_negative"` or `"sentinel"`.
    pub policy: String,
    /// Demand value marking a missing record under the sentinel policy.
    pub sentinel: f64,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            policy: "clamp_negative".to_string(),
            sentinel: -1.0,
        }
    }
}

impl ScrubConfig {
    /// Parsed policy; `None` when the policy name is not recognized.
    pub fn policy(&self) -> Option<ScrubPolicy> {
        match self.policy.as_str() {
            "clamp_negative" => Some(ScrubPolicy::ClampNegative),
            "sentinel" => Some(ScrubPolicy::Sentinel(self.sentinel)),
            _ => None,
        }
    }
}

/// Seeded synthetic dataset parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    /// Master random seed.
    pub seed: u64,
    /// Number of circuit groups.
    pub groups: usize,
    /// Upper bound (inclusive) on parcels per group.
    pub max_parcels_per_group: usize,
    /// Share of parcels generated with missing (zero or sentinel) demand.
    pub zero_demand_share: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            groups: 24,
            max_parcels_per_group: 40,
            zero_demand_share: 0.05,
        }
    }
}

/// Log filter defaults. `RUST_LOG` overrides `filter`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"run.hours"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl RunConfig {
    /// Reads the four input files from their default locations.
    pub fn files() -> Self {
        Self {
            inputs: InputsConfig::default(),
            output: OutputConfig::default(),
            run: RunSettings::default(),
            scrub: ScrubConfig::default(),
            synthetic: None,
            logging: LoggingConfig::default(),
        }
    }

    /// Small synthetic dataset for trying the tool without input files.
    pub fn demo() -> Self {
        Self {
            output: OutputConfig {
                results: PathBuf::from("out/demo.csv"),
                ..OutputConfig::default()
            },
            synthetic: Some(SyntheticConfig::default()),
            ..Self::files()
        }
    }

    /// Large synthetic dataset for exercising the worker pool.
    pub fn stress() -> Self {
        Self {
            output: OutputConfig {
                results: PathBuf::from("out/stress.csv"),
                precision: 4,
            },
            run: RunSettings {
                progress_every: 250,
                ..RunSettings::default()
            },
            synthetic: Some(SyntheticConfig {
                groups: 1752,
                max_parcels_per_group: 120,
                ..SyntheticConfig::default()
            }),
            ..Self::files()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["files", "demo", "stress"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "files" => Ok(Self::files()),
            "demo" => Ok(Self::demo()),
            "stress" => Ok(Self::stress()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.synthetic.is_none() {
            let i = &self.inputs;
            for (field, path) in [
                ("inputs.supply_profile", &i.supply_profile),
                ("inputs.demand_profiles", &i.demand_profiles),
                ("inputs.circuit_groups", &i.circuit_groups),
                ("inputs.parcels", &i.parcels),
            ] {
                if path.as_os_str().is_empty() {
                    errors.push(ConfigError {
                        field: field.into(),
                        message: "must not be empty".into(),
                    });
                }
            }
        }

        let o = &self.output;
        if o.results.file_name().is_none() {
            errors.push(ConfigError {
                field: "output.results".into(),
                message: "must name a file".into(),
            });
        }
        if o.precision > 17 {
            errors.push(ConfigError {
                field: "output.precision".into(),
                message: "must be <= 17".into(),
            });
        }

        let r = &self.run;
        if r.hours == 0 {
            errors.push(ConfigError {
                field: "run.hours".into(),
                message: "must be > 0".into(),
            });
        }
        if r.peak_hour().is_none() {
            errors.push(ConfigError {
                field: "run.peak_hour".into(),
                message: format!("must be \"export\" or \"import\", got \"{}\"", r.peak_hour),
            });
        }

        let sc = &self.scrub;
        if sc.policy().is_none() {
            errors.push(ConfigError {
                field: "scrub.policy".into(),
                message: format!(
                    "must be \"clamp_negative\" or \"sentinel\", got \"{}\"",
                    sc.policy
                ),
            });
        }
        if !sc.sentinel.is_finite() {
            errors.push(ConfigError {
                field: "scrub.sentinel".into(),
                message: "must be finite".into(),
            });
        }

        if let Some(syn) = &self.synthetic {
            if syn.groups == 0 {
                errors.push(ConfigError {
                    field: "synthetic.groups".into(),
                    message: "must be > 0".into(),
                });
            }
            if !(0.0..=1.0).contains(&syn.zero_demand_share) {
                errors.push(ConfigError {
                    field: "synthetic.zero_demand_share".into(),
                    message: "must be in [0.0, 1.0]".into(),
                });
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_preset_valid() {
        let cfg = RunConfig::files();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "files preset should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = RunConfig::from_preset("nonexistent");
        assert!(err.is_err());
        assert!(err.is_err_and(|e| e.message.contains("unknown preset")));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in RunConfig::PRESETS {
            let cfg = RunConfig::from_preset(name).expect("preset should load");
            let errors = cfg.validate();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn synthetic_presets_skip_input_files() {
        assert!(RunConfig::demo().synthetic.is_some());
        assert!(RunConfig::stress().synthetic.is_some());
        assert!(RunConfig::files().synthetic.is_none());
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[inputs]
supply_profile = "data/supply.csv"
demand_profiles = "data/demand.csv"
circuit_groups = "data/groups.csv"
parcels = "data/parcels.csv"

[output]
results = "out/run.csv"
precision = 6

[run]
workers = 4
hours = 8784
peak_hour = "import"
progress_every = 0
top_n = 5

[scrub]
policy = "sentinel"
sentinel = -9999.0

[logging]
filter = "debug"
"#;
        let cfg = RunConfig::from_toml_str(toml).expect("valid TOML should parse");
        assert_eq!(cfg.run.workers, 4);
        assert_eq!(cfg.run.hours, 8784);
        assert_eq!(cfg.run.peak_hour(), Some(PeakHour::Import));
        assert_eq!(cfg.scrub.policy(), Some(ScrubPolicy::Sentinel(-9999.0)));
        assert_eq!(cfg.inputs.parcels, PathBuf::from("data/parcels.csv"));
    }

    #[test]
    fn synthetic_table_parses() {
        let toml = r#"
[synthetic]
seed = 7
groups = 3
"#;
        let cfg = RunConfig::from_toml_str(toml).expect("synthetic table should parse");
        let syn = cfg.synthetic.expect("synthetic table present");
        assert_eq!(syn.seed, 7);
        assert_eq!(syn.groups, 3);
        assert_eq!(syn.max_parcels_per_group, 40);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[run]
hours = 8760
bogus_field = true
"#;
        assert!(RunConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[run]
workers = 2
"#;
        let cfg = RunConfig::from_toml_str(toml).expect("partial TOML should parse");
        assert_eq!(cfg.run.workers, 2);
        assert_eq!(cfg.run.hours, 8760);
        assert_eq!(cfg.output.precision, 8);
        assert!(cfg.synthetic.is_none());
    }

    #[test]
    fn validation_catches_zero_hours() {
        let mut cfg = RunConfig::files();
        cfg.run.hours = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "run.hours"));
    }

    #[test]
    fn validation_catches_bad_peak_hour() {
        let mut cfg = RunConfig::files();
        cfg.run.peak_hour = "worst".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "run.peak_hour"));
    }

    #[test]
    fn validation_catches_bad_scrub_policy() {
        let mut cfg = RunConfig::files();
        cfg.scrub.policy = "drop".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "scrub.policy"));
    }

    #[test]
    fn validation_catches_bad_zero_share() {
        let mut cfg = RunConfig::demo();
        if let Some(syn) = cfg.synthetic.as_mut() {
            syn.zero_demand_share = 1.5;
        }
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "synthetic.zero_demand_share"));
    }

    #[test]
    fn validation_reports_every_error() {
        let mut cfg = RunConfig::files();
        cfg.run.hours = 0;
        cfg.output.precision = 40;
        cfg.inputs.parcels = PathBuf::new();
        let errors = cfg.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
    }
}
