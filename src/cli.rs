use std::path::PathBuf;

use crate::config::{ConfigError, RunConfig};

/// Parsed command-line options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub workers: Option<usize>,
    pub seed: Option<u64>,
    pub out: Option<PathBuf>,
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(CliOptions),
    Help,
}

/// Parses the arguments following the program name.
///
/// # Errors
///
/// Returns a usage message for unknown arguments, missing or malformed
/// values, repeated options, or `--config` combined with `--preset`.
pub fn parse_args_from<I, S>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--workers" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --workers (expected a count)")?;
                let n = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--workers value \"{raw}\" is not a valid count"))?;
                opts.workers = Some(n);
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --out (expected a file path)")?;
                opts.out = Some(PathBuf::from(path));
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(Command::Run(opts))
}

impl CliOptions {
    /// Loads the selected configuration and applies the overrides.
    ///
    /// With neither `--config` nor `--preset`, the `files` preset is used.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file or preset cannot be loaded.
    pub fn resolve(&self) -> Result<RunConfig, ConfigError> {
        let mut cfg = match (&self.config, &self.preset) {
            (Some(path), _) => RunConfig::from_toml_file(path)?,
            (None, Some(name)) => RunConfig::from_preset(name)?,
            (None, None) => RunConfig::files(),
        };
        if let Some(n) = self.workers {
            cfg.run.workers = n;
        }
        if let (Some(seed), Some(syn)) = (self.seed, cfg.synthetic.as_mut()) {
            syn.seed = seed;
        }
        if let Some(out) = &self.out {
            cfg.output.results = out.clone();
        }
        Ok(cfg)
    }
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("circuit-prioritizer: per-circuit-group net supply for upgrade prioritization");
    eprintln!();
    eprintln!("Usage: circuit-prioritizer [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>   Load run configuration from a TOML file");
    eprintln!(
        "  --preset <name>   Use a built-in preset ({})",
        RunConfig::PRESETS.join(", ")
    );
    eprintln!("  --workers <n>     Worker threads (0 = detect)");
    eprintln!("  --seed <u64>      Override the synthetic dataset seed");
    eprintln!("  --out <path>      Results path; _annualNet/_hourlyNet are appended");
    eprintln!("  --help            Show this help message");
    eprintln!();
    eprintln!("If neither --config nor --preset is given, the files preset is used.");
}
