//! Error taxonomy for loading, computing, and exporting a prioritization run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Load-phase failures. Any of these aborts the run before dispatch.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV in \"{}\": {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("\"{}\" has no header row", path.display())]
    Empty { path: PathBuf },

    #[error("\"{}\", line {line}: cannot parse {value:?} as a number", path.display())]
    Number {
        path: PathBuf,
        line: u64,
        value: String,
    },

    #[error("\"{}\", line {line}: value {value} must be finite and >= 0", path.display())]
    InvalidValue { path: PathBuf, line: u64, value: f64 },

    #[error("\"{}\", line {line}: {value} is not a finite number", path.display())]
    NonFinite { path: PathBuf, line: u64, value: f64 },

    #[error("\"{}\", line {line}: expected {expected} fields, found {found}", path.display())]
    RowWidth {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("profile {name:?} has {found} hourly values, expected {expected}")]
    ProfileLength {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate demand profile for usetype {0:?}")]
    DuplicateProfile(String),

    #[error("duplicate circuit group id {0:?}")]
    DuplicateGroup(String),

    #[error("parcel {parcel:?} references unknown circuit group {group:?}")]
    UnknownGroup { parcel: String, group: String },

    #[error("parcel {parcel:?} has usetype {usetype:?} with no demand profile")]
    MissingProfile { parcel: String, usetype: String },

    #[error("circuit group {group:?} declares {declared} parcels but {actual} were loaded")]
    ParcelCountMismatch {
        group: String,
        declared: usize,
        actual: usize,
    },
}

/// Failures raised while the worker pool is running.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no demand profile for usetype {0:?}")]
    MissingProfile(String),

    #[error("demand profile {usetype:?} has {found} hours, supply profile has {expected}")]
    ProfileLength {
        usetype: String,
        expected: usize,
        found: usize,
    },

    #[error("dispatch index {0} is outside the circuit group pool")]
    UnknownGroupIndex(usize),

    #[error("dispatch channel closed while enqueueing index {0}")]
    DispatchClosed(usize),

    #[error("result sink closed before worker {0} could emit")]
    SinkClosed(usize),

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("expected {expected} circuit group results, received {received}")]
    Incomplete { expected: usize, received: usize },
}

/// Output-phase failures.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot write \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV write to \"{}\" failed: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Any fatal error of a single-shot run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("{}", join_config_errors(.0))]
    Config(Vec<ConfigError>),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_error_names_file_and_line() {
        let err = LoadError::Number {
            path: PathBuf::from("in/parcels.csv"),
            line: 7,
            value: "abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("in/parcels.csv"));
        assert!(msg.contains("line 7"));
        assert!(msg.contains("\"abc\""));
    }

    #[test]
    fn config_errors_are_joined() {
        let err = RunError::Config(vec![
            ConfigError {
                field: "run.hours".into(),
                message: "must be > 0".into(),
            },
            ConfigError {
                field: "output.precision".into(),
                message: "must be <= 17".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("run.hours"));
        assert!(msg.contains("output.precision"));
    }
}
