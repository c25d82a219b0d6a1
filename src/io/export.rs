//! CSV export for circuit group results.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::ExportError;
use crate::model::GroupNetSupply;

/// Column header of the annual results file.
const ANNUAL_HEADER: [&str; 4] = [
    "Circuit_Group_ID",
    "Circuit_Group_Count",
    "Annual_Net_Supply_MWh",
    "Annual_Max_Net_Supply_MWh",
];

/// Derives the annual and hourly output paths from the configured results path.
///
/// `out/results.csv` becomes `out/results_annualNet.csv` and
/// `out/results_hourlyNet.csv`.
pub fn output_paths(results: &Path) -> (PathBuf, PathBuf) {
    let stem = results
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("results"));
    let with_suffix = |suffix: &str| {
        let mut name = stem.clone();
        name.push(suffix);
        if let Some(ext) = results.extension() {
            name.push(".");
            name.push(ext);
        }
        results.with_file_name(name)
    };
    (with_suffix("_annualNet"), with_suffix("_hourlyNet"))
}

/// Writes both result files next to `results`.
///
/// The parent directory is created if missing. Rows follow the order of
/// `groups`; callers pass them in pool order. Both files are written to
/// staging names first and renamed into place, so a failure leaves neither
/// result file behind.
///
/// # Errors
///
/// Returns an `ExportError` if a directory or file cannot be created,
/// written, or renamed.
pub fn export_results(
    groups: &[GroupNetSupply],
    results: &Path,
    precision: usize,
    hours: usize,
) -> Result<(PathBuf, PathBuf), ExportError> {
    if let Some(dir) = results.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let (annual, hourly) = output_paths(results);
    let (annual_staged, hourly_staged) = (staging_path(&annual), staging_path(&hourly));

    let staged = write_file(&annual_staged, |w| write_annual_csv(groups, precision, w))
        .and_then(|()| write_file(&hourly_staged, |w| write_hourly_csv(groups, precision, hours, w)));
    if let Err(err) = staged {
        discard(&[&annual_staged, &hourly_staged]);
        return Err(err);
    }

    if let Err(err) = publish(&annual_staged, &annual) {
        discard(&[&annual_staged, &hourly_staged]);
        return Err(err);
    }
    if let Err(err) = publish(&hourly_staged, &hourly) {
        discard(&[&hourly_staged, &annual]);
        return Err(err);
    }

    info!(
        groups = groups.len(),
        annual = %annual.display(),
        hourly = %hourly.display(),
        "results written"
    );
    Ok((annual, hourly))
}

/// Hidden sibling of `path` used while the file is being written.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| path.as_os_str()));
    name.push(".partial");
    path.with_file_name(name)
}

fn publish(staged: &Path, target: &Path) -> Result<(), ExportError> {
    fs::rename(staged, target).map_err(|source| ExportError::Io {
        path: target.to_path_buf(),
        source,
    })
}

fn discard(paths: &[&Path]) {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "removed unfinished output"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), %err, "cannot remove unfinished output"),
        }
    }
}

fn write_file(
    path: &Path,
    write: impl FnOnce(BufWriter<File>) -> Result<(), csv::Error>,
) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write(BufWriter::new(file)).map_err(|source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes one annual summary row per group.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_annual_csv(
    groups: &[GroupNetSupply],
    precision: usize,
    writer: impl Write,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(ANNUAL_HEADER)?;
    for g in groups {
        wtr.write_record(&[
            g.id.clone(),
            g.parcel_count.to_string(),
            format!("{:.precision$}", g.annual_net_supply),
            format!("{:.precision$}", g.max_hourly_net_supply),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one row of hourly net supply per group, columns `1..=hours`.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_hourly_csv(
    groups: &[GroupNetSupply],
    precision: usize,
    hours: usize,
    writer: impl Write,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = Vec::with_capacity(hours + 1);
    header.push("Circuit_Group_ID".to_string());
    header.extend((1..=hours).map(|h| h.to_string()));
    wtr.write_record(&header)?;

    for g in groups {
        let mut row = Vec::with_capacity(hours + 1);
        row.push(g.id.clone());
        row.extend(
            g.hourly_net_supply
                .iter()
                .map(|v| format!("{v:.precision$}")),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
