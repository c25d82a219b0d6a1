//! CSV loaders for the four input files.
//!
//! Every file has one header row. Fields are trimmed. Any malformed record
//! is fatal: loading either returns a complete, validated [`Dataset`] or an
//! error, never a partial one.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::InputsConfig;
use crate::error::LoadError;
use crate::model::{
    CircuitGroupPool, Dataset, GroupDeclaration, Parcel, Profile, ProfileStore, ScrubPolicy,
    SupplyProfile,
};

/// `(circuit_group_id, parcel_count)`
#[derive(Debug, Deserialize)]
struct GroupRow(String, usize);

/// `parcel_id, usetype, circuit_group_id, annual_supply_kwh, annual_demand_kwh`
const PARCEL_FIELDS: usize = 5;

/// Loads and validates all inputs named by `inputs`.
///
/// # Errors
///
/// Returns the first [`LoadError`] encountered; see [`CircuitGroupPool::build`]
/// for the cross-file checks.
pub fn load_dataset(
    inputs: &InputsConfig,
    hours: usize,
    scrub: ScrubPolicy,
) -> Result<Dataset, LoadError> {
    let supply = load_supply_profile(&inputs.supply_profile, hours)?;
    let profiles = load_demand_profiles(&inputs.demand_profiles, hours)?;
    let declarations = load_circuit_groups(&inputs.circuit_groups)?;
    let parcels = load_parcels(&inputs.parcels, scrub)?;
    let pool = CircuitGroupPool::build(declarations, parcels, &profiles)?;
    info!(
        hours,
        usetypes = profiles.len(),
        groups = pool.len(),
        parcels = pool.parcel_count(),
        "inputs loaded"
    );
    Ok(Dataset {
        supply,
        profiles,
        pool,
    })
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr)
}

fn csv_err(path: &Path) -> impl Fn(csv::Error) -> LoadError + '_ {
    move |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

fn parse_number(raw: &str, path: &Path, line: u64) -> Result<f64, LoadError> {
    raw.parse().map_err(|_| LoadError::Number {
        path: path.to_path_buf(),
        line,
        value: raw.to_string(),
    })
}

/// Parses an annual total. Negative values are left to the scrub rule;
/// `inf` and `NaN` are rejected.
fn parse_amount(raw: &str, path: &Path, line: u64) -> Result<f64, LoadError> {
    let value = parse_number(raw, path, line)?;
    if !value.is_finite() {
        return Err(LoadError::NonFinite {
            path: path.to_path_buf(),
            line,
            value,
        });
    }
    Ok(value)
}

/// Parses one hourly fraction: finite and non-negative.
fn parse_fraction(raw: &str, path: &Path, line: u64) -> Result<f64, LoadError> {
    let value = parse_number(raw, path, line)?;
    if !value.is_finite() || value < 0.0 {
        return Err(LoadError::InvalidValue {
            path: path.to_path_buf(),
            line,
            value,
        });
    }
    Ok(value)
}

/// Loads the supply profile: one value per row in the first column.
pub fn load_supply_profile(path: &Path, hours: usize) -> Result<SupplyProfile, LoadError> {
    read_supply_profile(open(path)?, path, hours)
}

/// Reads a supply profile from any reader; `path` labels errors.
pub fn read_supply_profile<R: Read>(
    rdr: R,
    path: &Path,
    hours: usize,
) -> Result<SupplyProfile, LoadError> {
    let mut rdr = reader(rdr);
    if rdr.headers().map_err(csv_err(path))?.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let mut values = Vec::with_capacity(hours);
    for record in rdr.records() {
        let record = record.map_err(csv_err(path))?;
        let line = line_of(&record);
        let raw = record.get(0).ok_or(LoadError::RowWidth {
            path: path.to_path_buf(),
            line,
            expected: 1,
            found: 0,
        })?;
        values.push(parse_fraction(raw, path, line)?);
    }

    if values.len() != hours {
        return Err(LoadError::ProfileLength {
            name: "supply".to_string(),
            expected: hours,
            found: values.len(),
        });
    }
    Ok(SupplyProfile::new(values))
}

/// Loads the demand profiles: header row of usetypes, one column each.
pub fn load_demand_profiles(path: &Path, hours: usize) -> Result<ProfileStore, LoadError> {
    read_demand_profiles(open(path)?, path, hours)
}

/// Reads demand profiles from any reader; `path` labels errors.
pub fn read_demand_profiles<R: Read>(
    rdr: R,
    path: &Path,
    hours: usize,
) -> Result<ProfileStore, LoadError> {
    let mut rdr = reader(rdr);
    let usetypes: Vec<String> = rdr
        .headers()
        .map_err(csv_err(path))?
        .iter()
        .map(str::to_string)
        .collect();
    if usetypes.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(hours); usetypes.len()];
    for record in rdr.records() {
        let record = record.map_err(csv_err(path))?;
        let line = line_of(&record);
        if record.len() != usetypes.len() {
            return Err(LoadError::RowWidth {
                path: path.to_path_buf(),
                line,
                expected: usetypes.len(),
                found: record.len(),
            });
        }
        for (column, raw) in columns.iter_mut().zip(record.iter()) {
            column.push(parse_fraction(raw, path, line)?);
        }
    }

    let mut profiles = Vec::with_capacity(usetypes.len());
    for (usetype, values) in usetypes.into_iter().zip(columns) {
        if values.len() != hours {
            return Err(LoadError::ProfileLength {
                name: usetype,
                expected: hours,
                found: values.len(),
            });
        }
        let profile = Profile::new(usetype, values);
        if !profile.is_normalized() {
            warn!(
                usetype = profile.usetype(),
                sum = profile.hourly_fraction().sum(),
                "demand profile does not sum to 1.0"
            );
        }
        profiles.push(profile);
    }

    ProfileStore::from_profiles(profiles).map_err(LoadError::DuplicateProfile)
}

/// Loads circuit group declarations: `(id, parcel_count)` per row.
pub fn load_circuit_groups(path: &Path) -> Result<Vec<GroupDeclaration>, LoadError> {
    read_circuit_groups(open(path)?, path)
}

/// Reads circuit group declarations from any reader; `path` labels errors.
pub fn read_circuit_groups<R: Read>(
    rdr: R,
    path: &Path,
) -> Result<Vec<GroupDeclaration>, LoadError> {
    let mut rdr = reader(rdr);
    let mut out = Vec::new();
    for row in rdr.deserialize() {
        let GroupRow(id, parcel_count) = row.map_err(csv_err(path))?;
        out.push(GroupDeclaration::new(id, parcel_count));
    }
    Ok(out)
}

/// Loads parcels and applies the scrub rule to each.
pub fn load_parcels(path: &Path, scrub: ScrubPolicy) -> Result<Vec<Parcel>, LoadError> {
    read_parcels(open(path)?, path, scrub)
}

/// Reads parcels from any reader; `path` labels errors.
pub fn read_parcels<R: Read>(
    rdr: R,
    path: &Path,
    scrub: ScrubPolicy,
) -> Result<Vec<Parcel>, LoadError> {
    let mut rdr = reader(rdr);
    let mut out = Vec::new();
    let mut scrubbed = 0_usize;
    for record in rdr.records() {
        let record = record.map_err(csv_err(path))?;
        let line = line_of(&record);
        if record.len() != PARCEL_FIELDS {
            return Err(LoadError::RowWidth {
                path: path.to_path_buf(),
                line,
                expected: PARCEL_FIELDS,
                found: record.len(),
            });
        }
        let supply = parse_amount(&record[3], path, line)?;
        let demand = parse_amount(&record[4], path, line)?;
        let (id, usetype, group) = (&record[0], &record[1], &record[2]);
        let (annual_supply, annual_demand) = scrub.apply(supply, demand);
        if (annual_supply, annual_demand) != (supply, demand) {
            scrubbed += 1;
        }
        out.push(Parcel::new(id, usetype, group, annual_supply, annual_demand));
    }
    if scrubbed > 0 {
        info!(scrubbed, total = out.len(), "parcel records scrubbed");
    }
    Ok(out)
}
