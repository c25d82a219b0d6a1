//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use circuit_prioritizer::config::SyntheticConfig;
use circuit_prioritizer::model::{
    CircuitGroupPool, Dataset, GroupDeclaration, Parcel, Profile, ProfileStore, ScrubPolicy,
    SupplyProfile,
};
use circuit_prioritizer::synthetic;

pub const HOURS: usize = 8760;

/// A profile with `1.0` at `hour` and zero elsewhere.
pub fn spike(hour: usize, hours: usize) -> Vec<f64> {
    let mut v = vec![0.0; hours];
    v[hour] = 1.0;
    v
}

/// Scenario A: supply peaks at hour 0, residential demand at hour 1.
///
/// One group `"1"` with one parcel, 1000 kWh supply and 2000 kWh demand.
pub fn scenario_a() -> Dataset {
    let supply = SupplyProfile::new(spike(0, HOURS));
    let profiles = ProfileStore::from_profiles([Profile::new("residential", spike(1, HOURS))])
        .expect("single profile");
    let pool = CircuitGroupPool::build(
        vec![GroupDeclaration::new("1", 1)],
        vec![Parcel::new("p1", "residential", "1", 1000.0, 2000.0)],
        &profiles,
    )
    .expect("scenario A pool");
    Dataset {
        supply,
        profiles,
        pool,
    }
}

/// Medium synthetic dataset used for determinism checks.
pub fn synthetic_dataset(seed: u64) -> Dataset {
    let cfg = SyntheticConfig {
        seed,
        groups: 60,
        max_parcels_per_group: 25,
        zero_demand_share: 0.1,
    };
    synthetic::generate(&cfg, HOURS, ScrubPolicy::ClampNegative).expect("synthetic dataset")
}

/// Paths of the four input files written by [`write_inputs`].
pub struct InputFiles {
    pub supply: PathBuf,
    pub demand: PathBuf,
    pub groups: PathBuf,
    pub parcels: PathBuf,
}

/// Writes a small valid input set (24 hours, two usetypes, three groups)
/// into `dir`.
pub fn write_inputs(dir: &Path) -> InputFiles {
    let hours = 24;
    let supply: String = std::iter::once("supply".to_string())
        .chain((0..hours).map(|h| {
            if (6..18).contains(&h) {
                format!("{}", 1.0 / 12.0)
            } else {
                "0".to_string()
            }
        }))
        .collect::<Vec<_>>()
        .join("\n");

    let flat = 1.0 / hours as f64;
    let demand: String = std::iter::once("residential,commercial".to_string())
        .chain((0..hours).map(|h| {
            let commercial = if (8..20).contains(&h) { 1.0 / 12.0 } else { 0.0 };
            format!("{flat},{commercial}")
        }))
        .collect::<Vec<_>>()
        .join("\n");

    let groups = "circuit_group_id,parcel_count\nA,2\nB,1\nC,0\n";
    let parcels = "parcel_id,usetype,circuit_group_id,annual_supply_kwh,annual_demand_kwh\n\
                   a1,residential,A,4000,3000\n\
                   a2,commercial,A,1000,5000\n\
                   b1,residential,B,2500,0\n";

    let files = InputFiles {
        supply: dir.join("supply_profile.csv"),
        demand: dir.join("demand_profile.csv"),
        groups: dir.join("circuit_groups.csv"),
        parcels: dir.join("parcels.csv"),
    };
    fs::write(&files.supply, supply + "\n").expect("write supply");
    fs::write(&files.demand, demand + "\n").expect("write demand");
    fs::write(&files.groups, groups).expect("write groups");
    fs::write(&files.parcels, parcels).expect("write parcels");
    files
}

/// TOML run configuration pointing at `files`, writing under `out`.
pub fn config_toml(files: &InputFiles, out: &Path, workers: usize) -> String {
    format!(
        r#"
[inputs]
supply_profile = {:?}
demand_profiles = {:?}
circuit_groups = {:?}
parcels = {:?}

[output]
results = {:?}
precision = 6

[run]
workers = {workers}
hours = 24

[logging]
filter = "warn"
"#,
        files.supply.display().to_string(),
        files.demand.display().to_string(),
        files.groups.display().to_string(),
        files.parcels.display().to_string(),
        out.display().to_string(),
    )
}
