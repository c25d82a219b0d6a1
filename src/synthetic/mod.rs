//! Seeded synthetic datasets for demos, stress runs, and tests.
//!
//! The same [`SyntheticConfig`] always yields the same [`Dataset`]. Each
//! component draws from its own RNG stream derived from the seed, so adding
//! groups does not perturb the profiles.

pub mod demand;
pub mod noise;
pub mod solar;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

use crate::config::SyntheticConfig;
use crate::error::LoadError;
use crate::model::{CircuitGroupPool, Dataset, GroupDeclaration, Parcel, ProfileStore, ScrubPolicy};

pub use demand::{DemandShape, USETYPES};
pub use solar::SolarShape;

const SUPPLY_SEED_OFFSET: u64 = 1;
const DEMAND_SEED_OFFSET: u64 = 11;
const PARCEL_SEED_OFFSET: u64 = 57;

/// Raw demand written for parcels picked as "no demand" placeholders when
/// no sentinel is configured.
const DEFAULT_PLACEHOLDER_DEMAND: f64 = -1.0;

/// Builds a complete, validated dataset from `cfg`.
///
/// Raw parcel totals pass through `scrub` exactly as loaded files do.
///
/// # Errors
///
/// Returns a `LoadError` if the generated pool fails validation, which
/// only happens for a duplicate profile usetype.
pub fn generate(
    cfg: &SyntheticConfig,
    hours: usize,
    scrub: ScrubPolicy,
) -> Result<Dataset, LoadError> {
    let supply = SolarShape::default().generate(hours, cfg.seed.wrapping_add(SUPPLY_SEED_OFFSET));

    let profiles = ProfileStore::from_profiles(USETYPES.iter().enumerate().map(|(i, shape)| {
        shape.generate(hours, cfg.seed.wrapping_add(DEMAND_SEED_OFFSET + i as u64))
    }))
    .map_err(LoadError::DuplicateProfile)?;

    let placeholder = match scrub {
        ScrubPolicy::Sentinel(v) => v,
        ScrubPolicy::ClampNegative => DEFAULT_PLACEHOLDER_DEMAND,
    };
    let zero_share = cfg.zero_demand_share.clamp(0.0, 1.0);

    let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(PARCEL_SEED_OFFSET));
    let mut declarations = Vec::with_capacity(cfg.groups);
    let mut parcels = Vec::new();
    let mut scrubbed = 0_usize;

    for g in 0..cfg.groups {
        let group_id = format!("CG{:05}", g + 1);
        let count = rng.random_range(0..=cfg.max_parcels_per_group);
        for p in 0..count {
            let shape = &USETYPES[rng.random_range(0..USETYPES.len())];
            let demand = rng.random_range(2_000.0..20_000.0);
            let supply = demand * rng.random_range(0.0..1.6);
            let demand = if rng.random_bool(zero_share) {
                scrubbed += 1;
                if rng.random_bool(0.5) { 0.0 } else { placeholder }
            } else {
                demand
            };
            let (supply, demand) = scrub.apply(supply, demand);
            parcels.push(Parcel::new(
                format!("{group_id}-P{:04}", p + 1),
                shape.usetype,
                group_id.clone(),
                supply,
                demand,
            ));
        }
        declarations.push(GroupDeclaration::new(group_id, count));
    }

    let pool = CircuitGroupPool::build(declarations, parcels, &profiles)?;
    info!(
        seed = cfg.seed,
        groups = pool.len(),
        parcels = pool.parcel_count(),
        placeholders = scrubbed,
        "synthetic dataset generated"
    );
    Ok(Dataset {
        supply,
        profiles,
        pool,
    })
}
