//! Data model: parcels, circuit groups, profiles, and the scrub rule.

pub mod pool;
/// Supply profile and per-usetype demand profile store.
pub mod profile;
pub mod scrub;
pub mod types;

pub use pool::{CircuitGroupPool, GroupDeclaration};
pub use profile::{Profile, ProfileStore, SupplyProfile};
pub use scrub::ScrubPolicy;
pub use types::{CircuitGroup, GroupNetSupply, KWH_TO_MWH, Parcel, PeakHour};

/// Everything the engine needs, loaded and validated before dispatch.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub supply: SupplyProfile,
    pub profiles: ProfileStore,
    pub pool: CircuitGroupPool,
}
