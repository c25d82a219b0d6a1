//! Core domain types: parcels, circuit groups, and per-group results.

use std::fmt;

/// Conversion from kWh sums to MWh (and kW peaks to MW).
pub const KWH_TO_MWH: f64 = 0.001;

/// A single property with annual solar supply and building demand totals.
///
/// Values are already scrubbed when a `Parcel` exists; see
/// [`crate::model::scrub::ScrubPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    /// Parcel identifier.
    pub id: String,
    /// Building/use category selecting the hourly demand profile.
    pub usetype: String,
    /// Identifier of the owning circuit group.
    pub circuit_group_id: String,
    /// Annual rooftop solar supply (kWh, >= 0).
    pub annual_supply: f64,
    /// Annual building demand (kWh, >= 0).
    pub annual_demand: f64,
}

impl Parcel {
    pub fn new(
        id: impl Into<String>,
        usetype: impl Into<String>,
        circuit_group_id: impl Into<String>,
        annual_supply: f64,
        annual_demand: f64,
    ) -> Self {
        Self {
            id: id.into(),
            usetype: usetype.into(),
            circuit_group_id: circuit_group_id.into(),
            annual_supply,
            annual_demand,
        }
    }
}

/// A cluster of grid-connected parcels analyzed as one unit.
///
/// Owns its complete, ordered parcel sequence. The sequence is filled at
/// load time and never changes afterwards, so draining it can't block.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitGroup {
    id: String,
    parcels: Vec<Parcel>,
}

impl CircuitGroup {
    /// Creates a circuit group from an already-complete parcel sequence.
    pub fn new(id: impl Into<String>, parcels: Vec<Parcel>) -> Self {
        Self {
            id: id.into(),
            parcels,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of parcels owned by this group.
    pub fn parcel_count(&self) -> usize {
        self.parcels.len()
    }

    /// Parcels in their stored (load) order.
    pub fn parcels(&self) -> &[Parcel] {
        &self.parcels
    }
}

/// Which hour `max_hourly_net_supply` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakHour {
    /// Largest signed hourly net supply (highest export hour).
    #[default]
    Export,
    /// Smallest signed hourly net supply (highest import hour).
    Import,
}

impl PeakHour {
    /// Parses the configuration spelling (`"export"` or `"import"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "export" => Some(Self::Export),
            "import" => Some(Self::Import),
            _ => None,
        }
    }

    /// Selects the reported hour value from an hourly series.
    ///
    /// Returns 0.0 for an empty series.
    pub fn select(self, hourly: &[f64]) -> f64 {
        if hourly.is_empty() {
            return 0.0;
        }
        match self {
            Self::Export => hourly.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Import => hourly.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

/// Completed net-supply aggregates for one circuit group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNetSupply {
    /// Position of the group in the pool (load order).
    pub index: usize,
    /// Circuit group identifier.
    pub id: String,
    /// Number of parcels aggregated.
    pub parcel_count: usize,
    /// Net supply per hour (kWh; positive = export, negative = import).
    pub hourly_net_supply: Vec<f64>,
    /// Annual net supply (MWh).
    pub annual_net_supply: f64,
    /// Net supply of the selected peak hour (MW).
    pub max_hourly_net_supply: f64,
}

impl fmt::Display for GroupNetSupply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} parcels={:>5}  annual={:>12.4} MWh  peak={:>9.4} MW",
            self.id, self.parcel_count, self.annual_net_supply, self.max_hourly_net_supply,
        )
    }
}
