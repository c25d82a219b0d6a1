//! Load-time cleanup of raw parcel supply/demand totals.

/// Rule applied once to every parcel's raw `(supply, demand)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubPolicy {
    /// Negative demand becomes 0; zero demand forces supply to 0.
    ClampNegative,
    /// Demand equal to the sentinel, or any negative demand, zeroes both
    /// fields. A genuine zero demand keeps its supply.
    Sentinel(f64),
}

impl Default for ScrubPolicy {
    fn default() -> Self {
        Self::ClampNegative
    }
}

impl ScrubPolicy {
    /// Returns the scrubbed `(annual_supply, annual_demand)`.
    ///
    /// Negative supply is always clamped to 0.
    pub fn apply(self, supply: f64, demand: f64) -> (f64, f64) {
        let supply = supply.max(0.0);
        match self {
            Self::ClampNegative => {
                let demand = demand.max(0.0);
                if demand == 0.0 {
                    (0.0, 0.0)
                } else {
                    (supply, demand)
                }
            }
            Self::Sentinel(sentinel) => {
                if demand == sentinel || demand < 0.0 {
                    (0.0, 0.0)
                } else {
                    (supply, demand)
                }
            }
        }
    }
}
