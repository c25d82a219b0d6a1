//! Per-circuit-group net supply computation.
//!
//! For a group of `P` parcels over `H` hours the computation builds two
//! `H x P` matrices, one column per parcel:
//!
//! - supply: the outer product of the shared supply profile with the
//!   parcels' annual supply totals
//! - demand: each parcel's usetype profile scaled by its annual demand
//!
//! and reduces their difference along the parcel axis (hourly net supply)
//! and over everything (annual net supply).

use ndarray::{Array2, Axis};

use crate::error::EngineError;
use crate::model::{CircuitGroup, GroupNetSupply, KWH_TO_MWH, PeakHour, ProfileStore, SupplyProfile};

/// Read-only inputs shared by every worker.
#[derive(Debug, Clone, Copy)]
pub struct NettingContext<'a> {
    pub supply: &'a SupplyProfile,
    pub profiles: &'a ProfileStore,
    pub peak_hour: PeakHour,
}

impl<'a> NettingContext<'a> {
    /// Pairs the supply profile with the demand profiles.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProfileLength`] if any demand profile covers a
    /// different number of hours than the supply profile. The lowest
    /// mismatching usetype is reported.
    pub fn new(
        supply: &'a SupplyProfile,
        profiles: &'a ProfileStore,
        peak_hour: PeakHour,
    ) -> Result<Self, EngineError> {
        let expected = supply.hours();
        if let Some(bad) = profiles
            .iter()
            .filter(|p| p.hours() != expected)
            .min_by(|a, b| a.usetype().cmp(b.usetype()))
        {
            return Err(EngineError::ProfileLength {
                usetype: bad.usetype().to_string(),
                expected,
                found: bad.hours(),
            });
        }
        Ok(Self {
            supply,
            profiles,
            peak_hour,
        })
    }

    pub fn hours(&self) -> usize {
        self.supply.hours()
    }

    /// Computes the net supply aggregates of one group.
    ///
    /// Parcels are processed in their stored order so results are
    /// bit-for-bit reproducible regardless of which worker runs the group.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingProfile`] when a parcel usetype has no
    /// demand profile. Loading validates this, so it only fires on pools
    /// built around the loader.
    pub fn net_supply(&self, index: usize, group: &CircuitGroup) -> Result<GroupNetSupply, EngineError> {
        let hours = self.hours();
        let parcels = group.parcels();
        let supply_profile = self.supply.hourly_fraction();

        let mut demand = Array2::<f64>::zeros((hours, parcels.len()));
        for (i, parcel) in parcels.iter().enumerate() {
            let profile = self.profiles.lookup(&parcel.usetype)?;
            let scaled = &profile.hourly_fraction() * parcel.annual_demand;
            demand.column_mut(i).assign(&scaled);
        }

        let supply = Array2::from_shape_fn((hours, parcels.len()), |(h, i)| {
            supply_profile[h] * parcels[i].annual_supply
        });

        let net = supply - demand;
        let annual_net_supply = net.sum() * KWH_TO_MWH;
        let hourly_net_supply = net.sum_axis(Axis(1)).to_vec();
        let max_hourly_net_supply = self.peak_hour.select(&hourly_net_supply) * KWH_TO_MWH;

        Ok(GroupNetSupply {
            index,
            id: group.id().to_string(),
            parcel_count: parcels.len(),
            hourly_net_supply,
            annual_net_supply,
            max_hourly_net_supply,
        })
    }
}
