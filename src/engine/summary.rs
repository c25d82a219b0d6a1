//! Post-hoc prioritization summary of a completed batch.

use std::fmt;

use crate::model::{GroupNetSupply, PeakHour};

/// Default number of ranked upgrade candidates.
pub const DEFAULT_TOP_N: usize = 10;

/// One ranked upgrade candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub parcel_count: usize,
    pub annual_net_supply: f64,
    pub max_hourly_net_supply: f64,
}

/// Aggregate figures derived from the complete result set.
///
/// Computed after the batch so the summary always agrees with the exported
/// rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of circuit groups computed.
    pub groups: usize,
    /// Number of parcels aggregated across all groups.
    pub parcels: usize,
    /// Sum of annual net supply over all groups (MWh).
    pub total_annual_net_supply: f64,
    /// Groups with positive annual net supply.
    pub net_exporters: usize,
    /// Groups with negative annual net supply.
    pub net_importers: usize,
    /// Which peak hour the ranking follows.
    pub peak_hour: PeakHour,
    /// Groups ranked by peak hourly net supply: highest first for export
    /// peaks, most negative first for import peaks.
    pub candidates: Vec<Candidate>,
}

impl RunSummary {
    /// Builds the summary, keeping the `top_n` most extreme peak-hour groups
    /// in the direction of `peak_hour`.
    ///
    /// Ties keep result order, so ranking is deterministic for results in
    /// pool order.
    pub fn from_results(results: &[GroupNetSupply], peak_hour: PeakHour, top_n: usize) -> Self {
        let mut total = 0.0;
        let mut parcels = 0;
        let mut exporters = 0;
        let mut importers = 0;

        for r in results {
            total += r.annual_net_supply;
            parcels += r.parcel_count;
            if r.annual_net_supply > 0.0 {
                exporters += 1;
            } else if r.annual_net_supply < 0.0 {
                importers += 1;
            }
        }

        let mut ranked: Vec<&GroupNetSupply> = results.iter().collect();
        match peak_hour {
            PeakHour::Export => {
                ranked.sort_by(|a, b| b.max_hourly_net_supply.total_cmp(&a.max_hourly_net_supply));
            }
            PeakHour::Import => {
                ranked.sort_by(|a, b| a.max_hourly_net_supply.total_cmp(&b.max_hourly_net_supply));
            }
        }
        let candidates = ranked
            .into_iter()
            .take(top_n)
            .map(|r| Candidate {
                id: r.id.clone(),
                parcel_count: r.parcel_count,
                annual_net_supply: r.annual_net_supply,
                max_hourly_net_supply: r.max_hourly_net_supply,
            })
            .collect();

        Self {
            groups: results.len(),
            parcels,
            total_annual_net_supply: total,
            net_exporters: exporters,
            net_importers: importers,
            peak_hour,
            candidates,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Circuit Group Summary ---")?;
        writeln!(f, "Circuit groups:        {}", self.groups)?;
        writeln!(f, "Parcels:               {}", self.parcels)?;
        writeln!(
            f,
            "Total annual net:      {:.4} MWh",
            self.total_annual_net_supply
        )?;
        writeln!(f, "Net exporting groups:  {}", self.net_exporters)?;
        writeln!(f, "Net importing groups:  {}", self.net_importers)?;
        let direction = match self.peak_hour {
            PeakHour::Export => "export",
            PeakHour::Import => "import",
        };
        write!(f, "Top candidates by peak hourly {direction}:")?;
        for (rank, c) in self.candidates.iter().enumerate() {
            write!(
                f,
                "\n  {:>3}. {:<12} peak={:>10.4} MW  annual={:>12.4} MWh  parcels={}",
                rank + 1,
                c.id,
                c.max_hourly_net_supply,
                c.annual_net_supply,
                c.parcel_count
            )?;
        }
        Ok(())
    }
}
