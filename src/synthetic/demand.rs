use rand::{SeedableRng, rngs::StdRng};

use super::noise::{gaussian_noise, normalize};
use crate::model::Profile;

const HOURS_PER_DAY: usize = 24;

/// Daily demand shape for one usetype: `base + amp * sin(2*pi*t/24 + phase)`
/// plus Gaussian noise, floored at zero.
#[derive(Debug, Clone)]
pub struct DemandShape {
    pub usetype: &'static str,
    pub base: f64,
    pub amp: f64,
    pub phase_rad: f64,
    pub noise_std: f64,
}

/// Shapes used by the synthetic generator, one per usetype.
pub const USETYPES: [DemandShape; 3] = [
    DemandShape {
        usetype: "residential",
        base: 1.0,
        amp: 0.7,
        phase_rad: 1.2,
        noise_std: 0.05,
    },
    DemandShape {
        usetype: "commercial",
        base: 1.0,
        amp: 0.8,
        phase_rad: -1.6,
        noise_std: 0.04,
    },
    DemandShape {
        usetype: "industrial",
        base: 1.0,
        amp: 0.1,
        phase_rad: 0.0,
        noise_std: 0.02,
    },
];

impl DemandShape {
    /// Un-normalized demand at an hour of the day, before noise.
    pub fn level(&self, hour_of_day: usize) -> f64 {
        let day_pos = (hour_of_day % HOURS_PER_DAY) as f64 / HOURS_PER_DAY as f64;
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;
        self.base + self.amp * angle.sin()
    }

    /// Generates a normalized demand profile of `hours` values.
    pub fn generate(&self, hours: usize, seed: u64) -> Profile {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut values: Vec<f64> = (0..hours)
            .map(|h| (self.level(h) + gaussian_noise(&mut rng, self.noise_std)).max(0.0))
            .collect();
        normalize(&mut values);
        Profile::new(self.usetype, values)
    }
}
