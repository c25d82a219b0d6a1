use rand::{SeedableRng, rngs::StdRng};

use super::noise::{gaussian_noise, normalize};
use crate::model::SupplyProfile;

const HOURS_PER_DAY: usize = 24;
const DAYS_PER_YEAR: f64 = 365.0;
/// Day of year with the longest daylight.
const SOLSTICE_DAY: f64 = 172.0;

/// Hourly solar shape for a year of operation.
///
/// Generation follows a half-cosine between sunrise and sunset, scaled by a
/// seasonal amplitude peaking at the summer solstice, with multiplicative
/// cloud noise. The finished profile is normalized to sum to 1.0.
#[derive(Debug, Clone)]
pub struct SolarShape {
    /// Hour of day when generation starts (inclusive).
    pub sunrise: usize,
    /// Hour of day when generation stops (exclusive).
    pub sunset: usize,
    /// Relative swing of daily output between summer and winter.
    pub seasonal_amplitude: f64,
    /// Standard deviation of the cloud noise multiplier.
    pub noise_std: f64,
}

impl Default for SolarShape {
    fn default() -> Self {
        Self {
            sunrise: 6,
            sunset: 18,
            seasonal_amplitude: 0.35,
            noise_std: 0.15,
        }
    }
}

impl SolarShape {
    /// Fraction of peak output at an hour of the day, 0 at night.
    pub fn daylight_frac(&self, hour_of_day: usize) -> f64 {
        if hour_of_day < self.sunrise || hour_of_day >= self.sunset {
            return 0.0;
        }
        let span = (self.sunset - self.sunrise) as f64;
        let pos = (hour_of_day - self.sunrise) as f64 + 0.5;
        (std::f64::consts::PI * pos / span).sin()
    }

    /// Seasonal scale for a day of the year, in `1 +/- seasonal_amplitude`.
    pub fn seasonal_scale(&self, day: usize) -> f64 {
        let angle = 2.0 * std::f64::consts::PI * (day as f64 - SOLSTICE_DAY) / DAYS_PER_YEAR;
        1.0 + self.seasonal_amplitude * angle.cos()
    }

    /// Generates a normalized supply profile of `hours` values.
    pub fn generate(&self, hours: usize, seed: u64) -> SupplyProfile {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut values: Vec<f64> = (0..hours)
            .map(|h| {
                let frac = self.daylight_frac(h % HOURS_PER_DAY);
                if frac <= 0.0 {
                    return 0.0;
                }
                let cloud = 1.0 + gaussian_noise(&mut rng, self.noise_std);
                (frac * self.seasonal_scale(h / HOURS_PER_DAY) * cloud).max(0.0)
            })
            .collect();
        normalize(&mut values);
        SupplyProfile::new(values)
    }
}
