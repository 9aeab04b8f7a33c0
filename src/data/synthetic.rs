//! Deterministic synthetic year used when no measured data is configured.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::data::calendar::{HOURS_PER_DAY, HOURS_PER_YEAR};
use crate::data::loader::PRICE_FLOOR;
use crate::data::store::TimeSeriesStore;
use crate::error::DataError;

/// Shape parameters for the synthetic profiles.
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    /// Midsummer PV peak (kWh per hour).
    pub pv_peak_summer: f32,
    /// Midwinter PV peak (kWh per hour).
    pub pv_peak_winter: f32,
    /// Sunrise hour in midsummer (inclusive).
    pub sunrise_summer: usize,
    /// Sunset hour in midsummer (exclusive).
    pub sunset_summer: usize,
    /// Relative standard deviation of PV cloud noise.
    pub pv_noise_std: f32,
    /// Mean hourly demand (kWh).
    pub demand_base: f32,
    /// Daily demand amplitude (kWh).
    pub demand_amp: f32,
    /// Demand noise standard deviation (kWh).
    pub demand_noise_std: f32,
    /// Mean price.
    pub price_base: f32,
    /// Daily price amplitude.
    pub price_amp: f32,
    /// Price noise standard deviation.
    pub price_noise_std: f32,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            pv_peak_summer: 180.0,
            pv_peak_winter: 60.0,
            sunrise_summer: 5,
            sunset_summer: 21,
            pv_noise_std: 0.15,
            demand_base: 200.0,
            demand_amp: 80.0,
            demand_noise_std: 10.0,
            price_base: 3.0,
            price_amp: 1.5,
            price_noise_std: 0.3,
        }
    }
}

/// Box-Muller Gaussian sample with mean 0.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}

/// Half-cosine daylight fraction in `[0, 1]` for `hour` between sunrise
/// (inclusive) and sunset (exclusive); zero outside.
pub fn daylight_frac(hour: usize, sunrise: usize, sunset: usize) -> f32 {
    if hour < sunrise || hour >= sunset || sunrise >= sunset {
        return 0.0;
    }
    let span = (sunset - sunrise) as f32;
    let pos = (hour - sunrise) as f32 + 0.5;
    (std::f32::consts::PI * pos / span).sin()
}

impl SyntheticProfile {
    /// Generates a full year of hourly solar, price, and demand values.
    ///
    /// # Errors
    ///
    /// Never fails for the default profile; the result goes through the
    /// same length check as measured data.
    pub fn generate(&self, seed: u64) -> Result<TimeSeriesStore, DataError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut solar = Vec::with_capacity(HOURS_PER_YEAR);
        let mut price = Vec::with_capacity(HOURS_PER_YEAR);
        let mut demand = Vec::with_capacity(HOURS_PER_YEAR);

        let days = HOURS_PER_YEAR / HOURS_PER_DAY;
        for day in 0..days {
            // 1.0 at the summer solstice (day 171), 0.0 at the winter one
            let season = 0.5
                + 0.5 * (2.0 * std::f32::consts::PI * (day as f32 - 171.0) / days as f32).cos();
            let peak = self.pv_peak_winter + (self.pv_peak_summer - self.pv_peak_winter) * season;
            let shrink = ((1.0 - season) * 3.0).round() as usize;
            let sunrise = self.sunrise_summer + shrink;
            let sunset = self.sunset_summer.saturating_sub(shrink);
            let cloud = (1.0 + gaussian_noise(&mut rng, self.pv_noise_std)).clamp(0.0, 1.2);

            for hour in 0..HOURS_PER_DAY {
                let angle = 2.0 * std::f32::consts::PI * hour as f32 / HOURS_PER_DAY as f32;

                solar.push(peak * cloud * daylight_frac(hour, sunrise, sunset));

                // evening peak around 19:00
                let d = self.demand_base
                    + self.demand_amp * (angle - 1.3 * std::f32::consts::PI / 2.0).sin()
                    + gaussian_noise(&mut rng, self.demand_noise_std);
                demand.push(d.max(0.0));

                let p = self.price_base
                    + self.price_amp * (angle - std::f32::consts::PI / 2.0).sin()
                    + gaussian_noise(&mut rng, self.price_noise_std);
                price.push(p.max(PRICE_FLOOR));
            }
        }

        TimeSeriesStore::new(solar, price, demand)
    }
}
