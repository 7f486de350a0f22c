use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Device, Thermometer};

const STARTING_RANGE: std::ops::RangeInclusive<f32> = 10.0..=20.0;
const DRIFT_RANGE: std::ops::RangeInclusive<f32> = -1.0..=1.0;

/// Readings between drifts.
const DRIFT_EVERY: u32 = 5;

/// Thermometer without hardware: a random starting point that drifts by up
/// to one degree every fifth reading.
#[derive(Debug)]
pub struct SimulatedThermometer {
    readings: u32,
    current: f32,
    rng: StdRng,
}

impl SimulatedThermometer {
    pub const NAME: &'static str = "SimulatedThermometer";

    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic thermometer for reproducible runs.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Self {
        let current = rng.gen_range(STARTING_RANGE);
        Self {
            readings: 0,
            current,
            rng,
        }
    }
}

impl Default for SimulatedThermometer {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for SimulatedThermometer {
    fn name(&self) -> &str {
        Self::NAME
    }
}

impl Thermometer for SimulatedThermometer {
    fn temperature(&mut self) -> Option<f32> {
        self.readings = self.readings.wrapping_add(1);
        if self.readings % DRIFT_EVERY == 0 {
            self.current += self.rng.gen_range(DRIFT_RANGE);
        }
        Some(self.current)
    }
}
