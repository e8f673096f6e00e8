use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::drivers::{
    Band, BrainwaveSample, ChannelSample, DensityCell, FrequencyPoint, SampleBundle,
    SampleSource, ScopeConfig, ScopeError, TimePoint,
};

pub const MAX_FREQUENCY_HZ: f64 = 100.0;
pub const MAX_POWER: f64 = 10.0;
pub const MAX_DENSITY: f64 = 300.0;
pub const BAND_GAIN: f64 = 0.2;

/// Converts a power value to decibels. Zero power gives `-inf` rather than an error.
pub fn amplitude_db(power: f64) -> f64 {
    10.0 * power.log10()
}
/// Noisy band value at `tick`; `noise` is expected in [0, 1).
pub fn band_value(band: Band, tick: u64, noise: f64) -> f64 {
    let angle = 2.0 * PI * band.frequency_hz() * tick as f64 + band.phase_rad();
    BAND_GAIN * noise * angle.sin()
}
/// Synthetic EEG generator. Owns the tick counter; each call to
/// [`SignalGenerator::generate`] advances it by one.
pub struct SignalGenerator<R: Rng = StdRng> {
    num_channels: usize,
    tick: u64,
    rng: R,
}
impl SignalGenerator<StdRng> {
    pub fn new(num_channels: usize) -> Result<Self, ScopeError> {
        Self::with_rng(num_channels, StdRng::from_entropy())
    }
    pub fn with_seed(num_channels: usize, seed: u64) -> Result<Self, ScopeError> {
        Self::with_rng(num_channels, StdRng::seed_from_u64(seed))
    }
    pub fn from_config(config: &ScopeConfig) -> Result<Self, ScopeError> {
        match config.seed {
            Some(seed) => Self::with_seed(config.num_channels, seed),
            None => Self::new(config.num_channels),
        }
    }
}
impl<R: Rng> SignalGenerator<R> {
    pub fn with_rng(num_channels: usize, rng: R) -> Result<Self, ScopeError> {
        if num_channels == 0 {
            return Err(ScopeError::InvalidChannelCount);
        }
        Ok(Self {
            num_channels,
            tick: 0,
            rng,
        })
    }
    #[cfg(test)]
    pub fn tick(&self) -> u64 {
        self.tick
    }
    pub fn generate(&mut self) -> SampleBundle {
        self.tick += 1;
        let tick = self.tick;
        let values: Vec<f64> = (0..self.num_channels).map(|_| self.rng.gen::<f64>()).collect();
        let frequency = FrequencyPoint {
            frequency_hz: self.rng.gen::<f64>() * MAX_FREQUENCY_HZ,
            amplitude_db: amplitude_db(self.rng.gen::<f64>() * MAX_POWER),
        };
        let time = TimePoint {
            tick,
            amplitude: values[0],
        };
        let mut noisy = |band: Band| band_value(band, tick, self.rng.gen::<f64>());
        let brainwave = BrainwaveSample {
            tick,
            delta: noisy(Band::Delta),
            theta: noisy(Band::Theta),
            alpha: noisy(Band::Alpha),
            beta: noisy(Band::Beta),
            gamma: noisy(Band::Gamma),
        };
        let density = (0..self.num_channels)
            .map(|channel| DensityCell {
                channel,
                tick,
                density: self.rng.gen::<f64>() * MAX_DENSITY,
            })
            .collect();
        SampleBundle {
            tick,
            channels: ChannelSample { tick, values },
            frequency,
            time,
            brainwave,
            density,
        }
    }
}
impl<R: Rng + Send> SampleSource for SignalGenerator<R> {
    fn num_channels(&self) -> usize {
        self.num_channels
    }
    fn next_bundle(&mut self) -> Option<SampleBundle> {
        Some(self.generate())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::mock::StepRng;
    #[test]
    fn ticks_start_at_one_and_increase_by_one() {
        let mut gen = SignalGenerator::with_seed(4, 1).unwrap();
        assert_eq!(gen.tick(), 0);
        for expected in 1..=50u64 {
            let bundle = gen.generate();
            assert_eq!(bundle.tick, expected);
            assert_eq!(bundle.time.tick, expected);
            assert_eq!(bundle.brainwave.tick, expected);
            assert_eq!(bundle.channels.tick, expected);
        }
        assert_eq!(gen.tick(), 50);
    }
    #[test]
    fn bundle_shapes_and_ranges() {
        let mut gen = SignalGenerator::with_seed(33, 42).unwrap();
        for _ in 0..200 {
            let bundle = gen.generate();
            assert_eq!(bundle.channels.values.len(), 33);
            assert!(bundle.channels.values.iter().all(|v| (0.0..1.0).contains(v)));
            assert_eq!(bundle.time.amplitude, bundle.channels.values[0]);
            assert!((0.0..MAX_FREQUENCY_HZ).contains(&bundle.frequency.frequency_hz));
            assert!(bundle.frequency.amplitude_db < 10.0);
            for band in Band::ALL {
                let v = bundle.brainwave.band(band);
                assert!((-BAND_GAIN..=BAND_GAIN).contains(&v), "{band:?} = {v}");
            }
            assert_eq!(bundle.density.len(), 33);
            for (i, cell) in bundle.density.iter().enumerate() {
                assert_eq!(cell.channel, i);
                assert_eq!(cell.tick, bundle.tick);
                assert!((0.0..MAX_DENSITY).contains(&cell.density));
            }
        }
    }
    #[test]
    fn zero_power_is_negative_infinity() {
        let amp = amplitude_db(0.0);
        assert!(!amp.is_finite());
        assert!(amp.is_sign_negative());
        assert_relative_eq!(amplitude_db(10.0), 10.0);
        assert_relative_eq!(amplitude_db(1.0), 0.0);
    }
    #[test]
    fn silent_rng_yields_negative_infinite_amplitude() {
        let mut gen = SignalGenerator::with_rng(3, StepRng::new(0, 0)).unwrap();
        let bundle = gen.generate();
        let amp = bundle.frequency.amplitude_db;
        assert!(amp.is_infinite() && amp.is_sign_negative());
        assert_eq!(bundle.frequency.frequency_hz, 0.0);
        assert!(bundle.channels.values.iter().all(|v| *v == 0.0));
        assert!(Band::ALL.iter().all(|b| bundle.brainwave.band(*b) == 0.0));
        assert!(bundle.density.iter().all(|c| c.density == 0.0));
        assert_eq!(gen.generate().tick, 2);
    }
    #[test]
    fn band_value_follows_phase_and_gain() {
        assert_eq!(band_value(Band::Alpha, 3, 0.0), 0.0);
        // Integer ticks land on whole cycles for every band except delta.
        assert_relative_eq!(
            band_value(Band::Gamma, 7, 1.0),
            BAND_GAIN * 0.5f64.sin(),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            band_value(Band::Delta, 1, 1.0),
            BAND_GAIN * (PI + 0.1).sin(),
            epsilon = 1e-12
        );
    }
    #[test]
    fn same_seed_same_stream() {
        let mut a = SignalGenerator::with_seed(5, 9).unwrap();
        let mut b = SignalGenerator::with_seed(5, 9).unwrap();
        for _ in 0..10 {
            assert_eq!(a.generate(), b.generate());
        }
    }
    #[test]
    fn rejects_zero_channels() {
        assert!(matches!(
            SignalGenerator::with_seed(0, 1),
            Err(ScopeError::InvalidChannelCount)
        ));
    }
}
