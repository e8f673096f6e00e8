use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::drivers::ScopeError;

/// The five brainwave bands, each a fixed frequency with a fixed phase offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Delta,
    Theta,
    Alpha,
    Beta,
    Gamma,
}
impl Band {
    pub const ALL: [Band; 5] = [Band::Delta, Band::Theta, Band::Alpha, Band::Beta, Band::Gamma];
    pub fn frequency_hz(self) -> f64 {
        match self {
            Band::Delta => 0.5,
            Band::Theta => 4.0,
            Band::Alpha => 8.0,
            Band::Beta => 16.0,
            Band::Gamma => 32.0,
        }
    }
    pub fn phase_rad(self) -> f64 {
        match self {
            Band::Delta => 0.1,
            Band::Theta => 0.2,
            Band::Alpha => 0.3,
            Band::Beta => 0.4,
            Band::Gamma => 0.5,
        }
    }
    pub fn label(self) -> &'static str {
        match self {
            Band::Delta => "Delta",
            Band::Theta => "Theta",
            Band::Alpha => "Alpha",
            Band::Beta => "Beta",
            Band::Gamma => "Gamma",
        }
    }
}
/// One raw value per channel for a single tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelSample {
    pub tick: u64,
    pub values: Vec<f64>,
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyPoint {
    pub frequency_hz: f64,
    /// `10 * log10(power)`; `-inf` when the power was exactly zero.
    /// Serialised as `null` in that case.
    #[serde(with = "decibels")]
    pub amplitude_db: f64,
}
// JSON has no infinities; silent points travel as `null`.
mod decibels {
    use super::*;
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub tick: u64,
    pub amplitude: f64,
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrainwaveSample {
    pub tick: u64,
    pub delta: f64,
    pub theta: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}
impl BrainwaveSample {
    pub fn band(&self, band: Band) -> f64 {
        match band {
            Band::Delta => self.delta,
            Band::Theta => self.theta,
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Gamma => self.gamma,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityCell {
    pub channel: usize,
    pub tick: u64,
    pub density: f64,
}
/// Everything a single tick produces. Appended to history as a unit.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBundle {
    pub tick: u64,
    pub channels: ChannelSample,
    pub frequency: FrequencyPoint,
    pub time: TimePoint,
    pub brainwave: BrainwaveSample,
    pub density: Vec<DensityCell>,
}
impl SampleBundle {
    /// Both the raw values and the density cells must cover exactly `num_channels`.
    pub fn check_width(&self, num_channels: usize) -> Result<(), ScopeError> {
        for actual in [self.channels.values.len(), self.density.len()] {
            if actual != num_channels {
                return Err(ScopeError::ChannelMismatch {
                    tick: self.tick,
                    expected: num_channels,
                    actual,
                });
            }
        }
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn silent_frequency_point_round_trips_through_null() {
        let silent = FrequencyPoint {
            frequency_hz: 42.0,
            amplitude_db: f64::NEG_INFINITY,
        };
        let text = serde_json::to_string(&silent).unwrap();
        assert_eq!(text, r#"{"frequency_hz":42.0,"amplitude_db":null}"#);
        let back: FrequencyPoint = serde_json::from_str(&text).unwrap();
        assert_eq!(back, silent);

        let loud: FrequencyPoint =
            serde_json::from_str(r#"{"frequency_hz":1.5,"amplitude_db":-3.25}"#).unwrap();
        assert_eq!(loud.amplitude_db, -3.25);
    }
    #[test]
    fn check_width_looks_at_values_and_density() {
        let bundle = SampleBundle {
            tick: 4,
            channels: ChannelSample {
                tick: 4,
                values: vec![0.1, 0.2],
            },
            frequency: FrequencyPoint {
                frequency_hz: 1.0,
                amplitude_db: 0.0,
            },
            time: TimePoint {
                tick: 4,
                amplitude: 0.1,
            },
            brainwave: BrainwaveSample {
                tick: 4,
                delta: 0.0,
                theta: 0.0,
                alpha: 0.0,
                beta: 0.0,
                gamma: 0.0,
            },
            density: vec![DensityCell {
                channel: 0,
                tick: 4,
                density: 12.0,
            }],
        };
        assert!(matches!(
            bundle.check_width(2),
            Err(ScopeError::ChannelMismatch {
                tick: 4,
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            bundle.check_width(1),
            Err(ScopeError::ChannelMismatch { actual: 2, .. })
        ));
    }
}
