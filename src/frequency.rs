//! Frequency axes and standard band centres

use crate::error::{AcousticError, Result};
use serde::{Deserialize, Serialize};

/// ISO 266 third-octave band centre frequencies (Hz)
pub const THIRD_OCTAVE_CENTERS: [f64; 31] = [
    20.0, 25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 315.0, 400.0,
    500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0, 4000.0, 5000.0, 6300.0,
    8000.0, 10000.0, 12500.0, 16000.0, 20000.0,
];

/// Octave band centres used for the summary table (Hz)
pub const OCTAVE_CENTERS: [f64; 7] = [63.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0];

/// NRC frequencies (ASTM C423)
pub const NRC_FREQUENCIES: [f64; 4] = [250.0, 500.0, 1000.0, 2000.0];

/// SAA third-octave bands, 200–2500 Hz (ASTM C423-09a)
pub const SAA_FREQUENCIES: [f64; 12] = [
    200.0, 250.0, 315.0, 400.0, 500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0,
];

/// Strictly increasing sequence of positive frequencies shared by every
/// curve computed in one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FrequencyAxis {
    values: Vec<f64>,
}

impl FrequencyAxis {
    /// Build an axis from explicit values
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(AcousticError::InvalidFrequencyAxis {
                reason: "axis contains no frequencies".to_string(),
            });
        }
        if let Some(bad) = values.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
            return Err(AcousticError::InvalidFrequencyAxis {
                reason: format!("frequency {bad} is not a positive finite value"),
            });
        }
        if let Some(pair) = values.windows(2).find(|w| w[1] <= w[0]) {
            return Err(AcousticError::InvalidFrequencyAxis {
                reason: format!("frequencies not strictly increasing at {} -> {}", pair[0], pair[1]),
            });
        }
        Ok(Self { values })
    }

    /// Logarithmically spaced axis with `points_per_octave` resolution
    ///
    /// # Arguments
    /// * `f_min` - Lowest frequency (Hz)
    /// * `f_max` - Highest frequency (Hz), included
    /// * `points_per_octave` - 12 gives third-octave-like resolution
    pub fn log_spaced(f_min: f64, f_max: f64, points_per_octave: usize) -> Result<Self> {
        if !(f_min > 0.0 && f_max > f_min && f_max.is_finite()) {
            return Err(AcousticError::InvalidFrequencyAxis {
                reason: format!("need 0 < f_min < f_max (got {f_min}..{f_max})"),
            });
        }
        if points_per_octave == 0 {
            return Err(AcousticError::InvalidFrequencyAxis {
                reason: "points_per_octave must be at least 1".to_string(),
            });
        }
        let octaves = (f_max / f_min).log2();
        let count = (octaves * points_per_octave as f64).ceil() as usize + 1;
        let ratio = (f_max / f_min).ln();
        let values = (0..count)
            .map(|i| {
                if i + 1 == count {
                    f_max
                } else {
                    f_min * (ratio * i as f64 / (count - 1) as f64).exp()
                }
            })
            .collect();
        Self::from_values(values)
    }

    /// ISO 266 third-octave centres within `[f_min, f_max]`
    pub fn third_octave(f_min: f64, f_max: f64) -> Result<Self> {
        let values = THIRD_OCTAVE_CENTERS
            .iter()
            .copied()
            .filter(|f| *f >= f_min && *f <= f_max)
            .collect();
        Self::from_values(values)
    }

    /// Frequency values in Hz
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.values[0]
    }

    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Index of the value closest to `frequency` on a log scale
    pub fn nearest_index(&self, frequency: f64) -> usize {
        let target = frequency.max(f64::MIN_POSITIVE).ln();
        self.values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.ln() - target)
                    .abs()
                    .total_cmp(&(b.ln() - target).abs())
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

impl Default for FrequencyAxis {
    fn default() -> Self {
        // 50 Hz – 5 kHz, 12 points per octave: ~80 points
        let octaves = (5000.0_f64 / 50.0).log2();
        let count = (octaves * 12.0).ceil() as usize + 1;
        let values = (0..count)
            .map(|i| 50.0 * 100.0_f64.powf(i as f64 / (count - 1) as f64))
            .collect();
        Self { values }
    }
}

impl TryFrom<Vec<f64>> for FrequencyAxis {
    type Error = AcousticError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::from_values(values)
    }
}

impl From<FrequencyAxis> for Vec<f64> {
    fn from(axis: FrequencyAxis) -> Self {
        axis.values
    }
}

/// Linear interpolation on log-frequency, clamped to the end values
///
/// `freqs` must be strictly increasing and the same length as `values`.
pub fn interpolate_log(freqs: &[f64], values: &[f64], target: f64) -> f64 {
    debug_assert_eq!(freqs.len(), values.len());
    if freqs.is_empty() {
        return 0.0;
    }
    let last = freqs.len() - 1;
    if target <= freqs[0] {
        return values[0];
    }
    if target >= freqs[last] {
        return values[last];
    }
    // First index whose frequency is >= target; 1..=last given the checks above
    let upper = freqs.partition_point(|f| *f < target);
    if freqs[upper] == target {
        return values[upper];
    }
    let lower = upper - 1;
    let (x0, x1) = (freqs[lower].log10(), freqs[upper].log10());
    let t = (target.log10() - x0) / (x1 - x0);
    values[lower] + t * (values[upper] - values[lower])
}
