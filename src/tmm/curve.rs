//! Absorption curves

use crate::diagnostics::ModelWarning;
use crate::frequency::{interpolate_log, FrequencyAxis};
use serde::{Deserialize, Serialize};

/// Clamp one absorption coefficient to [0, 1]
///
/// Returns the clamped value and whether the raw value was physically
/// invalid. Non-finite values become 0. Rounding noise within 1e-9 of the
/// interval is clamped silently.
pub(crate) fn clip_alpha(alpha: f64) -> (f64, bool) {
    if !alpha.is_finite() {
        (0.0, true)
    } else if (0.0..=1.0).contains(&alpha) {
        (alpha, false)
    } else {
        (alpha.clamp(0.0, 1.0), alpha < -1e-9 || alpha > 1.0 + 1e-9)
    }
}

/// Absorption coefficient per frequency, always within [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsorptionCurve {
    frequencies: Vec<f64>,
    values: Vec<f64>,
    /// Indices whose raw value fell outside [0, 1] and was clipped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    clipped: Vec<usize>,
}

impl AbsorptionCurve {
    /// Build a curve from raw coefficients, clipping anything outside [0, 1]
    ///
    /// Non-finite values are treated as 0 and flagged.
    pub fn from_raw(axis: &FrequencyAxis, raw: Vec<f64>) -> Self {
        debug_assert_eq!(axis.len(), raw.len());
        let mut clipped = Vec::new();
        let values = raw
            .into_iter()
            .enumerate()
            .map(|(i, alpha)| {
                let (value, flagged) = clip_alpha(alpha);
                if flagged {
                    clipped.push(i);
                }
                value
            })
            .collect();
        Self {
            frequencies: axis.values().to_vec(),
            values,
            clipped,
        }
    }

    /// Flag additional indices as clipped, e.g. where an intermediate
    /// value behind an in-range result was out of range
    pub(crate) fn with_clipped<I>(mut self, indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.clipped
            .extend(indices.into_iter().filter(|&i| i < self.values.len()));
        self.clipped.sort_unstable();
        self.clipped.dedup();
        self
    }

    /// Curve of a bare rigid wall
    pub fn zeros(axis: &FrequencyAxis) -> Self {
        Self {
            frequencies: axis.values().to_vec(),
            values: vec![0.0; axis.len()],
            clipped: Vec::new(),
        }
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn clipped(&self) -> &[usize] {
        &self.clipped
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(frequency, alpha)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies.iter().copied().zip(self.values.iter().copied())
    }

    /// Absorption at `frequency`, interpolated on log-frequency and clamped
    /// to the curve ends
    pub fn at(&self, frequency: f64) -> f64 {
        interpolate_log(&self.frequencies, &self.values, frequency)
    }

    /// Frequency and value of the maximum (first one on ties)
    pub fn peak(&self) -> (f64, f64) {
        self.iter()
            .fold((0.0, f64::MIN), |best, (f, a)| if a > best.1 { (f, a) } else { best })
    }

    /// Warning describing clipped points, if any
    pub fn clipping_warning(&self) -> Option<ModelWarning> {
        if self.clipped.is_empty() {
            return None;
        }
        Some(ModelWarning::AbsorptionClipped {
            frequencies: self.clipped.iter().map(|&i| self.frequencies[i]).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> FrequencyAxis {
        FrequencyAxis::from_values(vec![125.0, 250.0, 500.0, 1000.0]).unwrap()
    }

    #[test]
    fn test_clips_and_flags() {
        let curve = AbsorptionCurve::from_raw(&axis(), vec![-0.2, 0.4, 1.3, f64::NAN]);
        assert_eq!(curve.values(), &[0.0, 0.4, 1.0, 0.0]);
        assert_eq!(curve.clipped(), &[0, 2, 3]);
        match curve.clipping_warning() {
            Some(ModelWarning::AbsorptionClipped { frequencies }) => {
                assert_eq!(frequencies, vec![125.0, 500.0, 1000.0]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rounding_noise_not_flagged() {
        let curve = AbsorptionCurve::from_raw(&axis(), vec![-1e-14, 0.5, 1.0 + 1e-13, 0.2]);
        assert!(curve.clipped().is_empty());
        assert_eq!(curve.values()[0], 0.0);
        assert_eq!(curve.values()[2], 1.0);
    }

    #[test]
    fn test_extra_clipped_indices_merge_sorted() {
        let curve = AbsorptionCurve::from_raw(&axis(), vec![0.1, -0.3, 0.2, 0.4])
            .with_clipped([3, 1, 9]);
        assert_eq!(curve.clipped(), &[1, 3]);
        assert_eq!(curve.values(), &[0.1, 0.0, 0.2, 0.4]);
        assert!(curve.clipping_warning().is_some());
    }

    #[test]
    fn test_peak_and_interpolation() {
        let curve = AbsorptionCurve::from_raw(&axis(), vec![0.1, 0.3, 0.9, 0.7]);
        assert_eq!(curve.peak(), (500.0, 0.9));
        assert_eq!(curve.at(50.0), 0.1);
        assert_eq!(curve.at(250.0), 0.3);
        assert!((curve.at(353.553) - 0.6).abs() < 1e-4);
    }
}
