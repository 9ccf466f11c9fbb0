//! Single-number absorption ratings
//!
//! NRC and SAA follow ASTM C423. Values are read off the curve by linear
//! interpolation on log-frequency and clamped at the axis ends, so a curve
//! computed on any axis can be rated.

use crate::frequency::{NRC_FREQUENCIES, OCTAVE_CENTERS, SAA_FREQUENCIES};
use crate::tmm::AbsorptionCurve;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean absorption at the given frequencies
pub fn mean_at(curve: &AbsorptionCurve, frequencies: &[f64]) -> f64 {
    if frequencies.is_empty() {
        return 0.0;
    }
    frequencies.iter().map(|&f| curve.at(f)).sum::<f64>() / frequencies.len() as f64
}

/// Noise Reduction Coefficient: mean at 250, 500, 1000 and 2000 Hz
pub fn nrc(curve: &AbsorptionCurve) -> f64 {
    mean_at(curve, &NRC_FREQUENCIES)
}

/// Sound Absorption Average: mean over the twelve third-octave bands
/// 200–2500 Hz
pub fn saa(curve: &AbsorptionCurve) -> f64 {
    mean_at(curve, &SAA_FREQUENCIES)
}

/// Round to the nearest multiple of `step`, where `1 / step` is whole
fn round_to(value: f64, step: f64) -> f64 {
    let per_unit = (1.0 / step).round();
    (value * per_unit).round() / per_unit
}

/// Summary ratings of one curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Unrounded NRC
    pub nrc: f64,
    /// Unrounded SAA
    pub saa: f64,
    /// Absorption at each octave centre, keyed by centre frequency (Hz)
    pub octave_bands: BTreeMap<u32, f64>,
    pub peak_frequency_hz: f64,
    pub peak_alpha: f64,
}

impl Metrics {
    pub fn from_curve(curve: &AbsorptionCurve) -> Self {
        let octave_bands = OCTAVE_CENTERS
            .iter()
            .map(|&f| (f as u32, curve.at(f)))
            .collect();
        let (peak_frequency_hz, peak_alpha) = curve.peak();
        Self {
            nrc: nrc(curve),
            saa: saa(curve),
            octave_bands,
            peak_frequency_hz,
            peak_alpha,
        }
    }

    /// NRC as published: rounded to the nearest 0.05
    pub fn nrc_rounded(&self) -> f64 {
        round_to(self.nrc, 0.05)
    }

    /// SAA as published: rounded to the nearest 0.01
    pub fn saa_rounded(&self) -> f64 {
        round_to(self.saa, 0.01)
    }
}
