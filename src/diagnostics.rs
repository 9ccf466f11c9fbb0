//! Low-confidence annotations attached to computed results
//!
//! A warning never stops a computation. The caller decides whether a
//! low-confidence result is acceptable.

use serde::{Deserialize, Serialize};

/// Overall trust in a computed result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    #[default]
    Nominal,
    Low,
}

/// Something about a result the caller should know
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelWarning {
    /// A model's dimensionless parameter left its validated range
    OutOfModelRange {
        layer: usize,
        model: String,
        /// Validated range of the parameter
        valid_min: f64,
        valid_max: f64,
        /// Frequencies (Hz) where the parameter was outside the range
        frequencies: Vec<f64>,
    },
    /// An input lies outside the regime a formula was derived for
    ParameterOutsidePhysicalRange {
        layer: usize,
        parameter: String,
        value: f64,
        note: String,
    },
    /// Physically invalid absorption was clipped to [0, 1]
    AbsorptionClipped { frequencies: Vec<f64> },
}

impl ModelWarning {
    /// Short stable identifier for the warning kind
    pub fn code(&self) -> &'static str {
        match self {
            ModelWarning::OutOfModelRange { .. } => "OUT_OF_MODEL_RANGE",
            ModelWarning::ParameterOutsidePhysicalRange { .. } => "PARAMETER_OUTSIDE_RANGE",
            ModelWarning::AbsorptionClipped { .. } => "ABSORPTION_CLIPPED",
        }
    }
}

/// Warnings collected while evaluating one stack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub warnings: Vec<ModelWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: ModelWarning) {
        log::debug!("model warning: {:?}", warning);
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn confidence(&self) -> Confidence {
        if self.warnings.is_empty() {
            Confidence::Nominal
        } else {
            Confidence::Low
        }
    }

    /// Whether any warning of the given code is present
    pub fn has(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code() == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_follows_warnings() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.confidence(), Confidence::Nominal);
        diag.push(ModelWarning::AbsorptionClipped {
            frequencies: vec![100.0],
        });
        assert_eq!(diag.confidence(), Confidence::Low);
        assert!(diag.has("ABSORPTION_CLIPPED"));
        assert!(!diag.has("OUT_OF_MODEL_RANGE"));
    }
}
