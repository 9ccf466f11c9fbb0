//! Layer Model Providers
//!
//! Each physical model converts parameters plus one frequency into either a
//! characteristic impedance / wavenumber pair (propagating layers) or a
//! single sheet impedance (zero-thickness layers). All providers are pure.
//!
//! Geometric inputs at the public boundary are in millimetres; formulas work
//! in metres.

pub mod air;
pub mod helmholtz;
pub mod material;
pub mod membrane;
pub mod perforated;
pub mod porous;

pub use helmholtz::{HelmholtzResonator, HelmholtzResponse};
pub use material::{MaterialEntry, MaterialTable};
pub use perforated::PanelKind;
pub use porous::{JcaParameters, PorousModel, PorousResponse, XRange};

use crate::error::{AcousticError, Result};

/// Millimetres to metres
#[inline]
pub fn mm_to_m(mm: f64) -> f64 {
    mm * 1e-3
}

/// Reject non-positive or non-finite physical parameters
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AcousticError::invalid(parameter, value, "must be positive and finite"))
    }
}

/// Reject non-positive frequencies
pub(crate) fn require_frequency(frequency: f64) -> Result<()> {
    require_positive("frequency", frequency)
}
