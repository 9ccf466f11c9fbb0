//! Transfer-Matrix Engine
//!
//! Chains per-layer 2×2 matrices from the exposed face to the rigid backing
//! and converts the resulting surface impedance into absorption. Oblique
//! incidence is handled by projecting the wavenumber onto the layer normal.

mod chain;
mod curve;
mod layer;
mod matrix;

pub use chain::{absorption_coefficient, reflection_coefficient, LayerChain};
pub use curve::AbsorptionCurve;
pub(crate) use curve::clip_alpha;
pub use layer::{LayerSpec, Stack, TYPICAL_SIGMA_RANGE};
pub use matrix::{TransferMatrix, RIGID_IMPEDANCE};

/// Incidence angle, stored as its sine and cosine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub sin: f64,
    pub cos: f64,
}

impl Angle {
    /// Normal incidence (θ = 0)
    pub fn normal() -> Self {
        Self { sin: 0.0, cos: 1.0 }
    }

    pub fn from_radians(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self { sin, cos }
    }

    pub fn from_degrees(theta: f64) -> Self {
        Self::from_radians(theta.to_radians())
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::normal()
    }
}
