//! Layer chain evaluation
//!
//! Layers are chained in stack order (index 0 faces the room) and the
//! product is terminated by a rigid wall:
//!
//! ```text
//! T = T_0 · T_1 · … · T_{n-1}      Z_s = T.a / T.c
//! R = (Z_s cos θ − Z₀) / (Z_s cos θ + Z₀)      α = 1 − |R|²
//! ```

use super::{AbsorptionCurve, Angle, LayerSpec, Stack, TransferMatrix};
use crate::config::AirProperties;
use crate::diagnostics::{Diagnostics, ModelWarning};
use crate::error::Result;
use crate::frequency::FrequencyAxis;
use num_complex::Complex64;

/// Reflection coefficient of a surface impedance seen at angle θ
pub fn reflection_coefficient(surface_impedance: Complex64, cos_theta: f64, z0: f64) -> Complex64 {
    let zs = surface_impedance * cos_theta;
    (zs - z0) / (zs + z0)
}

/// Unclipped absorption coefficient `1 − |R|²`
pub fn absorption_coefficient(surface_impedance: Complex64, cos_theta: f64, z0: f64) -> f64 {
    1.0 - reflection_coefficient(surface_impedance, cos_theta, z0).norm_sqr()
}

/// A validated stack ready for evaluation
#[derive(Debug, Clone, Copy)]
pub struct LayerChain<'a> {
    stack: &'a Stack,
    air: &'a AirProperties,
}

impl<'a> LayerChain<'a> {
    /// Validate `stack` and wrap it for evaluation
    ///
    /// Returns the chain together with warnings about unusual parameters.
    pub fn new(stack: &'a Stack, air: &'a AirProperties) -> Result<(Self, Diagnostics)> {
        let diagnostics = stack.validate()?;
        Ok((Self { stack, air }, diagnostics))
    }

    pub fn stack(&self) -> &Stack {
        self.stack
    }

    pub fn air(&self) -> &AirProperties {
        self.air
    }

    /// Total transfer matrix at one frequency and angle
    pub fn matrix(&self, frequency: f64, angle: Angle) -> Result<TransferMatrix> {
        let mut total = TransferMatrix::identity();
        for layer in self.stack.layers() {
            let (matrix, _) = layer.transfer_matrix(frequency, angle, self.air)?;
            total = total.chain(&matrix);
        }
        Ok(total)
    }

    /// Surface impedance of the rigid-backed chain
    pub fn surface_impedance(&self, frequency: f64, angle: Angle) -> Result<Complex64> {
        Ok(self.matrix(frequency, angle)?.rigid_backed_impedance())
    }

    /// Unclipped absorption at one frequency and angle
    ///
    /// A bare wall is a perfect reflector.
    pub fn absorption(&self, frequency: f64, angle: Angle) -> Result<f64> {
        if self.stack.is_empty() {
            return Ok(0.0);
        }
        let zs = self.surface_impedance(frequency, angle)?;
        Ok(absorption_coefficient(zs, angle.cos, self.air.impedance()))
    }

    /// Unclipped absorption at `angle` for every frequency of `axis`
    pub fn raw_absorption(&self, axis: &FrequencyAxis, angle: Angle) -> Result<Vec<f64>> {
        axis.iter().map(|f| self.absorption(f, angle)).collect()
    }

    /// Normal-incidence absorption curve
    pub fn normal_incidence(&self, axis: &FrequencyAxis) -> Result<AbsorptionCurve> {
        if self.stack.is_empty() {
            return Ok(AbsorptionCurve::zeros(axis));
        }
        let raw = self.raw_absorption(axis, Angle::normal())?;
        Ok(AbsorptionCurve::from_raw(axis, raw))
    }

    /// One warning per porous layer whose model left its validated range
    /// somewhere on `axis`
    pub fn range_warnings(&self, axis: &FrequencyAxis) -> Result<Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        for (index, layer) in self.stack.layers().iter().enumerate() {
            let LayerSpec::Porous { sigma, model, .. } = layer else {
                continue;
            };
            let mut frequencies = Vec::new();
            for f in axis.iter() {
                if !model.response(f, *sigma, self.air)?.in_range {
                    frequencies.push(f);
                }
            }
            if !frequencies.is_empty() {
                let range = model.valid_range();
                log::debug!(
                    "layer {} ({}) outside validated range at {} frequencies",
                    index,
                    model.name(),
                    frequencies.len()
                );
                diagnostics.push(ModelWarning::OutOfModelRange {
                    layer: index,
                    model: model.name().to_string(),
                    valid_min: range.min,
                    valid_max: range.max,
                    frequencies,
                });
            }
        }
        Ok(diagnostics)
    }
}
