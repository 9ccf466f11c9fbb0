//! Diffuse-field (random incidence) absorption
//!
//! Paris' formula over a truncated angle range:
//!
//! ```text
//! α_d = ∫₀^θmax α(θ) sinθ cosθ dθ  /  ∫₀^θmax sinθ cosθ dθ
//! ```
//!
//! α(θ) is recomputed through the full oblique transfer-matrix chain at each
//! quadrature node. Normalising by the quadrature of the weight alone keeps
//! a constant α(θ) = a mapped exactly onto a.

use crate::config::DiffuseSettings;
use crate::error::{AcousticError, Result};
use crate::frequency::FrequencyAxis;
use crate::tmm::{clip_alpha, AbsorptionCurve, Angle, LayerChain};
use rayon::prelude::*;
use std::f64::consts::PI;

const MAX_NEWTON_ITERATIONS: usize = 100;
const NEWTON_TOLERANCE: f64 = 1e-15;

/// Legendre polynomial P_n and its derivative at `x`
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let (mut p0, mut p1) = (1.0, x);
    for k in 2..=n {
        let k = k as f64;
        let p2 = ((2.0 * k - 1.0) * x * p1 - (k - 1.0) * p0) / k;
        p0 = p1;
        p1 = p2;
    }
    let derivative = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, derivative)
}

/// Gauss-Legendre nodes and weights on [-1, 1], ascending
///
/// Roots of P_n are found by Newton iteration from the Tricomi initial
/// guesses; symmetry halves the work.
pub fn gauss_legendre(order: usize) -> Vec<(f64, f64)> {
    let n = order;
    let mut nodes = vec![(0.0, 0.0); n];
    for i in 0..(n + 1) / 2 {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let (p, dp) = legendre(n, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < NEWTON_TOLERANCE {
                break;
            }
        }
        let (_, dp) = legendre(n, x);
        let weight = 2.0 / ((1.0 - x * x) * dp * dp);
        nodes[i] = (-x, weight);
        nodes[n - 1 - i] = (x, weight);
    }
    nodes
}

/// Precomputed angles and Paris weights for one integration range
#[derive(Debug, Clone)]
pub struct DiffuseIntegrator {
    /// (angle, quadrature weight × sinθ cosθ)
    nodes: Vec<(Angle, f64)>,
    weight_sum: f64,
    theta_max_deg: f64,
}

impl DiffuseIntegrator {
    pub fn new(settings: &DiffuseSettings) -> Result<Self> {
        let theta_max_deg = settings.theta_max_deg;
        if !(theta_max_deg > 0.0 && theta_max_deg < 90.0) {
            return Err(AcousticError::invalid(
                "theta_max_deg",
                theta_max_deg,
                "must be in (0, 90)",
            ));
        }
        if settings.quadrature_order < crate::config::MIN_QUADRATURE_ORDER {
            return Err(AcousticError::invalid(
                "quadrature_order",
                settings.quadrature_order as f64,
                format!("must be at least {}", crate::config::MIN_QUADRATURE_ORDER),
            ));
        }

        Ok(Self::build(theta_max_deg, settings.quadrature_order))
    }

    fn build(theta_max_deg: f64, order: usize) -> Self {
        let half = theta_max_deg.to_radians() / 2.0;
        let nodes: Vec<(Angle, f64)> = gauss_legendre(order)
            .into_iter()
            .map(|(x, w)| {
                let angle = Angle::from_radians(half * (x + 1.0));
                (angle, w * half * angle.sin * angle.cos)
            })
            .collect();
        let weight_sum = nodes.iter().map(|(_, w)| w).sum();
        Self {
            nodes,
            weight_sum,
            theta_max_deg,
        }
    }

    pub fn theta_max_deg(&self) -> f64 {
        self.theta_max_deg
    }

    /// Quadrature nodes: incidence angle and normalised weight
    pub fn nodes(&self) -> impl Iterator<Item = (Angle, f64)> + '_ {
        self.nodes.iter().map(|(a, w)| (*a, w / self.weight_sum))
    }

    /// Weighted average of `alpha(θ)` over the quadrature nodes
    pub fn average<F>(&self, mut alpha: F) -> Result<f64>
    where
        F: FnMut(Angle) -> Result<f64>,
    {
        let mut total = 0.0;
        for (angle, weight) in &self.nodes {
            total += weight * alpha(*angle)?;
        }
        Ok(total / self.weight_sum)
    }

    /// Diffuse-field absorption curve of a chain
    ///
    /// Each α(θ) is clipped to [0, 1] before weighting. A frequency where
    /// any node had to be clipped is flagged on the curve even when the
    /// average itself lands inside the interval. Frequencies are evaluated
    /// in parallel.
    pub fn integrate(&self, chain: &LayerChain<'_>, axis: &FrequencyAxis) -> Result<AbsorptionCurve> {
        if chain.stack().is_empty() {
            return Ok(AbsorptionCurve::zeros(axis));
        }
        let averaged = axis
            .values()
            .par_iter()
            .map(|&f| {
                let mut node_clipped = false;
                let alpha = self.average(|angle| {
                    let (alpha, flagged) = clip_alpha(chain.absorption(f, angle)?);
                    node_clipped |= flagged;
                    Ok(alpha)
                })?;
                Ok((alpha, node_clipped))
            })
            .collect::<Result<Vec<(f64, bool)>>>()?;

        let flagged: Vec<usize> = averaged
            .iter()
            .enumerate()
            .filter_map(|(i, (_, clipped))| clipped.then_some(i))
            .collect();
        if !flagged.is_empty() {
            log::debug!("diffuse: α(θ) clipped at {} frequencies", flagged.len());
        }
        let raw = averaged.into_iter().map(|(alpha, _)| alpha).collect();
        Ok(AbsorptionCurve::from_raw(axis, raw).with_clipped(flagged))
    }
}

impl Default for DiffuseIntegrator {
    fn default() -> Self {
        let settings = DiffuseSettings::default();
        Self::build(settings.theta_max_deg, settings.quadrature_order)
    }
}
