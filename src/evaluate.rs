//! Engine entry points
//!
//! [`AbsorberEngine`] bundles a validated configuration with the
//! precomputed diffuse-field quadrature and exposes one call per use case.
//! The free functions at the bottom use the default configuration.

use crate::config::{AirProperties, EngineConfig};
use crate::diagnostics::{Confidence, Diagnostics};
use crate::diffuse::DiffuseIntegrator;
use crate::error::Result;
use crate::frequency::FrequencyAxis;
use crate::metrics::Metrics;
use crate::models::{HelmholtzResonator, HelmholtzResponse};
use crate::optimize::{
    self, DifferentialEvolution, GlobalStrategy, OptimizationResult, OptimizeRequest, RoomMode,
};
use crate::tmm::{AbsorptionCurve, LayerChain, Stack};
use serde::{Deserialize, Serialize};

/// Sound-field assumption for an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Incidence {
    /// Plane wave at normal incidence
    #[default]
    Normal,
    /// Random incidence, Paris-weighted up to the configured cut-off angle
    Diffuse,
}

/// Curve, ratings and confidence annotations for one stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub incidence: Incidence,
    pub curve: AbsorptionCurve,
    pub metrics: Metrics,
    pub diagnostics: Diagnostics,
}

impl Evaluation {
    pub fn confidence(&self) -> Confidence {
        self.diagnostics.confidence()
    }

    /// Serialize for the surrounding service layer
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Absorption engine with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct AbsorberEngine {
    config: EngineConfig,
    diffuse: DiffuseIntegrator,
}

impl AbsorberEngine {
    /// Validate `config` and precompute the diffuse-field quadrature
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let diffuse = DiffuseIntegrator::new(&config.diffuse)?;
        log::debug!(
            "Engine ready: θmax {}°, quadrature order {}",
            config.diffuse.theta_max_deg,
            config.diffuse.quadrature_order
        );
        Ok(Self { config, diffuse })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn air(&self) -> &AirProperties {
        &self.config.air
    }

    /// Absorption curve only, without range diagnostics
    pub fn curve(
        &self,
        stack: &Stack,
        axis: &FrequencyAxis,
        incidence: Incidence,
    ) -> Result<AbsorptionCurve> {
        let (chain, _) = LayerChain::new(stack, &self.config.air)?;
        match incidence {
            Incidence::Normal => chain.normal_incidence(axis),
            Incidence::Diffuse => self.diffuse.integrate(&chain, axis),
        }
    }

    /// Absorption curve, metrics and diagnostics of `stack`
    ///
    /// # Arguments
    /// * `stack` - Layers from the exposed face to the rigid wall
    /// * `axis` - Frequencies to evaluate
    /// * `incidence` - Normal or diffuse sound field
    pub fn evaluate(
        &self,
        stack: &Stack,
        axis: &FrequencyAxis,
        incidence: Incidence,
    ) -> Result<Evaluation> {
        let (chain, mut diagnostics) = LayerChain::new(stack, &self.config.air)?;
        diagnostics.extend(chain.range_warnings(axis)?);

        let curve = match incidence {
            Incidence::Normal => chain.normal_incidence(axis)?,
            Incidence::Diffuse => self.diffuse.integrate(&chain, axis)?,
        };
        if let Some(warning) = curve.clipping_warning() {
            diagnostics.push(warning);
        }
        let metrics = Metrics::from_curve(&curve);

        log::debug!(
            "Evaluated {} layers ({:?}): NRC {:.3}, peak {:.2} at {:.0} Hz",
            stack.len(),
            incidence,
            metrics.nrc,
            metrics.peak_alpha,
            metrics.peak_frequency_hz
        );

        Ok(Evaluation {
            incidence,
            curve,
            metrics,
            diagnostics,
        })
    }

    /// Search with the configured differential evolution
    pub fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizationResult> {
        let strategy = DifferentialEvolution::new(&self.config.optimizer);
        self.optimize_with(request, &strategy)
    }

    /// Search with a caller-supplied strategy
    pub fn optimize_with(
        &self,
        request: &OptimizeRequest,
        strategy: &dyn GlobalStrategy,
    ) -> Result<OptimizationResult> {
        optimize::run(self, request, strategy)
    }

    /// Resonance and absorption area of a single Helmholtz resonator
    pub fn helmholtz(
        &self,
        resonator: &HelmholtzResonator,
        axis: &FrequencyAxis,
    ) -> Result<HelmholtzResponse> {
        resonator.analyze(axis, &self.config.air)
    }

    /// Room modes using the configured speed of sound
    pub fn room_modes(&self, lx: f64, ly: f64, lz: f64, max_order: u32) -> Result<Vec<RoomMode>> {
        optimize::room_modes_with(lx, ly, lz, max_order, &self.config.air)
    }
}

// ============================================================================
// Default-configuration shortcuts
// ============================================================================

/// Evaluate `stack` with the default configuration
pub fn evaluate(stack: &Stack, axis: &FrequencyAxis, incidence: Incidence) -> Result<Evaluation> {
    AbsorberEngine::default().evaluate(stack, axis, incidence)
}

/// Optimise with the default configuration and strategy
pub fn optimize(request: &OptimizeRequest) -> Result<OptimizationResult> {
    AbsorberEngine::default().optimize(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PorousModel;
    use crate::tmm::LayerSpec;

    #[test]
    fn test_evaluation_flags_out_of_range() {
        // σ = 500 puts X above 1 from ~415 Hz
        let stack = Stack::new(vec![LayerSpec::porous(500.0, 50.0, PorousModel::Miki)]);
        let evaluation = evaluate(&stack, &FrequencyAxis::default(), Incidence::Normal).unwrap();
        assert_eq!(evaluation.confidence(), Confidence::Low);
        assert!(evaluation.diagnostics.has("OUT_OF_MODEL_RANGE"));
        assert!(evaluation.diagnostics.has("PARAMETER_OUTSIDE_RANGE"));
        assert!(evaluation
            .curve
            .values()
            .iter()
            .all(|a| (0.0..=1.0).contains(a)));
    }

    #[test]
    fn test_nominal_confidence_in_range() {
        let stack = Stack::new(vec![LayerSpec::porous(13000.0, 50.0, PorousModel::Miki)]);
        let axis = FrequencyAxis::third_octave(125.0, 4000.0).unwrap();
        let evaluation = evaluate(&stack, &axis, Incidence::Normal).unwrap();
        assert_eq!(evaluation.confidence(), Confidence::Nominal);
        assert!(evaluation.metrics.nrc > 0.5);
    }

    #[test]
    fn test_diffuse_differs_from_normal() {
        let stack = Stack::new(vec![
            LayerSpec::porous(13000.0, 50.0, PorousModel::Miki),
            LayerSpec::air(50.0),
        ]);
        let axis = FrequencyAxis::third_octave(100.0, 2000.0).unwrap();
        let normal = evaluate(&stack, &axis, Incidence::Normal).unwrap();
        let diffuse = evaluate(&stack, &axis, Incidence::Diffuse).unwrap();
        assert_eq!(diffuse.incidence, Incidence::Diffuse);
        assert_ne!(normal.curve.values(), diffuse.curve.values());
    }

    #[test]
    fn test_invalid_layer_is_an_error() {
        let stack = Stack::new(vec![LayerSpec::air(-10.0)]);
        let err = evaluate(&stack, &FrequencyAxis::default(), Incidence::Normal).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_LAYER");
    }

    #[test]
    fn test_json_export() {
        let stack = Stack::new(vec![LayerSpec::porous(13000.0, 50.0, PorousModel::Miki)]);
        let axis = FrequencyAxis::from_values(vec![250.0, 500.0, 1000.0, 2000.0]).unwrap();
        let evaluation = evaluate(&stack, &axis, Incidence::Normal).unwrap();
        let json = evaluation.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["incidence"], "normal");
        assert_eq!(value["curve"]["values"].as_array().unwrap().len(), 4);
        assert!(value["metrics"]["octave_bands"]["500"].is_number());
    }
}
