//! Absorber optimizer
//!
//! Searches the continuous parameters of one or more [`StackTemplate`]s for
//! the design that best meets an [`Objective`] inside a depth budget. The
//! budget is a penalty, not a hard filter, so the search can cross
//! infeasible regions:
//!
//! ```text
//! score = objective − w · max(0, depth − budget) / budget
//! ```
//!
//! Only candidates that fit the budget are reported. Each candidate
//! evaluation is a pure call into the transfer-matrix engine, so a strategy
//! may evaluate a whole population in parallel.

mod room;
mod strategy;
mod template;

pub use room::{
    modes_near, room_mode_objectives, room_modes, room_modes_with, schroeder_frequency,
    DesignApproach, ModeIndex, ModeKind, RoomMode, DEFAULT_RT60_S, DEGENERACY_TOLERANCE,
    MAX_NEAR_MODES, NEAR_MODE_FRACTION,
};
pub use strategy::{
    DifferentialEvolution, GlobalStrategy, RandomSearch, SearchObjective, SearchPoint,
};
pub use template::{StackTemplate, TemplateSlot, DEFAULT_SIGMA_RANGE, MIN_AIR_GAP_MM};

use crate::error::{AcousticError, Result};
use crate::evaluate::{AbsorberEngine, Evaluation, Incidence};
use crate::frequency::FrequencyAxis;
use crate::metrics::{self, Metrics};
use crate::tmm::{AbsorptionCurve, Stack};
use serde::{Deserialize, Serialize};

/// Objective score of a bare rigid wall
pub const BASELINE_SCORE: f64 = 0.0;

/// Smallest gain over the baseline that counts as an improvement
pub const IMPROVEMENT_THRESHOLD: f64 = 1e-3;

/// Default evaluation budget per template
pub const DEFAULT_MAX_EVALUATIONS: usize = 1500;

/// Two designs closer than this fraction of every parameter range are the same
const DISTINCT_FRACTION: f64 = 0.02;

/// Slack on the depth check for rounding (mm)
const DEPTH_TOLERANCE_MM: f64 = 1e-9;

// ============================================================================
// Request
// ============================================================================

/// Broadband single-number rating to maximise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadbandMetric {
    Nrc,
    Saa,
}

/// What the optimizer maximises
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Absorption at one frequency (Hz)
    TargetFrequency(f64),
    Broadband(BroadbandMetric),
}

impl Objective {
    pub fn validate(&self) -> Result<()> {
        match self {
            Objective::TargetFrequency(hz) if !(hz.is_finite() && *hz > 0.0) => Err(
                AcousticError::invalid("target_frequency", *hz, "must be positive and finite"),
            ),
            _ => Ok(()),
        }
    }

    /// Objective value of a curve; higher is better
    pub fn value(&self, curve: &AbsorptionCurve) -> f64 {
        match self {
            Objective::TargetFrequency(hz) => curve.at(*hz),
            Objective::Broadband(BroadbandMetric::Nrc) => metrics::nrc(curve),
            Objective::Broadband(BroadbandMetric::Saa) => metrics::saa(curve),
        }
    }

    /// `axis`, with the target frequency inserted when it is missing
    pub fn axis_for(&self, axis: &FrequencyAxis) -> Result<FrequencyAxis> {
        let Objective::TargetFrequency(hz) = *self else {
            return Ok(axis.clone());
        };
        let values = axis.values();
        let position = values.partition_point(|f| *f < hz);
        if values.get(position) == Some(&hz) {
            return Ok(axis.clone());
        }
        let mut extended = values.to_vec();
        extended.insert(position, hz);
        FrequencyAxis::from_values(extended)
    }
}

fn default_max_evaluations() -> usize {
    DEFAULT_MAX_EVALUATIONS
}

/// Structured optimisation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub objective: Objective,
    /// Total depth available in front of the wall (mm)
    pub depth_budget_mm: f64,
    /// Layer combinations to search; [`StackTemplate::defaults`] when empty
    #[serde(default)]
    pub templates: Vec<StackTemplate>,
    #[serde(default)]
    pub frequency_axis: FrequencyAxis,
    #[serde(default)]
    pub incidence: Incidence,
    /// Objective evaluations allowed per template
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: usize,
}

impl OptimizeRequest {
    pub fn new(objective: Objective, depth_budget_mm: f64) -> Self {
        Self {
            objective,
            depth_budget_mm,
            templates: Vec::new(),
            frequency_axis: FrequencyAxis::default(),
            incidence: Incidence::Normal,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }

    pub fn with_templates(mut self, templates: Vec<StackTemplate>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_frequency_axis(mut self, axis: FrequencyAxis) -> Self {
        self.frequency_axis = axis;
        self
    }

    pub fn with_incidence(mut self, incidence: Incidence) -> Self {
        self.incidence = incidence;
        self
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let budget = self.depth_budget_mm;
        if !(budget.is_finite() && budget > 0.0) {
            return Err(AcousticError::InvalidRequest {
                reason: format!("depth_budget_mm must be positive and finite (got {budget})"),
            });
        }
        if self.max_evaluations == 0 {
            return Err(AcousticError::InvalidRequest {
                reason: "max_evaluations must be at least 1".to_string(),
            });
        }
        self.objective.validate()?;
        for template in &self.templates {
            template.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// Result
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStatus {
    /// At least one design within the budget beats a bare wall
    Improved,
    /// Nothing within the budget beats a bare wall; relax the constraints
    NoFeasibleImprovement,
}

/// One ranked design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Name of the template the design came from
    pub template: String,
    pub stack: Stack,
    /// Objective value; no penalty applies within the budget
    pub score: f64,
    pub depth_mm: f64,
    pub evaluation: Evaluation,
}

impl Candidate {
    pub fn curve(&self) -> &AbsorptionCurve {
        &self.evaluation.curve
    }

    pub fn metrics(&self) -> &Metrics {
        &self.evaluation.metrics
    }
}

/// Outcome of one optimisation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub status: OptimizationStatus,
    pub objective: Objective,
    pub depth_budget_mm: f64,
    pub baseline_score: f64,
    /// Distinct designs within the budget, best first
    pub candidates: Vec<Candidate>,
    /// Templates that cannot fit the budget even at minimum thickness
    pub skipped_templates: Vec<String>,
    pub strategy: String,
    pub evaluations: usize,
}

impl OptimizationResult {
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn is_improved(&self) -> bool {
        self.status == OptimizationStatus::Improved
    }
}

// ============================================================================
// Search
// ============================================================================

/// Objective minus the normalised depth-budget violation
pub fn penalized_score(objective_value: f64, depth_mm: f64, budget_mm: f64, weight: f64) -> f64 {
    objective_value - weight * (depth_mm - budget_mm).max(0.0) / budget_mm
}

struct Found {
    template: usize,
    x: Vec<f64>,
    score: f64,
    depth_mm: f64,
    stack: Stack,
}

fn same_design(a: &[f64], b: &[f64], bounds: &[(f64, f64)]) -> bool {
    a.iter().zip(b).zip(bounds).all(|((x, y), (lo, hi))| {
        let span = (hi - lo).abs();
        let diff = (x - y).abs();
        if span > 0.0 {
            diff <= DISTINCT_FRACTION * span
        } else {
            diff == 0.0
        }
    })
}

/// Run `request` on `engine` with `strategy`
pub(crate) fn run(
    engine: &AbsorberEngine,
    request: &OptimizeRequest,
    strategy: &dyn GlobalStrategy,
) -> Result<OptimizationResult> {
    request.validate()?;
    let settings = engine.config().optimizer;
    let axis = request.objective.axis_for(&request.frequency_axis)?;
    let budget = request.depth_budget_mm;
    let templates = if request.templates.is_empty() {
        StackTemplate::defaults()
    } else {
        request.templates.clone()
    };

    log::info!(
        "Optimising {:?} within {} mm over {} templates ({})",
        request.objective,
        budget,
        templates.len(),
        strategy.name()
    );

    let mut found: Vec<Found> = Vec::new();
    let mut template_bounds: Vec<Vec<(f64, f64)>> = Vec::with_capacity(templates.len());
    let mut skipped_templates = Vec::new();
    let mut evaluations = 0;

    for (index, template) in templates.iter().enumerate() {
        let min_depth = template.min_depth_mm(settings.min_layer_thickness_mm);
        let bounds = template.bounds(budget, settings.min_layer_thickness_mm);
        if min_depth > budget {
            log::info!(
                "Template '{}' needs at least {} mm; skipped",
                template.name,
                min_depth
            );
            skipped_templates.push(template.name.clone());
            template_bounds.push(bounds);
            continue;
        }

        let objective = |x: &[f64]| -> f64 {
            let stack = template.build(x);
            match engine.curve(&stack, &axis, request.incidence) {
                Ok(curve) => -penalized_score(
                    request.objective.value(&curve),
                    stack.total_depth_mm(),
                    budget,
                    settings.penalty_weight,
                ),
                Err(err) => {
                    log::trace!("candidate rejected: {}", err);
                    f64::INFINITY
                }
            }
        };
        let points = strategy.minimize(&objective, &bounds, request.max_evaluations);
        evaluations += points.len();

        for point in points {
            if !point.value.is_finite() {
                continue;
            }
            let stack = template.build(&point.x);
            let depth_mm = stack.total_depth_mm();
            if depth_mm > budget + DEPTH_TOLERANCE_MM {
                continue;
            }
            found.push(Found {
                template: index,
                x: point.x,
                score: -point.value,
                depth_mm,
                stack,
            });
        }
        template_bounds.push(bounds);
    }

    found.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut selected: Vec<Found> = Vec::new();
    for design in found {
        if design.score <= BASELINE_SCORE + IMPROVEMENT_THRESHOLD || selected.len() == settings.top_n {
            break;
        }
        let duplicate = selected.iter().any(|s| {
            s.template == design.template
                && same_design(&s.x, &design.x, &template_bounds[design.template])
        });
        if !duplicate {
            selected.push(design);
        }
    }

    let candidates = selected
        .into_iter()
        .map(|design| {
            let evaluation = engine.evaluate(&design.stack, &axis, request.incidence)?;
            Ok(Candidate {
                template: templates[design.template].name.clone(),
                stack: design.stack,
                score: design.score,
                depth_mm: design.depth_mm,
                evaluation,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let status = if candidates.is_empty() {
        log::warn!("No design within {} mm improves on a bare wall", budget);
        OptimizationStatus::NoFeasibleImprovement
    } else {
        OptimizationStatus::Improved
    };

    Ok(OptimizationResult {
        status,
        objective: request.objective,
        depth_budget_mm: budget,
        baseline_score: BASELINE_SCORE,
        candidates,
        skipped_templates,
        strategy: strategy.name().to_string(),
        evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_only_beyond_budget() {
        assert_eq!(penalized_score(0.8, 90.0, 100.0, 10.0), 0.8);
        let over = penalized_score(0.8, 110.0, 100.0, 10.0);
        assert!((over - (0.8 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_target_inserted_into_axis() {
        let axis = FrequencyAxis::from_values(vec![100.0, 200.0, 400.0]).unwrap();
        let extended = Objective::TargetFrequency(150.0).axis_for(&axis).unwrap();
        assert_eq!(extended.values(), &[100.0, 150.0, 200.0, 400.0]);
        let same = Objective::TargetFrequency(200.0).axis_for(&axis).unwrap();
        assert_eq!(same.len(), 3);
        let broadband = Objective::Broadband(BroadbandMetric::Nrc).axis_for(&axis).unwrap();
        assert_eq!(broadband, axis);
    }

    #[test]
    fn test_request_validation() {
        let objective = Objective::TargetFrequency(250.0);
        assert!(OptimizeRequest::new(objective, 0.0).validate().is_err());
        assert!(OptimizeRequest::new(objective, f64::NAN).validate().is_err());
        assert!(OptimizeRequest::new(objective, 100.0)
            .with_max_evaluations(0)
            .validate()
            .is_err());
        assert!(OptimizeRequest::new(Objective::TargetFrequency(-5.0), 100.0)
            .validate()
            .is_err());
        assert!(OptimizeRequest::new(objective, 100.0).validate().is_ok());
    }

    #[test]
    fn test_request_from_json() {
        let request: OptimizeRequest = serde_json::from_str(
            r#"{"objective": {"broadband": "nrc"}, "depth_budget_mm": 120}"#,
        )
        .unwrap();
        assert_eq!(request.objective, Objective::Broadband(BroadbandMetric::Nrc));
        assert_eq!(request.max_evaluations, DEFAULT_MAX_EVALUATIONS);
        assert!(request.templates.is_empty());
    }

    #[test]
    fn test_same_design_tolerance() {
        let bounds = [(0.0, 100.0), (3.0, 5.0)];
        assert!(same_design(&[50.0, 4.0], &[51.0, 4.01], &bounds));
        assert!(!same_design(&[50.0, 4.0], &[55.0, 4.0], &bounds));
    }
}
