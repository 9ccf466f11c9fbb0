//! Global search strategies
//!
//! The optimizer only needs "minimise this function inside these bounds with
//! at most this many evaluations". Strategies are interchangeable behind
//! [`GlobalStrategy`]; differential evolution is the default.

use crate::config::OptimizerSettings;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Objective passed to a strategy; lower is better
pub type SearchObjective<'a> = dyn Fn(&[f64]) -> f64 + Sync + 'a;

/// One evaluated parameter vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPoint {
    pub x: Vec<f64>,
    pub value: f64,
}

/// Derivative-free global minimiser
pub trait GlobalStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Minimise `objective` within `bounds`
    ///
    /// Returns the evaluated points ranked best first. The number of
    /// objective calls never exceeds `max_evaluations`.
    fn minimize(
        &self,
        objective: &SearchObjective<'_>,
        bounds: &[(f64, f64)],
        max_evaluations: usize,
    ) -> Vec<SearchPoint>;
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        f64::INFINITY
    } else {
        value
    }
}

fn rank(mut points: Vec<SearchPoint>) -> Vec<SearchPoint> {
    points.sort_by(|a, b| a.value.total_cmp(&b.value));
    points
}

fn random_point(rng: &mut StdRng, bounds: &[(f64, f64)]) -> Vec<f64> {
    bounds
        .iter()
        .map(|&(lo, hi)| lo + rng.gen::<f64>() * (hi - lo))
        .collect()
}

fn evaluate_all(objective: &SearchObjective<'_>, population: &[Vec<f64>]) -> Vec<f64> {
    population
        .par_iter()
        .map(|x| sanitize(objective(x)))
        .collect()
}

// ============================================================================
// Differential evolution
// ============================================================================

/// Differential evolution, rand/1/bin
///
/// The population is evaluated in parallel; random numbers are drawn on the
/// calling thread only, so a fixed seed gives identical results regardless
/// of thread count.
#[derive(Debug, Clone)]
pub struct DifferentialEvolution {
    pub population_size: usize,
    /// Differential weight F
    pub mutation: f64,
    /// Crossover probability CR
    pub crossover: f64,
    /// Stop when the score spread falls below `tolerance · (1 + |mean|)`
    pub tolerance: f64,
    pub seed: u64,
}

impl DifferentialEvolution {
    /// Smallest population rand/1 can draw three distinct donors from
    pub const MIN_POPULATION: usize = 4;

    pub fn new(settings: &OptimizerSettings) -> Self {
        Self {
            population_size: settings.population_size,
            mutation: settings.mutation,
            crossover: settings.crossover,
            tolerance: settings.tolerance,
            seed: settings.seed,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Three distinct population indices, all different from `target`
    fn donors(rng: &mut StdRng, size: usize, target: usize) -> [usize; 3] {
        let mut picked = [target; 3];
        for slot in 0..3 {
            loop {
                let candidate = rng.gen_range(0..size);
                if candidate != target && !picked[..slot].contains(&candidate) {
                    picked[slot] = candidate;
                    break;
                }
            }
        }
        picked
    }

    fn converged(&self, values: &[f64]) -> bool {
        if values.iter().any(|v| !v.is_finite()) {
            return false;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let spread = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        spread <= self.tolerance * (1.0 + mean.abs())
    }
}

impl Default for DifferentialEvolution {
    fn default() -> Self {
        Self::new(&OptimizerSettings::default())
    }
}

impl GlobalStrategy for DifferentialEvolution {
    fn name(&self) -> &str {
        "differential_evolution"
    }

    fn minimize(
        &self,
        objective: &SearchObjective<'_>,
        bounds: &[(f64, f64)],
        max_evaluations: usize,
    ) -> Vec<SearchPoint> {
        if max_evaluations == 0 {
            return Vec::new();
        }
        if bounds.is_empty() {
            return vec![SearchPoint {
                x: Vec::new(),
                value: sanitize(objective(&[])),
            }];
        }

        let bounds: Vec<(f64, f64)> = bounds.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();
        let dim = bounds.len();
        let size = self
            .population_size
            .max(Self::MIN_POPULATION)
            .min(max_evaluations);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut population: Vec<Vec<f64>> = (0..size).map(|_| random_point(&mut rng, &bounds)).collect();
        let mut values = evaluate_all(objective, &population);
        let mut history: Vec<SearchPoint> = population
            .iter()
            .zip(&values)
            .map(|(x, &value)| SearchPoint { x: x.clone(), value })
            .collect();
        let mut evaluations = size;
        let mut generation = 0usize;

        while size >= Self::MIN_POPULATION && evaluations + size <= max_evaluations {
            if self.converged(&values) {
                log::debug!("DE converged after {} generations", generation);
                break;
            }

            let trials: Vec<Vec<f64>> = (0..size)
                .map(|i| {
                    let [a, b, c] = Self::donors(&mut rng, size, i);
                    let forced = rng.gen_range(0..dim);
                    (0..dim)
                        .map(|j| {
                            if j == forced || rng.gen::<f64>() < self.crossover {
                                let (lo, hi) = bounds[j];
                                let mutant = population[a][j]
                                    + self.mutation * (population[b][j] - population[c][j]);
                                mutant.clamp(lo, hi)
                            } else {
                                population[i][j]
                            }
                        })
                        .collect()
                })
                .collect();

            let trial_values = evaluate_all(objective, &trials);
            evaluations += size;
            generation += 1;

            for (i, (trial, value)) in trials.into_iter().zip(trial_values).enumerate() {
                history.push(SearchPoint {
                    x: trial.clone(),
                    value,
                });
                if value <= values[i] {
                    population[i] = trial;
                    values[i] = value;
                }
            }
        }

        log::trace!(
            "DE finished: {} evaluations over {} generations",
            evaluations,
            generation
        );
        rank(history)
    }
}

// ============================================================================
// Random search
// ============================================================================

/// Uniform random sampling; a baseline strategy and a cheap smoke test
#[derive(Debug, Clone, Default)]
pub struct RandomSearch {
    pub seed: u64,
}

impl GlobalStrategy for RandomSearch {
    fn name(&self) -> &str {
        "random_search"
    }

    fn minimize(
        &self,
        objective: &SearchObjective<'_>,
        bounds: &[(f64, f64)],
        max_evaluations: usize,
    ) -> Vec<SearchPoint> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let samples: Vec<Vec<f64>> = (0..max_evaluations)
            .map(|_| random_point(&mut rng, bounds))
            .collect();
        let values = evaluate_all(objective, &samples);
        rank(
            samples
                .into_iter()
                .zip(values)
                .map(|(x, value)| SearchPoint { x, value })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| (v - 0.3).powi(2)).sum()
    }

    #[test]
    fn test_de_finds_minimum() {
        let de = DifferentialEvolution {
            tolerance: 0.0,
            ..Default::default()
        };
        let bounds = [(-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0)];
        let points = de.minimize(&sphere, &bounds, 3000);
        let best = &points[0];
        assert!(best.value < 1e-4, "best = {:?}", best);
        assert!(points.windows(2).all(|w| w[0].value <= w[1].value));
    }

    #[test]
    fn test_de_respects_budget_and_bounds() {
        let calls = AtomicUsize::new(0);
        let counted = |x: &[f64]| {
            calls.fetch_add(1, Ordering::Relaxed);
            sphere(x)
        };
        let bounds = [(0.5, 2.0), (1.0, 1.5)];
        let points = DifferentialEvolution::default().minimize(&counted, &bounds, 100);
        assert!(calls.load(Ordering::Relaxed) <= 100);
        assert_eq!(points.len(), calls.load(Ordering::Relaxed));
        for p in &points {
            assert!((0.5..=2.0).contains(&p.x[0]));
            assert!((1.0..=1.5).contains(&p.x[1]));
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let bounds = [(-2.0, 2.0), (-2.0, 2.0)];
        let a = DifferentialEvolution::default().minimize(&sphere, &bounds, 500);
        let b = DifferentialEvolution::default().minimize(&sphere, &bounds, 500);
        assert_eq!(a, b);
        let c = DifferentialEvolution::default()
            .with_seed(7)
            .minimize(&sphere, &bounds, 500);
        assert_ne!(a[0].x, c[0].x);
    }

    #[test]
    fn test_nan_objective_ranks_last() {
        let bounds = [(0.0, 1.0)];
        let objective = |x: &[f64]| if x[0] < 0.5 { f64::NAN } else { x[0] };
        let points = RandomSearch { seed: 3 }.minimize(&objective, &bounds, 50);
        assert_eq!(points.len(), 50);
        assert!(points[0].value.is_finite());
        assert!(points.last().unwrap().value.is_infinite());
    }

    #[test]
    fn test_no_free_parameters() {
        let points = DifferentialEvolution::default().minimize(&|_: &[f64]| 1.5, &[], 10);
        assert_eq!(points, vec![SearchPoint { x: vec![], value: 1.5 }]);
    }
}
