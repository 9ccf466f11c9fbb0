//! Acoustica - Layered Acoustic Absorber Engine
//!
//! Acoustica computes the sound absorption of layered treatments in front
//! of a rigid wall and searches for layer configurations that meet a
//! frequency goal within a depth budget.
//!
//! # Architecture
//!
//! Data flows leaves-first:
//! - Layer models: porous, air gap, perforated / slotted / micro-perforated
//!   panels, membranes and Helmholtz resonators
//! - Transfer-matrix engine: per-layer 2×2 matrices chained to a surface
//!   impedance and an absorption curve
//! - Diffuse-field integrator: Paris-weighted Gauss-Legendre quadrature
//! - Metrics: NRC, SAA and octave-band summary
//! - Optimizer: pluggable global search over stack templates, plus room modes
//!
//! Every computation is pure; engines and inputs are `Send + Sync`.
//!
//! # Example
//!
//! ```
//! use acoustica::{evaluate, FrequencyAxis, Incidence, LayerSpec, PorousModel, Stack};
//!
//! let stack = Stack::new(vec![
//!     LayerSpec::porous(13_000.0, 50.0, PorousModel::Miki),
//!     LayerSpec::air(100.0),
//! ]);
//! let axis = FrequencyAxis::third_octave(100.0, 5000.0)?;
//! let result = evaluate(&stack, &axis, Incidence::Normal)?;
//! assert!(result.metrics.nrc > 0.5);
//! # Ok::<(), acoustica::AcousticError>(())
//! ```

pub mod config;
pub mod diagnostics;
pub mod diffuse;
pub mod error;
pub mod evaluate;
pub mod frequency;
pub mod metrics;
pub mod models;
pub mod optimize;
pub mod tmm;

pub use config::{AirProperties, DiffuseSettings, EngineConfig, OptimizerSettings};
pub use diagnostics::{Confidence, Diagnostics, ModelWarning};
pub use error::{AcousticError, Result};
pub use evaluate::{evaluate, optimize, AbsorberEngine, Evaluation, Incidence};
pub use frequency::FrequencyAxis;
pub use metrics::Metrics;
pub use models::{
    HelmholtzResonator, HelmholtzResponse, JcaParameters, MaterialEntry, MaterialTable, PanelKind,
    PorousModel,
};
pub use optimize::{
    room_modes, BroadbandMetric, Candidate, DesignApproach, DifferentialEvolution, GlobalStrategy,
    ModeIndex, ModeKind, Objective, OptimizationResult, OptimizationStatus, OptimizeRequest,
    RoomMode, StackTemplate, TemplateSlot,
};
pub use tmm::{AbsorptionCurve, LayerSpec, Stack};
