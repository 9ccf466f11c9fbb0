//! Engine configuration
//!
//! Air properties, diffuse-field integration settings and optimizer settings.
//! Every field has a default so a partial JSON document is a valid config.

use crate::error::{AcousticError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Constants
// ============================================================================

/// Standard diffuse-field integration cutoff (degrees)
pub const DEFAULT_THETA_MAX_DEG: f64 = 78.0;

/// Lowest Gauss-Legendre order accepted for diffuse-field integration
pub const MIN_QUADRATURE_ORDER: usize = 10;

// ============================================================================
// Air
// ============================================================================

/// Properties of air at 20 °C and 101.325 kPa
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirProperties {
    /// Density (kg/m³)
    pub density: f64,
    /// Speed of sound (m/s)
    pub speed_of_sound: f64,
    /// Dynamic viscosity (Pa·s)
    pub viscosity: f64,
    /// Ratio of specific heats
    pub gamma: f64,
    /// Static pressure (Pa)
    pub static_pressure: f64,
    /// Thermal conductivity (W/(m·K))
    pub thermal_conductivity: f64,
    /// Specific heat at constant pressure (J/(kg·K))
    pub specific_heat: f64,
}

impl Default for AirProperties {
    fn default() -> Self {
        Self {
            density: 1.204,
            speed_of_sound: 343.0,
            viscosity: 1.81e-5,
            gamma: 1.4,
            static_pressure: 101_325.0,
            thermal_conductivity: 0.0257,
            specific_heat: 1005.0,
        }
    }
}

impl AirProperties {
    /// Characteristic impedance ρ₀c₀ (Pa·s/m)
    pub fn impedance(&self) -> f64 {
        self.density * self.speed_of_sound
    }

    /// Prandtl number
    pub fn prandtl(&self) -> f64 {
        self.viscosity * self.specific_heat / self.thermal_conductivity
    }

    /// Free-space wavenumber at `frequency` Hz
    pub fn wavenumber(&self, frequency: f64) -> f64 {
        std::f64::consts::TAU * frequency / self.speed_of_sound
    }

    /// Wavelength at `frequency` Hz
    pub fn wavelength(&self, frequency: f64) -> f64 {
        self.speed_of_sound / frequency
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("air.density", self.density),
            ("air.speed_of_sound", self.speed_of_sound),
            ("air.viscosity", self.viscosity),
            ("air.gamma", self.gamma),
            ("air.static_pressure", self.static_pressure),
            ("air.thermal_conductivity", self.thermal_conductivity),
            ("air.specific_heat", self.specific_heat),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(AcousticError::InvalidConfig {
                    reason: format!("{name} must be positive (got {value})"),
                });
            }
        }
        if self.gamma <= 1.0 {
            return Err(AcousticError::InvalidConfig {
                reason: format!("air.gamma must exceed 1 (got {})", self.gamma),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Diffuse field
// ============================================================================

/// Random-incidence integration settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffuseSettings {
    /// Upper integration angle (degrees)
    pub theta_max_deg: f64,
    /// Gauss-Legendre order
    pub quadrature_order: usize,
}

impl Default for DiffuseSettings {
    fn default() -> Self {
        Self {
            theta_max_deg: DEFAULT_THETA_MAX_DEG,
            quadrature_order: MIN_QUADRATURE_ORDER,
        }
    }
}

// ============================================================================
// Optimizer
// ============================================================================

/// Differential-evolution and ranking settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Members per generation (raised to at least 4 internally)
    pub population_size: usize,
    /// Differential weight F
    pub mutation: f64,
    /// Crossover probability CR
    pub crossover: f64,
    /// Relative spread of population scores at which the search stops early
    pub tolerance: f64,
    /// Weight of the depth-budget violation penalty
    pub penalty_weight: f64,
    /// Number of ranked candidates returned
    pub top_n: usize,
    /// RNG seed; identical seeds give identical results
    pub seed: u64,
    /// Thinnest layer the search may propose (mm)
    pub min_layer_thickness_mm: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            population_size: 15,
            mutation: 0.7,
            crossover: 0.9,
            tolerance: 1e-4,
            penalty_weight: 10.0,
            top_n: 3,
            seed: 42,
            min_layer_thickness_mm: 5.0,
        }
    }
}

// ============================================================================
// Engine config
// ============================================================================

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub air: AirProperties,
    pub diffuse: DiffuseSettings,
    pub optimizer: OptimizerSettings,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading engine config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every setting against its admissible range
    pub fn validate(&self) -> Result<()> {
        self.air.validate()?;

        let theta = self.diffuse.theta_max_deg;
        if !(theta > 0.0 && theta < 90.0) {
            return Err(AcousticError::InvalidConfig {
                reason: format!("diffuse.theta_max_deg must be in (0, 90) (got {theta})"),
            });
        }
        if self.diffuse.quadrature_order < MIN_QUADRATURE_ORDER {
            return Err(AcousticError::InvalidConfig {
                reason: format!(
                    "diffuse.quadrature_order must be at least {} (got {})",
                    MIN_QUADRATURE_ORDER, self.diffuse.quadrature_order
                ),
            });
        }

        let opt = &self.optimizer;
        if !(opt.mutation > 0.0 && opt.mutation <= 2.0) {
            return Err(AcousticError::InvalidConfig {
                reason: format!("optimizer.mutation must be in (0, 2] (got {})", opt.mutation),
            });
        }
        if !(0.0..=1.0).contains(&opt.crossover) {
            return Err(AcousticError::InvalidConfig {
                reason: format!("optimizer.crossover must be in [0, 1] (got {})", opt.crossover),
            });
        }
        if opt.top_n == 0 {
            return Err(AcousticError::InvalidConfig {
                reason: "optimizer.top_n must be at least 1".to_string(),
            });
        }
        if !(opt.penalty_weight >= 0.0 && opt.tolerance >= 0.0) {
            return Err(AcousticError::InvalidConfig {
                reason: "optimizer.penalty_weight and optimizer.tolerance must be non-negative"
                    .to_string(),
            });
        }
        if !(opt.min_layer_thickness_mm > 0.0) {
            return Err(AcousticError::InvalidConfig {
                reason: "optimizer.min_layer_thickness_mm must be positive".to_string(),
            });
        }
        Ok(())
    }
}
