//! Limp membrane and panel absorbers
//!
//! A limp membrane is a mass-law sheet: purely reactive impedance jωm.
//! Backed by an air cavity it forms a mass-spring panel absorber.
//!
//! References: Kuttruff, Room Acoustics (2009), Ch. 6.4

use super::{mm_to_m, require_frequency, require_positive};
use crate::config::AirProperties;
use crate::error::Result;
use num_complex::Complex64;
use std::f64::consts::TAU;

/// Mass-law impedance of a limp membrane
///
/// # Arguments
/// * `frequency` - Frequency (Hz)
/// * `mass_per_area` - Surface mass density (kg/m²)
pub fn membrane_impedance(frequency: f64, mass_per_area: f64) -> Result<Complex64> {
    require_frequency(frequency)?;
    require_positive("mass_per_area", mass_per_area)?;
    Ok(Complex64::new(0.0, TAU * frequency * mass_per_area))
}

/// Resonance of a membrane in front of an air cavity
///
/// `f₀ = c₀/(2π) · √(ρ₀ / (m·d))`
///
/// # Arguments
/// * `mass_per_area` - Surface mass density (kg/m²)
/// * `cavity_depth_mm` - Air cavity depth behind the membrane (mm)
pub fn panel_resonance(mass_per_area: f64, cavity_depth_mm: f64, air: &AirProperties) -> Result<f64> {
    require_positive("mass_per_area", mass_per_area)?;
    require_positive("cavity_depth_mm", cavity_depth_mm)?;
    let d = mm_to_m(cavity_depth_mm);
    Ok(air.speed_of_sound / TAU * (air.density / (mass_per_area * d)).sqrt())
}
