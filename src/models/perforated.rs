//! Perforated, slotted and micro-perforated panels
//!
//! Each sub-model returns the complex specific impedance of the panel,
//! inserted into the chain as a zero-thickness sheet.
//!
//! References:
//! - Ingard, JASA 25(6) (1953)
//! - Kristiansen & Vigran, Applied Acoustics 43 (1994)
//! - Maa, JASA 104(5) (1998)

use super::{mm_to_m, require_frequency, require_positive};
use crate::config::AirProperties;
use crate::error::{AcousticError, Result};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2, TAU};

/// Flanged end correction per opening, as a fraction of the opening radius
const END_CORRECTION: f64 = 0.85;

/// Macro-perforation models assume holes larger than this (mm)
pub const MACRO_MIN_HOLE_MM: f64 = 1.0;

/// Micro-perforation models assume holes smaller than this (mm)
pub const MICRO_MAX_HOLE_MM: f64 = 1.0;

/// Panel sub-model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    /// Round holes on a square grid (Ingard)
    #[default]
    Ingard,
    /// Parallel slots; `hole_diameter` is the slot width (Kristiansen-Vigran)
    Slotted,
    /// Sub-millimetre holes (Maa)
    Mpp,
}

impl PanelKind {
    pub fn name(&self) -> &'static str {
        match self {
            PanelKind::Ingard => "ingard",
            PanelKind::Slotted => "slotted",
            PanelKind::Mpp => "mpp",
        }
    }

    /// Whether the opening size suits the sub-model
    pub fn hole_in_range(&self, hole_diameter_mm: f64) -> bool {
        match self {
            PanelKind::Ingard => hole_diameter_mm > MACRO_MIN_HOLE_MM,
            PanelKind::Slotted => true,
            PanelKind::Mpp => hole_diameter_mm < MICRO_MAX_HOLE_MM,
        }
    }
}

fn check_geometry(opening_mm: f64, spacing_mm: f64) -> Result<()> {
    require_positive("hole_diameter_mm", opening_mm)?;
    require_positive("hole_spacing_mm", spacing_mm)?;
    if opening_mm >= spacing_mm {
        return Err(AcousticError::invalid(
            "hole_diameter_mm",
            opening_mm,
            format!("must be less than hole spacing ({spacing_mm} mm)"),
        ));
    }
    Ok(())
}

/// Open-area ratio of round holes on a square grid
pub fn hole_porosity(hole_diameter_mm: f64, spacing_mm: f64) -> Result<f64> {
    check_geometry(hole_diameter_mm, spacing_mm)?;
    let r = hole_diameter_mm / 2.0;
    Ok(PI * r * r / (spacing_mm * spacing_mm))
}

/// Open-area ratio of parallel slots
pub fn slot_porosity(slot_width_mm: f64, spacing_mm: f64) -> Result<f64> {
    check_geometry(slot_width_mm, spacing_mm)?;
    Ok(slot_width_mm / spacing_mm)
}

/// Viscous boundary-layer thickness (m)
#[inline]
fn viscous_boundary_layer(omega: f64, air: &AirProperties) -> f64 {
    (2.0 * air.viscosity / (air.density * omega)).sqrt()
}

/// Macro-perforated panel (Ingard 1953)
///
/// # Arguments
/// * `frequency` - Frequency (Hz)
/// * `panel_thickness_mm` - Panel thickness (mm)
/// * `hole_diameter_mm` - Hole diameter (mm)
/// * `hole_spacing_mm` - Centre-to-centre spacing (mm)
pub fn ingard_impedance(
    frequency: f64,
    panel_thickness_mm: f64,
    hole_diameter_mm: f64,
    hole_spacing_mm: f64,
    air: &AirProperties,
) -> Result<Complex64> {
    require_frequency(frequency)?;
    require_positive("panel_thickness_mm", panel_thickness_mm)?;
    let eps = hole_porosity(hole_diameter_mm, hole_spacing_mm)?;

    let omega = TAU * frequency;
    let r = mm_to_m(hole_diameter_mm) / 2.0;
    let delta_v = viscous_boundary_layer(omega, air);
    let t_eff = mm_to_m(panel_thickness_mm) + 2.0 * END_CORRECTION * r;

    let resistance =
        8.0 * air.viscosity * t_eff / (eps * r * r) + air.density * omega * delta_v / eps;
    let reactance = air.density * omega * t_eff / eps;
    Ok(Complex64::new(resistance, reactance))
}

/// Slotted panel (Kristiansen & Vigran 1994)
pub fn slotted_impedance(
    frequency: f64,
    panel_thickness_mm: f64,
    slot_width_mm: f64,
    slot_spacing_mm: f64,
    air: &AirProperties,
) -> Result<Complex64> {
    require_frequency(frequency)?;
    require_positive("panel_thickness_mm", panel_thickness_mm)?;
    let eps = slot_porosity(slot_width_mm, slot_spacing_mm)?;

    let omega = TAU * frequency;
    let w = mm_to_m(slot_width_mm);
    let delta_v = viscous_boundary_layer(omega, air);
    // half-width is the characteristic length, two ends
    let t_eff = mm_to_m(panel_thickness_mm) + 2.0 * END_CORRECTION * (w / 2.0);

    let resistance =
        12.0 * air.viscosity * t_eff / (eps * w * w) + air.density * omega * delta_v / eps;
    let reactance = air.density * omega * t_eff / eps;
    Ok(Complex64::new(resistance, reactance))
}

/// Micro-perforated panel (Maa 1998)
///
/// # Arguments
/// * `porosity` - Open-area ratio, in (0, 1)
pub fn mpp_impedance(
    frequency: f64,
    panel_thickness_mm: f64,
    hole_diameter_mm: f64,
    porosity: f64,
    air: &AirProperties,
) -> Result<Complex64> {
    require_frequency(frequency)?;
    require_positive("panel_thickness_mm", panel_thickness_mm)?;
    require_positive("hole_diameter_mm", hole_diameter_mm)?;
    if !(porosity > 0.0 && porosity < 1.0) {
        return Err(AcousticError::invalid("porosity", porosity, "must be in (0, 1)"));
    }

    let omega = TAU * frequency;
    let d = mm_to_m(hole_diameter_mm);
    let t = mm_to_m(panel_thickness_mm);
    let eta = air.viscosity;
    let rho = air.density;

    // Maa's perforation constant
    let k = d * (omega * rho / (4.0 * eta)).sqrt();

    let resistance = (32.0 * eta * t / (porosity * d * d))
        * ((1.0 + k * k / 32.0).sqrt() + SQRT_2 * k * d / (32.0 * t));
    let reactance =
        (rho * omega * t / porosity) * (1.0 + 1.0 / (9.0 + k * k / 2.0).sqrt() + 0.85 * d / t);
    Ok(Complex64::new(resistance, reactance))
}

/// Sheet impedance for any sub-model from panel geometry
///
/// The micro-perforated variant derives its porosity from the hole grid.
pub fn panel_impedance(
    kind: PanelKind,
    frequency: f64,
    panel_thickness_mm: f64,
    hole_diameter_mm: f64,
    hole_spacing_mm: f64,
    air: &AirProperties,
) -> Result<Complex64> {
    match kind {
        PanelKind::Ingard => ingard_impedance(
            frequency,
            panel_thickness_mm,
            hole_diameter_mm,
            hole_spacing_mm,
            air,
        ),
        PanelKind::Slotted => slotted_impedance(
            frequency,
            panel_thickness_mm,
            hole_diameter_mm,
            hole_spacing_mm,
            air,
        ),
        PanelKind::Mpp => {
            let porosity = hole_porosity(hole_diameter_mm, hole_spacing_mm)?;
            mpp_impedance(frequency, panel_thickness_mm, hole_diameter_mm, porosity, air)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_porosity_from_geometry() {
        let eps = hole_porosity(8.0, 30.0).unwrap();
        assert_relative_eq!(eps, PI * 16.0 / 900.0, epsilon = 1e-12);
        assert_relative_eq!(slot_porosity(3.0, 30.0).unwrap(), 0.1);
    }

    #[test]
    fn test_hole_larger_than_spacing_rejected() {
        assert!(hole_porosity(10.0, 10.0).is_err());
        let air = AirProperties::default();
        assert!(panel_impedance(PanelKind::Slotted, 500.0, 6.0, 40.0, 20.0, &air).is_err());
    }

    #[test]
    fn test_reactance_is_mass_like() {
        let air = AirProperties::default();
        let z1 = ingard_impedance(250.0, 6.0, 8.0, 30.0, &air).unwrap();
        let z2 = ingard_impedance(500.0, 6.0, 8.0, 30.0, &air).unwrap();
        assert!(z1.re > 0.0);
        assert_relative_eq!(z2.im / z1.im, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mpp_resistance_dominated_by_viscosity() {
        let air = AirProperties::default();
        let z = mpp_impedance(100.0, 0.5, 0.4, 0.01, &air).unwrap();
        // low-frequency limit of the resistive term
        let limit = 32.0 * air.viscosity * 0.5e-3 / (0.01 * 0.4e-3 * 0.4e-3);
        assert!(z.re > limit);
        assert!(z.re < 1.5 * limit);
        assert!(mpp_impedance(100.0, 0.5, 0.4, 1.2, &air).is_err());
    }

    #[test]
    fn test_hole_range_by_kind() {
        assert!(PanelKind::Ingard.hole_in_range(5.0));
        assert!(!PanelKind::Ingard.hole_in_range(0.5));
        assert!(PanelKind::Mpp.hole_in_range(0.3));
        assert!(!PanelKind::Mpp.hole_in_range(3.0));
    }
}
