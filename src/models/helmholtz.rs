//! Helmholtz resonator
//!
//! Single resonator with a cylindrical neck and a cavity. The neck length is
//! extended by a flanged end correction of `0.85 · 2r`.
//!
//! References:
//! - Ingard, JASA 25(6) (1953)
//! - Kinsler et al., Fundamentals of Acoustics (2000), Ch. 9

use super::{mm_to_m, require_frequency, require_positive};
use crate::config::AirProperties;
use crate::error::Result;
use crate::frequency::FrequencyAxis;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// End correction as a fraction of the neck diameter
pub const END_CORRECTION_FRACTION: f64 = 0.85;

/// Neck and cavity geometry in SI units
#[derive(Debug, Clone, Copy)]
struct Geometry {
    neck_length: f64,
    neck_radius: f64,
    cavity_volume: f64,
}

impl Geometry {
    fn new(neck_length_mm: f64, neck_radius_mm: f64, cavity_volume_m3: f64) -> Result<Self> {
        require_positive("neck_length_mm", neck_length_mm)?;
        require_positive("neck_radius_mm", neck_radius_mm)?;
        require_positive("cavity_volume_m3", cavity_volume_m3)?;
        Ok(Self {
            neck_length: mm_to_m(neck_length_mm),
            neck_radius: mm_to_m(neck_radius_mm),
            cavity_volume: cavity_volume_m3,
        })
    }

    fn neck_area(&self) -> f64 {
        PI * self.neck_radius * self.neck_radius
    }

    fn effective_length(&self) -> f64 {
        self.neck_length + END_CORRECTION_FRACTION * 2.0 * self.neck_radius
    }

    /// Viscous resistance of the neck at angular frequency `omega`
    fn neck_resistance(&self, omega: f64, air: &AirProperties) -> f64 {
        let eta = air.viscosity;
        let delta_v = (2.0 * eta / (air.density * omega)).sqrt();
        8.0 * eta * self.effective_length() / (PI * self.neck_radius.powi(4))
            + air.density * omega * delta_v / self.neck_area()
    }
}

/// Resonance frequency `f₀ = c₀/(2π) · √(A / (V · L_eff))`
///
/// # Arguments
/// * `neck_length_mm` - Physical neck length (mm)
/// * `neck_radius_mm` - Neck radius (mm)
/// * `cavity_volume_m3` - Cavity volume (m³)
pub fn resonance_frequency(
    neck_length_mm: f64,
    neck_radius_mm: f64,
    cavity_volume_m3: f64,
    air: &AirProperties,
) -> Result<f64> {
    let g = Geometry::new(neck_length_mm, neck_radius_mm, cavity_volume_m3)?;
    Ok(air.speed_of_sound / TAU
        * (g.neck_area() / (g.cavity_volume * g.effective_length())).sqrt())
}

/// Complex acoustic impedance `R + j(ωM − K/ω)` of the resonator
///
/// `M = ρ₀ L_eff / A` is the neck inertance and `K = ρ₀ c₀² / V` the cavity
/// stiffness. `R` is the viscous neck resistance when `viscous_loss` is set.
pub fn impedance(
    frequency: f64,
    neck_length_mm: f64,
    neck_radius_mm: f64,
    cavity_volume_m3: f64,
    viscous_loss: bool,
    air: &AirProperties,
) -> Result<Complex64> {
    require_frequency(frequency)?;
    let g = Geometry::new(neck_length_mm, neck_radius_mm, cavity_volume_m3)?;
    let omega = TAU * frequency;
    let mass = air.density * g.effective_length() / g.neck_area();
    let stiffness = air.density * air.speed_of_sound.powi(2) / g.cavity_volume;
    let resistance = if viscous_loss {
        g.neck_resistance(omega, air)
    } else {
        0.0
    };
    Ok(Complex64::new(resistance, omega * mass - stiffness / omega))
}

/// Equivalent absorption area (m²) at one frequency
///
/// `A(f) = λ²/π · R_rad · R_neck / |Z|²`
pub fn absorption_area(
    frequency: f64,
    neck_length_mm: f64,
    neck_radius_mm: f64,
    cavity_volume_m3: f64,
    air: &AirProperties,
) -> Result<f64> {
    let z = impedance(
        frequency,
        neck_length_mm,
        neck_radius_mm,
        cavity_volume_m3,
        true,
        air,
    )?;
    let g = Geometry::new(neck_length_mm, neck_radius_mm, cavity_volume_m3)?;
    let omega = TAU * frequency;
    let k0 = air.wavenumber(frequency);
    // flanged radiation resistance, one side
    let r_rad = air.impedance() * (k0 * g.neck_radius).powi(2) / TAU;
    let r_neck = g.neck_resistance(omega, air);
    let wavelength = air.wavelength(frequency);
    Ok((wavelength * wavelength / PI * r_rad * r_neck / z.norm_sqr()).max(0.0))
}

/// Theoretical maximum absorption area at resonance, `λ₀² / (2π)`
pub fn max_absorption_area(resonance_hz: f64, air: &AirProperties) -> Result<f64> {
    require_frequency(resonance_hz)?;
    let wavelength = air.wavelength(resonance_hz);
    Ok(wavelength * wavelength / TAU)
}

// ============================================================================
// Resonator with a square cavity
// ============================================================================

/// Resonator with a cylindrical neck and a square-section cavity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelmholtzResonator {
    pub neck_length_mm: f64,
    pub neck_radius_mm: f64,
    pub cavity_depth_mm: f64,
    pub cavity_width_mm: f64,
}

/// Full frequency response of a resonator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelmholtzResponse {
    pub resonance_hz: f64,
    pub frequencies: Vec<f64>,
    pub impedance: Vec<Complex64>,
    pub absorption_area_m2: Vec<f64>,
    /// Frequency of the largest computed absorption area
    pub peak_frequency_hz: f64,
    pub peak_absorption_area_m2: f64,
    pub theoretical_max_area_m2: f64,
}

impl HelmholtzResonator {
    pub fn cavity_volume_m3(&self) -> f64 {
        mm_to_m(self.cavity_width_mm).powi(2) * mm_to_m(self.cavity_depth_mm)
    }

    pub fn resonance_frequency(&self, air: &AirProperties) -> Result<f64> {
        require_positive("cavity_width_mm", self.cavity_width_mm)?;
        require_positive("cavity_depth_mm", self.cavity_depth_mm)?;
        resonance_frequency(
            self.neck_length_mm,
            self.neck_radius_mm,
            self.cavity_volume_m3(),
            air,
        )
    }

    /// Resonance, impedance and absorption area over `axis`
    pub fn analyze(&self, axis: &FrequencyAxis, air: &AirProperties) -> Result<HelmholtzResponse> {
        let resonance_hz = self.resonance_frequency(air)?;
        let volume = self.cavity_volume_m3();

        let mut impedance_curve = Vec::with_capacity(axis.len());
        let mut area_curve = Vec::with_capacity(axis.len());
        for f in axis.iter() {
            impedance_curve.push(impedance(
                f,
                self.neck_length_mm,
                self.neck_radius_mm,
                volume,
                true,
                air,
            )?);
            area_curve.push(absorption_area(
                f,
                self.neck_length_mm,
                self.neck_radius_mm,
                volume,
                air,
            )?);
        }

        let (peak_index, peak_area) = area_curve
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, a)| if a > best.1 { (i, a) } else { best });

        Ok(HelmholtzResponse {
            resonance_hz,
            frequencies: axis.values().to_vec(),
            impedance: impedance_curve,
            absorption_area_m2: area_curve,
            peak_frequency_hz: axis.values()[peak_index],
            peak_absorption_area_m2: peak_area,
            theoretical_max_area_m2: max_absorption_area(resonance_hz, air)?,
        })
    }
}
