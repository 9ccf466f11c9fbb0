//! Air gap layer
//!
//! Lossless air layer modelled as a pure propagation delay (Allard & Atalla,
//! eq. 11.1). At oblique incidence only the normal wavenumber component
//! `k₀ cos θ` propagates through the gap.

use super::{mm_to_m, require_frequency, require_positive};
use crate::config::AirProperties;
use crate::error::Result;
use crate::tmm::TransferMatrix;
use num_complex::Complex64;

/// Transfer matrix of an air gap
///
/// # Arguments
/// * `frequency` - Frequency (Hz)
/// * `thickness_mm` - Gap depth (mm)
/// * `cos_theta` - Cosine of the incidence angle (1.0 for normal incidence)
/// * `air` - Properties of the air in the gap
pub fn air_gap_matrix(
    frequency: f64,
    thickness_mm: f64,
    cos_theta: f64,
    air: &AirProperties,
) -> Result<TransferMatrix> {
    require_frequency(frequency)?;
    require_positive("thickness_mm", thickness_mm)?;

    let kz = air.wavenumber(frequency) * cos_theta;
    let z = air.impedance() / cos_theta;
    Ok(TransferMatrix::propagating(
        Complex64::new(z, 0.0),
        Complex64::new(kz, 0.0),
        mm_to_m(thickness_mm),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quarter_wave_gap_is_pressure_release() {
        // At d = λ/4 a rigid-backed gap presents zero impedance
        let air = AirProperties::default();
        let f = 1000.0;
        let quarter_mm = air.wavelength(f) / 4.0 * 1000.0;
        let m = air_gap_matrix(f, quarter_mm, 1.0, &air).unwrap();
        assert!(m.a.norm() < 1e-12);
        assert!(m.rigid_backed_impedance().norm() < 1e-9);
    }

    #[test]
    fn test_lossless_matrix_entries() {
        let air = AirProperties::default();
        let m = air_gap_matrix(500.0, 100.0, 1.0, &air).unwrap();
        let kd = air.wavenumber(500.0) * 0.1;
        assert_relative_eq!(m.a.re, kd.cos(), epsilon = 1e-12);
        assert_relative_eq!(m.b.im, air.impedance() * kd.sin(), epsilon = 1e-9);
        assert_relative_eq!(m.c.im, kd.sin() / air.impedance(), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_positive() {
        let air = AirProperties::default();
        assert!(air_gap_matrix(500.0, 0.0, 1.0, &air).is_err());
        assert!(air_gap_matrix(-5.0, 10.0, 1.0, &air).is_err());
    }
}
