//! 2×2 complex transfer matrix
//!
//! ```text
//! [p_front]   [a  b] [p_back]
//! [v_front] = [c  d] [v_back]
//! ```

use num_complex::Complex64;
use num_traits::{One, Zero};

/// Surface impedance substituted when the chain is acoustically rigid
pub const RIGID_IMPEDANCE: f64 = 1e30;

/// Relative size of `c` below which the backing is treated as rigid
const RIGID_TOLERANCE: f64 = 1e-300;

/// Attenuation (nepers) across one layer beyond which cosh/sinh overflow
const MAX_UNSCALED_ATTENUATION: f64 = 300.0;

/// Pressure / particle-velocity transfer matrix of one layer or a chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferMatrix {
    pub a: Complex64,
    pub b: Complex64,
    pub c: Complex64,
    pub d: Complex64,
}

impl TransferMatrix {
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { a, b, c, d }
    }

    /// Identity matrix (bare rigid wall when nothing is chained)
    pub fn identity() -> Self {
        Self {
            a: Complex64::one(),
            b: Complex64::zero(),
            c: Complex64::zero(),
            d: Complex64::one(),
        }
    }

    /// Propagating layer of thickness `d` (m)
    ///
    /// Very thick lossy layers are returned scaled by `e^-|Im(kd)|`. The
    /// determinant is then no longer 1, but impedance ratios are unchanged.
    ///
    /// # Arguments
    /// * `z` - Impedance seen by the wave along the propagation axis
    /// * `k` - Wavenumber along the propagation axis
    /// * `thickness` - Layer thickness (m)
    pub fn propagating(z: Complex64, k: Complex64, thickness: f64) -> Self {
        let kd = k * thickness;
        let (cos_kd, sin_kd) = if kd.im.abs() > MAX_UNSCALED_ATTENUATION {
            scaled_cos_sin(kd)
        } else {
            (kd.cos(), kd.sin())
        };
        let j = Complex64::i();
        Self {
            a: cos_kd,
            b: j * z * sin_kd,
            c: j * sin_kd / z,
            d: cos_kd,
        }
    }

    /// Zero-thickness series impedance sheet (perforated panel, membrane)
    pub fn sheet(z: Complex64) -> Self {
        Self {
            a: Complex64::one(),
            b: z,
            c: Complex64::zero(),
            d: Complex64::one(),
        }
    }

    /// Chain (multiply) this matrix with the next layer behind it: self · other
    pub fn chain(&self, other: &TransferMatrix) -> TransferMatrix {
        TransferMatrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
        }
    }

    pub fn determinant(&self) -> Complex64 {
        self.a * self.d - self.b * self.c
    }

    /// Input impedance with a rigid termination behind the chain (v_back = 0)
    ///
    /// When `c` vanishes the front face sees a rigid wall; a very large real
    /// impedance is returned instead of dividing by zero.
    pub fn rigid_backed_impedance(&self) -> Complex64 {
        if self.c.norm() <= RIGID_TOLERANCE * self.a.norm().max(1.0) {
            log::trace!("rigid chain: substituting surface impedance");
            return Complex64::new(RIGID_IMPEDANCE, 0.0);
        }
        let z = self.a / self.c;
        if z.re.is_finite() && z.im.is_finite() {
            z
        } else {
            Complex64::new(RIGID_IMPEDANCE, 0.0)
        }
    }
}

/// `cos` and `sin` of `kd`, both multiplied by `e^-|Im(kd)|`
fn scaled_cos_sin(kd: Complex64) -> (Complex64, Complex64) {
    let j = Complex64::i();
    let y = kd.im;
    let forward = (j * kd.re).exp() * (-y - y.abs()).exp();
    let backward = (-j * kd.re).exp() * (y - y.abs()).exp();
    ((forward + backward) / 2.0, (forward - backward) / (2.0 * j))
}

impl Default for TransferMatrix {
    fn default() -> Self {
        Self::identity()
    }
}
