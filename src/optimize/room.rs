//! Rectangular room modes
//!
//! `f = c₀/2 · √((n_x/L_x)² + (n_y/L_y)² + (n_z/L_z)²)`
//!
//! Room dimensions are in metres. Mode order is `n_x + n_y + n_z`, so
//! `max_order = 1` yields exactly the three first axial modes.
//!
//! Reference: Kuttruff, Room Acoustics (2009), Ch. 3.3

use super::Objective;
use crate::config::AirProperties;
use crate::error::{AcousticError, Result};
use crate::models::require_positive;
use serde::{Deserialize, Serialize};

/// Relative tolerance under which two mode frequencies are degenerate
pub const DEGENERACY_TOLERANCE: f64 = 1e-9;

/// Modes closer than this fraction of a target frequency count as near it
pub const NEAR_MODE_FRACTION: f64 = 0.3;

/// Most modes reported near one target
pub const MAX_NEAR_MODES: usize = 10;

/// Reverberation time assumed for an untreated room (s)
pub const DEFAULT_RT60_S: f64 = 0.5;

/// Mode family by number of non-zero indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Axial,
    Tangential,
    Oblique,
}

/// One `(n_x, n_y, n_z)` index triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeIndex {
    pub nx: u32,
    pub ny: u32,
    pub nz: u32,
}

impl ModeIndex {
    pub fn order(&self) -> u32 {
        self.nx + self.ny + self.nz
    }

    pub fn kind(&self) -> ModeKind {
        match [self.nx, self.ny, self.nz].iter().filter(|n| **n > 0).count() {
            1 => ModeKind::Axial,
            2 => ModeKind::Tangential,
            _ => ModeKind::Oblique,
        }
    }
}

/// A distinct mode frequency with every index triple resonating there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMode {
    pub frequency_hz: f64,
    /// Kind of the lowest-order contributing triple
    pub kind: ModeKind,
    pub indices: Vec<ModeIndex>,
}

impl RoomMode {
    /// Whether more than one index triple shares the frequency
    pub fn is_degenerate(&self) -> bool {
        self.indices.len() > 1
    }
}

/// Room modes up to `max_order` in standard air, ascending
///
/// # Arguments
/// * `lx`, `ly`, `lz` - Room dimensions (m)
/// * `max_order` - Largest `n_x + n_y + n_z` enumerated
pub fn room_modes(lx: f64, ly: f64, lz: f64, max_order: u32) -> Result<Vec<RoomMode>> {
    room_modes_with(lx, ly, lz, max_order, &AirProperties::default())
}

/// Room modes using the speed of sound of `air`
pub fn room_modes_with(
    lx: f64,
    ly: f64,
    lz: f64,
    max_order: u32,
    air: &AirProperties,
) -> Result<Vec<RoomMode>> {
    require_positive("lx", lx)?;
    require_positive("ly", ly)?;
    require_positive("lz", lz)?;

    let half_c = air.speed_of_sound / 2.0;
    let mut raw: Vec<(f64, ModeIndex)> = Vec::new();
    for nx in 0..=max_order {
        for ny in 0..=(max_order - nx) {
            for nz in 0..=(max_order - nx - ny) {
                if nx + ny + nz == 0 {
                    continue;
                }
                let f = half_c
                    * ((nx as f64 / lx).powi(2) + (ny as f64 / ly).powi(2) + (nz as f64 / lz).powi(2))
                        .sqrt();
                raw.push((f, ModeIndex { nx, ny, nz }));
            }
        }
    }
    raw.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.order().cmp(&b.1.order()))
    });

    let mut modes: Vec<RoomMode> = Vec::new();
    for (frequency_hz, index) in raw {
        match modes.last_mut() {
            Some(last)
                if (frequency_hz - last.frequency_hz).abs()
                    <= DEGENERACY_TOLERANCE * last.frequency_hz =>
            {
                last.indices.push(index);
            }
            _ => modes.push(RoomMode {
                frequency_hz,
                kind: index.kind(),
                indices: vec![index],
            }),
        }
    }
    log::debug!(
        "{} distinct room modes up to order {} for {}x{}x{} m",
        modes.len(),
        max_order,
        lx,
        ly,
        lz
    );
    Ok(modes)
}

/// Target-frequency objectives for the modes within `[f_lo, f_hi]`
pub fn room_mode_objectives(modes: &[RoomMode], f_lo: f64, f_hi: f64) -> Vec<Objective> {
    modes
        .iter()
        .filter(|m| m.frequency_hz >= f_lo && m.frequency_hz <= f_hi)
        .map(|m| Objective::TargetFrequency(m.frequency_hz))
        .collect()
}

/// Modes strictly within [`NEAR_MODE_FRACTION`] of `target_hz`, lowest
/// first, at most [`MAX_NEAR_MODES`]
///
/// Lists the resonances a design aimed at `target_hz` will act on.
pub fn modes_near(modes: &[RoomMode], target_hz: f64) -> Vec<&RoomMode> {
    modes
        .iter()
        .filter(|m| (m.frequency_hz - target_hz).abs() < NEAR_MODE_FRACTION * target_hz)
        .take(MAX_NEAR_MODES)
        .collect()
}

/// Schroeder frequency `2000 · √(T₆₀ / V)` above which the modal field
/// is dense enough to treat statistically
///
/// # Arguments
/// * `volume_m3` - Room volume (m³)
/// * `rt60_s` - Reverberation time (s); [`DEFAULT_RT60_S`] for an untreated room
pub fn schroeder_frequency(volume_m3: f64, rt60_s: f64) -> Result<f64> {
    require_positive("volume_m3", volume_m3)?;
    require_positive("rt60_s", rt60_s)?;
    Ok(2000.0 * (rt60_s / volume_m3).sqrt())
}

// ============================================================================
// Design guidance
// ============================================================================

/// Absorber family suited to a target frequency and depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignApproach {
    PorousAbsorber,
    PorousAbsorberWithAirGap,
    HelmholtzOrMpp,
    PanelAbsorberOrLargeHelmholtz,
}

impl DesignApproach {
    /// Pick an approach for `target_hz` with `depth_budget_mm` available
    pub fn classify(target_hz: f64, depth_budget_mm: f64) -> Result<Self> {
        require_positive("target_hz", target_hz)?;
        if !(depth_budget_mm >= 0.0 && depth_budget_mm.is_finite()) {
            return Err(AcousticError::invalid(
                "depth_budget_mm",
                depth_budget_mm,
                "must be non-negative and finite",
            ));
        }
        let approach = if target_hz > 500.0 {
            DesignApproach::PorousAbsorber
        } else if (150.0..=500.0).contains(&target_hz) && depth_budget_mm >= 100.0 {
            DesignApproach::PorousAbsorberWithAirGap
        } else if (80.0..=250.0).contains(&target_hz) && depth_budget_mm < 150.0 {
            DesignApproach::HelmholtzOrMpp
        } else if target_hz < 80.0 {
            DesignApproach::PanelAbsorberOrLargeHelmholtz
        } else {
            DesignApproach::PorousAbsorberWithAirGap
        };
        Ok(approach)
    }

    /// One-line explanation of the recommendation
    pub fn rationale(&self) -> &'static str {
        match self {
            DesignApproach::PorousAbsorber => {
                "A porous absorber (fibreglass, mineral wool or foam) is sufficient."
            }
            DesignApproach::PorousAbsorberWithAirGap => {
                "Use a porous absorber with an air gap; the gap shifts the peak lower."
            }
            DesignApproach::HelmholtzOrMpp => {
                "A Helmholtz resonator or micro-perforated panel gives narrowband absorption in little depth."
            }
            DesignApproach::PanelAbsorberOrLargeHelmholtz => {
                "A panel/membrane absorber or large Helmholtz resonator is needed for mass-spring absorption."
            }
        }
    }
}
