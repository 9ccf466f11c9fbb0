//! Layer specifications and stacks
//!
//! A stack is ordered from the exposed face to the rigid backing. Geometry is
//! given in millimetres.

use crate::config::AirProperties;
use crate::diagnostics::{Diagnostics, ModelWarning};
use crate::error::{AcousticError, Result};
use crate::models::{air, membrane, perforated, require_positive, PanelKind, PorousModel, PorousResponse};
use crate::tmm::{Angle, TransferMatrix};
use serde::{Deserialize, Serialize};

/// Flow resistivities outside this band (N·s/m⁴) are unusual for absorbers
pub const TYPICAL_SIGMA_RANGE: (f64, f64) = (1_000.0, 1_000_000.0);

/// One layer of an absorber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    /// Rigid-frame porous material
    Porous {
        /// Flow resistivity (N·s/m⁴)
        sigma: f64,
        thickness_mm: f64,
        #[serde(default)]
        model: PorousModel,
    },
    /// Lossless air gap
    Air { thickness_mm: f64 },
    /// Perforated, slotted or micro-perforated sheet
    Perforated {
        /// Hole diameter, or slot width for slotted panels
        hole_diameter_mm: f64,
        hole_spacing_mm: f64,
        panel_thickness_mm: f64,
        #[serde(default)]
        kind: PanelKind,
    },
    /// Limp mass-law membrane
    Membrane {
        /// Surface mass density (kg/m²)
        mass_per_area: f64,
    },
}

impl LayerSpec {
    pub fn porous(sigma: f64, thickness_mm: f64, model: PorousModel) -> Self {
        LayerSpec::Porous {
            sigma,
            thickness_mm,
            model,
        }
    }

    pub fn air(thickness_mm: f64) -> Self {
        LayerSpec::Air { thickness_mm }
    }

    pub fn perforated(
        hole_diameter_mm: f64,
        hole_spacing_mm: f64,
        panel_thickness_mm: f64,
        kind: PanelKind,
    ) -> Self {
        LayerSpec::Perforated {
            hole_diameter_mm,
            hole_spacing_mm,
            panel_thickness_mm,
            kind,
        }
    }

    pub fn membrane(mass_per_area: f64) -> Self {
        LayerSpec::Membrane { mass_per_area }
    }

    pub fn layer_type(&self) -> &'static str {
        match self {
            LayerSpec::Porous { .. } => "porous",
            LayerSpec::Air { .. } => "air",
            LayerSpec::Perforated { .. } => "perforated",
            LayerSpec::Membrane { .. } => "membrane",
        }
    }

    /// Physical depth the layer occupies (mm)
    pub fn depth_mm(&self) -> f64 {
        match self {
            LayerSpec::Porous { thickness_mm, .. } | LayerSpec::Air { thickness_mm } => {
                *thickness_mm
            }
            LayerSpec::Perforated {
                panel_thickness_mm, ..
            } => *panel_thickness_mm,
            LayerSpec::Membrane { .. } => 0.0,
        }
    }

    /// Whether the layer is a zero-thickness impedance sheet in the chain
    pub fn is_sheet(&self) -> bool {
        matches!(self, LayerSpec::Perforated { .. } | LayerSpec::Membrane { .. })
    }

    /// Reject invalid parameters; report unusual ones as warnings
    pub fn validate(&self, index: usize) -> Result<Diagnostics> {
        self.check(index).map_err(|err| AcousticError::InvalidLayer {
            index,
            layer_type: self.layer_type(),
            reason: err.to_string(),
        })
    }

    fn check(&self, index: usize) -> Result<Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        match self {
            LayerSpec::Porous {
                sigma,
                thickness_mm,
                model,
            } => {
                require_positive("sigma", *sigma)?;
                require_positive("thickness_mm", *thickness_mm)?;
                model.validate()?;
                let (lo, hi) = TYPICAL_SIGMA_RANGE;
                if *sigma < lo || *sigma > hi {
                    diagnostics.push(ModelWarning::ParameterOutsidePhysicalRange {
                        layer: index,
                        parameter: "sigma".to_string(),
                        value: *sigma,
                        note: format!("typical absorbers lie within {lo}..{hi} N·s/m⁴"),
                    });
                }
            }
            LayerSpec::Air { thickness_mm } => require_positive("thickness_mm", *thickness_mm)?,
            LayerSpec::Perforated {
                hole_diameter_mm,
                hole_spacing_mm,
                panel_thickness_mm,
                kind,
            } => {
                require_positive("panel_thickness_mm", *panel_thickness_mm)?;
                match kind {
                    PanelKind::Slotted => {
                        perforated::slot_porosity(*hole_diameter_mm, *hole_spacing_mm)?;
                    }
                    _ => {
                        perforated::hole_porosity(*hole_diameter_mm, *hole_spacing_mm)?;
                    }
                }
                if !kind.hole_in_range(*hole_diameter_mm) {
                    diagnostics.push(ModelWarning::ParameterOutsidePhysicalRange {
                        layer: index,
                        parameter: "hole_diameter_mm".to_string(),
                        value: *hole_diameter_mm,
                        note: format!("outside the validated hole size of the {} model", kind.name()),
                    });
                }
            }
            LayerSpec::Membrane { mass_per_area } => {
                require_positive("mass_per_area", *mass_per_area)?
            }
        }
        Ok(diagnostics)
    }

    /// Transfer matrix at one frequency and incidence angle
    ///
    /// Propagating layers use the normal wavenumber component
    /// `k_z = √(k_c² − k₀² sin²θ)` and the impedance `Z_c k_c / k_z`. Sheets
    /// are locally reacting and independent of angle. Also returns the porous
    /// response so callers can inspect the model's range flag.
    pub fn transfer_matrix(
        &self,
        frequency: f64,
        angle: Angle,
        air: &AirProperties,
    ) -> Result<(TransferMatrix, Option<PorousResponse>)> {
        match self {
            LayerSpec::Porous {
                sigma,
                thickness_mm,
                model,
            } => {
                let response = model.response(frequency, *sigma, air)?;
                let kx = air.wavenumber(frequency) * angle.sin;
                let mut kz = (response.kc * response.kc - kx * kx).sqrt();
                // keep the decaying branch for e^{jωt}
                if kz.im > 0.0 {
                    kz = -kz;
                }
                let z = response.zc * response.kc / kz;
                let matrix = TransferMatrix::propagating(z, kz, thickness_mm * 1e-3);
                Ok((matrix, Some(response)))
            }
            LayerSpec::Air { thickness_mm } => Ok((
                air::air_gap_matrix(frequency, *thickness_mm, angle.cos, air)?,
                None,
            )),
            LayerSpec::Perforated {
                hole_diameter_mm,
                hole_spacing_mm,
                panel_thickness_mm,
                kind,
            } => {
                let z = perforated::panel_impedance(
                    *kind,
                    frequency,
                    *panel_thickness_mm,
                    *hole_diameter_mm,
                    *hole_spacing_mm,
                    air,
                )?;
                Ok((TransferMatrix::sheet(z), None))
            }
            LayerSpec::Membrane { mass_per_area } => Ok((
                TransferMatrix::sheet(membrane::membrane_impedance(frequency, *mass_per_area)?),
                None,
            )),
        }
    }
}

/// Ordered layers, exposed face first, rigid backing behind the last
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack {
    layers: Vec<LayerSpec>,
}

impl Stack {
    pub fn new(layers: Vec<LayerSpec>) -> Self {
        Self { layers }
    }

    /// Bare rigid wall
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total physical depth in front of the wall (mm)
    pub fn total_depth_mm(&self) -> f64 {
        self.layers.iter().map(LayerSpec::depth_mm).sum()
    }

    /// Same layers, backing side first
    pub fn reversed(&self) -> Self {
        Self {
            layers: self.layers.iter().rev().cloned().collect(),
        }
    }

    /// Whether the stack reads the same in both directions
    pub fn is_palindrome(&self) -> bool {
        self.layers.iter().eq(self.layers.iter().rev())
    }

    /// Validate every layer, collecting range warnings
    pub fn validate(&self) -> Result<Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        for (index, layer) in self.layers.iter().enumerate() {
            diagnostics.extend(layer.validate(index)?);
        }
        Ok(diagnostics)
    }
}

impl From<Vec<LayerSpec>> for Stack {
    fn from(layers: Vec<LayerSpec>) -> Self {
        Self::new(layers)
    }
}
