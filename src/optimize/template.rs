//! Stack templates: which layer types the search may combine
//!
//! A template fixes the layer order and types; the search only moves the
//! continuous parameters. Each porous slot contributes a thickness and a
//! flow resistivity (searched as log10 σ), each air slot a thickness, and
//! sheet slots are fixed.

use crate::error::{AcousticError, Result};
use crate::models::{MaterialTable, PanelKind, PorousModel};
use crate::tmm::{LayerSpec, Stack};
use serde::{Deserialize, Serialize};

/// Air gaps thinner than this are dropped from the built stack (mm)
pub const MIN_AIR_GAP_MM: f64 = 1.0;

/// Default flow-resistivity search range (N·s/m⁴)
pub const DEFAULT_SIGMA_RANGE: (f64, f64) = (3_000.0, 50_000.0);

/// One position in a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum TemplateSlot {
    /// Porous layer with free thickness and flow resistivity
    Porous {
        #[serde(default)]
        model: PorousModel,
        sigma_range: (f64, f64),
    },
    /// Air gap with free depth; may shrink to nothing
    Air,
    /// Fixed layer, typically a perforated sheet or membrane
    Sheet(LayerSpec),
}

/// Named layer combination searched by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackTemplate {
    pub name: String,
    pub slots: Vec<TemplateSlot>,
}

impl StackTemplate {
    pub fn new(name: impl Into<String>, slots: Vec<TemplateSlot>) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    /// Porous layer of a named material in front of an air gap
    pub fn porous_with_gap(table: &MaterialTable, key: &str, model: PorousModel) -> Result<Self> {
        let entry = table.get(key)?;
        Ok(Self::new(
            format!("{key}+gap"),
            vec![
                TemplateSlot::Porous {
                    model,
                    sigma_range: entry.sigma_range,
                },
                TemplateSlot::Air,
            ],
        ))
    }

    /// Templates tried when a request names none
    pub fn defaults() -> Vec<Self> {
        let porous = || TemplateSlot::Porous {
            model: PorousModel::Miki,
            sigma_range: DEFAULT_SIGMA_RANGE,
        };
        vec![
            Self::new("porous+gap", vec![porous(), TemplateSlot::Air]),
            Self::new(
                "perforated+porous+gap",
                vec![
                    TemplateSlot::Sheet(LayerSpec::perforated(8.0, 30.0, 6.0, PanelKind::Ingard)),
                    porous(),
                    TemplateSlot::Air,
                ],
            ),
            Self::new(
                "membrane+porous+gap",
                vec![
                    TemplateSlot::Sheet(LayerSpec::membrane(2.0)),
                    porous(),
                    TemplateSlot::Air,
                ],
            ),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(AcousticError::InvalidRequest {
                reason: format!("template '{}' has no slots", self.name),
            });
        }
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                TemplateSlot::Porous { model, sigma_range } => {
                    let (lo, hi) = *sigma_range;
                    if !(lo > 0.0 && hi >= lo && hi.is_finite()) {
                        return Err(AcousticError::InvalidRequest {
                            reason: format!(
                                "template '{}' slot {}: invalid sigma range ({lo}, {hi})",
                                self.name, index
                            ),
                        });
                    }
                    model.validate()?;
                }
                TemplateSlot::Air => {}
                TemplateSlot::Sheet(layer) => {
                    layer.validate(index)?;
                }
            }
        }
        Ok(())
    }

    /// Number of free parameters
    pub fn dimension(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| match slot {
                TemplateSlot::Porous { .. } => 2,
                TemplateSlot::Air => 1,
                TemplateSlot::Sheet(_) => 0,
            })
            .sum()
    }

    /// Depth taken by the fixed sheets (mm)
    pub fn fixed_depth_mm(&self) -> f64 {
        self.slots
            .iter()
            .map(|slot| match slot {
                TemplateSlot::Sheet(layer) => layer.depth_mm(),
                _ => 0.0,
            })
            .sum()
    }

    fn porous_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, TemplateSlot::Porous { .. }))
            .count()
    }

    /// Thinnest stack this template can build (mm)
    pub fn min_depth_mm(&self, min_layer_thickness_mm: f64) -> f64 {
        self.fixed_depth_mm() + self.porous_count() as f64 * min_layer_thickness_mm
    }

    /// Search bounds for a depth budget
    ///
    /// Each free thickness may take up everything the other layers leave at
    /// their minimum; the sum can still exceed the budget and is penalised
    /// by the caller.
    pub fn bounds(&self, depth_budget_mm: f64, min_layer_thickness_mm: f64) -> Vec<(f64, f64)> {
        let spare = (depth_budget_mm - self.min_depth_mm(min_layer_thickness_mm)).max(0.0);
        let mut bounds = Vec::with_capacity(self.dimension());
        for slot in &self.slots {
            match slot {
                TemplateSlot::Porous { sigma_range, .. } => {
                    bounds.push((min_layer_thickness_mm, min_layer_thickness_mm + spare));
                    bounds.push((sigma_range.0.log10(), sigma_range.1.log10()));
                }
                TemplateSlot::Air => bounds.push((0.0, spare)),
                TemplateSlot::Sheet(_) => {}
            }
        }
        bounds
    }

    /// Concrete stack for a parameter vector laid out as in [`Self::bounds`]
    pub fn build(&self, params: &[f64]) -> Stack {
        debug_assert_eq!(params.len(), self.dimension());
        let mut values = params.iter().copied();
        let mut layers = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            match slot {
                TemplateSlot::Porous { model, .. } => {
                    let thickness_mm = values.next().unwrap_or_default();
                    let sigma = 10f64.powf(values.next().unwrap_or_default());
                    layers.push(LayerSpec::porous(sigma, thickness_mm, *model));
                }
                TemplateSlot::Air => {
                    let thickness_mm = values.next().unwrap_or_default();
                    if thickness_mm >= MIN_AIR_GAP_MM {
                        layers.push(LayerSpec::air(thickness_mm));
                    }
                }
                TemplateSlot::Sheet(layer) => layers.push(layer.clone()),
            }
        }
        Stack::new(layers)
    }
}
