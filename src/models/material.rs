//! Read-only material property table
//!
//! The table content is owned by an external collaborator and loaded from
//! JSON. The engine only reads it; it is passed explicitly wherever a
//! material name must be resolved.

use crate::error::{AcousticError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Acoustic properties of one porous material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    /// Display name
    pub name: String,
    /// Flow-resistivity range (N·s/m⁴)
    pub sigma_range: (f64, f64),
    /// Typical flow resistivity (N·s/m⁴); midpoint of the range when absent
    #[serde(default)]
    pub sigma_typical: Option<f64>,
    /// Bulk density (kg/m³)
    pub density_kg_m3: f64,
    #[serde(default)]
    pub notes: String,
}

impl MaterialEntry {
    pub fn typical_sigma(&self) -> f64 {
        self.sigma_typical
            .unwrap_or((self.sigma_range.0 + self.sigma_range.1) / 2.0)
    }

    fn validate(&self, key: &str) -> Result<()> {
        let (lo, hi) = self.sigma_range;
        if !(lo > 0.0 && hi >= lo && hi.is_finite()) {
            return Err(AcousticError::InvalidConfig {
                reason: format!("material '{key}': invalid sigma_range ({lo}, {hi})"),
            });
        }
        if let Some(typical) = self.sigma_typical {
            if typical < lo || typical > hi {
                return Err(AcousticError::InvalidConfig {
                    reason: format!("material '{key}': sigma_typical {typical} outside range"),
                });
            }
        }
        if !(self.density_kg_m3 > 0.0) {
            return Err(AcousticError::InvalidConfig {
                reason: format!("material '{key}': density must be positive"),
            });
        }
        Ok(())
    }
}

/// Immutable key → material mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialTable {
    entries: BTreeMap<String, MaterialEntry>,
}

impl MaterialTable {
    /// Build a table from `(key, entry)` pairs, validating every entry
    pub fn new(entries: impl IntoIterator<Item = (String, MaterialEntry)>) -> Result<Self> {
        let entries: BTreeMap<String, MaterialEntry> = entries.into_iter().collect();
        for (key, entry) in &entries {
            entry.validate(key)?;
        }
        Ok(Self { entries })
    }

    /// Parse a JSON object of `key → entry`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, MaterialEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading material table from {}", path.display());
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn get(&self, key: &str) -> Result<&MaterialEntry> {
        self.entries
            .get(key)
            .ok_or_else(|| AcousticError::UnknownMaterial {
                name: key.to_string(),
            })
    }

    /// Entries whose key or display name contains `query`, ignoring case,
    /// spaces, dashes and underscores
    pub fn search(&self, query: &str) -> Vec<(&str, &MaterialEntry)> {
        let needle = normalize(query);
        self.entries
            .iter()
            .filter(|(key, entry)| normalize(&format!("{key}{}", entry.name)).contains(&needle))
            .map(|(key, entry)| (key.as_str(), entry))
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
