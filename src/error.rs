//! Error handling for Acoustica
//!
//! Only hard failures live here. Results that are computed but fall outside a
//! model's validated domain are reported as [`crate::diagnostics::ModelWarning`]s
//! instead, so the caller decides whether they are fatal.

use thiserror::Error;

/// Result type alias for Acoustica operations
pub type Result<T> = std::result::Result<T, AcousticError>;

/// Main error type for Acoustica operations
#[derive(Error, Debug)]
pub enum AcousticError {
    // Validation Errors
    #[error("Invalid parameter '{parameter}' = {value}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        reason: String,
    },

    #[error("Invalid layer #{index} ({layer_type}): {reason}")]
    InvalidLayer {
        index: usize,
        layer_type: &'static str,
        reason: String,
    },

    #[error("Invalid frequency axis: {reason}")]
    InvalidFrequencyAxis { reason: String },

    #[error("Invalid optimization request: {reason}")]
    InvalidRequest { reason: String },

    // Lookup Errors
    #[error("Unknown material: {name}")]
    UnknownMaterial { name: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AcousticError {
    /// Shorthand for a rejected physical parameter
    pub(crate) fn invalid(parameter: &'static str, value: f64, reason: impl Into<String>) -> Self {
        AcousticError::InvalidParameter {
            parameter,
            value,
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AcousticError::InvalidParameter { .. } => "INVALID_PARAMETER",
            AcousticError::InvalidLayer { .. } => "INVALID_LAYER",
            AcousticError::InvalidFrequencyAxis { .. } => "INVALID_FREQUENCY_AXIS",
            AcousticError::InvalidRequest { .. } => "INVALID_REQUEST",
            AcousticError::UnknownMaterial { .. } => "UNKNOWN_MATERIAL",
            AcousticError::InvalidConfig { .. } => "INVALID_CONFIG",
            AcousticError::Io(_) => "IO_ERROR",
            AcousticError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the error came from rejecting caller input before any computation
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AcousticError::InvalidParameter { .. }
                | AcousticError::InvalidLayer { .. }
                | AcousticError::InvalidFrequencyAxis { .. }
                | AcousticError::InvalidRequest { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AcousticError::InvalidParameter { .. } | AcousticError::InvalidLayer { .. } => vec![
                "Thickness, mass, area, volume and flow resistivity must be positive",
                "Geometric inputs are in millimetres",
                "Hole diameter must be smaller than hole spacing",
            ],
            AcousticError::InvalidFrequencyAxis { .. } => vec![
                "Frequencies must be positive and strictly increasing",
                "Use FrequencyAxis::log_spaced or FrequencyAxis::third_octave",
            ],
            AcousticError::InvalidRequest { .. } => vec![
                "Provide at least one stack template",
                "Depth budget must be a finite positive number of millimetres",
            ],
            AcousticError::UnknownMaterial { .. } => vec![
                "Check the material key against the loaded material table",
                "Use MaterialTable::search for partial matches",
            ],
            AcousticError::InvalidConfig { .. } => vec![
                "Remove the offending key to fall back to the default value",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AcousticError::invalid("thickness_mm", -1.0, "must be positive");
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
        assert!(err.is_validation());
        assert!(err.to_string().contains("thickness_mm"));
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = AcousticError::UnknownMaterial {
            name: "unobtainium".to_string(),
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(!err.is_validation());
    }
}
