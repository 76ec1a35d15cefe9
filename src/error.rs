//! Error types for the operational space controller.

use thiserror::Error;

use crate::{config::ConfigError, pd::PdMode, target::TargetField, types::Float};

/// Errors that abort a control computation or a control episode.
///
/// All of these are configuration or precondition defects: retrying with the
/// same input cannot succeed, so they are surfaced to the caller as-is.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// A required target field was read before it was set.
    #[error("missing target: {0} has not been set")]
    MissingTarget(TargetField),

    /// No gains are configured for the requested PD task.
    #[error("invalid controller gains: no {0} gains configured")]
    InvalidGains(PdMode),

    /// A PD mode name outside {position, orientation}.
    #[error("invalid mode for pd control: {0:?}")]
    InvalidMode(String),

    /// The controlled joint set is empty, repeats a DOF or does not fit the engine.
    #[error("invalid joint space: {0}")]
    InvalidJointSpace(String),

    /// The physics engine has no site with this name.
    #[error("unknown site: {0}")]
    UnknownSite(String),

    /// An episode duration that is NaN or infinite, so it could never time out.
    #[error("episode duration must be finite, got {0}")]
    InvalidDuration(Float),

    /// The physics engine returned a quantity with an unexpected shape.
    #[error("dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: String,
        found: String,
    },

    /// The controller configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ControlError {
    pub fn invalid_joint_space(msg: impl Into<String>) -> Self {
        Self::InvalidJointSpace(msg.into())
    }

    pub fn dimension_mismatch(
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            what,
            expected: format!("{}x{}", expected.0, expected.1),
            found: format!("{}x{}", found.0, found.1),
        }
    }
}
