//! Error types for registry discovery, composition and resolution.

use rulebook_model::ModelError;
use thiserror::Error;

/// Errors raised while building, composing or resolving registries.
///
/// Every variant is fatal to the operation that raised it; no partial
/// registry is ever returned.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two discovered definitions share a code.
    #[error("Duplicate rule code '{code}' in registration table")]
    DuplicateRuleCode { code: String },

    /// Delta deletes a code the base registry does not contain.
    #[error("Delta deletes rule '{code}' which is not in the base registry")]
    InvalidDelta { code: String },

    /// No registry was published for the cycle.
    #[error("No ruleset published for cycle '{cycle}'")]
    UnknownCycle { cycle: String },

    /// Published snapshots are never replaced.
    #[error("Ruleset for cycle '{cycle}' is already published")]
    CycleAlreadyPublished { cycle: String },

    #[error("Invalid cycle identifier '{cycle}'")]
    InvalidCycle { cycle: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
