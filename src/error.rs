//! Error types for the convergence study.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Structural and numerical failures.
///
/// Conservation tolerance violations are not errors: they are collected in a
/// [`ConservationReport`](crate::conservation::ConservationReport).
#[derive(Error, Debug)]
pub enum Error {
    /// Store or dataset already present. Informational for store creation.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Store construction failed; nothing was published.
    #[error("failed to create store at {path}: {reason}")]
    CreateFailure {
        /// Store root that was being created
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Missing group or dataset.
    #[error("not found: {0}")]
    NotFound(String),

    /// Compared datasets differ in length.
    #[error("shape mismatch for {key}: expected {expected} values, found {found}")]
    ShapeMismatch {
        /// Store key of the offending dataset
        key: String,
        /// Required length
        expected: usize,
        /// Actual length
        found: usize,
    },

    /// Undefined norm or logarithm.
    #[error("domain error: {0}")]
    DomainError(String),

    /// Refinement exponent outside [6, 16].
    #[error("refinement level {0} is outside the supported range [6, 16]")]
    InvalidLevel(u32),

    /// Unknown initial condition or flux scheme name.
    #[error("unknown {kind} \"{name}\"")]
    UnknownName {
        /// "initial condition" or "flux scheme"
        kind: &'static str,
        /// Rejected input
        name: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset or table encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Attribute or configuration encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Progress bar template error
    #[error("progress template error: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}

impl Error {
    /// Whether the error only reports that the target is already present.
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}
