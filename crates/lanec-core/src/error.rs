use crate::stage::Stage;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The configuration is internally inconsistent. Rejected before any
    /// stage is appended; a failed construction yields no partial pipeline.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// A required stage or prerequisite analysis could not be registered.
    /// Only instruction selection raises this.
    #[error("cannot register stage `{stage}`: {reason}")]
    StageRegistration { stage: Stage, reason: String },

    /// A declared ordering or mutual-exclusion constraint does not hold in
    /// the assembled pipeline. This indicates a defect in the builder
    /// itself; construction aborts and no pipeline is produced.
    #[error("pipeline constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("generic error: {0}")]
    Generic(#[from] eyre::Report),
}

pub type Result<T> = result::Result<T, Error>;

/// Create a configuration error.
pub fn config_error(message: impl Into<String>) -> Error {
    Error::InvalidConfig(message.into())
}

/// Create a stage-registration error.
pub fn registration_error(stage: Stage, reason: impl Into<String>) -> Error {
    Error::StageRegistration {
        stage,
        reason: reason.into(),
    }
}
