//! Caller-facing errors of the medium-state layer.

use thiserror::Error;
use xm_core::XmError;
use xm_fluids::FluidError;

/// Result type for medium-state operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors surfaced to callers. None of them is retried internally.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("libraryName = {library} is not supported by any external solver")]
    UnsupportedBackend { library: String },

    #[error("{function} failed for {inputs}: {message}")]
    BackendComputationFailed {
        function: &'static str,
        inputs: String,
        message: String,
    },

    #[error("Contract violation: {what}")]
    ContractViolation { what: String },

    #[error("{function} is not implemented by the {backend} backend")]
    UnsupportedOperation {
        function: &'static str,
        backend: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {what}")]
    Config { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl MediaError {
    pub fn contract(what: impl Into<String>) -> Self {
        Self::ContractViolation { what: what.into() }
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}

impl From<FluidError> for MediaError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::UnsupportedBackend { library } => Self::UnsupportedBackend { library },
            FluidError::BackendComputationFailed {
                function,
                inputs,
                message,
            } => Self::BackendComputationFailed {
                function,
                inputs,
                message,
            },
            FluidError::UnsupportedOperation { function, backend } => {
                Self::UnsupportedOperation { function, backend }
            }
            FluidError::ContractViolation { what } => Self::ContractViolation { what },
            other @ (FluidError::UnknownSubstance { .. }
            | FluidError::NonPhysical { .. }
            | FluidError::InvalidArg { .. }) => Self::InvalidInput(other.to_string()),
        }
    }
}

impl From<XmError> for MediaError {
    fn from(err: XmError) -> Self {
        match err {
            XmError::ContractViolation { what } => Self::ContractViolation { what },
            XmError::Invariant { what } => Self::contract(what),
            other @ (XmError::NonFinite { .. } | XmError::InvalidArg { .. }) => {
                Self::InvalidInput(other.to_string())
            }
        }
    }
}
