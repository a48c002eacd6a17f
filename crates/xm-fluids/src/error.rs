//! Fluid property errors.

use thiserror::Error;
use xm_core::XmError;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur while constructing backends or computing properties.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Library name not served by any backend.
    #[error("libraryName = {library} is not supported by any external solver")]
    UnsupportedBackend { library: String },

    /// The backend rejected the inputs of a property evaluation.
    #[error("{function} failed for {inputs}: {message}")]
    BackendComputationFailed {
        function: &'static str,
        inputs: String,
        message: String,
    },

    /// Operation the backend does not implement for this fluid.
    #[error("{function} is not implemented by the {backend} backend")]
    UnsupportedOperation {
        function: &'static str,
        backend: &'static str,
    },

    /// Programming error: unset field read, bad code, bad handle.
    #[error("Contract violation: {what}")]
    ContractViolation { what: String },

    /// Substance not known to an otherwise supported library.
    #[error("Substance {substance} is not available in library {library}")]
    UnknownSubstance { library: String, substance: String },

    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl FluidError {
    pub fn contract(what: impl Into<String>) -> Self {
        Self::ContractViolation { what: what.into() }
    }

    pub(crate) fn failed(
        function: &'static str,
        inputs: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::BackendComputationFailed {
            function,
            inputs: inputs.into(),
            message: message.into(),
        }
    }
}

impl From<XmError> for FluidError {
    fn from(err: XmError) -> Self {
        match err {
            XmError::NonFinite { what, .. } => FluidError::NonPhysical { what },
            XmError::InvalidArg { what } => FluidError::InvalidArg { what },
            XmError::ContractViolation { what } => FluidError::ContractViolation { what },
            XmError::Invariant { what } => FluidError::ContractViolation {
                what: what.to_string(),
            },
        }
    }
}
