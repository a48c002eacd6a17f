use thiserror::Error;

pub type XmResult<T> = Result<T, XmError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XmError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Caller or internal bug: handle 0 used as a lookup key, out-of-range codes.
    #[error("Contract violation: {what}")]
    ContractViolation { what: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}

impl XmError {
    pub fn contract(what: impl Into<String>) -> Self {
        Self::ContractViolation { what: what.into() }
    }
}
