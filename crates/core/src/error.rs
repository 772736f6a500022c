/// Errors surfaced synchronously by registry and cost-policy operations.
///
/// All variants are local validation failures: nothing here is transient, so callers
/// should present them rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HospitalError {
    #[error("invalid patient category: {0}")]
    InvalidCategory(String),
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),
    #[error("unknown billing strategy: {0}")]
    UnknownStrategy(String),
    #[error("patient not found: {0}")]
    PatientNotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type HospitalResult<T> = std::result::Result<T, HospitalError>;
