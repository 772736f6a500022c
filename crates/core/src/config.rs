//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the registry and
//! notifier as an `Arc<CoreConfig>`. Nothing in the core reads environment variables while
//! handling a request; binaries parse them up front with the helpers in this module.

use crate::constants::{
    DEFAULT_BILL_ID_PREFIX, DEFAULT_CRITICAL_SEVERITY_THRESHOLD, DEFAULT_PATIENT_ID_PREFIX,
};
use crate::validation::{validate_id_prefix, validate_severity_threshold};
use crate::{HospitalError, HospitalResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    critical_severity_threshold: u8,
    patient_id_prefix: String,
    bill_id_prefix: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::InvalidInput`] if the threshold is outside the severity scale
    /// or either prefix fails [`validate_id_prefix`].
    pub fn new(
        critical_severity_threshold: u8,
        patient_id_prefix: String,
        bill_id_prefix: String,
    ) -> HospitalResult<Self> {
        validate_severity_threshold(critical_severity_threshold)?;
        validate_id_prefix(&patient_id_prefix)?;
        validate_id_prefix(&bill_id_prefix)?;

        if patient_id_prefix == bill_id_prefix {
            return Err(HospitalError::InvalidInput(
                "patient and bill identifier prefixes must differ".into(),
            ));
        }

        Ok(Self {
            critical_severity_threshold,
            patient_id_prefix,
            bill_id_prefix,
        })
    }

    pub fn critical_severity_threshold(&self) -> u8 {
        self.critical_severity_threshold
    }

    pub fn patient_id_prefix(&self) -> &str {
        &self.patient_id_prefix
    }

    pub fn bill_id_prefix(&self) -> &str {
        &self.bill_id_prefix
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            critical_severity_threshold: DEFAULT_CRITICAL_SEVERITY_THRESHOLD,
            patient_id_prefix: DEFAULT_PATIENT_ID_PREFIX.into(),
            bill_id_prefix: DEFAULT_BILL_ID_PREFIX.into(),
        }
    }
}

/// Parse the critical severity threshold from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns
/// [`DEFAULT_CRITICAL_SEVERITY_THRESHOLD`]. Range checking is left to [`CoreConfig::new`].
pub fn critical_severity_from_env_value(value: Option<String>) -> HospitalResult<u8> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        Some(v) => v.parse::<u8>().map_err(|_| {
            HospitalError::InvalidInput(format!(
                "critical severity threshold must be a small integer, got '{v}'"
            ))
        }),
        None => Ok(DEFAULT_CRITICAL_SEVERITY_THRESHOLD),
    }
}

/// Resolve an identifier prefix from an optional string value, falling back to `default`.
pub fn id_prefix_from_env_value(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
