//! Input validation utilities.
//!
//! Functions here check caller-supplied text before it is stored on a patient or used to
//! build identifiers.

use crate::constants::{MAX_ID_PREFIX_LEN, MAX_SEVERITY, MIN_SEVERITY};
use crate::{HospitalError, HospitalResult};

/// Trims `value` and rejects it if nothing is left.
///
/// `field` names the attribute in the error message (for example `"name"` or
/// `"diagnosis"`).
///
/// # Errors
///
/// Returns [`HospitalError::InvalidAttribute`] if the trimmed value is empty.
pub fn require_text(field: &str, value: &str) -> HospitalResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HospitalError::InvalidAttribute(format!(
            "{field} cannot be empty"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Checks that a critical-alert threshold lies on the severity scale.
///
/// # Errors
///
/// Returns [`HospitalError::InvalidInput`] if `threshold` is outside
/// [`MIN_SEVERITY`]..=[`MAX_SEVERITY`].
pub fn validate_severity_threshold(threshold: u8) -> HospitalResult<()> {
    if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&threshold) {
        return Err(HospitalError::InvalidInput(format!(
            "critical severity threshold must be between {} and {}, got {}",
            MIN_SEVERITY, MAX_SEVERITY, threshold
        )));
    }
    Ok(())
}

/// Validates that an identifier prefix is safe to prepend to a sequence number.
///
/// Prefixes end up in URLs (`/patients/P0001`) and log lines, so they are restricted to a
/// conservative ASCII set:
/// - not empty
/// - at most [`MAX_ID_PREFIX_LEN`] characters
/// - alphanumeric, `-` or `_` only
///
/// # Errors
///
/// Returns [`HospitalError::InvalidInput`] if the prefix is invalid.
pub fn validate_id_prefix(prefix: &str) -> HospitalResult<()> {
    if prefix.is_empty() {
        return Err(HospitalError::InvalidInput(
            "identifier prefix cannot be empty".into(),
        ));
    }

    if prefix.len() > MAX_ID_PREFIX_LEN {
        return Err(HospitalError::InvalidInput(format!(
            "identifier prefix exceeds maximum length of {} characters",
            MAX_ID_PREFIX_LEN
        )));
    }

    let ok = prefix
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_'));

    if !ok {
        return Err(HospitalError::InvalidInput(
            "identifier prefix contains invalid characters (only alphanumeric, '-', '_' allowed)"
                .into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_threshold_must_be_on_the_scale() {
        assert!(validate_severity_threshold(1).is_ok());
        assert!(validate_severity_threshold(5).is_ok());
        assert!(matches!(
            validate_severity_threshold(0),
            Err(HospitalError::InvalidInput(_))
        ));
        assert!(validate_severity_threshold(6).is_err());
    }

    #[test]
    fn require_text_trims_surrounding_whitespace() {
        assert_eq!(require_text("name", "  Asha Rao ").unwrap(), "Asha Rao");
    }

    #[test]
    fn require_text_rejects_blank_values() {
        let err = require_text("diagnosis", "   ").expect_err("blank should fail");
        assert_eq!(
            err,
            HospitalError::InvalidAttribute("diagnosis cannot be empty".into())
        );
    }

    #[test]
    fn id_prefix_accepts_defaults() {
        validate_id_prefix("P").expect("P is valid");
        validate_id_prefix("BILL-").expect("BILL- is valid");
        validate_id_prefix("ward_7").expect("ward_7 is valid");
    }

    #[test]
    fn id_prefix_rejects_unsafe_characters() {
        for bad in ["", "P/", "B ILL", "Pé", "abcdefghijklmnopq"] {
            assert!(
                matches!(validate_id_prefix(bad), Err(HospitalError::InvalidInput(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
