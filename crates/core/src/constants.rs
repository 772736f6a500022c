//! Constants used throughout the hospital core crate.
//!
//! Cost figures are whole currency units; multipliers are expressed as
//! `(mantissa, scale)` pairs for [`rust_decimal::Decimal::new`].

/// Flat treatment cost for a General patient.
pub const GENERAL_FLAT_COST: i64 = 5_000;

/// Emergency base cost before the per-severity surcharge.
pub const EMERGENCY_BASE_COST: i64 = 15_000;

/// Surcharge per emergency severity level.
pub const EMERGENCY_COST_PER_SEVERITY: i64 = 2_000;

/// ICU base cost before the per-day charge.
pub const ICU_BASE_COST: i64 = 25_000;

/// Charge per ICU day.
pub const ICU_COST_PER_DAY: i64 = 8_000;

/// Flat surcharge when an ICU patient requires a ventilator.
pub const ICU_VENTILATOR_SURCHARGE: i64 = 15_000;

/// Lowest emergency severity level.
pub const MIN_SEVERITY: u8 = 1;

/// Highest emergency severity level.
pub const MAX_SEVERITY: u8 = 5;

/// Emergency severity at or above which a critical alert is raised on admission.
pub const DEFAULT_CRITICAL_SEVERITY_THRESHOLD: u8 = 4;

/// Default prefix for patient identifiers (`P0001`).
pub const DEFAULT_PATIENT_ID_PREFIX: &str = "P";

/// Default prefix for bill identifiers (`BILL-0001`).
pub const DEFAULT_BILL_ID_PREFIX: &str = "BILL-";

/// Minimum number of digits rendered for a sequential identifier.
pub const ID_SEQUENCE_WIDTH: usize = 4;

/// Longest identifier prefix accepted by [`crate::CoreConfig`].
pub const MAX_ID_PREFIX_LEN: usize = 16;
