//! Sequential identifiers for patients and bills.
//!
//! The registry issues identifiers from a per-collection counter rendered as
//! `<prefix><n>` with `n` zero-padded to [`ID_SEQUENCE_WIDTH`] digits:
//!
//! - patients: `P0001`, `P0002`, …
//! - bills: `BILL-0001`, `BILL-0002`, …
//!
//! Counters only move forward, so an identifier is never reissued, and identifiers sort
//! in issue order for as long as they fit the padded width.
//!
//! Identifiers arriving from outside (REST paths, CLI scripts) are plain strings. They are
//! wrapped with [`PatientId::from`] and only ever compared against issued values, so an
//! unknown or malformed string simply fails to match.

use crate::constants::ID_SEQUENCE_WIDTH;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an admitted patient.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PatientId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_owned())
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of an issued bill.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(String);

impl BillId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BillId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Monotonic counter that renders prefixed identifiers.
///
/// [`peek`](IdSequence::peek) renders the next identifier without consuming it and
/// [`advance`](IdSequence::advance) commits it. The registry peeks, builds the record, and
/// advances only once the record is stored, so a failed operation never burns a number.
#[derive(Clone, Debug)]
pub(crate) struct IdSequence {
    prefix: String,
    last: u64,
}

impl IdSequence {
    pub(crate) fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last: 0,
        }
    }

    pub(crate) fn peek(&self) -> String {
        format!(
            "{}{:0width$}",
            self.prefix,
            self.last + 1,
            width = ID_SEQUENCE_WIDTH
        )
    }

    pub(crate) fn advance(&mut self) {
        self.last += 1;
    }

    pub(crate) fn next_patient_id(&self) -> PatientId {
        PatientId(self.peek())
    }

    pub(crate) fn next_bill_id(&self) -> BillId {
        BillId(self.peek())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let seq = IdSequence::new("P");
        assert_eq!(seq.peek(), "P0001");
        assert_eq!(seq.peek(), "P0001");
    }

    #[test]
    fn advance_moves_to_next_number() {
        let mut seq = IdSequence::new("BILL-");
        assert_eq!(seq.next_bill_id().as_str(), "BILL-0001");
        seq.advance();
        seq.advance();
        assert_eq!(seq.next_bill_id().as_str(), "BILL-0003");
    }

    #[test]
    fn width_grows_past_padding() {
        let mut seq = IdSequence::new("P");
        for _ in 0..10_000 {
            seq.advance();
        }
        assert_eq!(seq.next_patient_id().as_str(), "P10001");
    }

    #[test]
    fn external_ids_are_trimmed() {
        assert_eq!(PatientId::from("  P0007 ").as_str(), "P0007");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let seq = IdSequence::new("P");
        let json = serde_json::to_string(&seq.next_patient_id()).unwrap();
        assert_eq!(json, "\"P0001\"");
    }
}
