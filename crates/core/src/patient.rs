//! Patient records and their category-specific care profiles.
//!
//! A patient belongs to exactly one [`Category`], fixed at admission. The attributes that
//! matter for that category live in a [`CareProfile`] variant, validated once when the
//! profile is built from raw [`AdmissionAttributes`] and never mutated afterwards. Only the
//! descriptive fields (`name`, `age`) can change over a patient's lifetime, and only through
//! the registry.

use crate::constants::{MAX_SEVERITY, MIN_SEVERITY};
use crate::ids::PatientId;
use crate::validation::require_text;
use crate::{HospitalError, HospitalResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// ============================================================================
// CATEGORY
// ============================================================================

/// Closed classification of a patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    General,
    Emergency,
    #[serde(rename = "ICU")]
    Icu,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::General, Category::Emergency, Category::Icu];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Emergency => "Emergency",
            Category::Icu => "ICU",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = HospitalError;

    /// Parses a category name case-insensitively (`"general"`, `"ICU"`, `"Emergency"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| HospitalError::InvalidCategory(trimmed.to_string()))
    }
}

// ============================================================================
// ADMISSION ATTRIBUTES
// ============================================================================

/// Raw category-specific attributes as supplied by a caller.
///
/// Every field is optional here; [`CareProfile::from_attributes`] decides which ones the
/// chosen category requires and rejects the rest. Numeric fields are signed so that
/// out-of-range input (negative ICU days, severity 0) reaches validation instead of failing
/// deserialisation with a less useful message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdmissionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icu_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_ventilator: Option<bool>,
}

impl AdmissionAttributes {
    pub fn general(diagnosis: impl Into<String>) -> Self {
        Self {
            diagnosis: Some(diagnosis.into()),
            ..Self::default()
        }
    }

    pub fn emergency(emergency_type: impl Into<String>, severity: i64) -> Self {
        Self {
            emergency_type: Some(emergency_type.into()),
            severity: Some(severity),
            ..Self::default()
        }
    }

    pub fn icu(icu_days: i64, requires_ventilator: bool) -> Self {
        Self {
            icu_days: Some(icu_days),
            requires_ventilator: Some(requires_ventilator),
            ..Self::default()
        }
    }

    /// Names of the attributes that are set, paired with the category they belong to.
    fn present(&self) -> Vec<(&'static str, Category)> {
        let mut fields = Vec::new();
        if self.diagnosis.is_some() {
            fields.push(("diagnosis", Category::General));
        }
        if self.emergency_type.is_some() {
            fields.push(("emergency_type", Category::Emergency));
        }
        if self.severity.is_some() {
            fields.push(("severity", Category::Emergency));
        }
        if self.icu_days.is_some() {
            fields.push(("icu_days", Category::Icu));
        }
        if self.requires_ventilator.is_some() {
            fields.push(("requires_ventilator", Category::Icu));
        }
        fields
    }
}

// ============================================================================
// CARE PROFILE
// ============================================================================

/// Validated, category-tagged attributes of a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum CareProfile {
    General {
        diagnosis: String,
    },
    Emergency {
        emergency_type: String,
        severity: u8,
    },
    #[serde(rename = "ICU")]
    Icu {
        icu_days: u32,
        requires_ventilator: bool,
    },
}

impl CareProfile {
    /// Builds the profile for `category` from raw attributes.
    ///
    /// - General requires `diagnosis`.
    /// - Emergency requires `emergency_type` and `severity`; severity is clamped into
    ///   `[1, 5]`.
    /// - ICU requires `icu_days` (zero or more); `requires_ventilator` defaults to `false`.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::InvalidAttribute`] if a required attribute is missing or
    /// empty, `icu_days` is negative or too large, or an attribute belonging to another
    /// category is present.
    pub fn from_attributes(
        category: Category,
        attributes: AdmissionAttributes,
    ) -> HospitalResult<Self> {
        if let Some((field, owner)) = attributes
            .present()
            .into_iter()
            .find(|(_, owner)| *owner != category)
        {
            return Err(HospitalError::InvalidAttribute(format!(
                "{field} applies to {owner} patients, not {category}"
            )));
        }

        match category {
            Category::General => {
                let diagnosis = required(category, "diagnosis", attributes.diagnosis)?;
                Ok(CareProfile::General {
                    diagnosis: require_text("diagnosis", &diagnosis)?,
                })
            }
            Category::Emergency => {
                let emergency_type =
                    required(category, "emergency_type", attributes.emergency_type)?;
                let severity = required(category, "severity", attributes.severity)?;
                Ok(CareProfile::Emergency {
                    emergency_type: require_text("emergency_type", &emergency_type)?,
                    severity: clamp_severity(severity),
                })
            }
            Category::Icu => {
                let icu_days = required(category, "icu_days", attributes.icu_days)?;
                let icu_days = u32::try_from(icu_days).map_err(|_| {
                    HospitalError::InvalidAttribute(format!(
                        "icu_days must be between 0 and {}, got {icu_days}",
                        u32::MAX
                    ))
                })?;
                Ok(CareProfile::Icu {
                    icu_days,
                    requires_ventilator: attributes.requires_ventilator.unwrap_or(false),
                })
            }
        }
    }

    pub fn category(&self) -> Category {
        match self {
            CareProfile::General { .. } => Category::General,
            CareProfile::Emergency { .. } => Category::Emergency,
            CareProfile::Icu { .. } => Category::Icu,
        }
    }
}

fn required<T>(category: Category, field: &str, value: Option<T>) -> HospitalResult<T> {
    value.ok_or_else(|| {
        HospitalError::InvalidAttribute(format!("{field} is required for {category} patients"))
    })
}

/// Clamps an arbitrary severity into the `[1, 5]` scale.
pub fn clamp_severity(severity: i64) -> u8 {
    // Bounds fit in u8 after clamping.
    severity.clamp(i64::from(MIN_SEVERITY), i64::from(MAX_SEVERITY)) as u8
}

// ============================================================================
// PATIENT
// ============================================================================

/// An admitted patient.
///
/// Instances handed out by the registry are snapshots; mutating one does not touch the
/// registry's copy, which is why the descriptive fields have no public setters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    id: PatientId,
    name: String,
    age: u32,
    admitted_at: DateTime<Utc>,
    profile: CareProfile,
}

impl Patient {
    pub(crate) fn new(id: PatientId, name: String, age: u32, profile: CareProfile) -> Self {
        Self {
            id,
            name,
            age,
            admitted_at: Utc::now(),
            profile,
        }
    }

    pub fn id(&self) -> &PatientId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn admitted_at(&self) -> DateTime<Utc> {
        self.admitted_at
    }

    pub fn category(&self) -> Category {
        self.profile.category()
    }

    pub fn profile(&self) -> &CareProfile {
        &self.profile
    }

    /// Base treatment cost for this patient's category and attributes.
    pub fn base_cost(&self) -> Decimal {
        crate::billing::base_cost(&self.profile)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_age(&mut self, age: u32) {
        self.age = age;
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (ID: {}) | Age: {}",
            self.category(),
            self.name,
            self.id,
            self.age
        )?;
        match &self.profile {
            CareProfile::General { diagnosis } => write!(f, " | Diagnosis: {diagnosis}"),
            CareProfile::Emergency {
                emergency_type,
                severity,
            } => write!(
                f,
                " | Emergency: {emergency_type} | Severity: {severity}/{MAX_SEVERITY}"
            ),
            CareProfile::Icu {
                icu_days,
                requires_ventilator,
            } => write!(
                f,
                " | ICU Days: {icu_days} | Ventilator: {}",
                if *requires_ventilator { "Yes" } else { "No" }
            ),
        }
    }
}
