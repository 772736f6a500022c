//! Request and response bodies for the REST API.
//!
//! Monetary amounts are rendered as strings with two decimal places so that clients never
//! see floating-point rounding.

use chrono::SecondsFormat;
use hospital_core::{AdmissionAttributes, Bill, BillingStrategy, CareProfile, Decimal, Patient};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub(crate) fn money(amount: Decimal) -> String {
    format!("{amount:.2}")
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// Admission request. Category-specific attributes sit alongside the common fields; only the
/// ones belonging to `category` may be set. Unknown fields are rejected.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AdmitPatientReq {
    #[schema(example = "Emergency")]
    pub category: String,
    pub name: String,
    pub age: u32,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub emergency_type: Option<String>,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default)]
    pub icu_days: Option<i64>,
    #[serde(default)]
    pub requires_ventilator: Option<bool>,
}

impl AdmitPatientReq {
    pub(crate) fn attributes(&self) -> AdmissionAttributes {
        AdmissionAttributes {
            diagnosis: self.diagnosis.clone(),
            emergency_type: self.emergency_type.clone(),
            severity: self.severity,
            icu_days: self.icu_days,
            requires_ventilator: self.requires_ventilator,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePatientReq {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub category: String,
    pub admitted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icu_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_ventilator: Option<bool>,
    pub base_cost: String,
    pub summary: String,
}

impl From<&Patient> for PatientRes {
    fn from(patient: &Patient) -> Self {
        let mut res = PatientRes {
            id: patient.id().to_string(),
            name: patient.name().to_string(),
            age: patient.age(),
            category: patient.category().to_string(),
            admitted_at: patient
                .admitted_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            diagnosis: None,
            emergency_type: None,
            severity: None,
            icu_days: None,
            requires_ventilator: None,
            base_cost: money(patient.base_cost()),
            summary: patient.to_string(),
        };
        match patient.profile() {
            CareProfile::General { diagnosis } => res.diagnosis = Some(diagnosis.clone()),
            CareProfile::Emergency {
                emergency_type,
                severity,
            } => {
                res.emergency_type = Some(emergency_type.clone());
                res.severity = Some(*severity);
            }
            CareProfile::Icu {
                icu_days,
                requires_ventilator,
            } => {
                res.icu_days = Some(*icu_days);
                res.requires_ventilator = Some(*requires_ventilator);
            }
        }
        res
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientRes>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateBillReq {
    pub patient_id: String,
    #[schema(example = "Insured")]
    pub strategy: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BillRes {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub category: String,
    pub base_cost: String,
    pub strategy: String,
    pub strategy_description: String,
    pub final_amount: String,
    pub generated_at: String,
}

impl From<&Bill> for BillRes {
    fn from(bill: &Bill) -> Self {
        BillRes {
            id: bill.id().to_string(),
            patient_id: bill.patient_id().to_string(),
            patient_name: bill.patient_name().to_string(),
            category: bill.category().to_string(),
            base_cost: money(bill.base_cost()),
            strategy: bill.strategy_name().to_string(),
            strategy_description: bill.strategy().description().to_string(),
            final_amount: money(bill.final_amount()),
            generated_at: bill
                .generated_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListBillsRes {
    pub bills: Vec<BillRes>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StrategyRes {
    pub name: String,
    pub description: String,
    pub multiplier: String,
}

impl From<BillingStrategy> for StrategyRes {
    fn from(strategy: BillingStrategy) -> Self {
        StrategyRes {
            name: strategy.name().to_string(),
            description: strategy.description().to_string(),
            multiplier: money(strategy.multiplier()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListStrategiesRes {
    pub strategies: Vec<StrategyRes>,
}
