//! # Hospital Core
//!
//! Core business logic for hospital admissions and billing.
//!
//! This crate contains pure, in-memory operations:
//! - [`Registry`]: admits patients, issues bills, hands out identifiers
//! - [`billing`]: base treatment cost per category and the named billing strategies
//! - [`Notifier`]: synchronous fan-out of admission, critical-alert and billing events
//!
//! **No API concerns**: HTTP servers, request parsing and console output belong in
//! `api-rest` and `hospital-cli`.

pub mod billing;
pub mod config;
pub mod constants;
pub mod departments;
pub mod error;
pub mod ids;
pub mod notifier;
pub mod patient;
pub mod registry;
pub mod validation;

pub use billing::{apply_strategy, base_cost, quote, Bill, BillingStrategy, Quote};
pub use config::CoreConfig;
pub use departments::{standard_notifier, Department, DepartmentDesk, STANDARD_DEPARTMENTS};
pub use error::{HospitalError, HospitalResult};
pub use ids::{BillId, PatientId};
pub use notifier::{
    CriticalAlertPolicy, DeliveryFailure, DeliveryReport, EventKind, FnObserver, HospitalEvent,
    Notifier, Observer, ObserverError, SubscriptionId,
};
pub use patient::{AdmissionAttributes, CareProfile, Category, Patient};
pub use registry::Registry;

pub use rust_decimal::Decimal;
