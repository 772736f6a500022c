//! Patient and bill registry.
//!
//! The [`Registry`] is the single owner of the patient and bill collections and of the
//! identifier sequences. Every mutation goes through `&mut self`, so inside one process the
//! borrow checker already serialises `admit` and `bill`; callers sharing a registry across
//! threads wrap it in one lock that guards both collections together.
//!
//! Operations validate first and only then touch state: a failed `admit` or `bill` leaves
//! the collections and identifier sequences exactly as they were. Notifications go out
//! after the record is stored, and observer failures are logged and kept in
//! [`Registry::delivery_failures`] instead of being returned to the caller.

use crate::billing::{Bill, BillingStrategy};
use crate::config::CoreConfig;
use crate::ids::{IdSequence, PatientId};
use crate::notifier::{CriticalAlertPolicy, DeliveryFailure, DeliveryReport, Notifier};
use crate::patient::{AdmissionAttributes, CareProfile, Category, Patient};
use crate::validation::require_text;
use crate::{HospitalError, HospitalResult};
use std::sync::Arc;

/// In-memory registry of patients and bills.
#[derive(Debug)]
pub struct Registry {
    cfg: Arc<CoreConfig>,
    patients: Vec<Patient>,
    bills: Vec<Bill>,
    patient_ids: IdSequence,
    bill_ids: IdSequence,
    notifier: Notifier,
    delivery_failures: Vec<DeliveryFailure>,
}

impl Registry {
    /// Creates an empty registry that announces events through `notifier`.
    ///
    /// The notifier's critical-alert policy is replaced by the one `cfg` describes.
    pub fn new(cfg: Arc<CoreConfig>, mut notifier: Notifier) -> Self {
        notifier.set_policy(CriticalAlertPolicy::from_config(&cfg));
        Self {
            patient_ids: IdSequence::new(cfg.patient_id_prefix()),
            bill_ids: IdSequence::new(cfg.bill_id_prefix()),
            cfg,
            patients: Vec::new(),
            bills: Vec::new(),
            notifier,
            delivery_failures: Vec::new(),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Admits a new patient.
    ///
    /// # Arguments
    ///
    /// * `category` - Category name (`General`, `Emergency` or `ICU`, any case).
    /// * `name` - Patient name; surrounding whitespace is trimmed.
    /// * `age` - Age in years.
    /// * `attributes` - Category-specific attributes, see [`CareProfile::from_attributes`].
    ///
    /// # Returns
    ///
    /// A snapshot of the admitted patient, carrying its newly issued identifier.
    ///
    /// # Errors
    ///
    /// - [`HospitalError::InvalidCategory`] if `category` is not a known category.
    /// - [`HospitalError::InvalidAttribute`] if the name is blank or the attributes do not
    ///   fit the category.
    pub fn admit(
        &mut self,
        category: &str,
        name: &str,
        age: u32,
        attributes: AdmissionAttributes,
    ) -> HospitalResult<Patient> {
        let category: Category = category.parse()?;
        let name = require_text("name", name)?;
        let profile = CareProfile::from_attributes(category, attributes)?;

        let patient = Patient::new(self.patient_ids.next_patient_id(), name, age, profile);
        self.patient_ids.advance();
        self.patients.push(patient.clone());

        tracing::info!("admitted {} ({})", patient.id(), patient.category());

        let report = self.notifier.announce_admission(&patient);
        self.record_delivery(report);

        Ok(patient)
    }

    /// Issues a bill for a patient under the named strategy.
    ///
    /// # Errors
    ///
    /// - [`HospitalError::UnknownStrategy`] if `strategy_name` is not a registered strategy.
    /// - [`HospitalError::PatientNotFound`] if no patient has the given identifier.
    ///
    /// On error no bill is stored and no bill identifier is consumed.
    pub fn bill(&mut self, patient_id: &str, strategy_name: &str) -> HospitalResult<Bill> {
        let strategy: BillingStrategy = strategy_name.parse()?;
        let patient = self.find(patient_id)?;

        let bill = Bill::issue(self.bill_ids.next_bill_id(), patient, strategy);
        self.bill_ids.advance();
        self.bills.push(bill.clone());

        tracing::info!(
            "issued {} for {} under {}: {:.2}",
            bill.id(),
            bill.patient_id(),
            bill.strategy(),
            bill.final_amount()
        );

        let report = self.notifier.announce_bill(&bill);
        self.record_delivery(report);

        Ok(bill)
    }

    /// All patients in admission order.
    pub fn list_patients(&self) -> Vec<Patient> {
        self.patients.clone()
    }

    /// All bills in issue order.
    pub fn list_bills(&self) -> Vec<Bill> {
        self.bills.clone()
    }

    /// Looks up one patient.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::PatientNotFound`] if no patient has the given identifier.
    pub fn patient(&self, patient_id: &str) -> HospitalResult<Patient> {
        self.find(patient_id).cloned()
    }

    /// Bills issued for one patient, in issue order.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::PatientNotFound`] if no patient has the given identifier.
    pub fn bills_for_patient(&self, patient_id: &str) -> HospitalResult<Vec<Bill>> {
        let id = self.find(patient_id)?.id().clone();
        Ok(self
            .bills
            .iter()
            .filter(|b| *b.patient_id() == id)
            .cloned()
            .collect())
    }

    /// Updates a patient's descriptive fields. Category and care profile never change.
    ///
    /// Fields passed as `None` are left as they are. Existing bills keep the name they were
    /// issued under.
    ///
    /// # Errors
    ///
    /// - [`HospitalError::PatientNotFound`] if no patient has the given identifier.
    /// - [`HospitalError::InvalidAttribute`] if `name` is blank.
    pub fn update_patient(
        &mut self,
        patient_id: &str,
        name: Option<&str>,
        age: Option<u32>,
    ) -> HospitalResult<Patient> {
        let name = name.map(|n| require_text("name", n)).transpose()?;

        let wanted = PatientId::from(patient_id);
        let patient = self
            .patients
            .iter_mut()
            .find(|p| *p.id() == wanted)
            .ok_or_else(|| HospitalError::PatientNotFound(wanted.to_string()))?;

        if let Some(name) = name {
            patient.set_name(name);
        }
        if let Some(age) = age {
            patient.set_age(age);
        }

        tracing::info!("updated demographics for {}", patient.id());
        Ok(patient.clone())
    }

    /// The notifier, for subscribing and unsubscribing observers.
    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Observer failures collected while announcing admissions and bills.
    pub fn delivery_failures(&self) -> &[DeliveryFailure] {
        &self.delivery_failures
    }

    /// Drains the collected observer failures.
    pub fn take_delivery_failures(&mut self) -> Vec<DeliveryFailure> {
        std::mem::take(&mut self.delivery_failures)
    }

    fn find(&self, patient_id: &str) -> HospitalResult<&Patient> {
        let wanted = PatientId::from(patient_id);
        self.patients
            .iter()
            .find(|p| *p.id() == wanted)
            .ok_or_else(|| HospitalError::PatientNotFound(wanted.to_string()))
    }

    fn record_delivery(&mut self, report: DeliveryReport) {
        self.delivery_failures.extend(report.failures);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(CoreConfig::default()), Notifier::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{EventKind, HospitalEvent, ObserverError};
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn registry() -> Registry {
        Registry::default()
    }

    fn admit_general(registry: &mut Registry, name: &str) -> Patient {
        registry
            .admit("General", name, 30, AdmissionAttributes::general("Fever"))
            .expect("valid admission")
    }

    #[test]
    fn ids_are_unique_and_issued_in_order() {
        let mut registry = registry();
        let ids: Vec<String> = (0..5)
            .map(|i| admit_general(&mut registry, &format!("Patient {i}")).id().to_string())
            .collect();

        assert_eq!(ids, vec!["P0001", "P0002", "P0003", "P0004", "P0005"]);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn failed_admission_does_not_consume_an_id() {
        let mut registry = registry();
        let err = registry
            .admit("Outpatient", "Anil", 40, AdmissionAttributes::default())
            .expect_err("invalid category");
        assert_eq!(err, HospitalError::InvalidCategory("Outpatient".into()));

        let err = registry
            .admit("ICU", "Anil", 40, AdmissionAttributes::icu(-3, true))
            .expect_err("negative days");
        assert!(matches!(err, HospitalError::InvalidAttribute(_)));

        let err = registry
            .admit("General", "   ", 40, AdmissionAttributes::general("Cough"))
            .expect_err("blank name");
        assert!(matches!(err, HospitalError::InvalidAttribute(_)));

        assert!(registry.list_patients().is_empty());
        assert_eq!(admit_general(&mut registry, "Anil").id().as_str(), "P0001");
    }

    #[test]
    fn icu_bill_under_government_strategy() {
        let mut registry = registry();
        let patient = registry
            .admit("icu", "Lakshmi", 72, AdmissionAttributes::icu(2, true))
            .unwrap();

        let bill = registry.bill(patient.id().as_str(), "Government").unwrap();
        assert_eq!(bill.base_cost(), Decimal::from(56000));
        assert_eq!(bill.final_amount(), Decimal::from(5600));
        assert_eq!(bill.id().as_str(), "BILL-0001");
    }

    #[test]
    fn unknown_strategy_produces_no_bill() {
        let mut registry = registry();
        let patient = admit_general(&mut registry, "Farah");
        registry.bill(patient.id().as_str(), "Standard").unwrap();

        let err = registry
            .bill(patient.id().as_str(), "Platinum")
            .expect_err("unknown strategy");
        assert_eq!(err, HospitalError::UnknownStrategy("Platinum".into()));
        assert_eq!(registry.list_bills().len(), 1);

        let next = registry.bill(patient.id().as_str(), "Insured").unwrap();
        assert_eq!(next.id().as_str(), "BILL-0002");
    }

    #[test]
    fn billing_unknown_patient_fails() {
        let mut registry = registry();
        let err = registry.bill("P9999", "Standard").expect_err("no such patient");
        assert_eq!(err, HospitalError::PatientNotFound("P9999".into()));
        assert!(registry.list_bills().is_empty());
    }

    #[test]
    fn strategy_is_checked_before_patient() {
        let mut registry = registry();
        let err = registry.bill("P9999", "Bogus").expect_err("both invalid");
        assert!(matches!(err, HospitalError::UnknownStrategy(_)));
    }

    #[test]
    fn list_bills_matches_returned_bills_in_call_order() {
        let mut registry = registry();
        let a = admit_general(&mut registry, "Arjun");
        let b = registry
            .admit("Emergency", "Bela", 55, AdmissionAttributes::emergency("Burns", 2))
            .unwrap();

        let issued = vec![
            registry.bill(a.id().as_str(), "Standard").unwrap(),
            registry.bill(b.id().as_str(), "SeniorCitizen").unwrap(),
            registry.bill(a.id().as_str(), "Insured").unwrap(),
        ];

        assert_eq!(registry.list_bills(), issued);
        assert_eq!(
            registry.bills_for_patient(a.id().as_str()).unwrap(),
            vec![issued[0].clone(), issued[2].clone()]
        );
    }

    #[test]
    fn emergency_admission_alerts_depend_on_severity() {
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let admissions = Arc::new(Mutex::new(0usize));
        let mut registry = registry();
        {
            let alerts = Arc::clone(&alerts);
            registry.notifier_mut().subscribe_fn(
                EventKind::CriticalAlertRaised,
                "alerts",
                move |event| {
                    if let HospitalEvent::CriticalAlertRaised { message, .. } = event {
                        alerts.lock().unwrap().push(message.clone());
                    }
                    Ok(())
                },
            );
            let admissions = Arc::clone(&admissions);
            registry.notifier_mut().subscribe_fn(
                EventKind::AdmissionAnnounced,
                "admissions",
                move |_| {
                    *admissions.lock().unwrap() += 1;
                    Ok(())
                },
            );
        }

        registry
            .admit("Emergency", "Devi", 28, AdmissionAttributes::emergency("Trauma", 5))
            .unwrap();
        assert_eq!(*alerts.lock().unwrap(), vec!["Critical - Severity 5/5".to_string()]);

        registry
            .admit("Emergency", "Esha", 31, AdmissionAttributes::emergency("Sprain", 3))
            .unwrap();
        assert_eq!(alerts.lock().unwrap().len(), 1);
        assert_eq!(*admissions.lock().unwrap(), 2);
    }

    #[test]
    fn observer_failures_are_collected_not_returned() {
        let mut registry = registry();
        registry
            .notifier_mut()
            .subscribe_fn(EventKind::AdmissionAnnounced, "pager", |_| {
                Err(ObserverError::new("pager offline"))
            });

        let patient = admit_general(&mut registry, "Gita");
        assert_eq!(registry.list_patients(), vec![patient]);
        assert_eq!(registry.delivery_failures().len(), 1);
        assert_eq!(registry.delivery_failures()[0].observer, "pager");

        let drained = registry.take_delivery_failures();
        assert_eq!(drained.len(), 1);
        assert!(registry.delivery_failures().is_empty());
    }

    #[test]
    fn update_patient_changes_demographics_only() {
        let mut registry = registry();
        let patient = registry
            .admit("Emergency", "Hari", 50, AdmissionAttributes::emergency("Fall", 2))
            .unwrap();
        let bill = registry.bill(patient.id().as_str(), "Standard").unwrap();

        let updated = registry
            .update_patient(patient.id().as_str(), Some(" Hari Prasad "), Some(51))
            .unwrap();
        assert_eq!(updated.name(), "Hari Prasad");
        assert_eq!(updated.age(), 51);
        assert_eq!(updated.profile(), patient.profile());
        assert_eq!(updated.admitted_at(), patient.admitted_at());

        assert_eq!(registry.patient(patient.id().as_str()).unwrap(), updated);
        assert_eq!(registry.list_bills()[0].patient_name(), bill.patient_name());
    }

    #[test]
    fn update_patient_validates_input() {
        let mut registry = registry();
        let patient = admit_general(&mut registry, "Indu");

        let err = registry
            .update_patient(patient.id().as_str(), Some(""), None)
            .expect_err("blank name");
        assert!(matches!(err, HospitalError::InvalidAttribute(_)));

        let err = registry
            .update_patient("P0042", None, Some(3))
            .expect_err("unknown patient");
        assert_eq!(err, HospitalError::PatientNotFound("P0042".into()));
    }

    #[test]
    fn custom_prefixes_are_used() {
        let cfg = Arc::new(CoreConfig::new(4, "ER".into(), "INV".into()).unwrap());
        let mut registry = Registry::new(cfg, Notifier::default());
        let patient = admit_general(&mut registry, "Jaya");
        let bill = registry.bill("ER0001", "Standard").unwrap();
        assert_eq!(patient.id().as_str(), "ER0001");
        assert_eq!(bill.id().as_str(), "INV0001");
    }

    #[test]
    fn alert_threshold_comes_from_config() {
        let cfg = Arc::new(CoreConfig::new(2, "P".into(), "BILL-".into()).unwrap());
        let mut registry = Registry::new(cfg, Notifier::default());
        assert_eq!(registry.notifier().policy().severity_threshold(), 2);

        let alerts = Arc::new(Mutex::new(Vec::new()));
        {
            let alerts = Arc::clone(&alerts);
            registry.notifier_mut().subscribe_fn(
                EventKind::CriticalAlertRaised,
                "pager",
                move |event| {
                    if let HospitalEvent::CriticalAlertRaised { message, .. } = event {
                        alerts.lock().unwrap().push(message.clone());
                    }
                    Ok(())
                },
            );
        }

        registry
            .admit("Emergency", "Kiran", 40, AdmissionAttributes::emergency("Burns", 3))
            .unwrap();
        registry
            .admit("Emergency", "Lata", 22, AdmissionAttributes::emergency("Sprain", 1))
            .unwrap();
        assert_eq!(*alerts.lock().unwrap(), vec!["Critical - Severity 3/5".to_string()]);
    }
}
