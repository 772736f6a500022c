//! Event fan-out to observers.
//!
//! The [`Notifier`] delivers admission, critical-alert and billing events synchronously, in
//! registration order, to every observer subscribed for that [`EventKind`]. Each observer
//! receives its own view of an immutable snapshot and runs in isolation: an observer that
//! returns an error or panics is recorded in the [`DeliveryReport`] and the remaining
//! observers still run. Nothing an observer does can fail the operation that raised the
//! event.

use crate::billing::Bill;
use crate::config::CoreConfig;
use crate::constants::{DEFAULT_CRITICAL_SEVERITY_THRESHOLD, MAX_SEVERITY};
use crate::validation::validate_severity_threshold;
use crate::HospitalResult;
use crate::patient::{CareProfile, Patient};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

// ============================================================================
// EVENTS
// ============================================================================

/// Kinds of event an observer can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    AdmissionAnnounced,
    CriticalAlertRaised,
    BillGenerated,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::AdmissionAnnounced => "AdmissionAnnounced",
            EventKind::CriticalAlertRaised => "CriticalAlertRaised",
            EventKind::BillGenerated => "BillGenerated",
        };
        f.write_str(name)
    }
}

/// Payload delivered to observers.
#[derive(Clone, Debug, PartialEq)]
pub enum HospitalEvent {
    AdmissionAnnounced { patient: Patient },
    CriticalAlertRaised { patient: Patient, message: String },
    BillGenerated { bill: Bill },
}

impl HospitalEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HospitalEvent::AdmissionAnnounced { .. } => EventKind::AdmissionAnnounced,
            HospitalEvent::CriticalAlertRaised { .. } => EventKind::CriticalAlertRaised,
            HospitalEvent::BillGenerated { .. } => EventKind::BillGenerated,
        }
    }
}

// ============================================================================
// OBSERVERS
// ============================================================================

/// Failure reported by an observer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ObserverError(String);

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A handler registered with the [`Notifier`].
pub trait Observer: Send + Sync {
    /// Name used when reporting delivery failures.
    fn name(&self) -> &str;

    fn handle(&self, event: &HospitalEvent) -> Result<(), ObserverError>;
}

/// Adapts a closure into an [`Observer`].
pub struct FnObserver<F> {
    name: String,
    handler: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&HospitalEvent) -> Result<(), ObserverError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> Observer for FnObserver<F>
where
    F: Fn(&HospitalEvent) -> Result<(), ObserverError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, event: &HospitalEvent) -> Result<(), ObserverError> {
        (self.handler)(event)
    }
}

// ============================================================================
// CRITICAL ALERT POLICY
// ============================================================================

/// Decides which admissions additionally raise a critical alert.
///
/// An alert is raised for Emergency patients at or above the severity threshold and for ICU
/// patients who need a ventilator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CriticalAlertPolicy {
    severity_threshold: u8,
}

impl CriticalAlertPolicy {
    /// # Errors
    ///
    /// Returns [`crate::HospitalError::InvalidInput`] if the threshold is outside the
    /// severity scale.
    pub fn new(severity_threshold: u8) -> HospitalResult<Self> {
        validate_severity_threshold(severity_threshold)?;
        Ok(Self { severity_threshold })
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self {
            severity_threshold: cfg.critical_severity_threshold(),
        }
    }

    pub fn severity_threshold(&self) -> u8 {
        self.severity_threshold
    }

    /// Returns the alert message for `patient`, or `None` if no alert is warranted.
    pub fn assess(&self, patient: &Patient) -> Option<String> {
        match patient.profile() {
            CareProfile::Emergency { severity, .. } if *severity >= self.severity_threshold => {
                Some(format!("Critical - Severity {severity}/{MAX_SEVERITY}"))
            }
            CareProfile::Icu {
                requires_ventilator: true,
                ..
            } => Some("Ventilator support needed!".to_string()),
            _ => None,
        }
    }
}

impl Default for CriticalAlertPolicy {
    fn default() -> Self {
        Self {
            severity_threshold: DEFAULT_CRITICAL_SEVERITY_THRESHOLD,
        }
    }
}

// ============================================================================
// DELIVERY REPORTING
// ============================================================================

/// Handle returned by [`Notifier::subscribe`], used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SubscriptionId(u64);

/// One observer that failed to handle one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub subscription: SubscriptionId,
    pub observer: String,
    pub kind: EventKind,
    pub reason: String,
}

/// Outcome of announcing an event (and any follow-up events) to observers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Event kinds raised, in the order they were dispatched.
    pub raised: Vec<EventKind>,
    /// Number of successful observer invocations.
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn absorb(&mut self, other: DeliveryReport) {
        self.raised.extend(other.raised);
        self.delivered += other.delivered;
        self.failures.extend(other.failures);
    }
}

// ============================================================================
// NOTIFIER
// ============================================================================

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    observer: Box<dyn Observer>,
}

/// Synchronous event dispatcher.
pub struct Notifier {
    policy: CriticalAlertPolicy,
    subscriptions: Vec<Subscription>,
    next_subscription: u64,
}

impl Notifier {
    /// Creates a notifier with no observers.
    pub fn new(policy: CriticalAlertPolicy) -> Self {
        Self {
            policy,
            subscriptions: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn policy(&self) -> CriticalAlertPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: CriticalAlertPolicy) {
        self.policy = policy;
    }

    /// Registers `observer` for events of `kind`. Observers run in registration order.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        observer: impl Observer + 'static,
    ) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscriptions.push(Subscription {
            id,
            kind,
            observer: Box::new(observer),
        });
        id
    }

    /// Registers a closure for events of `kind`.
    pub fn subscribe_fn<F>(
        &mut self,
        kind: EventKind,
        name: impl Into<String>,
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(&HospitalEvent) -> Result<(), ObserverError> + Send + Sync + 'static,
    {
        self.subscribe(kind, FnObserver::new(name, handler))
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of observers subscribed to `kind`.
    pub fn observer_count(&self, kind: EventKind) -> usize {
        self.subscriptions.iter().filter(|s| s.kind == kind).count()
    }

    /// Announces an admission, followed by a critical alert when the policy calls for one.
    pub fn announce_admission(&self, patient: &Patient) -> DeliveryReport {
        let mut report = self.dispatch(&HospitalEvent::AdmissionAnnounced {
            patient: patient.clone(),
        });

        if let Some(message) = self.policy.assess(patient) {
            tracing::warn!("critical alert for {}: {}", patient.id(), message);
            report.absorb(self.dispatch(&HospitalEvent::CriticalAlertRaised {
                patient: patient.clone(),
                message,
            }));
        }

        report
    }

    pub fn announce_bill(&self, bill: &Bill) -> DeliveryReport {
        self.dispatch(&HospitalEvent::BillGenerated { bill: bill.clone() })
    }

    fn dispatch(&self, event: &HospitalEvent) -> DeliveryReport {
        let kind = event.kind();
        let mut report = DeliveryReport {
            raised: vec![kind],
            ..DeliveryReport::default()
        };

        for subscription in self.subscriptions.iter().filter(|s| s.kind == kind) {
            let outcome = catch_unwind(AssertUnwindSafe(|| subscription.observer.handle(event)));
            let reason = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(payload) => format!("observer panicked: {}", panic_message(&*payload)),
            };

            tracing::warn!(
                "observer '{}' failed to handle {}: {}",
                subscription.observer.name(),
                kind,
                reason
            );
            report.failures.push(DeliveryFailure {
                subscription: subscription.id,
                observer: subscription.observer.name().to_string(),
                kind,
                reason,
            });
        }

        report
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(CriticalAlertPolicy::default())
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("policy", &self.policy)
            .field(
                "subscriptions",
                &self
                    .subscriptions
                    .iter()
                    .map(|s| (s.id, s.kind, s.observer.name()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{IdSequence, PatientId};
    use std::sync::{Arc, Mutex};

    fn patient(profile: CareProfile) -> Patient {
        Patient::new(PatientId::from("P0001"), "Meera".into(), 45, profile)
    }

    fn emergency(severity: u8) -> Patient {
        patient(CareProfile::Emergency {
            emergency_type: "Cardiac".into(),
            severity,
        })
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &str) -> impl Observer + 'static {
        let log = Arc::clone(log);
        let label = label.to_string();
        FnObserver::new(label.clone(), move |event: &HospitalEvent| {
            log.lock().unwrap().push(format!("{label}:{}", event.kind()));
            Ok(())
        })
    }

    #[test]
    fn admission_reaches_observers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = Notifier::default();
        notifier.subscribe(EventKind::AdmissionAnnounced, recorder(&log, "reception"));
        notifier.subscribe(EventKind::AdmissionAnnounced, recorder(&log, "nursing"));
        notifier.subscribe(EventKind::BillGenerated, recorder(&log, "accounts"));

        let report = notifier.announce_admission(&patient(CareProfile::General {
            diagnosis: "Asthma".into(),
        }));

        assert_eq!(report.raised, vec![EventKind::AdmissionAnnounced]);
        assert_eq!(report.delivered, 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "reception:AdmissionAnnounced".to_string(),
                "nursing:AdmissionAnnounced".to_string()
            ]
        );
    }

    #[test]
    fn severe_emergency_raises_exactly_one_critical_alert() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = Notifier::default();
        notifier.subscribe(EventKind::CriticalAlertRaised, recorder(&log, "emergency"));

        let report = notifier.announce_admission(&emergency(5));
        assert_eq!(
            report.raised,
            vec![EventKind::AdmissionAnnounced, EventKind::CriticalAlertRaised]
        );
        assert_eq!(log.lock().unwrap().len(), 1);

        let report = notifier.announce_admission(&emergency(3));
        assert_eq!(report.raised, vec![EventKind::AdmissionAnnounced]);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn policy_messages_follow_profile() {
        let policy = CriticalAlertPolicy::default();
        assert_eq!(
            policy.assess(&emergency(4)).as_deref(),
            Some("Critical - Severity 4/5")
        );
        assert_eq!(
            policy
                .assess(&patient(CareProfile::Icu {
                    icu_days: 1,
                    requires_ventilator: true
                }))
                .as_deref(),
            Some("Ventilator support needed!")
        );
        assert_eq!(
            policy.assess(&patient(CareProfile::Icu {
                icu_days: 9,
                requires_ventilator: false
            })),
            None
        );
    }

    #[test]
    fn threshold_is_configurable() {
        let policy = CriticalAlertPolicy::new(2).unwrap();
        assert!(policy.assess(&emergency(2)).is_some());
        assert!(policy.assess(&emergency(1)).is_none());
    }

    #[test]
    fn threshold_off_the_severity_scale_is_rejected() {
        assert!(matches!(
            CriticalAlertPolicy::new(0),
            Err(crate::HospitalError::InvalidInput(_))
        ));
        assert!(CriticalAlertPolicy::new(6).is_err());
    }

    #[test]
    fn failing_observer_does_not_block_others() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = Notifier::default();
        let broken = notifier.subscribe_fn(EventKind::AdmissionAnnounced, "pharmacy", |_| {
            Err(ObserverError::new("formulary offline"))
        });
        notifier.subscribe_fn(
            EventKind::AdmissionAnnounced,
            "lab",
            |_| -> Result<(), ObserverError> { panic!("lab printer jammed") },
        );
        notifier.subscribe(EventKind::AdmissionAnnounced, recorder(&log, "nursing"));

        let report = notifier.announce_admission(&emergency(1));

        assert_eq!(report.delivered, 1);
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].subscription, broken);
        assert_eq!(report.failures[0].observer, "pharmacy");
        assert_eq!(report.failures[0].reason, "formulary offline");
        assert_eq!(report.failures[1].observer, "lab");
        assert_eq!(
            report.failures[1].reason,
            "observer panicked: lab printer jammed"
        );
    }

    #[test]
    fn unsubscribed_observers_stop_receiving_events() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = Notifier::default();
        let id = notifier.subscribe(EventKind::BillGenerated, recorder(&log, "accounts"));
        assert_eq!(notifier.observer_count(EventKind::BillGenerated), 1);

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        assert_eq!(notifier.observer_count(EventKind::BillGenerated), 0);

        let p = patient(CareProfile::General {
            diagnosis: "Sprain".into(),
        });
        let bill = Bill::issue(
            IdSequence::new("BILL-").next_bill_id(),
            &p,
            crate::billing::BillingStrategy::Standard,
        );
        let report = notifier.announce_bill(&bill);
        assert_eq!(report.raised, vec![EventKind::BillGenerated]);
        assert_eq!(report.delivered, 0);
        assert!(log.lock().unwrap().is_empty());
    }
}
