//! Hospital department desks.
//!
//! Each desk is an [`Observer`] that acknowledges the events its department cares about by
//! writing a structured log line. [`standard_notifier`] wires the usual desks:
//!
//! | Event               | Desks                        |
//! |---------------------|------------------------------|
//! | AdmissionAnnounced  | Reception, Nursing, Pharmacy |
//! | CriticalAlertRaised | Emergency                    |
//! | BillGenerated       | Accounts                     |

use crate::notifier::{
    CriticalAlertPolicy, EventKind, HospitalEvent, Notifier, Observer, ObserverError,
};
use std::fmt;

/// Departments that receive hospital notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Department {
    Reception,
    Nursing,
    Pharmacy,
    Accounts,
    Emergency,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Reception => "RECEPTION",
            Department::Nursing => "NURSING",
            Department::Pharmacy => "PHARMACY",
            Department::Accounts => "ACCOUNTS",
            Department::Emergency => "EMERGENCY",
        }
    }

    /// The event this department's desk listens for.
    pub fn listens_to(&self) -> EventKind {
        match self {
            Department::Reception | Department::Nursing | Department::Pharmacy => {
                EventKind::AdmissionAnnounced
            }
            Department::Accounts => EventKind::BillGenerated,
            Department::Emergency => EventKind::CriticalAlertRaised,
        }
    }

    /// The acknowledgement this department gives for `event`, if it handles that event.
    pub fn acknowledge(&self, event: &HospitalEvent) -> Option<String> {
        let text = match (self, event) {
            (Department::Reception, HospitalEvent::AdmissionAnnounced { patient }) => {
                format!("New admission: {}", patient.name())
            }
            (Department::Nursing, HospitalEvent::AdmissionAnnounced { patient }) => {
                format!("Bed prepared for: {}", patient.name())
            }
            (Department::Pharmacy, HospitalEvent::AdmissionAnnounced { patient }) => {
                format!("Medication requested for: {}", patient.name())
            }
            (Department::Accounts, HospitalEvent::BillGenerated { bill }) => {
                format!("Bill generated - Rs.{:.2}", bill.final_amount())
            }
            (Department::Emergency, HospitalEvent::CriticalAlertRaised { message, .. }) => {
                format!("ALERT: {message}")
            }
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer that logs a department's acknowledgement of each event it receives.
#[derive(Clone, Debug)]
pub struct DepartmentDesk {
    department: Department,
    name: String,
}

impl DepartmentDesk {
    pub fn new(department: Department) -> Self {
        Self {
            department,
            name: department.as_str().to_lowercase(),
        }
    }

    pub fn department(&self) -> Department {
        self.department
    }
}

impl Observer for DepartmentDesk {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, event: &HospitalEvent) -> Result<(), ObserverError> {
        let text = self.department.acknowledge(event).ok_or_else(|| {
            ObserverError::new(format!(
                "{} desk does not handle {} events",
                self.department,
                event.kind()
            ))
        })?;
        tracing::info!("[{}] {}", self.department, text);
        Ok(())
    }
}

/// All departments in the order their desks are subscribed.
pub const STANDARD_DEPARTMENTS: [Department; 5] = [
    Department::Reception,
    Department::Nursing,
    Department::Pharmacy,
    Department::Accounts,
    Department::Emergency,
];

/// A notifier with every department desk subscribed to its event.
pub fn standard_notifier(policy: CriticalAlertPolicy) -> Notifier {
    let mut notifier = Notifier::new(policy);
    for department in STANDARD_DEPARTMENTS {
        notifier.subscribe(department.listens_to(), DepartmentDesk::new(department));
    }
    notifier
}
