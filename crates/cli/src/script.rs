//! Replay of admission and billing scripts.
//!
//! A script is a YAML document listing steps that run in order against a fresh registry:
//!
//! ```yaml
//! steps:
//!   - action: admit
//!     category: ICU
//!     name: Lakshmi
//!     age: 72
//!     attributes:
//!       icu_days: 2
//!       requires_ventilator: true
//!   - action: bill
//!     patient: P0001
//!     strategy: Government
//!   - action: update
//!     patient: P0001
//!     age: 73
//! ```
//!
//! A failing step is reported and the replay carries on with the next one.

use hospital_core::{
    standard_notifier, AdmissionAttributes, CoreConfig, CriticalAlertPolicy, ObserverError,
    Registry, STANDARD_DEPARTMENTS,
};
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Admit {
        category: String,
        name: String,
        age: u32,
        #[serde(default)]
        attributes: AdmissionAttributes,
    },
    Bill {
        patient: String,
        strategy: String,
    },
    Update {
        patient: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        age: Option<u32>,
    },
}

impl Script {
    pub fn parse(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }
}

/// Lines produced by a replay, in the order they happened.
#[derive(Debug, Default)]
pub struct Replay {
    pub lines: Vec<String>,
    pub failed_steps: usize,
}

type Board = Arc<Mutex<Vec<String>>>;

/// Takes every notice posted so far. A poisoned board still hands over its notices.
fn drain_board(board: &Board) -> Vec<String> {
    let mut notices = board.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::take(&mut *notices)
}

/// Subscribes console desks that write department notices onto `board`.
fn subscribe_console_desks(registry: &mut Registry, board: &Board) {
    for department in STANDARD_DEPARTMENTS {
        let board = Arc::clone(board);
        registry.notifier_mut().subscribe_fn(
            department.listens_to(),
            format!("{}-console", department.as_str().to_lowercase()),
            move |event| {
                let notice = department.acknowledge(event).ok_or_else(|| {
                    ObserverError::new(format!(
                        "{department} desk does not handle {} events",
                        event.kind()
                    ))
                })?;
                board
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(format!("  [{department}] {notice}"));
                Ok(())
            },
        );
    }
}

/// Builds the registry a replay runs against.
///
/// Department desks from the core log through `tracing`; the console desks added here
/// collect notices for printing.
pub fn replay_registry(cfg: Arc<CoreConfig>, board: &Board) -> Registry {
    let notifier = standard_notifier(CriticalAlertPolicy::from_config(&cfg));
    let mut registry = Registry::new(cfg, notifier);
    subscribe_console_desks(&mut registry, board);
    registry
}

/// Runs every step of `script` against a fresh registry.
pub fn replay(script: Script, cfg: Arc<CoreConfig>) -> Replay {
    let board: Board = Arc::new(Mutex::new(Vec::new()));
    let mut registry = replay_registry(cfg, &board);
    let mut out = Replay::default();

    for (index, step) in script.steps.into_iter().enumerate() {
        let step_no = index + 1;
        let result = match step {
            Step::Admit {
                category,
                name,
                age,
                attributes,
            } => registry
                .admit(&category, &name, age, attributes)
                .map(|p| format!("Patient Admitted: {p}")),
            Step::Bill { patient, strategy } => registry.bill(&patient, &strategy).map(|b| {
                format!(
                    "BILL: {} | Patient: {} | Base Cost: Rs.{:.2} | Strategy: {} | FINAL: Rs.{:.2}",
                    b.id(),
                    b.patient_name(),
                    b.base_cost(),
                    b.strategy().description(),
                    b.final_amount()
                )
            }),
            Step::Update { patient, name, age } => registry
                .update_patient(&patient, name.as_deref(), age)
                .map(|p| format!("Patient Updated: {p}")),
        };

        match result {
            Ok(summary) => {
                out.lines.push(format!("#{step_no} {summary}"));
                out.lines.extend(drain_board(&board));
            }
            Err(e) => {
                out.failed_steps += 1;
                out.lines.push(format!("#{step_no} Error: {e}"));
            }
        }
    }

    for failure in registry.take_delivery_failures() {
        out.lines.push(format!(
            "Notification failure: {} on {}: {}",
            failure.observer, failure.kind, failure.reason
        ));
    }

    out.lines.push(String::new());
    out.lines.push("=== ALL PATIENTS ===".into());
    let patients = registry.list_patients();
    if patients.is_empty() {
        out.lines.push("No patients yet.".into());
    }
    for patient in patients {
        out.lines.push(format!("{patient}"));
        out.lines
            .push(format!("  Base Cost: Rs.{:.2}", patient.base_cost()));
    }

    out.lines.push(String::new());
    out.lines.push("=== ALL BILLS ===".into());
    let bills = registry.list_bills();
    if bills.is_empty() {
        out.lines.push("No bills yet.".into());
    }
    for bill in bills {
        out.lines.push(bill.to_string());
    }

    out
}
