//! Cost policy and bills.
//!
//! Everything in this module is a pure function of its inputs. The base treatment cost is
//! derived from a patient's [`CareProfile`]; a named [`BillingStrategy`] then turns the base
//! cost into the billed amount.
//!
//! | Category  | Base cost                                           |
//! |-----------|-----------------------------------------------------|
//! | General   | 5000                                                |
//! | Emergency | 15000 + severity × 2000                             |
//! | ICU       | 25000 + days × 8000, plus 15000 with a ventilator   |
//!
//! | Strategy      | Multiplier |
//! |---------------|------------|
//! | Standard      | 1.00       |
//! | Insured       | 0.20       |
//! | SeniorCitizen | 0.70       |
//! | Government    | 0.10       |

use crate::constants::{
    EMERGENCY_BASE_COST, EMERGENCY_COST_PER_SEVERITY, GENERAL_FLAT_COST, ICU_BASE_COST,
    ICU_COST_PER_DAY, ICU_VENTILATOR_SURCHARGE,
};
use crate::ids::{BillId, PatientId};
use crate::patient::{CareProfile, Category, Patient};
use crate::{HospitalError, HospitalResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Base treatment cost for a care profile.
pub fn base_cost(profile: &CareProfile) -> Decimal {
    match profile {
        CareProfile::General { .. } => Decimal::from(GENERAL_FLAT_COST),
        CareProfile::Emergency { severity, .. } => {
            Decimal::from(EMERGENCY_BASE_COST)
                + Decimal::from(*severity) * Decimal::from(EMERGENCY_COST_PER_SEVERITY)
        }
        CareProfile::Icu {
            icu_days,
            requires_ventilator,
        } => {
            let cost = Decimal::from(ICU_BASE_COST)
                + Decimal::from(*icu_days) * Decimal::from(ICU_COST_PER_DAY);
            if *requires_ventilator {
                cost + Decimal::from(ICU_VENTILATOR_SURCHARGE)
            } else {
                cost
            }
        }
    }
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// Closed set of named billing strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingStrategy {
    Standard,
    Insured,
    SeniorCitizen,
    Government,
}

impl BillingStrategy {
    pub const ALL: [BillingStrategy; 4] = [
        BillingStrategy::Standard,
        BillingStrategy::Insured,
        BillingStrategy::SeniorCitizen,
        BillingStrategy::Government,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BillingStrategy::Standard => "Standard",
            BillingStrategy::Insured => "Insured",
            BillingStrategy::SeniorCitizen => "SeniorCitizen",
            BillingStrategy::Government => "Government",
        }
    }

    /// Human-readable label shown on bills.
    pub fn description(&self) -> &'static str {
        match self {
            BillingStrategy::Standard => "Standard (No discount)",
            BillingStrategy::Insured => "Insured (80% coverage)",
            BillingStrategy::SeniorCitizen => "Senior Citizen (30% discount)",
            BillingStrategy::Government => "Government (90% subsidy)",
        }
    }

    /// Fraction of the base cost the patient is billed.
    pub fn multiplier(&self) -> Decimal {
        match self {
            BillingStrategy::Standard => Decimal::ONE,
            BillingStrategy::Insured => Decimal::new(20, 2),
            BillingStrategy::SeniorCitizen => Decimal::new(70, 2),
            BillingStrategy::Government => Decimal::new(10, 2),
        }
    }

    pub fn apply(&self, base_cost: Decimal) -> Decimal {
        base_cost * self.multiplier()
    }
}

impl fmt::Display for BillingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BillingStrategy {
    type Err = HospitalError;

    /// Matches strategy names case-insensitively, ignoring `-`, `_` and spaces, so
    /// `"senior-citizen"` and `"SeniorCitizen"` are the same strategy.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalise(s);
        BillingStrategy::ALL
            .into_iter()
            .find(|strategy| normalise(strategy.name()) == wanted)
            .ok_or_else(|| HospitalError::UnknownStrategy(s.trim().to_string()))
    }
}

fn normalise(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Applies the strategy registered under `strategy_name` to `base_cost`.
///
/// # Errors
///
/// Returns [`HospitalError::UnknownStrategy`] if no strategy has that name.
pub fn apply_strategy(strategy_name: &str, base_cost: Decimal) -> HospitalResult<Decimal> {
    let strategy: BillingStrategy = strategy_name.parse()?;
    Ok(strategy.apply(base_cost))
}

// ============================================================================
// QUOTES & BILLS
// ============================================================================

/// Cost of treating a profile under a strategy, without issuing a bill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub category: Category,
    pub base_cost: Decimal,
    pub strategy: BillingStrategy,
    pub final_amount: Decimal,
}

/// Prices `profile` under the named strategy.
///
/// # Errors
///
/// Returns [`HospitalError::UnknownStrategy`] if no strategy has that name.
pub fn quote(profile: &CareProfile, strategy_name: &str) -> HospitalResult<Quote> {
    let strategy: BillingStrategy = strategy_name.parse()?;
    let base_cost = base_cost(profile);
    Ok(Quote {
        category: profile.category(),
        base_cost,
        strategy,
        final_amount: strategy.apply(base_cost),
    })
}

/// An issued bill. Bills are created only by the registry and never change afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    id: BillId,
    patient_id: PatientId,
    patient_name: String,
    category: Category,
    base_cost: Decimal,
    strategy: BillingStrategy,
    final_amount: Decimal,
    generated_at: DateTime<Utc>,
}

impl Bill {
    pub(crate) fn issue(id: BillId, patient: &Patient, strategy: BillingStrategy) -> Self {
        let base_cost = patient.base_cost();
        Self {
            id,
            patient_id: patient.id().clone(),
            patient_name: patient.name().to_string(),
            category: patient.category(),
            base_cost,
            strategy,
            final_amount: strategy.apply(base_cost),
            generated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &BillId {
        &self.id
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    /// Patient name as it was when the bill was issued.
    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn base_cost(&self) -> Decimal {
        self.base_cost
    }

    pub fn strategy(&self) -> BillingStrategy {
        self.strategy
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn final_amount(&self) -> Decimal {
        self.final_amount
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

impl fmt::Display for Bill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | Rs.{:.2}",
            self.id,
            self.patient_name,
            self.strategy.description(),
            self.final_amount
        )
    }
}
