//! Advisory feasibility check of a schedule against its constraints.

use std::fmt;

use serde::Serialize;

use crate::model::{Constraints, DispatchSchedule};

/// Slack allowed on every comparison to absorb floating-point noise.
pub const VALIDATION_EPSILON: f64 = 1e-9;

/// Which limit a step breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationField {
    ChargePower,
    DischargePower,
    StateOfChargeMin,
    StateOfChargeMax,
    /// Charge and discharge both positive in one step.
    MutualExclusion,
    GridExport,
    /// A flow that must be non-negative is negative.
    NegativeFlow,
}

impl ViolationField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChargePower => "chargePower",
            Self::DischargePower => "dischargePower",
            Self::StateOfChargeMin => "stateOfCharge(min)",
            Self::StateOfChargeMax => "stateOfCharge(max)",
            Self::MutualExclusion => "chargePower/dischargePower",
            Self::GridExport => "gridExport",
            Self::NegativeFlow => "flow",
        }
    }
}

/// One breached limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Step index.
    pub step: usize,
    pub field: ViolationField,
    /// Offending value.
    pub value: f64,
    /// Limit it was checked against.
    pub limit: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}: {} = {:.6} breaches limit {:.6}",
            self.step,
            self.field.as_str(),
            self.value,
            self.limit
        )
    }
}

/// Pass/fail plus every violation found, in step order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub satisfied: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// First violating step and field, for quick debugging.
    pub fn first_violation(&self) -> Option<&Violation> {
        self.violations.first()
    }
}

/// Checks every step's power limits, SoC bounds, mutual exclusion,
/// non-negative flows, and export cap.
///
/// Never mutates or rejects the schedule; the caller decides what a
/// failing report means.
pub fn validate(schedule: &DispatchSchedule, constraints: &Constraints) -> ValidationReport {
    let eps = VALIDATION_EPSILON;
    let mut violations = Vec::new();

    for step in schedule {
        let mut push = |field, value, limit| {
            violations.push(Violation {
                step: step.t,
                field,
                value,
                limit,
            });
        };

        if step.charge_power > constraints.max_charge_power() + eps {
            push(ViolationField::ChargePower, step.charge_power, constraints.max_charge_power());
        }
        if step.discharge_power > constraints.max_discharge_power() + eps {
            push(
                ViolationField::DischargePower,
                step.discharge_power,
                constraints.max_discharge_power(),
            );
        }
        if step.state_of_charge < constraints.soc_min() - eps {
            push(ViolationField::StateOfChargeMin, step.state_of_charge, constraints.soc_min());
        }
        if step.state_of_charge > constraints.soc_max() + eps {
            push(ViolationField::StateOfChargeMax, step.state_of_charge, constraints.soc_max());
        }
        if step.charge_power > eps && step.discharge_power > eps {
            push(ViolationField::MutualExclusion, step.discharge_power, 0.0);
        }
        if step.grid_export > constraints.export_cap() + eps {
            push(ViolationField::GridExport, step.grid_export, constraints.export_cap());
        }
        for value in [
            step.charge_power,
            step.discharge_power,
            step.grid_import,
            step.grid_export,
            step.curtailment,
        ] {
            if value < -eps {
                push(ViolationField::NegativeFlow, value, 0.0);
            }
        }
    }

    ValidationReport {
        satisfied: violations.is_empty(),
        violations,
    }
}
