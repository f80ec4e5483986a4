use std::fmt;

use serde::{Deserialize, Serialize};

/// Battery and grid flows for one time index.
///
/// All flows are non-negative magnitudes. `charge_power` and
/// `discharge_power` are never both positive in a solver-produced step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchStep {
    /// Time index into the input series.
    pub t: usize,
    /// Energy drawn into the battery.
    pub charge_power: f64,
    /// Energy delivered by the battery.
    pub discharge_power: f64,
    /// Energy bought from the grid.
    pub grid_import: f64,
    /// Energy sold to the grid.
    pub grid_export: f64,
    /// Generation surplus dropped because of the export cap.
    #[serde(default)]
    pub curtailment: f64,
    /// State of charge after this step (fraction of capacity).
    pub state_of_charge: f64,
}

impl DispatchStep {
    /// An idle step with no flows at the given state of charge.
    pub fn idle(t: usize, state_of_charge: f64) -> Self {
        Self {
            t,
            charge_power: 0.0,
            discharge_power: 0.0,
            grid_import: 0.0,
            grid_export: 0.0,
            curtailment: 0.0,
            state_of_charge,
        }
    }

    /// Battery power in feeder convention (positive = charge, negative = discharge).
    pub fn battery_power(&self) -> f64 {
        self.charge_power - self.discharge_power
    }
}

impl fmt::Display for DispatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>3} | charge={:>6.3}  discharge={:>6.3} | import={:>6.3}  export={:>6.3}  \
             curtailed={:.3} | SoC={:.1}%",
            self.t,
            self.charge_power,
            self.discharge_power,
            self.grid_import,
            self.grid_export,
            self.curtailment,
            self.state_of_charge * 100.0,
        )
    }
}

/// The full per-step plan for one horizon.
///
/// Produced atomically by a single solver call and never mutated after
/// it is returned; a revision re-solves from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchSchedule {
    steps: Vec<DispatchStep>,
}

impl DispatchSchedule {
    /// Wraps a complete step sequence.
    ///
    /// Solvers build schedules through this; it is also public so callers
    /// can validate and evaluate schedules produced elsewhere.
    pub fn from_steps(steps: Vec<DispatchStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[DispatchStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DispatchStep> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a DispatchSchedule {
    type Item = &'a DispatchStep;
    type IntoIter = std::slice::Iter<'a, DispatchStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
