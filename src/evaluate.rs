//! Objective value, per-step energy balance, and summary KPIs.

use std::fmt;

use serde::Serialize;

use crate::model::{DispatchSchedule, TimeSeries};

/// Absolute tolerance of the per-step energy balance (energy units).
pub const BALANCE_TOLERANCE: f64 = 1e-3;

/// Net grid cost of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveResult {
    /// `Σ (import - export) * price`.
    pub net_cost: f64,
    /// `Σ import * price`.
    pub import_cost: f64,
    /// `Σ export * price`.
    pub export_revenue: f64,
}

/// Conservation check and grid cost for one step.
///
/// `supply = generation + discharge + import` must match
/// `demand = load + charge + export + curtailment` within
/// [`BALANCE_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyBalanceRecord {
    pub t: usize,
    pub supply: f64,
    pub demand: f64,
    /// `supply - demand`.
    pub residual: f64,
    pub balanced: bool,
    /// `(import - export) * price`; sums to the objective over the horizon.
    pub cost: f64,
}

/// Output of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub objective: ObjectiveResult,
    pub energy_balance: Vec<EnergyBalanceRecord>,
}

impl Evaluation {
    /// Steps whose balance is outside tolerance.
    pub fn imbalanced(&self) -> impl Iterator<Item = &EnergyBalanceRecord> {
        self.energy_balance.iter().filter(|r| !r.balanced)
    }
}

/// Computes net cost and the per-step energy balance.
///
/// Steps are paired with series indices by position; a schedule longer
/// than the series is evaluated over the common prefix only. Pure, so
/// repeated calls give identical results.
pub fn evaluate(schedule: &DispatchSchedule, series: &TimeSeries) -> Evaluation {
    let mut import_cost = 0.0;
    let mut export_revenue = 0.0;
    let mut energy_balance = Vec::with_capacity(schedule.len());

    for (t, step) in schedule.iter().enumerate().take(series.len()) {
        let price = series.price(t);
        let step_import = step.grid_import * price;
        let step_export = step.grid_export * price;
        import_cost += step_import;
        export_revenue += step_export;

        let supply = series.generation()[t] + step.discharge_power + step.grid_import;
        let demand = series.load()[t] + step.charge_power + step.grid_export + step.curtailment;
        let residual = supply - demand;

        energy_balance.push(EnergyBalanceRecord {
            t: step.t,
            supply,
            demand,
            residual,
            balanced: residual.abs() <= BALANCE_TOLERANCE,
            cost: step_import - step_export,
        });
    }

    Evaluation {
        objective: ObjectiveResult {
            net_cost: import_cost - export_revenue,
            import_cost,
            export_revenue,
        },
        energy_balance,
    }
}

/// Aggregate indicators derived from a complete schedule.
///
/// Computed post-hoc from the schedule so reported metrics always match
/// the step data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub steps: usize,
    pub net_cost: f64,
    pub total_import: f64,
    pub total_export: f64,
    pub total_curtailment: f64,
    /// Sum of charge and discharge energy.
    pub battery_throughput: f64,
    /// Throughput divided by twice the capacity.
    pub equivalent_full_cycles: f64,
    pub peak_import: f64,
    pub peak_export: f64,
    pub final_soc: f64,
    pub imbalanced_steps: usize,
}

impl DispatchSummary {
    /// # Arguments
    ///
    /// * `schedule` - Solved schedule
    /// * `evaluation` - Result of [`evaluate`] on the same schedule
    /// * `capacity` - Battery capacity for the cycle count
    pub fn new(schedule: &DispatchSchedule, evaluation: &Evaluation, capacity: f64) -> Self {
        let mut total_import = 0.0_f64;
        let mut total_export = 0.0_f64;
        let mut total_curtailment = 0.0_f64;
        let mut throughput = 0.0_f64;
        let mut peak_import = 0.0_f64;
        let mut peak_export = 0.0_f64;

        for step in schedule {
            total_import += step.grid_import;
            total_export += step.grid_export;
            total_curtailment += step.curtailment;
            throughput += step.charge_power + step.discharge_power;
            peak_import = peak_import.max(step.grid_import);
            peak_export = peak_export.max(step.grid_export);
        }

        let equivalent_full_cycles = if capacity > 0.0 {
            throughput / (2.0 * capacity)
        } else {
            0.0
        };

        Self {
            steps: schedule.len(),
            net_cost: evaluation.objective.net_cost,
            total_import,
            total_export,
            total_curtailment,
            battery_throughput: throughput,
            equivalent_full_cycles,
            peak_import,
            peak_export,
            final_soc: schedule.steps().last().map_or(0.0, |s| s.state_of_charge),
            imbalanced_steps: evaluation.imbalanced().count(),
        }
    }
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Dispatch Summary ---")?;
        writeln!(f, "Steps:                 {}", self.steps)?;
        writeln!(f, "Net cost:              {:.4}", self.net_cost)?;
        writeln!(
            f,
            "Grid import:           {:.3} (peak {:.3})",
            self.total_import, self.peak_import
        )?;
        writeln!(
            f,
            "Grid export:           {:.3} (peak {:.3})",
            self.total_export, self.peak_export
        )?;
        writeln!(f, "Curtailed:             {:.3}", self.total_curtailment)?;
        writeln!(
            f,
            "Battery throughput:    {:.3} ({:.2} equiv. cycles)",
            self.battery_throughput, self.equivalent_full_cycles
        )?;
        writeln!(f, "Final SoC:             {:.1}%", self.final_soc * 100.0)?;
        write!(f, "Imbalanced steps:      {}", self.imbalanced_steps)
    }
}
