//! Interchangeable dispatch strategies sharing one stepping model.
//!
//! Every strategy walks the horizon once. At each step it looks at the net
//! load, decides to charge, discharge, or idle, and hands that decision to
//! [`run_horizon`], which applies power and SoC limits through [`Battery`]
//! and settles the residual against the grid with [`grid::settle`].

pub mod annealing;
pub mod battery;
pub mod deterministic;
pub mod grid;
pub mod qubo;
pub mod sampling;

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::DispatchError;
use crate::model::{Constraints, DispatchSchedule, DispatchStep, TimeSeries};

pub use annealing::AnnealingSolver;
pub use battery::Battery;
pub use deterministic::DeterministicSolver;
pub use sampling::SamplingSolver;

/// A dispatch strategy.
///
/// Implementations must never panic for validated inputs, must keep charge
/// and discharge mutually exclusive within a step, and must keep the state
/// of charge within `[socMin, socMax]`. Randomness comes only from `rng`.
pub trait Solver: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Produces a schedule with one step per series index.
    fn solve(
        &self,
        series: &TimeSeries,
        constraints: &Constraints,
        rng: &mut dyn RngCore,
    ) -> SolverOutput;
}

/// Schedule plus strategy-specific diagnostics from one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    pub schedule: DispatchSchedule,
    pub metadata: StrategyMetadata,
}

/// Registered strategy names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Deterministic,
    Annealing,
    Sampling,
}

impl StrategyKind {
    /// All strategies in registration order.
    pub const ALL: [Self; 3] = [Self::Deterministic, Self::Annealing, Self::Sampling];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deterministic => "deterministic",
            Self::Annealing => "annealing",
            Self::Sampling => "sampling",
        }
    }

    /// Whether the strategy consumes its random source.
    pub fn is_stochastic(self) -> bool {
        !matches!(self, Self::Deterministic)
    }

    /// Builds the solver for this strategy from engine configuration.
    pub fn build(self, config: &EngineConfig) -> Box<dyn Solver> {
        match self {
            Self::Deterministic => {
                Box::new(DeterministicSolver::new(config.deterministic.clone()))
            }
            Self::Annealing => Box::new(AnnealingSolver::new(
                config.deterministic.clone(),
                config.annealing.clone(),
            )),
            Self::Sampling => Box::new(SamplingSolver::new(config.sampling.clone())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| DispatchError::UnknownStrategy(s.to_string()))
    }
}

/// Strategy-specific diagnostics, tagged by strategy `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StrategyMetadata {
    Deterministic {
        low_price_threshold: f64,
        high_price_threshold: f64,
    },
    Annealing {
        /// Seed of the random source; filled in by the service.
        seed: Option<u64>,
        initial_temperature: f64,
        cooling_rate: f64,
        final_temperature: f64,
        /// Temperature at every step.
        cooling_schedule: Vec<f64>,
    },
    Sampling {
        /// Seed of the random source; filled in by the service.
        seed: Option<u64>,
        /// Two bits per step, charge bias then discharge bias.
        bit_pattern: String,
        /// QUBO energy of `bit_pattern`.
        qubo_energy: f64,
        phase_period: f64,
    },
}

impl StrategyMetadata {
    /// Records the seed that produced a stochastic solve.
    pub fn with_seed(mut self, value: u64) -> Self {
        match &mut self {
            Self::Annealing { seed, .. } | Self::Sampling { seed, .. } => *seed = Some(value),
            Self::Deterministic { .. } => {}
        }
        self
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Deterministic { .. } => StrategyKind::Deterministic,
            Self::Annealing { .. } => StrategyKind::Annealing,
            Self::Sampling { .. } => StrategyKind::Sampling,
        }
    }
}

/// What a strategy wants the battery to do at one step.
///
/// Magnitudes are requests; [`Battery::apply`] clamps them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Idle,
    Charge(f64),
    Discharge(f64),
}

impl Decision {
    fn setpoint(self) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::Charge(p) => p.max(0.0),
            Self::Discharge(p) => -p.max(0.0),
        }
    }
}

/// Walks the horizon once, asking `decide` for each step.
///
/// `decide` sees the step index and the battery before the step acts.
pub fn run_horizon<F>(
    series: &TimeSeries,
    constraints: &Constraints,
    mut decide: F,
) -> DispatchSchedule
where
    F: FnMut(usize, &Battery<'_>) -> Decision,
{
    let mut battery = Battery::new(constraints);
    let mut steps = Vec::with_capacity(series.len());

    for t in 0..series.len() {
        let decision = decide(t, &battery);
        let actual = battery.apply(decision.setpoint());
        let (charge, discharge) = if actual > 0.0 {
            (actual, 0.0)
        } else if actual < 0.0 {
            (0.0, -actual)
        } else {
            (0.0, 0.0)
        };

        let flow = grid::settle(
            series.generation()[t],
            series.load()[t],
            charge,
            discharge,
            constraints.export_cap(),
        );

        steps.push(DispatchStep {
            t,
            charge_power: charge,
            discharge_power: discharge,
            grid_import: flow.import,
            grid_export: flow.export,
            curtailment: flow.curtailment,
            state_of_charge: battery.soc(),
        });
    }

    DispatchSchedule::from_steps(steps)
}

/// The threshold rule shared by the deterministic and annealing strategies.
///
/// Charges from surplus generation when the price is below `low`, and
/// discharges into a deficit when the price is above `high`.
pub fn threshold_decision(
    price: f64,
    net_load: f64,
    low: f64,
    high: f64,
    battery: &Battery<'_>,
) -> Decision {
    if price < low && net_load < 0.0 && battery.charge_limit() > 0.0 {
        Decision::Charge(-net_load)
    } else if price > high && net_load > 0.0 && battery.discharge_limit() > 0.0 {
        Decision::Discharge(net_load)
    } else {
        Decision::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.as_str().parse::<StrategyKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert_eq!(
            "qaoa".parse::<StrategyKind>(),
            Err(DispatchError::UnknownStrategy("qaoa".into()))
        );
    }

    #[test]
    fn metadata_is_tagged_by_name() {
        let meta = StrategyMetadata::Sampling {
            seed: None,
            bit_pattern: "1001".into(),
            qubo_energy: -0.5,
            phase_period: 24.0,
        }
        .with_seed(7);
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["name"], "sampling");
        assert_eq!(json["seed"], 7);
        assert_eq!(json["bitPattern"], "1001");
    }

    #[test]
    fn deterministic_metadata_ignores_seed() {
        let meta = StrategyMetadata::Deterministic {
            low_price_threshold: 0.2,
            high_price_threshold: 0.3,
        };
        assert_eq!(meta.clone().with_seed(1), meta);
        assert_eq!(meta.kind(), StrategyKind::Deterministic);
    }

    #[test]
    fn decision_setpoint_never_flips_sign() {
        assert_eq!(Decision::Charge(-1.0).setpoint(), 0.0);
        assert_eq!(Decision::Discharge(2.0).setpoint(), -2.0);
        assert_eq!(Decision::Idle.setpoint(), 0.0);
    }
}
