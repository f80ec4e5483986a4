use rand::RngCore;

use super::{Solver, SolverOutput, StrategyKind, StrategyMetadata, run_horizon, threshold_decision};
use crate::config::DeterministicConfig;
use crate::model::{Constraints, TimeSeries};

/// Baseline threshold strategy.
///
/// Charges from surplus generation when prices are low, discharges into a
/// deficit when prices are high, idles otherwise. Same inputs always give
/// the same schedule; the random source is never touched.
#[derive(Debug, Clone, Default)]
pub struct DeterministicSolver {
    config: DeterministicConfig,
}

impl DeterministicSolver {
    pub fn new(config: DeterministicConfig) -> Self {
        Self { config }
    }
}

impl Solver for DeterministicSolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Deterministic
    }

    fn solve(
        &self,
        series: &TimeSeries,
        constraints: &Constraints,
        _rng: &mut dyn RngCore,
    ) -> SolverOutput {
        let low = self.config.low_price_threshold;
        let high = self.config.high_price_threshold;

        let schedule = run_horizon(series, constraints, |t, battery| {
            threshold_decision(series.price(t), series.net_load(t), low, high, battery)
        });

        SolverOutput {
            schedule,
            metadata: StrategyMetadata::Deterministic {
                low_price_threshold: low,
                high_price_threshold: high,
            },
        }
    }
}
