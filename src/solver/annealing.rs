use rand::{Rng, RngCore};

use super::{Solver, SolverOutput, StrategyKind, StrategyMetadata, run_horizon, threshold_decision};
use crate::config::{AnnealingConfig, DeterministicConfig};
use crate::model::{Constraints, TimeSeries};

/// Threshold strategy with a temperature-scaled random threshold offset.
///
/// Temperature cools exponentially across the horizon,
/// `T_t = T0 * cooling_rate^t`. At each step one offset `T_t * u`,
/// `u ~ U[-1, 1)`, shifts both price thresholds before the deterministic
/// rule is applied, so late steps converge toward the deterministic
/// schedule. Exactly one draw is consumed per step.
#[derive(Debug, Clone, Default)]
pub struct AnnealingSolver {
    thresholds: DeterministicConfig,
    config: AnnealingConfig,
}

impl AnnealingSolver {
    pub fn new(thresholds: DeterministicConfig, config: AnnealingConfig) -> Self {
        Self { thresholds, config }
    }

    /// Temperature at every step of an `n`-step horizon.
    pub fn cooling_schedule(&self, n: usize) -> Vec<f64> {
        let mut temperature = self.config.initial_temperature;
        let mut schedule = Vec::with_capacity(n);
        for _ in 0..n {
            schedule.push(temperature);
            temperature *= self.config.cooling_rate;
        }
        schedule
    }
}

impl Solver for AnnealingSolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Annealing
    }

    fn solve(
        &self,
        series: &TimeSeries,
        constraints: &Constraints,
        rng: &mut dyn RngCore,
    ) -> SolverOutput {
        let temperatures = self.cooling_schedule(series.len());
        let low = self.thresholds.low_price_threshold;
        let high = self.thresholds.high_price_threshold;

        let schedule = run_horizon(series, constraints, |t, battery| {
            let u: f64 = rng.random_range(-1.0..1.0);
            let offset = temperatures[t] * u;
            threshold_decision(
                series.price(t),
                series.net_load(t),
                low + offset,
                high + offset,
                battery,
            )
        });

        let final_temperature = temperatures
            .last()
            .copied()
            .unwrap_or(self.config.initial_temperature);

        SolverOutput {
            schedule,
            metadata: StrategyMetadata::Annealing {
                seed: None,
                initial_temperature: self.config.initial_temperature,
                cooling_rate: self.config.cooling_rate,
                final_temperature,
                cooling_schedule: temperatures,
            },
        }
    }
}
