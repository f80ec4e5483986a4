use std::f64::consts::TAU;

use rand::{Rng, RngCore};

use super::qubo::{BitPattern, DispatchQubo, StepBits};
use super::{Decision, Solver, SolverOutput, StrategyKind, StrategyMetadata, run_horizon};
use crate::config::SamplingConfig;
use crate::model::{Constraints, TimeSeries};

/// Seeded heuristic sampler.
///
/// Draws an independent charge-bias and discharge-bias bit per step. Cheap
/// steps favour the charge bit and expensive steps the discharge bit, via
/// the min-max normalized price `z_t`. A step acts only when exactly one
/// bit is set; its magnitude is scaled by a sinusoidal phase term, so the
/// sampler reaches schedules a pure threshold rule would not (grid
/// charging, partial moves). Exactly two draws are consumed per step.
#[derive(Debug, Clone, Default)]
pub struct SamplingSolver {
    config: SamplingConfig,
}

impl SamplingSolver {
    pub fn new(config: SamplingConfig) -> Self {
        Self { config }
    }

    /// Magnitude factor at step `t`, in `[min_magnitude, 1]`.
    pub fn phase(&self, t: usize) -> f64 {
        let m = self.config.min_magnitude;
        let wave = 0.5 * (1.0 + (TAU * t as f64 / self.config.phase_period).sin());
        m + (1.0 - m) * wave
    }
}

/// Min-max normalized price within `(lo, hi)`; 0.5 for a flat price curve.
fn normalized_price(price: f64, (lo, hi): (f64, f64)) -> f64 {
    let span = hi - lo;
    if !span.is_finite() || span <= f64::EPSILON {
        0.5
    } else {
        ((price - lo) / span).clamp(0.0, 1.0)
    }
}

impl Solver for SamplingSolver {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sampling
    }

    fn solve(
        &self,
        series: &TimeSeries,
        constraints: &Constraints,
        rng: &mut dyn RngCore,
    ) -> SolverOutput {
        let mut pattern = Vec::with_capacity(series.len());
        let range = series.price_range();

        let schedule = run_horizon(series, constraints, |t, _battery| {
            let z = normalized_price(series.price(t), range);
            let bits = StepBits {
                charge: rng.random_bool(1.0 - z),
                discharge: rng.random_bool(z),
            };
            pattern.push(bits);

            let phase = self.phase(t);
            match (bits.charge, bits.discharge) {
                (true, false) => Decision::Charge(constraints.max_charge_power() * phase),
                (false, true) => {
                    let deficit = series.net_load(t).max(0.0);
                    let power = constraints.max_discharge_power() * phase;
                    Decision::Discharge(power.min(deficit))
                }
                _ => Decision::Idle,
            }
        });

        let pattern = BitPattern(pattern);
        let qubo_energy = DispatchQubo::build(series, constraints).energy(&pattern);

        SolverOutput {
            schedule,
            metadata: StrategyMetadata::Sampling {
                seed: None,
                bit_pattern: pattern.to_string(),
                qubo_energy,
                phase_period: self.config.phase_period,
            },
        }
    }
}
