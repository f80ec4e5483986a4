//! Binary (QUBO) form of the dispatch problem.
//!
//! Two binary variables per step, `ch_t` and `dis_t`. Linear terms price a
//! full-power charge or discharge; a large quadratic penalty couples the
//! two variables of the same step so that simultaneous charge and discharge
//! is never a low-energy pattern.

use std::fmt;

use crate::model::{Constraints, TimeSeries};

/// Penalty on `ch_t * dis_t`.
pub const SIMULTANEOUS_PENALTY: f64 = 1000.0;

/// Charge and discharge bias bits for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepBits {
    pub charge: bool,
    pub discharge: bool,
}

/// Sampled bits for a whole horizon.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitPattern(pub Vec<StepBits>);

impl fmt::Display for BitPattern {
    /// Renders `ch_0 dis_0 ch_1 dis_1 ...` as a `0`/`1` string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bits in &self.0 {
            f.write_str(if bits.charge { "1" } else { "0" })?;
            f.write_str(if bits.discharge { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Coefficients of the dispatch QUBO.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchQubo {
    /// Diagonal coefficient of `ch_t`.
    pub charge: Vec<f64>,
    /// Diagonal coefficient of `dis_t`.
    pub discharge: Vec<f64>,
    /// Coefficient of `ch_t * dis_t`.
    pub penalty: f64,
}

impl DispatchQubo {
    /// Charging at full power costs `price * Pch / eta_c`; discharging
    /// earns `price * Pdis * eta_d`.
    pub fn build(series: &TimeSeries, constraints: &Constraints) -> Self {
        let charge = series
            .prices()
            .iter()
            .map(|p| p * constraints.max_charge_power() / constraints.charge_efficiency())
            .collect();
        let discharge = series
            .prices()
            .iter()
            .map(|p| -p * constraints.max_discharge_power() * constraints.discharge_efficiency())
            .collect();
        Self {
            charge,
            discharge,
            penalty: SIMULTANEOUS_PENALTY,
        }
    }

    pub fn len(&self) -> usize {
        self.charge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charge.is_empty()
    }

    /// Energy of a bit pattern; steps beyond the pattern count as zero bits.
    pub fn energy(&self, pattern: &BitPattern) -> f64 {
        pattern
            .0
            .iter()
            .take(self.len())
            .enumerate()
            .map(|(t, bits)| {
                let mut e = 0.0;
                if bits.charge {
                    e += self.charge[t];
                }
                if bits.discharge {
                    e += self.discharge[t];
                }
                if bits.charge && bits.discharge {
                    e += self.penalty;
                }
                e
            })
            .sum()
    }
}
