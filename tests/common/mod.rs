//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use dispatch_engine::model::{ConstraintParams, Constraints, TimeSeries};
use dispatch_engine::service::DispatchRequest;

/// Lossless unit battery with roomy power limits (socMin 0.1, socMax 1.0).
pub fn lossless_params() -> ConstraintParams {
    ConstraintParams {
        max_charge_power: 5.0,
        max_discharge_power: 5.0,
        soc_min: 0.1,
        soc_max: 1.0,
        charge_efficiency: 1.0,
        discharge_efficiency: 1.0,
        ..ConstraintParams::default()
    }
}

pub fn lossless() -> Constraints {
    Constraints::new(lossless_params()).unwrap()
}

/// Default constraints (1.0 power, SoC 0.1 to 0.9, 95% efficiency).
pub fn default_constraints() -> Constraints {
    Constraints::new(ConstraintParams::default()).unwrap()
}

/// Cheap step then a price spike, no generation, unit load.
pub fn spike_series() -> TimeSeries {
    TimeSeries::new(vec![0.10, 0.45], vec![0.0, 0.0], vec![1.0, 1.0]).unwrap()
}

/// Twelve steps mixing cheap surplus and expensive deficit.
pub fn mixed_series() -> TimeSeries {
    TimeSeries::new(
        vec![0.12, 0.15, 0.18, 0.25, 0.28, 0.35, 0.40, 0.45, 0.32, 0.22, 0.10, 0.05],
        vec![3.0, 3.5, 2.0, 1.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.5, 2.5, 3.0],
        vec![1.0, 1.0, 1.2, 1.5, 1.8, 2.0, 2.2, 2.0, 1.6, 1.2, 1.0, 0.8],
    )
    .unwrap()
}

/// Request for the price-spike scenario.
pub fn spike_request(strategy: &str, seed: Option<u64>) -> DispatchRequest {
    DispatchRequest {
        prices: vec![0.10, 0.45],
        generation: vec![0.0, 0.0],
        load: vec![1.0, 1.0],
        constraints: lossless_params(),
        strategy: strategy.to_string(),
        seed,
    }
}
