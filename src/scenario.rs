//! Built-in dispatch scenarios for demos and smoke tests.

use crate::error::DispatchError;
use crate::model::ConstraintParams;
use crate::service::DispatchRequest;

/// Available scenario names.
pub const SCENARIOS: &[&str] = &["tou_day", "price_spike"];

/// Builds the request for a named scenario.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidInput`] if the name is unknown.
pub fn from_name(
    name: &str,
    strategy: &str,
    seed: Option<u64>,
) -> Result<DispatchRequest, DispatchError> {
    let mut request = match name {
        "tou_day" => tou_day(),
        "price_spike" => price_spike(),
        _ => {
            return Err(DispatchError::invalid(
                "scenario",
                format!("unknown scenario \"{name}\", available: {}", SCENARIOS.join(", ")),
            ));
        }
    };
    request.strategy = strategy.to_string();
    request.seed = seed;
    Ok(request)
}

/// One day of hourly steps on a two-rate tariff.
///
/// Peak rate 0.32 applies to hours 7 through 22 inclusive, off-peak 0.22
/// otherwise. Flat 2.0 load, solar bell between hours 6 and 12, and a
/// 13.5 unit battery starting at 20%.
pub fn tou_day() -> DispatchRequest {
    let prices = (0..24)
        .map(|hour| if (7..=22).contains(&hour) { 0.32 } else { 0.22 })
        .collect();

    let mut generation = vec![0.0; 24];
    let solar = [2.0, 4.0, 6.0, 8.0, 6.0, 4.0, 2.0];
    for (slot, kw) in generation[6..13].iter_mut().zip(solar) {
        *slot = kw;
    }

    DispatchRequest {
        prices,
        generation,
        load: vec![2.0; 24],
        constraints: ConstraintParams {
            max_charge_power: 5.0,
            max_discharge_power: 5.0,
            soc_min: 0.0,
            soc_max: 1.0,
            charge_efficiency: 0.95,
            discharge_efficiency: 0.95,
            export_cap: Some(20.0),
            capacity: 13.5,
            initial_soc: 0.2,
        },
        strategy: String::new(),
        seed: None,
    }
}

/// Cheap step followed by a price spike, lossless unit battery.
pub fn price_spike() -> DispatchRequest {
    DispatchRequest {
        prices: vec![0.10, 0.45],
        generation: vec![0.0, 0.0],
        load: vec![1.0, 1.0],
        constraints: ConstraintParams {
            max_charge_power: 5.0,
            max_discharge_power: 5.0,
            soc_min: 0.1,
            soc_max: 1.0,
            charge_efficiency: 1.0,
            discharge_efficiency: 1.0,
            ..ConstraintParams::default()
        },
        strategy: String::new(),
        seed: None,
    }
}
