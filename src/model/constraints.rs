use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Default battery capacity in energy units.
pub const DEFAULT_CAPACITY: f64 = 1.0;

/// Default state of charge at the start of the horizon.
pub const DEFAULT_INITIAL_SOC: f64 = 0.5;

/// Raw constraint values as received on the wire.
///
/// Field names follow the request contract (`maxChargePower`, `socMin`, ...).
/// Convert to [`Constraints`] to validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConstraintParams {
    /// Maximum charging power per step (>= 0).
    pub max_charge_power: f64,
    /// Maximum discharging power per step (>= 0).
    pub max_discharge_power: f64,
    /// Lower state-of-charge bound (fraction of capacity).
    pub soc_min: f64,
    /// Upper state-of-charge bound (fraction of capacity).
    pub soc_max: f64,
    /// Charge efficiency in `(0, 1]`.
    pub charge_efficiency: f64,
    /// Discharge efficiency in `(0, 1]`.
    pub discharge_efficiency: f64,
    /// Grid export limit per step; `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_cap: Option<f64>,
    /// Battery capacity in energy units (> 0).
    #[serde(default = "default_capacity")]
    pub capacity: f64,
    /// State of charge before the first step.
    #[serde(default = "default_initial_soc")]
    pub initial_soc: f64,
}

fn default_capacity() -> f64 {
    DEFAULT_CAPACITY
}

fn default_initial_soc() -> f64 {
    DEFAULT_INITIAL_SOC
}

impl Default for ConstraintParams {
    fn default() -> Self {
        Self {
            max_charge_power: 1.0,
            max_discharge_power: 1.0,
            soc_min: 0.1,
            soc_max: 0.9,
            charge_efficiency: 0.95,
            discharge_efficiency: 0.95,
            export_cap: None,
            capacity: DEFAULT_CAPACITY,
            initial_soc: DEFAULT_INITIAL_SOC,
        }
    }
}

/// Validated, immutable battery and grid limits for one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    params: ConstraintParams,
}

impl Constraints {
    /// Validates raw parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidInput`] naming the first field that
    /// violates its invariant (e.g., `socMin >= socMax`).
    pub fn new(params: ConstraintParams) -> Result<Self, DispatchError> {
        let p = &params;
        let fields = [
            ("maxChargePower", p.max_charge_power),
            ("maxDischargePower", p.max_discharge_power),
            ("socMin", p.soc_min),
            ("socMax", p.soc_max),
            ("chargeEfficiency", p.charge_efficiency),
            ("dischargeEfficiency", p.discharge_efficiency),
            ("capacity", p.capacity),
            ("initialSoc", p.initial_soc),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(invalid(name, format!("must be finite, got {value}")));
            }
        }

        if p.max_charge_power < 0.0 {
            return Err(invalid("maxChargePower", "must be >= 0"));
        }
        if p.max_discharge_power < 0.0 {
            return Err(invalid("maxDischargePower", "must be >= 0"));
        }
        if p.soc_min < 0.0 {
            return Err(invalid("socMin", "must be >= 0"));
        }
        if p.soc_max > 1.0 {
            return Err(invalid("socMax", "must be <= 1"));
        }
        if p.soc_min >= p.soc_max {
            return Err(invalid(
                "socMin",
                format!("must be < socMax ({} >= {})", p.soc_min, p.soc_max),
            ));
        }
        if !(p.charge_efficiency > 0.0 && p.charge_efficiency <= 1.0) {
            return Err(invalid("chargeEfficiency", "must be in (0, 1]"));
        }
        if !(p.discharge_efficiency > 0.0 && p.discharge_efficiency <= 1.0) {
            return Err(invalid("dischargeEfficiency", "must be in (0, 1]"));
        }
        if let Some(cap) = p.export_cap {
            if !cap.is_finite() || cap < 0.0 {
                return Err(invalid(
                    "exportCap",
                    format!("must be finite and >= 0, got {cap}"),
                ));
            }
        }
        if p.capacity <= 0.0 {
            return Err(invalid("capacity", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&p.initial_soc) {
            return Err(invalid("initialSoc", "must be in [0, 1]"));
        }

        Ok(Self { params })
    }

    pub fn max_charge_power(&self) -> f64 {
        self.params.max_charge_power
    }

    pub fn max_discharge_power(&self) -> f64 {
        self.params.max_discharge_power
    }

    pub fn soc_min(&self) -> f64 {
        self.params.soc_min
    }

    pub fn soc_max(&self) -> f64 {
        self.params.soc_max
    }

    pub fn charge_efficiency(&self) -> f64 {
        self.params.charge_efficiency
    }

    pub fn discharge_efficiency(&self) -> f64 {
        self.params.discharge_efficiency
    }

    /// Export limit, or `f64::INFINITY` when unbounded.
    pub fn export_cap(&self) -> f64 {
        self.params.export_cap.unwrap_or(f64::INFINITY)
    }

    pub fn capacity(&self) -> f64 {
        self.params.capacity
    }

    /// Configured initial state of charge clamped into `[socMin, socMax]`.
    pub fn starting_soc(&self) -> f64 {
        self.params.initial_soc.clamp(self.params.soc_min, self.params.soc_max)
    }
}

fn invalid(field: &str, message: impl Into<String>) -> DispatchError {
    DispatchError::invalid(format!("constraints.{field}"), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        assert!(Constraints::new(ConstraintParams::default()).is_ok());
    }

    #[test]
    fn rejects_inverted_soc_bounds() {
        let params = ConstraintParams {
            soc_min: 0.9,
            soc_max: 0.9,
            ..ConstraintParams::default()
        };
        let err = Constraints::new(params).unwrap_err();
        assert_eq!(
            err,
            DispatchError::invalid("constraints.socMin", "must be < socMax (0.9 >= 0.9)")
        );
    }

    #[test]
    fn rejects_zero_efficiency() {
        let params = ConstraintParams {
            discharge_efficiency: 0.0,
            ..ConstraintParams::default()
        };
        assert!(Constraints::new(params).is_err());
    }

    #[test]
    fn rejects_negative_export_cap() {
        let params = ConstraintParams {
            export_cap: Some(-1.0),
            ..ConstraintParams::default()
        };
        assert!(Constraints::new(params).is_err());
    }

    #[test]
    fn unbounded_export_cap_is_infinite() {
        let c = Constraints::new(ConstraintParams::default()).unwrap();
        assert!(c.export_cap().is_infinite());
    }

    #[test]
    fn starting_soc_is_clamped_into_bounds() {
        let params = ConstraintParams {
            soc_min: 0.6,
            soc_max: 0.8,
            initial_soc: 0.5,
            ..ConstraintParams::default()
        };
        let c = Constraints::new(params).unwrap();
        assert_eq!(c.starting_soc(), 0.6);
    }

    #[test]
    fn parses_camel_case_with_defaults() {
        let json = r#"{
            "maxChargePower": 2.0,
            "maxDischargePower": 2.5,
            "socMin": 0.1,
            "socMax": 1.0,
            "chargeEfficiency": 0.95,
            "dischargeEfficiency": 0.9
        }"#;
        let params: ConstraintParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.max_discharge_power, 2.5);
        assert_eq!(params.export_cap, None);
        assert_eq!(params.capacity, DEFAULT_CAPACITY);
        assert_eq!(params.initial_soc, DEFAULT_INITIAL_SOC);
    }
}
