use crate::model::Constraints;

/// Battery state carried across the horizon during one solve.
///
/// Applies setpoints in feeder convention and enforces the power limits,
/// state-of-charge headroom, and efficiency losses from [`Constraints`].
/// Out-of-range results are clamped, never rejected.
///
/// # Power Flow Convention (Feeder)
/// - Positive power: charging (energy drawn from the bus)
/// - Negative power: discharging (energy delivered to the bus)
#[derive(Debug, Clone)]
pub struct Battery<'a> {
    constraints: &'a Constraints,
    soc: f64,
}

impl<'a> Battery<'a> {
    /// Starts at the constraints' initial SoC, clamped into `[socMin, socMax]`.
    pub fn new(constraints: &'a Constraints) -> Self {
        Self {
            constraints,
            soc: constraints.starting_soc(),
        }
    }

    /// Current state of charge (fraction of capacity).
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// Largest charge this step can absorb: power limit or SoC headroom.
    pub fn charge_limit(&self) -> f64 {
        let c = self.constraints;
        let headroom = (c.soc_max() - self.soc).max(0.0) * c.capacity() / c.charge_efficiency();
        c.max_charge_power().min(headroom)
    }

    /// Largest discharge this step can deliver: power limit or energy above `socMin`.
    pub fn discharge_limit(&self) -> f64 {
        let c = self.constraints;
        let available = (self.soc - c.soc_min()).max(0.0) * c.capacity() * c.discharge_efficiency();
        c.max_discharge_power().min(available)
    }

    /// Applies a setpoint and returns the power actually realized.
    ///
    /// The setpoint is clamped to the charge/discharge limits, the SoC is
    /// advanced with the matching efficiency, and the result is clamped
    /// into `[socMin, socMax]` to absorb floating-point drift.
    pub fn apply(&mut self, setpoint: f64) -> f64 {
        let c = self.constraints;

        let actual = if setpoint > 0.0 {
            let charge = setpoint.min(self.charge_limit());
            self.soc += charge * c.charge_efficiency() / c.capacity();
            charge
        } else if setpoint < 0.0 {
            let discharge = (-setpoint).min(self.discharge_limit());
            self.soc -= discharge / (c.discharge_efficiency() * c.capacity());
            -discharge
        } else {
            0.0
        };

        self.soc = self.soc.clamp(c.soc_min(), c.soc_max());
        actual
    }
}
