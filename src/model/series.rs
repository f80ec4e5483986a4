use crate::error::DispatchError;

/// Aligned price, generation, and load sequences over one horizon.
///
/// Index `t` is the only temporal key. Values are owned by the request for
/// the duration of one solve.
///
/// # Examples
///
/// ```
/// use dispatch_engine::model::TimeSeries;
///
/// let series = TimeSeries::new(vec![0.10, 0.45], vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.net_load(1), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    prices: Vec<f64>,
    generation: Vec<f64>,
    load: Vec<f64>,
}

impl TimeSeries {
    /// Builds a horizon from three equal-length sequences.
    ///
    /// Prices may take any sign (negative values model export credit);
    /// generation and load must be non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidInput`] if the horizon is empty,
    /// lengths differ, or any value is non-finite or out of range.
    pub fn new(
        prices: Vec<f64>,
        generation: Vec<f64>,
        load: Vec<f64>,
    ) -> Result<Self, DispatchError> {
        if prices.is_empty() {
            return Err(DispatchError::invalid(
                "prices",
                "horizon must contain at least one step",
            ));
        }
        if generation.len() != prices.len() {
            return Err(DispatchError::invalid(
                "generation",
                format!(
                    "length {} does not match prices length {}",
                    generation.len(),
                    prices.len()
                ),
            ));
        }
        if load.len() != prices.len() {
            return Err(DispatchError::invalid(
                "load",
                format!(
                    "length {} does not match prices length {}",
                    load.len(),
                    prices.len()
                ),
            ));
        }

        check_values("prices", &prices, false)?;
        check_values("generation", &generation, true)?;
        check_values("load", &load, true)?;

        Ok(Self {
            prices,
            generation,
            load,
        })
    }

    /// Number of steps `N` in the horizon (always ≥ 1).
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Always `false`; construction rejects empty horizons.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn generation(&self) -> &[f64] {
        &self.generation
    }

    pub fn load(&self) -> &[f64] {
        &self.load
    }

    pub fn price(&self, t: usize) -> f64 {
        self.prices[t]
    }

    /// Load minus generation at step `t` (positive = deficit).
    pub fn net_load(&self, t: usize) -> f64 {
        self.load[t] - self.generation[t]
    }

    /// Lowest and highest price in the horizon.
    pub fn price_range(&self) -> (f64, f64) {
        self.prices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            })
    }
}

fn check_values(field: &str, values: &[f64], non_negative: bool) -> Result<(), DispatchError> {
    for (t, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(DispatchError::invalid(
                format!("{field}[{t}]"),
                format!("must be finite, got {v}"),
            ));
        }
        if non_negative && v < 0.0 {
            return Err(DispatchError::invalid(
                format!("{field}[{t}]"),
                format!("must be >= 0, got {v}"),
            ));
        }
    }
    Ok(())
}
