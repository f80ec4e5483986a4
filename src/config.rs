//! TOML-based engine configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::solver::StrategyKind;

/// Top-level engine configuration parsed from TOML.
///
/// All fields have defaults matching the built-in `default` preset. Load
/// from TOML with [`EngineConfig::from_toml_file`] or pick a preset with
/// [`EngineConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Strategy selection and seeding.
    #[serde(default)]
    pub engine: EngineSection,
    /// Price thresholds of the rule-based strategy.
    #[serde(default)]
    pub deterministic: DeterministicConfig,
    /// Cooling parameters of the annealing strategy.
    #[serde(default)]
    pub annealing: AnnealingConfig,
    /// Phase parameters of the sampling strategy.
    #[serde(default)]
    pub sampling: SamplingConfig,
}

/// Strategy selection and seeding.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    /// Strategy used when a caller does not name one.
    pub strategy: String,
    /// Seed used when a request carries none. Absent means a fresh seed
    /// per request.
    pub seed: Option<u64>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Deterministic.as_str().to_string(),
            seed: None,
        }
    }
}

/// Price thresholds of the rule-based strategy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeterministicConfig {
    /// Charge from surplus below this price.
    pub low_price_threshold: f64,
    /// Discharge into a deficit above this price.
    pub high_price_threshold: f64,
}

impl Default for DeterministicConfig {
    fn default() -> Self {
        Self {
            low_price_threshold: 0.20,
            high_price_threshold: 0.30,
        }
    }
}

/// Cooling parameters of the annealing strategy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnealingConfig {
    /// Temperature at step 0, in price units (>= 0).
    pub initial_temperature: f64,
    /// Per-step multiplicative cooling factor, in (0, 1].
    pub cooling_rate: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 0.10,
            cooling_rate: 0.90,
        }
    }
}

/// Phase parameters of the sampling strategy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    /// Period of the magnitude phase, in steps (> 0).
    pub phase_period: f64,
    /// Smallest magnitude factor, in [0, 1].
    pub min_magnitude: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            phase_period: 24.0,
            min_magnitude: 0.5,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"annealing.cooling_rate"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl EngineConfig {
    /// Narrow threshold band and a cool start: fewer, surer moves.
    pub fn conservative() -> Self {
        Self {
            deterministic: DeterministicConfig {
                low_price_threshold: 0.15,
                high_price_threshold: 0.35,
            },
            annealing: AnnealingConfig {
                initial_temperature: 0.05,
                cooling_rate: 0.80,
            },
            sampling: SamplingConfig {
                min_magnitude: 0.25,
                ..SamplingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Hot start with slow cooling and full-magnitude sampling.
    pub fn exploratory() -> Self {
        Self {
            annealing: AnnealingConfig {
                initial_temperature: 0.20,
                cooling_rate: 0.97,
            },
            sampling: SamplingConfig {
                phase_period: 12.0,
                min_magnitude: 0.75,
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "conservative", "exploratory"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "conservative" => Ok(Self::conservative()),
            "exploratory" => Ok(Self::exploratory()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Default strategy named in the `[engine]` section.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the name is not a registered strategy.
    pub fn default_strategy(&self) -> Result<StrategyKind, ConfigError> {
        self.engine.strategy.parse().map_err(|e| ConfigError {
            field: "engine.strategy".into(),
            message: format!("{e}"),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.default_strategy() {
            errors.push(e);
        }

        let d = &self.deterministic;
        if !d.low_price_threshold.is_finite() || !d.high_price_threshold.is_finite() {
            errors.push(ConfigError {
                field: "deterministic".into(),
                message: "thresholds must be finite".into(),
            });
        } else if d.low_price_threshold > d.high_price_threshold {
            errors.push(ConfigError {
                field: "deterministic.low_price_threshold".into(),
                message: "must be <= deterministic.high_price_threshold".into(),
            });
        }

        let a = &self.annealing;
        if !(a.initial_temperature >= 0.0 && a.initial_temperature.is_finite()) {
            errors.push(ConfigError {
                field: "annealing.initial_temperature".into(),
                message: "must be finite and >= 0".into(),
            });
        }
        if !(a.cooling_rate > 0.0 && a.cooling_rate <= 1.0) {
            errors.push(ConfigError {
                field: "annealing.cooling_rate".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }

        let s = &self.sampling;
        if !(s.phase_period > 0.0 && s.phase_period.is_finite()) {
            errors.push(ConfigError {
                field: "sampling.phase_period".into(),
                message: "must be finite and > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&s.min_magnitude) {
            errors.push(ConfigError {
                field: "sampling.min_magnitude".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        errors
    }
}
