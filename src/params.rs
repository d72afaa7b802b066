//! Parameter metadata for generator and playback configuration
//!
//! Every tunable knob of [`SynthConfig`](crate::config::SynthConfig) and
//! [`PlaybackConfig`](crate::config::PlaybackConfig) is described by a [`ParamMeta`],
//! which enables:
//! - Building configs from loosely typed key/value maps
//! - Range validation with descriptive errors
//! - Grid sweeps over generator settings (e.g. for visual tuning)
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use candlesim::prelude::*;
//!
//! let mut overrides = HashMap::new();
//! overrides.insert("ema_alpha", 0.3);
//! let config = SynthConfig::with_params(&overrides).unwrap();
//! assert_eq!(config.ema_alpha.get(), 0.3);
//!
//! for param in SynthConfig::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{Period, Ratio, Result, SimError};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value (0.0..=1.0)
  Ratio,
  /// Period value (positive integer, bar counts)
  Period,
  /// Price or time magnitude (non-negative real)
  Magnitude,
}

/// Metadata for a single configuration parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "ema_alpha")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Accepted range and sweep step: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  pub const fn magnitude(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Magnitude, default, range, description }
  }

  /// Generate all values for a grid sweep
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    if !value.is_finite() {
      return Err(SimError::InvalidValue("parameter must be finite"));
    }
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(SimError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio | ParamType::Magnitude => Ok(()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(SimError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }

  /// Look up a parameter by name in a metadata table
  pub fn find(table: &'static [ParamMeta], name: &str) -> Option<&'static ParamMeta> {
    table.iter().find(|m| m.name == name)
  }
}

// ============================================================
// PARAMETERIZED CONFIG TRAIT
// ============================================================

/// Trait for configuration structs built from named parameters
pub trait ParameterizedConfig: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a config from a HashMap
  ///
  /// Missing parameters use their default values. Unknown keys are rejected.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Reject keys that no parameter in `table` answers to
pub fn check_known(table: &'static [ParamMeta], params: &HashMap<&str, f64>) -> Result<()> {
  for key in params.keys() {
    if ParamMeta::find(table, key).is_none() {
      return Err(SimError::InvalidConfig(format!("unknown parameter `{key}`")));
    }
  }
  Ok(())
}

/// Helper to get a validated value from params with default fallback
pub fn get_value(table: &'static [ParamMeta], params: &HashMap<&str, f64>, key: &str) -> Result<f64> {
  let meta = ParamMeta::find(table, key)
    .ok_or_else(|| SimError::InvalidConfig(format!("no metadata for `{key}`")))?;
  let value = params.get(key).copied().unwrap_or(meta.default);
  meta.validate(value)?;
  Ok(value)
}

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  if value < 0.0 || value.fract() != 0.0 {
    return Err(SimError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

// ============================================================
// TESTS
// ============================================================
