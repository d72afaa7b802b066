//! Generator and playback configuration.
//!
//! Defaults reproduce the classic lesson look: a 42000 baseline, a 0.15 EMA,
//! a constant-width band of ±800, 150-unit ticks and a 3000-unit teaching pause.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::params::{check_known, get_period, get_ratio, get_value, ParamMeta, ParameterizedConfig};
use crate::{Period, Ratio, Result, SimError};

// ============================================================
// SYNTHESIS
// ============================================================

static SYNTH_PARAMS: &[ParamMeta] = &[
    ParamMeta::magnitude("base_price", 42_000.0, (1.0, 1e9, 1000.0), "Open of the very first bar"),
    ParamMeta::ratio("ema_alpha", 0.15, (0.01, 1.0, 0.05), "Weight of the newest close in the EMA"),
    ParamMeta::magnitude("band_spread", 400.0, (0.0, 1e6, 100.0), "Constant spread term of the band"),
    ParamMeta::magnitude("band_multiplier", 2.0, (0.0, 10.0, 0.5), "Band half-width in spreads"),
    ParamMeta::magnitude("default_wick", 10.0, (0.0, 1e6, 5.0), "Wick length when a recipe omits one"),
    ParamMeta::period("backdrop_len", 40.0, (1.0, 1000.0, 10.0), "Bars of flat market backdrop"),
    ParamMeta::magnitude("backdrop_amplitude", 150.0, (0.0, 1e6, 50.0), "Noise amplitude of the backdrop"),
    ParamMeta::period("setup_len", 25.0, (1.0, 1000.0, 5.0), "Bars in the setup leg"),
    ParamMeta::period("result_len", 30.0, (1.0, 1000.0, 5.0), "Bars in the result leg"),
    ParamMeta::magnitude("amplitude", 200.0, (0.0, 1e6, 50.0), "Amplitude of directional legs"),
    ParamMeta::magnitude("flat_setup_amplitude", 100.0, (0.0, 1e6, 50.0), "Amplitude of a flat setup leg"),
    ParamMeta::magnitude("volatile_amplitude", 300.0, (0.0, 1e6, 50.0), "Amplitude of a volatile result leg"),
    ParamMeta::magnitude("volume_min", 500.0, (0.0, 1e9, 100.0), "Lower bound of default volume"),
    ParamMeta::magnitude("volume_max", 1000.0, (0.0, 1e9, 100.0), "Upper bound of default volume"),
];

/// Tunables for scenario synthesis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub base_price: f64,
    pub ema_alpha: Ratio,
    pub band_spread: f64,
    pub band_multiplier: f64,
    pub default_wick: f64,
    pub backdrop_len: Period,
    pub backdrop_amplitude: f64,
    pub setup_len: Period,
    pub result_len: Period,
    pub amplitude: f64,
    pub flat_setup_amplitude: f64,
    pub volatile_amplitude: f64,
    pub volume_min: f64,
    pub volume_max: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            base_price: 42_000.0,
            ema_alpha: Ratio::new_const(0.15),
            band_spread: 400.0,
            band_multiplier: 2.0,
            default_wick: 10.0,
            backdrop_len: Period::new_const(40),
            backdrop_amplitude: 150.0,
            setup_len: Period::new_const(25),
            result_len: Period::new_const(30),
            amplitude: 200.0,
            flat_setup_amplitude: 100.0,
            volatile_amplitude: 300.0,
            volume_min: 500.0,
            volume_max: 1000.0,
        }
    }
}

impl SynthConfig {
    /// Half-width of the volatility band around the EMA
    #[inline]
    pub fn band_half_width(&self) -> f64 {
        self.band_spread * self.band_multiplier
    }

    fn values(&self) -> [(&'static str, f64); 14] {
        [
            ("base_price", self.base_price),
            ("ema_alpha", self.ema_alpha.get()),
            ("band_spread", self.band_spread),
            ("band_multiplier", self.band_multiplier),
            ("default_wick", self.default_wick),
            ("backdrop_len", self.backdrop_len.get() as f64),
            ("backdrop_amplitude", self.backdrop_amplitude),
            ("setup_len", self.setup_len.get() as f64),
            ("result_len", self.result_len.get() as f64),
            ("amplitude", self.amplitude),
            ("flat_setup_amplitude", self.flat_setup_amplitude),
            ("volatile_amplitude", self.volatile_amplitude),
            ("volume_min", self.volume_min),
            ("volume_max", self.volume_max),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.values() {
            if let Some(meta) = ParamMeta::find(SYNTH_PARAMS, name) {
                meta.validate(value)?;
            }
        }
        if self.volume_min >= self.volume_max {
            return Err(SimError::InvalidConfig(format!(
                "volume_min ({}) must be below volume_max ({})",
                self.volume_min, self.volume_max
            )));
        }
        Ok(())
    }
}

impl ParameterizedConfig for SynthConfig {
    fn param_meta() -> &'static [ParamMeta] {
        SYNTH_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        check_known(SYNTH_PARAMS, params)?;
        let get = |key: &str| get_value(SYNTH_PARAMS, params, key);
        let d = Self::default();

        let config = Self {
            base_price: get("base_price")?,
            ema_alpha: get_ratio(params, "ema_alpha", d.ema_alpha.get())?,
            band_spread: get("band_spread")?,
            band_multiplier: get("band_multiplier")?,
            default_wick: get("default_wick")?,
            backdrop_len: get_period(params, "backdrop_len", d.backdrop_len.get())?,
            backdrop_amplitude: get("backdrop_amplitude")?,
            setup_len: get_period(params, "setup_len", d.setup_len.get())?,
            result_len: get_period(params, "result_len", d.result_len.get())?,
            amplitude: get("amplitude")?,
            flat_setup_amplitude: get("flat_setup_amplitude")?,
            volatile_amplitude: get("volatile_amplitude")?,
            volume_min: get("volume_min")?,
            volume_max: get("volume_max")?,
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================
// PLAYBACK
// ============================================================

static PLAYBACK_PARAMS: &[ParamMeta] = &[
    ParamMeta::magnitude("tick_period", 150.0, (1.0, 60_000.0, 50.0), "Time units between reveal steps"),
    ParamMeta::magnitude("dwell", 3000.0, (0.0, 600_000.0, 500.0), "Teaching pause at an annotation"),
    ParamMeta::period("window", 80.0, (1.0, 10_000.0, 10.0), "Bars of look-back in the view"),
    ParamMeta::ratio("axis_padding", 0.2, (0.0, 1.0, 0.05), "Y-axis padding as a share of range"),
];

/// Tunables for timed reveal and view projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub tick_period: u64,
    pub dwell: u64,
    pub window: Period,
    pub axis_padding: Ratio,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_period: 150,
            dwell: 3000,
            window: Period::new_const(80),
            axis_padding: Ratio::new_const(0.2),
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("tick_period", self.tick_period as f64),
            ("dwell", self.dwell as f64),
            ("window", self.window.get() as f64),
            ("axis_padding", self.axis_padding.get()),
        ];
        for (name, value) in values {
            if let Some(meta) = ParamMeta::find(PLAYBACK_PARAMS, name) {
                meta.validate(value)?;
            }
        }
        Ok(())
    }
}

impl ParameterizedConfig for PlaybackConfig {
    fn param_meta() -> &'static [ParamMeta] {
        PLAYBACK_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        check_known(PLAYBACK_PARAMS, params)?;
        let get = |key: &str| get_value(PLAYBACK_PARAMS, params, key);
        let d = Self::default();

        let config = Self {
            tick_period: get("tick_period")?.round() as u64,
            dwell: get("dwell")?.round() as u64,
            window: get_period(params, "window", d.window.get())?,
            axis_padding: get_ratio(params, "axis_padding", d.axis_padding.get())?,
        };
        config.validate()?;
        Ok(config)
    }
}
