//! # candlesim - synthetic candlestick scenarios for pattern lessons
//!
//! Procedurally generates OHLCV series that exhibit a named trading pattern
//! (hammer, morning star, double top, bull flag, ...), annotates the pattern's
//! decisive bar, and replays the series bar by bar with a teaching pause at the
//! annotated moment.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlesim::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let generator = ScenarioGenerator::new(SynthConfig::default()).unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! // Any identifier works; unknown ones fall back to a generic walkthrough
//! let scenario = generator.generate("hammer", "01. Hammer (Hammer)", &mut rng);
//! assert_eq!(scenario.summary.name, "Hammer");
//!
//! // Replay it on an externally pumped clock
//! let mut timeline = Timeline::new(PlaybackController::for_scenario(&scenario), PlaybackConfig::default());
//! timeline.advance(1_500);
//! let frame = ViewWindow::new(PlaybackConfig::default()).project(&scenario, timeline.controller());
//! assert_eq!(frame.cursor, 10);
//! ```

pub mod catalog;
pub mod config;
pub mod params;
pub mod playback;
pub mod program;
pub mod scenario;
pub mod session;
pub mod synth;
pub mod view;

pub mod prelude {
    pub use crate::{
        // Catalog
        catalog::{category_counts, filter_lessons, Category, Difficulty, Lesson, KNOWN_PATTERNS},
        // Configuration
        config::{PlaybackConfig, SynthConfig},
        generate_parallel,
        params::{get_period, get_ratio, ParamMeta, ParamType, ParameterizedConfig},
        // Playback
        playback::{DwellHandle, PlaybackController, PlaybackState, TickOutcome, Timeline},
        // Programs
        program::{ComplexKind, Leg, PatternProgram, Polarity, Trigger},
        // Scenario
        scenario::{
            display_name, place_annotation, Annotation, Phase, Placement, Point, Scenario,
            ScenarioGenerator, ScenarioSummary, TrendVector, COMPLETE_LABEL,
        },
        session::LessonView,
        // Synthesis
        synth::{Bar, Bias, CandleSpec, Series},
        view::{AxisBounds, Frame, ViewWindow},
        Direction,
        OHLCVExt,
        Period,
        Ratio,
        Result,
        SimError,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while validating configuration or externally supplied bars.
///
/// Generation and playback themselves never fail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SimError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(SimError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(SimError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Bar count (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(SimError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() >= self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close(), self.volume()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(SimError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(SimError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.low() > self.open().min(self.close()) {
            return Err(SimError::InvalidOHLCV {
                index: 0,
                reason: "low above body",
            });
        }
        if self.high() < self.open().max(self.close()) {
            return Err(SimError::InvalidOHLCV {
                index: 0,
                reason: "high below body",
            });
        }
        if self.volume() < 0.0 {
            return Err(SimError::InvalidOHLCV {
                index: 0,
                reason: "negative volume",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Candle colour: up when the close is at or above the open
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn of(open: f64, close: f64) -> Self {
        if close >= open {
            Direction::Bullish
        } else {
            Direction::Bearish
        }
    }

    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

// ============================================================
// PARALLEL GENERATION
// ============================================================

use rayon::prelude::*;

/// Pre-generate scenarios for many lessons at once.
///
/// Each lesson is an independent fresh draw; output order matches input order.
pub fn generate_parallel<'a, I>(
    generator: &scenario::ScenarioGenerator,
    lessons: I,
) -> Vec<(String, scenario::Scenario)>
where
    I: IntoParallelIterator<Item = &'a catalog::Lesson>,
{
    lessons
        .into_par_iter()
        .map(|lesson| {
            let mut rng = rand::thread_rng();
            let scenario = generator.generate(&lesson.pattern, &lesson.title, &mut rng);
            (lesson.id.clone(), scenario)
        })
        .collect()
}

// ============================================================
// TESTS
// ============================================================
