//! Pattern programs
//!
//! Every pattern identifier maps to a [`PatternProgram`]: either a three-act
//! `{setup, trigger, result}` program built from shared primitives, or a
//! hand-composed [`ComplexKind`] script for structural patterns. Lookup never
//! fails: unrecognized identifiers get [`PatternProgram::FALLBACK`].
//!
//! # Program Shapes
//!
//! - **Simple**: flat backdrop, setup leg, one [`Trigger`] recipe, result leg
//! - **Complex**: flat backdrop, then a scripted multi-leg sequence with its
//!   own phase labels and an explicit trigger bar

mod complex;
mod simple;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SynthConfig;
use crate::scenario::{Phase, TrendVector};
use crate::synth::{Bias, CandleSpec, Series, SeriesBuilder};

pub const BACKDROP_LABEL: &str = "Market backdrop";

// ============================================================
// PROGRAM TAGS
// ============================================================

/// Declared direction of a setup or result leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leg {
    Up,
    Down,
    Flat,
    /// Flat drift with a wide noise band
    Volatile,
}

impl Leg {
    #[inline]
    pub fn bias(self) -> Bias {
        match self {
            Leg::Up => Bias::Up,
            Leg::Down => Bias::Down,
            Leg::Flat | Leg::Volatile => Bias::Flat,
        }
    }

    #[inline]
    pub fn is_directional(self) -> bool {
        matches!(self, Leg::Up | Leg::Down)
    }
}

/// Candle-shape recipe for the decisive moment of a simple program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Small body near the top, long lower wick
    Hammer,
    /// Small body near the bottom, long upper wick
    Star,
    Doji,
    LongLeggedDoji,
    Dragonfly,
    Gravestone,
    MarubozuBull,
    MarubozuBear,
    EngulfBull,
    EngulfBear,
    HaramiBull,
    HaramiBear,
    Piercing,
    DarkCloud,
    MorningStar,
    EveningStar,
    ThreeSoldiers,
    ThreeCrows,
    /// One counter-setup candle
    Generic,
}

impl Trigger {
    /// Candles appended for this trigger; the last one is the trigger bar.
    pub fn recipe(self, setup: Leg) -> Vec<CandleSpec> {
        use CandleSpec as C;

        match self {
            Trigger::Hammer => vec![C::body(20.0).wicks(10.0, 150.0).volume(1500.0)],
            Trigger::Star => vec![C::body(-20.0).wicks(150.0, 10.0).volume(1500.0)],
            Trigger::Doji => vec![C::body(2.0).wicks(80.0, 80.0).volume(800.0)],
            Trigger::LongLeggedDoji => vec![C::body(2.0).wicks(160.0, 160.0).volume(1000.0)],
            Trigger::Dragonfly => vec![C::body(2.0).wicks(2.0, 150.0)],
            Trigger::Gravestone => vec![C::body(-2.0).wicks(150.0, 2.0)],
            Trigger::MarubozuBull => vec![C::body(250.0).wicks(3.0, 3.0).volume(2000.0)],
            Trigger::EngulfBull => vec![C::body(-50.0), C::body(120.0).gap(-10.0).volume(1800.0)],
            Trigger::HaramiBull => vec![C::body(-150.0).volume(1500.0), C::body(30.0).gap(100.0)],
            Trigger::Piercing => vec![
                C::body(-150.0).volume(1500.0),
                C::body(120.0).gap(-40.0).volume(1500.0),
            ],
            Trigger::MorningStar => vec![
                C::body(-100.0),
                C::body(10.0).gap(-30.0),
                C::body(100.0).gap(30.0),
            ],
            Trigger::ThreeSoldiers => vec![C::body(80.0), C::body(90.0), C::body(100.0)],
            Trigger::MarubozuBear
            | Trigger::EngulfBear
            | Trigger::HaramiBear
            | Trigger::DarkCloud
            | Trigger::EveningStar
            | Trigger::ThreeCrows => self
                .bullish_twin()
                .recipe(setup)
                .into_iter()
                .map(CandleSpec::mirrored)
                .collect(),
            Trigger::Generic => {
                let body = if setup == Leg::Up { -100.0 } else { 100.0 };
                vec![C::body(body).volume(1200.0)]
            }
        }
    }

    /// Bearish recipes are reflections of their bullish counterparts
    fn bullish_twin(self) -> Trigger {
        match self {
            Trigger::MarubozuBear => Trigger::MarubozuBull,
            Trigger::EngulfBear => Trigger::EngulfBull,
            Trigger::HaramiBear => Trigger::HaramiBull,
            Trigger::DarkCloud => Trigger::Piercing,
            Trigger::EveningStar => Trigger::MorningStar,
            Trigger::ThreeCrows => Trigger::ThreeSoldiers,
            other => other,
        }
    }
}

/// Hand-composed structural pattern scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplexKind {
    DoubleBottom,
    DoubleTop,
    HeadShouldersTop,
    HeadShouldersBottom,
    BullFlag,
    BearFlag,
    /// Rally then decline, trigger at the turn
    Generic,
}

/// Whether a pattern forms a top (bearish) or a bottom (bullish)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Top,
    Bottom,
}

// ============================================================
// PATTERN PROGRAM
// ============================================================

/// Generation program for one pattern identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternProgram {
    Simple {
        setup: Leg,
        trigger: Trigger,
        result: Leg,
    },
    Complex(ComplexKind),
}

impl Default for PatternProgram {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl PatternProgram {
    /// Program used for any identifier outside the catalog
    pub const FALLBACK: Self = Self::Simple {
        setup: Leg::Volatile,
        trigger: Trigger::Generic,
        result: Leg::Volatile,
    };

    const fn simple(setup: Leg, trigger: Trigger, result: Leg) -> Self {
        Self::Simple {
            setup,
            trigger,
            result,
        }
    }

    /// Program for a recognized identifier, `None` otherwise
    pub fn lookup(pattern: &str) -> Option<Self> {
        use Leg::*;
        use Trigger as T;

        let program = match pattern {
            // Single candle
            "hammer" => Self::simple(Down, T::Hammer, Up),
            "shooting_star" => Self::simple(Up, T::Star, Down),
            "hanging_man" => Self::simple(Up, T::Hammer, Down),
            "inverted_hammer" => Self::simple(Down, T::Star, Up),
            "doji_std" => Self::simple(Flat, T::Doji, Volatile),
            "doji_long" => Self::simple(Flat, T::LongLeggedDoji, Volatile),
            "doji_dragonfly" => Self::simple(Down, T::Dragonfly, Up),
            "doji_gravestone" => Self::simple(Up, T::Gravestone, Down),
            "marubozu_bull" => Self::simple(Flat, T::MarubozuBull, Up),
            "marubozu_bear" => Self::simple(Flat, T::MarubozuBear, Down),
            // Combos
            "engulfing_bull" => Self::simple(Down, T::EngulfBull, Up),
            "engulfing_bear" => Self::simple(Up, T::EngulfBear, Down),
            "harami_bull" => Self::simple(Down, T::HaramiBull, Up),
            "harami_bear" => Self::simple(Up, T::HaramiBear, Down),
            "piercing" => Self::simple(Down, T::Piercing, Up),
            "dark_cloud" => Self::simple(Up, T::DarkCloud, Down),
            "morning_star" => Self::simple(Down, T::MorningStar, Up),
            "evening_star" => Self::simple(Up, T::EveningStar, Down),
            "three_white_soldiers" => Self::simple(Down, T::ThreeSoldiers, Up),
            "three_black_crows" => Self::simple(Up, T::ThreeCrows, Down),
            // Indicators reuse candle programs
            "rsi_oversold" => Self::simple(Down, T::Hammer, Up),
            "rsi_overbought" => Self::simple(Up, T::Star, Down),
            // Structural patterns
            "w_bottom" => Self::Complex(ComplexKind::DoubleBottom),
            "m_top" => Self::Complex(ComplexKind::DoubleTop),
            "head_shoulders" => Self::Complex(ComplexKind::HeadShouldersTop),
            "head_shoulders_inv" => Self::Complex(ComplexKind::HeadShouldersBottom),
            "flag_bull" => Self::Complex(ComplexKind::BullFlag),
            "flag_bear" => Self::Complex(ComplexKind::BearFlag),
            "triangle_asc" | "ma_cross_bull" | "boll_squeeze" => Self::Complex(ComplexKind::Generic),
            _ => return None,
        };
        Some(program)
    }

    /// Program for any identifier, falling back for unknown ones
    pub fn for_pattern(pattern: &str) -> Self {
        Self::lookup(pattern).unwrap_or_else(|| {
            tracing::debug!(pattern, "unrecognized pattern, using fallback program");
            Self::FALLBACK
        })
    }

    /// Top/bottom classification from the declared tags alone
    pub fn polarity(&self) -> Polarity {
        let top = match *self {
            Self::Simple { setup, result, .. } => setup == Leg::Up || result == Leg::Down,
            Self::Complex(kind) => matches!(
                kind,
                ComplexKind::DoubleTop | ComplexKind::HeadShouldersTop | ComplexKind::BearFlag
            ),
        };
        if top {
            Polarity::Top
        } else {
            Polarity::Bottom
        }
    }

    /// Execute the program, drawing noise from `rng`.
    ///
    /// `name` is the display name used in the trigger phase label.
    pub fn run<R: Rng + ?Sized>(&self, config: &SynthConfig, name: &str, rng: &mut R) -> ProgramOutput {
        let mut it = Interpreter::new(config, rng);

        it.builder.trend(config.backdrop_len.get(), Bias::Flat, config.backdrop_amplitude);
        it.phase(BACKDROP_LABEL);

        match *self {
            Self::Simple {
                setup,
                trigger,
                result,
            } => simple::run(&mut it, setup, trigger, result, name),
            Self::Complex(kind) => complex::run(&mut it, kind),
        }

        it.finish()
    }
}

// ============================================================
// INTERPRETER STATE
// ============================================================

/// Numeric landmarks a program may define
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmarks {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub entry: Option<f64>,
    pub stop: Option<f64>,
}

/// Everything a program run produces before annotation
#[derive(Debug, Clone)]
pub struct ProgramOutput {
    pub series: Series,
    pub phases: Vec<Phase>,
    pub trigger: Option<usize>,
    pub trend_vector: Option<TrendVector>,
    pub landmarks: Landmarks,
}

struct Interpreter<'a, R: Rng + ?Sized> {
    builder: SeriesBuilder<'a, R>,
    phases: Vec<Phase>,
    /// Start of the phase currently being generated
    cursor: usize,
    trigger: Option<usize>,
    trend_vector: Option<TrendVector>,
    landmarks: Landmarks,
}

impl<'a, R: Rng + ?Sized> Interpreter<'a, R> {
    fn new(config: &'a SynthConfig, rng: &'a mut R) -> Self {
        Self {
            builder: SeriesBuilder::new(config, rng),
            phases: Vec::new(),
            cursor: 0,
            trigger: None,
            trend_vector: None,
            landmarks: Landmarks::default(),
        }
    }

    /// Close the current phase at the present series length
    fn phase(&mut self, label: impl Into<String>) {
        let end = self.builder.len();
        self.phases.push(Phase {
            start: self.cursor,
            end,
            label: label.into(),
        });
        self.cursor = end;
    }

    /// Mark the most recent bar as the trigger
    fn mark_trigger(&mut self) {
        self.trigger = self.builder.last_index();
    }

    fn finish(self) -> ProgramOutput {
        ProgramOutput {
            series: self.builder.finish(),
            phases: self.phases,
            trigger: self.trigger,
            trend_vector: self.trend_vector,
            landmarks: self.landmarks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::KNOWN_PATTERNS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_known_pattern_has_a_program() {
        for pattern in KNOWN_PATTERNS {
            assert!(PatternProgram::lookup(pattern).is_some(), "{pattern}");
        }
    }

    #[test]
    fn test_unknown_pattern_falls_back() {
        assert_eq!(PatternProgram::lookup("xyz_unknown"), None);
        assert_eq!(PatternProgram::for_pattern("xyz_unknown"), PatternProgram::FALLBACK);
        assert_eq!(PatternProgram::for_pattern(""), PatternProgram::default());
    }

    #[test]
    fn test_polarity_from_tags() {
        assert_eq!(PatternProgram::for_pattern("hammer").polarity(), Polarity::Bottom);
        assert_eq!(PatternProgram::for_pattern("hanging_man").polarity(), Polarity::Top);
        assert_eq!(PatternProgram::for_pattern("shooting_star").polarity(), Polarity::Top);
        assert_eq!(PatternProgram::for_pattern("marubozu_bear").polarity(), Polarity::Top);
        assert_eq!(PatternProgram::for_pattern("doji_std").polarity(), Polarity::Bottom);
        assert_eq!(PatternProgram::for_pattern("m_top").polarity(), Polarity::Top);
        assert_eq!(PatternProgram::for_pattern("head_shoulders").polarity(), Polarity::Top);
        assert_eq!(PatternProgram::for_pattern("head_shoulders_inv").polarity(), Polarity::Bottom);
        assert_eq!(PatternProgram::for_pattern("w_bottom").polarity(), Polarity::Bottom);
        assert_eq!(PatternProgram::FALLBACK.polarity(), Polarity::Bottom);
    }

    #[test]
    fn test_bearish_recipes_mirror_bullish() {
        let bull = Trigger::MorningStar.recipe(Leg::Down);
        let bear = Trigger::EveningStar.recipe(Leg::Up);
        assert_eq!(bull.len(), 3);
        assert_eq!(bear.len(), 3);
        assert_eq!(bear[0].body, 100.0);
        assert_eq!(bear[1].gap, Some(30.0));
        assert_eq!(bear[1].body, -10.0);
        assert_eq!(bear[2].gap, Some(-30.0));
        assert_eq!(bear[2].body, -100.0);
    }

    #[test]
    fn test_dragonfly_and_gravestone_use_default_volume() {
        let dragonfly = Trigger::Dragonfly.recipe(Leg::Down);
        let gravestone = Trigger::Gravestone.recipe(Leg::Up);
        assert_eq!(dragonfly[0].volume, None);
        assert_eq!(gravestone[0].volume, None);
        assert_eq!((dragonfly[0].upper_wick, dragonfly[0].lower_wick), (Some(2.0), Some(150.0)));
        assert_eq!((gravestone[0].upper_wick, gravestone[0].lower_wick), (Some(150.0), Some(2.0)));

        let mut rng = StdRng::seed_from_u64(3);
        let config = SynthConfig::default();
        let out = PatternProgram::for_pattern("doji_dragonfly").run(&config, "X", &mut rng);
        let volume = out.series[out.trigger.unwrap()].volume;
        assert!((config.volume_min..config.volume_max).contains(&volume));
    }

    #[test]
    fn test_generic_trigger_opposes_setup() {
        assert_eq!(Trigger::Generic.recipe(Leg::Up)[0].body, -100.0);
        assert_eq!(Trigger::Generic.recipe(Leg::Down)[0].body, 100.0);
        assert_eq!(Trigger::Generic.recipe(Leg::Volatile)[0].body, 100.0);
    }

    #[test]
    fn test_phases_are_contiguous() {
        let config = SynthConfig::default();
        for pattern in KNOWN_PATTERNS.iter().chain(["nope"].iter()) {
            let mut rng = StdRng::seed_from_u64(17);
            let out = PatternProgram::for_pattern(pattern).run(&config, "X", &mut rng);
            assert_eq!(out.phases[0].start, 0);
            for pair in out.phases.windows(2) {
                assert_eq!(pair[0].end, pair[1].start, "{pattern}");
                assert!(pair[0].start <= pair[0].end);
            }
            assert!(out.phases.last().unwrap().end <= out.series.len());
            assert!(out.trigger.unwrap() < out.series.len());
        }
    }
}
