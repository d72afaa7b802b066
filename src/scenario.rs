//! Generated scenarios and annotation placement.
//!
//! A [`Scenario`] is the immutable result of running one pattern program:
//! the series, its phase segmentation, the trigger bar, at most one
//! annotation, the optional setup trend vector and the summary block.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SynthConfig;
use crate::program::{PatternProgram, Polarity};
use crate::synth::Series;
use crate::Result;

/// Label reported for cursors past the last phase
pub const COMPLETE_LABEL: &str = "Complete";

// ============================================================
// SCENARIO PARTS
// ============================================================

/// Half-open bar range `[start, end)` with a narrative label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl Phase {
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub index: usize,
    pub price: f64,
}

/// Directional marker over the setup leg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendVector {
    pub start: Point,
    pub end: Point,
}

impl TrendVector {
    /// Price change from start to end
    #[inline]
    pub fn delta(&self) -> f64 {
        self.end.price - self.start.price
    }
}

/// Vertical side of the bar an annotation is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    Bottom,
}

impl From<Polarity> for Placement {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Top => Placement::Top,
            Polarity::Bottom => Placement::Bottom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub index: usize,
    pub price: f64,
    pub label: String,
    pub placement: Placement,
}

/// Display name plus the landmarks a program may define
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub entry: Option<f64>,
    pub stop: Option<f64>,
}

/// Anchor the pattern label at the trigger bar.
///
/// Top-forming patterns label the high from above, bottom-forming ones the
/// low from below. Returns `None` when the trigger is missing, sits on the
/// first bar or lies outside the series.
pub fn place_annotation(
    series: &Series,
    trigger: Option<usize>,
    polarity: Polarity,
    label: &str,
) -> Option<Annotation> {
    let index = trigger.filter(|&i| i >= 1)?;
    let bar = series.get(index)?;
    let placement = Placement::from(polarity);
    let price = match placement {
        Placement::Top => bar.high,
        Placement::Bottom => bar.low,
    };
    Some(Annotation {
        index,
        price,
        label: label.to_owned(),
        placement,
    })
}

/// Human-readable pattern name for a lesson.
///
/// Titles of the form `"NN. Name (Alias)"` yield `Name`; anything else falls
/// back to the identifier with underscores as spaces, upper-cased.
pub fn display_name(title: &str, pattern: &str) -> String {
    match title_name(title) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => pattern.replace('_', " ").to_uppercase(),
    }
}

fn title_name(title: &str) -> Option<&str> {
    let rest = title.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == title.len() {
        return None;
    }
    let rest = rest.strip_prefix('.')?;
    let sep = rest.chars().next().filter(|c| c.is_whitespace())?;
    let rest = &rest[sep.len_utf8()..];

    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\n' {
            return None;
        }
        if c.is_whitespace() && matches!(chars.peek(), Some((_, '('))) {
            return Some(&rest[..i]);
        }
    }
    None
}

// ============================================================
// SCENARIO
// ============================================================

/// Everything generated for one lesson's pattern
#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub pattern: String,
    pub program: PatternProgram,
    pub series: Series,
    pub phases: Vec<Phase>,
    pub trigger: Option<usize>,
    pub annotations: Vec<Annotation>,
    pub trend_vector: Option<TrendVector>,
    pub summary: ScenarioSummary,
}

impl Scenario {
    #[inline]
    pub fn polarity(&self) -> Polarity {
        self.program.polarity()
    }

    #[inline]
    pub fn last_index(&self) -> Option<usize> {
        self.series.last_index()
    }

    /// Label of the phase containing `cursor`, or [`COMPLETE_LABEL`]
    pub fn phase_label(&self, cursor: usize) -> &str {
        self.phases
            .iter()
            .find(|p| p.contains(cursor))
            .map_or(COMPLETE_LABEL, |p| p.label.as_str())
    }

    pub fn annotation_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.annotations.iter().map(|a| a.index)
    }
}

/// Turns pattern identifiers into scenarios under one [`SynthConfig`]
#[derive(Debug, Clone, Default)]
pub struct ScenarioGenerator {
    config: SynthConfig,
}

impl ScenarioGenerator {
    pub fn new(config: SynthConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Generate a scenario for `pattern`, naming it from the lesson `title`.
    ///
    /// Never fails: unknown identifiers run the fallback program.
    pub fn generate<R: Rng + ?Sized>(&self, pattern: &str, title: &str, rng: &mut R) -> Scenario {
        let program = PatternProgram::for_pattern(pattern);
        let name = display_name(title, pattern);
        self.generate_program(pattern, program, name, rng)
    }

    /// Same as [`generate`](Self::generate) with the thread-local rng
    pub fn generate_fresh(&self, pattern: &str, title: &str) -> Scenario {
        self.generate(pattern, title, &mut rand::thread_rng())
    }

    /// Run an explicit program; `pattern` is only recorded.
    pub fn generate_program<R: Rng + ?Sized>(
        &self,
        pattern: &str,
        program: PatternProgram,
        name: String,
        rng: &mut R,
    ) -> Scenario {
        let out = program.run(&self.config, &name, rng);
        let annotations = place_annotation(&out.series, out.trigger, program.polarity(), &name)
            .into_iter()
            .collect();

        tracing::debug!(
            pattern,
            bars = out.series.len(),
            phases = out.phases.len(),
            trigger = ?out.trigger,
            "scenario generated"
        );

        let lm = out.landmarks;
        Scenario {
            pattern: pattern.to_owned(),
            program,
            series: out.series,
            phases: out.phases,
            trigger: out.trigger,
            annotations,
            trend_vector: out.trend_vector,
            summary: ScenarioSummary {
                name,
                support: lm.support,
                resistance: lm.resistance,
                entry: lm.entry,
                stop: lm.stop,
            },
        }
    }
}
