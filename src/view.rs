//! View window projection: what a renderer draws for the current cursor.

use serde::Serialize;

use crate::config::PlaybackConfig;
use crate::playback::PlaybackController;
use crate::scenario::{Annotation, Scenario, TrendVector};
use crate::synth::Bar;

/// Padded y-axis range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

/// Render target for one tick
#[derive(Debug, Clone, Serialize)]
pub struct Frame<'a> {
    /// First visible index
    pub start: usize,
    /// Last visible index
    pub cursor: usize,
    pub bars: &'a [Bar],
    pub bounds: Option<AxisBounds>,
    pub phase_label: &'a str,
    pub annotations: Vec<&'a Annotation>,
    pub trend_vector: Option<&'a TrendVector>,
    pub playing: bool,
    pub annotation_paused: bool,
}

/// Fixed look-back window over a scenario
#[derive(Debug, Clone, Copy)]
pub struct ViewWindow {
    width: usize,
    padding: f64,
}

impl Default for ViewWindow {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl ViewWindow {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            width: config.window.get(),
            padding: config.axis_padding.get(),
        }
    }

    #[inline]
    pub fn window_start(&self, cursor: usize) -> usize {
        cursor.saturating_sub(self.width)
    }

    /// Frame for the controller's cursor, carrying its playback flags
    pub fn project<'a>(&self, scenario: &'a Scenario, controller: &PlaybackController) -> Frame<'a> {
        let mut frame = self.project_at(scenario, controller.cursor());
        frame.playing = controller.user_playing();
        frame.annotation_paused = controller.is_annotation_paused();
        frame
    }

    /// Frame for an arbitrary cursor; the cursor is clamped to the series.
    pub fn project_at<'a>(&self, scenario: &'a Scenario, cursor: usize) -> Frame<'a> {
        let cursor = cursor.min(scenario.last_index().unwrap_or(0));
        let start = self.window_start(cursor);
        let bars = scenario.series.slice(start..cursor + 1);
        let in_view = |index: usize| start <= index && index <= cursor;

        Frame {
            start,
            cursor,
            bars,
            bounds: self.bounds(bars),
            phase_label: scenario.phase_label(cursor),
            annotations: scenario.annotations.iter().filter(|a| in_view(a.index)).collect(),
            trend_vector: scenario
                .trend_vector
                .as_ref()
                .filter(|tv| tv.start.index >= start && tv.end.index <= cursor),
            playing: false,
            annotation_paused: false,
        }
    }

    fn bounds(&self, bars: &[Bar]) -> Option<AxisBounds> {
        let (low, high) = bars.iter().fold(None, |acc: Option<(f64, f64)>, b| {
            Some(acc.map_or((b.low, b.high), |(lo, hi)| (lo.min(b.low), hi.max(b.high))))
        })?;
        let pad = (high - low) * self.padding;
        Some(AxisBounds {
            min: low - pad,
            max: high + pad,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::Timeline;
    use crate::scenario::{ScenarioGenerator, COMPLETE_LABEL};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scenario(pattern: &str) -> Scenario {
        let mut rng = StdRng::seed_from_u64(99);
        ScenarioGenerator::default().generate(pattern, "01. Hammer (Hammer)", &mut rng)
    }

    #[test]
    fn test_window_slice() {
        let s = scenario("hammer");
        let view = ViewWindow::default();

        let early = view.project_at(&s, 10);
        assert_eq!(early.start, 0);
        assert_eq!(early.bars.len(), 11);

        let late = view.project_at(&s, 90);
        assert_eq!(late.start, 10);
        assert_eq!(late.bars.len(), 81);
        assert_eq!(late.bars[0].index, 10);
        assert_eq!(late.bars.last().unwrap().index, 90);
    }

    #[test]
    fn test_axis_padding() {
        let s = scenario("hammer");
        let frame = ViewWindow::default().project_at(&s, 30);
        let low = frame.bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let high = frame.bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let bounds = frame.bounds.unwrap();
        assert!((bounds.min - (low - 0.2 * (high - low))).abs() < 1e-9);
        assert!((bounds.max - (high + 0.2 * (high - low))).abs() < 1e-9);
    }

    #[test]
    fn test_annotation_and_vector_visibility() {
        let s = scenario("hammer");
        let view = ViewWindow::default();

        let before = view.project_at(&s, 63);
        assert!(before.annotations.is_empty());
        assert!(before.trend_vector.is_none());

        let at = view.project_at(&s, 65);
        assert_eq!(at.annotations.len(), 1);
        assert!(at.trend_vector.is_some());
        assert_eq!(at.phase_label, "Pattern confirmed: Hammer");

        let narrow = ViewWindow::new(PlaybackConfig {
            window: crate::Period::new_const(20),
            ..PlaybackConfig::default()
        });
        // setup leg starts at 40, out of view once the window starts past it
        assert!(narrow.project_at(&s, 60).trend_vector.is_none());
        assert!(narrow.project_at(&s, 64).trend_vector.is_none());
        assert_eq!(narrow.project_at(&s, 64).annotations.len(), 0);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let s = scenario("hammer");
        let frame = ViewWindow::default().project_at(&s, 10_000);
        assert_eq!(frame.cursor, 95);
        assert_eq!(frame.phase_label, "Follow-through");
        assert_ne!(frame.phase_label, COMPLETE_LABEL);
    }

    #[test]
    fn test_project_carries_flags() {
        let s = scenario("hammer");
        let mut pc = PlaybackController::for_scenario(&s);
        for _ in 0..65 {
            pc.tick();
        }
        let frame = ViewWindow::default().project(&s, &pc);
        assert_eq!(frame.cursor, 65);
        assert!(frame.annotation_paused);
        assert!(frame.playing);

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["annotation_paused"], true);
        assert_eq!(json["playing"], true);
        assert_eq!(json["bars"].as_array().unwrap().len(), 66);
    }

    #[test]
    fn test_dwell_keeps_play_flag_on_timeline() {
        let s = scenario("hammer");
        let view = ViewWindow::default();
        let mut tl = Timeline::new(PlaybackController::for_scenario(&s), PlaybackConfig::default());

        tl.advance(65 * 150);
        let held = view.project(&s, tl.controller());
        assert_eq!(held.cursor, 65);
        assert!(held.annotation_paused);
        assert!(held.playing);

        tl.advance(3_000);
        let resumed = view.project(&s, tl.controller());
        assert!(!resumed.annotation_paused);
        assert!(resumed.playing);

        tl.toggle_pause();
        let paused = view.project(&s, tl.controller());
        assert!(!paused.playing);
        assert!(!paused.annotation_paused);

        tl.toggle_pause();
        tl.advance(1_000_000);
        let done = view.project(&s, tl.controller());
        assert!(tl.controller().is_finished());
        assert!(!done.playing);
    }
}
