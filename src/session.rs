//! One active lesson view: its scenario, its playback timeline and its frame.
//!
//! Switching lessons drops the previous scenario together with its timeline,
//! so no tick or dwell timer of the old lesson can touch the new one.

use rand::Rng;

use crate::catalog::Lesson;
use crate::config::PlaybackConfig;
use crate::playback::{PlaybackController, PlaybackState, Timeline};
use crate::scenario::{Scenario, ScenarioGenerator};
use crate::view::{Frame, ViewWindow};

#[derive(Debug, Clone)]
pub struct LessonView {
    generator: ScenarioGenerator,
    config: PlaybackConfig,
    window: ViewWindow,
    lesson_id: String,
    scenario: Scenario,
    timeline: Timeline,
}

impl LessonView {
    /// Open `lesson` with default settings and a fresh random draw
    pub fn open(lesson: &Lesson) -> Self {
        Self::open_with(
            ScenarioGenerator::default(),
            PlaybackConfig::default(),
            lesson,
            &mut rand::thread_rng(),
        )
    }

    pub fn open_with<R: Rng + ?Sized>(
        generator: ScenarioGenerator,
        config: PlaybackConfig,
        lesson: &Lesson,
        rng: &mut R,
    ) -> Self {
        let scenario = generator.generate(&lesson.pattern, &lesson.title, rng);
        let timeline = Timeline::new(PlaybackController::for_scenario(&scenario), config);
        Self {
            generator,
            config,
            window: ViewWindow::new(config),
            lesson_id: lesson.id.clone(),
            scenario,
            timeline,
        }
    }

    /// Switch to `lesson`. Returns false when it is already showing.
    pub fn select(&mut self, lesson: &Lesson) -> bool {
        self.select_with(lesson, &mut rand::thread_rng())
    }

    pub fn select_with<R: Rng + ?Sized>(&mut self, lesson: &Lesson, rng: &mut R) -> bool {
        if lesson.id == self.lesson_id && lesson.pattern == self.scenario.pattern {
            return false;
        }
        tracing::debug!(from = %self.lesson_id, to = %lesson.id, pattern = %lesson.pattern, "lesson switch");

        self.scenario = self.generator.generate(&lesson.pattern, &lesson.title, rng);
        self.timeline = Timeline::new(PlaybackController::for_scenario(&self.scenario), self.config);
        self.lesson_id.clone_from(&lesson.id);
        true
    }

    pub fn advance(&mut self, dt: u64) -> usize {
        self.timeline.advance(dt)
    }

    pub fn restart(&mut self) {
        self.timeline.restart();
    }

    pub fn toggle_pause(&mut self) -> PlaybackState {
        self.timeline.toggle_pause()
    }

    pub fn frame(&self) -> Frame<'_> {
        self.window.project(&self.scenario, self.timeline.controller())
    }

    #[inline]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    #[inline]
    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    #[inline]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open(lesson: &Lesson, seed: u64) -> LessonView {
        let mut rng = StdRng::seed_from_u64(seed);
        LessonView::open_with(ScenarioGenerator::default(), PlaybackConfig::default(), lesson, &mut rng)
    }

    #[test]
    fn test_open_starts_at_zero() {
        let view = open(&Lesson::new("a", "01. Hammer (Hammer)", "hammer"), 1);
        let frame = view.frame();
        assert_eq!(frame.cursor, 0);
        assert!(frame.playing);
        assert_eq!(frame.bars.len(), 1);
        assert_eq!(view.scenario().summary.name, "Hammer");
    }

    #[test]
    fn test_select_same_lesson_is_noop() {
        let lesson = Lesson::new("a", "01. Hammer (Hammer)", "hammer");
        let mut view = open(&lesson, 1);
        view.advance(1_500);
        let close = view.scenario().series[5].close;

        let mut rng = StdRng::seed_from_u64(2);
        assert!(!view.select_with(&lesson, &mut rng));
        assert_eq!(view.frame().cursor, 10);
        assert_eq!(view.scenario().series[5].close, close);
    }

    #[test]
    fn test_switch_cancels_pending_dwell() {
        let mut view = open(&Lesson::new("a", "", "hammer"), 3);
        // ticks every 150 reach the trigger at 65
        view.advance(65 * 150);
        assert!(view.frame().annotation_paused);

        let mut rng = StdRng::seed_from_u64(4);
        assert!(view.select_with(&Lesson::new("b", "", "m_top"), &mut rng));
        assert_eq!(view.lesson_id(), "b");
        assert_eq!(view.frame().cursor, 0);
        assert!(!view.frame().annotation_paused);

        // the old dwell would have resumed here; the new series keeps ticking
        view.advance(3_000);
        assert_eq!(view.frame().cursor, 20);
        assert_eq!(view.scenario().pattern, "m_top");
    }

    #[test]
    fn test_same_id_new_pattern_regenerates() {
        let mut view = open(&Lesson::new("a", "", "hammer"), 5);
        let mut rng = StdRng::seed_from_u64(6);
        assert!(view.select_with(&Lesson::new("a", "", "flag_bull"), &mut rng));
        assert_eq!(view.scenario().pattern, "flag_bull");
    }

    #[test]
    fn test_restart_and_pause() {
        let mut view = open(&Lesson::new("a", "", "hammer"), 7);
        view.advance(900);
        assert_eq!(view.toggle_pause(), PlaybackState::ManuallyPaused);
        view.advance(900);
        assert_eq!(view.frame().cursor, 6);
        view.restart();
        assert_eq!(view.frame().cursor, 0);
        assert!(view.frame().playing);
    }
}
