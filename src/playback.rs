//! Timed reveal of a generated series.
//!
//! [`PlaybackController`] is the pure state machine: it only moves when told
//! to (`tick`, `resume`, `toggle_pause`, `restart`). [`Timeline`] drives it from
//! an externally pumped clock with one periodic tick source and at most one
//! pending dwell timer.
//!
//! # States
//!
//! ```text
//!            tick                 tick onto annotation
//!   Idle ──────────► Playing ───────────────────────► AnnotationPaused
//!                    ▲  │  ▲                                 │
//!        toggle_pause│  │  └──────── resume(handle) ─────────┘
//!                    │  ▼ toggle_pause
//!               ManuallyPaused
//!
//!   Playing ── tick at last index ──► Finished
//!   any ── restart ──► Playing (cursor 0, pending dwell invalidated)
//! ```
//!
//! Dwell timers are represented by a [`DwellHandle`] stamped with the
//! controller's epoch; `restart` bumps the epoch so a handle issued before it
//! can never resume playback.

use crate::config::PlaybackConfig;
use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// Cursor at 0, no tick processed yet
    Idle,
    Playing,
    ManuallyPaused,
    /// Held at an annotation until the dwell elapses
    AnnotationPaused,
    /// Cursor reached the last index
    Finished,
}

/// Token for one scheduled auto-resume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DwellHandle {
    epoch: u64,
    index: usize,
}

impl DwellHandle {
    /// Annotation index the dwell belongs to
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced(usize),
    /// Cursor moved onto an annotation; schedule `handle` after the dwell
    AnnotationReached {
        index: usize,
        handle: DwellHandle,
    },
    Finished,
    /// Not playing; nothing happened
    Inert,
}

// ============================================================
// CONTROLLER
// ============================================================

#[derive(Debug, Clone)]
pub struct PlaybackController {
    cursor: usize,
    last_index: usize,
    marks: Vec<usize>,
    state: PlaybackState,
    epoch: u64,
    pending: Option<DwellHandle>,
}

impl PlaybackController {
    /// Controller over indices `0..=last_index` pausing at each of `marks`
    pub fn new(last_index: usize, marks: impl IntoIterator<Item = usize>) -> Self {
        let mut marks: Vec<usize> = marks.into_iter().collect();
        marks.sort_unstable();
        marks.dedup();
        Self {
            cursor: 0,
            last_index,
            marks,
            state: PlaybackState::Idle,
            epoch: 0,
            pending: None,
        }
    }

    pub fn for_scenario(scenario: &Scenario) -> Self {
        Self::new(scenario.last_index().unwrap_or(0), scenario.annotation_indices())
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// True when ticks advance the cursor
    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Idle | PlaybackState::Playing)
    }

    /// User-facing play flag: unaffected by the annotation dwell
    #[inline]
    pub fn user_playing(&self) -> bool {
        matches!(
            self.state,
            PlaybackState::Idle | PlaybackState::Playing | PlaybackState::AnnotationPaused
        )
    }

    #[inline]
    pub fn is_annotation_paused(&self) -> bool {
        self.state == PlaybackState::AnnotationPaused
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    /// Dwell currently awaiting its resume, if any
    #[inline]
    pub fn pending_dwell(&self) -> Option<DwellHandle> {
        self.pending
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Inert;
        }
        if self.cursor >= self.last_index {
            self.state = PlaybackState::Finished;
            tracing::debug!(cursor = self.cursor, "playback finished");
            return TickOutcome::Finished;
        }

        let next = self.cursor + 1;
        self.cursor = next;
        tracing::trace!(cursor = next, "cursor advanced");

        if self.marks.binary_search(&next).is_ok() {
            let handle = DwellHandle {
                epoch: self.epoch,
                index: next,
            };
            self.state = PlaybackState::AnnotationPaused;
            self.pending = Some(handle);
            tracing::debug!(index = next, "annotation pause");
            return TickOutcome::AnnotationReached {
                index: next,
                handle,
            };
        }

        self.state = PlaybackState::Playing;
        TickOutcome::Advanced(next)
    }

    /// Fire a dwell timer. Returns false for a stale or unknown handle.
    pub fn resume(&mut self, handle: DwellHandle) -> bool {
        if self.state != PlaybackState::AnnotationPaused || self.pending != Some(handle) {
            tracing::debug!(index = handle.index, epoch = handle.epoch, "stale dwell handle ignored");
            return false;
        }
        self.pending = None;
        self.state = PlaybackState::Playing;
        tracing::debug!(cursor = self.cursor, "dwell elapsed, resuming");
        true
    }

    /// User play/pause. Ignored while held at an annotation.
    pub fn toggle_pause(&mut self) -> PlaybackState {
        self.state = match self.state {
            PlaybackState::Idle | PlaybackState::Playing => PlaybackState::ManuallyPaused,
            PlaybackState::ManuallyPaused | PlaybackState::Finished => PlaybackState::Playing,
            PlaybackState::AnnotationPaused => PlaybackState::AnnotationPaused,
        };
        self.state
    }

    pub fn restart(&mut self) {
        self.epoch += 1;
        self.pending = None;
        self.cursor = 0;
        self.state = PlaybackState::Playing;
    }
}

// ============================================================
// TIMELINE
// ============================================================

/// Clock-driven wrapper owning the tick source and the dwell timer.
///
/// Time is abstract: callers pump it with [`advance`](Self::advance) in the
/// same units as [`PlaybackConfig::tick_period`] and [`PlaybackConfig::dwell`].
#[derive(Debug, Clone)]
pub struct Timeline {
    controller: PlaybackController,
    tick_period: u64,
    dwell: u64,
    now: u64,
    next_tick: Option<u64>,
    pending_dwell: Option<(u64, DwellHandle)>,
}

impl Timeline {
    pub fn new(controller: PlaybackController, config: PlaybackConfig) -> Self {
        let tick_period = config.tick_period.max(1);
        let next_tick = controller.is_playing().then_some(tick_period);
        Self {
            controller,
            tick_period,
            dwell: config.dwell,
            now: 0,
            next_tick,
            pending_dwell: None,
        }
    }

    #[inline]
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Time of the next scheduled event, if any
    pub fn next_event_at(&self) -> Option<u64> {
        match (self.next_tick, self.pending_dwell.map(|(at, _)| at)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Move the clock forward by `dt`, firing every event due on the way.
    ///
    /// Events fire in time order; a dwell due at the same instant as a tick
    /// fires first. Returns the number of ticks processed.
    pub fn advance(&mut self, dt: u64) -> usize {
        let target = self.now.saturating_add(dt);
        let mut ticks = 0;

        loop {
            let dwell_at = self.pending_dwell.map(|(at, _)| at);
            match (dwell_at, self.next_tick) {
                (Some(d), t) if d <= target && t.map_or(true, |t| d <= t) => {
                    self.now = d;
                    if let Some((_, handle)) = self.pending_dwell.take() {
                        if self.controller.resume(handle) {
                            self.schedule_tick();
                        }
                    }
                }
                (_, Some(t)) if t <= target => {
                    self.now = t;
                    self.next_tick = None;
                    ticks += 1;
                    match self.controller.tick() {
                        TickOutcome::Advanced(_) => self.schedule_tick(),
                        TickOutcome::AnnotationReached { handle, .. } => {
                            self.pending_dwell = Some((self.now.saturating_add(self.dwell), handle));
                        }
                        TickOutcome::Finished | TickOutcome::Inert => {}
                    }
                }
                _ => break,
            }
        }

        self.now = target;
        ticks
    }

    /// Restart playback and drop any pending dwell
    pub fn restart(&mut self) {
        self.controller.restart();
        self.pending_dwell = None;
        self.schedule_tick();
    }

    pub fn toggle_pause(&mut self) -> PlaybackState {
        let state = self.controller.toggle_pause();
        if self.controller.is_playing() {
            if self.next_tick.is_none() {
                self.schedule_tick();
            }
        } else if state == PlaybackState::ManuallyPaused {
            self.next_tick = None;
        }
        state
    }

    fn schedule_tick(&mut self) {
        self.next_tick = Some(self.now.saturating_add(self.tick_period));
    }
}
