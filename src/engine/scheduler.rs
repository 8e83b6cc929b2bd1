// Playback scheduler - the self-rescheduling tick loop
//
// Each firing computes the delay of the next firing individually, because
// the tick duration can change between any two ticks (manual tempo edits,
// ramps, section transitions). The scheduler owns the position counters and
// the session phase; everything else is re-read from the store at every tick
// boundary so edits take effect on the very next tick.
//
// Timing discipline: an absolute due timestamp is kept and advanced
// additively while the tempo is stable, which keeps 1000 ticks at 120 BPM
// at exactly 500 ms apart with no accumulated rounding. When the tempo for
// the next tick moves by more than the epsilon (a ramp step, a manual edit
// or a section change) the due timestamp is re-anchored to now instead, so
// a tempo jump never compounds stale delay.

use super::error::EngineError;
use super::position::{PlaybackPosition, PrecountProgress, SessionState, TickKind};
use super::precount::{PrecountSequencer, PrecountStep};
use super::tempo::{effective_tempo, tick_duration_ms};
use crate::model::{Section, TickGeometry};
use crate::store::SectionStore;
use uuid::Uuid;

/// Tempo change below which the due timestamp advances additively
pub const TEMPO_EPSILON_BPM: f64 = 0.5;

/// One scheduled click, handed to the sink for sound triggering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickEvent {
    pub kind: TickKind,
    /// Timestamp the tick was scheduled for, in session milliseconds
    pub scheduled_at_ms: f64,
    /// Precount ticks use the precount sound palette
    pub is_precount: bool,
    /// Section the tick belongs to; nil in default (no sections) mode
    pub section_id: Uuid,
    /// Measure during playback, bar during precount
    pub measure: u32,
    pub beat: u32,
    pub tick: u32,
}

/// Receives one call per unique tick; how sound is produced is not the
/// scheduler's concern
pub trait TickSink {
    fn on_tick(&mut self, event: &TickEvent);
}

/// Identity of an emitted tick, used to suppress duplicate triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickStamp {
    is_precount: bool,
    section_id: Uuid,
    measure: u32,
    beat: u32,
    tick: u32,
}

/// Section snapshot plus validated geometry for one tick
struct TickContext {
    section: Section,
    geometry: TickGeometry,
}

fn resolve_geometry(section: &Section) -> Result<TickGeometry, EngineError> {
    section.geometry().ok_or(EngineError::InvalidGeometry {
        beats_per_measure: section.time_signature as u32,
        subdivisions_per_beat: section.subdivision.per_beat(),
        measures: section.measures,
    })
}

/// Sound class for the first subdivision of a beat, or `Sub` otherwise
fn classify_tick(section: &Section, beat: u32, tick: u32) -> TickKind {
    if tick != 0 {
        TickKind::Sub
    } else if section.is_accented(beat) {
        TickKind::Accent
    } else {
        TickKind::Beat
    }
}

/// Drives a playback session tick by tick
///
/// The caller owns the timer: `start` returns the delay until the first
/// timer fire and `on_timer` returns the delay until the next, or `None`
/// once the session has stopped. Timestamps are caller-supplied so tests
/// can drive the loop with a manual clock.
#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    state: SessionState,
    position: PlaybackPosition,
    precount: PrecountSequencer,
    due_ms: f64,
    last_tempo: f64,
    last_emitted: Option<TickStamp>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_state(&self) -> SessionState {
        self.state
    }

    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    pub fn precount_progress(&self) -> Option<PrecountProgress> {
        self.precount.progress()
    }

    /// Begin a session: emits the tick for position zero, anchors the due
    /// timestamp and returns the delay until the next tick
    ///
    /// Any prior session state is fully reset first. The precount
    /// configuration is read here once; toggling it mid-session has no
    /// effect until the next start. Errors leave the scheduler stopped.
    pub fn start(
        &mut self,
        store: &mut SectionStore,
        sink: &mut dyn TickSink,
        now_ms: f64,
    ) -> Result<f64, EngineError> {
        self.reset();

        let target_id = match store.active_section() {
            Some(section) => section.id,
            None => Uuid::nil(),
        };

        let result = if store.precount_enabled() && store.precount_bars() > 0 {
            self.precount.start(store.precount_bars(), target_id);
            self.state = SessionState::Precounting;
            self.begin_tick(store, sink, now_ms, true)
        } else {
            self.state = SessionState::Playing;
            self.begin_tick(store, sink, now_ms, false)
        };

        if result.is_err() {
            self.reset();
        }
        result
    }

    /// Handle a timer fire: advance one tick, emit its sound, and return
    /// the delay until the next fire (`None` once the session has ended)
    ///
    /// Errors halt the session; the loop must not be re-armed after one.
    pub fn on_timer(
        &mut self,
        store: &mut SectionStore,
        sink: &mut dyn TickSink,
        now_ms: f64,
    ) -> Result<Option<f64>, EngineError> {
        if !self.state.is_active() {
            return Ok(None);
        }
        match self.step(store, sink, now_ms) {
            Ok(delay) => Ok(delay),
            Err(error) => {
                self.reset();
                Err(error)
            }
        }
    }

    /// Halt the session and leave the first section visually active
    pub fn stop(&mut self, store: &mut SectionStore) {
        self.reset();
        store.set_active_section(None);
    }

    fn reset(&mut self) {
        self.state = SessionState::Stopped;
        self.position = PlaybackPosition::zero();
        self.precount.cancel();
        self.due_ms = 0.0;
        self.last_tempo = 0.0;
        self.last_emitted = None;
    }

    fn reset_position(&mut self) {
        self.position = PlaybackPosition::zero();
        // A fresh pass may revisit the exact same tuple (single-tick loops)
        self.last_emitted = None;
    }

    /// Emit the tick for the just-established zero position and anchor the
    /// due timestamp
    fn begin_tick(
        &mut self,
        store: &SectionStore,
        sink: &mut dyn TickSink,
        now_ms: f64,
        precounting: bool,
    ) -> Result<f64, EngineError> {
        let (tempo, duration) = self.current_timing(store)?;
        if precounting {
            let context = self.resolve_precount_context(store)?;
            self.emit_precount_tick(sink, &context, now_ms);
        } else {
            let context = self.resolve_playback_context(store)?;
            self.emit_playback_tick(sink, &context, now_ms);
        }
        self.due_ms = now_ms + duration;
        self.last_tempo = tempo;
        Ok(duration)
    }

    fn step(
        &mut self,
        store: &mut SectionStore,
        sink: &mut dyn TickSink,
        now_ms: f64,
    ) -> Result<Option<f64>, EngineError> {
        // Timing of the tick that just elapsed, re-derived from current
        // store state so mid-session edits are already in effect here
        let (_, elapsed_duration) = self.current_timing(store)?;

        match self.state {
            SessionState::Precounting => self.advance_precount(store, sink, now_ms)?,
            SessionState::Playing => self.advance_playback(store, sink, now_ms)?,
            SessionState::Stopped => {}
        }

        if !self.state.is_active() {
            return Ok(None);
        }

        // Look-ahead: the delay until the following fire is governed by the
        // tempo of the tick just emitted, which after a transition belongs
        // to a different section than the elapsed tick did
        let (next_tempo, next_duration) = self.current_timing(store)?;

        if (next_tempo - self.last_tempo).abs() > TEMPO_EPSILON_BPM {
            self.due_ms = now_ms + next_duration;
        } else {
            self.due_ms += elapsed_duration;
        }
        self.last_tempo = next_tempo;

        Ok(Some((self.due_ms - now_ms).max(0.0)))
    }

    /// Effective tempo and tick duration at the current state and position
    fn current_timing(&self, store: &SectionStore) -> Result<(f64, f64), EngineError> {
        match self.state {
            SessionState::Precounting => {
                let context = self.resolve_precount_context(store)?;
                // Precount always counts at the target's start tempo
                let tempo = context.section.tempo as f64;
                let duration = tick_duration_ms(tempo, context.geometry.subdivisions_per_beat)?;
                Ok((tempo, duration))
            }
            _ => {
                let context = self.resolve_playback_context(store)?;
                let tempo = effective_tempo(&context.section, &self.position, &context.geometry);
                let duration = tick_duration_ms(tempo, context.geometry.subdivisions_per_beat)?;
                Ok((tempo, duration))
            }
        }
    }

    /// Section and geometry for a playback tick: the active section, or the
    /// synthetic default section when no sections are authored
    fn resolve_playback_context(&self, store: &SectionStore) -> Result<TickContext, EngineError> {
        let section = match store.active_section() {
            Some(section) => section.clone(),
            None if store.is_empty() => store.fallback_section(),
            None => return Err(EngineError::NoActiveSection),
        };
        let geometry = resolve_geometry(&section)?;
        Ok(TickContext { section, geometry })
    }

    /// Section and geometry for a precount tick: the count-in target
    fn resolve_precount_context(&self, store: &SectionStore) -> Result<TickContext, EngineError> {
        let target = self.precount.target().ok_or(EngineError::NoActiveSection)?;
        let section = if target.is_nil() {
            store.fallback_section()
        } else {
            store
                .section(target)
                .cloned()
                .ok_or(EngineError::MissingSection(target))?
        };
        let geometry = resolve_geometry(&section)?;
        Ok(TickContext { section, geometry })
    }

    fn advance_precount(
        &mut self,
        store: &mut SectionStore,
        sink: &mut dyn TickSink,
        now_ms: f64,
    ) -> Result<(), EngineError> {
        let target = self.precount.target().ok_or(EngineError::NoActiveSection)?;
        let context = self.resolve_precount_context(store)?;

        match self.precount.advance(&context.geometry) {
            Some(PrecountStep::Complete) => {
                self.state = SessionState::Playing;
                self.reset_position();
                if !target.is_nil() {
                    store.set_active_section(Some(target));
                }
                let context = self.resolve_playback_context(store)?;
                self.emit_playback_tick(sink, &context, now_ms);
            }
            Some(PrecountStep::Continue) => {
                self.emit_precount_tick(sink, &context, now_ms);
            }
            None => {
                self.state = SessionState::Stopped;
            }
        }
        Ok(())
    }

    fn advance_playback(
        &mut self,
        store: &mut SectionStore,
        sink: &mut dyn TickSink,
        now_ms: f64,
    ) -> Result<(), EngineError> {
        let context = self.resolve_playback_context(store)?;

        if !self.position.is_terminal(&context.geometry) {
            self.position = self.position.advanced(&context.geometry);
            self.emit_playback_tick(sink, &context, now_ms);
            return Ok(());
        }

        // Boundary policy, in priority order
        if context.section.id.is_nil() || context.section.is_loopable {
            // Default mode always loops; loopable sections repeat themselves
            self.reset_position();
            self.emit_playback_tick(sink, &context, now_ms);
        } else if let Some(next_id) = store.section_after(context.section.id).map(|s| s.id) {
            store.set_active_section(Some(next_id));
            self.reset_position();
            let context = self.resolve_playback_context(store)?;
            self.emit_playback_tick(sink, &context, now_ms);
        } else if store.global_loop() {
            store.set_active_section(None); // back to the first section
            self.reset_position();
            let context = self.resolve_playback_context(store)?;
            self.emit_playback_tick(sink, &context, now_ms);
        } else {
            // Sequence over: stop, first section stays visually active
            self.state = SessionState::Stopped;
            self.reset_position();
            store.set_active_section(None);
        }
        Ok(())
    }

    fn emit_playback_tick(&mut self, sink: &mut dyn TickSink, context: &TickContext, now_ms: f64) {
        let stamp = TickStamp {
            is_precount: false,
            section_id: context.section.id,
            measure: self.position.measure,
            beat: self.position.beat,
            tick: self.position.tick,
        };
        if self.last_emitted == Some(stamp) {
            return;
        }
        self.last_emitted = Some(stamp);
        sink.on_tick(&TickEvent {
            kind: classify_tick(&context.section, self.position.beat, self.position.tick),
            scheduled_at_ms: now_ms,
            is_precount: false,
            section_id: context.section.id,
            measure: self.position.measure,
            beat: self.position.beat,
            tick: self.position.tick,
        });
    }

    fn emit_precount_tick(&mut self, sink: &mut dyn TickSink, context: &TickContext, now_ms: f64) {
        let Some(progress) = self.precount.progress() else {
            return;
        };
        let stamp = TickStamp {
            is_precount: true,
            section_id: context.section.id,
            measure: progress.bar,
            beat: progress.beat,
            tick: progress.tick,
        };
        if self.last_emitted == Some(stamp) {
            return;
        }
        self.last_emitted = Some(stamp);
        sink.on_tick(&TickEvent {
            kind: classify_tick(&context.section, progress.beat, progress.tick),
            scheduled_at_ms: now_ms,
            is_precount: true,
            section_id: context.section.id,
            measure: progress.bar,
            beat: progress.beat,
            tick: progress.tick,
        });
    }
}
