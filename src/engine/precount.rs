// Precount sequencer - counts in before real playback starts
//
// The precount plays against the target section's geometry but always at the
// section's start tempo; ramps only begin once real playback does. Progress
// is advanced by the scheduler one tick at a time and completion is reported
// back so the scheduler owns the phase transition.

use super::position::PrecountProgress;
use crate::model::TickGeometry;
use uuid::Uuid;

/// Outcome of advancing the precount by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecountStep {
    /// More precount ticks remain
    Continue,
    /// The configured bars have elapsed; real playback starts on this tick
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum PrecountState {
    #[default]
    Idle,
    Active {
        /// Section that playback will start on once the count-in finishes
        target: Uuid,
        bars: u32,
        progress: PrecountProgress,
    },
}

/// Counts whole bars of the target section before playback begins
#[derive(Debug, Clone, Default)]
pub struct PrecountSequencer {
    state: PrecountState,
}

impl PrecountSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a count-in of `bars` bars toward the given target section
    /// A zero bar count completes on the first advance
    pub fn start(&mut self, bars: u32, target: Uuid) {
        self.state = PrecountState::Active {
            target,
            bars,
            progress: PrecountProgress::zero(),
        };
    }

    /// Abandon any in-flight count-in; no-op when idle
    pub fn cancel(&mut self) {
        self.state = PrecountState::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PrecountState::Active { .. })
    }

    pub fn target(&self) -> Option<Uuid> {
        match &self.state {
            PrecountState::Active { target, .. } => Some(*target),
            PrecountState::Idle => None,
        }
    }

    pub fn progress(&self) -> Option<PrecountProgress> {
        match &self.state {
            PrecountState::Active { progress, .. } => Some(*progress),
            PrecountState::Idle => None,
        }
    }

    /// Advance one tick against the target section's geometry
    ///
    /// Returns `Complete` (and goes idle) once the wrapped counters land on
    /// the downbeat after the configured number of bars. Returns `Continue`
    /// while ticks remain, and `None` when no count-in is active.
    pub fn advance(&mut self, geometry: &TickGeometry) -> Option<PrecountStep> {
        let PrecountState::Active {
            bars, progress, ..
        } = &mut self.state
        else {
            return None;
        };

        let next = progress.advanced(geometry);
        if next.bar >= *bars && next.beat == 0 && next.tick == 0 {
            self.state = PrecountState::Idle;
            return Some(PrecountStep::Complete);
        }
        *progress = next;
        Some(PrecountStep::Continue)
    }
}
