// Playback position and session phase types

use crate::model::TickGeometry;
use std::fmt;

/// Phase of a playback session
///
/// Exactly one phase is active at a time; all transitions go through the
/// scheduler so the phase can never desynchronize from position state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Stopped,
    Precounting,
    Playing,
}

impl SessionState {
    /// Whether a scheduling loop is running (precount or real playback)
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Precounting | SessionState::Playing)
    }

    pub fn is_precounting(&self) -> bool {
        matches!(self, SessionState::Precounting)
    }
}

/// Which sound a tick triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// First subdivision of an accented beat
    Accent,
    /// First subdivision of any other beat
    Beat,
    /// Every remaining subdivision
    Sub,
}

/// Zero-indexed position within the active section
///
/// Invariants (between ticks): `tick < subdivisions_per_beat`,
/// `beat < beats_per_measure`, `measure < measures`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackPosition {
    pub measure: u32,
    pub beat: u32,
    pub tick: u32,
}

impl PlaybackPosition {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether this is the terminal tick of the section: the last
    /// subdivision of the last beat of the last measure
    ///
    /// This is the single authoritative boundary predicate; advancing from a
    /// terminal position is a section transition, never a wrap.
    pub fn is_terminal(&self, geometry: &TickGeometry) -> bool {
        self.tick >= geometry.subdivisions_per_beat - 1
            && self.beat >= geometry.beats_per_measure - 1
            && self.measure >= geometry.measures - 1
    }

    /// The next position within the same section, wrapping tick and beat
    /// counters. Callers handle terminal positions via `is_terminal` first.
    pub fn advanced(&self, geometry: &TickGeometry) -> Self {
        let mut next = *self;
        next.tick += 1;
        if next.tick >= geometry.subdivisions_per_beat {
            next.tick = 0;
            next.beat += 1;
            if next.beat >= geometry.beats_per_measure {
                next.beat = 0;
                next.measure += 1;
            }
        }
        next
    }

    /// Ticks elapsed since the start of the section
    pub fn elapsed_ticks(&self, geometry: &TickGeometry) -> u64 {
        self.measure as u64 * geometry.ticks_per_measure()
            + self.beat as u64 * geometry.subdivisions_per_beat as u64
            + self.tick as u64
    }
}

impl fmt::Display for PlaybackPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.measure + 1,
            self.beat + 1,
            self.tick + 1
        )
    }
}

/// Progress through the precount lead-in
///
/// Counts against the target section's geometry; `bar` is unbounded until
/// completion is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrecountProgress {
    pub bar: u32,
    pub beat: u32,
    pub tick: u32,
}

impl PrecountProgress {
    pub fn zero() -> Self {
        Self::default()
    }

    /// The next progress value, wrapping tick and beat counters against the
    /// target geometry; `bar` increments without bound
    pub fn advanced(&self, geometry: &TickGeometry) -> Self {
        let mut next = *self;
        next.tick += 1;
        if next.tick >= geometry.subdivisions_per_beat {
            next.tick = 0;
            next.beat += 1;
            if next.beat >= geometry.beats_per_measure {
                next.beat = 0;
                next.bar += 1;
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TickGeometry;

    fn geometry(beats: u32, subdivisions: u32, measures: u32) -> TickGeometry {
        TickGeometry::new(beats, subdivisions, measures).unwrap()
    }

    #[test]
    fn test_advance_wraps_tick_and_beat() {
        let geo = geometry(3, 2, 2);
        let mut pos = PlaybackPosition::zero();

        pos = pos.advanced(&geo);
        assert_eq!((pos.measure, pos.beat, pos.tick), (0, 0, 1));

        pos = pos.advanced(&geo);
        assert_eq!((pos.measure, pos.beat, pos.tick), (0, 1, 0));

        // Walk to the end of the first measure
        for _ in 0..4 {
            pos = pos.advanced(&geo);
        }
        assert_eq!((pos.measure, pos.beat, pos.tick), (1, 0, 0));
    }

    #[test]
    fn test_terminal_detection() {
        let geo = geometry(4, 1, 1);
        assert!(!PlaybackPosition::zero().is_terminal(&geo));

        let last = PlaybackPosition {
            measure: 0,
            beat: 3,
            tick: 0,
        };
        assert!(last.is_terminal(&geo));

        let geo_subdivided = geometry(4, 2, 1);
        assert!(!last.is_terminal(&geo_subdivided)); // tick 0 of 2 is not terminal
    }

    #[test]
    fn test_elapsed_ticks() {
        let geo = geometry(4, 3, 2);
        let pos = PlaybackPosition {
            measure: 1,
            beat: 2,
            tick: 1,
        };
        // 1 measure * 12 + 2 beats * 3 + 1
        assert_eq!(pos.elapsed_ticks(&geo), 19);
    }

    #[test]
    fn test_precount_bar_is_unbounded() {
        let geo = geometry(2, 1, 1);
        let mut progress = PrecountProgress::zero();
        for _ in 0..10 {
            progress = progress.advanced(&geo);
        }
        assert_eq!(progress.bar, 5);
        assert_eq!(progress.beat, 0);
    }

    #[test]
    fn test_session_state_queries() {
        assert!(!SessionState::Stopped.is_active());
        assert!(SessionState::Precounting.is_active());
        assert!(SessionState::Precounting.is_precounting());
        assert!(SessionState::Playing.is_active());
        assert!(!SessionState::Playing.is_precounting());
    }
}
