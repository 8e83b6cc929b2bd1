// Tempo model - effective tempo and tick duration
//
// Pure computations: the scheduler feeds in a section snapshot and the
// current position, and gets back the BPM in effect for that exact tick.
// Ramp sections interpolate linearly across their tick span; the value is
// deliberately unrounded so duration math accumulates no display-rounding
// drift. Callers round only for display.

use super::error::EngineError;
use crate::model::{Section, TickGeometry};

use super::position::PlaybackPosition;

/// Effective tempo in BPM for the given tick of a section
///
/// Constant sections return `tempo` at every position. Ramp sections
/// interpolate from `tempo` at the first tick to `end_tempo` at the last
/// tick, so a one-measure 4/4 quarter ramp hits the end tempo exactly on
/// beat four.
pub fn effective_tempo(
    section: &Section,
    position: &PlaybackPosition,
    geometry: &TickGeometry,
) -> f64 {
    let start = section.tempo as f64;
    let Some(end) = section.end_tempo else {
        return start;
    };
    if end == section.tempo {
        return start;
    }

    let total_ticks = geometry.total_ticks();
    if total_ticks <= 1 {
        return start;
    }

    let elapsed = position
        .elapsed_ticks(geometry)
        .min(total_ticks - 1);
    let progress = (elapsed as f64 / (total_ticks - 1) as f64).clamp(0.0, 1.0);

    start + (end as f64 - start) * progress
}

/// Duration of one subdivision tick in milliseconds
///
/// `60000 / bpm / subdivisions`. A non-finite or non-positive result means
/// the section data is corrupt; the caller must stop the session rather
/// than schedule a zero, negative or infinite delay.
pub fn tick_duration_ms(tempo_bpm: f64, subdivisions_per_beat: u32) -> Result<f64, EngineError> {
    let duration = 60_000.0 / tempo_bpm / subdivisions_per_beat as f64;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(EngineError::NonFiniteTempo { bpm: tempo_bpm });
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Subdivision;

    fn ramp_section() -> Section {
        let mut section = Section::new("Ramp", 100);
        section.end_tempo = Some(140);
        section.measures = 1;
        section.time_signature = 4;
        section.subdivision = Subdivision::Quarter;
        section
    }

    fn position(measure: u32, beat: u32, tick: u32) -> PlaybackPosition {
        PlaybackPosition {
            measure,
            beat,
            tick,
        }
    }

    #[test]
    fn test_ramp_boundaries_and_monotonicity() {
        let section = ramp_section();
        let geometry = section.geometry().unwrap();
        assert_eq!(geometry.total_ticks(), 4);

        // Exactly the start tempo on the first tick, the end tempo on the last
        assert_eq!(
            effective_tempo(&section, &position(0, 0, 0), &geometry),
            100.0
        );
        assert_eq!(
            effective_tempo(&section, &position(0, 3, 0), &geometry),
            140.0
        );

        let mut previous = f64::MIN;
        for beat in 0..4 {
            let tempo = effective_tempo(&section, &position(0, beat, 0), &geometry);
            assert!(tempo >= previous);
            previous = tempo;
        }
    }

    #[test]
    fn test_constant_tempo_everywhere() {
        let mut section = Section::new("Steady", 96);
        section.measures = 2;
        let geometry = section.geometry().unwrap();

        assert_eq!(
            effective_tempo(&section, &position(0, 0, 0), &geometry),
            96.0
        );
        assert_eq!(
            effective_tempo(&section, &position(1, 3, 0), &geometry),
            96.0
        );

        // end_tempo equal to tempo is still constant
        section.end_tempo = Some(96);
        assert_eq!(
            effective_tempo(&section, &position(1, 2, 0), &geometry),
            96.0
        );
    }

    #[test]
    fn test_elapsed_ticks_clamped_past_boundary() {
        let section = ramp_section();
        let geometry = section.geometry().unwrap();

        // A momentarily out-of-range position clamps to the last tick
        let past_end = position(5, 0, 0);
        assert_eq!(effective_tempo(&section, &past_end, &geometry), 140.0);
    }

    #[test]
    fn test_single_tick_section_uses_start_tempo() {
        let mut section = ramp_section();
        section.time_signature = 1;
        let geometry = section.geometry().unwrap();
        assert_eq!(geometry.total_ticks(), 1);
        assert_eq!(
            effective_tempo(&section, &position(0, 0, 0), &geometry),
            100.0
        );
    }

    #[test]
    fn test_tick_duration_formula() {
        // 120 BPM eighth notes: 60000 / 120 / 2
        assert_eq!(tick_duration_ms(120.0, 2).unwrap(), 250.0);
        assert_eq!(tick_duration_ms(60.0, 1).unwrap(), 1000.0);
    }

    #[test]
    fn test_tick_duration_rejects_bad_tempo() {
        assert!(matches!(
            tick_duration_ms(0.0, 1),
            Err(EngineError::NonFiniteTempo { .. })
        ));
        assert!(matches!(
            tick_duration_ms(-10.0, 2),
            Err(EngineError::NonFiniteTempo { .. })
        ));
        assert!(matches!(
            tick_duration_ms(f64::NAN, 1),
            Err(EngineError::NonFiniteTempo { .. })
        ));
    }
}
