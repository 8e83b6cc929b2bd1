// Tempo sections - the unit of the playback sequence
// Each section carries its own tempo (optionally ramping), meter and accents

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lowest tempo the UI offers, in BPM
pub const MIN_TEMPO: u32 = 20;
/// Highest tempo the UI offers, in BPM
pub const MAX_TEMPO: u32 = 200;

/// Subdivision of a beat
/// Determines how many ticks the scheduler fires per beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subdivision {
    Quarter,
    Eighth,
    Triplet,
    Sixteenth,
}

impl Subdivision {
    /// Ticks per beat for this subdivision
    pub fn per_beat(&self) -> u32 {
        match self {
            Subdivision::Quarter => 1,
            Subdivision::Eighth => 2,
            Subdivision::Triplet => 3,
            Subdivision::Sixteenth => 4,
        }
    }
}

impl Default for Subdivision {
    fn default() -> Self {
        Subdivision::Quarter
    }
}

impl fmt::Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Subdivision::Quarter => "Quarter",
            Subdivision::Eighth => "Eighth",
            Subdivision::Triplet => "Triplet",
            Subdivision::Sixteenth => "Sixteenth",
        };
        write!(f, "{}", name)
    }
}

/// A span of playback with fixed or ramping tempo
///
/// Sections are owned by the store and edited by the UI layer; the scheduler
/// consumes an immutable snapshot per tick, looked up by id, so edits take
/// effect on the very next tick. Fields arriving from JSON may be malformed;
/// geometry is validated when resolved, never asserted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    /// Start tempo in BPM
    pub tempo: u32,
    /// Optional end tempo; when present and different from `tempo`,
    /// the section ramps linearly between the two
    #[serde(default)]
    pub end_tempo: Option<u32>,
    /// Beats per measure (1 to 12)
    pub time_signature: u8,
    #[serde(default)]
    pub subdivision: Subdivision,
    /// Number of measures before the section loops or advances
    #[serde(default = "default_measures")]
    pub measures: u32,
    /// 0-indexed beats that receive the accent sound on their first subdivision
    #[serde(default = "default_accented_beats")]
    pub accented_beats: Vec<u8>,
    /// Repeat this section on completion instead of advancing
    #[serde(default)]
    pub is_loopable: bool,
}

fn default_measures() -> u32 {
    4
}

fn default_accented_beats() -> Vec<u8> {
    vec![0]
}

impl Section {
    /// Create a section with the given name and tempo, 4/4 quarter notes
    pub fn new(name: impl Into<String>, tempo: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tempo,
            end_tempo: None,
            time_signature: 4,
            subdivision: Subdivision::default(),
            measures: default_measures(),
            accented_beats: default_accented_beats(),
            is_loopable: false,
        }
    }

    /// Whether this section ramps between two tempos
    pub fn is_ramp(&self) -> bool {
        matches!(self.end_tempo, Some(end) if end != self.tempo)
    }

    /// Whether the given 0-indexed beat receives the accent sound
    pub fn is_accented(&self, beat: u32) -> bool {
        u8::try_from(beat)
            .map(|b| self.accented_beats.contains(&b))
            .unwrap_or(false)
    }

    /// Resolve the tick geometry for this section
    /// Returns None when any component is zero (malformed data)
    pub fn geometry(&self) -> Option<TickGeometry> {
        TickGeometry::new(
            self.time_signature as u32,
            self.subdivision.per_beat(),
            self.measures,
        )
    }
}

/// Tick geometry of a section: how many schedulable ticks it spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickGeometry {
    pub beats_per_measure: u32,
    pub subdivisions_per_beat: u32,
    pub measures: u32,
}

impl TickGeometry {
    /// Build a geometry, rejecting any zero component
    pub fn new(beats_per_measure: u32, subdivisions_per_beat: u32, measures: u32) -> Option<Self> {
        if beats_per_measure == 0 || subdivisions_per_beat == 0 || measures == 0 {
            return None;
        }
        Some(Self {
            beats_per_measure,
            subdivisions_per_beat,
            measures,
        })
    }

    /// Ticks in one measure
    pub fn ticks_per_measure(&self) -> u64 {
        self.beats_per_measure as u64 * self.subdivisions_per_beat as u64
    }

    /// Total ticks across all measures of the section
    pub fn total_ticks(&self) -> u64 {
        self.ticks_per_measure() * self.measures as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdivision_multipliers() {
        assert_eq!(Subdivision::Quarter.per_beat(), 1);
        assert_eq!(Subdivision::Eighth.per_beat(), 2);
        assert_eq!(Subdivision::Triplet.per_beat(), 3);
        assert_eq!(Subdivision::Sixteenth.per_beat(), 4);
    }

    #[test]
    fn test_section_defaults() {
        let section = Section::new("Intro", 120);
        assert_eq!(section.time_signature, 4);
        assert_eq!(section.measures, 4);
        assert_eq!(section.accented_beats, vec![0]);
        assert!(!section.is_loopable);
        assert!(!section.is_ramp());
    }

    #[test]
    fn test_ramp_detection() {
        let mut section = Section::new("Ramp", 100);
        assert!(!section.is_ramp());

        section.end_tempo = Some(100);
        assert!(!section.is_ramp()); // equal tempos are not a ramp

        section.end_tempo = Some(140);
        assert!(section.is_ramp());
    }

    #[test]
    fn test_accent_lookup() {
        let mut section = Section::new("Accents", 120);
        section.accented_beats = vec![0, 2];

        assert!(section.is_accented(0));
        assert!(!section.is_accented(1));
        assert!(section.is_accented(2));
        assert!(!section.is_accented(300)); // out of u8 range
    }

    #[test]
    fn test_geometry_resolution() {
        let section = Section::new("Geo", 120);
        let geometry = section.geometry().unwrap();
        assert_eq!(geometry.beats_per_measure, 4);
        assert_eq!(geometry.subdivisions_per_beat, 1);
        assert_eq!(geometry.total_ticks(), 16);
    }

    #[test]
    fn test_geometry_rejects_zero_components() {
        assert!(TickGeometry::new(0, 1, 1).is_none());
        assert!(TickGeometry::new(4, 0, 1).is_none());
        assert!(TickGeometry::new(4, 1, 0).is_none());

        let mut section = Section::new("Broken", 120);
        section.measures = 0;
        assert!(section.geometry().is_none());
    }

    #[test]
    fn test_serde_defaults_for_optional_fields() {
        // Minimal JSON as an older preset might store it
        let json = r#"{ "tempo": 90, "time_signature": 3 }"#;
        let section: Section = serde_json::from_str(json).unwrap();

        assert_eq!(section.tempo, 90);
        assert_eq!(section.time_signature, 3);
        assert_eq!(section.end_tempo, None);
        assert_eq!(section.subdivision, Subdivision::Quarter);
        assert_eq!(section.measures, 4);
        assert_eq!(section.accented_beats, vec![0]);
        assert!(!section.is_loopable);
        assert!(!section.id.is_nil()); // generated, not defaulted to nil
    }

    #[test]
    fn test_serde_round_trip() {
        let mut section = Section::new("Chorus", 140);
        section.end_tempo = Some(160);
        section.subdivision = Subdivision::Triplet;
        section.accented_beats = vec![0, 3];
        section.is_loopable = true;

        let json = serde_json::to_string(&section).unwrap();
        let restored: Section = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, section);
    }
}
