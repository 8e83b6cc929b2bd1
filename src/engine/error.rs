// Engine error types
// Every variant is fatal to the current playback session: the scheduler
// halts the loop instead of retrying or panicking

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(
        "section has invalid tick geometry \
         ({beats_per_measure} beats, {subdivisions_per_beat} subdivisions, {measures} measures)"
    )]
    InvalidGeometry {
        beats_per_measure: u32,
        subdivisions_per_beat: u32,
        measures: u32,
    },

    #[error("tick duration is not schedulable at {bpm} BPM")]
    NonFiniteTempo { bpm: f64 },

    #[error("active section {0} no longer exists")]
    MissingSection(Uuid),

    #[error("no active section to play")]
    NoActiveSection,
}
