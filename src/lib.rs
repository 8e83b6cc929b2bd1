// Tempo Flow - Metronome playback engine library exports

pub mod audio;
pub mod engine;
pub mod model;
pub mod store;

// Re-export commonly used types for convenience
pub use audio::{AudioError, AudioOutput, ClickMixer, ClickTrigger, SoundSet};
pub use engine::{
    EngineError, PlaybackDriver, PlaybackPosition, PlaybackScheduler, Player, PlayheadSnapshot,
    PrecountProgress, PrecountSequencer, SessionState, TickEvent, TickKind, TickSink,
};
pub use model::{DefaultPlaybackSettings, Section, Subdivision, TickGeometry};
pub use store::SectionStore;
