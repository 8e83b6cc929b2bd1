// Data model - tempo sections and playback defaults

pub mod section;
pub mod settings;

pub use section::{MAX_TEMPO, MIN_TEMPO, Section, Subdivision, TickGeometry};
pub use settings::DefaultPlaybackSettings;

/// Classical tempo marking for a BPM value, for display purposes.
pub fn tempo_marking(bpm: u32) -> Option<&'static str> {
    const MARKINGS: [(&str, u32, u32); 9] = [
        ("Grave", 20, 39),
        ("Largo", 40, 59),
        ("Lento", 60, 65),
        ("Adagio", 66, 75),
        ("Andante", 76, 107),
        ("Moderato", 108, 119),
        ("Allegro", 120, 155),
        ("Vivace", 156, 175),
        ("Presto", 176, 200),
    ];

    MARKINGS
        .iter()
        .find(|(_, min, max)| bpm >= *min && bpm <= *max)
        .map(|(name, _, _)| *name)
}
