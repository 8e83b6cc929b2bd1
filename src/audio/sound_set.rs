// Sound sets - named click palettes
// Each set defines oscillator parameters for the three tick kinds; a
// separate palette family is used during the precount so the count-in is
// audibly distinct from real playback

use crate::engine::TickKind;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SOUND_SET_ID: &str = "digital";
pub const DEFAULT_PRECOUNT_SOUND_SET_ID: &str = "default_precount";

/// Oscillator shape for a click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// Parameters for a single click sound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundParameters {
    pub frequency: f32,
    pub gain: f32,
    pub waveform: Waveform,
}

impl SoundParameters {
    const fn new(frequency: f32, gain: f32, waveform: Waveform) -> Self {
        Self {
            frequency,
            gain,
            waveform,
        }
    }
}

/// A named palette of accent/beat/subdivision click sounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSet {
    pub id: String,
    pub name: String,
    pub accent: SoundParameters,
    pub beat: SoundParameters,
    pub sub: SoundParameters,
}

impl SoundSet {
    fn new(
        id: &str,
        name: &str,
        accent: SoundParameters,
        beat: SoundParameters,
        sub: SoundParameters,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            accent,
            beat,
            sub,
        }
    }

    pub fn params_for(&self, kind: TickKind) -> SoundParameters {
        match kind {
            TickKind::Accent => self.accent,
            TickKind::Beat => self.beat,
            TickKind::Sub => self.sub,
        }
    }
}

/// Palettes offered for regular playback
pub fn builtin_sound_sets() -> Vec<SoundSet> {
    use Waveform::*;
    vec![
        SoundSet::new(
            "classic",
            "Classic Tones",
            SoundParameters::new(880.0, 0.6, Sine),
            SoundParameters::new(523.25, 0.4, Sine),
            SoundParameters::new(349.23, 0.28, Sine),
        ),
        SoundSet::new(
            "digital",
            "Digital Beeps",
            SoundParameters::new(1200.0, 0.48, Square),
            SoundParameters::new(800.0, 0.36, Square),
            SoundParameters::new(600.0, 0.24, Square),
        ),
        SoundSet::new(
            "wooden",
            "Wooden Blocks",
            SoundParameters::new(600.0, 0.7, Triangle),
            SoundParameters::new(400.0, 0.5, Triangle),
            SoundParameters::new(300.0, 0.3, Triangle),
        ),
        SoundSet::new(
            "high_click",
            "High Click",
            SoundParameters::new(1500.0, 0.4, Triangle),
            SoundParameters::new(1000.0, 0.32, Triangle),
            SoundParameters::new(800.0, 0.2, Triangle),
        ),
        SoundSet::new(
            "mellow_sine",
            "Mellow Sine",
            SoundParameters::new(440.0, 0.48, Sine),
            SoundParameters::new(330.0, 0.36, Sine),
            SoundParameters::new(220.0, 0.24, Sine),
        ),
    ]
}

/// Palettes used while precounting
pub fn precount_sound_sets() -> Vec<SoundSet> {
    use Waveform::*;
    vec![
        SoundSet::new(
            "default_precount",
            "Default Precount Tones",
            SoundParameters::new(1000.0, 0.4, Triangle),
            SoundParameters::new(750.0, 0.32, Triangle),
            SoundParameters::new(500.0, 0.2, Triangle),
        ),
        SoundSet::new(
            "sharp_precount",
            "Sharp Precount Click",
            SoundParameters::new(1500.0, 0.36, Square),
            SoundParameters::new(1200.0, 0.3, Square),
            SoundParameters::new(1000.0, 0.16, Square),
        ),
        SoundSet::new(
            "soft_precount_blip",
            "Soft Precount Blip",
            SoundParameters::new(600.0, 0.3, Sine),
            SoundParameters::new(450.0, 0.24, Sine),
            SoundParameters::new(300.0, 0.14, Sine),
        ),
    ]
}

/// Look a palette up by id, falling back to the default set and finally to
/// the first entry of the catalog
pub fn sound_set_or_default(sets: &[SoundSet], id: &str, default_id: &str) -> Option<SoundSet> {
    sets.iter()
        .find(|s| s.id == id)
        .or_else(|| sets.iter().find(|s| s.id == default_id))
        .or_else(|| sets.first())
        .cloned()
}
