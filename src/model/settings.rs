// Default playback settings - the zero-sections fallback mode
// When the user has authored no sections, playback runs against a synthetic
// single-measure section built from these settings

use super::section::{Section, Subdivision};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playback parameters used when no sections exist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultPlaybackSettings {
    pub tempo: u32,
    #[serde(default)]
    pub end_tempo: Option<u32>,
    pub time_signature: u8,
    #[serde(default)]
    pub subdivision: Subdivision,
    #[serde(default = "default_accented_beats")]
    pub accented_beats: Vec<u8>,
}

fn default_accented_beats() -> Vec<u8> {
    vec![0]
}

impl Default for DefaultPlaybackSettings {
    fn default() -> Self {
        Self {
            tempo: 120,
            end_tempo: None,
            time_signature: 4,
            subdivision: Subdivision::Quarter,
            accented_beats: vec![0],
        }
    }
}

impl DefaultPlaybackSettings {
    /// Build the synthetic section the scheduler plays in zero-sections mode
    ///
    /// Always a single measure with looping forced on, identified by the nil
    /// UUID so tick events remain distinguishable from authored sections.
    pub fn fallback_section(&self) -> Section {
        Section {
            id: Uuid::nil(),
            name: "Default".to_string(),
            tempo: self.tempo,
            end_tempo: self.end_tempo,
            time_signature: self.time_signature,
            subdivision: self.subdivision,
            measures: 1,
            accented_beats: self.accented_beats.clone(),
            is_loopable: true,
        }
    }
}
