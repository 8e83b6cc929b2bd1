// Audio - reference TickSink implementation
// Sound sets, pre-rendered clicks and the cpal output stream

pub mod click;
pub mod output;
pub mod sound_set;

pub use click::{ClickMixer, ClickSound};
pub use output::{AudioError, AudioOutput, ClickTrigger};
pub use sound_set::{
    builtin_sound_sets, precount_sound_sets, sound_set_or_default, SoundParameters, SoundSet,
    Waveform, DEFAULT_PRECOUNT_SOUND_SET_ID, DEFAULT_SOUND_SET_ID,
};
