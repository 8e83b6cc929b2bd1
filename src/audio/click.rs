// Click rendering and mixing
// Pre-renders short enveloped oscillator bursts per tick kind so the audio
// callback only copies samples, and mixes the currently sounding click into
// the output buffer with master volume and mute applied

use super::sound_set::{SoundParameters, SoundSet, Waveform};
use crate::engine::TickKind;
use std::f32::consts::TAU;

/// Total click length in seconds (attack + decay)
const CLICK_DURATION_S: f32 = 0.05;
/// Linear attack length in seconds
const ATTACK_S: f32 = 0.005;

const DEFAULT_VOLUME: f32 = 0.75;

/// One oscillator cycle value for a normalized phase in [0, 1)
fn oscillator_sample(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (TAU * phase).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
        Waveform::Sawtooth => 2.0 * phase - 1.0,
    }
}

/// Pre-rendered click buffers for one sound set
#[derive(Debug, Clone)]
pub struct ClickSound {
    accent: Vec<f32>,
    beat: Vec<f32>,
    sub: Vec<f32>,
}

impl ClickSound {
    pub fn new(sample_rate: f32, set: &SoundSet) -> Self {
        Self {
            accent: Self::render(sample_rate, &set.accent),
            beat: Self::render(sample_rate, &set.beat),
            sub: Self::render(sample_rate, &set.sub),
        }
    }

    /// Render one click: oscillator with a linear attack ramp to the set's
    /// gain and a linear decay back to silence
    fn render(sample_rate: f32, params: &SoundParameters) -> Vec<f32> {
        let num_samples = (CLICK_DURATION_S * sample_rate) as usize;
        let attack_samples = ((ATTACK_S * sample_rate) as usize).max(1).min(num_samples);
        let decay_samples = (num_samples - attack_samples).max(1);

        let mut samples = Vec::with_capacity(num_samples);
        for i in 0..num_samples {
            let envelope = if i < attack_samples {
                i as f32 / attack_samples as f32
            } else {
                1.0 - (i - attack_samples) as f32 / decay_samples as f32
            };
            let phase = (i as f32 * params.frequency / sample_rate).fract();
            samples.push(oscillator_sample(params.waveform, phase) * envelope * params.gain);
        }
        samples
    }

    pub fn buffer(&self, kind: TickKind) -> &[f32] {
        match kind {
            TickKind::Accent => &self.accent,
            TickKind::Beat => &self.beat,
            TickKind::Sub => &self.sub,
        }
    }
}

/// Playback cursor into a click buffer
#[derive(Debug, Clone, Copy)]
struct ActiveClick {
    kind: TickKind,
    is_precount: bool,
    position: usize,
}

/// Mixes triggered clicks into an output stream
///
/// Holds one rendered palette for playback and one for the precount. A new
/// trigger cuts the previous click off; clicks are short enough that this
/// only happens at extreme tempos.
#[derive(Debug)]
pub struct ClickMixer {
    playback: ClickSound,
    precount: ClickSound,
    volume: f32,
    muted: bool,
    current: Option<ActiveClick>,
}

impl ClickMixer {
    pub fn new(sample_rate: f32, playback_set: &SoundSet, precount_set: &SoundSet) -> Self {
        Self {
            playback: ClickSound::new(sample_rate, playback_set),
            precount: ClickSound::new(sample_rate, precount_set),
            volume: DEFAULT_VOLUME,
            muted: false,
            current: None,
        }
    }

    /// Start sounding a click of the given kind
    pub fn trigger(&mut self, kind: TickKind, is_precount: bool) {
        self.current = Some(ActiveClick {
            kind,
            is_precount,
            position: 0,
        });
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Next mono sample of the click currently sounding, or silence
    pub fn process_sample(&mut self) -> f32 {
        let Some(active) = &mut self.current else {
            return 0.0;
        };
        let sound = if active.is_precount {
            &self.precount
        } else {
            &self.playback
        };
        let buffer = sound.buffer(active.kind);

        let Some(&sample) = buffer.get(active.position) else {
            self.current = None;
            return 0.0;
        };
        active.position += 1;

        if self.muted {
            0.0
        } else {
            sample * self.volume
        }
    }

    /// Fill a mono buffer in place
    pub fn process_buffer(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.process_sample();
        }
    }
}
