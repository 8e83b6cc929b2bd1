// Audio output - cpal stream fed by the click mixer
//
// The stream renders mono clicks fanned out to every channel of the default
// output device. The mixer is shared behind a mutex: the scheduler thread
// triggers clicks through a `ClickTrigger` sink while the audio callback
// drains samples with a non-blocking lock.

use super::click::ClickMixer;
use super::sound_set::SoundSet;
use crate::engine::{TickEvent, TickSink};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("unsupported sample format {0:?} (supported: F32, I16, U16)")]
    UnsupportedFormat(SampleFormat),

    #[error("audio configuration failed: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("could not build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("could not start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// TickSink that routes scheduler ticks into the click mixer
///
/// Cheap to clone and Send, unlike the stream it feeds; the driver thread
/// owns one of these while the stream stays on the thread that opened it.
#[derive(Clone)]
pub struct ClickTrigger {
    mixer: Arc<Mutex<ClickMixer>>,
}

impl TickSink for ClickTrigger {
    fn on_tick(&mut self, event: &TickEvent) {
        self.mixer.lock().unwrap().trigger(event.kind, event.is_precount);
    }
}

/// Open output stream on the default device
pub struct AudioOutput {
    mixer: Arc<Mutex<ClickMixer>>,
    // Held for its lifetime; dropping it closes the stream
    _stream: Stream,
}

impl AudioOutput {
    /// Open the default output device and start rendering clicks from the
    /// given palettes
    pub fn new(playback_set: &SoundSet, precount_set: &SoundSet) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let mixer = Arc::new(Mutex::new(ClickMixer::new(
            sample_rate,
            playback_set,
            precount_set,
        )));

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, Arc::clone(&mixer))
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, Arc::clone(&mixer))
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, Arc::clone(&mixer))
            }
            other => return Err(AudioError::UnsupportedFormat(other)),
        }?;
        stream.play()?;

        Ok(Self {
            mixer,
            _stream: stream,
        })
    }

    /// Sink handle for the playback driver
    pub fn sink(&self) -> ClickTrigger {
        ClickTrigger {
            mixer: Arc::clone(&self.mixer),
        }
    }

    pub fn set_volume(&self, volume: f32) {
        self.mixer.lock().unwrap().set_volume(volume);
    }

    pub fn toggle_mute(&self) {
        self.mixer.lock().unwrap().toggle_mute();
    }

    /// Mono clicks converted to the device format and fanned to all channels
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mixer: Arc<Mutex<ClickMixer>>,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Non-blocking in the callback: a contended lock renders
                // one buffer of silence instead of stalling the device
                let Ok(mut mixer) = mixer.try_lock() else {
                    let silence = T::from_sample(0.0f32);
                    data.fill(silence);
                    return;
                };
                for frame in data.chunks_mut(channels) {
                    let value = T::from_sample(mixer.process_sample());
                    for out in frame.iter_mut() {
                        *out = value;
                    }
                }
            },
            move |err| eprintln!("Audio stream error: {}", err),
            None,
        )?;
        Ok(stream)
    }
}
