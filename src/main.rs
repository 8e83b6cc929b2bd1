use std::env;
use std::fs;
use std::thread;
use std::time::Duration;

use tempoflow::audio::{
    builtin_sound_sets, precount_sound_sets, sound_set_or_default, DEFAULT_PRECOUNT_SOUND_SET_ID,
    DEFAULT_SOUND_SET_ID,
};
use tempoflow::model::tempo_marking;
use tempoflow::{AudioOutput, Player, Section, SectionStore, TickEvent, TickSink};

/// Fallback sink when no audio device is available
struct ConsoleSink;

impl TickSink for ConsoleSink {
    fn on_tick(&mut self, event: &TickEvent) {
        let phase = if event.is_precount { "count-in" } else { "play" };
        println!(
            "[{}] {:?} at {}.{}.{}",
            phase,
            event.kind,
            event.measure + 1,
            event.beat + 1,
            event.tick + 1
        );
    }
}

fn demo_sections() -> Vec<Section> {
    let mut intro = Section::new("Intro", 100);
    intro.measures = 2;

    let mut build = Section::new("Build", 100);
    build.end_tempo = Some(140);
    build.measures = 2;

    let mut chorus = Section::new("Chorus", 140);
    chorus.measures = 2;
    chorus.accented_beats = vec![0, 2];

    vec![intro, build, chorus]
}

fn main() {
    println!("=== Tempo Flow ===");
    println!("Version 0.1.0\n");

    let store = match env::args().nth(1) {
        Some(path) => {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("ERROR: could not read {}: {}", path, e);
                    return;
                }
            };
            match SectionStore::from_json(&json) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("ERROR: could not parse {}: {}", path, e);
                    return;
                }
            }
        }
        None => SectionStore::with_sections(demo_sections()),
    };

    for section in store.sections() {
        let marking = tempo_marking(section.tempo).unwrap_or("?");
        match section.end_tempo {
            Some(end) if end != section.tempo => println!(
                "  {} - {} to {} BPM ({}), {} measures",
                section.name, section.tempo, end, marking, section.measures
            ),
            _ => println!(
                "  {} - {} BPM ({}), {} measures",
                section.name, section.tempo, marking, section.measures
            ),
        }
    }
    println!();

    let playback_palette = sound_set_or_default(
        &builtin_sound_sets(),
        DEFAULT_SOUND_SET_ID,
        DEFAULT_SOUND_SET_ID,
    );
    let precount_palette = sound_set_or_default(
        &precount_sound_sets(),
        DEFAULT_PRECOUNT_SOUND_SET_ID,
        DEFAULT_PRECOUNT_SOUND_SET_ID,
    );
    let (Some(playback_palette), Some(precount_palette)) = (playback_palette, precount_palette)
    else {
        eprintln!("ERROR: sound set catalog is empty");
        return;
    };

    let mut player = Player::new(store);
    player.configure_precount(true, 1);

    // Keep the stream open for the whole session; fall back to a console
    // sink when no device is available (headless environments)
    let audio = match AudioOutput::new(&playback_palette, &precount_palette) {
        Ok(audio) => Some(audio),
        Err(e) => {
            eprintln!("No audio output ({}), printing ticks instead", e);
            None
        }
    };

    match &audio {
        Some(audio) => player.start(Box::new(audio.sink())),
        None => player.start(Box::new(ConsoleSink)),
    }

    println!("Playing... (runs until the sequence ends)\n");
    while player.is_playing() {
        thread::sleep(Duration::from_millis(50));
    }

    println!("\n=== Done ===");
}
