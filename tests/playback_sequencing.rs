//! End-to-end playback sequencing tests
//!
//! Drives the scheduler through whole sessions with a manual clock and a
//! recording sink, checking the tick stream it would hand the audio layer:
//! precount into playback, ramps, looping, section hand-off and natural stop.

use tempoflow::{
    PlaybackScheduler, Section, SectionStore, SessionState, Subdivision, TickEvent, TickKind,
    TickSink,
};

#[derive(Default)]
struct RecordingSink {
    events: Vec<TickEvent>,
}

impl TickSink for RecordingSink {
    fn on_tick(&mut self, event: &TickEvent) {
        self.events.push(*event);
    }
}

/// Run a full session to its natural end (or `max_ticks`, whichever comes
/// first), with the clock jumping exactly to every due timestamp
fn play_session(store: &mut SectionStore, max_ticks: usize) -> (Vec<TickEvent>, Vec<f64>, SessionState) {
    let mut scheduler = PlaybackScheduler::new();
    let mut sink = RecordingSink::default();
    let mut now = 0.0;

    let mut delay = scheduler
        .start(store, &mut sink, now)
        .expect("session should start");
    let mut delays = vec![delay];

    for _ in 0..max_ticks {
        now += delay;
        match scheduler.on_timer(store, &mut sink, now).expect("tick should succeed") {
            Some(next) => {
                delay = next;
                delays.push(next);
            }
            None => break,
        }
    }
    (sink.events, delays, scheduler.session_state())
}

#[test]
fn test_full_song_with_precount_and_ramp() {
    // One count-in bar, then: 1 measure at 100, a 1-measure ramp to 140,
    // 1 measure at 140, no loops
    let mut intro = Section::new("Intro", 100);
    intro.measures = 1;
    let mut build = Section::new("Build", 100);
    build.end_tempo = Some(140);
    build.measures = 1;
    let mut chorus = Section::new("Chorus", 140);
    chorus.measures = 1;

    let mut store = SectionStore::with_sections(vec![intro, build, chorus]);
    store.configure_precount(true, 1);

    let (events, delays, state) = play_session(&mut store, 100);

    // 4 precount ticks + 3 sections of 4 ticks each
    assert_eq!(events.len(), 16);
    assert!(events[..4].iter().all(|e| e.is_precount));
    assert!(events[4..].iter().all(|e| !e.is_precount));

    // Count-in and Intro both run at 100 BPM
    assert!(delays[..8].iter().all(|d| *d == 600.0));

    // The ramp accelerates monotonically toward 140
    let ramp_delays = &delays[8..12];
    assert!(ramp_delays.windows(2).all(|w| w[1] < w[0]));

    // Chorus holds 140 BPM
    let chorus_tick = 60000.0 / 140.0;
    assert!(delays[12..].iter().all(|d| (*d - chorus_tick).abs() < 1e-9));

    assert_eq!(state, SessionState::Stopped);
    // First section is the visually-active one after the sequence ends
    assert_eq!(store.active_section_id(), Some(store.sections()[0].id));
}

#[test]
fn test_global_loop_cycles_sections_indefinitely() {
    let mut a = Section::new("A", 120);
    a.time_signature = 2;
    a.measures = 1;
    let mut b = Section::new("B", 120);
    b.time_signature = 2;
    b.measures = 1;
    let (a_id, b_id) = (a.id, b.id);

    let mut store = SectionStore::with_sections(vec![a, b]);
    store.set_global_loop(true);

    let (events, _, state) = play_session(&mut store, 11);

    let expected = vec![
        a_id, a_id, b_id, b_id, a_id, a_id, b_id, b_id, a_id, a_id, b_id, b_id,
    ];
    let actual: Vec<_> = events.iter().map(|e| e.section_id).collect();
    assert_eq!(actual, expected);
    assert_eq!(state, SessionState::Playing);
}

#[test]
fn test_loopable_section_blocks_advancement() {
    let mut verse = Section::new("Verse", 120);
    verse.time_signature = 2;
    verse.measures = 1;
    verse.is_loopable = true;
    let chorus = Section::new("Chorus", 140);
    let verse_id = verse.id;

    let mut store = SectionStore::with_sections(vec![verse, chorus]);
    let (events, _, state) = play_session(&mut store, 20);

    // Never leaves the loopable section
    assert!(events.iter().all(|e| e.section_id == verse_id));
    assert_eq!(state, SessionState::Playing);
}

#[test]
fn test_accent_pattern_over_subdivisions() {
    let mut section = Section::new("Groove", 120);
    section.time_signature = 3;
    section.measures = 1;
    section.subdivision = Subdivision::Eighth;
    section.accented_beats = vec![0, 2];

    let mut store = SectionStore::with_sections(vec![section]);
    let (events, _, _) = play_session(&mut store, 10);

    let kinds: Vec<TickKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TickKind::Accent,
            TickKind::Sub,
            TickKind::Beat,
            TickKind::Sub,
            TickKind::Accent,
            TickKind::Sub,
        ]
    );
}

#[test]
fn test_precount_skipped_when_disabled() {
    let mut section = Section::new("NoCount", 120);
    section.measures = 1;
    let mut store = SectionStore::with_sections(vec![section]);
    store.configure_precount(false, 2);

    let (events, _, _) = play_session(&mut store, 10);
    assert!(events.iter().all(|e| !e.is_precount));
}

#[test]
fn test_triplet_timing() {
    let mut section = Section::new("Trips", 100);
    section.time_signature = 2;
    section.measures = 1;
    section.subdivision = Subdivision::Triplet;

    let mut store = SectionStore::with_sections(vec![section]);
    let (events, delays, _) = play_session(&mut store, 10);

    // 2 beats of 3 ticks each
    assert_eq!(events.len(), 6);
    assert!(delays.iter().all(|d| *d == 200.0)); // 60000/100/3
}

#[test]
fn test_zero_sections_default_mode() {
    let mut store = SectionStore::new();
    let (events, delays, state) = play_session(&mut store, 12);

    // 120 BPM default settings, forced single-measure loop, nil section id
    assert_eq!(events.len(), 13);
    assert!(events.iter().all(|e| e.section_id.is_nil()));
    assert!(delays.iter().all(|d| *d == 500.0));
    assert_eq!(state, SessionState::Playing);
}

#[test]
fn test_edits_during_playback_apply_next_tick() {
    let mut section = Section::new("Live", 100);
    section.is_loopable = true;
    let id = section.id;
    let mut store = SectionStore::with_sections(vec![section]);

    let mut scheduler = PlaybackScheduler::new();
    let mut sink = RecordingSink::default();
    let mut now = 0.0;
    let mut delay = scheduler.start(&mut store, &mut sink, now).unwrap();

    for tick in 0..6 {
        if tick == 2 {
            // Re-accent the section mid-flight
            store.update_section(id, |s| s.accented_beats = vec![0, 1, 2, 3]);
        }
        now += delay;
        delay = scheduler.on_timer(&mut store, &mut sink, now).unwrap().unwrap();
    }

    // Before the edit only beat 0 is accented; after it every beat is
    assert_eq!(sink.events[1].kind, TickKind::Beat);
    assert!(sink.events[3..].iter().all(|e| e.kind == TickKind::Accent));
}
