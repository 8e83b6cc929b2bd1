// Playback driver - real-time timer loop on a worker thread
//
// The scheduler itself never blocks; this driver owns the waiting. Between
// ticks the worker parks on a control channel with the delay the scheduler
// computed, so a stop message cancels the pending wait synchronously
// instead of racing one more tick through.

use super::scheduler::{PlaybackScheduler, TickSink};
use crate::store::SectionStore;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

enum ControlMessage {
    Stop,
}

/// Point-in-time playhead reading for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayheadSnapshot {
    pub is_precount: bool,
    /// Measure during playback, bar during the count-in
    pub measure: u32,
    pub beat: u32,
    pub tick: u32,
}

/// Playhead position shared across threads
/// The worker publishes after every tick; readers never block it
#[derive(Debug, Default)]
struct SharedPlayhead {
    precounting: AtomicBool,
    measure: AtomicU32,
    beat: AtomicU32,
    tick: AtomicU32,
}

impl SharedPlayhead {
    fn publish(&self, scheduler: &PlaybackScheduler) {
        match scheduler.precount_progress() {
            Some(progress) => {
                self.precounting.store(true, Ordering::Relaxed);
                self.measure.store(progress.bar, Ordering::Relaxed);
                self.beat.store(progress.beat, Ordering::Relaxed);
                self.tick.store(progress.tick, Ordering::Relaxed);
            }
            None => {
                let position = scheduler.position();
                self.precounting.store(false, Ordering::Relaxed);
                self.measure.store(position.measure, Ordering::Relaxed);
                self.beat.store(position.beat, Ordering::Relaxed);
                self.tick.store(position.tick, Ordering::Relaxed);
            }
        }
    }

    fn snapshot(&self) -> PlayheadSnapshot {
        PlayheadSnapshot {
            is_precount: self.precounting.load(Ordering::Relaxed),
            measure: self.measure.load(Ordering::Relaxed),
            beat: self.beat.load(Ordering::Relaxed),
            tick: self.tick.load(Ordering::Relaxed),
        }
    }
}

/// One playback session running on its own thread
///
/// There is exactly one tick stream per driver; dropping or stopping it
/// joins the worker, so no tick can fire after `stop` returns.
pub struct PlaybackDriver {
    control: Sender<ControlMessage>,
    worker: Option<JoinHandle<()>>,
    playing: Arc<AtomicBool>,
    playhead: Arc<SharedPlayhead>,
}

impl PlaybackDriver {
    /// Start a session against the shared store, feeding ticks to `sink`
    pub fn spawn(store: Arc<Mutex<SectionStore>>, mut sink: Box<dyn TickSink + Send>) -> Self {
        let (control, commands) = bounded::<ControlMessage>(1);
        let playing = Arc::new(AtomicBool::new(true));
        let playing_flag = Arc::clone(&playing);
        let playhead = Arc::new(SharedPlayhead::default());
        let playhead_out = Arc::clone(&playhead);

        let worker = thread::spawn(move || {
            let epoch = Instant::now();
            let now_ms = || epoch.elapsed().as_secs_f64() * 1000.0;
            let mut scheduler = PlaybackScheduler::new();

            let mut delay = {
                let mut store = store.lock().unwrap();
                match scheduler.start(&mut store, sink.as_mut(), now_ms()) {
                    Ok(delay) => delay,
                    Err(error) => {
                        eprintln!("Playback could not start: {}", error);
                        playing_flag.store(false, Ordering::Release);
                        return;
                    }
                }
            };
            playhead_out.publish(&scheduler);

            loop {
                match commands.recv_timeout(Duration::from_secs_f64(delay / 1000.0)) {
                    Ok(ControlMessage::Stop) | Err(RecvTimeoutError::Disconnected) => {
                        let mut store = store.lock().unwrap();
                        scheduler.stop(&mut store);
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        let mut store = store.lock().unwrap();
                        match scheduler.on_timer(&mut store, sink.as_mut(), now_ms()) {
                            Ok(Some(next_delay)) => {
                                playhead_out.publish(&scheduler);
                                delay = next_delay;
                            }
                            Ok(None) => break,
                            Err(error) => {
                                eprintln!("Playback halted: {}", error);
                                break;
                            }
                        }
                    }
                }
            }
            playhead_out.publish(&scheduler);
            playing_flag.store(false, Ordering::Release);
        });

        Self {
            control,
            worker: Some(worker),
            playing,
            playhead,
        }
    }

    /// Whether the session is still producing ticks
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Current playhead for UI display (beat visualizer highlighting)
    pub fn playhead(&self) -> PlayheadSnapshot {
        self.playhead.snapshot()
    }

    /// Stop the session and wait for the worker to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Send may fail if the worker already exited on its own
        let _ = self.control.send(ControlMessage::Stop);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Session facade tying the store to at most one running driver
///
/// Starting while already playing tears the previous driver down first, so
/// two tick streams can never interleave.
pub struct Player {
    store: Arc<Mutex<SectionStore>>,
    driver: Option<PlaybackDriver>,
}

impl Player {
    pub fn new(store: SectionStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            driver: None,
        }
    }

    /// Shared handle to the store, for edits while playback runs
    pub fn store(&self) -> Arc<Mutex<SectionStore>> {
        Arc::clone(&self.store)
    }

    pub fn start(&mut self, sink: Box<dyn TickSink + Send>) {
        if let Some(driver) = self.driver.take() {
            driver.stop();
        }
        self.driver = Some(PlaybackDriver::spawn(Arc::clone(&self.store), sink));
    }

    pub fn stop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.stop();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.driver.as_ref().is_some_and(|d| d.is_playing())
    }

    /// Playhead of the running session, or the resting zero position
    pub fn playhead(&self) -> PlayheadSnapshot {
        self.driver
            .as_ref()
            .map(|d| d.playhead())
            .unwrap_or_default()
    }

    /// Read at the next start only; an active count-in keeps its snapshot
    pub fn configure_precount(&self, enabled: bool, bars: u32) {
        self.store.lock().unwrap().configure_precount(enabled, bars);
    }
}
