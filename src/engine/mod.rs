pub mod driver;
pub mod error;
pub mod position;
pub mod precount;
pub mod scheduler;
pub mod tempo;

pub use driver::{PlaybackDriver, Player, PlayheadSnapshot};
pub use error::EngineError;
pub use position::{PlaybackPosition, PrecountProgress, SessionState, TickKind};
pub use precount::{PrecountSequencer, PrecountStep};
pub use scheduler::{PlaybackScheduler, TickEvent, TickSink, TEMPO_EPSILON_BPM};
pub use tempo::{effective_tempo, tick_duration_ms};
