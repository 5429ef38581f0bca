//! Recording system module
//!
//! - `RecordingWorker`: per-session thread appending frames to an encoder
//! - `EncoderSink`/`EncoderFactory`: where frames go (FFmpeg in production)
//! - `probe`: inspects the finished file

pub mod encoder;
pub mod probe;
pub mod state;
pub mod worker;

pub use encoder::{EncoderError, EncoderFactory, EncoderSink, FfmpegEncoderFactory};
pub use state::{RecordingEvent, RecordingOutput, RecordingSession, WorkerState};
pub use worker::RecordingWorker;

/// Fixed output frame rate
pub const FRAME_RATE: u32 = 30;
