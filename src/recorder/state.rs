//! Recording state management
//!
//! Defines the worker state machine, session tracking and the events the
//! worker thread reports back to the controller.

use crate::utils::naming::video_file_name;
use crate::utils::AppError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Lifecycle of one recording worker: `Idle → Starting → Active → Stopping → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    /// Not appending frames; the worker is finished or never started
    #[default]
    Idle,
    /// Opening the encoder sink
    Starting,
    /// Appending frames
    Active,
    /// Stop observed, flushing the encoder
    Stopping,
}

impl WorkerState {
    pub fn is_active(&self) -> bool {
        matches!(self, WorkerState::Active)
    }
}

/// One in-progress recording
#[derive(Debug, Clone)]
pub struct RecordingSession {
    /// Unique session ID for log correlation
    pub id: Uuid,

    /// Where frames are encoded until the user picks a destination
    pub temp_path: PathBuf,
}

impl RecordingSession {
    /// Create a session whose temp file lives in `working_dir`, named after now
    pub fn new(working_dir: &Path) -> Self {
        Self {
            id: Uuid::new_v4(),
            temp_path: working_dir.join(video_file_name()),
        }
    }

    /// Bare file name of the temp file
    pub fn file_name(&self) -> String {
        self.temp_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Result of a finished recording
#[derive(Debug, Clone)]
pub struct RecordingOutput {
    /// Temp file the encoder wrote
    pub path: PathBuf,

    /// Frames appended to the encoder
    pub frames_written: u64,

    /// Time spent Active in milliseconds
    pub duration_ms: f64,
}

/// Events emitted by the recording worker
#[derive(Debug)]
pub enum RecordingEvent {
    /// Encoder opened, frames are being appended
    Started { session_id: Uuid },
    /// Encoder closed, the temp file is complete
    Stopped {
        session_id: Uuid,
        output: RecordingOutput,
    },
    /// Encoder failed to open, or exited with an error on finish
    Failed { session_id: Uuid, error: AppError },
}

impl RecordingEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            RecordingEvent::Started { session_id }
            | RecordingEvent::Stopped { session_id, .. }
            | RecordingEvent::Failed { session_id, .. } => *session_id,
        }
    }
}
