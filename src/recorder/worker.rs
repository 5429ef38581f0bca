//! Recording worker
//!
//! One worker per session. The worker thread owns the encoder sink; the
//! controller talks to it only through a command channel (stop) and an event
//! channel (started / stopped / failed).

use super::encoder::EncoderFactory;
use super::state::{RecordingEvent, RecordingOutput, RecordingSession, WorkerState};
use super::FRAME_RATE;
use crate::capture::CaptureHandle;
use crate::utils::{AppError, AppResult};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

enum WorkerCommand {
    Stop,
}

/// Handle to a running recording thread
pub struct RecordingWorker {
    session: RecordingSession,
    state: Arc<RwLock<WorkerState>>,
    commands: mpsc::Sender<WorkerCommand>,
    thread: Option<JoinHandle<()>>,
}

impl RecordingWorker {
    /// Create a session in `working_dir` and start its thread.
    ///
    /// Returns as soon as the thread is spawned; `Started` or `Failed` is
    /// delivered on `events` once the encoder has (or hasn't) opened.
    pub fn start(
        source: CaptureHandle,
        encoders: Arc<dyn EncoderFactory>,
        working_dir: &Path,
        events: UnboundedSender<RecordingEvent>,
    ) -> AppResult<Self> {
        let session = RecordingSession::new(working_dir);
        let state = Arc::new(RwLock::new(WorkerState::Starting));
        let (commands, command_rx) = mpsc::channel();

        tracing::info!(
            session = %session.id,
            "Starting recording to {}",
            session.temp_path.display()
        );

        let context = WorkerContext {
            session: session.clone(),
            source,
            encoders,
            state: state.clone(),
            commands: command_rx,
            events,
        };

        let thread = std::thread::Builder::new()
            .name("recording-worker".to_string())
            .spawn(move || context.run())?;

        Ok(Self {
            session,
            state,
            commands,
            thread: Some(thread),
        })
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    pub fn session_id(&self) -> Uuid {
        self.session.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Signal stop and block until the thread has closed the encoder.
    /// No timeout: a read stuck in the driver blocks here too.
    pub fn stop(&mut self) {
        let Some(handle) = self.thread.take() else {
            return;
        };

        // The thread may already have exited after a failed open
        let _ = self.commands.send(WorkerCommand::Stop);

        if handle.join().is_err() {
            tracing::error!(session = %self.session.id, "Recording worker panicked");
            *self.state.write() = WorkerState::Idle;
        }
    }

    /// Whether the thread has been joined
    pub fn is_joined(&self) -> bool {
        self.thread.is_none()
    }
}

impl Drop for RecordingWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

struct WorkerContext {
    session: RecordingSession,
    source: CaptureHandle,
    encoders: Arc<dyn EncoderFactory>,
    state: Arc<RwLock<WorkerState>>,
    commands: mpsc::Receiver<WorkerCommand>,
    events: UnboundedSender<RecordingEvent>,
}

impl WorkerContext {
    fn set_state(&self, state: WorkerState) {
        *self.state.write() = state;
    }

    fn stop_requested(&self) -> bool {
        match self.commands.try_recv() {
            Ok(WorkerCommand::Stop) => true,
            // Handle dropped without an explicit stop
            Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }

    fn run(self) {
        let session_id = self.session.id;
        let path = self.session.temp_path.clone();
        let properties = self.source.properties();

        let mut sink = match self.encoders.open(&path, properties, FRAME_RATE) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::error!(session = %session_id, "Failed to open encoder: {}", e);
                self.set_state(WorkerState::Idle);
                let _ = self.events.send(RecordingEvent::Failed {
                    session_id,
                    error: AppError::EncoderOpenFailure {
                        path,
                        reason: e.to_string(),
                    },
                });
                return;
            }
        };

        self.set_state(WorkerState::Active);
        let _ = self.events.send(RecordingEvent::Started { session_id });
        tracing::info!(
            session = %session_id,
            "Recording active: {}x{} @ {}fps",
            properties.width,
            properties.height,
            FRAME_RATE
        );

        let started = Instant::now();
        let mut missed_reads: u64 = 0;
        let mut append_failures: u64 = 0;

        // The stop command is only observed between reads
        while !self.stop_requested() {
            match self.source.read_frame() {
                Ok(frame) => {
                    if let Err(e) = sink.append(&frame) {
                        if append_failures == 0 {
                            tracing::warn!(session = %session_id, "Failed to append frame: {}", e);
                        }
                        append_failures += 1;
                    }
                }
                Err(e) => {
                    tracing::debug!("Failed to capture frame: {}", e);
                    missed_reads += 1;
                    std::thread::yield_now();
                }
            }
        }

        self.set_state(WorkerState::Stopping);
        let elapsed = started.elapsed();
        let appended = sink.frames_written();

        let finished = sink.finish();
        let frames_written = finished.as_ref().copied().unwrap_or(appended);

        tracing::info!(
            session = %session_id,
            "Recorded {} frames in {:.2}s ({} missed reads, {} append failures)",
            frames_written,
            elapsed.as_secs_f64(),
            missed_reads,
            append_failures
        );

        self.set_state(WorkerState::Idle);
        let event = match finished {
            Ok(_) => RecordingEvent::Stopped {
                session_id,
                output: RecordingOutput {
                    path,
                    frames_written,
                    duration_ms: elapsed.as_secs_f64() * 1000.0,
                },
            },
            Err(e) => {
                tracing::error!(session = %session_id, "Failed to finish encoding: {}", e);
                RecordingEvent::Failed {
                    session_id,
                    error: AppError::EncodeFailure {
                        path,
                        reason: e.to_string(),
                    },
                }
            }
        };
        let _ = self.events.send(event);
    }
}
