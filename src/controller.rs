//! Application controller
//!
//! Owns the capture handle and the (at most one) recording worker, drives the
//! preview tick and turns user actions into worker transitions. Worker events
//! are drained here, on the controller's own context, never on the worker
//! thread.

use crate::capture::CaptureHandle;
use crate::config::AppConfig;
use crate::preview::prepare_preview;
use crate::recorder::probe::probe_video;
use crate::recorder::{EncoderFactory, RecordingEvent, RecordingOutput, RecordingWorker};
use crate::storage;
use crate::ui::UserInterface;
use crate::utils::{AppError, AppResult, ErrorResponse};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// Record button label while no session is Active
pub const RECORD_LABEL: &str = "Record Video";

/// Record button label while a session is Active
pub const STOP_LABEL: &str = "Stop Recording";

pub struct AppController<U: UserInterface> {
    source: CaptureHandle,
    encoders: Arc<dyn EncoderFactory>,
    ui: U,
    working_dir: PathBuf,
    mirror_preview: bool,
    worker: Option<RecordingWorker>,
    events_tx: UnboundedSender<RecordingEvent>,
    events_rx: UnboundedReceiver<RecordingEvent>,
    record_label: &'static str,
    shut_down: bool,
}

impl<U: UserInterface> AppController<U> {
    pub fn new(
        source: CaptureHandle,
        encoders: Arc<dyn EncoderFactory>,
        mut ui: U,
        config: &AppConfig,
    ) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        ui.set_record_label(RECORD_LABEL);

        Self {
            source,
            encoders,
            ui,
            working_dir: config.working_dir.clone(),
            mirror_preview: config.mirror_preview,
            worker: None,
            events_tx,
            events_rx,
            record_label: RECORD_LABEL,
            shut_down: false,
        }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    /// Whether a session is currently appending frames
    pub fn is_recording(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.is_active())
    }

    /// ID of the current session, if one exists in any state
    pub fn current_session_id(&self) -> Option<Uuid> {
        self.worker.as_ref().map(|w| w.session_id())
    }

    pub fn record_label(&self) -> &'static str {
        self.record_label
    }

    /// Periodic refresh: one read, one render. A failed read is skipped.
    pub fn preview_tick(&mut self) -> bool {
        self.poll_events();

        match self.source.read_frame() {
            Ok(frame) => {
                let image = prepare_preview(frame, self.ui.target_size(), self.mirror_preview);
                self.ui.present(image);
                true
            }
            Err(e) => {
                tracing::debug!("Preview frame skipped: {}", e);
                false
            }
        }
    }

    /// Read a fresh frame and, if the user picks a directory, save it as a JPEG.
    ///
    /// Returns the written path, or `None` when the read failed or the prompt
    /// was canceled.
    pub fn capture_photo(&mut self) -> AppResult<Option<PathBuf>> {
        let frame = match self.source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("Photo capture skipped: {}", e);
                return Ok(None);
            }
        };

        let Some(dir) = self.ui.pick_directory("Select Directory") else {
            tracing::debug!("Photo discarded, no directory selected");
            return Ok(None);
        };

        match storage::save_photo(frame, &dir) {
            Ok(path) => Ok(Some(path)),
            Err(e) => {
                self.report_error("Photo Not Saved", &e);
                Err(e)
            }
        }
    }

    /// Start when no session exists, otherwise stop the current one
    pub fn toggle_recording(&mut self) -> AppResult<()> {
        // A session may have already failed or finished on its own
        self.poll_events();

        if self.worker.is_some() {
            self.stop_recording();
            Ok(())
        } else {
            self.start_recording().map(|_| ())
        }
    }

    /// Start a new session. Rejected while another session exists.
    pub fn start_recording(&mut self) -> AppResult<Uuid> {
        if let Some(worker) = &self.worker {
            tracing::warn!(
                session = %worker.session_id(),
                "Start requested while a session exists"
            );
            return Err(AppError::AlreadyRecording);
        }

        let worker = RecordingWorker::start(
            self.source.clone(),
            self.encoders.clone(),
            &self.working_dir,
            self.events_tx.clone(),
        )?;
        let session_id = worker.session_id();
        self.worker = Some(worker);
        Ok(session_id)
    }

    /// Stop the current session and wait for its encoder to close.
    /// Returns `false` when there was nothing to stop.
    pub fn stop_recording(&mut self) -> bool {
        let Some(worker) = self.worker.as_mut() else {
            return false;
        };

        tracing::info!(session = %worker.session_id(), "Stopping recording");
        worker.stop();

        // The thread has exited, so its final event is already queued
        self.poll_events();

        if let Some(worker) = self.worker.take() {
            tracing::warn!(
                session = %worker.session_id(),
                "Worker exited without reporting, dropping it"
            );
            self.sync_label();
        }
        true
    }

    /// Handle every event the worker has reported so far
    pub fn poll_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    fn handle_event(&mut self, event: RecordingEvent) {
        let is_current = self.current_session_id() == Some(event.session_id());

        match event {
            RecordingEvent::Started { session_id } => self.on_recording_started(session_id),
            RecordingEvent::Stopped { output, .. } => {
                if is_current {
                    self.worker = None;
                }
                // Already surfaced to the user
                let _ = self.on_recording_stopped(output);
            }
            RecordingEvent::Failed { error, .. } => {
                if is_current {
                    self.worker = None;
                }
                self.on_recording_failed(error);
            }
        }

        self.sync_label();
    }

    fn on_recording_started(&mut self, session_id: Uuid) {
        tracing::info!(session = %session_id, "Recording started");
        self.sync_label();
    }

    /// Offer to move the finished temp file to a user-chosen directory.
    ///
    /// On cancel the temp file stays where it is. Relocation failures are
    /// shown to the user and returned.
    pub fn on_recording_stopped(&mut self, output: RecordingOutput) -> AppResult<Option<PathBuf>> {
        self.sync_label();
        tracing::info!(
            "Recording stopped: {} frames in {:.0}ms -> {}",
            output.frames_written,
            output.duration_ms,
            output.path.display()
        );

        let Some(dir) = self.ui.pick_directory("Select Directory to Save Video") else {
            tracing::info!("Video left at {}", output.path.display());
            return Ok(None);
        };

        match storage::move_into(&output.path, &dir) {
            Ok(final_path) => {
                match probe_video(&final_path) {
                    Ok(meta) => tracing::info!(
                        "Saved video: {}x{} {} @ {:.2}fps, {:?} frames",
                        meta.width,
                        meta.height,
                        meta.codec,
                        meta.fps,
                        meta.frame_count
                    ),
                    Err(e) => tracing::debug!("Could not probe saved video: {}", e),
                }
                self.ui.notify(
                    "Video Saved",
                    &format!("Video saved to: {}", final_path.display()),
                );
                Ok(Some(final_path))
            }
            Err(e) => {
                self.report_error("Video Not Saved", &e);
                Err(e)
            }
        }
    }

    fn on_recording_failed(&mut self, error: AppError) {
        self.report_error("Recording Failed", &error);
    }

    fn report_error(&mut self, title: &str, error: &AppError) {
        let response = ErrorResponse::from(error);
        tracing::error!("{} [{}]: {}", title, response.code, response.message);
        self.ui.notify(title, &response.message);
    }

    /// Push the label to the surface if the Active state changed
    fn sync_label(&mut self) {
        let label = if self.is_recording() {
            STOP_LABEL
        } else {
            RECORD_LABEL
        };
        if label != self.record_label {
            self.record_label = label;
            self.ui.set_record_label(label);
        }
    }

    /// Stop any recording (waiting for the encoder to flush), then release the
    /// capture source. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        if self.worker.is_some() {
            tracing::info!("Recording in progress at shutdown, stopping it");
            self.stop_recording();
        }
        self.poll_events();

        self.source.release();
        tracing::info!("Controller shut down");
    }
}

impl<U: UserInterface> Drop for AppController<U> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
