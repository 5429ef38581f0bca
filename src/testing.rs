//! Test doubles shared by the unit tests

use crate::capture::{CaptureSource, Frame, PixelOrder, SourceProperties};
use crate::recorder::{EncoderError, EncoderFactory, EncoderSink};
use crate::ui::{DirectoryPicker, DisplaySurface, NoticePresenter};
use crate::utils::{AppError, AppResult};
use image::RgbImage;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[derive(Default)]
struct Script {
    /// `None` = unlimited frames
    available: Option<u64>,
    delivered: u64,
    failed: u64,
}

/// Shared view of a [`ScriptedSource`]'s counters
#[derive(Clone)]
pub struct ScriptControl(Arc<Mutex<Script>>);

impl ScriptControl {
    pub fn delivered(&self) -> u64 {
        self.0.lock().delivered
    }

    pub fn failed(&self) -> u64 {
        self.0.lock().failed
    }
}

/// Capture source that delivers a fixed number of small frames, then fails every read
pub struct ScriptedSource {
    width: u32,
    height: u32,
    script: Arc<Mutex<Script>>,
    releases: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            script: Arc::new(Mutex::new(Script::default())),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_frames(self, frames: u64) -> Self {
        self.script.lock().available = Some(frames);
        self
    }

    pub fn control(&self) -> ScriptControl {
        ScriptControl(self.script.clone())
    }

    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        self.releases.clone()
    }
}

impl CaptureSource for ScriptedSource {
    fn read_frame(&mut self) -> AppResult<Frame> {
        let mut script = self.script.lock();
        match script.available {
            Some(0) => {
                script.failed += 1;
                Err(AppError::FrameUnavailable("script exhausted".to_string()))
            }
            remaining => {
                script.available = remaining.map(|n| n - 1);
                script.delivered += 1;
                let fill = (script.delivered % 256) as u8;
                let len = self.width as usize * self.height as usize * Frame::CHANNELS;
                Frame::new(self.width, self.height, PixelOrder::Bgr, vec![fill; len])
                    .ok_or_else(|| AppError::FrameUnavailable("bad script frame".to_string()))
            }
        }
    }

    fn properties(&self) -> SourceProperties {
        SourceProperties {
            width: self.width,
            height: self.height,
            pixel_order: PixelOrder::Bgr,
        }
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct EncoderLog {
    opened: Vec<PathBuf>,
    finished: HashMap<PathBuf, u64>,
    live: usize,
    max_live: usize,
}

/// Encoder factory that counts frames and writes a small placeholder file on finish
#[derive(Clone, Default)]
pub struct MemoryEncoderFactory {
    log: Arc<Mutex<EncoderLog>>,
    fail_open: bool,
    fail_finish: bool,
}

impl MemoryEncoderFactory {
    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Opens normally but every sink errors on finish, like an encoder that exited
    pub fn failing_finish() -> Self {
        Self {
            fail_finish: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.log.lock().opened.clone()
    }

    pub fn finished(&self, path: &Path) -> Option<u64> {
        self.log.lock().finished.get(path).copied()
    }

    pub fn live(&self) -> usize {
        self.log.lock().live
    }

    pub fn max_live(&self) -> usize {
        self.log.lock().max_live
    }
}

impl EncoderFactory for MemoryEncoderFactory {
    fn open(
        &self,
        path: &Path,
        properties: SourceProperties,
        _fps: u32,
    ) -> Result<Box<dyn EncoderSink>, EncoderError> {
        if self.fail_open {
            return Err(EncoderError::FfmpegMissing("disabled in test".to_string()));
        }

        let mut log = self.log.lock();
        log.opened.push(path.to_path_buf());
        log.live += 1;
        log.max_live = log.max_live.max(log.live);

        Ok(Box::new(MemorySink {
            path: path.to_path_buf(),
            properties,
            frames: 0,
            fail_finish: self.fail_finish,
            log: self.log.clone(),
        }))
    }
}

struct MemorySink {
    path: PathBuf,
    properties: SourceProperties,
    frames: u64,
    fail_finish: bool,
    log: Arc<Mutex<EncoderLog>>,
}

impl EncoderSink for MemorySink {
    fn append(&mut self, frame: &Frame) -> Result<(), EncoderError> {
        if frame.width() != self.properties.width || frame.height() != self.properties.height {
            return Err(EncoderError::FrameMismatch {
                width: self.properties.width,
                height: self.properties.height,
                got_width: frame.width(),
                got_height: frame.height(),
            });
        }
        self.frames += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames
    }

    fn finish(self: Box<Self>) -> Result<u64, EncoderError> {
        if self.fail_finish {
            self.log.lock().live -= 1;
            return Err(EncoderError::Exited {
                status: "exit status: 1".to_string(),
                stderr: "output could not be written".to_string(),
            });
        }
        std::fs::write(&self.path, format!("{} frames", self.frames))?;
        let mut log = self.log.lock();
        log.finished.insert(self.path.clone(), self.frames);
        log.live -= 1;
        Ok(self.frames)
    }
}

/// Front end that answers prompts from a queue and records everything shown
pub struct RecordingUi {
    answers: VecDeque<Option<PathBuf>>,
    target: (u32, u32),
    pub prompts: Vec<String>,
    pub notices: Vec<(String, String)>,
    pub labels: Vec<String>,
    pub presented: Vec<(u32, u32)>,
}

impl Default for RecordingUi {
    fn default() -> Self {
        Self {
            answers: VecDeque::new(),
            target: (64, 48),
            prompts: Vec::new(),
            notices: Vec::new(),
            labels: Vec::new(),
            presented: Vec::new(),
        }
    }
}

impl RecordingUi {
    /// Queue the reply to the next directory prompt
    pub fn answer(mut self, dir: Option<PathBuf>) -> Self {
        self.answers.push_back(dir);
        self
    }

    pub fn with_target(mut self, width: u32, height: u32) -> Self {
        self.target = (width, height);
        self
    }
}

impl DirectoryPicker for RecordingUi {
    fn pick_directory(&mut self, title: &str) -> Option<PathBuf> {
        self.prompts.push(title.to_string());
        self.answers.pop_front().flatten()
    }
}

impl NoticePresenter for RecordingUi {
    fn notify(&mut self, title: &str, message: &str) {
        self.notices.push((title.to_string(), message.to_string()));
    }
}

impl DisplaySurface for RecordingUi {
    fn target_size(&self) -> (u32, u32) {
        self.target
    }

    fn present(&mut self, image: RgbImage) {
        self.presented.push(image.dimensions());
    }

    fn set_record_label(&mut self, label: &str) {
        self.labels.push(label.to_string());
    }
}
