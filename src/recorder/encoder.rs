//! Video encoder sinks
//!
//! The production sink pipes raw frames into an FFmpeg process that writes
//! XVID video into an AVI container.

use crate::capture::{Frame, SourceProperties};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long a freshly spawned FFmpeg gets to reject its arguments or output
const STARTUP_GRACE: Duration = Duration::from_millis(300);

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("FFmpeg not found: {0}")]
    FfmpegMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame is {got_width}x{got_height}, encoder expects {width}x{height}")]
    FrameMismatch {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },

    #[error("Encoder already closed")]
    Closed,

    #[error("Output directory does not exist: {0}")]
    MissingOutputDir(PathBuf),

    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),

    #[error("FFmpeg exited with status {status}: {stderr}")]
    Exited { status: String, stderr: String },
}

/// Destination that accepts frames and serializes them into a video file
pub trait EncoderSink: Send {
    /// Append one frame
    fn append(&mut self, frame: &Frame) -> Result<(), EncoderError>;

    /// Frames appended so far
    fn frames_written(&self) -> u64;

    /// Flush and close the file. Returns the number of frames written.
    fn finish(self: Box<Self>) -> Result<u64, EncoderError>;
}

/// Opens a sink per recording session
pub trait EncoderFactory: Send + Sync {
    fn open(
        &self,
        path: &Path,
        properties: SourceProperties,
        fps: u32,
    ) -> Result<Box<dyn EncoderSink>, EncoderError>;
}

/// Spawns `ffmpeg` for every session
#[derive(Debug, Clone)]
pub struct FfmpegEncoderFactory {
    program: PathBuf,
}

impl FfmpegEncoderFactory {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegEncoderFactory {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl EncoderFactory for FfmpegEncoderFactory {
    fn open(
        &self,
        path: &Path,
        properties: SourceProperties,
        fps: u32,
    ) -> Result<Box<dyn EncoderSink>, EncoderError> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !dir.is_dir() {
                return Err(EncoderError::MissingOutputDir(dir.to_path_buf()));
            }
        }
        if path.exists() {
            return Err(EncoderError::OutputExists(path.to_path_buf()));
        }

        if Command::new(&self.program).arg("-version").output().is_err() {
            return Err(EncoderError::FfmpegMissing(format!(
                "`{}` could not be executed; install FFmpeg and make sure it is on PATH",
                self.program.display()
            )));
        }

        Ok(Box::new(FfmpegEncoder::spawn(
            &self.program,
            path,
            properties,
            fps,
        )?))
    }
}

/// Build the FFmpeg argument list for raw frames on stdin → XVID/AVI
pub fn encoder_args(path: &Path, properties: SourceProperties, fps: u32) -> Vec<String> {
    vec![
        "-n".to_string(), // Never overwrite an earlier clip
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pixel_format".to_string(),
        properties.pixel_order.ffmpeg_pixel_format().to_string(),
        "-video_size".to_string(),
        format!("{}x{}", properties.width, properties.height),
        "-framerate".to_string(),
        fps.to_string(),
        "-i".to_string(),
        "-".to_string(), // Read from stdin
        "-c:v".to_string(),
        "mpeg4".to_string(),
        "-vtag".to_string(),
        "XVID".to_string(),
        "-q:v".to_string(),
        "5".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        path.to_string_lossy().to_string(),
    ]
}

/// FFmpeg process fed through its stdin
pub struct FfmpegEncoder {
    process: Child,
    stdin: Option<ChildStdin>,
    properties: SourceProperties,
    frame_count: u64,
    output: PathBuf,
}

impl FfmpegEncoder {
    fn spawn(
        program: &Path,
        path: &Path,
        properties: SourceProperties,
        fps: u32,
    ) -> Result<Self, EncoderError> {
        let mut process = Command::new(program)
            .args(encoder_args(path, properties, fps))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;
        let stdin = process.stdin.take();

        // FFmpeg opens its output before reading any input, so a bad path or
        // codec shows up as an early exit
        let deadline = Instant::now() + STARTUP_GRACE;
        while Instant::now() < deadline {
            if process.try_wait()?.is_some() {
                drop(stdin);
                let output = process.wait_with_output()?;
                return Err(EncoderError::Exited {
                    status: output.status.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        tracing::info!(
            "Started FFmpeg encoder: {}x{} @ {}fps, pixel_format={}, output: {}",
            properties.width,
            properties.height,
            fps,
            properties.pixel_order.ffmpeg_pixel_format(),
            path.display()
        );

        Ok(Self {
            process,
            stdin,
            properties,
            frame_count: 0,
            output: path.to_path_buf(),
        })
    }
}

impl EncoderSink for FfmpegEncoder {
    fn append(&mut self, frame: &Frame) -> Result<(), EncoderError> {
        if frame.width() != self.properties.width || frame.height() != self.properties.height {
            return Err(EncoderError::FrameMismatch {
                width: self.properties.width,
                height: self.properties.height,
                got_width: frame.width(),
                got_height: frame.height(),
            });
        }

        let stdin = self.stdin.as_mut().ok_or(EncoderError::Closed)?;
        stdin.write_all(frame.data())?;
        self.frame_count += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frame_count
    }

    fn finish(self: Box<Self>) -> Result<u64, EncoderError> {
        let FfmpegEncoder {
            process,
            stdin,
            frame_count,
            output: path,
            ..
        } = *self;

        // Closing stdin signals EOF so FFmpeg writes the index and exits
        drop(stdin);
        let output = process.wait_with_output()?;
        if !output.status.success() {
            return Err(EncoderError::Exited {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::info!(
            "FFmpeg encoder finished: {} frames, output: {}",
            frame_count,
            path.display()
        );
        Ok(frame_count)
    }
}
