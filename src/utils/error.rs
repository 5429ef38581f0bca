//! Error types and handling
//!
//! Common error types used across the application.

use std::path::PathBuf;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Camera device {index} unavailable: {reason}")]
    DeviceUnavailable { index: u32, reason: String },

    #[error("Frame unavailable: {0}")]
    FrameUnavailable(String),

    #[error("Failed to open encoder for {path}: {reason}")]
    EncoderOpenFailure { path: PathBuf, reason: String },

    #[error("Encoding {path} failed: {reason}")]
    EncodeFailure { path: PathBuf, reason: String },

    #[error("Failed to move {from} to {to}: {source}")]
    FileRelocationFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("Failed to write image {path}: {reason}")]
    ImageWrite { path: PathBuf, reason: String },

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the caller should simply skip this tick and carry on.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::FrameUnavailable(_))
    }
}

/// Error summary handed to notice presenters
#[derive(Debug)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        let code = match error {
            AppError::DeviceUnavailable { .. } => "DEVICE_UNAVAILABLE",
            AppError::FrameUnavailable(_) => "FRAME_UNAVAILABLE",
            AppError::EncoderOpenFailure { .. } => "ENCODER_OPEN_FAILURE",
            AppError::EncodeFailure { .. } => "ENCODE_FAILURE",
            AppError::FileRelocationFailure { .. } => "FILE_RELOCATION_FAILURE",
            AppError::AlreadyRecording => "ALREADY_RECORDING",
            AppError::ImageWrite { .. } => "IMAGE_WRITE_ERROR",
            AppError::Probe(_) => "PROBE_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
