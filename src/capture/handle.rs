//! Shared capture handle
//!
//! The preview tick and the recording thread both read from the same device.
//! Reads are serialized on a mutex; each caller simply gets the next frame
//! the device delivers.

use super::traits::{CaptureSource, Frame, SourceProperties};
use crate::utils::{AppError, AppResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, thread-safe handle to the single open capture source
#[derive(Clone)]
pub struct CaptureHandle {
    source: Arc<Mutex<Option<Box<dyn CaptureSource>>>>,
    properties: SourceProperties,
}

impl CaptureHandle {
    /// Take ownership of an opened source
    pub fn new(source: Box<dyn CaptureSource>) -> Self {
        let properties = source.properties();
        Self {
            source: Arc::new(Mutex::new(Some(source))),
            properties,
        }
    }

    /// Read the next frame. Fails with `FrameUnavailable` once released.
    pub fn read_frame(&self) -> AppResult<Frame> {
        match self.source.lock().as_mut() {
            Some(source) => source.read_frame(),
            None => Err(AppError::FrameUnavailable(
                "capture source released".to_string(),
            )),
        }
    }

    /// Properties reported when the source was opened
    pub fn properties(&self) -> SourceProperties {
        self.properties
    }

    /// Release the underlying device. Returns `true` only for the call that
    /// actually released it.
    pub fn release(&self) -> bool {
        let taken = self.source.lock().take();
        match taken {
            Some(mut source) => {
                source.release();
                tracing::info!("Capture source released");
                true
            }
            None => false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.source.lock().is_none()
    }
}
