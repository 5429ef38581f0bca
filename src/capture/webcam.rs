//! Webcam capture using nokhwa
//!
//! The nokhwa camera is created, read and dropped on a dedicated device
//! thread. Callers talk to it through a request channel, which keeps
//! [`WebcamSource`] `Send` regardless of the backend's own thread affinity.

use super::traits::{CameraInfo, CaptureSource, Frame, PixelOrder, SourceProperties};
use crate::utils::{AppError, AppResult};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use std::sync::mpsc;
use std::thread::JoinHandle;

/// Get list of available cameras
pub fn list_cameras() -> Vec<CameraInfo> {
    match nokhwa::query(ApiBackend::Auto) {
        Ok(cameras) => cameras
            .into_iter()
            .map(|info| {
                let id = match info.index() {
                    CameraIndex::Index(i) => i.to_string(),
                    CameraIndex::String(s) => s.to_string(),
                };
                CameraInfo {
                    id,
                    name: info.human_name().to_string(),
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate cameras: {:?}", e);
            Vec::new()
        }
    }
}

enum DeviceRequest {
    Frame(mpsc::SyncSender<AppResult<Frame>>),
    Shutdown,
}

/// Camera device opened through nokhwa
pub struct WebcamSource {
    index: u32,
    requests: mpsc::Sender<DeviceRequest>,
    properties: SourceProperties,
    device_thread: Option<JoinHandle<()>>,
}

impl WebcamSource {
    /// Open camera `index` and start its stream
    pub fn open(index: u32) -> AppResult<Self> {
        let (requests, request_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let device_thread = std::thread::Builder::new()
            .name(format!("camera-{index}"))
            .spawn(move || run_device(index, request_rx, ready_tx))?;

        let opened = ready_rx.recv().unwrap_or_else(|_| {
            Err(AppError::DeviceUnavailable {
                index,
                reason: "device thread exited during open".to_string(),
            })
        });

        match opened {
            Ok(properties) => Ok(Self {
                index,
                requests,
                properties,
                device_thread: Some(device_thread),
            }),
            Err(e) => {
                let _ = device_thread.join();
                Err(e)
            }
        }
    }
}

impl CaptureSource for WebcamSource {
    fn read_frame(&mut self) -> AppResult<Frame> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.requests
            .send(DeviceRequest::Frame(reply_tx))
            .map_err(|_| AppError::FrameUnavailable("camera device thread stopped".to_string()))?;
        reply_rx
            .recv()
            .map_err(|_| AppError::FrameUnavailable("camera device thread stopped".to_string()))?
    }

    fn properties(&self) -> SourceProperties {
        self.properties
    }

    fn release(&mut self) {
        if let Some(handle) = self.device_thread.take() {
            let _ = self.requests.send(DeviceRequest::Shutdown);
            let _ = handle.join();
            tracing::info!("Camera {} closed", self.index);
        }
    }
}

impl Drop for WebcamSource {
    fn drop(&mut self) {
        self.release();
    }
}

fn run_device(
    index: u32,
    requests: mpsc::Receiver<DeviceRequest>,
    ready: mpsc::SyncSender<AppResult<SourceProperties>>,
) {
    let unavailable = |reason: String| AppError::DeviceUnavailable { index, reason };

    let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
    let mut camera = match Camera::new(CameraIndex::Index(index), format) {
        Ok(c) => c,
        Err(e) => {
            let _ = ready.send(Err(unavailable(format!("{e:?}"))));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = ready.send(Err(unavailable(format!("failed to open stream: {e:?}"))));
        return;
    }

    let resolution = camera.resolution();
    let properties = SourceProperties {
        width: resolution.width(),
        height: resolution.height(),
        pixel_order: PixelOrder::Rgb,
    };
    tracing::info!(
        "Camera {} opened: {}x{} @ {}fps, format={:?}",
        index,
        properties.width,
        properties.height,
        camera.frame_rate(),
        camera.frame_format()
    );

    if ready.send(Ok(properties)).is_err() {
        let _ = camera.stop_stream();
        return;
    }

    for request in requests {
        match request {
            DeviceRequest::Frame(reply) => {
                let _ = reply.send(read_one(&mut camera));
            }
            DeviceRequest::Shutdown => break,
        }
    }

    if let Err(e) = camera.stop_stream() {
        tracing::warn!("Error stopping camera stream: {:?}", e);
    }
    tracing::debug!("Camera device thread stopped");
}

fn read_one(camera: &mut Camera) -> AppResult<Frame> {
    let buffer = camera
        .frame()
        .map_err(|e| AppError::FrameUnavailable(format!("{e:?}")))?;
    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| AppError::FrameUnavailable(format!("decode failed: {e:?}")))?;

    let (width, height) = (decoded.width(), decoded.height());
    Frame::new(width, height, PixelOrder::Rgb, decoded.into_raw())
        .ok_or_else(|| AppError::FrameUnavailable("decoded buffer size mismatch".to_string()))
}
