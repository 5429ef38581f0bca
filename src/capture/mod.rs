//! Capture sources
//!
//! Frame producers and the shared handle the preview and recorder read from.

pub mod handle;
pub mod pattern;
pub mod traits;

#[cfg(feature = "webcam")]
pub mod webcam;

pub use handle::CaptureHandle;
pub use pattern::TestPatternSource;
pub use traits::{CameraInfo, CaptureSource, Frame, PixelOrder, SourceProperties};

use crate::config::{AppConfig, SourceKind};
use crate::utils::AppResult;

/// Open the configured source. Failing here is fatal: there is no fallback device.
pub fn open_source(config: &AppConfig) -> AppResult<CaptureHandle> {
    let source: Box<dyn CaptureSource> = match config.source {
        SourceKind::Webcam => open_webcam(config.device_index)?,
        SourceKind::Pattern => Box::new(TestPatternSource::paced(
            config.pattern_width,
            config.pattern_height,
            crate::recorder::FRAME_RATE,
        )),
    };

    let props = source.properties();
    tracing::info!(
        "Opened {:?} source {}: {}x{} ({:?})",
        config.source,
        config.device_index,
        props.width,
        props.height,
        props.pixel_order
    );
    Ok(CaptureHandle::new(source))
}

#[cfg(feature = "webcam")]
fn open_webcam(index: u32) -> AppResult<Box<dyn CaptureSource>> {
    Ok(Box::new(webcam::WebcamSource::open(index)?))
}

#[cfg(not(feature = "webcam"))]
fn open_webcam(index: u32) -> AppResult<Box<dyn CaptureSource>> {
    Err(crate::utils::AppError::DeviceUnavailable {
        index,
        reason: "built without the `webcam` feature".to_string(),
    })
}

/// Cameras the capture backend can see
pub fn list_cameras() -> Vec<CameraInfo> {
    #[cfg(feature = "webcam")]
    {
        webcam::list_cameras()
    }

    #[cfg(not(feature = "webcam"))]
    {
        tracing::warn!("Camera enumeration requires the `webcam` feature");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(not(feature = "webcam"))]
    use crate::utils::AppError;

    #[test]
    fn test_open_pattern_source() {
        let config = AppConfig {
            source: SourceKind::Pattern,
            pattern_width: 40,
            pattern_height: 30,
            ..AppConfig::default()
        };
        let handle = open_source(&config).unwrap();
        assert_eq!(handle.properties().width, 40);
        assert_eq!(handle.properties().pixel_order, PixelOrder::Bgr);
        assert!(handle.read_frame().is_ok());
        assert!(handle.release());
    }

    #[cfg(not(feature = "webcam"))]
    #[test]
    fn test_webcam_without_feature_is_unavailable() {
        let config = AppConfig {
            source: SourceKind::Webcam,
            device_index: 3,
            ..AppConfig::default()
        };
        match open_source(&config) {
            Err(AppError::DeviceUnavailable { index, .. }) => assert_eq!(index, 3),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("webcam opened without backend"),
        }
    }
}
