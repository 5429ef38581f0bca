//! Capture trait definitions
//!
//! Platform-agnostic frame and source types shared by every capture backend.

use crate::utils::AppResult;
use image::RgbImage;

/// Channel order of a packed 8-bit, 3-channel frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOrder {
    Rgb,
    Bgr,
}

impl PixelOrder {
    /// FFmpeg `-pixel_format` name for raw frames in this order
    pub fn ffmpeg_pixel_format(&self) -> &'static str {
        match self {
            PixelOrder::Rgb => "rgb24",
            PixelOrder::Bgr => "bgr24",
        }
    }
}

/// Device properties as reported when the source was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceProperties {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Channel order of delivered frames
    pub pixel_order: PixelOrder,
}

/// One captured image snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixel_order: PixelOrder,
    data: Vec<u8>,
}

impl Frame {
    /// Bytes per pixel of every frame
    pub const CHANNELS: usize = 3;

    /// Wrap a packed pixel buffer. Returns `None` if the buffer length does not
    /// match `width * height * CHANNELS`.
    pub fn new(width: u32, height: u32, pixel_order: PixelOrder, data: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixel_order,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        Self::CHANNELS
    }

    pub fn pixel_order(&self) -> PixelOrder {
        self.pixel_order
    }

    /// Raw packed pixel bytes in `pixel_order`
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Convert into an RGB image, swapping channels when the frame is BGR
    pub fn into_rgb_image(self) -> RgbImage {
        let Frame {
            width,
            height,
            pixel_order,
            mut data,
        } = self;

        if pixel_order == PixelOrder::Bgr {
            for pixel in data.chunks_exact_mut(Self::CHANNELS) {
                pixel.swap(0, 2);
            }
        }

        // Length was validated in `new`
        RgbImage::from_raw(width, height, data).unwrap_or_else(|| RgbImage::new(width, height))
    }
}

/// Information about a camera/webcam
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index or backend identifier
    pub id: String,

    /// Device name
    pub name: String,
}

/// A device that produces frames on demand.
///
/// `read_frame` blocks until the device delivers a frame. A failed read is
/// reported as [`AppError::FrameUnavailable`](crate::utils::AppError) and is
/// never fatal.
pub trait CaptureSource: Send {
    /// Read the next available frame
    fn read_frame(&mut self) -> AppResult<Frame>;

    /// Properties reported by the device
    fn properties(&self) -> SourceProperties;

    /// Release the device. Must be safe to call more than once.
    fn release(&mut self);
}
