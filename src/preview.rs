//! Preview frame preparation
//!
//! Turns a captured frame into a display-ready RGB image: channel reorder,
//! optional horizontal mirror, then scale-to-fit into the surface.

use crate::capture::Frame;
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Largest size with the source aspect ratio that fits inside `max_width` × `max_height`.
/// Scales up as well as down. A zero-sized target leaves the source size unchanged.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return (width, height);
    }

    let width_ratio = max_width as f64 / width as f64;
    let height_ratio = max_height as f64 / height as f64;
    let ratio = width_ratio.min(height_ratio);

    let scaled_width = ((width as f64 * ratio).round() as u32).clamp(1, max_width);
    let scaled_height = ((height as f64 * ratio).round() as u32).clamp(1, max_height);
    (scaled_width, scaled_height)
}

/// Convert `frame` for display in a `target` (width, height) rectangle
pub fn prepare_preview(frame: Frame, target: (u32, u32), mirror: bool) -> RgbImage {
    let mut image = frame.into_rgb_image();
    if mirror {
        imageops::flip_horizontal_in_place(&mut image);
    }

    let (width, height) = fit_within(image.width(), image.height(), target.0, target.1);
    if (width, height) == image.dimensions() {
        image
    } else {
        imageops::resize(&image, width, height, FilterType::Triangle)
    }
}
