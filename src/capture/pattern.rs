//! Synthetic test-pattern source
//!
//! Produces a moving colour gradient in BGR order, like most camera drivers
//! deliver. Used when no webcam backend is compiled in or the user asks for
//! the pattern explicitly.

use super::traits::{CaptureSource, Frame, PixelOrder, SourceProperties};
use crate::utils::{AppError, AppResult};
use std::time::{Duration, Instant};

pub struct TestPatternSource {
    width: u32,
    height: u32,
    frame_interval: Option<Duration>,
    next_due: Option<Instant>,
    frame_index: u64,
    released: bool,
}

impl TestPatternSource {
    /// Unpaced source: every read returns immediately
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_interval: None,
            next_due: None,
            frame_index: 0,
            released: false,
        }
    }

    /// Source that blocks reads to deliver at most `fps` frames per second
    pub fn paced(width: u32, height: u32, fps: u32) -> Self {
        let mut source = Self::new(width, height);
        source.frame_interval = Some(Duration::from_secs(1) / fps.max(1));
        source
    }

    pub fn frames_delivered(&self) -> u64 {
        self.frame_index
    }

    /// Block until the next frame slot, like a camera waiting on its sensor
    fn wait_for_slot(&mut self) {
        let Some(interval) = self.frame_interval else {
            return;
        };

        let now = Instant::now();
        let due = self.next_due.unwrap_or(now);
        if due > now {
            std::thread::sleep(due - now);
        }

        // Don't burst to catch up after a long gap between reads
        let next = due + interval;
        self.next_due = Some(if next < now { now + interval } else { next });
    }

    fn render(&self) -> Vec<u8> {
        let width = self.width.max(1);
        let height = self.height.max(1);
        let shift = (self.frame_index.wrapping_mul(4) % width as u64) as u32;
        let r = (self.frame_index % 256) as u8;

        let mut data =
            Vec::with_capacity(self.width as usize * self.height as usize * Frame::CHANNELS);
        for y in 0..self.height {
            let g = (y * 255 / height) as u8;
            for x in 0..self.width {
                let b = ((x + shift) % width * 255 / width) as u8;
                data.extend_from_slice(&[b, g, r]);
            }
        }
        data
    }
}

impl CaptureSource for TestPatternSource {
    fn read_frame(&mut self) -> AppResult<Frame> {
        if self.released {
            return Err(AppError::FrameUnavailable(
                "test pattern released".to_string(),
            ));
        }

        self.wait_for_slot();
        let data = self.render();
        self.frame_index += 1;

        Frame::new(self.width, self.height, PixelOrder::Bgr, data)
            .ok_or_else(|| AppError::FrameUnavailable("pattern buffer size mismatch".to_string()))
    }

    fn properties(&self) -> SourceProperties {
        SourceProperties {
            width: self.width,
            height: self.height,
            pixel_order: PixelOrder::Bgr,
        }
    }

    fn release(&mut self) {
        if !self.released {
            tracing::debug!("Test pattern released after {} frames", self.frame_index);
            self.released = true;
        }
    }
}
