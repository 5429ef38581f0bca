//! Headless terminal front end
//!
//! Prompts are answered from the configured save directory, notices and the
//! record button are printed, and the latest preview is kept in memory.

use super::{DirectoryPicker, DisplaySurface, NoticePresenter};
use image::RgbImage;
use std::path::PathBuf;

pub struct TerminalUi {
    save_dir: Option<PathBuf>,
    target: (u32, u32),
    latest_preview: Option<RgbImage>,
    frames_presented: u64,
    record_label: String,
}

impl TerminalUi {
    pub fn new(save_dir: Option<PathBuf>, target: (u32, u32)) -> Self {
        Self {
            save_dir,
            target,
            latest_preview: None,
            frames_presented: 0,
            record_label: String::new(),
        }
    }

    pub fn latest_preview(&self) -> Option<&RgbImage> {
        self.latest_preview.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn record_label(&self) -> &str {
        &self.record_label
    }

    pub fn print_help(&self) {
        println!("Commands: [p] capture photo  [r] {}  [q] quit", self.record_label);
    }
}

impl DirectoryPicker for TerminalUi {
    fn pick_directory(&mut self, title: &str) -> Option<PathBuf> {
        let Some(dir) = self.save_dir.clone() else {
            println!("{title}: no --save-dir given, skipping");
            return None;
        };

        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!("Cannot use save directory {}: {}", dir.display(), e);
            println!("{title}: {} is not usable ({e})", dir.display());
            return None;
        }

        println!("{title}: {}", dir.display());
        Some(dir)
    }
}

impl NoticePresenter for TerminalUi {
    fn notify(&mut self, title: &str, message: &str) {
        tracing::info!("{}: {}", title, message);
        println!("[{title}] {message}");
    }
}

impl DisplaySurface for TerminalUi {
    fn target_size(&self) -> (u32, u32) {
        self.target
    }

    fn present(&mut self, image: RgbImage) {
        if self.frames_presented == 0 {
            tracing::info!("First preview frame: {}x{}", image.width(), image.height());
        }
        self.frames_presented += 1;
        self.latest_preview = Some(image);
    }

    fn set_record_label(&mut self, label: &str) {
        self.record_label = label.to_string();
        println!("[ {label} ]");
    }
}
