//! User-facing collaborators
//!
//! The controller only talks to the user through these traits. The terminal
//! front end implements them for the binary; tests use a recording fake.

pub mod terminal;

pub use terminal::TerminalUi;

use image::RgbImage;
use std::path::PathBuf;

/// Asks the user for a destination directory. `None` means the prompt was canceled.
pub trait DirectoryPicker {
    fn pick_directory(&mut self, title: &str) -> Option<PathBuf>;
}

/// Shows a modal notice
pub trait NoticePresenter {
    fn notify(&mut self, title: &str, message: &str);
}

/// Where the preview is painted, plus the record button
pub trait DisplaySurface {
    /// Rectangle the preview is scaled to fit
    fn target_size(&self) -> (u32, u32);

    fn present(&mut self, image: RgbImage);

    fn set_record_label(&mut self, label: &str);
}

/// Everything the controller needs from the front end
pub trait UserInterface: DirectoryPicker + NoticePresenter + DisplaySurface {}

impl<T: DirectoryPicker + NoticePresenter + DisplaySurface> UserInterface for T {}
