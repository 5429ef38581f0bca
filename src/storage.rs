//! Saved artifacts: still images and relocated recordings

use crate::capture::Frame;
use crate::utils::naming::photo_file_name;
use crate::utils::{AppError, AppResult};
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `frame` as `capture_<timestamp>.jpg` inside `dir`
pub fn save_photo(frame: Frame, dir: &Path) -> AppResult<PathBuf> {
    let path = dir.join(photo_file_name());
    let image = frame.into_rgb_image();

    image
        .save_with_format(&path, ImageFormat::Jpeg)
        .map_err(|e| AppError::ImageWrite {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    tracing::info!("Saved photo to {}", path.display());
    Ok(path)
}

/// Move `from` into `dir`, keeping its file name.
///
/// Falls back to copy + delete when a plain rename fails (e.g. the
/// destination is on another file system).
pub fn move_into(from: &Path, dir: &Path) -> AppResult<PathBuf> {
    let file_name = from.file_name().ok_or_else(|| AppError::FileRelocationFailure {
        from: from.to_path_buf(),
        to: dir.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name"),
    })?;
    let target = dir.join(file_name);

    if let Err(rename_err) = fs::rename(from, &target) {
        tracing::debug!("Rename failed ({}), trying copy", rename_err);
        let relocation_failure = |source| AppError::FileRelocationFailure {
            from: from.to_path_buf(),
            to: target.clone(),
            source,
        };

        fs::copy(from, &target).map_err(|_| relocation_failure(rename_err))?;
        fs::remove_file(from).map_err(relocation_failure)?;
    }

    Ok(target)
}
