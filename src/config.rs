//! Runtime configuration
//!
//! Nothing is persisted between runs; the binary builds an [`AppConfig`] from
//! command-line flags on every start.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which capture backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Physical camera through nokhwa
    Webcam,
    /// Synthetic moving gradient
    Pattern,
}

impl Default for SourceKind {
    fn default() -> Self {
        if cfg!(feature = "webcam") {
            Self::Webcam
        } else {
            Self::Pattern
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Camera slot to open
    pub device_index: u32,

    pub source: SourceKind,

    /// Directory returned by the directory prompt; `None` cancels every prompt
    pub save_dir: Option<PathBuf>,

    /// Where in-progress recordings are written before relocation
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_preview_interval_ms")]
    pub preview_interval_ms: u64,

    /// Preview surface size the frame is scaled to fit
    pub preview_width: u32,
    pub preview_height: u32,

    /// Mirror the preview horizontally (selfie view)
    #[serde(default = "default_mirror")]
    pub mirror_preview: bool,

    /// Resolution of the synthetic pattern source
    pub pattern_width: u32,
    pub pattern_height: u32,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_preview_interval_ms() -> u64 {
    30
}

fn default_mirror() -> bool {
    true
}

impl AppConfig {
    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(self.preview_interval_ms.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            source: SourceKind::default(),
            save_dir: None,
            working_dir: default_working_dir(),
            preview_interval_ms: default_preview_interval_ms(),
            preview_width: 720,
            preview_height: 540,
            mirror_preview: default_mirror(),
            pattern_width: 640,
            pattern_height: 480,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.device_index, 0);
        assert_eq!(config.preview_interval(), Duration::from_millis(30));
        assert!(config.mirror_preview);
        assert!(config.save_dir.is_none());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = AppConfig {
            preview_interval_ms: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.preview_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_serde_fills_defaults() {
        let json = r#"{
            "deviceIndex": 1,
            "source": "pattern",
            "saveDir": null,
            "previewWidth": 320,
            "previewHeight": 240,
            "patternWidth": 64,
            "patternHeight": 48
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.source, SourceKind::Pattern);
        assert_eq!(config.preview_interval_ms, 30);
        assert_eq!(config.working_dir, PathBuf::from("."));
        assert!(config.mirror_preview);
    }
}
