//! Finished-video inspection via FFprobe

use crate::utils::{AppError, AppResult};
use std::path::Path;
use std::process::Command;

/// Video metadata returned from FFprobe
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_ms: f64,
    pub codec: String,
    /// Decoded frame count, when FFprobe was able to count them
    pub frame_count: Option<u64>,
}

/// Get video metadata using FFprobe
pub fn probe_video(path: &Path) -> AppResult<VideoMetadata> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-count_frames",
            "-show_streams",
            "-show_format",
            "-select_streams",
            "v:0",
        ])
        .arg(path)
        .output()
        .map_err(|e| AppError::Probe(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(AppError::Probe(format!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parse FFprobe's JSON report for the first video stream
pub fn parse_probe_output(json_str: &str) -> AppResult<VideoMetadata> {
    let json: serde_json::Value = serde_json::from_str(json_str)?;

    let video_stream = json
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|s| s.first())
        .ok_or_else(|| AppError::Probe("No video stream found".to_string()))?;

    let width = video_stream
        .get("width")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let height = video_stream
        .get("height")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let codec = video_stream
        .get("codec_name")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    // Frame rate can be "30/1" or "29.97"
    let fps = video_stream
        .get("r_frame_rate")
        .and_then(|v| v.as_str())
        .map(parse_frame_rate)
        .unwrap_or(0.0);

    let frame_count = video_stream
        .get("nb_read_frames")
        .or_else(|| video_stream.get("nb_frames"))
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<u64>().ok());

    // Format section duration is more reliable than the stream's
    let duration_secs = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoMetadata {
        width,
        height,
        fps,
        duration_ms: duration_secs * 1000.0,
        codec,
        frame_count,
    })
}

fn parse_frame_rate(s: &str) -> f64 {
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().unwrap_or(0.0);
            let den: f64 = den.parse().unwrap_or(1.0);
            if den > 0.0 {
                num / den
            } else {
                0.0
            }
        }
        None => s.parse().unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [{
            "codec_name": "mpeg4",
            "width": 640,
            "height": 480,
            "r_frame_rate": "30/1",
            "nb_frames": "90",
            "nb_read_frames": "90"
        }],
        "format": { "duration": "3.000000" }
    }"#;

    #[test]
    fn test_parse_sample_report() {
        let meta = parse_probe_output(SAMPLE).unwrap();
        assert_eq!(meta.width, 640);
        assert_eq!(meta.height, 480);
        assert_eq!(meta.codec, "mpeg4");
        assert!((meta.fps - 30.0).abs() < f64::EPSILON);
        assert!((meta.duration_ms - 3000.0).abs() < 0.001);
        assert_eq!(meta.frame_count, Some(90));
    }

    #[test]
    fn test_parse_without_streams() {
        let err = parse_probe_output(r#"{"streams": []}"#).unwrap_err();
        assert!(matches!(err, AppError::Probe(_)));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_probe_output("not json").unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_frame_rate_forms() {
        assert!((parse_frame_rate("30000/1001") - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("25") - 25.0).abs() < f64::EPSILON);
        assert_eq!(parse_frame_rate("30/0"), 0.0);
    }
}
